//! Config module

mod constants;
mod env;

pub use constants::{DEFAULT_BIND_ADDR, DEFAULT_PRESET_DICT, DEFAULT_STORE_PATH, MAX_STATUS_NOTICES};
pub use env::Config;
pub use yomigana::config::DEFAULT_QUERY;
