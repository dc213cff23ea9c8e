//! モデルモジュール

mod request;
mod response;

pub use request::{RunRequest, SettingsUpdate};
pub use response::{BatchStatus, CancelResponse, RunAccepted};
