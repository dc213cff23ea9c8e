//! API module

mod handlers;
mod routes;
mod state;

pub use handlers::{
  get_settings, get_status, health_check, post_add, post_cancel, post_remove, put_settings,
};
pub use routes::{create_router, run_server};
pub use state::AppState;
