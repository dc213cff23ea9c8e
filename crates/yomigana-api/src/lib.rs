//! yomigana-api crate
//!
//! HTTP host for the yomigana batch furigana pipeline.
//! A batch runs on a worker thread; its progress is polled through `/furigana/status`.
//!
//! ## Endpoints
//! - `POST /furigana/add` - Start an add batch (202 Accepted)
//! - `POST /furigana/remove` - Start a remove batch (202 Accepted)
//! - `POST /furigana/cancel` - Cancel the running batch
//! - `GET /furigana/status` - Progress, notices and summary of the current batch
//! - `GET /settings`, `PUT /settings` - Annotation settings for the next batch
//! - `GET /health` - Health Check
//!
//! ## Usage Example
//! ```bash
//! curl -X POST http://127.0.0.1:5540/furigana/add \
//!   -H "Content-Type: application/json" \
//!   -d '{"query": "category:Words"}'
//! curl http://127.0.0.1:5540/furigana/status
//! ```

pub mod api;
pub mod config;
pub mod errors;
pub mod models;
pub mod service;

pub use api::AppState;
pub use config::Config;
pub use errors::{ApiError, ApiErrorKind};
pub use models::{BatchStatus, CancelResponse, RunAccepted, RunRequest, SettingsUpdate};
pub use service::{YomiganaApiService, YomiganaApiServiceFull};
