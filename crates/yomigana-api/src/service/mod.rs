//! service module

pub mod batch_controller;
pub mod status;
pub mod yomigana_api_service;

pub use batch_controller::BatchController;
pub use status::{ChannelReporter, StatusEvent, spawn_status_pump};
pub use yomigana_api_service::{YomiganaApiService, YomiganaApiServiceFull};
