//! API State Definition

use std::sync::Arc;

use crate::config::Config;
use crate::service::YomiganaApiService;

/// Application State
///
/// State shared across the entire server.
/// Contains configuration and service.
#[derive(Clone)]
pub struct AppState {
  /// Configuration
  pub config: Config,
  /// Furigana batch service
  ///
  /// - Production: `Arc::new(YomiganaApiServiceFull::new(&config)?)`
  /// - Test: `Arc::new(StubYomiganaApiService)`
  pub service: Arc<dyn YomiganaApiService>,
}

impl AppState {
  /// Creates a new AppState
  #[must_use]
  pub fn new(config: Config, service: Arc<dyn YomiganaApiService>) -> Self {
    Self { config, service }
  }
}
