//! Furigana batch service

use std::sync::Arc;

use yomigana::config::AnnotationOptions;
use yomigana::{YomiganaError, YomiganaService};
use yomigana::models::Operation;

use crate::config::Config;
use crate::errors::Result;
use crate::models::{BatchStatus, RunAccepted, SettingsUpdate};

use super::batch_controller::BatchController;

/// Common interface for the furigana batch service
///
/// This trait allows swapping production implementation (`YomiganaApiServiceFull`) with
/// test stubs/mocks.
pub trait YomiganaApiService: Send + Sync {
  /// Starts a batch over the records matching `query` (default query when `None`)
  ///
  /// Blocking; handlers call it through `spawn_blocking`.
  ///
  /// # Errors
  /// - Invalid query
  /// - Empty selection
  /// - Internal error
  fn start(&self, operation: Operation, query: Option<String>) -> Result<RunAccepted>;

  /// Requests cancellation of the running batch; `false` when nothing is running
  fn cancel(&self) -> bool;

  /// Current batch status
  fn status(&self) -> BatchStatus;

  /// Current annotation settings
  ///
  /// # Errors
  /// The settings lock is poisoned
  fn settings(&self) -> Result<AnnotationOptions>;

  /// Changes the annotation settings used by the next batch
  ///
  /// # Errors
  /// The settings lock is poisoned
  fn update_settings(&self, update: SettingsUpdate) -> Result<AnnotationOptions>;

  /// Stops the running batch and waits for it
  fn shutdown(&self);
}

/// Furigana batch service backed by the dictionary and the JSON record store
pub struct YomiganaApiServiceFull {
  service: Arc<YomiganaService>,
  controller: BatchController,
}

impl YomiganaApiServiceFull {
  /// Initializes the service
  ///
  /// Loads the dictionary (downloading it on first use) and opens the record store.
  ///
  /// # Errors
  /// Returns an error if the dictionary or the store cannot be loaded
  ///
  /// # Panics
  /// Must be called from within a Tokio runtime.
  pub fn new(config: &Config) -> Result<Self> {
    let service = YomiganaService::init(&config.to_yomigana_config())?;
    Ok(Self::from_service(Arc::new(service)))
  }

  /// Wraps an already built core service
  #[must_use]
  pub fn from_service(service: Arc<YomiganaService>) -> Self {
    let controller = BatchController::new(service.clone());
    Self {
      service,
      controller,
    }
  }

  /// Batch controller
  pub fn controller(&self) -> &BatchController {
    &self.controller
  }
}

impl YomiganaApiService for YomiganaApiServiceFull {
  fn start(&self, operation: Operation, query: Option<String>) -> Result<RunAccepted> {
    self.controller.start(operation, query)
  }

  fn cancel(&self) -> bool {
    self.controller.cancel()
  }

  fn status(&self) -> BatchStatus {
    self.controller.status()
  }

  fn settings(&self) -> Result<AnnotationOptions> {
    Ok(self.service.settings().snapshot().map_err(YomiganaError::from)?)
  }

  fn update_settings(&self, update: SettingsUpdate) -> Result<AnnotationOptions> {
    self
      .service
      .settings()
      .update(|options| update.apply_to(options))
      .map_err(YomiganaError::from)?;
    tracing::info!(?update, "Annotation settings updated");
    self.settings()
  }

  fn shutdown(&self) {
    self.controller.shutdown();
  }
}
