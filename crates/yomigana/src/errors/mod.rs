//! errors module
pub mod error_definition;

/// Re-export major error types
pub use error_definition::{
  AnalyzerError, BatchError, ConfigError, DictionaryError, RecordError, StoreError, YomiganaError,
  YomiganaResult,
};
