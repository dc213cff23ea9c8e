//! models module
pub mod analysis;
pub mod model_definition;

/// 再エクスポート
pub use analysis::{Analysis, Segment};
pub use model_definition::{
  LEGACY_MARKER_ANNOTATED, MARKER_ANNOTATED, MARKER_UNMARKED, MarkerFlag, Metadata, Operation, Record, RecordId,
};
