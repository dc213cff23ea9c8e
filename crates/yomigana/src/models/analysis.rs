//! Reading analysis result
use serde::{Deserialize, Serialize};

/// One span of the analyzed text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
  /// Surface form exactly as it appears in the input
  pub surface: String,
  /// Reading in hiragana, `None` when the analyzer knows none
  #[serde(default)]
  pub reading: Option<String>,
  /// Numeral (skipped when numbers are ignored)
  #[serde(default)]
  pub numeric: bool,
}

impl Segment {
  /// Segment without a reading (kana, punctuation, unknown words)
  pub fn plain(surface: impl Into<String>) -> Self {
    Self {
      surface: surface.into(),
      reading: None,
      numeric: false,
    }
  }

  /// Segment with a reading
  pub fn with_reading(surface: impl Into<String>, reading: impl Into<String>) -> Self {
    Self {
      surface: surface.into(),
      reading: Some(reading.into()),
      numeric: false,
    }
  }

  /// Builder that flags the segment as a numeral
  #[must_use]
  pub fn numeric(mut self) -> Self {
    self.numeric = true;
    self
  }
}

/// Analyzer output: an ordered list of segments covering the whole input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
  /// Segments in input order
  pub segments: Vec<Segment>,
}

impl Analysis {
  /// Constructor for Analysis
  pub fn new(segments: Vec<Segment>) -> Self {
    Self { segments }
  }

  /// Concatenation of all surfaces, i.e. the analyzed input
  pub fn plain(&self) -> String {
    self.segments.iter().map(|s| s.surface.as_str()).collect()
  }

  /// Whether no segment carries a reading
  pub fn is_unannotated(&self) -> bool {
    self.segments.iter().all(|s| s.reading.is_none())
  }
}

impl FromIterator<Segment> for Analysis {
  fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
    Self {
      segments: iter.into_iter().collect(),
    }
  }
}
