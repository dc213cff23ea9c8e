//! Data Model Definition
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Persisted spelling of [`MarkerFlag::Annotated`]
pub const MARKER_ANNOTATED: &str = "ANNOTATED";

/// Persisted spelling of [`MarkerFlag::Unmarked`]
pub const MARKER_UNMARKED: &str = "UNMARKED";

/// Annotated spelling written by the earlier add-on; read as [`MarkerFlag::Annotated`]
pub const LEGACY_MARKER_ANNOTATED: &str = "toaruapple";

/// Fields of a record that the pipeline does not consume.
///
/// They are carried through load/commit untouched so that a store never loses data it
/// does not understand.
pub type Metadata = HashMap<String, JsonValue>;

/// Record identifier assigned by the record store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
  /// Constructor for RecordId
  pub const fn new(raw: u64) -> Self {
    Self(raw)
  }

  /// Returns the raw numeric id
  pub const fn get(self) -> u64 {
    self.0
  }
}

impl fmt::Display for RecordId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl FromStr for RecordId {
  type Err = std::num::ParseIntError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    s.trim().parse::<u64>().map(Self)
  }
}

impl From<u64> for RecordId {
  fn from(raw: u64) -> Self {
    Self(raw)
  }
}

/// Per-record flag telling whether this pipeline's furigana is currently applied.
///
/// Only two states exist. `ANNOTATED` and the legacy `toaruapple` read back as
/// [`MarkerFlag::Annotated`]; anything else (including the empty string and the legacy
/// `arutoapple`) reads back as [`MarkerFlag::Unmarked`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MarkerFlag {
  /// No furigana applied by this pipeline
  #[default]
  Unmarked,
  /// Furigana applied by this pipeline
  Annotated,
}

impl MarkerFlag {
  /// Persisted spelling of the flag
  pub fn as_str(&self) -> &'static str {
    match self {
      MarkerFlag::Unmarked => MARKER_UNMARKED,
      MarkerFlag::Annotated => MARKER_ANNOTATED,
    }
  }

  /// Reads a persisted value. Unrecognized values become `Unmarked`.
  pub fn parse_lenient(raw: &str) -> Self {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case(MARKER_ANNOTATED)
      || raw.eq_ignore_ascii_case(LEGACY_MARKER_ANNOTATED)
    {
      MarkerFlag::Annotated
    } else {
      MarkerFlag::Unmarked
    }
  }
}

impl fmt::Display for MarkerFlag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl Serialize for MarkerFlag {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.as_str())
  }
}

impl<'de> Deserialize<'de> for MarkerFlag {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    // null / numbers / anything odd is drift, not a hard error
    let raw = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(match raw {
      Some(JsonValue::String(s)) => MarkerFlag::parse_lenient(&s),
      _ => MarkerFlag::Unmarked,
    })
  }
}

/// Batch operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
  /// Add furigana
  Add,
  /// Remove furigana
  Remove,
}

impl Operation {
  /// Short lowercase label ("add" / "remove")
  pub fn label(&self) -> &'static str {
    match self {
      Operation::Add => "add",
      Operation::Remove => "remove",
    }
  }
}

impl fmt::Display for Operation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl FromStr for Operation {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "add" => Ok(Operation::Add),
      "remove" | "del" | "delete" => Ok(Operation::Remove),
      other => Err(format!("Unknown operation: {other}. Valid values: add, remove")),
    }
  }
}

/// A flashcard-like record holding the text subject to annotation.
///
/// The record store owns records; the pipeline holds a copy for one
/// transform + commit and hands it back through `RecordStore::commit_record`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
  /// Record ID
  pub id: RecordId,

  /// Category the record belongs to (e.g. "Words")
  #[serde(default)]
  pub category: String,

  /// Text field subject to annotation
  pub primary_text: String,

  /// Persisted marker flag
  #[serde(default)]
  pub marker: MarkerFlag,

  /// Fields not consumed by the pipeline
  #[serde(flatten)]
  pub extra: Metadata,
}

/// Implementation block for Record
impl Record {
  /// Constructor for Record (unmarked, no category)
  pub fn new(id: impl Into<RecordId>, primary_text: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      category: String::new(),
      primary_text: primary_text.into(),
      marker: MarkerFlag::Unmarked,
      extra: Metadata::default(),
    }
  }

  /// Builder that sets the category and returns Self
  #[must_use]
  pub fn with_category(mut self, category: impl Into<String>) -> Self {
    self.category = category.into();
    self
  }

  /// Builder that sets the marker flag and returns Self
  #[must_use]
  pub fn with_marker(mut self, marker: MarkerFlag) -> Self {
    self.marker = marker;
    self
  }

  /// Builder that adds one untouched field and returns Self
  #[must_use]
  pub fn with_extra(mut self, key: impl Into<String>, value: JsonValue) -> Self {
    self.extra.insert(key.into(), value);
    self
  }
}
