// crates/yomigana/src/config.rs

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vibrato_rkyv::dictionary::PresetDictionaryKind;

use crate::analyzer::ReadingField;
use crate::errors::ConfigError;

/// Default selection query (the original add-on worked on the "Words" deck).
pub const DEFAULT_QUERY: &str = "category:Words";

/// Upper bound for `batch.step_interval_ms`.
pub const MAX_STEP_INTERVAL_MS: u64 = 60_000;

/// Markup form produced by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupStyle {
  /// Anki-style inline brackets: ` 漢字[かんじ]`
  #[default]
  Inline,
  /// HTML ruby tags: `<ruby><rb>漢字</rb><rt>かんじ</rt></ruby>`
  Ruby,
}

impl FromStr for MarkupStyle {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "inline" => Ok(Self::Inline),
      "ruby" => Ok(Self::Ruby),
      other => Err(format!("Unknown markup style: {other}. Valid values: inline, ruby")),
    }
  }
}

/// Immutable options snapshot handed to the analyzer and the renderer.
///
/// Taken once when a batch starts; later toggles are not observed by that batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnnotationOptions {
  /// Leave numerals without readings
  #[serde(default)]
  pub ignore_numbers: bool,
  /// Markup form for new annotations
  #[serde(default)]
  pub markup_style: MarkupStyle,
}

/// Process-wide, host-toggled annotation settings.
///
/// Cloning shares the same underlying value. The pipeline only ever reads it through
/// [`Settings::snapshot`].
#[derive(Debug, Clone, Default)]
pub struct Settings {
  inner: Arc<RwLock<AnnotationOptions>>,
}

impl Settings {
  /// Creates settings with the given initial values
  pub fn new(initial: AnnotationOptions) -> Self {
    Self {
      inner: Arc::new(RwLock::new(initial)),
    }
  }

  /// Returns a copy of the current values.
  ///
  /// # Errors
  /// `ConfigError::SettingsUnavailable` when a writer panicked while holding the lock.
  pub fn snapshot(&self) -> Result<AnnotationOptions, ConfigError> {
    self.inner.read().map(|guard| *guard).map_err(|_| ConfigError::SettingsUnavailable)
  }

  /// Toggles numeric-reading suppression
  pub fn set_ignore_numbers(&self, value: bool) -> Result<(), ConfigError> {
    self.update(|opts| opts.ignore_numbers = value)
  }

  /// Switches the markup style
  pub fn set_markup_style(&self, value: MarkupStyle) -> Result<(), ConfigError> {
    self.update(|opts| opts.markup_style = value)
  }

  /// Applies `f` to the current values under the write lock
  pub fn update(&self, f: impl FnOnce(&mut AnnotationOptions)) -> Result<(), ConfigError> {
    let mut guard = self.inner.write().map_err(|_| ConfigError::SettingsUnavailable)?;
    f(&mut guard);
    Ok(())
  }
}

/// Top-level configuration for yomigana.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct YomiganaConfig {
  /// [dictionary] section
  #[serde(default)]
  pub dictionary: DictionaryConfig,
  /// [annotation] section (initial values of the runtime settings)
  #[serde(default)]
  pub annotation: AnnotationOptions,
  /// [store] section
  #[serde(default)]
  pub store: StoreConfig,
  /// [batch] section
  #[serde(default)]
  pub batch: BatchConfig,
  /// [logging] section
  #[serde(default)]
  pub logging: LoggingConfig,
}

/// [dictionary] section configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DictionaryConfig {
  /// Preset dictionary type: "ipadic" | "unidic-cwj" | "unidic-csj"
  #[serde(default)]
  pub preset: DictionaryPreset,
  /// Dictionary cache directory.
  ///
  /// If omitted, the actual default is determined by `DictionaryManager`.
  #[serde(default)]
  pub cache_dir: Option<PathBuf>,
}

/// Preset dictionary type.
///
/// `PresetDictionaryKind` from vibrato-rkyv does not implement `Deserialize`, and the
/// orphan rule keeps us from adding it, so the config file uses this enum and converts
/// with `.into()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DictionaryPreset {
  /// IpaDic: The smallest
  #[default]
  Ipadic,
  /// Unidic for written language
  UnidicCwj,
  /// Unidic for spoken language
  UnidicCsj,
}

impl DictionaryPreset {
  /// Feature column(s) holding the katakana reading for this dictionary family
  pub fn reading_field(&self) -> ReadingField {
    match self {
      DictionaryPreset::Ipadic => ReadingField::IPADIC,
      DictionaryPreset::UnidicCwj | DictionaryPreset::UnidicCsj => ReadingField::UNIDIC,
    }
  }
}

impl FromStr for DictionaryPreset {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "ipadic" => Ok(Self::Ipadic),
      "unidic-cwj" => Ok(Self::UnidicCwj),
      "unidic-csj" => Ok(Self::UnidicCsj),
      _ => Err(format!(
        "Unknown preset: {}. Valid values: ipadic, unidic-cwj, unidic-csj",
        s
      )),
    }
  }
}

/// [store] section configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
  /// JSON record file (e.g., "/opt/yomigana/data/records.json")
  #[serde(default = "default_store_path")]
  pub path: PathBuf,
  /// Query used when the caller does not pass one
  #[serde(default = "default_query")]
  pub default_query: String,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      path: default_store_path(),
      default_query: default_query(),
    }
  }
}

fn default_store_path() -> PathBuf {
  PathBuf::from("data").join("records.json")
}

fn default_query() -> String {
  DEFAULT_QUERY.to_string()
}

/// [batch] section configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchConfig {
  /// Pause between two records in milliseconds (0 = no pause)
  #[serde(default)]
  pub step_interval_ms: u64,
}

/// [logging] section configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
  /// Log level: "trace" | "debug" | "info" | "warn" | "error"
  #[serde(default)]
  pub level: LogLevel,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
  /// trace
  Trace,

  /// debug
  Debug,

  /// info
  #[default]
  Info,

  /// warn
  Warn,

  ///error
  Error,
}

impl LogLevel {
  /// Directive string usable with `tracing_subscriber::EnvFilter`
  pub fn as_filter_str(&self) -> &'static str {
    match self {
      LogLevel::Trace => "trace",
      LogLevel::Debug => "debug",
      LogLevel::Info => "info",
      LogLevel::Warn => "warn",
      LogLevel::Error => "error",
    }
  }
}

impl FromStr for LogLevel {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "trace" => Ok(Self::Trace),
      "debug" => Ok(Self::Debug),
      "info" => Ok(Self::Info),
      "warn" => Ok(Self::Warn),
      "error" => Ok(Self::Error),
      other => Err(format!("Unknown log level: {other}")),
    }
  }
}

// ===== Loading & Accessor Methods =====

impl YomiganaConfig {
  /// Reads a JSON configuration file.
  ///
  /// Only parses; call [`validate`](Self::validate) before use.
  pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
      path: path.to_path_buf(),
      source: Arc::new(e),
    })?;
    Self::from_json_str(&raw)
  }

  /// Parses configuration from a JSON string.
  pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
    serde_json::from_str(raw).map_err(|e| ConfigError::Parse(Arc::new(e)))
  }

  /// Returns the preset dictionary type to pass to DictionaryManager.
  pub fn dictionary_preset(&self) -> PresetDictionaryKind {
    self.dictionary.preset.into()
  }

  /// Returns the configured dictionary cache directory.
  ///
  /// `None` if unspecified.
  pub fn dictionary_cache_dir(&self) -> Option<&Path> {
    self.dictionary.cache_dir.as_deref()
  }

  /// Returns the record store file path.
  pub fn store_path(&self) -> &Path {
    &self.store.path
  }

  /// Returns the default selection query.
  pub fn default_query(&self) -> &str {
    &self.store.default_query
  }

  /// Returns the pause between two records.
  pub fn step_interval(&self) -> Duration {
    Duration::from_millis(self.batch.step_interval_ms)
  }

  /// Returns the initial annotation settings.
  pub fn annotation_defaults(&self) -> AnnotationOptions {
    self.annotation
  }

  /// Returns the log level.
  pub fn log_level(&self) -> LogLevel {
    self.logging.level
  }

  /// Validates the configuration.
  ///
  /// # Validation Items
  /// - `store.default_query` is not blank
  /// - `store.path` does not point at a directory
  /// - `batch.step_interval_ms` <= 60 000
  /// - `dictionary.cache_dir` exists or can be created
  ///
  /// # Errors
  /// Returns the first failing `ConfigError`.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.store.default_query.trim().is_empty() {
      return Err(ConfigError::EmptyDefaultQuery);
    }

    if self.store.path.is_dir() {
      return Err(ConfigError::StorePathIsDirectory {
        path: self.store.path.clone(),
      });
    }

    if self.batch.step_interval_ms > MAX_STEP_INTERVAL_MS {
      return Err(ConfigError::InvalidStepInterval {
        max: MAX_STEP_INTERVAL_MS,
        actual: self.batch.step_interval_ms,
      });
    }

    if let Some(cache_dir) = &self.dictionary.cache_dir {
      if cache_dir.exists() {
        if !cache_dir.is_dir() {
          return Err(ConfigError::InvalidDictionaryCacheDir {
            path: cache_dir.clone(),
          });
        }
      } else if let Err(e) = std::fs::create_dir_all(cache_dir) {
        return Err(ConfigError::DictionaryCacheDirCreationFailed {
          path: cache_dir.clone(),
          source: Arc::new(e),
        });
      }
    }

    Ok(())
  }
}

impl From<DictionaryPreset> for PresetDictionaryKind {
  fn from(preset: DictionaryPreset) -> Self {
    match preset {
      DictionaryPreset::Ipadic => PresetDictionaryKind::Ipadic,
      DictionaryPreset::UnidicCwj => PresetDictionaryKind::UnidicCwj,
      DictionaryPreset::UnidicCsj => PresetDictionaryKind::UnidicCsj,
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test Module
// ─────────────────────────────────────────────────────────────────────────────
