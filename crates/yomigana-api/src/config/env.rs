//! Config loading from environment variables

use std::path::PathBuf;
use std::str::FromStr;

use yomigana::config::{
  AnnotationOptions, DictionaryPreset, LogLevel, MarkupStyle, StoreConfig, YomiganaConfig,
};

use super::constants::{DEFAULT_BIND_ADDR, DEFAULT_PRESET_DICT, DEFAULT_STORE_PATH};
use crate::errors::ApiError;
use yomigana::config::DEFAULT_QUERY;

/// API Server Configuration
#[derive(Debug, Clone)]
pub struct Config {
  /// Bind address (e.g. "127.0.0.1:5540")
  pub bind_addr: String,
  /// Dictionary preset to use
  pub preset: DictionaryPreset,
  /// Dictionary cache directory (`None` = OS default)
  pub dict_cache_dir: Option<PathBuf>,
  /// JSON record store file
  pub store_path: PathBuf,
  /// Query used when a request does not carry one
  pub default_query: String,
  /// Initial annotation settings (toggled later through `PUT /settings`)
  pub annotation: AnnotationOptions,
  /// Pause between two records in milliseconds
  pub step_interval_ms: u64,
  /// Log level used when `RUST_LOG` is not set
  pub log_level: LogLevel,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      bind_addr: DEFAULT_BIND_ADDR.to_string(),
      preset: DictionaryPreset::default(),
      dict_cache_dir: None,
      store_path: PathBuf::from(DEFAULT_STORE_PATH),
      default_query: DEFAULT_QUERY.to_string(),
      annotation: AnnotationOptions::default(),
      step_interval_ms: 0,
      log_level: LogLevel::default(),
    }
  }
}

impl Config {
  /// Loads configuration from environment variables
  ///
  /// | Variable | Default |
  /// |----------|---------|
  /// | `YOMIGANA_API_BASE_URL` | `127.0.0.1:5540` |
  /// | `YOMIGANA_PRESET_DICT` | `ipadic` |
  /// | `YOMIGANA_DICT_CACHE_DIR` | OS cache dir |
  /// | `YOMIGANA_STORE_PATH` | `./data/records.json` |
  /// | `YOMIGANA_DEFAULT_QUERY` | `category:Words` |
  /// | `YOMIGANA_IGNORE_NUMBERS` | `false` |
  /// | `YOMIGANA_MARKUP_STYLE` | `inline` |
  /// | `YOMIGANA_STEP_INTERVAL_MS` | `0` |
  /// | `YOMIGANA_LOG_LEVEL` | `info` |
  ///
  /// # Errors
  /// Returns an error if environment variable values are invalid
  pub fn from_env() -> crate::errors::Result<Self> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Loads configuration through an arbitrary variable lookup
  ///
  /// `std::env::set_var` is unsafe in Rust 2024, so tests pass a map instead.
  ///
  /// # Errors
  /// Returns an error if a value cannot be parsed
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> crate::errors::Result<Self> {
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let bind_addr = var("YOMIGANA_API_BASE_URL").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

    let preset_dict_str =
      var("YOMIGANA_PRESET_DICT").unwrap_or_else(|| DEFAULT_PRESET_DICT.to_string());
    let preset = DictionaryPreset::from_str(&preset_dict_str).map_err(ApiError::config)?;

    let dict_cache_dir = var("YOMIGANA_DICT_CACHE_DIR").map(PathBuf::from);

    let store_path =
      PathBuf::from(var("YOMIGANA_STORE_PATH").unwrap_or_else(|| DEFAULT_STORE_PATH.to_string()));

    let default_query = var("YOMIGANA_DEFAULT_QUERY").unwrap_or_else(|| DEFAULT_QUERY.to_string());

    let ignore_numbers = match var("YOMIGANA_IGNORE_NUMBERS") {
      Some(raw) => parse_bool("YOMIGANA_IGNORE_NUMBERS", &raw)?,
      None => false,
    };

    let markup_style = match var("YOMIGANA_MARKUP_STYLE") {
      Some(raw) => MarkupStyle::from_str(&raw).map_err(ApiError::config)?,
      None => MarkupStyle::default(),
    };

    let step_interval_ms = match var("YOMIGANA_STEP_INTERVAL_MS") {
      Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
        ApiError::config(format!("YOMIGANA_STEP_INTERVAL_MS must be an integer: {raw} ({e})"))
      })?,
      None => 0,
    };

    let log_level = match var("YOMIGANA_LOG_LEVEL") {
      Some(raw) => LogLevel::from_str(&raw).map_err(ApiError::config)?,
      None => LogLevel::default(),
    };

    Ok(Self {
      bind_addr,
      preset,
      dict_cache_dir,
      store_path,
      default_query,
      annotation: AnnotationOptions {
        ignore_numbers,
        markup_style,
      },
      step_interval_ms,
      log_level,
    })
  }

  /// Builds the core library configuration
  #[must_use]
  pub fn to_yomigana_config(&self) -> YomiganaConfig {
    let mut config = YomiganaConfig::default();
    config.dictionary.preset = self.preset;
    config.dictionary.cache_dir = self.dict_cache_dir.clone();
    config.annotation = self.annotation;
    config.store = StoreConfig {
      path: self.store_path.clone(),
      default_query: self.default_query.clone(),
    };
    config.batch.step_interval_ms = self.step_interval_ms;
    config.logging.level = self.log_level;
    config
  }
}

fn parse_bool(key: &str, raw: &str) -> crate::errors::Result<bool> {
  match raw.trim().to_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Ok(true),
    "0" | "false" | "no" | "off" => Ok(false),
    _ => Err(ApiError::config(format!("{key} must be a boolean: {raw}"))),
  }
}
