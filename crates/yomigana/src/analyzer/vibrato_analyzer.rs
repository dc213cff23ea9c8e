//! Reading analyzer using vibrato

use std::sync::Arc;
use tracing::debug;
use vibrato_rkyv::Dictionary;
use vibrato_rkyv::Tokenizer as VibratoImpl;

use crate::analyzer::{ReadingAnalyzer, ReadingField, validate_input};
use crate::codec::kana::{is_numeric_surface, to_hiragana};
use crate::config::AnnotationOptions;
use crate::errors::AnalyzerError;
use crate::models::{Analysis, Segment};

/// Reading analyzer backed by Vibrato-rkyv
///
/// - Stateless (only holds dictionary reference)
/// - `Clone + Send + Sync`
/// - A fresh worker is created for every call, so one instance can serve any thread
#[derive(Clone)]
pub struct VibratoReadingAnalyzer {
  inner: VibratoImpl,
  reading_field: ReadingField,
}

impl VibratoReadingAnalyzer {
  /// Constructs an analyzer from an already loaded Dictionary
  pub fn from_dictionary(dict: Dictionary, reading_field: ReadingField) -> Self {
    Self {
      inner: VibratoImpl::new(dict),
      reading_field,
    }
  }

  /// Constructs an analyzer from a shared dictionary (`Arc<Dictionary>`).
  ///
  /// Use this when the dictionary is shared via `Arc`, such as `DictionaryManager::load()`.
  ///
  /// # Examples
  /// ```rust,no_run
  /// # use yomigana::analyzer::{ReadingField, VibratoReadingAnalyzer};
  /// # use yomigana::dictionary::DictionaryManager;
  /// # use vibrato_rkyv::dictionary::PresetDictionaryKind;
  /// let manager = DictionaryManager::with_preset(PresetDictionaryKind::Ipadic).unwrap();
  /// let dict = manager.load().unwrap();
  /// let analyzer = VibratoReadingAnalyzer::from_shared_dictionary(dict, ReadingField::IPADIC);
  /// ```
  pub fn from_shared_dictionary(dict: Arc<Dictionary>, reading_field: ReadingField) -> Self {
    Self {
      inner: VibratoImpl::from_shared_dictionary(dict),
      reading_field,
    }
  }

  /// Feature column(s) the reading is taken from
  pub fn reading_field(&self) -> ReadingField {
    self.reading_field
  }
}

impl ReadingAnalyzer for VibratoReadingAnalyzer {
  fn analyze(&self, plain: &str, options: &AnnotationOptions) -> Result<Analysis, AnalyzerError> {
    validate_input(plain)?;
    if plain.is_empty() {
      return Ok(Analysis::default());
    }

    // worker holds lattice for analysis and calculation area.
    // Created each time
    let mut worker = self.inner.new_worker();
    worker.reset_sentence(plain);
    worker.tokenize();

    debug!(text_len = plain.len(), tokens = worker.num_tokens(), "Start reading analysis");

    let mut segments = Vec::with_capacity(worker.num_tokens());
    // Byte position up to which the input is covered by segments
    let mut cursor = 0;

    for token in worker.token_iter() {
      let range = token.range_byte();

      // Keep anything the tokenizer skipped (e.g. whitespace) so segments cover the input
      if range.start > cursor {
        segments.push(Segment::plain(&plain[cursor..range.start]));
      }

      let mut segment = segment_from_feature(token.surface(), token.feature(), self.reading_field);
      if options.ignore_numbers && segment.numeric {
        segment.reading = None;
      }

      debug!(
        surface = %segment.surface,
        reading = ?segment.reading,
        numeric = segment.numeric,
        start = range.start,
        end = range.end,
        "Token"
      );

      segments.push(segment);
      cursor = range.end;
    }

    if cursor < plain.len() {
      segments.push(Segment::plain(&plain[cursor..]));
    }

    Ok(Analysis::new(segments))
  }
}

/// Builds a segment from a token surface and its dictionary feature string.
///
/// The reading column is converted from katakana to hiragana. A token is numeric when its
/// part of speech is `名詞,数` (IPADIC) / `名詞,数詞` (UniDic) or its surface is a numeral.
pub fn segment_from_feature(surface: &str, feature: &str, field: ReadingField) -> Segment {
  let columns: Vec<&str> = feature.split(',').collect();
  let reading = field.extract(&columns).map(to_hiragana);
  let numeric = feature.starts_with("名詞,数") || is_numeric_surface(surface);

  Segment {
    surface: surface.to_string(),
    reading,
    numeric,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  /// Verify that the IPADIC reading column is converted to hiragana
  #[test]
  fn ipadic_verb_reading() {
    let seg = segment_from_feature(
      "食べる",
      "動詞,自立,*,*,一段,基本形,食べる,タベル,タベル",
      ReadingField::IPADIC,
    );
    assert_eq!(seg.surface, "食べる");
    assert_eq!(seg.reading.as_deref(), Some("たべる"));
    assert!(!seg.numeric);
  }

  /// Verify that unknown words (short feature, no reading column) have no reading
  #[test]
  fn ipadic_unknown_word_has_no_reading() {
    let seg = segment_from_feature("ＸＹＺ", "名詞,固有名詞,組織,*,*,*,*", ReadingField::IPADIC);
    assert_eq!(seg.reading, None);
  }

  /// Verify that `*` in the reading column means no reading
  #[test]
  fn asterisk_reading_is_none() {
    let seg = segment_from_feature("鬱", "名詞,一般,*,*,*,*,*,*,*", ReadingField::IPADIC);
    assert_eq!(seg.reading, None);
  }

  /// Verify that IPADIC numerals are flagged
  #[test]
  fn ipadic_numeral_is_numeric() {
    let seg = segment_from_feature("三", "名詞,数,*,*,*,*,三,サン,サン", ReadingField::IPADIC);
    assert!(seg.numeric);
    assert_eq!(seg.reading.as_deref(), Some("さん"));
  }

  /// Verify that the UniDic kana column is preferred over pron
  #[test]
  fn unidic_prefers_kana_column() {
    let feature = "名詞,固有名詞,地名,一般,*,*,トウキョウ,トウキョウ,東京,トーキョー,東京,トーキョー,固,*,*,*,*,*,*,地名,トウキョウ,トウキョウ,トウキョウ,トウキョウ,0,*,*,7364438591578624,26791";
    let seg = segment_from_feature("東京", feature, ReadingField::UNIDIC);
    assert_eq!(seg.reading.as_deref(), Some("とうきょう"));
  }

  /// Verify that UniDic falls back to pron when the kana column is missing
  #[test]
  fn unidic_falls_back_to_pron() {
    let feature = "名詞,数詞,*,*,*,*,サン,三,三,サン,三,サン,漢";
    let seg = segment_from_feature("三", feature, ReadingField::UNIDIC);
    assert_eq!(seg.reading.as_deref(), Some("さん"));
    assert!(seg.numeric);
  }

  /// Verify that digit surfaces are numeric even without a numeral POS
  #[test]
  fn digit_surface_is_numeric() {
    let seg = segment_from_feature("2024", "名詞,一般,*,*,*,*,*", ReadingField::IPADIC);
    assert!(seg.numeric);
  }
}
