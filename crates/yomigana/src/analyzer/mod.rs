//! analyzer モジュール
//!
//! 平文を受け取り、読み（ふりがな）付きのセグメント列を返す解析器の境界を定義する。
//! 本番実装は vibrato-rkyv を用いた [`VibratoReadingAnalyzer`]。
pub mod vibrato_analyzer;

use crate::config::AnnotationOptions;
use crate::errors::AnalyzerError;
use crate::models::Analysis;

/// 再エクスポート
pub use vibrato_analyzer::{VibratoReadingAnalyzer, segment_from_feature};

/// 解析対象テキストの最大長（バイト単位）
///
/// 10MB までのテキストを許可する。
pub const MAX_TEXT_LENGTH: usize = 10_000_000;

/// 読み解析の共通インターフェース
///
/// 本番実装（`VibratoReadingAnalyzer`）とテスト用スタブを差し替えられるようにする。
/// 入力は変更せず、`(plain, options)` に対して決定的な結果を返すこと。
pub trait ReadingAnalyzer: Send + Sync {
  /// 平文を解析して読み付きセグメント列を返す
  ///
  /// # Errors
  /// 入力が不正な場合は `AnalyzerError`（バッチ中はレコード単位で捕捉される）
  fn analyze(&self, plain: &str, options: &AnnotationOptions) -> Result<Analysis, AnalyzerError>;
}

/// 辞書素性（feature）のどの列から読みを取るか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingField {
  /// 読みを取る列
  pub primary: usize,
  /// `primary` が欠けている場合に使う列
  pub fallback: Option<usize>,
}

impl ReadingField {
  /// IPADIC: 品詞,品詞細分類1,品詞細分類2,品詞細分類3,活用型,活用形,原形,読み,発音
  pub const IPADIC: Self = Self {
    primary: 7,
    fallback: None,
  };

  /// UniDic: 列20 が仮名形出現形（kana）、短い素性では列9（pron）
  pub const UNIDIC: Self = Self {
    primary: 20,
    fallback: Some(9),
  };

  /// 素性列から読みを取り出す（`*` や空は読みなしとみなす）
  pub fn extract<'a>(&self, columns: &[&'a str]) -> Option<&'a str> {
    let pick = |idx: usize| columns.get(idx).copied().filter(|v| !v.is_empty() && *v != "*");
    pick(self.primary).or_else(|| self.fallback.and_then(pick))
  }
}

/// 解析前の入力検証
///
/// # Errors
/// - NUL 文字を含む: `AnalyzerError::InvalidInput`
/// - `MAX_TEXT_LENGTH` を超える: `AnalyzerError::TextTooLong`
pub fn validate_input(text: &str) -> Result<(), AnalyzerError> {
  if text.len() > MAX_TEXT_LENGTH {
    return Err(AnalyzerError::TextTooLong {
      actual: text.len(),
      max: MAX_TEXT_LENGTH,
    });
  }
  if text.contains('\0') {
    return Err(AnalyzerError::InvalidInput {
      reason: "NUL 文字を含むテキストは解析できません".to_string(),
    });
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extract_skips_asterisk_and_uses_fallback() {
    let field = ReadingField {
      primary: 2,
      fallback: Some(1),
    };
    assert_eq!(field.extract(&["a", "b", "*"]), Some("b"));
    assert_eq!(field.extract(&["a", "b", "c"]), Some("c"));
    assert_eq!(field.extract(&["a"]), None);
  }

  #[test]
  fn validate_input_rejects_nul() {
    let err = validate_input("食べ\0る").unwrap_err();
    assert!(matches!(err, AnalyzerError::InvalidInput { .. }));
  }

  #[test]
  fn validate_input_rejects_too_long_text() {
    let long_text = "a".repeat(MAX_TEXT_LENGTH + 1);
    match validate_input(&long_text).unwrap_err() {
      AnalyzerError::TextTooLong { actual, max } => {
        assert_eq!(actual, MAX_TEXT_LENGTH + 1);
        assert_eq!(max, MAX_TEXT_LENGTH);
      }
      other => panic!("expected TextTooLong, got {other:?}"),
    }
  }

  #[test]
  fn validate_input_accepts_empty_and_normal_text() {
    assert!(validate_input("").is_ok());
    assert!(validate_input("東京タワー").is_ok());
  }
}
