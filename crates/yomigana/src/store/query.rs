//! Selection query
//!
//! `category:Words marker:unmarked` のような空白区切りの検索式を解釈する。
//! すべての項が AND で結合される。空白を含む値は `deck:"My Deck"` または
//! `"deck:My Deck"` のように二重引用符で囲む。

use crate::errors::StoreError;
use crate::models::{MarkerFlag, Record, RecordId};

/// 検索式の1項
#[derive(Debug, Clone, PartialEq, Eq)]
enum Term {
  /// `category:<name>` / `deck:<name>`
  Category(String),
  /// `marker:annotated|unmarked`
  Marker(MarkerFlag),
  /// `id:<n>`
  Id(RecordId),
}

/// 解釈済みの検索式
///
/// 空の式と `*` はすべてのレコードに一致する。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordQuery {
  terms: Vec<Term>,
}

impl RecordQuery {
  /// すべてのレコードに一致する検索式
  pub fn all() -> Self {
    Self::default()
  }

  /// 検索式を解釈する
  ///
  /// # Errors
  /// 未知のキー、値の欠落、不正な値、閉じていない引用符は `StoreError::InvalidQuery`
  pub fn parse(raw: &str) -> Result<Self, StoreError> {
    let invalid = |reason: String| StoreError::InvalidQuery {
      query: raw.to_string(),
      reason,
    };

    let tokens = tokenize(raw).ok_or_else(|| invalid("引用符が閉じていません".to_string()))?;

    let mut terms = Vec::new();
    for token in &tokens {
      let token = token.as_str();
      if token == "*" {
        continue;
      }

      let (key, value) = token
        .split_once(':')
        .ok_or_else(|| invalid(format!("`key:value` 形式ではありません: {token}")))?;
      if value.is_empty() {
        return Err(invalid(format!("値がありません: {token}")));
      }

      let term = match key.to_ascii_lowercase().as_str() {
        "category" | "deck" => Term::Category(value.to_string()),
        "marker" => match value.to_ascii_lowercase().as_str() {
          "annotated" => Term::Marker(MarkerFlag::Annotated),
          "unmarked" => Term::Marker(MarkerFlag::Unmarked),
          other => return Err(invalid(format!("marker は annotated か unmarked です: {other}"))),
        },
        "id" => {
          let id = value
            .parse::<RecordId>()
            .map_err(|e| invalid(format!("id が数値ではありません: {value} ({e})")))?;
          Term::Id(id)
        }
        other => return Err(invalid(format!("未知のキーです: {other}"))),
      };
      terms.push(term);
    }

    Ok(Self { terms })
  }

  /// すべてのレコードに一致するか
  pub fn is_all(&self) -> bool {
    self.terms.is_empty()
  }

  /// レコードが検索式に一致するか
  pub fn matches(&self, record: &Record) -> bool {
    self.terms.iter().all(|term| match term {
      Term::Category(name) => record.category == *name,
      Term::Marker(flag) => record.marker == *flag,
      Term::Id(id) => record.id == *id,
    })
  }
}

/// 空白で区切り、二重引用符の内側の空白は値として残す
///
/// 引用符そのものは取り除く。閉じていない引用符があれば `None`。
fn tokenize(raw: &str) -> Option<Vec<String>> {
  let mut tokens = Vec::new();
  let mut current = String::new();
  let mut in_quotes = false;
  let mut has_token = false;

  for c in raw.chars() {
    match c {
      '"' => {
        in_quotes = !in_quotes;
        has_token = true;
      }
      c if c.is_whitespace() && !in_quotes => {
        if has_token {
          tokens.push(std::mem::take(&mut current));
          has_token = false;
        }
      }
      c => {
        current.push(c);
        has_token = true;
      }
    }
  }

  if in_quotes {
    return None;
  }
  if has_token {
    tokens.push(current);
  }
  Some(tokens)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn words(id: u64, marker: MarkerFlag) -> Record {
    Record::new(id, "食べる").with_category("Words").with_marker(marker)
  }

  #[test]
  fn empty_and_star_match_everything() {
    for raw in ["", "   ", "*"] {
      let q = RecordQuery::parse(raw).unwrap();
      assert!(q.is_all(), "raw={raw:?}");
      assert!(q.matches(&Record::new(1, "x")));
    }
  }

  #[test]
  fn deck_is_an_alias_of_category() {
    let a = RecordQuery::parse("deck:Words").unwrap();
    let b = RecordQuery::parse("category:Words").unwrap();
    assert_eq!(a, b);
    assert!(a.matches(&words(1, MarkerFlag::Unmarked)));
    assert!(!a.matches(&Record::new(2, "猫").with_category("Phrases")));
  }

  #[test]
  fn terms_are_combined_with_and() {
    let q = RecordQuery::parse("category:Words marker:annotated").unwrap();
    assert!(q.matches(&words(1, MarkerFlag::Annotated)));
    assert!(!q.matches(&words(2, MarkerFlag::Unmarked)));
  }

  #[test]
  fn id_term_matches_single_record() {
    let q = RecordQuery::parse("id:7").unwrap();
    assert!(q.matches(&Record::new(7, "x")));
    assert!(!q.matches(&Record::new(8, "x")));
  }

  #[test]
  fn invalid_queries_are_rejected() {
    for raw in ["Words", "tag:foo", "marker:maybe", "id:abc", "category:", "category:\"\""] {
      let err = RecordQuery::parse(raw).unwrap_err();
      assert!(matches!(err, StoreError::InvalidQuery { .. }), "raw={raw:?}");
    }
  }

  #[test]
  fn quoted_category_keeps_its_spaces() {
    let record = Record::new(1, "猫").with_category("My Deck");

    for raw in [
      r#"deck:"My Deck""#,
      r#""deck:My Deck""#,
      r#"category:"My Deck" marker:unmarked"#,
    ] {
      let q = RecordQuery::parse(raw).unwrap();
      assert!(q.matches(&record), "raw={raw:?}");
      assert!(!q.matches(&Record::new(2, "猫").with_category("My")), "raw={raw:?}");
    }
  }

  #[test]
  fn unquoted_space_still_splits_terms() {
    let err = RecordQuery::parse("deck:My Deck").unwrap_err();
    assert!(matches!(err, StoreError::InvalidQuery { .. }));
  }

  #[test]
  fn unterminated_quote_is_rejected() {
    let err = RecordQuery::parse(r#"deck:"My Deck"#).unwrap_err();
    match err {
      StoreError::InvalidQuery { reason, .. } => assert!(reason.contains("引用符")),
      other => panic!("unexpected error: {other:?}"),
    }
  }
}
