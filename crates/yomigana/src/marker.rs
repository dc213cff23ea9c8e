//! State Marker
//!
//! レコードごとの「ふりがな適用済みか」フラグを扱う。
//! 再実行を冪等にする唯一のゲートであり、ADD の二重付与と REMOVE の二重除去を防ぐ。

use crate::models::{MarkerFlag, Operation, Record};

/// `operation` をこのレコードに適用すべきか
///
/// - `Add`: `marker != Annotated`
/// - `Remove`: `marker == Annotated`
pub fn is_eligible(record: &Record, operation: Operation) -> bool {
  match operation {
    Operation::Add => record.marker != MarkerFlag::Annotated,
    Operation::Remove => record.marker == MarkerFlag::Annotated,
  }
}

/// `operation` のコミット後に記録するフラグ
pub fn advance(operation: Operation) -> MarkerFlag {
  match operation {
    Operation::Add => MarkerFlag::Annotated,
    Operation::Remove => MarkerFlag::Unmarked,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn add_is_eligible_only_when_not_annotated() {
    let unmarked = Record::new(1, "食べる");
    let annotated = Record::new(2, "食[た]べる").with_marker(MarkerFlag::Annotated);

    assert!(is_eligible(&unmarked, Operation::Add));
    assert!(!is_eligible(&annotated, Operation::Add));
  }

  #[test]
  fn remove_is_eligible_only_when_annotated() {
    let unmarked = Record::new(1, "食べる");
    let annotated = Record::new(2, "食[た]べる").with_marker(MarkerFlag::Annotated);

    assert!(!is_eligible(&unmarked, Operation::Remove));
    assert!(is_eligible(&annotated, Operation::Remove));
  }

  #[test]
  fn advance_sets_flag_for_operation() {
    assert_eq!(advance(Operation::Add), MarkerFlag::Annotated);
    assert_eq!(advance(Operation::Remove), MarkerFlag::Unmarked);
  }
}
