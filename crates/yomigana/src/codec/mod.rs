//! codec モジュール
//!
//! ふりがなマークアップの除去（strip）と、解析結果からのマークアップ生成（render）を行う。
//! 外部依存を持たない純粋なテキスト変換のみを扱う。
pub mod kana;
pub mod markup;

/// 再エクスポート
pub use markup::{contains_markup, render, strip};
