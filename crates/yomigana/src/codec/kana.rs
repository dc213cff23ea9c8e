//! Character classification and kana conversion

/// Offset between a katakana code point and its hiragana counterpart
const KATAKANA_TO_HIRAGANA: u32 = 0x60;

/// Kanji numerals accepted by [`is_numeric_surface`]
const KANJI_NUMERALS: &str = "〇一二三四五六七八九十百千万億兆";

/// Whether `c` is a kanji (or a kanji iteration/abbreviation mark that needs a reading)
pub fn is_kanji(c: char) -> bool {
  matches!(c,
    '\u{3400}'..='\u{4DBF}'    // CJK Extension A
    | '\u{4E00}'..='\u{9FFF}'  // CJK Unified Ideographs
    | '\u{F900}'..='\u{FAFF}'  // CJK Compatibility Ideographs
    | '\u{20000}'..='\u{2FA1F}' // Extensions B.. and supplement
    | '々' | '〆'
  )
}

/// Whether the text contains at least one kanji
pub fn contains_kanji(text: &str) -> bool {
  text.chars().any(is_kanji)
}

/// Converts one katakana character to hiragana; other characters are returned as-is
pub fn katakana_to_hiragana(c: char) -> char {
  match c {
    'ァ'..='ヶ' | 'ヽ' | 'ヾ' => char::from_u32(c as u32 - KATAKANA_TO_HIRAGANA).unwrap_or(c),
    _ => c,
  }
}

/// Converts every katakana character of `text` to hiragana.
///
/// The prolonged sound mark `ー` and characters outside the katakana block are kept.
pub fn to_hiragana(text: &str) -> String {
  text.chars().map(katakana_to_hiragana).collect()
}

/// Whether two kana denote the same sound regardless of script
pub fn kana_eq(a: char, b: char) -> bool {
  katakana_to_hiragana(a) == katakana_to_hiragana(b)
}

/// Whether the surface is a numeral written with digits or kanji numerals
pub fn is_numeric_surface(surface: &str) -> bool {
  !surface.is_empty()
    && surface.chars().all(|c| {
      c.is_ascii_digit() || ('０'..='９').contains(&c) || KANJI_NUMERALS.contains(c)
    })
}
