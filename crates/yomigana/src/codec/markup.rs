//! Furigana markup: strip existing annotations, render analyzer output.
//!
//! Two markup forms are understood:
//!
//! | style  | example                                        |
//! |--------|------------------------------------------------|
//! | inline | `食[た]べる 飲[の]む`                           |
//! | ruby   | `<ruby><rb>食</rb><rt>た</rt></ruby>べる`       |
//!
//! In the inline form a single space in front of an annotated base separates it from the
//! preceding text. [`render`] always inserts that space (except at the very start of the
//! output) and [`strip`] always removes it, which makes `strip(render(a)) == a.plain()`
//! hold for any analysis whose text does not already contain bracket groups or ruby tags.

use std::sync::LazyLock;

use regex::Regex;

use crate::codec::kana::{contains_kanji, is_kanji, kana_eq};
use crate::config::{AnnotationOptions, MarkupStyle};
use crate::models::{Analysis, Segment};

/// `<rt>…</rt>` and `<rp>…</rp>` spans, removed with their content
static RUBY_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?is)<r[tp]\b[^>]*>.*?</r[tp]\s*>").expect("ruby annotation pattern should compile")
});

/// `<ruby>`, `</ruby>`, `<rb>`, `</rb>`, removed keeping their content
static RUBY_TAG: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)</?(?:ruby|rb)\b[^>]*>").expect("ruby tag pattern should compile")
});

/// ` base[reading]` groups; capture 1 is the base
static INLINE_GROUP: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r" ?([^ >\[\]]+)\[[^\[\]]*\]").expect("inline furigana pattern should compile")
});

/// Characters a base or reading must not contain to survive a strip unchanged
const RESERVED: &[char] = &[' ', '>', '<', '[', ']'];

/// Removes every recognized furigana annotation, keeping the annotated base text.
///
/// Both markup styles are removed regardless of the configured style.
pub fn strip(text: &str) -> String {
  let without_ruby = RUBY_ANNOTATION.replace_all(text, "");
  let without_ruby = RUBY_TAG.replace_all(&without_ruby, "");
  INLINE_GROUP.replace_all(&without_ruby, "$1").into_owned()
}

/// Whether the text carries any furigana markup
pub fn contains_markup(text: &str) -> bool {
  RUBY_ANNOTATION.is_match(text) || INLINE_GROUP.is_match(text)
}

/// Renders analyzer output into the configured markup form.
///
/// Segments without kanji, without a reading, or numerals under `ignore_numbers` are
/// copied verbatim, so text without kanji comes back unchanged.
pub fn render(analysis: &Analysis, options: &AnnotationOptions) -> String {
  let mut out = String::with_capacity(analysis.segments.iter().map(|s| s.surface.len() * 3).sum());

  for segment in &analysis.segments {
    match annotation_parts(segment, options) {
      Some(parts) => {
        out.push_str(parts.head);
        push_annotation(&mut out, parts.base, parts.reading, options.markup_style);
        out.push_str(parts.tail);
      }
      None => out.push_str(&segment.surface),
    }
  }

  out
}

/// Surface split around the part that receives a reading
#[derive(Debug, PartialEq, Eq)]
struct AnnotationParts<'a> {
  /// Leading kana shared with the reading (e.g. `お` of `お茶`)
  head: &'a str,
  /// Part that receives the reading
  base: &'a str,
  /// Reading of `base`
  reading: &'a str,
  /// Trailing kana shared with the reading (okurigana, e.g. `べる` of `食べる`)
  tail: &'a str,
}

fn annotation_parts<'a>(
  segment: &'a Segment,
  options: &AnnotationOptions,
) -> Option<AnnotationParts<'a>> {
  let reading = segment.reading.as_deref()?;
  if !contains_kanji(&segment.surface) || (options.ignore_numbers && segment.numeric) {
    return None;
  }

  let parts = split_okurigana(&segment.surface, reading)?;
  if parts.base.contains(RESERVED) || parts.reading.contains(RESERVED) {
    return None;
  }
  Some(parts)
}

/// Strips the kana prefix and suffix the surface shares with its reading.
///
/// `食べる` / `たべる` → head ``, base `食`, reading `た`, tail `べる`.
/// Returns `None` when nothing is left to annotate.
fn split_okurigana<'a>(surface: &'a str, reading: &'a str) -> Option<AnnotationParts<'a>> {
  let s: Vec<(usize, char)> = surface.char_indices().collect();
  let r: Vec<(usize, char)> = reading.char_indices().collect();

  let mut tail = 0;
  while tail < s.len() && tail < r.len() {
    let sc = s[s.len() - 1 - tail].1;
    let rc = r[r.len() - 1 - tail].1;
    if is_kanji(sc) || !kana_eq(sc, rc) {
      break;
    }
    tail += 1;
  }

  let mut head = 0;
  while head + tail < s.len() && head + tail < r.len() {
    let sc = s[head].1;
    let rc = r[head].1;
    if is_kanji(sc) || !kana_eq(sc, rc) {
      break;
    }
    head += 1;
  }

  let byte_at = |chars: &[(usize, char)], idx: usize, len: usize| {
    chars.get(idx).map_or(len, |&(pos, _)| pos)
  };
  let s_start = byte_at(&s, head, surface.len());
  let s_end = byte_at(&s, s.len() - tail, surface.len());
  let r_start = byte_at(&r, head, reading.len());
  let r_end = byte_at(&r, r.len() - tail, reading.len());

  if s_start >= s_end || r_start >= r_end {
    return None;
  }

  Some(AnnotationParts {
    head: &surface[..s_start],
    base: &surface[s_start..s_end],
    reading: &reading[r_start..r_end],
    tail: &surface[s_end..],
  })
}

fn push_annotation(out: &mut String, base: &str, reading: &str, style: MarkupStyle) {
  match style {
    MarkupStyle::Inline => {
      if !out.is_empty() {
        out.push(' ');
      }
      out.push_str(base);
      out.push('[');
      out.push_str(reading);
      out.push(']');
    }
    MarkupStyle::Ruby => {
      out.push_str("<ruby><rb>");
      out.push_str(base);
      out.push_str("</rb><rt>");
      out.push_str(reading);
      out.push_str("</rt></ruby>");
    }
  }
}
