/*! Text offsets, ranges and boundaries. */

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Character range within text. End is exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TextRange {
  /// Start offset (inclusive).
  pub start: i32,
  /// End offset (exclusive).
  pub end: i32,
}

impl TextRange {
  pub const fn new(start: i32, end: i32) -> Self {
    Self { start, end }
  }

  /// Same range with `start <= end`, swapping reversed offsets.
  ///
  /// ```
  /// use atspio::TextRange;
  ///
  /// assert_eq!(TextRange::new(10, 3).normalized(), TextRange::new(3, 10));
  /// ```
  pub const fn normalized(self) -> Self {
    if self.start > self.end {
      Self {
        start: self.end,
        end: self.start,
      }
    } else {
      self
    }
  }

  /// Length in characters (zero for reversed ranges).
  pub const fn len(&self) -> i32 {
    if self.end > self.start {
      self.end - self.start
    } else {
      0
    }
  }

  /// Cursor position, no selection.
  pub const fn is_empty(&self) -> bool {
    self.start >= self.end
  }

  pub const fn contains(&self, offset: i32) -> bool {
    offset >= self.start && offset < self.end
  }
}

impl From<(i32, i32)> for TextRange {
  fn from((start, end): (i32, i32)) -> Self {
    Self { start, end }
  }
}

/// Text boundary used by text-at-offset queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextBoundary {
  Char,
  WordStart,
  WordEnd,
  SentenceStart,
  SentenceEnd,
  LineStart,
  LineEnd,
}

impl TextBoundary {
  /// Wire value of the boundary type.
  pub const fn wire_code(self) -> u32 {
    match self {
      Self::Char => 0,
      Self::WordStart => 1,
      Self::WordEnd => 2,
      Self::SentenceStart => 3,
      Self::SentenceEnd => 4,
      Self::LineStart => 5,
      Self::LineEnd => 6,
    }
  }
}

/// Text returned for a boundary query, with the resolved offsets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSegment {
  pub text: String,
  pub range: TextRange,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reversed_range_is_swapped() {
    assert_eq!(TextRange::new(10, 3).normalized(), TextRange::new(3, 10));
  }

  #[test]
  fn ordered_range_is_unchanged() {
    assert_eq!(TextRange::new(3, 10).normalized(), TextRange::new(3, 10));
  }

  #[test]
  fn caret_range_is_empty() {
    let caret = TextRange::new(4, 4);
    assert!(caret.is_empty());
    assert_eq!(caret.len(), 0);
    assert!(!caret.contains(4));
  }

  #[test]
  fn boundary_codes_follow_wire_order() {
    assert_eq!(TextBoundary::Char.wire_code(), 0);
    assert_eq!(TextBoundary::WordStart.wire_code(), 1);
    assert_eq!(TextBoundary::LineEnd.wire_code(), 6);
  }
}

#[cfg(test)]
mod proptests {
  use super::*;
  use proptest::prelude::*;

  proptest! {
    #[test]
    fn normalized_is_ordered(start in -1000..1000i32, end in -1000..1000i32) {
      let r = TextRange::new(start, end).normalized();
      prop_assert!(r.start <= r.end);
      prop_assert_eq!(r.start, start.min(end));
      prop_assert_eq!(r.end, start.max(end));
    }

    #[test]
    fn normalized_is_idempotent(start in -1000..1000i32, end in -1000..1000i32) {
      let once = TextRange::new(start, end).normalized();
      prop_assert_eq!(once.normalized(), once);
    }
  }
}
