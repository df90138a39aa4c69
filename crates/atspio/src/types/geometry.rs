/*! Geometry types for screen coordinates. */

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Rectangle in screen coordinates, as reported by extents queries.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[ts(export)]
pub struct Rect {
  pub x: i32,
  pub y: i32,
  pub w: i32,
  pub h: i32,
}

impl Rect {
  pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
    Self { x, y, w, h }
  }

  /// Zero width and zero height. Failed geometry queries report this.
  pub const fn is_null(&self) -> bool {
    self.w == 0 && self.h == 0
  }

  /// No area to speak of (either dimension non-positive).
  pub const fn is_empty(&self) -> bool {
    self.w <= 0 || self.h <= 0
  }

  /// Center point, rounded toward the origin. Saturates at the `i32` range.
  pub const fn center(&self) -> Point {
    Point {
      x: self.x.saturating_add(self.w / 2),
      y: self.y.saturating_add(self.h / 2),
    }
  }
}

/// A 2D point in screen coordinates.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[ts(export)]
pub struct Point {
  pub x: i32,
  pub y: i32,
}

impl Point {
  pub const fn new(x: i32, y: i32) -> Self {
    Self { x, y }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  mod rect_null {
    use super::*;

    #[test]
    fn default_rect_is_null() {
      assert!(Rect::default().is_null());
      assert!(Rect::default().is_empty());
    }

    #[test]
    fn positioned_zero_size_is_null() {
      assert!(Rect::new(10, 20, 0, 0).is_null());
    }

    #[test]
    fn line_is_empty_but_not_null() {
      let line = Rect::new(0, 0, 0, 12);
      assert!(!line.is_null());
      assert!(line.is_empty());
    }
  }

  mod rect_center {
    use super::*;

    #[test]
    fn center_of_even_rect() {
      assert_eq!(Rect::new(10, 20, 100, 50).center(), Point::new(60, 45));
    }

    #[test]
    fn center_of_negative_origin() {
      assert_eq!(Rect::new(-100, -50, 200, 100).center(), Point::new(0, 0));
    }
  }

  mod rect_center_extremes {
    use super::*;

    #[test]
    fn center_near_max_saturates() {
      let rect = Rect::new(i32::MAX - 10, i32::MAX - 10, 100, 100);
      assert_eq!(rect.center(), Point::new(i32::MAX, i32::MAX));
    }

    #[test]
    fn center_near_min_saturates() {
      let rect = Rect::new(i32::MIN + 10, 0, -100, 0);
      assert_eq!(rect.center(), Point::new(i32::MIN, 0));
    }
  }
}
