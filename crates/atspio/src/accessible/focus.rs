//! Focus-point derivation: where a magnifier or pointer should go.

use super::Accessible;
use crate::a11y::Interface;
use crate::types::Point;

/// Ancestors visited before giving up.
const MAX_DEPTH: usize = 64;

impl Accessible {
  /// Caret position for text, else the center of the bounding box, else the
  /// nearest ancestor's focus point. `None` when nothing on the way up has
  /// geometry.
  pub fn focus_point(&self) -> Option<Point> {
    let mut current = self.clone();
    for _ in 0..MAX_DEPTH {
      let interfaces = current.supported_interfaces();
      if interfaces.contains(Interface::Text) {
        let caret = current.character_rect(current.caret_offset());
        if !caret.is_null() {
          return Some(caret.center());
        }
      }
      if interfaces.contains(Interface::Component) {
        let bounds = current.bounding_rect();
        if !bounds.is_null() {
          return Some(bounds.center());
        }
      }
      current = current.parent()?;
    }
    None
  }
}
