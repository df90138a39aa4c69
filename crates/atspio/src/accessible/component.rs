//! Geometry accessors (Component interface). Coordinates are screen-relative.

use super::Accessible;
use crate::a11y::Interface;
use crate::bus::names::interface::COMPONENT;
use crate::bus::wire::{decode_shapes, first};
use crate::bus::{MethodCall, WireValue};
use crate::types::{AtspioError, AtspioResult, Rect};

/// Coordinate type argument for screen coordinates.
pub(super) const SCREEN_COORDS: u32 = 0;

/// Read `(iiii)` either as one struct or as four flat values.
pub(super) fn rect_boxed(reply: &[WireValue]) -> Option<Rect> {
  match reply {
    [value] => rect_flat(value.as_struct()?),
    _ => None,
  }
}

pub(super) fn rect_flat(reply: &[WireValue]) -> Option<Rect> {
  match reply {
    [x, y, w, h] => Some(Rect::new(x.as_i32()?, y.as_i32()?, w.as_i32()?, h.as_i32()?)),
    _ => None,
  }
}

impl Accessible {
  fn component_call(&self, member: &'static str) -> AtspioResult<Vec<WireValue>> {
    self.require(Interface::Component)?;
    self.ctx.call(&MethodCall::on(self.identity(), COMPONENT, member))
  }

  /// Bounding rectangle in screen coordinates; zero rect on failure.
  pub fn bounding_rect(&self) -> Rect {
    let result = self.require(Interface::Component).and_then(|()| {
      let call = MethodCall::on(self.identity(), COMPONENT, "GetExtents").arg(SCREEN_COORDS);
      let reply = self.ctx.call(&call)?;
      decode_shapes("GetExtents", &reply, &[rect_boxed, rect_flat])
    });
    self.neutral("GetExtents", result)
  }

  /// Stacking layer code.
  pub fn layer(&self) -> i32 {
    let result = self.component_call("GetLayer").and_then(|reply| {
      first("GetLayer", &reply)?
        .as_i32()
        .ok_or_else(|| AtspioError::malformed("GetLayer", "expected an integer"))
    });
    self.neutral("GetLayer", result)
  }

  /// Z-order within an MDI container.
  pub fn mdi_z_order(&self) -> i32 {
    let result = self.component_call("GetMDIZOrder").and_then(|reply| {
      first("GetMDIZOrder", &reply)?
        .as_i32()
        .ok_or_else(|| AtspioError::malformed("GetMDIZOrder", "expected an integer"))
    });
    self.neutral("GetMDIZOrder", result)
  }

  /// Opacity in `0.0..=1.0`.
  pub fn alpha(&self) -> f64 {
    let result = self.component_call("GetAlpha").and_then(|reply| {
      first("GetAlpha", &reply)?
        .as_f64()
        .ok_or_else(|| AtspioError::malformed("GetAlpha", "expected a number"))
    });
    self.neutral("GetAlpha", result)
  }
}
