//! Image accessors.

use super::component::{rect_boxed, rect_flat, SCREEN_COORDS};
use super::Accessible;
use crate::a11y::Interface;
use crate::bus::names::interface::IMAGE;
use crate::bus::wire::decode_shapes;
use crate::bus::MethodCall;
use crate::types::{AtspioError, AtspioResult, Rect};

impl Accessible {
  fn image_property(&self, name: &str) -> AtspioResult<String> {
    self.require(Interface::Image)?;
    self
      .ctx
      .property(self.identity(), IMAGE, name)?
      .as_str()
      .map(str::to_owned)
      .ok_or_else(|| AtspioError::malformed(name, "expected a string"))
  }

  /// Textual description of the image.
  pub fn image_description(&self) -> String {
    self.neutral("ImageDescription", self.image_property("ImageDescription"))
  }

  /// Locale of the image description.
  pub fn image_locale(&self) -> String {
    self.neutral("ImageLocale", self.image_property("ImageLocale"))
  }

  /// Image extents in screen coordinates.
  pub fn image_rect(&self) -> Rect {
    let result = self.require(Interface::Image).and_then(|()| {
      let call = MethodCall::on(self.identity(), IMAGE, "GetImageExtents").arg(SCREEN_COORDS);
      let reply = self.ctx.call(&call)?;
      decode_shapes("GetImageExtents", &reply, &[rect_boxed, rect_flat])
    });
    self.neutral("GetImageExtents", result)
  }
}
