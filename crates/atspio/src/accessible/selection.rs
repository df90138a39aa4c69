//! Selected children (Selection interface).

use super::Accessible;
use crate::a11y::Interface;
use crate::bus::names::interface::SELECTION;
use crate::bus::wire::first;
use crate::bus::MethodCall;
use crate::types::{AtspioError, AtspioResult, ObjectIdentity};

impl Accessible {
  /// Currently selected children, in selection order.
  pub fn selected_children(&self) -> Vec<Self> {
    let result = self.fetch_selected();
    self
      .neutral("GetSelectedChild", result)
      .into_iter()
      .filter_map(|id| self.handle(id))
      .collect()
  }

  fn fetch_selected(&self) -> AtspioResult<Vec<ObjectIdentity>> {
    self.require(Interface::Selection)?;
    let count = self
      .ctx
      .property(self.identity(), SELECTION, "NSelectedChildren")?
      .as_i32()
      .ok_or_else(|| AtspioError::malformed("NSelectedChildren", "expected an integer"))?;
    (0..count)
      .map(|index| {
        let call = MethodCall::on(self.identity(), SELECTION, "GetSelectedChild").arg(index);
        let reply = self.ctx.call(&call)?;
        first("GetSelectedChild", &reply)?
          .as_object_ref()
          .ok_or_else(|| AtspioError::malformed("GetSelectedChild", "expected an object reference"))
      })
      .collect()
  }
}
