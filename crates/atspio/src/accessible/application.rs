//! Application-level accessors. Valid on the application root object.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::Accessible;
use crate::a11y::Interface;
use crate::bus::names::interface::APPLICATION;
use crate::bus::wire::first;
use crate::bus::{MethodCall, WireValue};
use crate::types::{AtspioError, AtspioResult};

/// POSIX locale category passed to `GetLocale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum LocaleCategory {
  Messages,
  Collate,
  Ctype,
  Monetary,
  Numeric,
  Time,
}

impl LocaleCategory {
  const fn wire_code(self) -> u32 {
    match self {
      Self::Messages => 0,
      Self::Collate => 1,
      Self::Ctype => 2,
      Self::Monetary => 3,
      Self::Numeric => 4,
      Self::Time => 5,
    }
  }
}

impl Accessible {
  fn application_property(&self, name: &str) -> AtspioResult<WireValue> {
    self.require(Interface::Application)?;
    self.ctx.property(self.identity(), APPLICATION, name)
  }

  fn application_string(&self, result: AtspioResult<WireValue>, what: &str) -> String {
    let result = result.and_then(|value| {
      value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| AtspioError::malformed(what, "expected a string"))
    });
    self.neutral(what, result)
  }

  /// Toolkit name, e.g. `GTK` or `Qt`.
  pub fn toolkit_name(&self) -> String {
    self.application_string(self.application_property("ToolkitName"), "ToolkitName")
  }

  /// Toolkit version string.
  pub fn toolkit_version(&self) -> String {
    self.application_string(self.application_property("Version"), "Version")
  }

  /// Numeric id the registry assigned to the application.
  pub fn application_id(&self) -> i32 {
    let result = self.application_property("Id").and_then(|value| {
      value
        .as_i32()
        .ok_or_else(|| AtspioError::malformed("Id", "expected an integer"))
    });
    self.neutral("Id", result)
  }

  /// Locale the application uses for `category`.
  pub fn locale(&self, category: LocaleCategory) -> String {
    let result = self.require(Interface::Application).and_then(|()| {
      let call = MethodCall::on(self.identity(), APPLICATION, "GetLocale").arg(category.wire_code());
      let reply = self.ctx.call(&call)?;
      first("GetLocale", &reply).cloned()
    });
    self.application_string(result, "GetLocale")
  }

  /// Address of the application's private peer-to-peer bus, if it has one.
  pub fn application_bus_address(&self) -> String {
    let result = self.require(Interface::Application).and_then(|()| {
      let call = MethodCall::on(self.identity(), APPLICATION, "GetApplicationBusAddress");
      let reply = self.ctx.call(&call)?;
      first("GetApplicationBusAddress", &reply).cloned()
    });
    self.application_string(result, "GetApplicationBusAddress")
  }
}
