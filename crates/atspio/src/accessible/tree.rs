/*!
Identity, naming, role, navigation, state, and interface accessors.

These use the base `Accessible` interface every object implements, so they
are not gated on the interface set.
*/

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::Accessible;
use crate::a11y::{decode_state, Interfaces, Role, StateSet};
use crate::bus::names::interface::ACCESSIBLE;
use crate::bus::wire::{decode_shapes, first};
use crate::bus::{MethodCall, WireValue};
use crate::types::{AtspioError, AtspioResult, ObjectIdentity};

/// A child whose back-links disagree with its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "kebab-case")]
#[ts(export)]
pub enum NavigationIssue {
  /// `parent(child(x, index))` is not `x`.
  WrongParent {
    index: i32,
    child: ObjectIdentity,
    reported: Option<ObjectIdentity>,
  },
  /// `child(x, index).index_in_parent()` is not `index`.
  WrongIndex {
    index: i32,
    child: ObjectIdentity,
    reported: i32,
  },
}

fn index_flat(reply: &[WireValue]) -> Option<i32> {
  match reply {
    [value] => value.as_i32(),
    _ => None,
  }
}

fn index_boxed(reply: &[WireValue]) -> Option<i32> {
  match reply {
    [value] => match value.as_struct()? {
      [inner] => inner.as_i32(),
      _ => None,
    },
    _ => None,
  }
}

impl Accessible {
  fn method(&self, member: &'static str) -> MethodCall {
    MethodCall::on(self.identity(), ACCESSIBLE, member)
  }

  fn string_property(&self, name: &str) -> AtspioResult<String> {
    let value = self.ctx.property(self.identity(), ACCESSIBLE, name)?;
    value
      .as_str()
      .map(str::to_owned)
      .ok_or_else(|| AtspioError::malformed(name, "expected a string"))
  }

  fn string_method(&self, member: &'static str) -> AtspioResult<String> {
    let reply = self.ctx.call(&self.method(member))?;
    first(member, &reply)?
      .as_str()
      .map(str::to_owned)
      .ok_or_else(|| AtspioError::malformed(member, "expected a string"))
  }

  fn object_reply(&self, member: &'static str, reply: &[WireValue]) -> AtspioResult<ObjectIdentity> {
    first(member, reply)?
      .as_object_ref()
      .ok_or_else(|| AtspioError::malformed(member, "expected an object reference"))
  }

  /// Accessible name, empty when unset.
  pub fn name(&self) -> String {
    self.neutral("Name", self.string_property("Name"))
  }

  /// Accessible description, empty when unset.
  pub fn description(&self) -> String {
    self.neutral("Description", self.string_property("Description"))
  }

  /// Toolkit-assigned stable id, empty if the object has none.
  pub fn accessible_id(&self) -> String {
    self.neutral("AccessibleId", self.string_property("AccessibleId"))
  }

  /// `Role::NoRole` for unknown or unreadable roles.
  pub fn role(&self) -> Role {
    let result = self.ctx.call(&self.method("GetRole")).and_then(|reply| {
      first("GetRole", &reply)?
        .as_u32()
        .ok_or_else(|| AtspioError::malformed("GetRole", "expected a role code"))
    });
    self
      .checked("GetRole", result)
      .map_or(Role::NoRole, Role::from_wire)
  }

  /// Role name as the toolkit reports it.
  pub fn role_name(&self) -> String {
    self.neutral("GetRoleName", self.string_method("GetRoleName"))
  }

  /// Role name in the application's language.
  pub fn localized_role_name(&self) -> String {
    self.neutral(
      "GetLocalizedRoleName",
      self.string_method("GetLocalizedRoleName"),
    )
  }

  /// The parent, or `None` at the root and on failure.
  pub fn parent(&self) -> Option<Self> {
    let result = self
      .ctx
      .property(self.identity(), ACCESSIBLE, "Parent")
      .and_then(|value| {
        value
          .as_object_ref()
          .ok_or_else(|| AtspioError::malformed("Parent", "expected an object reference"))
      });
    self.checked("Parent", result).and_then(|id| self.handle(id))
  }

  /// Position among the parent's children, `-1` on failure.
  pub fn index_in_parent(&self) -> i32 {
    let result = self.ctx.call(&self.method("GetIndexInParent")).and_then(|reply| {
      decode_shapes("GetIndexInParent", &reply, &[index_flat, index_boxed])
    });
    self.checked("GetIndexInParent", result).unwrap_or(-1)
  }

  /// Number of children; zero on failure.
  pub fn child_count(&self) -> i32 {
    let result = self
      .ctx
      .property(self.identity(), ACCESSIBLE, "ChildCount")
      .and_then(|value| {
        value
          .as_i32()
          .ok_or_else(|| AtspioError::malformed("ChildCount", "expected an integer"))
      });
    self.neutral("ChildCount", result)
  }

  /// Child at `index`; `None` for null or failed lookups.
  pub fn child(&self, index: i32) -> Option<Self> {
    let result = self
      .ctx
      .call(&self.method("GetChildAtIndex").arg(index))
      .and_then(|reply| self.object_reply("GetChildAtIndex", &reply));
    self
      .checked("GetChildAtIndex", result)
      .and_then(|id| self.handle(id))
  }

  /// All children, in order, in one round trip. Null references are skipped.
  pub fn children(&self) -> Vec<Self> {
    let result = self.ctx.call(&self.method("GetChildren")).and_then(|reply| {
      first("GetChildren", &reply)?
        .as_array()
        .map(|items| items.iter().filter_map(WireValue::as_object_ref).collect::<Vec<_>>())
        .ok_or_else(|| AtspioError::malformed("GetChildren", "expected an array"))
    });
    self
      .neutral("GetChildren", result)
      .into_iter()
      .filter_map(|id| self.handle(id))
      .collect()
  }

  /// The application object owning this one.
  pub fn application(&self) -> Option<Self> {
    let result = self
      .ctx
      .call(&self.method("GetApplication"))
      .and_then(|reply| self.object_reply("GetApplication", &reply));
    self
      .checked("GetApplication", result)
      .and_then(|id| self.handle(id))
  }

  /// Current states. Served from the cache until a state change arrives.
  pub fn state(&self) -> StateSet {
    StateSet::from_bits(self.neutral("GetState", self.fetch_state()))
  }

  fn fetch_state(&self) -> AtspioResult<u64> {
    if let Some(state) = self.ctx.cache.state(self.identity()) {
      return Ok(state);
    }
    let reply = self.ctx.call(&self.method("GetState"))?;
    let words = first("GetState", &reply)?
      .as_array()
      .ok_or_else(|| AtspioError::malformed("GetState", "expected an array"))?;
    let state = match words {
      [low, high] => match (low.as_u32(), high.as_u32()) {
        (Some(low), Some(high)) => decode_state(low, high),
        _ => return Err(AtspioError::malformed("GetState", "expected two words")),
      },
      _ => return Err(AtspioError::malformed("GetState", "expected two words")),
    };
    self.ctx.cache.set_state(self.identity(), state);
    Ok(state)
  }

  /// Interfaces the object implements. Served from the cache once fetched.
  pub fn supported_interfaces(&self) -> Interfaces {
    self.neutral("GetInterfaces", self.fetch_interfaces())
  }

  pub(super) fn fetch_interfaces(&self) -> AtspioResult<Interfaces> {
    if let Some(interfaces) = self.ctx.cache.interfaces(self.identity()) {
      return Ok(interfaces);
    }
    let reply = self.ctx.call(&self.method("GetInterfaces"))?;
    let names = first("GetInterfaces", &reply)?
      .as_array()
      .ok_or_else(|| AtspioError::malformed("GetInterfaces", "expected an array"))?;
    let interfaces = Interfaces::from_wire_names(names.iter().filter_map(WireValue::as_str));
    self.ctx.cache.set_interfaces(self.identity(), interfaces);
    Ok(interfaces)
  }

  /// Check that every child links back to this object at its own index.
  ///
  /// Logs one warning per inconsistency; never fails.
  pub fn navigation_issues(&self) -> Vec<NavigationIssue> {
    let mut issues = Vec::new();
    for (index, child) in (0..).zip(self.children()) {
      let reported = child.parent();
      if reported.as_ref() != Some(self) {
        issues.push(NavigationIssue::WrongParent {
          index,
          child: child.identity().clone(),
          reported: reported.map(|p| p.identity().clone()),
        });
      }
      let reported = child.index_in_parent();
      if reported != index {
        issues.push(NavigationIssue::WrongIndex {
          index,
          child: child.identity().clone(),
          reported,
        });
      }
    }
    for issue in &issues {
      log::warn!("Navigation inconsistency under {}: {issue:?}", self.identity());
    }
    issues
  }
}
