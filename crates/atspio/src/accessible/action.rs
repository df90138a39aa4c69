/*!
Actions.

`GetActions` is read once per object and cached on the shared handle data;
an object's actions do not change over its lifetime. Each [`Action`] carries
its owner's identity and its index, plus the owner's defunct flag, so an
action taken from a defunct object is disabled and triggering it does nothing.
*/

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::Accessible;
use crate::a11y::Interface;
use crate::bus::names::interface::ACTION;
use crate::bus::wire::first;
use crate::bus::{MethodCall, WireValue};
use crate::core::Context;
use crate::types::{AtspioError, AtspioResult, ObjectIdentity};

/// What an action is called and how to reach it from the keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ActionInfo {
  /// Display name, e.g. `click`.
  pub name: String,
  /// Human-readable description; may be empty.
  pub description: String,
  /// Keyboard shortcut, when the toolkit reports one.
  pub key_binding: Option<String>,
}

/// The object an action belongs to and the action's index on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionTarget {
  /// Object the action belongs to.
  pub identity: ObjectIdentity,
  /// Position in the object's action list.
  pub index: i32,
}

/// One invokable action of an object.
#[derive(Clone)]
pub struct Action {
  info: ActionInfo,
  target: ActionTarget,
  defunct: Arc<AtomicBool>,
  ctx: Arc<Context>,
}

impl std::fmt::Debug for Action {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Action")
      .field("info", &self.info)
      .field("target", &self.target)
      .field("enabled", &self.is_enabled())
      .finish_non_exhaustive()
  }
}

impl Action {
  /// Name, description and key binding.
  pub const fn info(&self) -> &ActionInfo {
    &self.info
  }

  /// Display name.
  pub fn name(&self) -> &str {
    &self.info.name
  }

  /// Description; may be empty.
  pub fn description(&self) -> &str {
    &self.info.description
  }

  /// `None` when the action has no shortcut.
  pub fn key_binding(&self) -> Option<&str> {
    self.info.key_binding.as_deref()
  }

  /// Object and index the action is triggered on.
  pub const fn target(&self) -> &ActionTarget {
    &self.target
  }

  /// False once the owning object went defunct.
  pub fn is_enabled(&self) -> bool {
    !self.defunct.load(Ordering::Acquire)
  }

  /// Invoke the action. Returns whether the application reported success.
  ///
  /// A disabled action is not sent. A failed call or a `false` reply logs
  /// one warning.
  pub fn trigger(&self) -> bool {
    if !self.is_enabled() {
      log::debug!(
        "Not triggering {:?} on defunct {}",
        self.info.name,
        self.target.identity
      );
      return false;
    }
    match self.invoke() {
      Ok(true) => true,
      Ok(false) => {
        log::warn!(
          "DoAction {} ({:?}) was refused by {}",
          self.target.index,
          self.info.name,
          self.target.identity
        );
        false
      }
      Err(e) => {
        log::warn!(
          "DoAction {} failed for {}: {e}",
          self.target.index,
          self.target.identity
        );
        false
      }
    }
  }

  fn invoke(&self) -> AtspioResult<bool> {
    let call = MethodCall::on(&self.target.identity, ACTION, "DoAction").arg(self.target.index);
    let reply = self.ctx.call(&call)?;
    first("DoAction", &reply)?
      .as_bool()
      .ok_or_else(|| AtspioError::malformed("DoAction", "expected a boolean"))
  }
}

fn action_info(entry: &WireValue) -> Option<ActionInfo> {
  match entry.as_struct()? {
    [name, description, key_binding] => {
      let key_binding = key_binding.as_str()?;
      Some(ActionInfo {
        name: name.as_str()?.to_owned(),
        description: description.as_str()?.to_owned(),
        key_binding: (!key_binding.is_empty()).then(|| key_binding.to_owned()),
      })
    }
    _ => None,
  }
}

impl Accessible {
  /// The object's actions, fetched once and then served from the handle.
  pub fn actions(&self) -> Vec<Action> {
    if let Some(actions) = self.data.actions.lock().as_ref() {
      return actions.clone();
    }
    let Some(fetched) = self.checked("GetActions", self.fetch_actions()) else {
      return Vec::new();
    };
    self
      .data
      .actions
      .lock()
      .get_or_insert(fetched)
      .clone()
  }

  fn fetch_actions(&self) -> AtspioResult<Vec<Action>> {
    self.require(Interface::Action)?;
    let reply = self
      .ctx
      .call(&MethodCall::on(self.identity(), ACTION, "GetActions"))?;
    let entries = first("GetActions", &reply)?
      .as_array()
      .ok_or_else(|| AtspioError::malformed("GetActions", "expected an array"))?;
    (0..)
      .zip(entries)
      .map(|(index, entry)| {
        let info = action_info(entry)
          .ok_or_else(|| AtspioError::malformed("GetActions", "expected (sss) entries"))?;
        Ok(Action {
          info,
          target: ActionTarget {
            identity: self.identity().clone(),
            index,
          },
          defunct: Arc::clone(&self.data.defunct),
          ctx: Arc::clone(&self.ctx),
        })
      })
      .collect()
  }
}
