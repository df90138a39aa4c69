/*!
Accessible Object Proxy.

An [`Accessible`] is a cheap, cloneable handle bound to one remote object.
Every accessor is a remote call made when invoked; state and the interface
set are read through the object cache. Accessors never fail: a failed call
logs one warning and yields a neutral value (empty string, zero rect,
`Role::NoRole`, `false`).

Accessors for optional interfaces check the object's interface set first and
report a capability warning instead of issuing a call the object cannot
answer.

# Module Structure

- `tree.rs` - identity, naming, role, navigation, state, interfaces
- `component.rs` - geometry
- `text.rs` - text, selections, editable text
- `value.rs`, `image.rs`, `selection.rs`, `application.rs` - smaller interfaces
- `action.rs` - cached actions and triggering
- `focus.rs` - focus-point derivation
*/

mod action;
mod application;
mod component;
mod focus;
mod image;
mod selection;
mod text;
mod tree;
mod value;

pub use action::{Action, ActionInfo, ActionTarget};
pub use application::LocaleCategory;
pub use tree::NavigationIssue;

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::a11y::Interface;
use crate::core::Context;
use crate::types::{AtspioError, AtspioResult, ObjectIdentity};

/// Shared per-object data. One instance per identity while the cache holds it.
#[derive(Debug)]
pub(crate) struct AccessibleData {
  pub(crate) identity: ObjectIdentity,
  defunct: Arc<AtomicBool>,
  actions: Mutex<Option<Vec<Action>>>,
}

impl AccessibleData {
  pub(crate) fn new(identity: ObjectIdentity) -> Self {
    Self {
      identity,
      defunct: Arc::new(AtomicBool::new(false)),
      actions: Mutex::new(None),
    }
  }
}

/// Handle to one remote accessible object.
///
/// Two handles are equal when they share data or name the same identity.
#[derive(Clone)]
pub struct Accessible {
  data: Arc<AccessibleData>,
  ctx: Arc<Context>,
}

impl std::fmt::Debug for Accessible {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Accessible")
      .field("identity", &self.data.identity)
      .field("defunct", &self.is_defunct())
      .finish_non_exhaustive()
  }
}

impl PartialEq for Accessible {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.data, &other.data) || self.data.identity == other.data.identity
  }
}

impl Eq for Accessible {}

impl Hash for Accessible {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.data.identity.hash(state);
  }
}

impl Accessible {
  pub(crate) const fn new(data: Arc<AccessibleData>, ctx: Arc<Context>) -> Self {
    Self { data, ctx }
  }

  /// The bus name and object path this handle is bound to.
  pub fn identity(&self) -> &ObjectIdentity {
    &self.data.identity
  }

  /// False for the null object and identities missing a part.
  pub fn is_valid(&self) -> bool {
    self.data.identity.is_valid()
  }

  /// Serialize as `accessibleobject:<path>#<bus name>`.
  pub fn to_reference(&self) -> String {
    self.data.identity.to_reference()
  }

  /// True once the object reported itself defunct.
  pub fn is_defunct(&self) -> bool {
    self.data.defunct.load(Ordering::Acquire)
  }

  /// Whether `other` shares this handle's underlying data.
  pub fn ptr_eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.data, &other.data)
  }

  /// Mark defunct; cached actions share the flag and become disabled.
  pub(crate) fn mark_defunct(&self) {
    self.data.defunct.store(true, Ordering::Release);
  }

  fn handle(&self, identity: ObjectIdentity) -> Option<Self> {
    identity.is_valid().then(|| self.ctx.accessible(identity))
  }

  /// Fail unless the object is live and implements `interface`.
  fn require(&self, interface: Interface) -> AtspioResult<()> {
    if self.is_defunct() {
      return Err(AtspioError::Defunct(self.data.identity.clone()));
    }
    if self.fetch_interfaces()?.contains(interface) {
      Ok(())
    } else {
      Err(AtspioError::MissingInterface {
        identity: self.data.identity.clone(),
        interface,
      })
    }
  }

  /// Log one warning for a failed accessor and fall back to `T::default()`.
  fn neutral<T: Default>(&self, what: &str, result: AtspioResult<T>) -> T {
    self.checked(what, result).unwrap_or_default()
  }

  fn checked<T>(&self, what: &str, result: AtspioResult<T>) -> Option<T> {
    match result {
      Ok(value) => Some(value),
      Err(e) => {
        log::warn!("{what} failed for {}: {e}", self.data.identity);
        None
      }
    }
  }
}
