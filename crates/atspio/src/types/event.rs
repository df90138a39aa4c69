/*! Listener categories and the typed events delivered to consumers. */

use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::accessible::Accessible;

/// One independently toggled class of event subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum EventListener {
  Window,
  Focus,
  StateChanged,
  ChildrenChanged,
  VisibleDataChanged,
  SelectionChanged,
  ModelChanged,
  TextCaretMoved,
  TextChanged,
  TextSelectionChanged,
  PropertyChanged,
}

impl EventListener {
  pub const ALL: [Self; 11] = [
    Self::Window,
    Self::Focus,
    Self::StateChanged,
    Self::ChildrenChanged,
    Self::VisibleDataChanged,
    Self::SelectionChanged,
    Self::ModelChanged,
    Self::TextCaretMoved,
    Self::TextChanged,
    Self::TextSelectionChanged,
    Self::PropertyChanged,
  ];

  const fn bit(self) -> u32 {
    1 << (self as u32)
  }
}

/// A set of listener categories represented as bit flags.
///
/// ```
/// use atspio::{EventListener, EventListeners};
///
/// let set = EventListener::Focus | EventListener::Window;
/// assert!(set.contains(EventListener::Focus));
/// assert!(!set.contains(EventListener::TextChanged));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EventListeners(u32);

impl EventListeners {
  pub const NONE: Self = Self(0);
  pub const ALL: Self = Self((1 << EventListener::ALL.len() as u32) - 1);

  pub const fn from_listener(listener: EventListener) -> Self {
    Self(listener.bit())
  }

  pub const fn contains(&self, listener: EventListener) -> bool {
    self.0 & listener.bit() != 0
  }

  pub const fn is_empty(&self) -> bool {
    self.0 == 0
  }

  pub const fn bits(&self) -> u32 {
    self.0
  }

  #[must_use]
  pub const fn with(self, listener: EventListener) -> Self {
    Self(self.0 | listener.bit())
  }

  #[must_use]
  pub const fn without(self, listener: EventListener) -> Self {
    Self(self.0 & !listener.bit())
  }

  pub fn iter(&self) -> impl Iterator<Item = EventListener> + '_ {
    EventListener::ALL
      .into_iter()
      .filter(|&listener| self.contains(listener))
  }
}

impl FromIterator<EventListener> for EventListeners {
  fn from_iter<T: IntoIterator<Item = EventListener>>(iter: T) -> Self {
    iter.into_iter().fold(Self::NONE, Self::with)
  }
}

impl From<EventListener> for EventListeners {
  fn from(listener: EventListener) -> Self {
    Self::from_listener(listener)
  }
}

impl BitOr for EventListeners {
  type Output = Self;

  fn bitor(self, rhs: Self) -> Self::Output {
    Self(self.0 | rhs.0)
  }
}

impl BitOr<EventListener> for EventListeners {
  type Output = Self;

  fn bitor(self, rhs: EventListener) -> Self::Output {
    self.with(rhs)
  }
}

impl BitOr for EventListener {
  type Output = EventListeners;

  fn bitor(self, rhs: Self) -> Self::Output {
    EventListeners::from_listener(self).with(rhs)
  }
}

impl BitOrAssign for EventListeners {
  fn bitor_assign(&mut self, rhs: Self) {
    self.0 |= rhs.0;
  }
}

impl BitAnd for EventListeners {
  type Output = Self;

  fn bitand(self, rhs: Self) -> Self::Output {
    Self(self.0 & rhs.0)
  }
}

impl Not for EventListeners {
  type Output = Self;

  fn not(self) -> Self::Output {
    Self(!self.0 & Self::ALL.0)
  }
}

/// Window lifecycle transitions, one per window signal member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowEvent {
  Created,
  Destroyed,
  Closed,
  Reparented,
  Minimized,
  Maximized,
  Restored,
  Activated,
  Deactivated,
  DesktopCreated,
  DesktopDestroyed,
  Raised,
  Lowered,
  Moved,
  Resized,
  Shaded,
  Unshaded,
}

impl WindowEvent {
  /// Map a window signal member to its event.
  pub(crate) fn from_member(member: &str) -> Option<Self> {
    let event = match member {
      "Create" => Self::Created,
      "Destroy" => Self::Destroyed,
      "Close" => Self::Closed,
      "Reparent" => Self::Reparented,
      "Minimize" => Self::Minimized,
      "Maximize" => Self::Maximized,
      "Restore" => Self::Restored,
      "Activate" => Self::Activated,
      "Deactivate" => Self::Deactivated,
      "DesktopCreate" => Self::DesktopCreated,
      "DesktopDestroy" => Self::DesktopDestroyed,
      "Raise" => Self::Raised,
      "Lower" => Self::Lowered,
      "Move" => Self::Moved,
      "Resize" => Self::Resized,
      "Shade" => Self::Shaded,
      // at-spi2-core has shipped the misspelt member for years
      "Unshade" | "uUshade" => Self::Unshaded,
      _ => return None,
    };
    Some(event)
  }
}

/// Events emitted when something changes on the bus.
#[derive(Debug, Clone)]
pub enum Event {
  Window {
    kind: WindowEvent,
    object: Accessible,
  },
  StateChanged {
    object: Accessible,
    state: String,
    active: bool,
  },
  ChildAdded {
    parent: Accessible,
    index: i32,
    child: Option<Accessible>,
  },
  ChildRemoved {
    parent: Accessible,
    index: i32,
    child: Option<Accessible>,
  },
  VisibleDataChanged {
    object: Accessible,
  },
  SelectionChanged {
    object: Accessible,
  },
  ModelChanged {
    object: Accessible,
  },
  FocusChanged {
    object: Accessible,
  },
  TextCaretMoved {
    object: Accessible,
    position: i32,
  },
  TextSelectionChanged {
    object: Accessible,
  },
  TextChanged {
    object: Accessible,
    text: String,
    start: i32,
    end: i32,
  },
  TextInserted {
    object: Accessible,
    text: String,
    start: i32,
    end: i32,
  },
  TextRemoved {
    object: Accessible,
    text: String,
    start: i32,
    end: i32,
  },
  NameChanged {
    object: Accessible,
  },
  DescriptionChanged {
    object: Accessible,
  },
  /// A property other than name or description changed.
  PropertyChanged {
    object: Accessible,
    property: String,
  },
  /// The object went defunct and was dropped from the cache.
  Removed {
    object: Accessible,
  },
}

impl Event {
  /// The object the event originated from.
  pub const fn object(&self) -> &Accessible {
    match self {
      Self::Window { object, .. }
      | Self::StateChanged { object, .. }
      | Self::VisibleDataChanged { object }
      | Self::SelectionChanged { object }
      | Self::ModelChanged { object }
      | Self::FocusChanged { object }
      | Self::TextCaretMoved { object, .. }
      | Self::TextSelectionChanged { object }
      | Self::TextChanged { object, .. }
      | Self::TextInserted { object, .. }
      | Self::TextRemoved { object, .. }
      | Self::NameChanged { object }
      | Self::DescriptionChanged { object }
      | Self::PropertyChanged { object, .. }
      | Self::Removed { object } => object,
      Self::ChildAdded { parent, .. } | Self::ChildRemoved { parent, .. } => parent,
    }
  }
}
