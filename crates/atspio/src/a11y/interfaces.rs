/*!
Capability interfaces.

`GetInterfaces` returns interface names; accessors check the resulting set
before issuing calls on an optional interface.
*/

use std::ops::{BitOr, BitOrAssign};

use crate::bus::names::interface;

/// One optional capability interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interface {
  Accessible,
  Action,
  Application,
  Cache,
  Collection,
  Component,
  Document,
  EditableText,
  EventKeyboard,
  EventMouse,
  EventObject,
  EventWindow,
  EventFocus,
  Hyperlink,
  Hypertext,
  Image,
  Selection,
  Socket,
  Table,
  TableCell,
  Text,
  Value,
}

impl Interface {
  pub const ALL: [Self; 22] = [
    Self::Accessible,
    Self::Action,
    Self::Application,
    Self::Cache,
    Self::Collection,
    Self::Component,
    Self::Document,
    Self::EditableText,
    Self::EventKeyboard,
    Self::EventMouse,
    Self::EventObject,
    Self::EventWindow,
    Self::EventFocus,
    Self::Hyperlink,
    Self::Hypertext,
    Self::Image,
    Self::Selection,
    Self::Socket,
    Self::Table,
    Self::TableCell,
    Self::Text,
    Self::Value,
  ];

  /// Fully qualified wire name.
  pub const fn wire_name(self) -> &'static str {
    match self {
      Self::Accessible => interface::ACCESSIBLE,
      Self::Action => interface::ACTION,
      Self::Application => interface::APPLICATION,
      Self::Cache => interface::CACHE,
      Self::Collection => interface::COLLECTION,
      Self::Component => interface::COMPONENT,
      Self::Document => interface::DOCUMENT,
      Self::EditableText => interface::EDITABLE_TEXT,
      Self::EventKeyboard => interface::EVENT_KEYBOARD,
      Self::EventMouse => interface::EVENT_MOUSE,
      Self::EventObject => interface::EVENT_OBJECT,
      Self::EventWindow => interface::EVENT_WINDOW,
      Self::EventFocus => interface::EVENT_FOCUS,
      Self::Hyperlink => interface::HYPERLINK,
      Self::Hypertext => interface::HYPERTEXT,
      Self::Image => interface::IMAGE,
      Self::Selection => interface::SELECTION,
      Self::Socket => interface::SOCKET,
      Self::Table => interface::TABLE,
      Self::TableCell => interface::TABLE_CELL,
      Self::Text => interface::TEXT,
      Self::Value => interface::VALUE,
    }
  }

  pub fn from_wire_name(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|iface| iface.wire_name() == name)
  }

  const fn bit(self) -> u32 {
    1 << (self as u32)
  }
}

/// Set of capability interfaces an object implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Interfaces(u32);

impl Interfaces {
  pub const NONE: Self = Self(0);

  /// Build from `GetInterfaces` names; unknown names are skipped.
  pub fn from_wire_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
    names
      .into_iter()
      .filter_map(Interface::from_wire_name)
      .fold(Self::NONE, |set, iface| set | iface)
  }

  pub const fn contains(&self, iface: Interface) -> bool {
    self.0 & iface.bit() != 0
  }

  pub const fn is_empty(&self) -> bool {
    self.0 == 0
  }

  pub const fn bits(&self) -> u32 {
    self.0
  }

  pub fn iter(&self) -> impl Iterator<Item = Interface> + '_ {
    Interface::ALL
      .into_iter()
      .filter(|&iface| self.contains(iface))
  }
}

impl BitOr<Interface> for Interfaces {
  type Output = Self;

  fn bitor(self, rhs: Interface) -> Self::Output {
    Self(self.0 | rhs.bit())
  }
}

impl BitOr for Interfaces {
  type Output = Self;

  fn bitor(self, rhs: Self) -> Self::Output {
    Self(self.0 | rhs.0)
  }
}

impl BitOrAssign<Interface> for Interfaces {
  fn bitor_assign(&mut self, rhs: Interface) {
    self.0 |= rhs.bit();
  }
}

impl FromIterator<Interface> for Interfaces {
  fn from_iter<T: IntoIterator<Item = Interface>>(iter: T) -> Self {
    iter.into_iter().fold(Self::NONE, |set, iface| set | iface)
  }
}
