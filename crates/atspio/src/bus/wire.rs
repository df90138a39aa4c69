/*!
Transport-neutral model of bus messages.

Core code builds [`MethodCall`]s and reads replies as [`WireValue`] trees;
only the transport knows how these map onto a concrete bus library.
*/

use super::names::PROPERTIES_INTERFACE;
use crate::types::{AtspioError, AtspioResult, ObjectIdentity};

/// One marshalled value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum WireValue {
  Bool(bool),
  Byte(u8),
  I16(i16),
  U16(u16),
  I32(i32),
  U32(u32),
  I64(i64),
  U64(u64),
  F64(f64),
  Str(String),
  ObjectPath(String),
  Array(Vec<WireValue>),
  Struct(Vec<WireValue>),
  Variant(Box<WireValue>),
  /// A value the crate never reads (dicts, file descriptors).
  Unsupported,
}

impl WireValue {
  /// `(so)` object reference as sent by the registry and signals.
  pub(crate) fn object_ref(identity: &ObjectIdentity) -> Self {
    Self::Struct(vec![
      Self::Str(identity.bus_name().to_owned()),
      Self::ObjectPath(identity.object_path().to_owned()),
    ])
  }

  /// Strip any number of variant wrappers.
  pub(crate) fn unwrapped(&self) -> &Self {
    let mut value = self;
    while let Self::Variant(inner) = value {
      value = inner;
    }
    value
  }

  pub(crate) fn as_i32(&self) -> Option<i32> {
    match *self.unwrapped() {
      Self::I32(v) => Some(v),
      Self::U32(v) => i32::try_from(v).ok(),
      Self::I16(v) => Some(i32::from(v)),
      Self::U16(v) => Some(i32::from(v)),
      Self::Byte(v) => Some(i32::from(v)),
      Self::I64(v) => i32::try_from(v).ok(),
      Self::U64(v) => i32::try_from(v).ok(),
      _ => None,
    }
  }

  pub(crate) fn as_u32(&self) -> Option<u32> {
    match *self.unwrapped() {
      Self::U32(v) => Some(v),
      Self::I32(v) => u32::try_from(v).ok(),
      Self::U16(v) => Some(u32::from(v)),
      Self::Byte(v) => Some(u32::from(v)),
      Self::I16(v) => u32::try_from(v).ok(),
      Self::I64(v) => u32::try_from(v).ok(),
      Self::U64(v) => u32::try_from(v).ok(),
      _ => None,
    }
  }

  #[allow(clippy::cast_precision_loss)]
  pub(crate) fn as_f64(&self) -> Option<f64> {
    match *self.unwrapped() {
      Self::F64(v) => Some(v),
      Self::I32(v) => Some(f64::from(v)),
      Self::U32(v) => Some(f64::from(v)),
      Self::I16(v) => Some(f64::from(v)),
      Self::U16(v) => Some(f64::from(v)),
      Self::Byte(v) => Some(f64::from(v)),
      Self::I64(v) => Some(v as f64),
      Self::U64(v) => Some(v as f64),
      _ => None,
    }
  }

  pub(crate) fn as_bool(&self) -> Option<bool> {
    match *self.unwrapped() {
      Self::Bool(v) => Some(v),
      _ => None,
    }
  }

  pub(crate) fn as_str(&self) -> Option<&str> {
    match self.unwrapped() {
      Self::Str(s) | Self::ObjectPath(s) => Some(s),
      _ => None,
    }
  }

  pub(crate) fn as_array(&self) -> Option<&[Self]> {
    match self.unwrapped() {
      Self::Array(items) => Some(items),
      _ => None,
    }
  }

  pub(crate) fn as_struct(&self) -> Option<&[Self]> {
    match self.unwrapped() {
      Self::Struct(fields) => Some(fields),
      _ => None,
    }
  }

  /// Read a `(so)` reference. The null path still parses; callers check
  /// [`ObjectIdentity::is_valid`].
  pub(crate) fn as_object_ref(&self) -> Option<ObjectIdentity> {
    match self.as_struct()? {
      [bus, path] => Some(ObjectIdentity::new(bus.as_str()?, path.as_str()?)),
      _ => None,
    }
  }
}

impl From<bool> for WireValue {
  fn from(v: bool) -> Self {
    Self::Bool(v)
  }
}

impl From<i32> for WireValue {
  fn from(v: i32) -> Self {
    Self::I32(v)
  }
}

impl From<u32> for WireValue {
  fn from(v: u32) -> Self {
    Self::U32(v)
  }
}

impl From<f64> for WireValue {
  fn from(v: f64) -> Self {
    Self::F64(v)
  }
}

impl From<&str> for WireValue {
  fn from(v: &str) -> Self {
    Self::Str(v.to_owned())
  }
}

impl From<String> for WireValue {
  fn from(v: String) -> Self {
    Self::Str(v)
  }
}

/// An outgoing method call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MethodCall {
  pub(crate) destination: String,
  pub(crate) path: String,
  pub(crate) interface: &'static str,
  pub(crate) member: &'static str,
  pub(crate) args: Vec<WireValue>,
}

impl MethodCall {
  pub(crate) fn new(
    destination: impl Into<String>,
    path: impl Into<String>,
    interface: &'static str,
    member: &'static str,
  ) -> Self {
    Self {
      destination: destination.into(),
      path: path.into(),
      interface,
      member,
      args: Vec::new(),
    }
  }

  /// Call addressed to the object named by `identity`.
  pub(crate) fn on(
    identity: &ObjectIdentity,
    interface: &'static str,
    member: &'static str,
  ) -> Self {
    Self::new(identity.bus_name(), identity.object_path(), interface, member)
  }

  #[must_use]
  pub(crate) fn arg(mut self, value: impl Into<WireValue>) -> Self {
    self.args.push(value.into());
    self
  }

  /// `org.freedesktop.DBus.Properties.Get(interface, property)`.
  pub(crate) fn property_get(
    destination: impl Into<String>,
    path: impl Into<String>,
    interface: &'static str,
    property: &str,
  ) -> Self {
    Self::new(destination, path, PROPERTIES_INTERFACE, "Get")
      .arg(interface)
      .arg(property)
  }

  /// `org.freedesktop.DBus.Properties.Set(interface, property, value)`.
  pub(crate) fn property_set(
    destination: impl Into<String>,
    path: impl Into<String>,
    interface: &'static str,
    property: &str,
    value: WireValue,
  ) -> Self {
    let mut call = Self::new(destination, path, PROPERTIES_INTERFACE, "Set")
      .arg(interface)
      .arg(property);
    call.args.push(WireValue::Variant(Box::new(value)));
    call
  }

  /// Name used in logs: `Interface.Member` (or the property for Get/Set).
  pub(crate) fn describe(&self) -> String {
    if self.interface == PROPERTIES_INTERFACE {
      if let Some(property) = self.args.get(1).and_then(WireValue::as_str) {
        return format!("{}:{property}", self.member);
      }
    }
    let short = self.interface.rsplit('.').next().unwrap_or(self.interface);
    format!("{short}.{}", self.member)
  }
}

/// A signal received from the bus.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct InboundSignal {
  pub(crate) sender: String,
  pub(crate) path: String,
  pub(crate) interface: String,
  pub(crate) member: String,
  pub(crate) args: Vec<WireValue>,
}

impl InboundSignal {
  /// Identity of the object that emitted the signal.
  pub(crate) fn origin(&self) -> ObjectIdentity {
    ObjectIdentity::new(self.sender.as_str(), self.path.as_str())
  }
}

/// A signal match rule, scoped to one interface and optionally one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct SignalMatch {
  pub(crate) interface: &'static str,
  pub(crate) member: Option<&'static str>,
}

impl SignalMatch {
  pub(crate) const fn interface(interface: &'static str) -> Self {
    Self {
      interface,
      member: None,
    }
  }

  pub(crate) const fn member(interface: &'static str, member: &'static str) -> Self {
    Self {
      interface,
      member: Some(member),
    }
  }

  pub(crate) fn rule(&self) -> String {
    match self.member {
      Some(member) => format!("type='signal',interface='{}',member='{member}'", self.interface),
      None => format!("type='signal',interface='{}'", self.interface),
    }
  }

  pub(crate) fn matches(&self, signal: &InboundSignal) -> bool {
    signal.interface == self.interface && self.member.is_none_or(|m| m == signal.member)
  }
}

/// Decode `reply` with each shape in turn, returning the first that fits.
///
/// Some servers answer `GetIndexInParent` and `GetCharacterExtents` with an
/// older signature; pass the current shape first and the older one after.
pub(crate) fn decode_shapes<T>(
  member: &str,
  reply: &[WireValue],
  shapes: &[fn(&[WireValue]) -> Option<T>],
) -> AtspioResult<T> {
  shapes
    .iter()
    .find_map(|shape| shape(reply))
    .ok_or_else(|| AtspioError::malformed(member, format!("unexpected reply {reply:?}")))
}

/// The first reply value, or a malformed-reply error.
pub(crate) fn first<'a>(member: &str, reply: &'a [WireValue]) -> AtspioResult<&'a WireValue> {
  reply
    .first()
    .map(WireValue::unwrapped)
    .ok_or_else(|| AtspioError::malformed(member, "empty reply"))
}
