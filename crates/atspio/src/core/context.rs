/*!
Shared state every handle carries: the connector and the object cache.
*/

use std::sync::Arc;

use super::cache::ObjectCache;
use crate::accessible::{Accessible, AccessibleData};
use crate::bus::wire::first;
use crate::bus::{BusConnector, MethodCall, WireValue};
use crate::types::{AtspioError, AtspioResult, ObjectIdentity};

#[derive(Debug)]
pub(crate) struct Context {
  pub(crate) connector: Arc<BusConnector>,
  pub(crate) cache: ObjectCache,
}

impl Context {
  pub(crate) const fn new(connector: Arc<BusConnector>, cache: ObjectCache) -> Self {
    Self { connector, cache }
  }

  /// Blocking call on the accessibility bus (or its fallback).
  pub(crate) fn call(&self, call: &MethodCall) -> AtspioResult<Vec<WireValue>> {
    let bus = self.connector.connection().ok_or(AtspioError::NotConnected)?;
    bus.call(call)
  }

  /// Blocking call on the session bus.
  pub(crate) fn call_session(&self, call: &MethodCall) -> AtspioResult<Vec<WireValue>> {
    let bus = self.connector.session().ok_or(AtspioError::NotConnected)?;
    bus.call(call)
  }

  /// Read one property of the object named by `identity`.
  pub(crate) fn property(
    &self,
    identity: &ObjectIdentity,
    interface: &'static str,
    name: &str,
  ) -> AtspioResult<WireValue> {
    let call =
      MethodCall::property_get(identity.bus_name(), identity.object_path(), interface, name);
    let reply = self.call(&call)?;
    first(name, &reply).cloned()
  }

  pub(crate) fn set_property(
    &self,
    identity: &ObjectIdentity,
    interface: &'static str,
    name: &str,
    value: WireValue,
  ) -> AtspioResult<()> {
    let call = MethodCall::property_set(
      identity.bus_name(),
      identity.object_path(),
      interface,
      name,
      value,
    );
    self.call(&call).map(drop)
  }

  /// Handle for `identity`, shared with other handles while caching is on.
  pub(crate) fn accessible(self: &Arc<Self>, identity: ObjectIdentity) -> Accessible {
    let data = self
      .cache
      .resolve(&identity, || Arc::new(AccessibleData::new(identity.clone())));
    Accessible::new(data, Arc::clone(self))
  }
}
