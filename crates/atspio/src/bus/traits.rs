/*!
Transport abstraction traits.

Core code talks to the bus only through these traits. The production
implementation lives in `zbus_transport.rs`; tests use an in-memory fake.
*/

use std::sync::Arc;

use super::wire::{InboundSignal, MethodCall, SignalMatch, WireValue};
use crate::types::AtspioResult;

/// Completion callback for a fire-and-forget call.
pub(crate) type ReplyCallback = Box<dyn FnOnce(AtspioResult<Vec<WireValue>>) + Send>;

/// Receives every signal delivered to a connection.
pub(crate) type SignalHandler = Arc<dyn Fn(InboundSignal) + Send + Sync>;

/// One open bus connection.
pub(crate) trait BusTransport: Send + Sync {
  /// Blocking call, bounded by the connection's method timeout.
  fn call(&self, call: &MethodCall) -> AtspioResult<Vec<WireValue>>;

  /// Fire-and-forget call. Calls on one transport complete in issue order.
  fn call_async(&self, call: MethodCall, reply: ReplyCallback);

  fn add_match(&self, rule: &SignalMatch) -> AtspioResult<()>;

  fn remove_match(&self, rule: &SignalMatch) -> AtspioResult<()>;

  /// Install the handler for inbound signals, replacing any previous one.
  fn set_signal_handler(&self, handler: SignalHandler);
}

/// Opens connections. Separate from [`BusTransport`] so the connector can be
/// driven by a fake in tests.
pub(crate) trait BusOpener: Send + Sync {
  fn session(&self) -> AtspioResult<Arc<dyn BusTransport>>;

  fn open(&self, address: &str) -> AtspioResult<Arc<dyn BusTransport>>;
}
