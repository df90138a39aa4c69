/*!
Transport backed by zbus.

Connections are built with a method timeout, so a hung peer fails the call
instead of blocking the caller. Async calls go through one worker thread per
connection so they complete in issue order. A pump thread forwards every
inbound signal to the installed handler until the transport is dropped.
*/

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use zbus::blocking::connection::Builder;
use zbus::blocking::fdo::DBusProxy;
use zbus::blocking::{Connection, MessageIterator};
use zbus::message::{Message, Type as MessageType};
use zbus::zvariant::{DynamicType, Structure, Value};
use zbus::MatchRule;

use super::traits::{BusOpener, BusTransport, ReplyCallback, SignalHandler};
use super::wire::{InboundSignal, MethodCall, SignalMatch, WireValue};
use crate::types::{AtspioError, AtspioResult};

/// Directed signal that wakes the pump so it can see the stop flag.
const WAKE_PATH: &str = "/org/a11y/atspio";
const WAKE_INTERFACE: &str = "org.a11y.atspio.Pump";

type Job = (MethodCall, ReplyCallback);

/// A live zbus connection plus its worker and pump threads.
pub(crate) struct ZbusTransport {
  conn: Connection,
  jobs: Mutex<mpsc::Sender<Job>>,
  handler: Arc<Mutex<Option<SignalHandler>>>,
  stop: Arc<AtomicBool>,
}

impl std::fmt::Debug for ZbusTransport {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ZbusTransport")
      .field("unique_name", &self.conn.unique_name())
      .finish_non_exhaustive()
  }
}

impl ZbusTransport {
  fn start(conn: Connection) -> AtspioResult<Self> {
    let (jobs, queue) = mpsc::channel::<Job>();
    let worker_conn = conn.clone();
    // Ends once the transport drops its sender.
    thread::Builder::new()
      .name("atspio-calls".into())
      .spawn(move || {
        for (call, reply) in queue {
          reply(invoke(&worker_conn, &call));
        }
      })
      .map_err(|e| AtspioError::Connection(e.to_string()))?;

    let handler: Arc<Mutex<Option<SignalHandler>>> = Arc::new(Mutex::new(None));
    let stop = Arc::new(AtomicBool::new(false));
    let pump_handler = Arc::clone(&handler);
    let pump_stop = Arc::clone(&stop);
    let pump_conn = conn.clone();
    thread::Builder::new()
      .name("atspio-signals".into())
      .spawn(move || pump_signals(&pump_conn, &pump_handler, &pump_stop))
      .map_err(|e| AtspioError::Connection(e.to_string()))?;

    Ok(Self {
      conn,
      jobs: Mutex::new(jobs),
      handler,
      stop,
    })
  }

  fn dbus(&self) -> AtspioResult<DBusProxy<'_>> {
    DBusProxy::new(&self.conn).map_err(|e| AtspioError::Connection(e.to_string()))
  }
}

impl Drop for ZbusTransport {
  fn drop(&mut self) {
    self.stop.store(true, Ordering::Release);
    let Some(name) = self.conn.unique_name() else {
      return;
    };
    if let Err(e) = self
      .conn
      .emit_signal(Some(name.as_str()), WAKE_PATH, WAKE_INTERFACE, "Stop", &())
    {
      log::debug!("Could not wake the signal pump: {e}");
    }
  }
}

impl BusTransport for ZbusTransport {
  fn call(&self, call: &MethodCall) -> AtspioResult<Vec<WireValue>> {
    invoke(&self.conn, call)
  }

  fn call_async(&self, call: MethodCall, reply: ReplyCallback) {
    let sent = self.jobs.lock().send((call, reply));
    if let Err(mpsc::SendError((call, reply))) = sent {
      reply(Err(AtspioError::remote(call.member, "call worker stopped")));
    }
  }

  fn add_match(&self, rule: &SignalMatch) -> AtspioResult<()> {
    let text = rule.rule();
    let parsed = MatchRule::try_from(text.as_str()).map_err(|e| AtspioError::remote("AddMatch", e))?;
    self
      .dbus()?
      .add_match_rule(parsed)
      .map_err(|e| AtspioError::remote("AddMatch", e))
  }

  fn remove_match(&self, rule: &SignalMatch) -> AtspioResult<()> {
    let text = rule.rule();
    let parsed =
      MatchRule::try_from(text.as_str()).map_err(|e| AtspioError::remote("RemoveMatch", e))?;
    self
      .dbus()?
      .remove_match_rule(parsed)
      .map_err(|e| AtspioError::remote("RemoveMatch", e))
  }

  fn set_signal_handler(&self, handler: SignalHandler) {
    *self.handler.lock() = Some(handler);
  }
}

/// Opens zbus connections whose method calls give up after `method_timeout`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ZbusOpener {
  method_timeout: Duration,
}

impl ZbusOpener {
  pub(crate) const fn new(method_timeout: Duration) -> Self {
    Self { method_timeout }
  }
}

impl BusOpener for ZbusOpener {
  fn session(&self) -> AtspioResult<Arc<dyn BusTransport>> {
    let conn = Builder::session()
      .map(|builder| builder.method_timeout(self.method_timeout))
      .and_then(Builder::build)
      .map_err(|e| AtspioError::Connection(e.to_string()))?;
    Ok(Arc::new(ZbusTransport::start(conn)?))
  }

  fn open(&self, address: &str) -> AtspioResult<Arc<dyn BusTransport>> {
    let conn = Builder::address(address)
      .map(|builder| builder.method_timeout(self.method_timeout))
      .and_then(Builder::build)
      .map_err(|e| AtspioError::Connection(format!("{address}: {e}")))?;
    Ok(Arc::new(ZbusTransport::start(conn)?))
  }
}

fn pump_signals(conn: &Connection, handler: &Mutex<Option<SignalHandler>>, stop: &AtomicBool) {
  for message in MessageIterator::from(conn) {
    if stop.load(Ordering::Acquire) {
      break;
    }
    let Ok(message) = message else {
      continue;
    };
    let Some(signal) = inbound_signal(&message) else {
      continue;
    };
    // Clone out so the handler runs without the lock held.
    let current = handler.lock().clone();
    if let Some(current) = current {
      current(signal);
    }
  }
  log::debug!("Signal pump stopped");
}

fn inbound_signal(message: &Message) -> Option<InboundSignal> {
  let header = message.header();
  if header.message_type() != MessageType::Signal {
    return None;
  }
  let args = match decode_body(message) {
    Ok(args) => args,
    Err(e) => {
      log::debug!("Ignoring undecodable signal: {e}");
      return None;
    }
  };
  Some(InboundSignal {
    sender: header.sender().map(ToString::to_string).unwrap_or_default(),
    path: header.path().map(ToString::to_string).unwrap_or_default(),
    interface: header.interface().map(ToString::to_string).unwrap_or_default(),
    member: header.member().map(ToString::to_string).unwrap_or_default(),
    args,
  })
}

fn call_error(call: &MethodCall, error: zbus::Error) -> AtspioError {
  match error {
    zbus::Error::InputOutput(io) if io.kind() == std::io::ErrorKind::TimedOut => {
      AtspioError::Timeout {
        member: call.describe(),
      }
    }
    other => AtspioError::remote(call.member, other),
  }
}

fn invoke(conn: &Connection, call: &MethodCall) -> AtspioResult<Vec<WireValue>> {
  use WireValue::{Str, Variant, I32, U32};

  let sent = match call.args.as_slice() {
    [] => send(conn, call, &()),
    [I32(a)] => send(conn, call, &(*a,)),
    [U32(a)] => send(conn, call, &(*a,)),
    [Str(a)] => send(conn, call, &(a.as_str(),)),
    [I32(a), I32(b)] => send(conn, call, &(*a, *b)),
    [I32(a), U32(b)] => send(conn, call, &(*a, *b)),
    [I32(a), I32(b), I32(c)] => send(conn, call, &(*a, *b, *c)),
    [I32(a), Str(b), I32(c)] => send(conn, call, &(*a, b.as_str(), *c)),
    [Str(a), Str(b)] => send(conn, call, &(a.as_str(), b.as_str())),
    [Str(a), Str(b), Variant(v)] => {
      let Some(value) = to_value(v) else {
        return Err(AtspioError::UnsupportedCall {
          member: call.describe(),
        });
      };
      send(conn, call, &(a.as_str(), b.as_str(), value))
    }
    _ => {
      return Err(AtspioError::UnsupportedCall {
        member: call.describe(),
      })
    }
  };

  let reply = sent.map_err(|e| call_error(call, e))?;
  decode_body(&reply)
}

fn send<B>(conn: &Connection, call: &MethodCall, body: &B) -> zbus::Result<Message>
where
  B: serde::Serialize + DynamicType,
{
  conn.call_method(
    Some(call.destination.as_str()),
    call.path.as_str(),
    Some(call.interface),
    call.member,
    body,
  )
}

fn decode_body(message: &Message) -> AtspioResult<Vec<WireValue>> {
  let body = message.body();
  if body.signature().to_string().is_empty() {
    return Ok(Vec::new());
  }
  let fields: Structure<'_> = body
    .deserialize()
    .map_err(|e| AtspioError::malformed("reply", e))?;
  Ok(fields.fields().iter().map(from_value).collect())
}

fn from_value(value: &Value<'_>) -> WireValue {
  match value {
    Value::Bool(v) => WireValue::Bool(*v),
    Value::U8(v) => WireValue::Byte(*v),
    Value::I16(v) => WireValue::I16(*v),
    Value::U16(v) => WireValue::U16(*v),
    Value::I32(v) => WireValue::I32(*v),
    Value::U32(v) => WireValue::U32(*v),
    Value::I64(v) => WireValue::I64(*v),
    Value::U64(v) => WireValue::U64(*v),
    Value::F64(v) => WireValue::F64(*v),
    Value::Str(s) => WireValue::Str(s.as_str().to_owned()),
    Value::ObjectPath(p) => WireValue::ObjectPath(p.as_str().to_owned()),
    Value::Value(inner) => WireValue::Variant(Box::new(from_value(inner))),
    Value::Array(items) => WireValue::Array(items.inner().iter().map(from_value).collect()),
    Value::Structure(s) => WireValue::Struct(s.fields().iter().map(from_value).collect()),
    #[allow(clippy::wildcard_enum_match_arm)]
    _ => WireValue::Unsupported,
  }
}

fn to_value(value: &WireValue) -> Option<Value<'_>> {
  let value = match value.unwrapped() {
    WireValue::Bool(v) => Value::from(*v),
    WireValue::Byte(v) => Value::from(*v),
    WireValue::I16(v) => Value::from(*v),
    WireValue::U16(v) => Value::from(*v),
    WireValue::I32(v) => Value::from(*v),
    WireValue::U32(v) => Value::from(*v),
    WireValue::I64(v) => Value::from(*v),
    WireValue::U64(v) => Value::from(*v),
    WireValue::F64(v) => Value::from(*v),
    WireValue::Str(s) => Value::from(s.as_str()),
    WireValue::ObjectPath(_)
    | WireValue::Array(_)
    | WireValue::Struct(_)
    | WireValue::Variant(_)
    | WireValue::Unsupported => return None,
  };
  Some(value)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io;

  fn call() -> MethodCall {
    MethodCall::new(":1.42", "/x", "org.a11y.atspi.Accessible", "GetChildren")
  }

  #[test]
  fn timed_out_calls_map_to_timeout() {
    let error = zbus::Error::InputOutput(Arc::new(io::Error::new(
      io::ErrorKind::TimedOut,
      "method call timed out",
    )));
    assert!(matches!(
      call_error(&call(), error),
      AtspioError::Timeout { .. }
    ));
  }

  #[test]
  fn other_failures_stay_remote() {
    let error = zbus::Error::InputOutput(Arc::new(io::Error::new(
      io::ErrorKind::BrokenPipe,
      "peer went away",
    )));
    assert!(matches!(
      call_error(&call(), error),
      AtspioError::Remote { .. }
    ));
  }

  #[test]
  fn only_scalars_encode_as_property_values() {
    assert!(to_value(&WireValue::Struct(Vec::new())).is_none());
    assert!(to_value(&WireValue::Variant(Box::new(WireValue::Bool(true)))).is_some());
  }
}
