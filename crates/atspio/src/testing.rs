/*!
In-memory bus used by unit tests.

[`FakeBus`] answers scripted calls, records every call and match rule, and can
hold async completions until [`FakeBus::release`] so tests control exactly
when the connector resolves. A capturing logger counts warnings per thread.
*/

use std::cell::RefCell;
use std::sync::{Arc, Once};

use parking_lot::Mutex;

use crate::bus::names::interface;
use crate::bus::{
  BusOpener, BusTransport, InboundSignal, MethodCall, ReplyCallback, SignalHandler, SignalMatch,
  WireValue,
};
use crate::types::{AtspioError, AtspioResult, ObjectIdentity};

/// Bus name used for the fake application in tests.
pub(crate) const APP: &str = ":1.42";

pub(crate) fn id(path: &str) -> ObjectIdentity {
  ObjectIdentity::new(APP, path)
}

enum Pattern {
  Exact(MethodCall),
  Member(&'static str),
}

impl Pattern {
  fn matches(&self, call: &MethodCall) -> bool {
    match self {
      Self::Exact(expected) => expected == call,
      Self::Member(member) => *member == call.member,
    }
  }
}

#[derive(Default)]
struct FakeState {
  scripts: Vec<(Pattern, AtspioResult<Vec<WireValue>>)>,
  calls: Vec<MethodCall>,
  matches: Vec<SignalMatch>,
  hold_async: bool,
  held: Vec<(MethodCall, ReplyCallback)>,
  handler: Option<SignalHandler>,
}

#[derive(Default)]
pub(crate) struct FakeBus {
  state: Mutex<FakeState>,
}

impl std::fmt::Debug for FakeBus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FakeBus").finish_non_exhaustive()
  }
}

impl FakeBus {
  pub(crate) fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  /// Whether `transport` is this fake.
  pub(crate) fn is(transport: &Arc<dyn BusTransport>, fake: &Arc<Self>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(transport), Arc::as_ptr(fake))
  }

  /// Answer calls equal to `call`. Later scripts win over earlier ones.
  pub(crate) fn script(&self, call: MethodCall, reply: AtspioResult<Vec<WireValue>>) {
    self.state.lock().scripts.push((Pattern::Exact(call), reply));
  }

  pub(crate) fn script_ok(&self, call: MethodCall, reply: Vec<WireValue>) {
    self.script(call, Ok(reply));
  }

  /// Answer every call to `member`, whatever its target or arguments.
  pub(crate) fn script_member(&self, member: &'static str, reply: AtspioResult<Vec<WireValue>>) {
    self.state.lock().scripts.push((Pattern::Member(member), reply));
  }

  pub(crate) fn script_property(
    &self,
    identity: &ObjectIdentity,
    iface: &'static str,
    property: &str,
    value: WireValue,
  ) {
    self.script_ok(
      MethodCall::property_get(identity.bus_name(), identity.object_path(), iface, property),
      vec![WireValue::Variant(Box::new(value))],
    );
  }

  pub(crate) fn script_interfaces(&self, identity: &ObjectIdentity, names: &[&str]) {
    self.script_ok(
      MethodCall::on(identity, interface::ACCESSIBLE, "GetInterfaces"),
      vec![WireValue::Array(
        names.iter().map(|n| WireValue::from(*n)).collect(),
      )],
    );
  }

  /// Script a consistent parent/children relation for `parent`.
  pub(crate) fn script_children(&self, parent: &ObjectIdentity, children: &[ObjectIdentity]) {
    self.script_ok(
      MethodCall::on(parent, interface::ACCESSIBLE, "GetChildren"),
      vec![WireValue::Array(
        children.iter().map(WireValue::object_ref).collect(),
      )],
    );
    let count = i32::try_from(children.len()).unwrap_or(i32::MAX);
    self.script_property(parent, interface::ACCESSIBLE, "ChildCount", WireValue::I32(count));
    for (index, child) in (0..).zip(children) {
      self.script_ok(
        MethodCall::on(parent, interface::ACCESSIBLE, "GetChildAtIndex").arg(index),
        vec![WireValue::object_ref(child)],
      );
      self.script_property(
        child,
        interface::ACCESSIBLE,
        "Parent",
        WireValue::object_ref(parent),
      );
      self.script_ok(
        MethodCall::on(child, interface::ACCESSIBLE, "GetIndexInParent"),
        vec![WireValue::I32(index)],
      );
    }
  }

  pub(crate) fn calls(&self) -> Vec<MethodCall> {
    self.state.lock().calls.clone()
  }

  pub(crate) fn calls_to(&self, member: &str) -> Vec<MethodCall> {
    self
      .calls()
      .into_iter()
      .filter(|c| c.member == member)
      .collect()
  }

  pub(crate) fn active_matches(&self) -> Vec<SignalMatch> {
    self.state.lock().matches.clone()
  }

  pub(crate) fn hold_async(&self, hold: bool) {
    self.state.lock().hold_async = hold;
  }

  /// Complete every held async call in issue order. Returns how many ran.
  pub(crate) fn release(&self) -> usize {
    let held = std::mem::take(&mut self.state.lock().held);
    let count = held.len();
    for (call, reply) in held {
      let result = self.lookup(&call);
      reply(result);
    }
    count
  }

  /// Deliver `signal` to the installed handler.
  pub(crate) fn emit(&self, signal: InboundSignal) {
    let handler = self.state.lock().handler.clone();
    if let Some(handler) = handler {
      handler(signal);
    }
  }

  pub(crate) fn has_handler(&self) -> bool {
    self.state.lock().handler.is_some()
  }

  fn lookup(&self, call: &MethodCall) -> AtspioResult<Vec<WireValue>> {
    self
      .state
      .lock()
      .scripts
      .iter()
      .rev()
      .find(|(pattern, _)| pattern.matches(call))
      .map_or_else(
        || Err(AtspioError::remote(call.member, "no scripted reply")),
        |(_, reply)| reply.clone(),
      )
  }
}

impl BusTransport for FakeBus {
  fn call(&self, call: &MethodCall) -> AtspioResult<Vec<WireValue>> {
    self.state.lock().calls.push(call.clone());
    self.lookup(call)
  }

  fn call_async(&self, call: MethodCall, reply: ReplyCallback) {
    let held = {
      let mut state = self.state.lock();
      state.calls.push(call.clone());
      if state.hold_async {
        state.held.push((call, reply));
        None
      } else {
        Some((call, reply))
      }
    };
    if let Some((call, reply)) = held {
      let result = self.lookup(&call);
      reply(result);
    }
  }

  fn add_match(&self, rule: &SignalMatch) -> AtspioResult<()> {
    self.state.lock().matches.push(*rule);
    Ok(())
  }

  fn remove_match(&self, rule: &SignalMatch) -> AtspioResult<()> {
    let mut state = self.state.lock();
    if let Some(pos) = state.matches.iter().position(|m| m == rule) {
      state.matches.remove(pos);
    }
    Ok(())
  }

  fn set_signal_handler(&self, handler: SignalHandler) {
    self.state.lock().handler = Some(handler);
  }
}

/// Hands out fixed fake buses.
#[derive(Debug)]
pub(crate) struct FakeOpener {
  session: Option<Arc<FakeBus>>,
  a11y: Option<Arc<FakeBus>>,
}

impl FakeOpener {
  pub(crate) fn new(session: Arc<FakeBus>, a11y: Option<Arc<FakeBus>>) -> Arc<Self> {
    Arc::new(Self {
      session: Some(session),
      a11y,
    })
  }

  /// No bus at all.
  pub(crate) fn unavailable() -> Arc<Self> {
    Arc::new(Self {
      session: None,
      a11y: None,
    })
  }
}

impl BusOpener for FakeOpener {
  fn session(&self) -> AtspioResult<Arc<dyn BusTransport>> {
    match &self.session {
      Some(bus) => Ok(Arc::clone(bus) as Arc<dyn BusTransport>),
      None => Err(AtspioError::Connection("no session bus".into())),
    }
  }

  fn open(&self, address: &str) -> AtspioResult<Arc<dyn BusTransport>> {
    match &self.a11y {
      Some(bus) => Ok(Arc::clone(bus) as Arc<dyn BusTransport>),
      None => Err(AtspioError::Connection(format!("cannot open {address}"))),
    }
  }
}

/// Build an object-event signal the way the registry broadcasts it.
pub(crate) fn object_signal(
  origin: &ObjectIdentity,
  member: &str,
  kind: &str,
  detail1: i32,
  detail2: i32,
  any_data: WireValue,
) -> InboundSignal {
  InboundSignal {
    sender: origin.bus_name().to_owned(),
    path: origin.object_path().to_owned(),
    interface: interface::EVENT_OBJECT.to_owned(),
    member: member.to_owned(),
    args: vec![
      WireValue::from(kind),
      WireValue::I32(detail1),
      WireValue::I32(detail2),
      WireValue::Variant(Box::new(any_data)),
    ],
  }
}

struct CaptureLogger;

static LOGGER: CaptureLogger = CaptureLogger;
static INSTALL: Once = Once::new();

thread_local! {
  static RECORDS: RefCell<Vec<(log::Level, String)>> = const { RefCell::new(Vec::new()) };
}

impl log::Log for CaptureLogger {
  fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
    true
  }

  fn log(&self, record: &log::Record<'_>) {
    RECORDS.with(|r| r.borrow_mut().push((record.level(), record.args().to_string())));
  }

  fn flush(&self) {}
}

/// Run `f` and return the warnings it logged on this thread.
pub(crate) fn capture_warnings<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
  INSTALL.call_once(|| {
    if log::set_logger(&LOGGER).is_ok() {
      log::set_max_level(log::LevelFilter::Trace);
    }
  });
  RECORDS.with(|r| r.borrow_mut().clear());
  let result = f();
  let warnings = RECORDS.with(|r| {
    r.borrow_mut()
      .drain(..)
      .filter(|(level, _)| *level == log::Level::Warn)
      .map(|(_, message)| message)
      .collect()
  });
  (result, warnings)
}
