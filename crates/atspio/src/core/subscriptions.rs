/*!
Event Subscription Manager.

Consumers toggle [`EventListener`] categories; the registry and the bus speak
in wire categories. Each listener maps to one or more [`WireEvent`]s, and a
request is applied by diffing the wire sets: removed categories are
deregistered and their match rules dropped, added categories get their match
rule first and are registered after, so no racing signal is missed. `Focus`
maps onto the state-change category as well as the legacy focus category,
which makes the "drop state changes only when nobody needs them" rule fall
out of the set difference.

Requests made before the connector resolves are parked and applied once on
resolution. The manager's state reflects what the consumer asked for, not
what the registry acknowledged; failed calls are logged and not rolled back.

Calls are issued while holding the manager lock, so per-category
register/deregister calls leave in the order of the state transitions.
*/

use std::collections::BTreeSet;

use parking_lot::Mutex;

use crate::bus::names::{interface, REGISTRY_PATH, REGISTRY_SERVICE};
use crate::bus::{BusConnector, MethodCall, SignalMatch};
use crate::types::{EventListener, EventListeners};

/// One registry event category and the signals it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum WireEvent {
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
  PropertyChange,
}

impl WireEvent {
  /// Category string passed to `RegisterEvent`/`DeregisterEvent`.
  pub(crate) const fn registration(self) -> &'static str {
    match self {
      Self::Window => "window:",
      Self::Focus => "focus:",
      Self::StateChanged => "object:state-changed",
      Self::ChildrenChanged => "object:children-changed",
      Self::VisibleDataChanged => "object:visible-data-changed",
      Self::SelectionChanged => "object:selection-changed",
      Self::ModelChanged => "object:model-changed",
      Self::TextCaretMoved => "object:text-caret-moved",
      Self::TextChanged => "object:text-changed",
      Self::TextSelectionChanged => "object:text-selection-changed",
      Self::PropertyChange => "object:property-change",
    }
  }

  /// Signal member on the object-event interface, for object categories.
  const fn object_member(self) -> Option<&'static str> {
    match self {
      Self::Window | Self::Focus => None,
      Self::StateChanged => Some("StateChanged"),
      Self::ChildrenChanged => Some("ChildrenChanged"),
      Self::VisibleDataChanged => Some("VisibleDataChanged"),
      Self::SelectionChanged => Some("SelectionChanged"),
      Self::ModelChanged => Some("ModelChanged"),
      Self::TextCaretMoved => Some("TextCaretMoved"),
      Self::TextChanged => Some("TextChanged"),
      Self::TextSelectionChanged => Some("TextSelectionChanged"),
      Self::PropertyChange => Some("PropertyChange"),
    }
  }

  const OBJECT: [Self; 9] = [
    Self::StateChanged,
    Self::ChildrenChanged,
    Self::VisibleDataChanged,
    Self::SelectionChanged,
    Self::ModelChanged,
    Self::TextCaretMoved,
    Self::TextChanged,
    Self::TextSelectionChanged,
    Self::PropertyChange,
  ];

  /// Match rule delivering this category's signals.
  pub(crate) const fn signal_match(self) -> SignalMatch {
    match self {
      Self::Window => SignalMatch::interface(interface::EVENT_WINDOW),
      Self::Focus => SignalMatch::member(interface::EVENT_FOCUS, "Focus"),
      other => match other.object_member() {
        Some(member) => SignalMatch::member(interface::EVENT_OBJECT, member),
        None => SignalMatch::interface(interface::EVENT_OBJECT),
      },
    }
  }

  /// Which category an inbound signal belongs to.
  pub(crate) fn from_signal(interface_name: &str, member: &str) -> Option<Self> {
    match interface_name {
      interface::EVENT_WINDOW => Some(Self::Window),
      interface::EVENT_FOCUS if member == "Focus" => Some(Self::Focus),
      interface::EVENT_OBJECT => Self::OBJECT
        .into_iter()
        .find(|wire| wire.object_member() == Some(member)),
      _ => None,
    }
  }

  const fn for_listener(listener: EventListener) -> &'static [Self] {
    match listener {
      EventListener::Window => &[Self::Window],
      EventListener::Focus => &[Self::Focus, Self::StateChanged],
      EventListener::StateChanged => &[Self::StateChanged],
      EventListener::ChildrenChanged => &[Self::ChildrenChanged],
      EventListener::VisibleDataChanged => &[Self::VisibleDataChanged],
      EventListener::SelectionChanged => &[Self::SelectionChanged],
      EventListener::ModelChanged => &[Self::ModelChanged],
      EventListener::TextCaretMoved => &[Self::TextCaretMoved],
      EventListener::TextChanged => &[Self::TextChanged],
      EventListener::TextSelectionChanged => &[Self::TextSelectionChanged],
      EventListener::PropertyChanged => &[Self::PropertyChange],
    }
  }

  pub(crate) fn for_listeners(listeners: EventListeners) -> BTreeSet<Self> {
    listeners
      .iter()
      .flat_map(|listener| Self::for_listener(listener).iter().copied())
      .collect()
  }
}

#[derive(Debug, Default)]
struct State {
  current: EventListeners,
  pending: Option<EventListeners>,
}

#[derive(Debug, Default)]
pub(crate) struct SubscriptionManager {
  state: Mutex<State>,
}

impl SubscriptionManager {
  /// Listeners as last requested (pending requests included).
  pub(crate) fn requested(&self) -> EventListeners {
    let state = self.state.lock();
    state.pending.unwrap_or(state.current)
  }

  /// Listeners currently applied to the bus.
  pub(crate) fn active(&self) -> EventListeners {
    self.state.lock().current
  }

  pub(crate) fn subscribe(&self, connector: &BusConnector, requested: EventListeners) {
    let mut state = self.state.lock();
    if !connector.state().is_resolved() {
      log::debug!("Deferring subscription until the bus resolves");
      state.pending = Some(requested);
      return;
    }
    state.pending = None;
    Self::apply(&mut state, connector, requested);
  }

  /// Apply the request parked while resolving, if any.
  pub(crate) fn flush_pending(&self, connector: &BusConnector) {
    let mut state = self.state.lock();
    if let Some(requested) = state.pending.take() {
      Self::apply(&mut state, connector, requested);
    }
  }

  fn apply(state: &mut State, connector: &BusConnector, requested: EventListeners) {
    let before = WireEvent::for_listeners(state.current);
    let after = WireEvent::for_listeners(requested);
    state.current = requested;
    if before == after {
      return;
    }
    let Some(bus) = connector.connection() else {
      log::warn!("No bus connection; event subscriptions are not applied");
      return;
    };

    for wire in before.difference(&after) {
      bus.call_async(
        registry_call("DeregisterEvent", *wire),
        Box::new(|reply| {
          if let Err(e) = reply {
            log::warn!("DeregisterEvent failed: {e}");
          }
        }),
      );
      if let Err(e) = bus.remove_match(&wire.signal_match()) {
        log::warn!("Removing match for {} failed: {e}", wire.registration());
      }
    }

    for wire in after.difference(&before) {
      if let Err(e) = bus.add_match(&wire.signal_match()) {
        log::warn!("Adding match for {} failed: {e}", wire.registration());
      }
      bus.call_async(
        registry_call("RegisterEvent", *wire),
        Box::new(|reply| {
          if let Err(e) = reply {
            log::warn!("RegisterEvent failed: {e}");
          }
        }),
      );
    }
  }
}

fn registry_call(member: &'static str, wire: WireEvent) -> MethodCall {
  MethodCall::new(REGISTRY_SERVICE, REGISTRY_PATH, interface::REGISTRY, member)
    .arg(wire.registration())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bus::WireValue;
  use crate::core::{test_instance, test_instance_resolving};
  use crate::testing::FakeBus;

  fn registered(bus: &FakeBus, member: &str) -> Vec<String> {
    bus
      .calls_to(member)
      .iter()
      .filter_map(|c| c.args.first().and_then(WireValue::as_str).map(str::to_owned))
      .collect()
  }

  #[test]
  fn diff_touches_only_changed_categories() {
    let (atspio, bus) = test_instance();
    atspio.set_listeners(EventListener::Window | EventListener::ChildrenChanged);
    assert_eq!(
      registered(&bus, "RegisterEvent"),
      vec!["window:", "object:children-changed"]
    );

    atspio.set_listeners(EventListener::ChildrenChanged | EventListener::TextChanged);
    assert_eq!(registered(&bus, "DeregisterEvent"), vec!["window:"]);
    assert_eq!(
      registered(&bus, "RegisterEvent"),
      vec!["window:", "object:children-changed", "object:text-changed"]
    );
  }

  #[test]
  fn match_is_installed_before_register() {
    let (atspio, bus) = test_instance();
    atspio.set_listeners(EventListener::TextCaretMoved.into());
    assert_eq!(
      bus.active_matches(),
      vec![SignalMatch::member(interface::EVENT_OBJECT, "TextCaretMoved")]
    );
    atspio.set_listeners(EventListeners::NONE);
    assert!(bus.active_matches().is_empty());
  }

  #[test]
  fn focus_shares_state_changes() {
    let (atspio, bus) = test_instance();
    atspio.set_listeners(EventListener::Focus.into());
    assert_eq!(
      registered(&bus, "RegisterEvent"),
      vec!["focus:", "object:state-changed"]
    );

    // Adding StateChanged changes nothing on the wire.
    atspio.set_listeners(EventListener::Focus | EventListener::StateChanged);
    assert_eq!(registered(&bus, "RegisterEvent").len(), 2);

    // Dropping Focus keeps state changes because StateChanged still wants them.
    atspio.set_listeners(EventListener::StateChanged.into());
    assert_eq!(registered(&bus, "DeregisterEvent"), vec!["focus:"]);

    atspio.set_listeners(EventListeners::NONE);
    assert_eq!(
      registered(&bus, "DeregisterEvent"),
      vec!["focus:", "object:state-changed"]
    );
  }

  #[test]
  fn failed_register_keeps_state() {
    let (atspio, bus) = test_instance();
    bus.script_member(
      "RegisterEvent",
      Err(crate::types::AtspioError::remote("RegisterEvent", "denied")),
    );
    let ((), warnings) = crate::testing::capture_warnings(|| {
      atspio.set_listeners(EventListener::Window.into());
    });
    assert_eq!(warnings.len(), 1);
    assert_eq!(atspio.listeners(), EventListener::Window.into());
    assert_eq!(bus.active_matches().len(), 1);
  }

  #[test]
  fn requests_while_resolving_are_flushed_once() {
    let (atspio, session, a11y) = test_instance_resolving();
    atspio.set_listeners(EventListener::Window.into());
    atspio.set_listeners(EventListener::Window | EventListener::TextChanged);
    assert!(a11y.calls_to("RegisterEvent").is_empty());
    assert_eq!(
      atspio.listeners(),
      EventListener::Window | EventListener::TextChanged
    );

    session.release();

    assert_eq!(
      registered(&a11y, "RegisterEvent"),
      vec!["window:", "object:text-changed"]
    );
    assert!(a11y.calls_to("DeregisterEvent").is_empty());
    assert!(a11y.has_handler());

    // Nothing left to flush.
    atspio.inner.subscriptions.flush_pending(&atspio.inner.ctx.connector);
    assert_eq!(a11y.calls_to("RegisterEvent").len(), 2);
  }

  #[test]
  fn every_signal_maps_back_to_its_category() {
    for listener in EventListener::ALL {
      for wire in WireEvent::for_listener(listener) {
        let rule = wire.signal_match();
        let member = rule.member.unwrap_or("Create");
        assert_eq!(WireEvent::from_signal(rule.interface, member), Some(*wire));
      }
    }
  }
}
