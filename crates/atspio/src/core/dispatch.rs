/*!
Event Dispatcher.

Turns inbound registry signals into typed [`Event`]s. The origin of every
event is the signal's sender and path, not any reference in the body. Object
signals carry `(kind, detail1, detail2, any_data)`; bodies that are short or
oddly typed are read leniently.
*/

use super::subscriptions::WireEvent;
use super::Inner;
use crate::accessible::Accessible;
use crate::bus::{InboundSignal, WireValue};
use crate::types::{Event, EventListener, EventListeners, WindowEvent};

#[derive(Debug, Default)]
struct SignalBody<'a> {
  kind: &'a str,
  detail1: i32,
  detail2: i32,
  any_data: Option<&'a WireValue>,
}

impl<'a> SignalBody<'a> {
  fn parse(args: &'a [WireValue]) -> Self {
    let mut args = args.iter();
    Self {
      kind: args.next().and_then(WireValue::as_str).unwrap_or_default(),
      detail1: args.next().and_then(WireValue::as_i32).unwrap_or_default(),
      detail2: args.next().and_then(WireValue::as_i32).unwrap_or_default(),
      any_data: args.next().map(WireValue::unwrapped),
    }
  }

  fn text(&self) -> String {
    self
      .any_data
      .and_then(WireValue::as_str)
      .unwrap_or_default()
      .to_owned()
  }
}

impl Inner {
  pub(super) fn dispatch(&self, signal: &InboundSignal) {
    let Some(wire) = WireEvent::from_signal(&signal.interface, &signal.member) else {
      return;
    };
    let origin = signal.origin();
    if !origin.is_valid() {
      log::debug!("Ignoring {} from invalid origin {origin}", signal.member);
      return;
    }
    let body = SignalBody::parse(&signal.args);
    let listeners = self.subscriptions.active();
    let object = self.ctx.accessible(origin);

    let event = match wire {
      WireEvent::StateChanged => return self.state_changed(object, &body, listeners),
      WireEvent::Window => WindowEvent::from_member(&signal.member)
        .filter(|_| listeners.contains(EventListener::Window))
        .map(|kind| Event::Window { kind, object }),
      WireEvent::Focus => listeners
        .contains(EventListener::Focus)
        .then_some(Event::FocusChanged { object }),
      WireEvent::ChildrenChanged => self.children_changed(object, &body, listeners),
      WireEvent::VisibleDataChanged => listeners
        .contains(EventListener::VisibleDataChanged)
        .then_some(Event::VisibleDataChanged { object }),
      WireEvent::SelectionChanged => listeners
        .contains(EventListener::SelectionChanged)
        .then_some(Event::SelectionChanged { object }),
      WireEvent::ModelChanged => listeners
        .contains(EventListener::ModelChanged)
        .then_some(Event::ModelChanged { object }),
      WireEvent::TextCaretMoved => listeners
        .contains(EventListener::TextCaretMoved)
        .then_some(Event::TextCaretMoved {
          object,
          position: body.detail1,
        }),
      WireEvent::TextSelectionChanged => listeners
        .contains(EventListener::TextSelectionChanged)
        .then_some(Event::TextSelectionChanged { object }),
      WireEvent::TextChanged => listeners
        .contains(EventListener::TextChanged)
        .then(|| text_changed(object, &body)),
      WireEvent::PropertyChange => listeners
        .contains(EventListener::PropertyChanged)
        .then(|| property_changed(object, &body)),
    };

    if let Some(event) = event {
      self.emit(event);
    }
  }

  fn state_changed(&self, object: Accessible, body: &SignalBody<'_>, listeners: EventListeners) {
    self.ctx.cache.clean_state(object.identity());
    let active = body.detail1 == 1;

    if body.kind == "defunct" && active {
      self.ctx.cache.remove(&object.identity().cache_key());
      self.emit(Event::Removed {
        object: object.clone(),
      });
      object.mark_defunct();
      return;
    }

    if body.kind == "focused" && active && listeners.contains(EventListener::Focus) {
      self.emit(Event::FocusChanged {
        object: object.clone(),
      });
    }
    if listeners.contains(EventListener::StateChanged) {
      self.emit(Event::StateChanged {
        object,
        state: body.kind.to_owned(),
        active,
      });
    }
  }

  fn children_changed(
    &self,
    parent: Accessible,
    body: &SignalBody<'_>,
    listeners: EventListeners,
  ) -> Option<Event> {
    if !listeners.contains(EventListener::ChildrenChanged) {
      return None;
    }
    let child = body
      .any_data
      .and_then(WireValue::as_object_ref)
      .filter(crate::types::ObjectIdentity::is_valid)
      .map(|id| self.ctx.accessible(id));
    let index = body.detail1;
    if body.kind.starts_with("add") {
      Some(Event::ChildAdded {
        parent,
        index,
        child,
      })
    } else if body.kind.starts_with("remove") {
      Some(Event::ChildRemoved {
        parent,
        index,
        child,
      })
    } else {
      log::debug!("Unknown children-changed kind {:?}", body.kind);
      None
    }
  }
}

fn text_changed(object: Accessible, body: &SignalBody<'_>) -> Event {
  let text = body.text();
  let start = body.detail1;
  let end = body.detail1.saturating_add(body.detail2);
  if body.kind.starts_with("insert") {
    Event::TextInserted {
      object,
      text,
      start,
      end,
    }
  } else if body.kind.starts_with("delete") {
    Event::TextRemoved {
      object,
      text,
      start,
      end,
    }
  } else {
    Event::TextChanged {
      object,
      text,
      start,
      end,
    }
  }
}

fn property_changed(object: Accessible, body: &SignalBody<'_>) -> Event {
  match body.kind {
    "accessible-name" => Event::NameChanged { object },
    "accessible-description" => Event::DescriptionChanged { object },
    property => Event::PropertyChanged {
      object,
      property: property.to_owned(),
    },
  }
}

#[cfg(test)]
mod tests {
  use async_broadcast::Receiver;

  use super::*;
  use crate::bus::names::interface::{ACCESSIBLE, EVENT_FOCUS, EVENT_WINDOW};
  use crate::bus::MethodCall;
  use crate::core::test_instance;
  use crate::testing::{id, object_signal};
  use crate::types::ObjectIdentity;

  fn drain(rx: &mut Receiver<Event>) -> Vec<Event> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
  }

  #[test]
  fn defunct_invalidates_and_emits_removed() {
    let (atspio, bus) = test_instance();
    atspio.set_listeners(EventListener::StateChanged.into());
    let mut rx = atspio.subscribe();
    let target = id("/doomed");
    bus.script_interfaces(&target, &[ACCESSIBLE, "org.a11y.atspi.Action"]);
    bus.script_ok(
      MethodCall::on(&target, "org.a11y.atspi.Action", "GetActions"),
      vec![WireValue::Array(vec![WireValue::Struct(vec![
        WireValue::from("click"),
        WireValue::from(""),
        WireValue::from(""),
      ])])],
    );

    let held = atspio.accessible(target.clone());
    let actions = held.actions();
    assert!(atspio.cached_object(&target.cache_key().0).is_some());

    bus.emit(object_signal(&target, "StateChanged", "defunct", 1, 0, WireValue::I32(0)));

    assert!(atspio.cached_object(&target.cache_key().0).is_none());
    assert!(held.is_defunct());
    assert!(actions.iter().all(|a| !a.is_enabled()));
    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(events.first(), Some(Event::Removed { object }) if *object == held));

    // A second report for the same object is harmless.
    bus.emit(object_signal(&target, "StateChanged", "defunct", 1, 0, WireValue::I32(0)));
    assert!(!atspio.inner.ctx.cache.remove(&target.cache_key()));
  }

  #[test]
  fn state_change_cleans_cached_state() {
    let (atspio, bus) = test_instance();
    let target = id("/check");
    let _held = atspio.accessible(target.clone());
    atspio.inner.ctx.cache.set_state(&target, 16);

    bus.emit(object_signal(&target, "StateChanged", "checked", 1, 0, WireValue::I32(0)));
    assert_eq!(atspio.inner.ctx.cache.state(&target), None);
  }

  #[test]
  fn focused_state_reports_focus_only_when_asked() {
    let (atspio, bus) = test_instance();
    atspio.set_listeners(EventListener::Focus.into());
    let mut rx = atspio.subscribe();
    let target = id("/entry");

    bus.emit(object_signal(&target, "StateChanged", "focused", 1, 0, WireValue::I32(0)));
    bus.emit(object_signal(&target, "StateChanged", "focused", 0, 0, WireValue::I32(0)));
    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(events.first(), Some(Event::FocusChanged { .. })));

    atspio.set_listeners(EventListener::Focus | EventListener::StateChanged);
    bus.emit(object_signal(&target, "StateChanged", "focused", 1, 0, WireValue::I32(0)));
    let events = drain(&mut rx);
    assert_eq!(events.len(), 2);
    assert!(matches!(
      events.get(1),
      Some(Event::StateChanged { state, active: true, .. }) if state == "focused"
    ));
  }

  #[test]
  fn legacy_focus_signal() {
    let (atspio, bus) = test_instance();
    atspio.set_listeners(EventListener::Focus.into());
    let mut rx = atspio.subscribe();
    let mut signal = object_signal(&id("/entry"), "Focus", "", 0, 0, WireValue::I32(0));
    signal.interface = EVENT_FOCUS.to_owned();
    bus.emit(signal);
    assert!(matches!(drain(&mut rx).first(), Some(Event::FocusChanged { .. })));
  }

  #[test]
  fn children_changed_carries_child() {
    let (atspio, bus) = test_instance();
    atspio.set_listeners(EventListener::ChildrenChanged.into());
    let mut rx = atspio.subscribe();
    let parent = id("/list");
    let child = id("/list/2");

    bus.emit(object_signal(
      &parent,
      "ChildrenChanged",
      "add",
      2,
      0,
      WireValue::object_ref(&child),
    ));
    bus.emit(object_signal(
      &parent,
      "ChildrenChanged",
      "remove/system",
      0,
      0,
      WireValue::object_ref(&ObjectIdentity::null()),
    ));

    let events = drain(&mut rx);
    assert!(matches!(
      events.first(),
      Some(Event::ChildAdded { index: 2, child: Some(c), .. }) if *c.identity() == child
    ));
    assert!(matches!(
      events.get(1),
      Some(Event::ChildRemoved { index: 0, child: None, .. })
    ));
  }

  #[test]
  fn text_changes_by_kind() {
    let (atspio, bus) = test_instance();
    atspio.set_listeners(EventListener::TextChanged | EventListener::TextCaretMoved);
    let mut rx = atspio.subscribe();
    let entry = id("/entry");

    bus.emit(object_signal(&entry, "TextChanged", "insert", 3, 5, WireValue::from("hello")));
    bus.emit(object_signal(&entry, "TextChanged", "delete:system", 0, 2, WireValue::from("ab")));
    bus.emit(object_signal(&entry, "TextCaretMoved", "", 8, 0, WireValue::I32(0)));

    let events = drain(&mut rx);
    assert!(matches!(
      events.first(),
      Some(Event::TextInserted { text, start: 3, end: 8, .. }) if text == "hello"
    ));
    assert!(matches!(
      events.get(1),
      Some(Event::TextRemoved { start: 0, end: 2, .. })
    ));
    assert!(matches!(
      events.get(2),
      Some(Event::TextCaretMoved { position: 8, .. })
    ));
  }

  #[test]
  fn property_changes_by_name() {
    let (atspio, bus) = test_instance();
    atspio.set_listeners(EventListener::PropertyChanged.into());
    let mut rx = atspio.subscribe();
    let target = id("/button");
    for kind in ["accessible-name", "accessible-description", "accessible-value"] {
      bus.emit(object_signal(&target, "PropertyChange", kind, 0, 0, WireValue::from("")));
    }

    let events = drain(&mut rx);
    assert!(matches!(events.first(), Some(Event::NameChanged { .. })));
    assert!(matches!(events.get(1), Some(Event::DescriptionChanged { .. })));
    assert!(matches!(
      events.get(2),
      Some(Event::PropertyChanged { property, .. }) if property == "accessible-value"
    ));
  }

  #[test]
  fn window_signals_use_member_names() {
    let (atspio, bus) = test_instance();
    atspio.set_listeners(EventListener::Window.into());
    let mut rx = atspio.subscribe();
    for member in ["Create", "uUshade", "Restyle"] {
      let mut signal = object_signal(&id("/frame"), member, "", 0, 0, WireValue::I32(0));
      signal.interface = EVENT_WINDOW.to_owned();
      bus.emit(signal);
    }

    let kinds: Vec<_> = drain(&mut rx)
      .into_iter()
      .filter_map(|e| match e {
        Event::Window { kind, .. } => Some(kind),
        _ => None,
      })
      .collect();
    assert_eq!(kinds, vec![WindowEvent::Created, WindowEvent::Unshaded]);
  }

  #[test]
  fn unsubscribed_categories_are_dropped() {
    let (atspio, bus) = test_instance();
    atspio.set_listeners(EventListener::Window.into());
    let mut rx = atspio.subscribe();
    bus.emit(object_signal(&id("/x"), "ModelChanged", "", 0, 0, WireValue::I32(0)));
    assert!(drain(&mut rx).is_empty());
  }

  #[test]
  fn short_bodies_are_tolerated() {
    let args = [WireValue::from("add")];
    let body = SignalBody::parse(&args);
    assert_eq!(body.kind, "add");
    assert_eq!(body.detail1, 0);
    assert!(body.any_data.is_none());
  }
}
