/*!
Core Atspio instance: owns the connector, the object cache, the subscription
manager, and event broadcasting.

# Module Structure

- `mod.rs` - Atspio struct, builder, construction, events
- `context.rs` - shared call context carried by every handle
- `cache.rs` - Object Cache (weak entries plus state/interface side caches)
- `subscriptions.rs` - Event Subscription Manager
- `dispatch.rs` - Event Dispatcher (signals to typed events)
- `queries.rs` - applications, references, cache inspection, status toggles

# Example

```no_run
use atspio::{Atspio, EventListener};

let atspio = Atspio::builder()
  .listeners(EventListener::Focus | EventListener::Window)
  .build();

for app in atspio.applications() {
  println!("{} ({})", app.name(), app.toolkit_name());
}

// Receive with any executor: `while let Ok(event) = events.recv().await { .. }`
let events = atspio.subscribe();
# drop(events);
```
*/

mod cache;
mod context;
mod dispatch;
mod queries;
mod subscriptions;

pub use cache::CacheMode;
pub(crate) use context::Context;

use std::sync::Arc;
use std::time::Duration;

use async_broadcast::{InactiveReceiver, Sender};

use self::cache::ObjectCache;
use self::subscriptions::SubscriptionManager;
use crate::bus::{BusConnector, BusOpener, ConnectionState, ZbusOpener};
use crate::types::{Event, EventListeners};

const EVENT_CHANNEL_CAPACITY: usize = 5000;
const CALL_TIMEOUT: Duration = Duration::from_millis(500);
const RESOLVE_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) struct Inner {
  pub(crate) ctx: Arc<Context>,
  pub(crate) subscriptions: SubscriptionManager,
  events_tx: Sender<Event>,
  events_keepalive: InactiveReceiver<Event>,
}

impl Inner {
  /// Install the signal handler on the resolved connection, then apply
  /// subscriptions requested while resolving.
  fn on_resolved(self: &Arc<Self>) {
    if let Some(bus) = self.ctx.connector.connection() {
      let weak = Arc::downgrade(self);
      bus.set_signal_handler(Arc::new(move |signal| {
        if let Some(inner) = weak.upgrade() {
          inner.dispatch(&signal);
        }
      }));
    }
    self.subscriptions.flush_pending(&self.ctx.connector);
  }

  pub(crate) fn emit(&self, event: Event) {
    let overflowed = match self.events_tx.try_broadcast(event) {
      Ok(evicted) => evicted.is_some(),
      Err(e) => e.is_full(),
    };
    if overflowed {
      log::error!(
        "Event channel overflow - events are being dropped. \
         Consider increasing the event capacity or processing events faster."
      );
    }
  }
}

/// Client for the accessibility bus.
///
/// Construction never fails: the connection is resolved in the background and
/// falls back to the session bus when the accessibility bus is unavailable.
/// Clone is cheap (Arc bump) - share freely across threads.
#[derive(Clone)]
pub struct Atspio {
  pub(crate) inner: Arc<Inner>,
}

impl std::fmt::Debug for Atspio {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Atspio")
      .field("state", &self.connection_state())
      .finish_non_exhaustive()
  }
}

/// Builder for configuring an Atspio instance.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use atspio::{Atspio, CacheMode, EventListener};
///
/// let atspio = Atspio::builder()
///   .cache_mode(CacheMode::Disabled)
///   .call_timeout(Duration::from_millis(250))
///   .listeners(EventListener::TextCaretMoved.into())
///   .build();
/// ```
#[derive(Debug, Clone, Copy)]
#[must_use = "Builder does nothing until .build() is called"]
pub struct AtspioBuilder {
  cache_mode: CacheMode,
  call_timeout: Duration,
  resolve_timeout: Duration,
  event_capacity: usize,
  listeners: EventListeners,
}

impl Default for AtspioBuilder {
  fn default() -> Self {
    Self {
      cache_mode: CacheMode::Weak,
      call_timeout: CALL_TIMEOUT,
      resolve_timeout: RESOLVE_TIMEOUT,
      event_capacity: EVENT_CHANNEL_CAPACITY,
      listeners: EventListeners::NONE,
    }
  }
}

impl AtspioBuilder {
  /// Object caching mode. Default: `CacheMode::Weak`.
  pub const fn cache_mode(mut self, mode: CacheMode) -> Self {
    self.cache_mode = mode;
    self
  }

  /// Upper bound for every blocking accessor call. Default: 500ms.
  pub const fn call_timeout(mut self, timeout: Duration) -> Self {
    self.call_timeout = timeout;
    self
  }

  /// How long a caller waits for bus resolution before falling back to the
  /// session bus. Default: 5s.
  pub const fn resolve_timeout(mut self, timeout: Duration) -> Self {
    self.resolve_timeout = timeout;
    self
  }

  /// Event channel capacity; the oldest events are dropped when full.
  /// Default: 5000.
  pub const fn event_capacity(mut self, capacity: usize) -> Self {
    self.event_capacity = capacity;
    self
  }

  /// Listener categories to subscribe at startup.
  pub const fn listeners(mut self, listeners: EventListeners) -> Self {
    self.listeners = listeners;
    self
  }

  /// Build the instance and start resolving the accessibility bus.
  #[must_use = "Atspio instance must be stored to keep receiving events"]
  pub fn build(self) -> Atspio {
    Atspio::create(self, Arc::new(ZbusOpener::new(self.call_timeout)))
  }

  #[cfg(test)]
  pub(crate) fn build_with(self, opener: Arc<dyn BusOpener>) -> Atspio {
    Atspio::create(self, opener)
  }
}

impl Atspio {
  /// Create an instance with default options.
  ///
  /// For custom configuration, use [`Atspio::builder()`].
  #[must_use = "Atspio instance must be stored to keep receiving events"]
  pub fn new() -> Self {
    Self::builder().build()
  }

  /// Start configuring an instance.
  pub fn builder() -> AtspioBuilder {
    AtspioBuilder::default()
  }

  fn create(config: AtspioBuilder, opener: Arc<dyn BusOpener>) -> Self {
    let connector = Arc::new(BusConnector::new(opener, config.resolve_timeout));
    let ctx = Arc::new(Context::new(
      Arc::clone(&connector),
      ObjectCache::new(config.cache_mode),
    ));

    let (mut tx, rx) = async_broadcast::broadcast(config.event_capacity.max(1));
    tx.set_overflow(true); // Drop oldest messages when full

    let inner = Arc::new(Inner {
      ctx,
      subscriptions: SubscriptionManager::default(),
      events_tx: tx,
      events_keepalive: rx.deactivate(),
    });

    // Parked until resolution; the hook flushes it.
    inner.subscriptions.subscribe(&connector, config.listeners);
    let weak = Arc::downgrade(&inner);
    connector.on_resolved(Box::new(move || {
      if let Some(inner) = weak.upgrade() {
        inner.on_resolved();
      }
    }));
    connector.start();

    Self { inner }
  }

  /// Subscribe to events from this instance.
  pub fn subscribe(&self) -> async_broadcast::Receiver<Event> {
    self.inner.events_keepalive.activate_cloned()
  }

  /// Replace the active listener categories.
  ///
  /// Before the bus resolves, the request is stored and applied on
  /// resolution.
  pub fn set_listeners(&self, listeners: EventListeners) {
    self
      .inner
      .subscriptions
      .subscribe(&self.inner.ctx.connector, listeners);
  }

  /// The listener categories last requested.
  pub fn listeners(&self) -> EventListeners {
    self.inner.subscriptions.requested()
  }

  /// Where bus resolution stands.
  pub fn connection_state(&self) -> ConnectionState {
    self.inner.ctx.connector.state()
  }
}

impl Default for Atspio {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
type FakeSetup = (
  Arc<dyn BusOpener>,
  Arc<crate::testing::FakeBus>,
  Arc<crate::testing::FakeBus>,
);

#[cfg(test)]
fn fake_opener(hold: bool) -> FakeSetup {
  use crate::bus::names::{interface, BROKER_PATH, BROKER_SERVICE};
  use crate::bus::{MethodCall, WireValue};
  use crate::testing::{FakeBus, FakeOpener};

  let session = FakeBus::new();
  session.script_ok(
    MethodCall::new(BROKER_SERVICE, BROKER_PATH, interface::BROKER, "GetAddress"),
    vec![WireValue::from("unix:path=/tmp/fake-a11y")],
  );
  session.hold_async(hold);
  let a11y = FakeBus::new();
  a11y.script_member("RegisterEvent", Ok(Vec::new()));
  a11y.script_member("DeregisterEvent", Ok(Vec::new()));
  let opener: Arc<dyn BusOpener> = FakeOpener::new(Arc::clone(&session), Some(Arc::clone(&a11y)));
  (opener, session, a11y)
}

/// Connected instance backed by a fake accessibility bus.
#[cfg(test)]
pub(crate) fn test_instance() -> (Atspio, Arc<crate::testing::FakeBus>) {
  let (opener, _session, a11y) = fake_opener(false);
  (Atspio::builder().build_with(opener), a11y)
}

/// Instance still resolving; release the session bus to finish.
#[cfg(test)]
pub(crate) fn test_instance_resolving() -> (
  Atspio,
  Arc<crate::testing::FakeBus>,
  Arc<crate::testing::FakeBus>,
) {
  let (opener, session, a11y) = fake_opener(true);
  (Atspio::builder().build_with(opener), session, a11y)
}
