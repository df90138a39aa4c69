/*!
Bus Connector.

Resolves the accessibility bus address through the session-bus broker and
holds the resulting connection. Resolution is asynchronous; callers that need
a connection before it completes wait on [`BusConnector::connection`], which
always returns once resolution ends or the resolve timeout passes, handing
out the session bus when the dedicated bus is unavailable.
*/

use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::names::{interface, BROKER_PATH, BROKER_SERVICE};
use super::traits::{BusOpener, BusTransport};
use super::wire::{first, MethodCall};
use crate::types::{AtspioError, AtspioResult};

/// Where the connector is in its lifecycle. `Connected` and
/// `ConnectionError` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ConnectionState {
  /// Resolution has not started.
  Disconnected,
  /// Waiting for the broker to report the accessibility bus address.
  Resolving,
  /// Calls go to the dedicated accessibility bus.
  Connected,
  /// The accessibility bus is unavailable; calls go to the session bus.
  ConnectionError,
}

impl ConnectionState {
  /// `Connected` or `ConnectionError`.
  pub const fn is_resolved(self) -> bool {
    matches!(self, Self::Connected | Self::ConnectionError)
  }
}

/// Runs once when resolution finishes, outside the connector's lock.
pub(crate) type ResolvedHook = Box<dyn FnOnce() + Send>;

struct Link {
  state: ConnectionState,
  bus: Option<Arc<dyn BusTransport>>,
  session: Option<Arc<dyn BusTransport>>,
  hooks: Vec<ResolvedHook>,
}

pub(crate) struct BusConnector {
  opener: Arc<dyn BusOpener>,
  link: Mutex<Link>,
  resolved: Condvar,
  resolve_timeout: Duration,
}

impl std::fmt::Debug for BusConnector {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("BusConnector")
      .field("state", &self.state())
      .field("resolve_timeout", &self.resolve_timeout)
      .finish_non_exhaustive()
  }
}

impl BusConnector {
  pub(crate) fn new(opener: Arc<dyn BusOpener>, resolve_timeout: Duration) -> Self {
    Self {
      opener,
      link: Mutex::new(Link {
        state: ConnectionState::Disconnected,
        bus: None,
        session: None,
        hooks: Vec::new(),
      }),
      resolved: Condvar::new(),
      resolve_timeout,
    }
  }

  /// Open the session bus and ask the broker for the accessibility bus
  /// address. Does nothing unless the connector is `Disconnected`.
  pub(crate) fn start(self: &Arc<Self>) {
    {
      let mut link = self.link.lock();
      if link.state != ConnectionState::Disconnected {
        return;
      }
      link.state = ConnectionState::Resolving;
    }

    let session = match self.opener.session() {
      Ok(session) => session,
      Err(e) => {
        log::warn!("Session bus unavailable: {e}");
        self.finish(ConnectionState::ConnectionError, None);
        return;
      }
    };
    self.link.lock().session = Some(Arc::clone(&session));

    let call = MethodCall::new(BROKER_SERVICE, BROKER_PATH, interface::BROKER, "GetAddress");
    let weak: Weak<Self> = Arc::downgrade(self);
    session.call_async(
      call,
      Box::new(move |reply| {
        if let Some(connector) = weak.upgrade() {
          connector.address_resolved(reply.and_then(|r| {
            first("GetAddress", &r)?
              .as_str()
              .map(str::to_owned)
              .ok_or_else(|| AtspioError::malformed("GetAddress", "address is not a string"))
          }));
        }
      }),
    );
  }

  fn address_resolved(&self, address: AtspioResult<String>) {
    let opened = address.and_then(|address| {
      if address.is_empty() {
        return Err(AtspioError::Connection("broker returned an empty address".into()));
      }
      self.opener.open(&address)
    });

    match opened {
      Ok(bus) => {
        log::debug!("Connected to accessibility bus");
        self.finish(ConnectionState::Connected, Some(bus));
      }
      Err(e) => {
        log::warn!("Accessibility bus unavailable, falling back to session bus: {e}");
        let session = self.link.lock().session.clone();
        self.finish(ConnectionState::ConnectionError, session);
      }
    }
  }

  fn finish(&self, state: ConnectionState, bus: Option<Arc<dyn BusTransport>>) {
    let hooks = {
      let mut link = self.link.lock();
      link.state = state;
      link.bus = bus;
      std::mem::take(&mut link.hooks)
    };
    self.resolved.notify_all();
    for hook in hooks {
      hook();
    }
  }

  pub(crate) fn state(&self) -> ConnectionState {
    self.link.lock().state
  }

  /// Run `hook` once resolution finishes (immediately if it already has).
  pub(crate) fn on_resolved(&self, hook: ResolvedHook) {
    let run_now = {
      let mut link = self.link.lock();
      if link.state.is_resolved() {
        Some(hook)
      } else {
        link.hooks.push(hook);
        None
      }
    };
    if let Some(hook) = run_now {
      hook();
    }
  }

  /// The connection to use for calls, waiting for resolution if needed.
  ///
  /// Returns the session bus when the accessibility bus could not be opened
  /// or resolution did not finish within the resolve timeout.
  pub(crate) fn connection(&self) -> Option<Arc<dyn BusTransport>> {
    let deadline = Instant::now() + self.resolve_timeout;
    let mut link = self.link.lock();
    while link.state == ConnectionState::Resolving {
      if self.resolved.wait_until(&mut link, deadline).timed_out() {
        log::warn!("Timed out waiting for the accessibility bus address");
        break;
      }
    }
    link.bus.clone().or_else(|| link.session.clone())
  }

  /// The session bus, where the broker and status properties live.
  pub(crate) fn session(&self) -> Option<Arc<dyn BusTransport>> {
    self.link.lock().session.clone()
  }
}
