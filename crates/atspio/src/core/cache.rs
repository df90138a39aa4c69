/*!
Object Cache.

Maps cache keys to weakly held object data, plus two side caches (last
fetched state word and interface set) keyed the same way but cleared
independently. Dead weak entries are swept lazily: a `get` drops the entry
it finds dead, and `add` sweeps the whole map once it has grown past the last
live size.

Never call the bus while holding the cache lock.
*/

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::a11y::Interfaces;
use crate::accessible::AccessibleData;
use crate::types::{CacheKey, ObjectIdentity};

const MIN_SWEEP_LEN: usize = 64;

/// How the object cache holds objects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum CacheMode {
  /// Nothing is cached; every lookup builds a fresh handle.
  Disabled,
  /// Objects are held weakly and vanish once the last handle is dropped.
  #[default]
  Weak,
}

#[derive(Debug, Default)]
struct Entries {
  objects: HashMap<CacheKey, Weak<AccessibleData>>,
  states: HashMap<CacheKey, u64>,
  interfaces: HashMap<CacheKey, Interfaces>,
  sweep_at: usize,
}

impl Entries {
  fn purge(&mut self, key: &CacheKey) -> bool {
    self.states.remove(key);
    self.interfaces.remove(key);
    self
      .objects
      .remove(key)
      .is_some_and(|weak| weak.strong_count() > 0)
  }

  fn sweep(&mut self) {
    self.objects.retain(|_, weak| weak.strong_count() > 0);
    let objects = &self.objects;
    self.states.retain(|key, _| objects.contains_key(key));
    self.interfaces.retain(|key, _| objects.contains_key(key));
    self.sweep_at = (self.objects.len() * 2).max(MIN_SWEEP_LEN);
  }

  fn live(&mut self, key: &CacheKey) -> Option<Arc<AccessibleData>> {
    let found = self.objects.get(key)?.upgrade();
    if found.is_none() {
      self.purge(key);
    }
    found
  }

  fn insert(&mut self, key: CacheKey, data: &Arc<AccessibleData>) {
    self.objects.insert(key, Arc::downgrade(data));
    if self.objects.len() >= self.sweep_at {
      self.sweep();
    }
  }

  fn clear(&mut self) {
    self.objects.clear();
    self.states.clear();
    self.interfaces.clear();
    self.sweep_at = MIN_SWEEP_LEN;
  }
}

#[derive(Debug)]
struct Inner {
  mode: CacheMode,
  entries: Entries,
}

/// Weak-reference object cache with state and interface side caches.
#[derive(Debug)]
pub(crate) struct ObjectCache {
  inner: Mutex<Inner>,
}

impl ObjectCache {
  pub(crate) fn new(mode: CacheMode) -> Self {
    Self {
      inner: Mutex::new(Inner {
        mode,
        entries: Entries {
          sweep_at: MIN_SWEEP_LEN,
          ..Entries::default()
        },
      }),
    }
  }

  pub(crate) fn mode(&self) -> CacheMode {
    self.inner.lock().mode
  }

  /// Switching to `Disabled` drops every entry.
  pub(crate) fn set_mode(&self, mode: CacheMode) {
    let mut inner = self.inner.lock();
    if mode == CacheMode::Disabled {
      inner.entries.clear();
    }
    inner.mode = mode;
  }

  pub(crate) fn get(&self, key: &CacheKey) -> Option<Arc<AccessibleData>> {
    let mut inner = self.inner.lock();
    if inner.mode == CacheMode::Disabled {
      return None;
    }
    inner.entries.live(key)
  }

  pub(crate) fn add(&self, key: CacheKey, data: &Arc<AccessibleData>) {
    let mut inner = self.inner.lock();
    if inner.mode == CacheMode::Disabled {
      return;
    }
    inner.entries.insert(key, data);
  }

  /// Drop the entry and both side entries. True iff a live entry was present.
  pub(crate) fn remove(&self, key: &CacheKey) -> bool {
    self.inner.lock().entries.purge(key)
  }

  pub(crate) fn clear(&self) {
    self.inner.lock().entries.clear();
  }

  /// Cached data for `identity`, or a new entry built by `make`.
  ///
  /// With caching disabled this always builds, so handles never share.
  pub(crate) fn resolve(
    &self,
    identity: &ObjectIdentity,
    make: impl FnOnce() -> Arc<AccessibleData>,
  ) -> Arc<AccessibleData> {
    let mut inner = self.inner.lock();
    if inner.mode == CacheMode::Disabled {
      return make();
    }
    let key = identity.cache_key();
    if let Some(data) = inner.entries.live(&key) {
      return data;
    }
    let data = make();
    inner.entries.insert(key, &data);
    data
  }

  pub(crate) fn state(&self, identity: &ObjectIdentity) -> Option<u64> {
    self.inner.lock().entries.states.get(&identity.cache_key()).copied()
  }

  pub(crate) fn set_state(&self, identity: &ObjectIdentity, state: u64) {
    let mut inner = self.inner.lock();
    if inner.mode == CacheMode::Disabled {
      return;
    }
    inner.entries.states.insert(identity.cache_key(), state);
  }

  pub(crate) fn clean_state(&self, identity: &ObjectIdentity) {
    self.inner.lock().entries.states.remove(&identity.cache_key());
  }

  pub(crate) fn interfaces(&self, identity: &ObjectIdentity) -> Option<Interfaces> {
    self
      .inner
      .lock()
      .entries
      .interfaces
      .get(&identity.cache_key())
      .copied()
  }

  pub(crate) fn set_interfaces(&self, identity: &ObjectIdentity, interfaces: Interfaces) {
    let mut inner = self.inner.lock();
    if inner.mode == CacheMode::Disabled {
      return;
    }
    inner
      .entries
      .interfaces
      .insert(identity.cache_key(), interfaces);
  }

  /// Keys of live entries, sorted.
  pub(crate) fn cached_keys(&self) -> Vec<CacheKey> {
    let mut inner = self.inner.lock();
    inner.entries.sweep();
    let mut keys: Vec<CacheKey> = inner.entries.objects.keys().cloned().collect();
    keys.sort();
    keys
  }
}
