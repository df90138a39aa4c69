/*!
Entry points for consumers: enumeration, handle construction, cache
inspection, and the broker's status toggles.
*/

use super::{Atspio, CacheMode};
use crate::accessible::Accessible;
use crate::bus::names::{interface, BROKER_PATH, BROKER_SERVICE, REGISTRY_SERVICE, ROOT_PATH};
use crate::bus::wire::first;
use crate::bus::{MethodCall, WireValue};
use crate::types::{AtspioError, AtspioResult, CacheKey, ObjectIdentity};

impl Atspio {
  /// The desktop root owned by the registry.
  pub fn desktop(&self) -> Accessible {
    self.accessible(ObjectIdentity::new(REGISTRY_SERVICE, ROOT_PATH))
  }

  /// Top-level applications currently registered. Null entries are skipped.
  pub fn applications(&self) -> Vec<Accessible> {
    self.desktop().children()
  }

  /// Handle for `identity`, shared with other handles while caching is on.
  pub fn accessible(&self, identity: ObjectIdentity) -> Accessible {
    self.inner.ctx.accessible(identity)
  }

  /// Resolve a reference produced by [`Accessible::to_reference`].
  pub fn from_reference(&self, reference: &str) -> AtspioResult<Accessible> {
    ObjectIdentity::from_reference(reference).map(|identity| self.accessible(identity))
  }

  /// Current caching mode.
  pub fn cache_mode(&self) -> CacheMode {
    self.inner.ctx.cache.mode()
  }

  /// Switch caching at runtime. Disabling drops every cached entry.
  pub fn set_cache_mode(&self, mode: CacheMode) {
    self.inner.ctx.cache.set_mode(mode);
  }

  // Cache inspection. Debugging aid only.

  /// Keys of the objects currently cached.
  pub fn cached_ids(&self) -> Vec<String> {
    self
      .inner
      .ctx
      .cache
      .cached_keys()
      .into_iter()
      .map(|key| key.0)
      .collect()
  }

  /// The cached handle for a key from [`Atspio::cached_ids`].
  pub fn cached_object(&self, id: &str) -> Option<Accessible> {
    let data = self.inner.ctx.cache.get(&CacheKey(id.to_owned()))?;
    Some(Accessible::new(data, std::sync::Arc::clone(&self.inner.ctx)))
  }

  /// Drop every cached object and side entry.
  pub fn clear_cache(&self) {
    self.inner.ctx.cache.clear();
  }

  /// Whether assistive technologies are enabled desktop-wide.
  pub fn is_accessibility_enabled(&self) -> bool {
    self.status("IsEnabled")
  }

  /// Turn assistive technology support on or off. False when the write failed.
  pub fn set_accessibility_enabled(&self, enabled: bool) -> bool {
    self.set_status("IsEnabled", enabled)
  }

  /// Whether a screen reader is requested desktop-wide.
  pub fn is_screen_reader_enabled(&self) -> bool {
    self.status("ScreenReaderEnabled")
  }

  /// Request or release the screen reader. False when the write failed.
  pub fn set_screen_reader_enabled(&self, enabled: bool) -> bool {
    self.set_status("ScreenReaderEnabled", enabled)
  }

  fn status(&self, property: &str) -> bool {
    let call = MethodCall::property_get(BROKER_SERVICE, BROKER_PATH, interface::STATUS, property);
    let result = self.inner.ctx.call_session(&call).and_then(|reply| {
      first(property, &reply)?
        .as_bool()
        .ok_or_else(|| AtspioError::malformed(property, "expected a boolean"))
    });
    result.unwrap_or_else(|e| {
      log::warn!("Reading {property} failed: {e}");
      false
    })
  }

  fn set_status(&self, property: &str, enabled: bool) -> bool {
    let call = MethodCall::property_set(
      BROKER_SERVICE,
      BROKER_PATH,
      interface::STATUS,
      property,
      WireValue::Bool(enabled),
    );
    match self.inner.ctx.call_session(&call) {
      Ok(_) => true,
      Err(e) => {
        log::warn!("Setting {property} failed: {e}");
        false
      }
    }
  }
}
