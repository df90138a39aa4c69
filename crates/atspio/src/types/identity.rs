/*!
Remote object identity.

An accessible object on the bus is named by the unique bus name of the
process that owns it plus an object path inside that process. Identities are
immutable values; two are equal iff both parts match.
*/

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use url::Url;

use super::{AtspioError, AtspioResult};
use crate::bus::names::NULL_PATH;

/// Scheme used by serialized references (`accessibleobject:<path>#<bus>`).
const REFERENCE_SCHEME: &str = "accessibleobject";

/// `(bus name, object path)` pair naming one remote accessible object.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, Display,
)]
#[display("{bus_name}{object_path}")]
#[ts(export)]
pub struct ObjectIdentity {
  bus_name: String,
  object_path: String,
}

/// Canonical cache key: object path followed by bus name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
pub struct CacheKey(pub String);

impl ObjectIdentity {
  /// Create an identity from its two parts.
  pub fn new(bus_name: impl Into<String>, object_path: impl Into<String>) -> Self {
    Self {
      bus_name: bus_name.into(),
      object_path: object_path.into(),
    }
  }

  /// The explicitly invalid reference (protocol null path, no bus name).
  pub fn null() -> Self {
    Self::new("", NULL_PATH)
  }

  pub fn bus_name(&self) -> &str {
    &self.bus_name
  }

  pub fn object_path(&self) -> &str {
    &self.object_path
  }

  /// False for the null path sentinel and for identities missing either part.
  pub fn is_valid(&self) -> bool {
    !self.bus_name.is_empty() && !self.object_path.is_empty() && self.object_path != NULL_PATH
  }

  pub fn cache_key(&self) -> CacheKey {
    CacheKey(format!("{}{}", self.object_path, self.bus_name))
  }

  /// Serialize as `accessibleobject:<path>#<bus name>`.
  ///
  /// ```
  /// use atspio::ObjectIdentity;
  ///
  /// let id = ObjectIdentity::new(":1.42", "/org/a11y/atspi/accessible/7");
  /// let reference = id.to_reference();
  /// assert_eq!(reference, "accessibleobject:/org/a11y/atspi/accessible/7#:1.42");
  /// assert_eq!(ObjectIdentity::from_reference(&reference).ok(), Some(id));
  /// ```
  pub fn to_reference(&self) -> String {
    match Url::parse(&format!("{REFERENCE_SCHEME}:{}", self.object_path)) {
      Ok(mut url) => {
        url.set_fragment(Some(&self.bus_name));
        url.into()
      }
      Err(_) => format!("{REFERENCE_SCHEME}:{}#{}", self.object_path, self.bus_name),
    }
  }

  /// Parse a reference produced by [`ObjectIdentity::to_reference`].
  ///
  /// Fails on a foreign scheme, a missing bus name, or the null path.
  pub fn from_reference(reference: &str) -> AtspioResult<Self> {
    let url =
      Url::parse(reference).map_err(|e| AtspioError::InvalidReference(format!("{reference}: {e}")))?;
    if url.scheme() != REFERENCE_SCHEME {
      return Err(AtspioError::InvalidReference(format!(
        "{reference}: unexpected scheme {}",
        url.scheme()
      )));
    }
    let bus_name = url.fragment().unwrap_or_default();
    let identity = Self::new(bus_name, url.path());
    if !identity.is_valid() {
      return Err(AtspioError::InvalidReference(reference.to_owned()));
    }
    Ok(identity)
  }
}
