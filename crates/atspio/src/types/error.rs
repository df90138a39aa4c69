/*! Error types for Atspio operations. */

use super::ObjectIdentity;
use crate::a11y::Interface;

/// Errors that can occur while talking to the accessibility bus.
///
/// Most public accessors never surface these: a failed call is logged and
/// degrades to a neutral value. They appear on the few fallible entry points
/// and inside the crate where failures are propagated with `?`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AtspioError {
  /// Neither the accessibility bus nor the session bus is available.
  #[error("No bus connection available")]
  NotConnected,

  /// Opening or resolving a bus connection failed.
  #[error("Connection error: {0}")]
  Connection(String),

  /// A blocking call did not complete within the configured timeout.
  #[error("Call to {member} timed out")]
  Timeout { member: String },

  /// The remote side answered with an error.
  #[error("Call to {member} failed: {message}")]
  Remote { member: String, message: String },

  /// The reply did not match any known shape for the call.
  #[error("Malformed reply to {member}: {detail}")]
  MalformedReply { member: String, detail: String },

  /// The object does not implement the interface required by the accessor.
  #[error("{identity} does not implement {interface:?}")]
  MissingInterface {
    identity: ObjectIdentity,
    interface: Interface,
  },

  /// The object no longer exists on the remote side.
  #[error("Object is defunct: {0}")]
  Defunct(ObjectIdentity),

  /// A serialized reference could not be parsed or names the null object.
  #[error("Invalid object reference: {0}")]
  InvalidReference(String),

  /// The call's argument shape cannot be encoded by the transport.
  #[error("Unsupported argument shape for {member}")]
  UnsupportedCall { member: String },
}

impl AtspioError {
  pub(crate) fn remote(member: &str, message: impl ToString) -> Self {
    Self::Remote {
      member: member.to_owned(),
      message: message.to_string(),
    }
  }

  pub(crate) fn malformed(member: &str, detail: impl ToString) -> Self {
    Self::MalformedReply {
      member: member.to_owned(),
      detail: detail.to_string(),
    }
  }
}

/// Result type for Atspio operations.
pub type AtspioResult<T> = Result<T, AtspioError>;
