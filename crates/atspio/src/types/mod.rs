/*! Core types for Atspio. */

#![allow(missing_docs)]

mod error;
mod event;
mod geometry;
mod identity;
mod text;

pub use error::{AtspioError, AtspioResult};
pub use event::{Event, EventListener, EventListeners, WindowEvent};
pub use geometry::{Point, Rect};
pub use identity::{CacheKey, ObjectIdentity};
pub use text::{TextBoundary, TextRange, TextSegment};
