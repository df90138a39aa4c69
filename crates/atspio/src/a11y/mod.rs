//! Translation tables between wire codes and the library's stable types.
//!
//! Roles, states and interface names arrive on the bus as protocol numbers
//! and strings. These modules map them to closed Rust types; unknown values
//! never error.

#![allow(missing_docs)]

mod interfaces;
mod role;
mod state;

pub use interfaces::{Interface, Interfaces};
pub use role::Role;
pub use state::{decode_state, StateFlag, StateSet};
