/*!
Bus layer: wire model, transport seam, and the Bus Connector.
*/

mod connector;
pub(crate) mod names;
mod traits;
pub(crate) mod wire;
mod zbus_transport;

pub use connector::ConnectionState;
pub(crate) use connector::BusConnector;
pub(crate) use traits::{BusOpener, BusTransport, ReplyCallback, SignalHandler};
pub(crate) use wire::{InboundSignal, MethodCall, SignalMatch, WireValue};
pub(crate) use zbus_transport::ZbusOpener;
