//! Well-known bus names, object paths and interface names.

/// Object path the protocol uses for "no object".
pub(crate) const NULL_PATH: &str = "/org/a11y/atspi/null";

/// Root accessible of every application; the registry's root is the desktop.
pub(crate) const ROOT_PATH: &str = "/org/a11y/atspi/accessible/root";

/// Service owning the desktop root and the event registry.
pub(crate) const REGISTRY_SERVICE: &str = "org.a11y.atspi.Registry";
pub(crate) const REGISTRY_PATH: &str = "/org/a11y/atspi/registry";

/// Session-bus broker that hands out the accessibility bus address.
pub(crate) const BROKER_SERVICE: &str = "org.a11y.Bus";
pub(crate) const BROKER_PATH: &str = "/org/a11y/bus";

pub(crate) const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";

pub(crate) mod interface {
  pub(crate) const ACCESSIBLE: &str = "org.a11y.atspi.Accessible";
  pub(crate) const ACTION: &str = "org.a11y.atspi.Action";
  pub(crate) const APPLICATION: &str = "org.a11y.atspi.Application";
  pub(crate) const CACHE: &str = "org.a11y.atspi.Cache";
  pub(crate) const COLLECTION: &str = "org.a11y.atspi.Collection";
  pub(crate) const COMPONENT: &str = "org.a11y.atspi.Component";
  pub(crate) const DOCUMENT: &str = "org.a11y.atspi.Document";
  pub(crate) const EDITABLE_TEXT: &str = "org.a11y.atspi.EditableText";
  pub(crate) const EVENT_KEYBOARD: &str = "org.a11y.atspi.Event.Keyboard";
  pub(crate) const EVENT_MOUSE: &str = "org.a11y.atspi.Event.Mouse";
  pub(crate) const EVENT_OBJECT: &str = "org.a11y.atspi.Event.Object";
  pub(crate) const EVENT_WINDOW: &str = "org.a11y.atspi.Event.Window";
  pub(crate) const EVENT_FOCUS: &str = "org.a11y.atspi.Event.Focus";
  pub(crate) const HYPERLINK: &str = "org.a11y.atspi.Hyperlink";
  pub(crate) const HYPERTEXT: &str = "org.a11y.atspi.Hypertext";
  pub(crate) const IMAGE: &str = "org.a11y.atspi.Image";
  pub(crate) const SELECTION: &str = "org.a11y.atspi.Selection";
  pub(crate) const SOCKET: &str = "org.a11y.atspi.Socket";
  pub(crate) const TABLE: &str = "org.a11y.atspi.Table";
  pub(crate) const TABLE_CELL: &str = "org.a11y.atspi.TableCell";
  pub(crate) const TEXT: &str = "org.a11y.atspi.Text";
  pub(crate) const VALUE: &str = "org.a11y.atspi.Value";

  pub(crate) const REGISTRY: &str = "org.a11y.atspi.Registry";
  pub(crate) const BROKER: &str = "org.a11y.Bus";
  pub(crate) const STATUS: &str = "org.a11y.Status";
}
