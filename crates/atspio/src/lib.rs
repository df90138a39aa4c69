/*!
Atspio - AT-SPI I/O

Client for the Linux accessibility bus. Locates the dedicated bus through
the session broker, exposes remote UI objects as cheap [`Accessible`]
handles, and fans bus signals out as typed [`Event`]s.

```no_run
use atspio::{a11y::Interface, Atspio, EventListener, EventListeners};

let atspio = Atspio::builder()
  .listeners(EventListeners::NONE | EventListener::Focus)
  .build();

for app in atspio.applications() {
  println!("{} ({})", app.name(), app.toolkit_name());
  for child in app.children() {
    if child.supported_interfaces().contains(Interface::Action) {
      for action in child.actions() {
        println!("  {}: {}", child.role_name(), action.name());
      }
    }
  }
}

let mut events = atspio.subscribe();
if let Ok(event) = events.try_recv() {
  println!("{event:?}");
}
```
*/

mod accessible;
mod bus;
mod core;

pub mod a11y;

mod types;
pub use types::*;

pub use crate::accessible::{
  Accessible, Action, ActionInfo, ActionTarget, LocaleCategory, NavigationIssue,
};
pub use crate::bus::ConnectionState;
pub use crate::core::{Atspio, AtspioBuilder, CacheMode};

#[cfg(test)]
mod testing;
