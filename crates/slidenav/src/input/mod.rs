//! Plain input events and the pure rules that turn them into navigation.
//!
//! Hosts translate their native events into these types and hand them to
//! the controller; nothing here touches controller state.

pub mod click;
pub mod keyboard;
pub mod touch;

pub use click::{ClickZone, ElementKind};
pub use keyboard::{Command, Key, KeyEvent};
pub use touch::{Point, Swipe, SwipeTracker};
