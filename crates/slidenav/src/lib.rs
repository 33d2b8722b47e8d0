//! Slide presentation controller.
//!
//! [`controller::PresentationController`] owns the active slide and the
//! transition lock. Hosts plug in a [`view::SlideView`], a
//! [`fragment::Location`] and a [`fullscreen::Fullscreen`] and deliver input
//! events as method calls.

pub mod config;
pub mod controller;
pub mod deck;
pub mod fragment;
pub mod fullscreen;
pub mod input;
pub mod preload;
pub mod timer;
pub mod view;

pub use controller::{PresentationController, TRANSITION_DURATION};
pub use fragment::{HistoryLocation, Location, SlideFragment};
pub use fullscreen::{Fullscreen, FullscreenError};
pub use view::{SlideMarks, SlideView};
