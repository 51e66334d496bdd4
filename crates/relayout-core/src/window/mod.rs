//! Window focus tracking
//!
//! The engine keeps one session per focused window and picks the
//! `[[WindowClasses]]` context from the focused window's class name.

mod context;
mod provider;
mod wayland;

#[cfg(feature = "x11-backend")]
mod x11;

pub use context::{select_context, WindowContext};
pub use provider::{FocusState, FocusedWindowProvider, ScriptedProvider, WindowError};
pub use wayland::{ActiveWindow, WaylandClient, WaylandFocusProvider};

#[cfg(feature = "x11-backend")]
pub use x11::X11FocusProvider;
