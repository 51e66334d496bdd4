// X11 Focus Provider
// Input focus and WM_CLASS lookup over x11rb

use super::provider::{FocusState, FocusedWindowProvider, WindowError};
use x11rb::connection::Connection;
use x11rb::properties::WmClass;
use x11rb::protocol::xproto::{ConnectionExt as _, Window};
use x11rb::rust_connection::RustConnection;

/// Tracks the X11 input focus window
pub struct X11FocusProvider {
    conn: RustConnection,
    last_window: Option<Window>,
    class_name: String,
}

impl X11FocusProvider {
    pub fn connect() -> Result<Self, WindowError> {
        let (conn, _screen) =
            x11rb::connect(None).map_err(|e| WindowError::ConnectionFailed(e.to_string()))?;
        Ok(Self {
            conn,
            last_window: None,
            class_name: String::new(),
        })
    }

    fn input_focus(&self) -> Result<Window, WindowError> {
        let reply = self
            .conn
            .get_input_focus()
            .map_err(query_failed)?
            .reply()
            .map_err(query_failed)?;
        Ok(reply.focus)
    }

    /// Instance part of WM_CLASS, `None` when the window has no class hint
    fn instance_name(&self, window: Window) -> Option<String> {
        let cookie = WmClass::get(&self.conn, window).ok()?;
        let class = cookie.reply().ok()??;
        Some(String::from_utf8_lossy(class.instance()).into_owned())
    }

    fn lookup_class(&self, window: Window) -> String {
        if let Some(name) = self.instance_name(window) {
            return name;
        }
        // GTK focus windows are usually a child created right after the
        // toplevel that carries the class hint
        if let Some(name) = self.instance_name(window.wrapping_sub(1)) {
            return name;
        }
        log::debug!("Window {:#x} has no class hint", window);
        String::new()
    }
}

fn query_failed(e: impl std::fmt::Display) -> WindowError {
    WindowError::QueryFailed(e.to_string())
}

impl FocusedWindowProvider for X11FocusProvider {
    fn focused(&mut self) -> Result<FocusState, WindowError> {
        let window = self.input_focus()?;
        if self.last_window == Some(window) {
            return Ok(FocusState::new(false, self.class_name.clone()));
        }
        self.last_window = Some(window);
        // PointerRoot and None carry no class
        self.class_name = if window <= 1 {
            String::new()
        } else {
            self.lookup_class(window)
        };
        log::debug!("Focus moved to {:#x} \"{}\"", window, self.class_name);
        let _ = self.conn.flush();
        Ok(FocusState::new(true, self.class_name.clone()))
    }
}
