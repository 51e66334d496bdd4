//! Wayland focus tracking using wlr-foreign-toplevel-management-unstable-v1
//!
//! Connects to wlroots-based compositors and follows which toplevel is
//! activated, exposing its app_id as the window class.

use std::collections::HashMap;
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use wayland_backend::rs::client::ObjectId;
use wayland_client::{
    event_created_child,
    globals::{registry_queue_init, GlobalListContents},
    protocol::{wl_display, wl_registry, wl_surface},
    Connection, Dispatch, Proxy, QueueHandle,
};
use wayland_protocols_wlr::foreign_toplevel::v1::client::{
    zwlr_foreign_toplevel_handle_v1, zwlr_foreign_toplevel_manager_v1,
};

use super::provider::{FocusState, FocusedWindowProvider, WindowError};

/// The focused toplevel as last reported by the compositor
#[derive(Debug, Clone, Default)]
pub struct ActiveWindow {
    pub app_id: String,
    /// Bumped every time a different toplevel becomes active
    pub serial: u64,
}

impl ActiveWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a focus change
    pub fn focus(&mut self, app_id: String) {
        self.app_id = app_id;
        self.serial = self.serial.wrapping_add(1);
    }
}

/// Per-toplevel state
#[derive(Debug, Clone, Default)]
struct ToplevelInfo {
    app_id: String,
    activated: bool,
}

/// Wayland client state owned by the event thread
struct WaylandState {
    toplevels: HashMap<ObjectId, ToplevelInfo>,
    active_handle: Option<ObjectId>,
    active_window: Arc<Mutex<ActiveWindow>>,
}

impl WaylandState {
    fn new(active_window: Arc<Mutex<ActiveWindow>>) -> Self {
        Self {
            toplevels: HashMap::new(),
            active_handle: None,
            active_window,
        }
    }

    fn activate(&mut self, handle: ObjectId) {
        let app_id = self
            .toplevels
            .get(&handle)
            .map(|info| info.app_id.clone())
            .unwrap_or_default();
        self.active_handle = Some(handle);
        self.active_window.lock().focus(app_id);
    }

    fn deactivate(&mut self, handle: &ObjectId) {
        if self.active_handle.as_ref() == Some(handle) {
            self.active_handle = None;
            self.active_window.lock().focus(String::new());
        }
    }

    /// app_id may arrive after the activated state
    fn refresh_app_id(&mut self, handle: &ObjectId) {
        if self.active_handle.as_ref() == Some(handle) {
            if let Some(info) = self.toplevels.get(handle) {
                self.active_window.lock().app_id = info.app_id.clone();
            }
        }
    }
}

// Implement Dispatch for wl_registry
impl Dispatch<wl_registry::WlRegistry, GlobalListContents> for WaylandState {
    fn event(
        _state: &mut Self,
        _registry: &wl_registry::WlRegistry,
        _event: wl_registry::Event,
        _globals: &GlobalListContents,
        _conn: &Connection,
        _qhandle: &QueueHandle<Self>,
    ) {
        // Registry events are handled via the globals list
    }
}

// Implement Dispatch for the toplevel manager
impl Dispatch<zwlr_foreign_toplevel_manager_v1::ZwlrForeignToplevelManagerV1, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _manager: &zwlr_foreign_toplevel_manager_v1::ZwlrForeignToplevelManagerV1,
        event: zwlr_foreign_toplevel_manager_v1::Event,
        _: &(),
        _conn: &Connection,
        _qhandle: &QueueHandle<Self>,
    ) {
        match event {
            zwlr_foreign_toplevel_manager_v1::Event::Toplevel { toplevel } => {
                state.toplevels.insert(toplevel.id(), ToplevelInfo::default());
            }
            zwlr_foreign_toplevel_manager_v1::Event::Finished => {
                // The manager is finished, no more toplevels will be sent
            }
            _ => {}
        }
    }

    event_created_child!(WaylandState, zwlr_foreign_toplevel_manager_v1::ZwlrForeignToplevelManagerV1, [
        0 => (zwlr_foreign_toplevel_handle_v1::ZwlrForeignToplevelHandleV1, ())
    ]);
}

// Implement Dispatch for the toplevel handle
impl Dispatch<zwlr_foreign_toplevel_handle_v1::ZwlrForeignToplevelHandleV1, ()> for WaylandState {
    fn event(
        state: &mut Self,
        handle: &zwlr_foreign_toplevel_handle_v1::ZwlrForeignToplevelHandleV1,
        event: zwlr_foreign_toplevel_handle_v1::Event,
        _: &(),
        _conn: &Connection,
        _qhandle: &QueueHandle<Self>,
    ) {
        match event {
            zwlr_foreign_toplevel_handle_v1::Event::AppId { app_id } => {
                let handle_id = handle.id();
                if let Some(info) = state.toplevels.get_mut(&handle_id) {
                    info.app_id = app_id;
                    state.refresh_app_id(&handle_id);
                }
            }
            zwlr_foreign_toplevel_handle_v1::Event::State { state: state_array } => {
                const ACTIVATED_VALUE: u8 = 2;
                let activated = state_array.contains(&ACTIVATED_VALUE);
                let handle_id = handle.id();

                let was_activated = match state.toplevels.get_mut(&handle_id) {
                    Some(info) => std::mem::replace(&mut info.activated, activated),
                    None => return,
                };
                if activated && !was_activated {
                    state.activate(handle_id);
                } else if !activated {
                    state.deactivate(&handle_id);
                }
            }
            zwlr_foreign_toplevel_handle_v1::Event::Closed => {
                let handle_id = handle.id();
                if state.toplevels.remove(&handle_id).is_some() {
                    state.deactivate(&handle_id);
                }
                handle.destroy();
            }
            _ => {}
        }
    }
}

// Empty dispatch implementations for other types
impl Dispatch<wl_surface::WlSurface, ()> for WaylandState {
    fn event(
        _state: &mut Self,
        _proxy: &wl_surface::WlSurface,
        _event: wl_surface::Event,
        _: &(),
        _conn: &Connection,
        _qhandle: &QueueHandle<Self>,
    ) {
    }
}

impl Dispatch<wl_display::WlDisplay, GlobalListContents> for WaylandState {
    fn event(
        _state: &mut Self,
        _proxy: &wl_display::WlDisplay,
        _event: wl_display::Event,
        _globals: &GlobalListContents,
        _conn: &Connection,
        _qhandle: &QueueHandle<Self>,
    ) {
    }
}

/// Wayland client for wlroots compositors
///
/// Connects to the Wayland display and follows the activated toplevel on a
/// background thread.
pub struct WaylandClient {
    active_window: Arc<Mutex<ActiveWindow>>,
    connected: Arc<AtomicBool>,
    event_thread: Mutex<Option<thread::JoinHandle<()>>>,
}

impl WaylandClient {
    fn parse_wayland_display_suffix(name: &str) -> Option<u32> {
        let suffix = name.strip_prefix("wayland-")?;
        if suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        suffix.parse::<u32>().ok()
    }

    fn discover_wayland_displays() -> Vec<String> {
        let runtime_dir = match std::env::var("XDG_RUNTIME_DIR") {
            Ok(v) if !v.trim().is_empty() => v,
            _ => return Vec::new(),
        };

        let mut displays: Vec<(u32, String)> = Vec::new();
        if let Ok(entries) = fs::read_dir(runtime_dir) {
            for entry in entries.flatten() {
                let name = entry.file_name();
                if let Some(name) = name.to_str() {
                    if let Some(order) = Self::parse_wayland_display_suffix(name) {
                        displays.push((order, name.to_string()));
                    }
                }
            }
        }

        displays.sort_by(|a, b| b.0.cmp(&a.0));
        displays.into_iter().map(|(_, name)| name).collect()
    }

    pub fn new() -> Self {
        Self {
            active_window: Arc::new(Mutex::new(ActiveWindow::new())),
            connected: Arc::new(AtomicBool::new(false)),
            event_thread: Mutex::new(None),
        }
    }

    /// Connect to the Wayland display and start the event thread
    pub fn connect(&self) -> Result<(), WindowError> {
        // WAYLAND_DISPLAY first when set, then wayland-* sockets under
        // XDG_RUNTIME_DIR, newest first
        let mut candidates = Vec::new();
        if let Ok(display) = std::env::var("WAYLAND_DISPLAY") {
            if !display.trim().is_empty() {
                candidates.push(display);
            }
        }
        for display in Self::discover_wayland_displays() {
            if !candidates.contains(&display) {
                candidates.push(display);
            }
        }
        if candidates.is_empty() {
            return Err(WindowError::ConnectionFailed(
                "no Wayland display found".to_string(),
            ));
        }

        let connection = candidates
            .iter()
            .find_map(|display| {
                std::env::set_var("WAYLAND_DISPLAY", display);
                Connection::connect_to_env().ok()
            })
            .ok_or_else(|| {
                WindowError::ConnectionFailed("unable to connect to Wayland display".to_string())
            })?;

        let (globals, mut event_queue) = registry_queue_init::<WaylandState>(&connection)
            .map_err(|e| WindowError::ConnectionFailed(e.to_string()))?;
        let qhandle = event_queue.handle();

        globals
            .bind::<zwlr_foreign_toplevel_manager_v1::ZwlrForeignToplevelManagerV1, _, _>(
                &qhandle,
                3..=3,
                (),
            )
            .map_err(|e| {
                WindowError::ConnectionFailed(format!("wlr-foreign-toplevel unavailable: {}", e))
            })?;

        let mut state = WaylandState::new(self.active_window.clone());
        let connected_flag = self.connected.clone();
        connected_flag.store(true, Ordering::SeqCst);

        let handle = thread::Builder::new()
            .name("wayland-focus".to_string())
            .spawn(move || {
                // Roundtrip to get the initial toplevels
                let _ = event_queue.roundtrip(&mut state);
                while event_queue.blocking_dispatch(&mut state).is_ok() {}
                log::warn!("Wayland connection lost, window focus is no longer tracked");
                connected_flag.store(false, Ordering::SeqCst);
            })
            .map_err(|e| WindowError::ConnectionFailed(e.to_string()))?;

        *self.event_thread.lock() = Some(handle);
        Ok(())
    }

    /// Snapshot of the focused toplevel
    pub fn active_window(&self) -> ActiveWindow {
        self.active_window.lock().clone()
    }

    /// Report a focus change (for internal use/testing)
    pub fn update_active_window(&self, app_id: String) {
        self.active_window.lock().focus(app_id);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl Default for WaylandClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Focus provider over a connected [`WaylandClient`]
pub struct WaylandFocusProvider {
    client: WaylandClient,
    last_serial: Option<u64>,
}

impl WaylandFocusProvider {
    /// Connect to the compositor
    pub fn connect() -> Result<Self, WindowError> {
        let client = WaylandClient::new();
        client.connect()?;
        Ok(Self::with_client(client))
    }

    fn with_client(client: WaylandClient) -> Self {
        Self {
            client,
            last_serial: None,
        }
    }

    pub fn client(&self) -> &WaylandClient {
        &self.client
    }
}

impl FocusedWindowProvider for WaylandFocusProvider {
    fn focused(&mut self) -> Result<FocusState, WindowError> {
        if !self.client.is_connected() {
            return Err(WindowError::NotConnected);
        }
        let window = self.client.active_window();
        let changed = self.last_serial != Some(window.serial);
        self.last_serial = Some(window.serial);
        Ok(FocusState::new(changed, window.app_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_window_focus_bumps_serial() {
        let mut window = ActiveWindow::new();
        assert_eq!(window.app_id, "");
        window.focus("firefox".to_string());
        window.focus("firefox".to_string());
        assert_eq!(window.app_id, "firefox");
        assert_eq!(window.serial, 2);
    }

    #[test]
    fn test_wayland_client_new() {
        let client = WaylandClient::new();
        assert!(!client.is_connected());
    }

    #[test]
    fn test_provider_not_connected() {
        let mut provider = WaylandFocusProvider::with_client(WaylandClient::new());
        assert_eq!(provider.focused(), Err(WindowError::NotConnected));
    }

    #[test]
    fn test_provider_reports_changes() {
        let mut provider = WaylandFocusProvider::with_client(WaylandClient::new());
        provider.client.connected.store(true, Ordering::SeqCst);

        assert_eq!(provider.focused().unwrap(), FocusState::new(true, ""));
        assert_eq!(provider.focused().unwrap(), FocusState::new(false, ""));

        provider.client().update_active_window("org.kde.konsole".to_string());
        assert_eq!(
            provider.focused().unwrap(),
            FocusState::new(true, "org.kde.konsole")
        );
        assert!(!provider.focused().unwrap().changed);
    }

    #[test]
    fn test_discover_wayland_displays() {
        let tmp = std::env::temp_dir().join(format!(
            "relayout-wayland-displays-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        fs::write(tmp.join("wayland-1"), b"").unwrap();
        fs::write(tmp.join("wayland-0"), b"").unwrap();
        fs::write(tmp.join("wayland-1.lock"), b"").unwrap();
        fs::write(tmp.join("wayland-abc"), b"").unwrap();
        fs::write(tmp.join("not-wayland"), b"").unwrap();

        let prev = std::env::var("XDG_RUNTIME_DIR").ok();
        std::env::set_var("XDG_RUNTIME_DIR", &tmp);
        let displays = WaylandClient::discover_wayland_displays();
        match prev {
            Some(v) => std::env::set_var("XDG_RUNTIME_DIR", v),
            None => std::env::remove_var("XDG_RUNTIME_DIR"),
        }

        assert_eq!(displays, vec!["wayland-1".to_string(), "wayland-0".to_string()]);
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn test_parse_wayland_display_suffix() {
        assert_eq!(WaylandClient::parse_wayland_display_suffix("wayland-0"), Some(0));
        assert_eq!(WaylandClient::parse_wayland_display_suffix("wayland-12"), Some(12));
        assert_eq!(WaylandClient::parse_wayland_display_suffix("wayland-1.lock"), None);
        assert_eq!(WaylandClient::parse_wayland_display_suffix("not-wayland-1"), None);
    }
}
