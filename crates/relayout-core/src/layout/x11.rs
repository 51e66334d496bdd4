// XKB layout controller over x11rb

use super::{LayoutController, LayoutError, LockState};
use x11rb::connection::Connection;
use x11rb::protocol::xkb::{self, ConnectionExt as _};
use x11rb::protocol::xproto::ModMask;
use x11rb::rust_connection::RustConnection;

/// XkbUseCoreKbd
const USE_CORE_KBD: xkb::DeviceSpec = 0x100;

/// Num Lock is bound to Mod2 on practically every keymap
const NUM_LOCK_MASK: u16 = 1 << 4;

/// Layout group control through the XKB extension
pub struct XkbLayout {
    conn: RustConnection,
}

impl XkbLayout {
    pub fn connect() -> Result<Self, LayoutError> {
        let (conn, _screen) =
            x11rb::connect(None).map_err(|e| LayoutError::Unavailable(e.to_string()))?;
        let reply = conn
            .xkb_use_extension(1, 0)
            .map_err(|e| LayoutError::Unavailable(e.to_string()))?
            .reply()
            .map_err(|e| LayoutError::Unavailable(e.to_string()))?;
        if !reply.supported {
            return Err(LayoutError::Unavailable(
                "XKB extension not supported".to_string(),
            ));
        }
        Ok(Self { conn })
    }

    fn state(&self) -> Result<xkb::GetStateReply, LayoutError> {
        self.conn
            .xkb_get_state(USE_CORE_KBD)
            .map_err(|e| LayoutError::QueryFailed(e.to_string()))?
            .reply()
            .map_err(|e| LayoutError::QueryFailed(e.to_string()))
    }
}

impl LayoutController for XkbLayout {
    fn current(&mut self) -> Result<u32, LayoutError> {
        Ok(u8::from(self.state()?.group) as u32)
    }

    fn select(&mut self, index: u32) -> Result<(), LayoutError> {
        let select_failed = |message: String| LayoutError::SelectFailed { index, message };
        let group = u8::try_from(index)
            .map(xkb::Group::from)
            .map_err(|e| select_failed(e.to_string()))?;
        let none = ModMask::from(0u16);
        self.conn
            .xkb_latch_lock_state(USE_CORE_KBD, none, none, true, group, none, false, 0)
            .map_err(|e| select_failed(e.to_string()))?;
        self.conn.flush().map_err(|e| select_failed(e.to_string()))?;
        Ok(())
    }

    fn lock_state(&mut self) -> Option<LockState> {
        match self.state() {
            Ok(state) => {
                let locked = u16::from(state.locked_mods);
                Some(LockState {
                    caps_lock: locked & u16::from(ModMask::LOCK) != 0,
                    num_lock: locked & NUM_LOCK_MASK != 0,
                })
            }
            Err(e) => {
                log::debug!("{}", e);
                None
            }
        }
    }
}
