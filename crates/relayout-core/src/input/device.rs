// Relayout Input Layer - Device Classification
// Capability analysis deciding whether a device is read as a keyboard or a mouse

/// Event type numbers from Linux input-event-codes.h
pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_REL: u16 = 0x02;
pub const EV_ABS: u16 = 0x03;
pub const EV_MSC: u16 = 0x04;
pub const EV_SW: u16 = 0x05;
pub const EV_LED: u16 = 0x11;
pub const EV_SND: u16 = 0x12;

/// Event types that carry no classification weight but are tolerated.
/// EV_SND shows up on laptop hotkey devices ("Eee PC WMI hotkeys").
const PASSIVE_TYPES: &[u16] = &[EV_SYN, EV_MSC, EV_SW, EV_LED, EV_SND];

/// Device capabilities extracted from evdev `supported_events()`
#[derive(Debug, Clone, Default)]
pub struct DeviceCapabilities {
    /// Supported event type numbers
    pub event_types: Vec<u16>,
}

impl DeviceCapabilities {
    pub fn new(event_types: Vec<u16>) -> Self {
        Self { event_types }
    }

    pub fn supports(&self, event_type: u16) -> bool {
        self.event_types.contains(&event_type)
    }
}

/// How events from a device are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Keyboard,
    Mouse,
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceKind::Keyboard => write!(f, "keyboard"),
            DeviceKind::Mouse => write!(f, "mouse"),
        }
    }
}

/// Outcome of classifying a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Use(DeviceKind),
    /// Device exposes an event type the daemon does not understand
    Unsupported(u16),
    /// Neither pointer axes nor keys
    Ignore,
}

/// Classify a device from the event types it reports.
///
/// Relative or absolute axes make a mouse (touchpads report keys too, the
/// axes win). A key capability alone makes a keyboard.
pub fn classify(capabilities: &DeviceCapabilities) -> Classification {
    let mut is_mouse = false;
    let mut is_keyboard = false;

    for &ev in &capabilities.event_types {
        match ev {
            EV_REL | EV_ABS => is_mouse = true,
            EV_KEY => is_keyboard = true,
            other if PASSIVE_TYPES.contains(&other) => {}
            other => return Classification::Unsupported(other),
        }
    }

    if is_mouse {
        Classification::Use(DeviceKind::Mouse)
    } else if is_keyboard {
        Classification::Use(DeviceKind::Keyboard)
    } else {
        Classification::Ignore
    }
}

/// Check if a device is a virtual device based on its name.
///
/// The daemon's own output device must never be read back.
pub fn is_virtual_device(name: &str, prefix: &str) -> bool {
    name.contains(prefix)
}
