// Relayout uinput Output
// Virtual keyboard creation and key event emission

use super::{KeySink, OutputError};
use crate::input::VIRTUAL_DEVICE_PREFIX;
use crate::{Key, Transition};
use evdev::{EventType, InputEvent};
use std::time::Duration;

/// Virtual uinput keyboard used for every synthetic event
pub struct VirtualDevice {
    device: evdev::uinput::VirtualDevice,
    delay: Duration,
}

impl VirtualDevice {
    /// Create the virtual keyboard. `delay` is slept after every event so
    /// the host can process it before the next one.
    pub fn new(delay: Duration) -> Result<Self, OutputError> {
        use evdev::uinput::VirtualDeviceBuilder;
        use evdev::AttributeSet;

        let mut keys = AttributeSet::new();
        for code in 0..256u16 {
            keys.insert(evdev::Key::new(code));
        }

        let name = format!("{} Keyboard", VIRTUAL_DEVICE_PREFIX);
        let device = VirtualDeviceBuilder::new()
            .map_err(|e: std::io::Error| OutputError::DeviceCreation(e.to_string()))?
            .name(&name)
            .with_keys(&keys)
            .map_err(|e: std::io::Error| OutputError::DeviceCreation(e.to_string()))?
            .build()
            .map_err(|e: std::io::Error| OutputError::DeviceCreation(e.to_string()))?;

        log::info!("Created virtual device \"{}\"", name);
        Ok(Self { device, delay })
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl KeySink for VirtualDevice {
    fn emit(&mut self, key: Key, transition: Transition) -> Result<(), OutputError> {
        let key_event = InputEvent::new(EventType::KEY, key.code(), transition.code());
        // SYN event is required for the kernel to process the key event
        let syn_event = InputEvent::new(EventType::SYNCHRONIZATION, 0, 0);

        self.device
            .emit(&[key_event, syn_event])
            .map_err(|e: std::io::Error| OutputError::WriteError(e.to_string()))?;

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        Ok(())
    }
}
