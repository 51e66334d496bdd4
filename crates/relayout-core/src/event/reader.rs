// Relayout Device Readers
// One blocking evdev reader thread per device, all feeding a single bounded queue

use super::{InputEvent, KeyEvent};
use crate::input::{classify, Classification, DeviceCapabilities, DeviceFilter, DeviceKind};
use evdev::{Device, EventType};
use std::path::PathBuf;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::thread;

/// Capacity of the queue between reader threads and the engine.
/// Readers block when it is full; events are never dropped.
pub const QUEUE_CAPACITY: usize = 8;

/// Result type for reader operations
pub type ReaderResult<T> = Result<T, ReaderError>;

/// Errors that can occur while setting up device readers
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    #[error("No input devices matched: {0}")]
    DeviceNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Device information for listing devices
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub path: PathBuf,
    pub name: String,
    pub kind: DeviceKind,
}

fn capabilities(device: &Device) -> DeviceCapabilities {
    DeviceCapabilities::new(device.supported_events().iter().map(|ev| ev.0).collect())
}

/// Enumerate and classify devices accepted by the filter
fn scan(filter: &DeviceFilter) -> Vec<(DeviceInfo, Device)> {
    let mut found = Vec::new();

    for (path, device) in evdev::enumerate() {
        let name = device.name().unwrap_or("Unknown").to_string();
        if !filter.accepts(&path, &name) {
            continue;
        }
        match classify(&capabilities(&device)) {
            Classification::Use(kind) => found.push((DeviceInfo { path, name, kind }, device)),
            Classification::Unsupported(ev) => {
                log::warn!(
                    "Skipping device \"{}\" because it has unsupported event type: {:#x}",
                    name,
                    ev
                );
            }
            Classification::Ignore => {}
        }
    }

    found.sort_by(|a, b| a.0.path.cmp(&b.0.path));
    found
}

/// List the devices that would be read, for `--list-devices`
pub fn list_devices(filter: &DeviceFilter) -> ReaderResult<Vec<DeviceInfo>> {
    let devices: Vec<DeviceInfo> = scan(filter).into_iter().map(|(info, _)| info).collect();
    if devices.is_empty() {
        return Err(ReaderError::DeviceNotFound(
            "no keyboard or mouse devices found".to_string(),
        ));
    }
    Ok(devices)
}

/// Start one reader thread per accepted device.
///
/// Returns the consuming end of the queue. The queue closes once every
/// reader has stopped.
pub fn spawn_readers(filter: &DeviceFilter) -> ReaderResult<Receiver<InputEvent>> {
    let devices = scan(filter);
    if devices.is_empty() {
        return Err(ReaderError::DeviceNotFound(
            "no keyboard or mouse devices found".to_string(),
        ));
    }

    let (tx, rx) = sync_channel(QUEUE_CAPACITY);
    for (info, device) in devices {
        log::info!("{}: {} ({})", info.kind, info.name, info.path.display());
        let tx = tx.clone();
        thread::Builder::new()
            .name(format!("reader-{}", info.path.display()))
            .spawn(move || read_device(info, device, tx))?;
    }

    Ok(rx)
}

fn read_device(info: DeviceInfo, mut device: Device, tx: SyncSender<InputEvent>) {
    loop {
        let events = match device.fetch_events() {
            Ok(events) => events,
            Err(e) => {
                log::error!("Closing device \"{}\" due to an error: {}", info.name, e);
                return;
            }
        };

        for ev in events {
            if ev.event_type() != EventType::KEY {
                continue;
            }
            let forwarded = match info.kind {
                DeviceKind::Keyboard => KeyEvent::from_raw(ev.code(), ev.value()).map(InputEvent::Key),
                DeviceKind::Mouse => (ev.value() == 1).then_some(InputEvent::MouseClick),
            };
            if let Some(event) = forwarded {
                if tx.send(event).is_err() {
                    // Consumer is gone, daemon is shutting down
                    return;
                }
            }
        }
    }
}
