// Relayout Input Layer
// Device classification and filtering logic

mod device;
mod filter;

pub use device::{
    classify, is_virtual_device, Classification, DeviceCapabilities, DeviceKind, EV_ABS, EV_KEY,
    EV_LED, EV_MSC, EV_REL, EV_SND, EV_SW, EV_SYN,
};
pub use filter::{DeviceFilter, VIRTUAL_DEVICE_PREFIX};
