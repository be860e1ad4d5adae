mod model;
mod source;
mod tracker;

pub use model::{Anchor, Device, DevicePosition};
pub use source::{DeviceSample, RssiSource, SyntheticSource};
pub use tracker::{DeviceTracker, calculate_distance, trilaterate};
