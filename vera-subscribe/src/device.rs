//! Device collaborator contract

use vera_client::{DeviceChange, DeviceId};

/// A device whose state is kept in sync with the controller
///
/// Devices are shared between the caller and the poll thread, so `update`
/// takes `&self` and implementations keep their mutable state behind a lock.
pub trait Device: Send + Sync {
    /// Identifier the controller reports this device under
    fn vera_device_id(&self) -> DeviceId;

    /// Display name, used in log output
    fn name(&self) -> String;

    /// Apply a changed-device record to the device's own fields
    fn update(&self, change: &DeviceChange);
}
