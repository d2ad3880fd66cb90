//! Watch Changes - print every settled change of a few Vera devices
//!
//! Registers one callback per device id given on the command line, starts the
//! poll thread and prints each device's `status`/`level` fields whenever the
//! controller reports a finished job for it.
//!
//! Run with: cargo run -p vera-subscribe --example watch_changes -- http://192.168.1.161:3480 12 14

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::Value;
use vera_subscribe::logging::{init_logging, LoggingMode};
use vera_subscribe::prelude::*;

/// A device that only remembers the last record it was given
struct WatchedDevice {
    id: DeviceId,
    last_change: Mutex<Option<DeviceChange>>,
}

impl WatchedDevice {
    fn field(&self, key: &str) -> Option<Value> {
        self.last_change
            .lock()
            .ok()?
            .as_ref()
            .and_then(|change| change.field(key).cloned())
    }
}

impl Device for WatchedDevice {
    fn vera_device_id(&self) -> DeviceId {
        self.id
    }

    fn name(&self) -> String {
        format!("device #{}", self.id)
    }

    fn update(&self, change: &DeviceChange) {
        if let Ok(mut last) = self.last_change.lock() {
            *last = Some(change.clone());
        }
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingMode::Development)?;

    let mut args = std::env::args().skip(1);
    let base_url = args
        .next()
        .ok_or("usage: watch_changes <controller-url> <device-id>...")?;
    let ids: Vec<u32> = args.map(|a| a.parse()).collect::<std::result::Result<_, _>>()?;

    println!("=== Vera Change Watcher ===\n");
    println!("Controller: {}", base_url);

    let mut registry: SubscriptionRegistry<VeraClient, WatchedDevice> =
        SubscriptionRegistry::new(VeraClient::new(base_url));

    for id in ids {
        let device = Arc::new(WatchedDevice {
            id: DeviceId(id),
            last_change: Mutex::new(None),
        });
        registry.register(Some(device), |device| {
            println!(
                "[Change] {}: status={:?} level={:?}",
                device.name(),
                device.field("status"),
                device.field("level")
            );
        });
    }

    println!("Watching {} devices (Ctrl+C to quit)...\n", registry.device_count());
    registry.start()?;

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    while running.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(200));
    }

    println!("\nShutting down, waiting for the poll thread...");
    registry.stop();
    registry.join()?;

    Ok(())
}
