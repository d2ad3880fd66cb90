//! Test helpers for registry integration tests

use std::collections::VecDeque;
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use vera_subscribe::{ChangeBatch, ClientError, Controller, Cursor, Device, DeviceChange, DeviceId};

/// A lamp that keeps the `status` field of its last settled record
pub struct Lamp {
    id: DeviceId,
    name: String,
    status: Mutex<Option<String>>,
    updates: Mutex<Vec<DeviceChange>>,
}

impl Lamp {
    pub fn new(id: u32, name: &str) -> Arc<Self> {
        Arc::new(Self {
            id: DeviceId(id),
            name: name.to_string(),
            status: Mutex::new(None),
            updates: Mutex::new(Vec::new()),
        })
    }

    pub fn status(&self) -> Option<String> {
        self.status.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<DeviceChange> {
        self.updates.lock().unwrap().clone()
    }
}

impl Device for Lamp {
    fn vera_device_id(&self) -> DeviceId {
        self.id
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn update(&self, change: &DeviceChange) {
        if let Some(status) = change.field("status").and_then(|v| v.as_str()) {
            *self.status.lock().unwrap() = Some(status.to_string());
        }
        self.updates.lock().unwrap().push(change.clone());
    }
}

/// Controller fed from a queue of batches; answers empty batches once drained
pub struct QueueController {
    batches: Mutex<VecDeque<Result<ChangeBatch, ClientError>>>,
    calls: Mutex<Vec<Option<Cursor>>>,
}

impl QueueController {
    pub fn new(batches: Vec<Result<ChangeBatch, ClientError>>) -> Arc<Self> {
        Arc::new(Self {
            batches: Mutex::new(batches.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Option<Cursor>> {
        self.calls.lock().unwrap().clone()
    }
}

impl Controller for QueueController {
    fn get_changed_devices(&self, cursor: Option<&Cursor>) -> Result<ChangeBatch, ClientError> {
        self.calls.lock().unwrap().push(cursor.copied());
        match self.batches.lock().unwrap().pop_front() {
            Some(reply) => reply,
            None => {
                std::thread::sleep(Duration::from_millis(5));
                Ok(ChangeBatch::new(Vec::new(), cursor.copied()))
            }
        }
    }
}

/// Callback that forwards the device name of every invocation to a channel
pub fn forwarding_callback(
    tag: &'static str,
    tx: mpsc::Sender<String>,
) -> impl Fn(&Arc<Lamp>) + Send + Sync + 'static {
    let tx = Mutex::new(tx);
    move |device: &Arc<Lamp>| {
        let _ = tx.lock().unwrap().send(format!("{}:{}", tag, device.name()));
    }
}
