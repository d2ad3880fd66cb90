//! Scripted controller and recording device shared by the unit tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vera_client::{ChangeBatch, ClientError, Cursor, DeviceChange, DeviceId};

use crate::controller::Controller;
use crate::device::Device;

/// One scripted answer of the fake controller
pub(crate) enum Step {
    Reply(Result<ChangeBatch, ClientError>),
    /// Raise the exit flag while "in flight", then return the batch
    StopDuring(ChangeBatch),
}

/// Controller that replays a fixed script and records every cursor it is asked for
///
/// Once the script runs out it answers with empty batches, raising the exit
/// flag first when one was attached with [`stopping`](Self::stopping).
pub(crate) struct ScriptedController {
    script: Mutex<VecDeque<Step>>,
    cursors: Mutex<Vec<Option<Cursor>>>,
    exit_flag: Option<Arc<AtomicBool>>,
}

impl ScriptedController {
    pub(crate) fn new(steps: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            cursors: Mutex::new(Vec::new()),
            exit_flag: None,
        }
    }

    pub(crate) fn stopping(mut self, flag: Arc<AtomicBool>) -> Self {
        self.exit_flag = Some(flag);
        self
    }

    pub(crate) fn batch(devices: Vec<DeviceChange>) -> ChangeBatch {
        ChangeBatch::new(devices, None)
    }

    pub(crate) fn batch_at(devices: Vec<DeviceChange>, cursor: Cursor) -> Step {
        Step::Reply(Ok(ChangeBatch::new(devices, Some(cursor))))
    }

    pub(crate) fn cursors(&self) -> Vec<Option<Cursor>> {
        self.cursors.lock().unwrap().clone()
    }

    fn raise_exit_flag(&self) {
        if let Some(flag) = &self.exit_flag {
            flag.store(true, Ordering::SeqCst);
        }
    }
}

impl Controller for ScriptedController {
    fn get_changed_devices(&self, cursor: Option<&Cursor>) -> Result<ChangeBatch, ClientError> {
        self.cursors.lock().unwrap().push(cursor.copied());

        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Step::Reply(reply)) => reply,
            Some(Step::StopDuring(batch)) => {
                self.raise_exit_flag();
                Ok(batch)
            }
            None => {
                self.raise_exit_flag();
                // Stand-in for the hub holding the long poll open
                std::thread::sleep(Duration::from_millis(1));
                Ok(ChangeBatch::new(Vec::new(), cursor.copied()))
            }
        }
    }
}

/// Device that records every update it receives
pub(crate) struct TestDevice {
    id: DeviceId,
    name: String,
    updates: Mutex<Vec<DeviceChange>>,
}

impl TestDevice {
    pub(crate) fn new(id: u32, name: &str) -> Arc<Self> {
        Arc::new(Self {
            id: DeviceId(id),
            name: name.to_string(),
            updates: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn updates(&self) -> Vec<DeviceChange> {
        self.updates.lock().unwrap().clone()
    }
}

impl Device for TestDevice {
    fn vera_device_id(&self) -> DeviceId {
        self.id
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn update(&self, change: &DeviceChange) {
        self.updates.lock().unwrap().push(change.clone());
    }
}
