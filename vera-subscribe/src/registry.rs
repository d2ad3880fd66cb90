//! Subscription registry
//!
//! Holds the devices the caller cares about together with their callbacks,
//! and owns the lifecycle of the background poll thread.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::RwLock;
use vera_client::DeviceId;

use crate::config::PollConfig;
use crate::controller::Controller;
use crate::device::Device;
use crate::error::{Result, SubscribeError};
use crate::poll::spawn_poll_thread;

/// Callback fired on the poll thread after a device has been updated
pub type Callback<D> = Arc<dyn Fn(&Arc<D>) + Send + Sync>;

/// Devices and callbacks, keyed by device id
pub(crate) struct Subscriptions<D: ?Sized> {
    devices: HashMap<DeviceId, Arc<D>>,
    callbacks: HashMap<DeviceId, Vec<Callback<D>>>,
}

impl<D: ?Sized> Subscriptions<D> {
    pub(crate) fn new() -> Self {
        Self {
            devices: HashMap::new(),
            callbacks: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, id: DeviceId, device: Arc<D>, callback: Callback<D>) {
        self.devices.insert(id, device);
        self.callbacks.entry(id).or_default().push(callback);
    }

    /// Device handle plus a snapshot of its callbacks, so they can run unlocked
    pub(crate) fn lookup(&self, id: DeviceId) -> Option<(Arc<D>, Vec<Callback<D>>)> {
        let device = self.devices.get(&id)?;
        let callbacks = self.callbacks.get(&id).cloned().unwrap_or_default();
        Some((Arc::clone(device), callbacks))
    }

    fn device(&self, id: DeviceId) -> Option<Arc<D>> {
        self.devices.get(&id).cloned()
    }

    fn device_count(&self) -> usize {
        self.devices.len()
    }

    fn callback_count(&self, id: DeviceId) -> usize {
        self.callbacks.get(&id).map_or(0, Vec::len)
    }
}

/// Registry of device subscriptions backed by a single poll thread
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use vera_client::VeraClient;
/// use vera_subscribe::{Device, SubscriptionRegistry};
///
/// let mut registry = SubscriptionRegistry::new(VeraClient::new("http://192.168.1.161:3480"));
///
/// let lamp: Arc<dyn Device> = Arc::new(my_lamp);
/// registry.register(Some(lamp), |device| {
///     println!("{} changed", device.name());
/// });
///
/// registry.start()?;
/// // ...
/// registry.stop();
/// registry.join()?;
/// ```
///
/// Dropping the registry asks the poll thread to stop but does not wait for
/// it. If the process exits before [`join`](Self::join) returns, the poll
/// thread is torn down wherever it is and any remaining callbacks of the
/// batch in flight do not run.
pub struct SubscriptionRegistry<C, D: ?Sized = dyn Device> {
    controller: Arc<C>,
    subscriptions: Arc<RwLock<Subscriptions<D>>>,
    exiting: Arc<AtomicBool>,
    poll_thread: Option<JoinHandle<()>>,
    config: PollConfig,
}

impl<C, D> SubscriptionRegistry<C, D>
where
    C: Controller,
    D: Device + ?Sized + 'static,
{
    /// Create a registry polling `controller` with the default timings
    pub fn new(controller: C) -> Self {
        Self::with_config(controller, PollConfig::default())
    }

    pub fn with_config(controller: C, config: PollConfig) -> Self {
        Self {
            controller: Arc::new(controller),
            subscriptions: Arc::new(RwLock::new(Subscriptions::new())),
            exiting: Arc::new(AtomicBool::new(false)),
            poll_thread: None,
            config,
        }
    }

    /// Subscribe `callback` to changes of `device`
    ///
    /// A missing device is logged and ignored. Registering the same device
    /// again keeps earlier callbacks and appends the new one.
    pub fn register<F>(&self, device: Option<Arc<D>>, callback: F)
    where
        F: Fn(&Arc<D>) + Send + Sync + 'static,
    {
        let Some(device) = device else {
            tracing::error!("Received an invalid device: None");
            return;
        };

        tracing::info!("Subscribing to events for {}", device.name());

        let id = device.vera_device_id();
        self.subscriptions
            .write()
            .insert(id, device, Arc::new(callback));
    }

    /// Spawn the poll thread and return without waiting for it
    pub fn start(&mut self) -> Result<()> {
        if self.poll_thread.is_some() {
            return Err(SubscribeError::AlreadyRunning);
        }

        let handle = spawn_poll_thread(
            Arc::clone(&self.controller),
            Arc::clone(&self.subscriptions),
            Arc::clone(&self.exiting),
            self.config.clone(),
        )?;

        self.poll_thread = Some(handle);
        Ok(())
    }

    /// Ask the poll thread to exit at its next check
    ///
    /// Does not interrupt a sleep or a request that is already in progress.
    pub fn stop(&self) {
        self.exiting.store(true, Ordering::SeqCst);
    }

    /// Block until the poll thread has exited
    ///
    /// Once the thread is gone the exit flag is cleared, so the registry can
    /// be started again. A stop requested before [`start`](Self::start) is
    /// kept and ends the new thread at its first check.
    pub fn join(&mut self) -> Result<()> {
        let handle = self.poll_thread.take().ok_or(SubscribeError::NotStarted)?;
        let joined = handle.join();
        self.exiting.store(false, Ordering::SeqCst);
        joined.map_err(|_| SubscribeError::PollThreadPanicked)
    }

    /// Whether a poll thread has been started and has not finished yet
    pub fn is_running(&self) -> bool {
        self.poll_thread
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn device(&self, id: DeviceId) -> Option<Arc<D>> {
        self.subscriptions.read().device(id)
    }

    pub fn device_count(&self) -> usize {
        self.subscriptions.read().device_count()
    }

    pub fn callback_count(&self, id: DeviceId) -> usize {
        self.subscriptions.read().callback_count(id)
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }
}

impl<C, D: ?Sized> Drop for SubscriptionRegistry<C, D> {
    fn drop(&mut self) {
        self.exiting.store(true, Ordering::SeqCst);
    }
}
