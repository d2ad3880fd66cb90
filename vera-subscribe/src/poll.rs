//! Background poll thread
//!
//! Spawns the thread that long-polls the controller for changed devices,
//! classifies each record by its job state and dispatches callbacks for the
//! ones that settled.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::RwLock;
use vera_client::{Cursor, DeviceChange};

use crate::config::PollConfig;
use crate::controller::Controller;
use crate::device::Device;
use crate::job::{JobOutcome, JobState};
use crate::registry::Subscriptions;

pub(crate) const POLL_THREAD_NAME: &str = "Vera Poll Thread";

/// Spawns the named poll thread
pub(crate) fn spawn_poll_thread<C, D>(
    controller: Arc<C>,
    subscriptions: Arc<RwLock<Subscriptions<D>>>,
    exiting: Arc<AtomicBool>,
    config: PollConfig,
) -> std::io::Result<JoinHandle<()>>
where
    C: Controller,
    D: Device + ?Sized + 'static,
{
    thread::Builder::new()
        .name(POLL_THREAD_NAME.to_string())
        .spawn(move || run_poll_loop(&*controller, &subscriptions, &exiting, &config))
}

/// Poll until `exiting` is set
///
/// The flag is checked before every request and again once the request
/// returns, so a batch fetched while a stop was requested is discarded.
pub(crate) fn run_poll_loop<C, D>(
    controller: &C,
    subscriptions: &RwLock<Subscriptions<D>>,
    exiting: &AtomicBool,
    config: &PollConfig,
) where
    C: Controller + ?Sized,
    D: Device + ?Sized,
{
    // Devices already reflect the current state at startup; the first
    // poll after the warm-up should only report real changes.
    thread::sleep(config.warmup);

    let mut cursor: Option<Cursor> = None;

    while !exiting.load(Ordering::SeqCst) {
        match controller.get_changed_devices(cursor.as_ref()) {
            Ok(batch) => {
                if cursor.is_some() && batch.cursor.is_none() {
                    tracing::warn!("Vera sent no change cursor - next poll is a full resync");
                }
                cursor = batch.cursor;

                if exiting.load(Ordering::SeqCst) {
                    tracing::debug!("Stop requested during poll, discarding batch");
                    continue;
                }

                if batch.is_empty() {
                    tracing::info!("No changes in poll interval");
                    continue;
                }

                dispatch_changes(&batch.devices, subscriptions);
                thread::sleep(config.batch_interval);
            }
            Err(e) if e.is_transport() => {
                tracing::info!(
                    "Could not contact Vera - will retry in {:?}",
                    config.retry_interval
                );
                thread::sleep(config.retry_interval);
            }
            Err(e) => {
                tracing::warn!(
                    "Bad response from Vera ({}) - will retry in {:?}",
                    e,
                    config.retry_interval
                );
                thread::sleep(config.retry_interval);
            }
        }
    }

    tracing::info!("Shutdown Vera Poll Thread");
}

/// Apply one batch of changed-device records
///
/// Records for unregistered devices are skipped without a log line.
pub(crate) fn dispatch_changes<D>(changes: &[DeviceChange], subscriptions: &RwLock<Subscriptions<D>>)
where
    D: Device + ?Sized,
{
    for change in changes {
        let entry = subscriptions.read().lookup(change.id);
        let Some((device, callbacks)) = entry else {
            continue;
        };

        let state = JobState::from_record_state(change.state);
        match state.outcome() {
            JobOutcome::Pending => {
                tracing::warn!(
                    "Pending: device {}, state {}, {}",
                    device.name(),
                    state,
                    change.comment()
                );
            }
            JobOutcome::Failed => {
                tracing::error!(
                    "Device {}, state {}, {}",
                    device.name(),
                    state,
                    change.comment()
                );
            }
            JobOutcome::Success => {
                device.update(change);
                for callback in &callbacks {
                    callback(&device);
                }
            }
        }
    }
}
