//! # Vera Subscribe
//!
//! Change notifications for devices on a Vera home-automation controller.
//!
//! ## Overview
//!
//! A [`SubscriptionRegistry`] maps device ids to the callbacks interested in
//! them and runs one background thread that long-polls the controller for
//! changed devices. Each changed record carries the status of the last job the
//! controller ran for the device:
//!
//! - **Pending** (waiting to start, in progress, waiting for callback,
//!   requeued, pending data): logged at `warn`, checked again next cycle
//! - **Settled** (no job, done): the device is updated and every callback
//!   registered for it runs, in registration order
//! - **Failed** (error, aborted, unknown code): logged at `error` and dropped
//!
//! Records for devices nobody registered are ignored.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vera_client::VeraClient;
//! use vera_subscribe::{Device, SubscriptionRegistry};
//!
//! let mut registry = SubscriptionRegistry::new(VeraClient::new("http://192.168.1.161:3480"));
//!
//! let lamp: Arc<dyn Device> = Arc::new(lamp);
//! registry.register(Some(lamp), |device| println!("{} changed", device.name()));
//!
//! registry.start()?;
//! // ... later
//! registry.stop();
//! registry.join()?;
//! ```
//!
//! ## Threading
//!
//! Callbacks run synchronously on the poll thread; a slow callback delays the
//! rest of its batch and the next poll. Stopping is cooperative: the poll
//! thread notices [`SubscriptionRegistry::stop`] before the next request or
//! when the current one returns, never in the middle of a sleep.

pub mod config;
pub mod controller;
pub mod device;
pub mod error;
pub mod job;
pub mod logging;
mod poll;
pub mod registry;

#[cfg(test)]
mod test_support;

pub use config::PollConfig;
pub use controller::Controller;
pub use device::Device;
pub use error::{Result, SubscribeError};
pub use job::{JobOutcome, JobState};
pub use registry::{Callback, SubscriptionRegistry};

// Re-export the wire types callers see in `Device::update`
pub use vera_client::{ChangeBatch, ClientError, Cursor, DeviceChange, DeviceId, VeraClient};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Controller, Device, DeviceChange, DeviceId, PollConfig, Result, SubscribeError,
        SubscriptionRegistry, VeraClient,
    };
}
