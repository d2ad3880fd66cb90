//! Controller collaborator contract
//!
//! The poll loop only needs one thing from the hub: the devices that changed
//! since a cursor. Anything that can answer that question can drive a
//! [`SubscriptionRegistry`](crate::SubscriptionRegistry).

use std::sync::Arc;

use vera_client::{ChangeBatch, ClientError, Cursor, VeraClient};

/// Source of device changes
pub trait Controller: Send + Sync + 'static {
    /// Fetch the devices changed since `cursor` (`None` means everything)
    ///
    /// Transport problems must be reported as `Err`, never as an empty batch.
    fn get_changed_devices(&self, cursor: Option<&Cursor>) -> Result<ChangeBatch, ClientError>;
}

impl Controller for VeraClient {
    fn get_changed_devices(&self, cursor: Option<&Cursor>) -> Result<ChangeBatch, ClientError> {
        VeraClient::get_changed_devices(self, cursor)
    }
}

impl<C: Controller + ?Sized> Controller for Arc<C> {
    fn get_changed_devices(&self, cursor: Option<&Cursor>) -> Result<ChangeBatch, ClientError> {
        (**self).get_changed_devices(cursor)
    }
}
