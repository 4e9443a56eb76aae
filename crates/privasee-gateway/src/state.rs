//! Gateway application state.
//!
//! This module defines the shared state that is available to all request handlers.

use std::sync::Arc;

use privasee_identity::UserDirectory;
use privasee_store::RecordStore;

use crate::config::GatewayConfig;

/// Shared application state for the gateway.
pub struct GatewayState<S>
where
    S: RecordStore,
{
    /// The record store.
    pub store: Arc<S>,
    /// Directory of assignable users.
    pub directory: Arc<dyn UserDirectory>,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl<S> GatewayState<S>
where
    S: RecordStore,
{
    /// Create a new gateway state.
    #[must_use]
    pub fn new(store: Arc<S>, directory: Arc<dyn UserDirectory>, config: GatewayConfig) -> Self {
        Self {
            store,
            directory,
            config,
        }
    }
}

impl<S> Clone for GatewayState<S>
where
    S: RecordStore,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            directory: Arc::clone(&self.directory),
            config: self.config.clone(),
        }
    }
}
