//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::adapters::identity::PasswordIdentityProvider;
use figure8_core::{DocumentStore, MapStore, Session};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// There is one session and one map store per process.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<PasswordIdentityProvider>,
    pub store: Arc<MapStore>,
}

impl AppState {
    /// Wires the identity provider, the session and the map store together
    /// over one document store.
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        let identity = Arc::new(PasswordIdentityProvider::new(documents.clone()));
        let session = Arc::new(Session::new(identity.clone()));
        let store = Arc::new(MapStore::new(documents, session));
        Self { identity, store }
    }
}
