//! crates/figure8_core/src/session.rs
//!
//! The Identity Gate: tracks the current principal and gates mutations on it.
//! One `Session` is created at startup and injected into the Map Store.

use crate::domain::{AuthState, Identity};
use crate::error::{StoreError, StoreResult};
use crate::ports::IdentityProvider;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

pub struct Session {
    provider: Arc<dyn IdentityProvider>,
    state: watch::Receiver<AuthState>,
}

impl Session {
    /// Subscribes to the provider. The first resolved state arrives later,
    /// once the provider has looked for an existing session.
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let state = provider.subscribe();
        Self { provider, state }
    }

    pub fn auth_state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// The principal at call time, if any.
    pub fn principal(&self) -> Option<Identity> {
        self.state.borrow().principal().cloned()
    }

    /// A fresh receiver for principal transitions.
    pub fn changes(&self) -> watch::Receiver<AuthState> {
        self.state.clone()
    }

    /// Starts the interactive sign-in flow. Failures are logged and swallowed;
    /// callers learn about a successful sign-in only through `changes`.
    pub async fn request_sign_in(&self) {
        if let Err(e) = self.provider.request_sign_in().await {
            warn!("Sign-in request failed: {}", e);
        }
    }

    /// Returns the principal, or requests a sign-in and reports
    /// `PermissionDenied` so the caller can abort.
    pub async fn require_principal(&self) -> StoreResult<Identity> {
        match self.principal() {
            Some(identity) => Ok(identity),
            None => {
                info!("Operation needs a principal, requesting sign-in.");
                self.request_sign_in().await;
                Err(StoreError::PermissionDenied)
            }
        }
    }

    pub async fn sign_out(&self) -> StoreResult<()> {
        self.provider.sign_out().await.map_err(|e| {
            warn!("Sign-out failed: {}", e);
            StoreError::SignOut(e)
        })
    }
}
