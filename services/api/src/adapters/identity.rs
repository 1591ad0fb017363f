//! services/api/src/adapters/identity.rs
//!
//! An email/password implementation of the `IdentityProvider` port. Credentials
//! are argon2 hashes stored in the `users` collection of the document store, and
//! the current principal is published on a `watch` channel.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use figure8_core::domain::{AuthState, Identity};
use figure8_core::ports::{DocumentStore, Filter, IdentityProvider, PortError, PortResult};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};
use uuid::Uuid;

pub const USERS_COLLECTION: &str = "users";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    id: String,
    email: String,
    password_hash: String,
}

impl UserRecord {
    fn to_domain(&self) -> Identity {
        Identity {
            uid: self.id.clone(),
            email: Some(self.email.clone()),
        }
    }
}

/// A password-based identity provider for the single process-wide session.
pub struct PasswordIdentityProvider {
    documents: Arc<dyn DocumentStore>,
    state: watch::Sender<AuthState>,
    sign_in_requested: AtomicBool,
}

impl PasswordIdentityProvider {
    /// Creates a provider in the `Unresolved` state.
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        let (state, _) = watch::channel(AuthState::Unresolved);
        Self {
            documents,
            state,
            sign_in_requested: AtomicBool::new(false),
        }
    }

    /// Finishes startup. No session survives a restart, so the provider
    /// resolves to signed out.
    pub fn restore_session(&self) {
        self.state.send_if_modified(|state| {
            if *state == AuthState::Unresolved {
                *state = AuthState::SignedOut;
                true
            } else {
                false
            }
        });
    }

    /// Whether an interactive sign-in is waiting to be completed.
    pub fn sign_in_requested(&self) -> bool {
        self.sign_in_requested.load(Ordering::SeqCst)
    }

    /// Registers a new account and signs it in.
    pub async fn sign_up(&self, email: &str, password: &str) -> PortResult<Identity> {
        let email = normalize_email(email);
        if self.find_user(&email).await?.is_some() {
            return Err(PortError::Conflict(format!("Account {} already exists", email)));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                error!("Failed to hash password: {:?}", e);
                PortError::Unexpected("Failed to hash password".to_string())
            })?
            .to_string();

        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash,
        };
        let document =
            serde_json::to_value(&record).map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.documents
            .set(USERS_COLLECTION, &record.id, document)
            .await?;

        let identity = record.to_domain();
        self.publish(identity.clone());
        Ok(identity)
    }

    /// Completes a sign-in with existing credentials.
    pub async fn log_in(&self, email: &str, password: &str) -> PortResult<Identity> {
        let email = normalize_email(email);
        let record = self
            .find_user(&email)
            .await?
            .ok_or(PortError::Unauthorized)?;

        let parsed_hash = PasswordHash::new(&record.password_hash).map_err(|e| {
            error!("Failed to parse password hash: {:?}", e);
            PortError::Unexpected("Stored password hash is invalid".to_string())
        })?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| PortError::Unauthorized)?;

        let identity = record.to_domain();
        self.publish(identity.clone());
        Ok(identity)
    }

    async fn find_user(&self, email: &str) -> PortResult<Option<UserRecord>> {
        let documents = self
            .documents
            .get(USERS_COLLECTION, &Filter::eq("email", email))
            .await?;
        documents
            .into_iter()
            .next()
            .map(|document| {
                serde_json::from_value(document).map_err(|e| PortError::Unexpected(e.to_string()))
            })
            .transpose()
    }

    fn publish(&self, identity: Identity) {
        info!(uid = %identity.uid, "Signed in.");
        self.sign_in_requested.store(false, Ordering::SeqCst);
        self.state.send_replace(AuthState::SignedIn(identity));
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl IdentityProvider for PasswordIdentityProvider {
    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    async fn request_sign_in(&self) -> PortResult<()> {
        info!("Interactive sign-in requested.");
        self.sign_in_requested.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn sign_out(&self) -> PortResult<()> {
        self.sign_in_requested.store(false, Ordering::SeqCst);
        self.state.send_replace(AuthState::SignedOut);
        info!("Signed out.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryDocumentStore;

    fn provider() -> PasswordIdentityProvider {
        PasswordIdentityProvider::new(Arc::new(MemoryDocumentStore::new()))
    }

    #[tokio::test]
    async fn starts_unresolved_then_resolves_signed_out() {
        let provider = provider();
        let receiver = provider.subscribe();
        assert_eq!(*receiver.borrow(), AuthState::Unresolved);

        provider.restore_session();
        assert_eq!(*receiver.borrow(), AuthState::SignedOut);
    }

    #[tokio::test]
    async fn sign_up_then_log_in_with_the_same_password() {
        let provider = provider();
        provider.request_sign_in().await.unwrap();
        assert!(provider.sign_in_requested());

        let created = provider.sign_up(" Ada@Example.com ", "correct horse").await.unwrap();
        assert_eq!(created.email.as_deref(), Some("ada@example.com"));
        assert!(!provider.sign_in_requested());

        provider.sign_out().await.unwrap();
        assert_eq!(*provider.subscribe().borrow(), AuthState::SignedOut);

        let logged_in = provider.log_in("ada@example.com", "correct horse").await.unwrap();
        assert_eq!(logged_in.uid, created.uid);
        assert_eq!(
            *provider.subscribe().borrow(),
            AuthState::SignedIn(logged_in)
        );
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let provider = provider();
        provider.sign_up("ada@example.com", "correct horse").await.unwrap();
        provider.sign_out().await.unwrap();

        let result = provider.log_in("ada@example.com", "battery staple").await;
        assert!(matches!(result, Err(PortError::Unauthorized)));
        assert_eq!(*provider.subscribe().borrow(), AuthState::SignedOut);
    }

    #[tokio::test]
    async fn duplicate_accounts_are_rejected() {
        let provider = provider();
        provider.sign_up("ada@example.com", "correct horse").await.unwrap();
        let result = provider.sign_up("ADA@example.com", "another one").await;
        assert!(matches!(result, Err(PortError::Conflict(_))));
    }
}
