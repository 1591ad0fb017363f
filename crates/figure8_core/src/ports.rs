//! crates/figure8_core/src/ports.rs
//!
//! Defines the contracts (traits) for the collaborators the core depends on.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete document store and identity provider.

use crate::domain::AuthState;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Item already exists: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// A schemaless document. Stores expect a JSON object.
pub type Document = Value;

/// Equality filter on a top-level document field.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub equals: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, equals: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            equals: equals.into(),
        }
    }

    /// Whether `document` satisfies the filter. Adapters without a query
    /// language of their own use this directly.
    pub fn matches(&self, document: &Document) -> bool {
        document.get(&self.field) == Some(&self.equals)
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns every document of `collection` matching `filter`, each with its
    /// `id` field present.
    async fn get(&self, collection: &str, filter: &Filter) -> PortResult<Vec<Document>>;

    /// Creates or fully replaces the document `id`.
    async fn set(&self, collection: &str, id: &str, document: Document) -> PortResult<()>;

    /// Adds `value` to the array `field` unless an equal element is already
    /// present. Concurrent appends must all survive regardless of arrival order.
    async fn update_append(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> PortResult<()>;

    /// Overwrites a single top-level field of an existing document.
    async fn update_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> PortResult<()>;

    async fn delete(&self, collection: &str, id: &str) -> PortResult<()>;
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Subscribes to principal changes. The receiver starts at the provider's
    /// current state, which is `AuthState::Unresolved` until any existing
    /// session has been restored. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> watch::Receiver<AuthState>;

    /// Starts an interactive sign-in. Returning `Ok` does not mean the user
    /// signed in; success is only ever reported through `subscribe`.
    async fn request_sign_in(&self) -> PortResult<()>;

    /// Clears the provider session.
    async fn sign_out(&self) -> PortResult<()>;
}
