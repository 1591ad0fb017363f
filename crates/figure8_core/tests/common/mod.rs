//! Fake collaborators shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use figure8_core::{
    AuthState, Document, DocumentStore, Filter, Identity, IdentityProvider, MapStore, PortError,
    PortResult, Session,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

//=========================================================================================
// Document store
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Set { collection: String, id: String },
    Append { collection: String, id: String, field: String },
    Field { collection: String, id: String, field: String },
    Delete { collection: String, id: String },
}

/// In-memory store that records every write and can be told to fail them.
#[derive(Default)]
pub struct FakeDocumentStore {
    collections: Mutex<BTreeMap<String, BTreeMap<String, Document>>>,
    writes: Mutex<Vec<Write>>,
    fail_writes: AtomicBool,
    latency_ms: AtomicU64,
}

impl FakeDocumentStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes every `get` and `set` answer only after `latency`. Reads see the
    /// contents as of the request.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    async fn wait(&self) {
        let ms = self.latency_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.lock().unwrap().clone()
    }

    pub fn document(&self, collection: &str, id: &str) -> Option<Document> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
    }

    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn insert(&self, collection: &str, id: &str, document: Document) {
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document);
    }

    fn record(&self, write: Write) -> PortResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("injected failure".to_string()));
        }
        self.writes.lock().unwrap().push(write);
        Ok(())
    }

    fn with_document<F>(&self, collection: &str, id: &str, f: F) -> PortResult<()>
    where
        F: FnOnce(&mut serde_json::Map<String, Value>),
    {
        let mut collections = self.collections.lock().unwrap();
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| PortError::NotFound(format!("{collection}/{id}")))?;
        f(document);
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FakeDocumentStore {
    async fn get(&self, collection: &str, filter: &Filter) -> PortResult<Vec<Document>> {
        let found = self
            .documents(collection)
            .into_iter()
            .filter(|doc| filter.matches(doc))
            .collect();
        self.wait().await;
        Ok(found)
    }

    async fn set(&self, collection: &str, id: &str, document: Document) -> PortResult<()> {
        self.wait().await;
        self.record(Write::Set {
            collection: collection.to_string(),
            id: id.to_string(),
        })?;
        self.insert(collection, id, document);
        Ok(())
    }

    async fn update_append(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> PortResult<()> {
        self.record(Write::Append {
            collection: collection.to_string(),
            id: id.to_string(),
            field: field.to_string(),
        })?;
        self.with_document(collection, id, |doc| {
            let entry = doc
                .entry(field.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(items) = entry {
                if !items.contains(&value) {
                    items.push(value);
                }
            }
        })
    }

    async fn update_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> PortResult<()> {
        self.record(Write::Field {
            collection: collection.to_string(),
            id: id.to_string(),
            field: field.to_string(),
        })?;
        self.with_document(collection, id, |doc| {
            doc.insert(field.to_string(), value);
        })
    }

    async fn delete(&self, collection: &str, id: &str) -> PortResult<()> {
        self.record(Write::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        })?;
        if let Some(docs) = self.collections.lock().unwrap().get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}

//=========================================================================================
// Identity provider
//=========================================================================================

/// Identity provider driven by the test.
pub struct FakeIdentityProvider {
    state: watch::Sender<AuthState>,
    sign_in_requests: AtomicUsize,
    fail_sign_in: AtomicBool,
    fail_sign_out: AtomicBool,
}

impl FakeIdentityProvider {
    pub fn new() -> Arc<Self> {
        let (state, _) = watch::channel(AuthState::Unresolved);
        Arc::new(Self {
            state,
            sign_in_requests: AtomicUsize::new(0),
            fail_sign_in: AtomicBool::new(false),
            fail_sign_out: AtomicBool::new(false),
        })
    }

    pub fn sign_in_as(&self, uid: &str) {
        self.state.send_replace(AuthState::SignedIn(identity(uid)));
    }

    pub fn resolve_signed_out(&self) {
        self.state.send_replace(AuthState::SignedOut);
    }

    pub fn sign_in_requests(&self) -> usize {
        self.sign_in_requests.load(Ordering::SeqCst)
    }

    pub fn fail_sign_in(&self, fail: bool) {
        self.fail_sign_in.store(fail, Ordering::SeqCst);
    }

    pub fn fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    async fn request_sign_in(&self) -> PortResult<()> {
        self.sign_in_requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_sign_in.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("popup closed".to_string()));
        }
        Ok(())
    }

    async fn sign_out(&self) -> PortResult<()> {
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("network down".to_string()));
        }
        self.state.send_replace(AuthState::SignedOut);
        Ok(())
    }
}

pub fn identity(uid: &str) -> Identity {
    Identity {
        uid: uid.to_string(),
        email: Some(format!("{uid}@example.com")),
    }
}

//=========================================================================================
// Harness
//=========================================================================================

pub struct Harness {
    pub documents: Arc<FakeDocumentStore>,
    pub identity: Arc<FakeIdentityProvider>,
    pub store: Arc<MapStore>,
}

impl Harness {
    pub fn new() -> Self {
        let documents = FakeDocumentStore::new();
        let identity = FakeIdentityProvider::new();
        let session = Arc::new(Session::new(identity.clone()));
        let store = Arc::new(MapStore::new(documents.clone(), session));
        Self {
            documents,
            identity,
            store,
        }
    }

    pub async fn signed_out() -> Self {
        let harness = Self::new();
        harness.identity.resolve_signed_out();
        harness.store.refresh().await.unwrap();
        harness
    }

    pub async fn signed_in(uid: &str) -> Self {
        let harness = Self::new();
        harness.identity.sign_in_as(uid);
        harness.store.refresh().await.unwrap();
        harness
    }

    pub async fn map_names(&self) -> Vec<String> {
        self.store
            .snapshot()
            .await
            .maps
            .into_iter()
            .map(|map| map.name)
            .collect()
    }
}
