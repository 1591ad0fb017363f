//! services/api/src/adapters/memory.rs
//!
//! An in-memory implementation of the `DocumentStore` port, used when no
//! database is configured and by the router tests. Contents are lost on exit.

use async_trait::async_trait;
use figure8_core::ports::{Document, DocumentStore, Filter, PortError, PortResult};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

type Collection = BTreeMap<String, Document>;

/// Keeps every collection as an ordered map of JSON documents.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Looks up an existing document as a JSON object for in-place updates.
fn object_mut<'a>(
    collections: &'a mut HashMap<String, Collection>,
    collection: &str,
    id: &str,
) -> PortResult<&'a mut serde_json::Map<String, Value>> {
    collections
        .get_mut(collection)
        .and_then(|documents| documents.get_mut(id))
        .and_then(Value::as_object_mut)
        .ok_or_else(|| PortError::NotFound(format!("{}/{}", collection, id)))
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, filter: &Filter) -> PortResult<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|documents| {
                documents
                    .values()
                    .filter(|document| filter.matches(document))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn set(&self, collection: &str, id: &str, mut document: Document) -> PortResult<()> {
        let object = document.as_object_mut().ok_or_else(|| {
            PortError::Unexpected(format!("Document {}/{} is not a JSON object", collection, id))
        })?;
        object.insert("id".to_string(), Value::String(id.to_string()));

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document);
        Ok(())
    }

    async fn update_append(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> PortResult<()> {
        let mut collections = self.collections.write().await;
        let object = object_mut(&mut collections, collection, id)?;
        let entry = object
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        let items = entry.as_array_mut().ok_or_else(|| {
            PortError::Unexpected(format!("Field {} of {}/{} is not an array", field, collection, id))
        })?;
        if !items.contains(&value) {
            items.push(value);
        }
        Ok(())
    }

    async fn update_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> PortResult<()> {
        let mut collections = self.collections.write().await;
        object_mut(&mut collections, collection, id)?.insert(field.to_string(), value);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> PortResult<()> {
        if let Some(documents) = self.collections.write().await.get_mut(collection) {
            documents.remove(id);
        }
        Ok(())
    }
}
