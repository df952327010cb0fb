use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::filter::{Filter, FindOptions};
use super::ports::{DocumentStore, StoredDocument};
use crate::DocumentId;

/// Process-local document store.
///
/// Backs the repository when the database runs in mock mode and in tests. Documents keep
/// insertion order, which is also the tie-break order for sorted queries.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<StoredDocument>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in a collection
    pub fn len(&self, collection: &str) -> anyhow::Result<usize> {
        Ok(self.read()?.get(collection).map_or(0, Vec::len))
    }

    fn read(&self) -> anyhow::Result<RwLockReadGuard<'_, HashMap<String, Vec<StoredDocument>>>> {
        self.collections
            .read()
            .map_err(|_| anyhow::anyhow!("In-memory document store lock poisoned"))
    }

    fn write(
        &self,
    ) -> anyhow::Result<RwLockWriteGuard<'_, HashMap<String, Vec<StoredDocument>>>> {
        self.collections
            .write()
            .map_err(|_| anyhow::anyhow!("In-memory document store lock poisoned"))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, collection: &str, body: Value) -> anyhow::Result<StoredDocument> {
        if !body.is_object() {
            anyhow::bail!("Document body for '{}' must be a JSON object", collection);
        }

        let now = Utc::now();
        let document = StoredDocument {
            id: DocumentId::new(),
            body,
            created_at: now,
            updated_at: now,
        };

        self.write()?
            .entry(collection.to_string())
            .or_default()
            .push(document.clone());

        Ok(document)
    }

    async fn get(
        &self,
        collection: &str,
        id: DocumentId,
    ) -> anyhow::Result<Option<StoredDocument>> {
        Ok(self
            .read()?
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    async fn query(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> anyhow::Result<Vec<StoredDocument>> {
        let mut matched: Vec<StoredDocument> = self
            .read()?
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| filter.matches(&d.body))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        // Stable sort keeps insertion order among equal keys
        if let Some(sort) = &options.sort {
            matched.sort_by(|a, b| sort.compare(&a.body, &b.body));
        }

        let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
        let limit = options
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));

        Ok(matched.into_iter().skip(skip).take(limit).collect())
    }

    async fn merge(
        &self,
        collection: &str,
        id: DocumentId,
        patch: Map<String, Value>,
    ) -> anyhow::Result<Option<StoredDocument>> {
        let mut collections = self.write()?;
        let Some(document) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
        else {
            return Ok(None);
        };

        let Value::Object(body) = &mut document.body else {
            anyhow::bail!("Stored document {} in '{}' is not an object", id, collection);
        };
        body.extend(patch);
        document.updated_at = Utc::now();

        Ok(Some(document.clone()))
    }

    async fn remove(&self, collection: &str, id: DocumentId) -> anyhow::Result<bool> {
        let mut collections = self.write()?;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };

        match docs.iter().position(|d| d.id == id) {
            Some(index) => {
                docs.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
