use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::filter::{Filter, FindOptions};
use crate::validation::ValidationError;
use crate::DocumentId;

/// Field shape of a persisted entity.
///
/// Implementing this trait is the whole of a concrete repository's configuration: the
/// collection the entity lives in, its partial-update shape and its schema rules.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection the documents are stored under
    const COLLECTION: &'static str;

    /// Partial field set accepted by `update`. Absent fields must not serialize.
    type Patch: Serialize + Send + Sync + 'static;

    /// Schema rules checked before `create`
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Schema rules for the fields a patch provides, checked before `update`
    fn validate_patch(_patch: &Self::Patch) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// A persisted entity together with its store-maintained metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document<E> {
    pub id: DocumentId,
    pub fields: E,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Untyped document as the store binding returns it
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub body: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredDocument {
    /// Decode the body into the entity's field shape.
    pub fn into_document<E: Entity>(self) -> Result<Document<E>, RepositoryError> {
        let fields = serde_json::from_value(self.body).map_err(|e| {
            anyhow::anyhow!(
                "Stored document {} in '{}' does not match its schema: {}",
                self.id,
                E::COLLECTION,
                e
            )
        })?;
        Ok(Document {
            id: self.id,
            fields,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Failure reported by the store binding, passed through untouched
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Persistence binding the generic repository is implemented against.
///
/// Bodies are JSON objects. Implementations generate identifiers and timestamps.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document and return it with its generated identifier
    async fn insert(&self, collection: &str, body: Value) -> anyhow::Result<StoredDocument>;

    async fn get(&self, collection: &str, id: DocumentId)
        -> anyhow::Result<Option<StoredDocument>>;

    /// Documents matching every predicate, ordered then paginated
    async fn query(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> anyhow::Result<Vec<StoredDocument>>;

    /// Overwrite the given top-level fields in one atomic write.
    /// Returns `None` if the document does not exist.
    async fn merge(
        &self,
        collection: &str,
        id: DocumentId,
        patch: Map<String, Value>,
    ) -> anyhow::Result<Option<StoredDocument>>;

    /// Returns whether a document was removed
    async fn remove(&self, collection: &str, id: DocumentId) -> anyhow::Result<bool>;
}

/// Uniform CRUD/query contract every entity repository exposes
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Persist a new entity. Fails with a validation error if the schema rejects it.
    async fn create(&self, fields: E) -> Result<Document<E>, RepositoryError>;

    /// Absence is `Ok(None)`, never an error
    async fn find_by_id(&self, id: DocumentId) -> Result<Option<Document<E>>, RepositoryError>;

    /// Zero matches is an empty vec, never an error
    async fn find(
        &self,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document<E>>, RepositoryError>;

    /// Apply a partial field set; `Ok(None)` if the id is unknown
    async fn update(
        &self,
        id: DocumentId,
        patch: E::Patch,
    ) -> Result<Option<Document<E>>, RepositoryError>;

    /// Idempotent; `true` only if a document was actually removed
    async fn delete(&self, id: DocumentId) -> Result<bool, RepositoryError>;
}
