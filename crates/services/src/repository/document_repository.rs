use async_trait::async_trait;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

use super::filter::{Filter, FindOptions};
use super::ports::{Document, DocumentStore, Entity, Repository, RepositoryError};
use crate::validation::ValidationError;
use crate::DocumentId;

/// The single implementation of [`Repository`], shared by every entity type
pub struct DocumentRepository<E> {
    store: Arc<dyn DocumentStore>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> DocumentRepository<E> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub fn collection(&self) -> &'static str {
        E::COLLECTION
    }
}

impl<E> Clone for DocumentRepository<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _entity: PhantomData,
        }
    }
}

fn to_object<T: serde::Serialize>(
    collection: &str,
    value: &T,
) -> Result<serde_json::Map<String, Value>, ValidationError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ValidationError::new(
            collection,
            format!("expected an object of fields, got {other}"),
        )),
        Err(e) => Err(ValidationError::new(collection, e.to_string())),
    }
}

/// Log a store failure, then hand it back unchanged.
fn store_failure(collection: &str, operation: &str, err: anyhow::Error) -> anyhow::Error {
    tracing::error!(
        "Repository: {} on '{}' failed: {:?}",
        operation,
        collection,
        err
    );
    err
}

#[async_trait]
impl<E: Entity> Repository<E> for DocumentRepository<E> {
    async fn create(&self, fields: E) -> Result<Document<E>, RepositoryError> {
        fields.validate()?;
        let body = to_object(E::COLLECTION, &fields)?;

        tracing::info!("Repository: Creating document in '{}'", E::COLLECTION);

        let stored = self
            .store
            .insert(E::COLLECTION, Value::Object(body))
            .await
            .map_err(|e| store_failure(E::COLLECTION, "insert", e))?;

        tracing::debug!(
            "Repository: Created document id={} in '{}'",
            stored.id,
            E::COLLECTION
        );

        stored.into_document()
    }

    async fn find_by_id(&self, id: DocumentId) -> Result<Option<Document<E>>, RepositoryError> {
        tracing::debug!("Repository: Fetching id={} from '{}'", id, E::COLLECTION);

        self.store
            .get(E::COLLECTION, id)
            .await
            .map_err(|e| store_failure(E::COLLECTION, "get", e))?
            .map(|stored| stored.into_document())
            .transpose()
    }

    async fn find(
        &self,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document<E>>, RepositoryError> {
        tracing::debug!(
            "Repository: Querying '{}' with {} predicate(s), skip={}, limit={:?}",
            E::COLLECTION,
            filter.predicates().len(),
            options.skip,
            options.limit
        );

        self.store
            .query(E::COLLECTION, filter, options)
            .await
            .map_err(|e| store_failure(E::COLLECTION, "query", e))?
            .into_iter()
            .map(|stored| stored.into_document())
            .collect()
    }

    async fn update(
        &self,
        id: DocumentId,
        patch: E::Patch,
    ) -> Result<Option<Document<E>>, RepositoryError> {
        E::validate_patch(&patch)?;
        let fields = to_object(E::COLLECTION, &patch)?;

        tracing::info!(
            "Repository: Updating id={} in '{}' (fields: {:?})",
            id,
            E::COLLECTION,
            fields.keys().collect::<Vec<_>>()
        );

        let updated = self
            .store
            .merge(E::COLLECTION, id, fields)
            .await
            .map_err(|e| store_failure(E::COLLECTION, "merge", e))?;
        if updated.is_none() {
            tracing::debug!("Repository: id={} not found in '{}'", id, E::COLLECTION);
        }

        updated.map(|stored| stored.into_document()).transpose()
    }

    async fn delete(&self, id: DocumentId) -> Result<bool, RepositoryError> {
        tracing::info!("Repository: Deleting id={} from '{}'", id, E::COLLECTION);

        let removed = self
            .store
            .remove(E::COLLECTION, id)
            .await
            .map_err(|e| store_failure(E::COLLECTION, "remove", e))?;

        tracing::debug!(
            "Repository: Delete id={} from '{}' removed={}",
            id,
            E::COLLECTION,
            removed
        );

        Ok(removed)
    }
}
