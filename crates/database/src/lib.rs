pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, DbPool};
pub use repositories::PostgresDocumentStore;

use anyhow::Result;
use services::address::AddressFields;
use services::chat::{ChatMessageFields, ChatSessionFields};
use services::payment::PaymentOrderFields;
use services::repository::{DocumentRepository, DocumentStore, Entity, InMemoryDocumentStore};
use services::subscription::SubscriptionPlanFields;
use std::sync::Arc;

/// Database service handing out repositories over one document store
pub struct Database {
    store: Arc<dyn DocumentStore>,
    pool: Option<DbPool>,
}

impl Database {
    /// Create a new database service from a connection pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            store: Arc::new(PostgresDocumentStore::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Database backed by a process-local store, with nothing to migrate
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(InMemoryDocumentStore::new()),
            pool: None,
        }
    }

    /// Create a new database service from configuration
    pub async fn from_config(config: &config::DatabaseConfig) -> Result<Self> {
        if config.mock {
            tracing::warn!("DATABASE_MOCK is set; documents are kept in memory only");
            return Ok(Self::in_memory());
        }

        let pool = create_pool(config)?;
        Ok(Self::new(pool))
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        match &self.pool {
            Some(pool) => migrations::run(pool).await,
            None => {
                tracing::info!("In-memory database, skipping migrations");
                Ok(())
            }
        }
    }

    /// Get a reference to the connection pool, if Postgres-backed
    pub fn pool(&self) -> Option<&DbPool> {
        self.pool.as_ref()
    }

    pub fn store(&self) -> Arc<dyn DocumentStore> {
        self.store.clone()
    }

    /// Repository for any entity over this database's store
    pub fn repository<E: Entity>(&self) -> Arc<DocumentRepository<E>> {
        Arc::new(DocumentRepository::new(self.store()))
    }

    pub fn address_repository(&self) -> Arc<DocumentRepository<AddressFields>> {
        self.repository()
    }

    pub fn subscription_plan_repository(&self) -> Arc<DocumentRepository<SubscriptionPlanFields>> {
        self.repository()
    }

    pub fn payment_order_repository(&self) -> Arc<DocumentRepository<PaymentOrderFields>> {
        self.repository()
    }

    pub fn chat_session_repository(&self) -> Arc<DocumentRepository<ChatSessionFields>> {
        self.repository()
    }

    pub fn chat_message_repository(&self) -> Arc<DocumentRepository<ChatMessageFields>> {
        self.repository()
    }
}
