use crate::pool::DbPool;
use anyhow::Context;

/// Idempotent schema bootstrap; safe to run on every start.
const BOOTSTRAP_SQL: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS documents (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        collection TEXT NOT NULL,
        body JSONB NOT NULL CHECK (jsonb_typeof(body) = 'object'),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE INDEX IF NOT EXISTS idx_documents_collection_created
        ON documents (collection, created_at, id)",
    "CREATE INDEX IF NOT EXISTS idx_documents_body
        ON documents USING GIN (body jsonb_path_ops)",
    "CREATE INDEX IF NOT EXISTS idx_documents_user_id
        ON documents (collection, (body ->> 'user_id'))",
    "CREATE INDEX IF NOT EXISTS idx_documents_session_id
        ON documents (collection, (body ->> 'session_id'))
        WHERE collection = 'chat_messages'",
];

/// Create the `documents` table and its indexes if they are missing.
pub async fn run(pool: &DbPool) -> anyhow::Result<()> {
    let client = pool.get().await?;

    client
        .batch_execute(&BOOTSTRAP_SQL.join(";\n"))
        .await
        .context("Failed to bootstrap documents schema")?;

    tracing::info!("Database schema is up to date");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_statement_is_idempotent() {
        for statement in BOOTSTRAP_SQL {
            assert!(
                statement.contains("IF NOT EXISTS"),
                "not idempotent: {statement}"
            );
        }
    }

    #[test]
    fn test_bootstrap_creates_documents_table_first() {
        assert!(BOOTSTRAP_SQL[0].starts_with("CREATE TABLE IF NOT EXISTS documents"));
    }
}
