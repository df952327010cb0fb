use crate::pool::DbPool;
use async_trait::async_trait;
use serde_json::{Map, Value};
use services::repository::{
    Comparison, DocumentStore, Filter, FindOptions, Predicate, SortDirection, StoredDocument,
};
use services::DocumentId;
use tokio_postgres::Row;

const DOCUMENT_COLUMNS: &str = "id, body, created_at, updated_at";

/// Document store over the shared `documents` table, one row per document keyed by
/// `(collection, id)` with the entity fields in a `jsonb` body.
pub struct PostgresDocumentStore {
    pool: DbPool,
}

impl PostgresDocumentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Helper to build dynamic WHERE clauses and collect parameterized values.
struct QueryBuilder {
    conditions: Vec<String>,
    params: Vec<Box<dyn tokio_postgres::types::ToSql + Sync + Send>>,
}

impl QueryBuilder {
    fn new() -> Self {
        Self {
            conditions: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Current 1-based parameter index for the next parameter.
    fn next_param_idx(&self) -> u32 {
        self.params.len() as u32 + 1
    }

    /// Bind a value and return its placeholder index.
    fn bind<T: tokio_postgres::types::ToSql + Sync + Send + 'static>(&mut self, value: T) -> u32 {
        let idx = self.next_param_idx();
        self.params.push(Box::new(value));
        idx
    }

    /// Push a condition on a top-level body field.
    fn push_predicate(&mut self, predicate: &Predicate) {
        let key = self.bind(predicate.field.clone());
        let value = self.bind(predicate.value.clone());
        let field = format!("body -> ${key}::text");

        let condition = match predicate.op {
            Comparison::Eq => format!("{field} = ${value}::jsonb"),
            Comparison::Ne => format!("{field} IS DISTINCT FROM ${value}::jsonb"),
            range => {
                let op = match range {
                    Comparison::Gt => ">",
                    Comparison::Gte => ">=",
                    Comparison::Lt => "<",
                    _ => "<=",
                };
                // jsonb orders across types; only compare numbers with numbers and strings with strings
                format!(
                    "jsonb_typeof(${value}::jsonb) IN ('number', 'string') \
                     AND jsonb_typeof({field}) = jsonb_typeof(${value}::jsonb) \
                     AND {field} {op} ${value}::jsonb"
                )
            }
        };
        self.conditions.push(condition);
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    fn param_refs(&self) -> Vec<&(dyn tokio_postgres::types::ToSql + Sync)> {
        self.params.iter().map(|p| p.as_ref() as _).collect()
    }
}

/// Saturate pagination values that do not fit Postgres' bigint.
fn to_bigint(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Build the SELECT for a filtered, ordered, paginated query.
fn build_query(collection: &str, filter: &Filter, options: &FindOptions) -> (String, QueryBuilder) {
    let mut qb = QueryBuilder::new();

    let collection_idx = qb.bind(collection.to_string());
    qb.conditions.push(format!("collection = ${collection_idx}"));
    for predicate in filter.predicates() {
        qb.push_predicate(predicate);
    }

    let where_clause = qb.where_clause();

    let order_by = match &options.sort {
        Some(sort) => {
            let key = qb.bind(sort.field.clone());
            let direction = match sort.direction {
                SortDirection::Asc => "ASC",
                SortDirection::Desc => "DESC",
            };
            format!("ORDER BY body -> ${key}::text {direction}, created_at, id")
        }
        None => "ORDER BY created_at, id".to_string(),
    };

    let mut sql = format!("SELECT {DOCUMENT_COLUMNS} FROM documents {where_clause} {order_by}");
    if let Some(limit) = options.limit {
        let limit_idx = qb.bind(to_bigint(limit));
        sql.push_str(&format!(" LIMIT ${limit_idx}"));
    }
    let offset_idx = qb.bind(to_bigint(options.skip));
    sql.push_str(&format!(" OFFSET ${offset_idx}"));

    (sql, qb)
}

fn row_to_document(row: &Row) -> StoredDocument {
    StoredDocument {
        id: row.get("id"),
        body: row.get("body"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn insert(&self, collection: &str, body: Value) -> anyhow::Result<StoredDocument> {
        if !body.is_object() {
            anyhow::bail!("Document body for '{}' must be a JSON object", collection);
        }

        tracing::debug!("Repository: Inserting document into collection={}", collection);

        let client = self.pool.get().await?;
        let id = DocumentId::new();

        let row = client
            .query_one(
                &format!(
                    "INSERT INTO documents (id, collection, body)
                     VALUES ($1, $2, $3)
                     RETURNING {DOCUMENT_COLUMNS}"
                ),
                &[&id, &collection, &body],
            )
            .await?;

        Ok(row_to_document(&row))
    }

    async fn get(
        &self,
        collection: &str,
        id: DocumentId,
    ) -> anyhow::Result<Option<StoredDocument>> {
        let client = self.pool.get().await?;

        let row = client
            .query_opt(
                &format!(
                    "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE collection = $1 AND id = $2"
                ),
                &[&collection, &id],
            )
            .await?;

        Ok(row.as_ref().map(row_to_document))
    }

    async fn query(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> anyhow::Result<Vec<StoredDocument>> {
        let client = self.pool.get().await?;

        let (sql, qb) = build_query(collection, filter, options);
        tracing::trace!("Repository: Querying documents: {}", sql);

        let rows = client.query(&sql, &qb.param_refs()).await?;
        Ok(rows.iter().map(row_to_document).collect())
    }

    async fn merge(
        &self,
        collection: &str,
        id: DocumentId,
        patch: Map<String, Value>,
    ) -> anyhow::Result<Option<StoredDocument>> {
        let client = self.pool.get().await?;
        let patch = Value::Object(patch);

        // `||` replaces top-level keys in a single statement
        let row = client
            .query_opt(
                &format!(
                    "UPDATE documents
                     SET body = body || $3, updated_at = NOW()
                     WHERE collection = $1 AND id = $2
                     RETURNING {DOCUMENT_COLUMNS}"
                ),
                &[&collection, &id, &patch],
            )
            .await?;

        Ok(row.as_ref().map(row_to_document))
    }

    async fn remove(&self, collection: &str, id: DocumentId) -> anyhow::Result<bool> {
        let client = self.pool.get().await?;

        let removed = client
            .execute(
                "DELETE FROM documents WHERE collection = $1 AND id = $2",
                &[&collection, &id],
            )
            .await?;

        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(sql: &str) -> String {
        sql.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_unfiltered_query_scopes_to_collection() {
        let (sql, qb) = build_query("addresses", &Filter::new(), &FindOptions::new());

        assert_eq!(
            normalize(&sql),
            "SELECT id, body, created_at, updated_at FROM documents \
             WHERE collection = $1 ORDER BY created_at, id OFFSET $2"
        );
        assert_eq!(qb.params.len(), 2);
    }

    #[test]
    fn test_equality_and_range_predicates() {
        let filter = Filter::new().eq("user_id", "u-1").gte("price", 100);
        let (sql, qb) = build_query("plans", &filter, &FindOptions::new());
        let sql = normalize(&sql);

        assert!(sql.contains("body -> $2::text = $3::jsonb"));
        assert!(sql.contains("jsonb_typeof(body -> $4::text) = jsonb_typeof($5::jsonb)"));
        assert!(sql.contains("body -> $4::text >= $5::jsonb"));
        assert!(sql.ends_with("OFFSET $6"));
        assert_eq!(qb.params.len(), 6);
    }

    #[test]
    fn test_not_equal_matches_missing_fields() {
        let filter = Filter::new().ne("status", "failed");
        let (sql, _) = build_query("payment_orders", &filter, &FindOptions::new());

        assert!(normalize(&sql).contains("body -> $2::text IS DISTINCT FROM $3::jsonb"));
    }

    #[test]
    fn test_sort_and_pagination() {
        let options = FindOptions::new()
            .sort_by("sent_at", SortDirection::Desc)
            .skip(20)
            .limit(10);
        let (sql, qb) = build_query("chat_messages", &Filter::new(), &options);

        assert!(normalize(&sql).ends_with(
            "ORDER BY body -> $2::text DESC, created_at, id LIMIT $3 OFFSET $4"
        ));
        assert_eq!(qb.param_refs().len(), 4);
    }

    #[test]
    fn test_pagination_saturates_at_bigint() {
        assert_eq!(to_bigint(u64::MAX), i64::MAX);
        assert_eq!(to_bigint(25), 25);
    }
}
