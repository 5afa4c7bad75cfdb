//! `PostgreSQL` document store.
//!
//! All collections share one JSONB table:
//!
//! ```sql
//! documents(collection TEXT, id TEXT, data JSONB, created_at, updated_at)
//! ```
//!
//! Field paths are evaluated with `data #> '{a,b}'`. Range operators add a
//! `jsonb_typeof` check so they only match values of the same JSON type,
//! matching [`super::memory::InMemoryStore`].
//!
//! # Migrations
//!
//! Migrations live in `crates/core/migrations/` and run via:
//! ```bash
//! cargo run -p elegant-closet-cli -- migrate
//! ```

use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use super::index::IndexRegistry;
use super::query::{Constraint, Direction, Operator, Query};
use super::{DocumentStore, RawDocument, StoreError};

/// Document store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    indexes: std::sync::Arc<IndexRegistry>,
}

impl PgDocumentStore {
    #[must_use]
    pub fn new(pool: PgPool, indexes: IndexRegistry) -> Self {
        Self {
            pool,
            indexes: std::sync::Arc::new(indexes),
        }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    #[must_use]
    pub fn indexes(&self) -> &IndexRegistry {
        &self.indexes
    }
}

fn path(field: &str) -> Vec<String> {
    field.split('.').map(str::to_string).collect()
}

fn push_field(qb: &mut QueryBuilder<'_, Postgres>, field: &str) {
    qb.push("(data #> ");
    qb.push_bind(path(field));
    qb.push("::text[])");
}

fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: &Value) {
    qb.push_bind(Json(value.clone()));
    qb.push("::jsonb");
}

fn push_constraint(qb: &mut QueryBuilder<'_, Postgres>, c: &Constraint) {
    let comparison = match c.op {
        Operator::Eq => "=",
        Operator::NotEq => "<>",
        Operator::Lt => "<",
        Operator::Lte => "<=",
        Operator::Gt => ">",
        Operator::Gte => ">=",
        Operator::ArrayContains => {
            qb.push("jsonb_typeof(");
            push_field(qb, &c.field);
            qb.push(") = 'array' AND ");
            push_field(qb, &c.field);
            qb.push(" @> ");
            push_value(qb, &Value::Array(vec![c.value.clone()]));
            return;
        }
        Operator::In => {
            qb.push("jsonb_build_array(");
            push_field(qb, &c.field);
            qb.push(") <@ ");
            push_value(qb, &c.value);
            return;
        }
    };
    if !c.op.is_equality() && c.op != Operator::NotEq {
        qb.push("jsonb_typeof(");
        push_field(qb, &c.field);
        qb.push(") = jsonb_typeof(");
        push_value(qb, &c.value);
        qb.push(") AND ");
    }
    push_field(qb, &c.field);
    qb.push(format!(" {comparison} "));
    push_value(qb, &c.value);
}

fn build_select(query: &Query) -> Result<QueryBuilder<'static, Postgres>, StoreError> {
    let mut qb = QueryBuilder::new("SELECT id, data FROM documents WHERE collection = ");
    qb.push_bind(query.collection().to_string());

    for c in query.constraints() {
        qb.push(" AND ");
        push_constraint(&mut qb, c);
    }

    if let Some(key) = query.sort_key() {
        qb.push(" AND jsonb_typeof(");
        push_field(&mut qb, &key.field);
        qb.push(") <> 'null'");

        if let Some(cursor) = query.cursor() {
            let Some(sort_value) = &cursor.sort_value else {
                return Err(StoreError::InvalidCursor(
                    "ordered query needs a cursor with a sort value".to_string(),
                ));
            };
            let after = match key.direction {
                Direction::Asc => " > ",
                Direction::Desc => " < ",
            };
            qb.push(" AND (");
            push_field(&mut qb, &key.field);
            qb.push(after);
            push_value(&mut qb, sort_value);
            qb.push(" OR (");
            push_field(&mut qb, &key.field);
            qb.push(" = ");
            push_value(&mut qb, sort_value);
            qb.push(" AND id > ");
            qb.push_bind(cursor.id.clone());
            qb.push("))");
        }

        qb.push(" ORDER BY ");
        push_field(&mut qb, &key.field);
        qb.push(match key.direction {
            Direction::Asc => " ASC, id ASC",
            Direction::Desc => " DESC, id ASC",
        });
    } else {
        if let Some(cursor) = query.cursor() {
            qb.push(" AND id > ");
            qb.push_bind(cursor.id.clone());
        }
        qb.push(" ORDER BY id ASC");
    }

    if let Some(limit) = query.page_size() {
        qb.push(" LIMIT ");
        qb.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
    }
    Ok(qb)
}

impl DocumentStore for PgDocumentStore {
    #[instrument(skip(self), level = "debug")]
    async fn get(&self, collection: &str, id: &str) -> Result<Option<RawDocument>, StoreError> {
        let row: Option<(Json<Value>,)> = sqlx::query_as(
            r"
            SELECT data FROM documents
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(Json(data),)| RawDocument::new(id, data)))
    }

    #[instrument(skip(self), fields(query = %query), level = "debug")]
    async fn query(&self, query: &Query) -> Result<Vec<RawDocument>, StoreError> {
        self.indexes.check(query)?;

        let mut qb = build_select(query)?;
        let rows: Vec<(String, Json<Value>)> = qb.build_query_as().fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|(id, Json(data))| RawDocument::new(id, data))
            .collect())
    }

    #[instrument(skip(self, data), level = "debug")]
    async fn put(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO UPDATE SET data = $3, updated_at = NOW()
            ",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(data))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r"
            DELETE FROM documents
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), level = "debug")]
    async fn increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        by: i64,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r"
            UPDATE documents
            SET data = jsonb_set(
                    data,
                    $3::text[],
                    to_jsonb(COALESCE((data #>> $3::text[])::bigint, 0) + $4),
                    true
                ),
                updated_at = NOW()
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection)
        .bind(id)
        .bind(path(field))
        .bind(by)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::query::{Cursor, SortKey};

    #[test]
    fn test_select_sql_for_ordered_page() {
        let query = Query::new("products")
            .where_eq("status", "published")
            .order_by(SortKey::desc("createdAt"))
            .limit(12)
            .start_after(Cursor {
                id: "p1".to_string(),
                sort_value: Some(Value::from("2026-01-01T00:00:00Z")),
            });
        let qb = build_select(&query).unwrap_or_else(|e| panic!("{e}"));
        let sql = qb.sql();
        assert!(sql.starts_with("SELECT id, data FROM documents WHERE collection = $1"));
        assert!(sql.contains("(data #> $2::text[]) = $3::jsonb"));
        assert!(sql.contains(" < "));
        assert!(sql.contains("DESC, id ASC"));
        assert!(sql.ends_with("LIMIT $11"));
    }

    #[test]
    fn test_select_sql_unordered_uses_id_cursor() {
        let query = Query::new("faqs").start_after(Cursor {
            id: "f3".to_string(),
            sort_value: None,
        });
        let qb = build_select(&query).unwrap_or_else(|e| panic!("{e}"));
        assert!(qb.sql().contains("AND id > $2 ORDER BY id ASC"));
    }

    #[test]
    fn test_range_constraint_checks_json_type() {
        let query =
            Query::new("products").filter(Constraint::new("price", Operator::Gte, 1000));
        let qb = build_select(&query).unwrap_or_else(|e| panic!("{e}"));
        assert!(qb.sql().contains("jsonb_typeof((data #> $2::text[])) = jsonb_typeof($3::jsonb)"));
    }
}
