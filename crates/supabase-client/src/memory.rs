//! In-memory backend
//!
//! Evaluates [`QueryRequest`]s against tables held in process memory, with
//! the same clause semantics as PostgREST. Used for development and tests.

use std::collections::HashMap;

use serde_json::Value;

use apikit_common::{Error, Result};

use crate::backend::{Backend, BackendResponse};
use crate::query::{compare_values, Filter, Operation, OrderClause, QueryRequest};

/// In-memory table store
pub struct MemoryBackend {
    tables: parking_lot::RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            tables: parking_lot::RwLock::new(HashMap::new()),
        }
    }

    /// Seed a table with rows
    pub fn with_rows(self, table: &str, rows: Vec<Value>) -> Self {
        self.tables
            .write()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
        self
    }

    /// Snapshot of a table's current rows
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables.read().get(table).cloned().unwrap_or_default()
    }

    fn select(&self, request: &QueryRequest) -> BackendResponse {
        let tables = self.tables.read();
        let mut rows: Vec<Value> = tables
            .get(&request.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches_all(&request.filters, row))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        drop(tables);

        sort_rows(&mut rows, &request.order);
        let total = rows.len() as u64;

        let page: Vec<Value> = rows
            .into_iter()
            .skip(request.offset.unwrap_or(0))
            .take(request.limit.unwrap_or(usize::MAX))
            .map(|row| project(row, &request.columns))
            .collect();

        BackendResponse {
            data: (!request.head).then(|| Value::Array(page)),
            count: request.count.map(|_| total),
            status: 200,
        }
    }

    fn insert(&self, table: &str, rows: &[Value]) -> Result<BackendResponse> {
        let mut prepared = Vec::with_capacity(rows.len());
        for row in rows {
            let mut record = row
                .as_object()
                .cloned()
                .ok_or_else(|| Error::InvalidRequest("records must be JSON objects".to_string()))?;
            record
                .entry("id")
                .or_insert_with(|| Value::String(uuid::Uuid::new_v4().to_string()));
            record
                .entry("created_at")
                .or_insert_with(|| Value::String(chrono::Utc::now().to_rfc3339()));
            prepared.push(Value::Object(record));
        }

        self.tables
            .write()
            .entry(table.to_string())
            .or_default()
            .extend(prepared.iter().cloned());

        Ok(BackendResponse {
            data: Some(Value::Array(prepared)),
            count: None,
            status: 201,
        })
    }

    fn update(&self, request: &QueryRequest, fields: &Value) -> Result<BackendResponse> {
        let fields = fields.as_object().ok_or_else(|| {
            Error::InvalidRequest("update payload must be a JSON object".to_string())
        })?;

        let mut tables = self.tables.write();
        let mut updated = Vec::new();
        if let Some(rows) = tables.get_mut(&request.table) {
            for row in rows.iter_mut().filter(|row| matches_all(&request.filters, row)) {
                if let Some(record) = row.as_object_mut() {
                    for (column, value) in fields {
                        record.insert(column.clone(), value.clone());
                    }
                }
                updated.push(row.clone());
            }
        }

        Ok(BackendResponse {
            data: Some(Value::Array(updated)),
            count: None,
            status: 200,
        })
    }

    fn delete(&self, request: &QueryRequest) -> BackendResponse {
        let mut tables = self.tables.write();
        let mut removed = Vec::new();
        if let Some(rows) = tables.get_mut(&request.table) {
            let (gone, kept): (Vec<Value>, Vec<Value>) = rows
                .drain(..)
                .partition(|row| matches_all(&request.filters, row));
            *rows = kept;
            removed = gone;
        }

        BackendResponse {
            data: Some(Value::Array(removed)),
            count: None,
            status: 200,
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Backend for MemoryBackend {
    async fn execute(&self, request: &QueryRequest) -> Result<BackendResponse> {
        match &request.operation {
            Operation::Select => Ok(self.select(request)),
            Operation::Insert(rows) => self.insert(&request.table, rows),
            Operation::Update(fields) => self.update(request, fields),
            Operation::Delete => Ok(self.delete(request)),
        }
    }
}

fn matches_all(filters: &[Filter], row: &Value) -> bool {
    filters.iter().all(|f| f.matches(row))
}

fn sort_rows(rows: &mut [Value], order: &[OrderClause]) {
    if order.is_empty() {
        return;
    }
    rows.sort_by(|a, b| {
        for clause in order {
            let (x, y) = (
                a.get(&clause.column).unwrap_or(&Value::Null),
                b.get(&clause.column).unwrap_or(&Value::Null),
            );
            let ord = compare_values(x, y);
            let ord = if clause.ascending { ord } else { ord.reverse() };
            if ord.is_ne() {
                return ord;
            }
        }
        std::cmp::Ordering::Equal
    });
}

/// Keep only the listed columns; `*` keeps everything
fn project(row: Value, columns: &str) -> Value {
    let columns = columns.trim();
    if columns.is_empty() || columns == "*" {
        return row;
    }
    let Value::Object(record) = row else {
        return row;
    };
    let wanted: Vec<&str> = columns.split(',').map(str::trim).collect();
    Value::Object(
        record
            .into_iter()
            .filter(|(k, _)| wanted.contains(&k.as_str()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{CountMode, TableQuery};
    use serde_json::json;
    use std::sync::Arc;

    fn seeded() -> Arc<MemoryBackend> {
        Arc::new(MemoryBackend::new().with_rows(
            "users",
            vec![
                json!({"id": 1, "email": "alice@example.com", "role": "admin", "age": 31}),
                json!({"id": 2, "email": "bob@example.com", "role": "user", "age": 25}),
                json!({"id": 3, "email": "carol@example.com", "role": "user", "age": 40}),
            ],
        ))
    }

    #[tokio::test]
    async fn test_select_filters_orders_and_pages() {
        let backend = seeded();
        let response = TableQuery::new(backend, "users")
            .select("id,email")
            .eq("role", "user")
            .order("age", false)
            .limit(1)
            .count(CountMode::Exact)
            .execute()
            .await
            .unwrap();

        assert_eq!(response.count, Some(2));
        assert_eq!(
            response.data,
            Some(json!([{"id": 3, "email": "carol@example.com"}]))
        );
    }

    #[tokio::test]
    async fn test_head_returns_no_rows() {
        let response = TableQuery::new(seeded(), "users")
            .select("*")
            .count(CountMode::Exact)
            .head()
            .execute()
            .await
            .unwrap();

        assert_eq!(response.count, Some(3));
        assert_eq!(response.data, None);
    }

    #[tokio::test]
    async fn test_missing_table_is_empty() {
        let response = TableQuery::new(seeded(), "nowhere")
            .select("*")
            .execute()
            .await
            .unwrap();
        assert_eq!(response.data, Some(json!([])));
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamp() {
        let backend = Arc::new(MemoryBackend::new());
        let response = TableQuery::new(backend.clone(), "posts")
            .insert(json!({"title": "Hello"}))
            .execute()
            .await
            .unwrap();

        assert_eq!(response.status, 201);
        let row = &response.data.unwrap()[0];
        assert!(row["id"].is_string());
        assert!(row["created_at"].is_string());
        assert_eq!(backend.rows("posts").len(), 1);
    }

    #[tokio::test]
    async fn test_insert_rejects_non_objects() {
        let err = TableQuery::new(Arc::new(MemoryBackend::new()), "posts")
            .insert(json!([1, 2]))
            .execute()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_update_and_delete_touch_matching_rows_only() {
        let backend = seeded();

        let updated = TableQuery::new(backend.clone(), "users")
            .update(json!({"role": "member"}))
            .eq("role", "user")
            .execute()
            .await
            .unwrap();
        assert_eq!(updated.data.unwrap().as_array().unwrap().len(), 2);

        let removed = TableQuery::new(backend.clone(), "users")
            .delete()
            .eq("id", 1)
            .execute()
            .await
            .unwrap();
        assert_eq!(removed.data.unwrap()[0]["email"], "alice@example.com");

        let remaining = backend.rows("users");
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|r| r["role"] == "member"));
    }
}
