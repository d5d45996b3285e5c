//! Generic CRUD service over one table
//!
//! Every operation returns an [`Envelope`]. Backend and transport failures
//! are folded into failure envelopes; nothing here returns `Err` or panics.
//! Zero matching rows is a success with empty (or `null`) data.

use serde::Serialize;
use serde_json::Value;

use apikit_common::records::{handle_pagination, DEFAULT_MAX_PAGE_SIZE};
use apikit_common::{Envelope, Error, Payload, Result};

use crate::client::SupabaseClient;
use crate::query::{CountMode, Filters, TableQuery};

/// Column selection, paging and ordering for reads
///
/// A limit or offset of zero is treated as unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub columns: String,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub order_by: Option<String>,
    pub ascending: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            columns: "*".to_string(),
            limit: None,
            offset: None,
            order_by: None,
            ascending: true,
        }
    }
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order_by = Some(column.into());
        self.ascending = ascending;
        self
    }

    /// Apply order, then limit, then offset
    fn apply(&self, mut query: TableQuery) -> TableQuery {
        if let Some(column) = self.order_by.as_deref().filter(|c| !c.is_empty()) {
            query = query.order(column, self.ascending);
        }
        if let Some(limit) = self.limit.filter(|&l| l > 0) {
            query = query.limit(limit);
        }
        if let Some(offset) = self.offset.filter(|&o| o > 0) {
            query = query.offset(offset);
        }
        query
    }
}

/// CRUD operations for a single table
#[derive(Debug, Clone)]
pub struct CrudService {
    client: SupabaseClient,
    table: String,
}

impl CrudService {
    pub fn new(client: SupabaseClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn client(&self) -> &SupabaseClient {
        &self.client
    }

    /// Fresh query builder on this table, for anything the helpers don't cover
    pub fn query(&self) -> TableQuery {
        self.client.table(&self.table)
    }

    /// Insert one record
    pub async fn create<T: Serialize + ?Sized>(&self, record: &T) -> Envelope {
        Envelope::from_result(self.try_insert(record).await)
    }

    /// Insert several records in one request
    pub async fn create_many<T: Serialize>(&self, records: &[T]) -> Envelope {
        Envelope::from_result(self.try_insert(records).await)
    }

    /// Every row, subject to `options`
    pub async fn get_all(&self, options: &QueryOptions) -> Envelope {
        let query = options.apply(self.query().select(&options.columns));
        Envelope::from_result(fetch(query).await)
    }

    /// Rows whose `id_column` equals `id`
    pub async fn get_by_id(
        &self,
        id: impl Into<Value>,
        id_column: &str,
        columns: &str,
    ) -> Envelope {
        let query = self.query().select(columns).eq(id_column, id);
        Envelope::from_result(fetch(query).await)
    }

    /// Rows matching every filter
    pub async fn find(&self, filters: &Filters, options: &QueryOptions) -> Envelope {
        let query = self.query().select(&options.columns).match_all(filters);
        Envelope::from_result(fetch(options.apply(query)).await)
    }

    /// First row matching every filter, or `null` when nothing matches
    pub async fn find_one(&self, filters: &Filters, columns: &str) -> Envelope {
        let options = QueryOptions::new().columns(columns).limit(1);
        self.find(filters, &options).await.map_data(first_row)
    }

    /// Case-insensitive substring match on one column
    pub async fn search(&self, column: &str, term: &str, options: &QueryOptions) -> Envelope {
        let query = self
            .query()
            .select(&options.columns)
            .ilike(column, &format!("%{term}%"));
        Envelope::from_result(fetch(options.apply(query)).await)
    }

    /// Patch the row whose `id_column` equals `id`
    pub async fn update<T: Serialize + ?Sized>(
        &self,
        id: impl Into<Value>,
        fields: &T,
        id_column: &str,
    ) -> Envelope {
        let id = id.into();
        let result = async {
            let fields = to_json(fields)?;
            fetch(self.query().update(fields).eq(id_column, id)).await
        };
        Envelope::from_result(result.await)
    }

    /// Patch every row matching `filters`; an empty filter map is refused
    pub async fn update_many<T: Serialize + ?Sized>(
        &self,
        filters: &Filters,
        fields: &T,
    ) -> Envelope {
        let result = async {
            require_filters(filters, "update_many")?;
            let fields = to_json(fields)?;
            fetch(self.query().update(fields).match_all(filters)).await
        };
        Envelope::from_result(result.await)
    }

    /// Delete the row whose `id_column` equals `id`
    pub async fn delete(&self, id: impl Into<Value>, id_column: &str) -> Envelope {
        let query = self.query().delete().eq(id_column, id);
        Envelope::from_result(fetch(query).await)
    }

    /// Delete every row matching `filters`; an empty filter map is refused
    pub async fn delete_many(&self, filters: &Filters) -> Envelope {
        let result = async {
            require_filters(filters, "delete_many")?;
            fetch(self.query().delete().match_all(filters)).await
        };
        Envelope::from_result(result.await)
    }

    /// Number of rows matching `filters` (all rows when empty)
    pub async fn count(&self, filters: &Filters) -> Envelope {
        let query = self.counting().match_all(filters);
        let result = read_count(query)
            .await
            .map(|count| Payload::default().with_count(count));
        Envelope::from_result(result)
    }

    /// Whether any row matches `filters`
    pub async fn exists(&self, filters: &Filters) -> Envelope {
        let query = self.counting().match_all(filters).limit(1);
        let result = read_count(query)
            .await
            .map(|count| Payload::default().with_exists(count > 0));
        Envelope::from_result(result)
    }

    /// One page of rows; `page` is 1-indexed and `page_size` is capped at 100
    pub async fn paginate(
        &self,
        page: usize,
        page_size: usize,
        options: &QueryOptions,
    ) -> Envelope {
        let window = handle_pagination(page, page_size, DEFAULT_MAX_PAGE_SIZE);
        let options = QueryOptions {
            limit: Some(window.limit),
            offset: Some(window.offset),
            ..options.clone()
        };
        self.get_all(&options).await
    }

    fn counting(&self) -> TableQuery {
        self.query().select("*").count(CountMode::Exact).head()
    }

    async fn try_insert<T: Serialize + ?Sized>(&self, records: &T) -> Result<Payload> {
        let rows = to_json(records)?;
        fetch(self.query().insert(rows)).await
    }
}

async fn fetch(query: TableQuery) -> Result<Payload> {
    let response = query.execute().await?;
    Ok(Payload::from_response(response.data, response.count))
}

async fn read_count(query: TableQuery) -> Result<u64> {
    query
        .execute()
        .await?
        .count
        .ok_or_else(|| Error::Decode("backend did not report a row count".to_string()))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| Error::InvalidRequest(e.to_string()))
}

fn require_filters(filters: &Filters, operation: &str) -> Result<()> {
    if filters.is_empty() {
        return Err(Error::InvalidRequest(format!(
            "{operation} requires at least one filter"
        )));
    }
    Ok(())
}

fn first_row(data: Value) -> Value {
    match data {
        Value::Array(rows) => rows.into_iter().next().unwrap_or(Value::Null),
        other => other,
    }
}
