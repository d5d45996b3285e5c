//! PostgREST query builder
//!
//! A [`TableQuery`] collects declarative clauses into a [`QueryRequest`] and
//! hands it to a [`Backend`] for execution. Clauses render to PostgREST query
//! parameters in a fixed order: select, filters, order, limit, offset.
//! Filters are conjunctive; each one becomes its own `column=op.value` pair.

use std::cmp::Ordering;
use std::sync::Arc;

use serde_json::Value;

use apikit_common::{Record, Result};

use crate::backend::{Backend, BackendResponse};

/// Column/value equality constraints, applied conjunctively
pub type Filters = Record;

/// Build a [`Filters`] map from pairs
pub fn filters<I, K, V>(pairs: I) -> Filters
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Filter operators matching PostgREST
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,    // equals
    Neq,   // not equals
    Gt,    // greater than
    Gte,   // greater than or equal
    Lt,    // less than
    Lte,   // less than or equal
    Like,  // LIKE
    Ilike, // ILIKE (case-insensitive)
    In,    // IN
    Is,    // IS (for NULL, TRUE, FALSE)
}

impl FilterOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Like => "like",
            Self::Ilike => "ilike",
            Self::In => "in",
            Self::Is => "is",
        }
    }
}

/// Filter value
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Single(Value),
    List(Vec<Value>),
    Null,
}

/// Filter condition
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl Filter {
    pub fn new(column: impl Into<String>, operator: FilterOperator, value: Value) -> Self {
        Self {
            column: column.into(),
            operator,
            value: FilterValue::Single(value),
        }
    }

    /// Equality; a JSON `null` becomes `is.null`
    pub fn eq(column: impl Into<String>, value: Value) -> Self {
        if value.is_null() {
            return Self::is_null(column);
        }
        Self::new(column, FilterOperator::Eq, value)
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            operator: FilterOperator::Is,
            value: FilterValue::Null,
        }
    }

    pub fn in_list(column: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            column: column.into(),
            operator: FilterOperator::In,
            value: FilterValue::List(values),
        }
    }

    /// Render as a PostgREST `(column, "op.value")` query pair
    pub fn to_param(&self) -> (String, String) {
        let value = match &self.value {
            FilterValue::Single(v) => render_value(v),
            FilterValue::List(values) => {
                let items: Vec<String> = values
                    .iter()
                    .map(|v| quote_list_item(&render_value(v)))
                    .collect();
                format!("({})", items.join(","))
            }
            FilterValue::Null => "null".to_string(),
        };
        (self.column.clone(), format!("{}.{}", self.operator.as_str(), value))
    }

    /// Evaluate against a record, following PostgREST's text comparison rules
    pub fn matches(&self, row: &Value) -> bool {
        let cell = row.get(&self.column).unwrap_or(&Value::Null);

        match (&self.operator, &self.value) {
            (FilterOperator::Is, FilterValue::Null) => cell.is_null(),
            (_, FilterValue::Null) => false,
            (FilterOperator::In, FilterValue::List(values)) => {
                !cell.is_null() && values.iter().any(|v| render_value(v) == render_value(cell))
            }
            (_, FilterValue::List(_)) => false,
            (op, FilterValue::Single(expected)) => {
                if cell.is_null() {
                    return false;
                }
                match op {
                    FilterOperator::Eq => render_value(cell) == render_value(expected),
                    FilterOperator::Neq => render_value(cell) != render_value(expected),
                    FilterOperator::Gt => compare_values(cell, expected) == Ordering::Greater,
                    FilterOperator::Gte => compare_values(cell, expected) != Ordering::Less,
                    FilterOperator::Lt => compare_values(cell, expected) == Ordering::Less,
                    FilterOperator::Lte => compare_values(cell, expected) != Ordering::Greater,
                    FilterOperator::Like => {
                        like_match(&render_value(cell), &render_value(expected), false)
                    }
                    FilterOperator::Ilike => {
                        like_match(&render_value(cell), &render_value(expected), true)
                    }
                    FilterOperator::In | FilterOperator::Is => false,
                }
            }
        }
    }
}

/// Order clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderClause {
    pub column: String,
    pub ascending: bool,
}

impl OrderClause {
    pub fn to_param(&self) -> String {
        let direction = if self.ascending { "asc" } else { "desc" };
        format!("{}.{}", self.column, direction)
    }
}

/// Count type requested through the `Prefer` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountMode {
    Exact,
    Planned,
    Estimated,
}

impl CountMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Planned => "planned",
            Self::Estimated => "estimated",
        }
    }
}

/// Query operation type
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Select,
    Insert(Vec<Value>),
    Update(Value),
    Delete,
}

/// Fully described request against one table
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub table: String,
    pub operation: Operation,
    pub columns: String,
    pub filters: Vec<Filter>,
    pub order: Vec<OrderClause>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub count: Option<CountMode>,
    /// Count only; no rows are transferred
    pub head: bool,
}

impl QueryRequest {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            operation: Operation::Select,
            columns: "*".to_string(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
            count: None,
            head: false,
        }
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(self.operation, Operation::Select)
    }

    /// Query string pairs in PostgREST syntax
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 4);

        if !self.is_mutation() || self.columns != "*" {
            pairs.push(("select".to_string(), self.columns.clone()));
        }

        pairs.extend(self.filters.iter().map(Filter::to_param));

        if !self.order.is_empty() {
            let order: Vec<String> = self.order.iter().map(OrderClause::to_param).collect();
            pairs.push(("order".to_string(), order.join(",")));
        }

        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }

        if let Some(offset) = self.offset {
            pairs.push(("offset".to_string(), offset.to_string()));
        }

        pairs
    }

    /// Value for the `Prefer` header, if any
    pub fn prefer_header(&self) -> Option<String> {
        let mut parts = Vec::new();
        if self.is_mutation() {
            parts.push("return=representation".to_string());
        }
        if let Some(mode) = self.count {
            parts.push(format!("count={}", mode.as_str()));
        }
        (!parts.is_empty()).then(|| parts.join(","))
    }
}

/// Resource-scoped query builder
pub struct TableQuery {
    backend: Arc<dyn Backend>,
    request: QueryRequest,
}

impl TableQuery {
    pub(crate) fn new(backend: Arc<dyn Backend>, table: &str) -> Self {
        Self {
            backend,
            request: QueryRequest::new(table),
        }
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.request.operation = Operation::Select;
        self.request.columns = columns.to_string();
        self
    }

    /// Ask the backend for a row count alongside the result
    pub fn count(mut self, mode: CountMode) -> Self {
        self.request.count = Some(mode);
        self
    }

    /// Count without transferring rows
    pub fn head(mut self) -> Self {
        self.request.head = true;
        self
    }

    /// Insert one record (a JSON object) or many (a JSON array)
    pub fn insert(mut self, rows: Value) -> Self {
        let rows = match rows {
            Value::Array(rows) => rows,
            row => vec![row],
        };
        self.request.operation = Operation::Insert(rows);
        self
    }

    pub fn update(mut self, fields: Value) -> Self {
        self.request.operation = Operation::Update(fields);
        self
    }

    pub fn delete(mut self) -> Self {
        self.request.operation = Operation::Delete;
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.request.filters.push(filter);
        self
    }

    pub fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::eq(column, value.into()))
    }

    pub fn neq(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::new(column, FilterOperator::Neq, value.into()))
    }

    pub fn gt(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::new(column, FilterOperator::Gt, value.into()))
    }

    pub fn gte(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::new(column, FilterOperator::Gte, value.into()))
    }

    pub fn lt(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::new(column, FilterOperator::Lt, value.into()))
    }

    pub fn lte(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::new(column, FilterOperator::Lte, value.into()))
    }

    pub fn like(self, column: &str, pattern: &str) -> Self {
        self.filter(Filter::new(column, FilterOperator::Like, Value::from(pattern)))
    }

    pub fn ilike(self, column: &str, pattern: &str) -> Self {
        self.filter(Filter::new(column, FilterOperator::Ilike, Value::from(pattern)))
    }

    pub fn in_(self, column: &str, values: Vec<Value>) -> Self {
        self.filter(Filter::in_list(column, values))
    }

    pub fn is_null(self, column: &str) -> Self {
        self.filter(Filter::is_null(column))
    }

    /// One equality clause per entry
    pub fn match_all(self, filters: &Filters) -> Self {
        filters
            .iter()
            .fold(self, |query, (column, value)| query.eq(column, value.clone()))
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.request.order.push(OrderClause {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.request.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.request.offset = Some(offset);
        self
    }

    pub fn request(&self) -> &QueryRequest {
        &self.request
    }

    pub async fn execute(self) -> Result<BackendResponse> {
        tracing::debug!(
            table = %self.request.table,
            operation = operation_name(&self.request.operation),
            clauses = self.request.filters.len(),
            "executing table query"
        );
        self.backend.execute(&self.request).await
    }
}

fn operation_name(operation: &Operation) -> &'static str {
    match operation {
        Operation::Select => "select",
        Operation::Insert(_) => "insert",
        Operation::Update(_) => "update",
        Operation::Delete => "delete",
    }
}

/// Text form of a JSON value as PostgREST sees it
pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Quote an `in.(...)` item when it contains reserved characters
fn quote_list_item(item: &str) -> String {
    if item.contains([',', '(', ')', '"', ' ']) {
        format!("\"{}\"", item.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        item.to_string()
    }
}

/// Order two cells: numbers numerically, everything else as text, nulls last
pub(crate) fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        _ => {
            let (ra, rb) = (render_value(a), render_value(b));
            match (ra.parse::<f64>(), rb.parse::<f64>()) {
                (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => ra.cmp(&rb),
            }
        }
    }
}

/// SQL `LIKE` matching; `%` and `*` match any run, `_` one character
fn like_match(text: &str, pattern: &str, case_insensitive: bool) -> bool {
    let mut source = String::with_capacity(pattern.len() + 8);
    if case_insensitive {
        source.push_str("(?is)");
    } else {
        source.push_str("(?s)");
    }
    source.push('^');
    for ch in pattern.chars() {
        match ch {
            '%' | '*' => source.push_str(".*"),
            '_' => source.push('.'),
            other => source.push_str(&regex::escape(&other.to_string())),
        }
    }
    source.push('$');

    regex::Regex::new(&source).is_ok_and(|re| re.is_match(text))
}
