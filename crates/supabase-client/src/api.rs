//! Single entry point for Supabase table access

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;

use apikit_common::{Envelope, Result};

use crate::backend::Backend;
use crate::client::SupabaseClient;
use crate::config::SupabaseConfig;
use crate::crud::{CrudService, QueryOptions};
use crate::query::Filters;
use crate::services::{ResourceService, UsersService};

/// Facade over one Supabase project
///
/// Per-table [`CrudService`]s are created on first use and cached for the
/// life of the facade. The cache is safe to share across tasks; two callers
/// racing on a new table may both build a service, and the first insert wins.
pub struct SupabaseApi {
    client: SupabaseClient,
    users: UsersService,
    tables: RwLock<HashMap<String, Arc<CrudService>>>,
}

impl SupabaseApi {
    pub fn new(config: SupabaseConfig) -> Result<Self> {
        Ok(Self::from_client(SupabaseClient::new(config)?))
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::from_client(SupabaseClient::from_env()?))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_client(SupabaseClient::from_file(path)?))
    }

    pub fn with_backend(config: SupabaseConfig, backend: Arc<dyn Backend>) -> Self {
        Self::from_client(SupabaseClient::with_backend(config, backend))
    }

    pub fn from_client(client: SupabaseClient) -> Self {
        tracing::info!(url = %client.config().url, "supabase api initialised");
        Self {
            users: UsersService::new(client.clone()),
            client,
            tables: RwLock::new(HashMap::new()),
        }
    }

    pub fn client(&self) -> &SupabaseClient {
        &self.client
    }

    pub fn users(&self) -> &UsersService {
        &self.users
    }

    /// CRUD service for `name`, cached by exact table name
    pub fn table(&self, name: &str) -> Arc<CrudService> {
        if let Some(service) = self.tables.read().get(name) {
            return Arc::clone(service);
        }

        let service = Arc::new(CrudService::new(self.client.clone(), name));
        let mut tables = self.tables.write();
        Arc::clone(tables.entry(name.to_string()).or_insert(service))
    }

    /// Build a resource service bound to `table`
    pub fn custom_service<S: ResourceService>(&self, table: &str) -> S {
        S::with_table(self.client.clone(), table)
    }

    pub async fn test_connection(&self) -> bool {
        self.client.test_connection().await
    }

    /// Select with optional filters; no filters means every row
    pub async fn quick_select(
        &self,
        table: &str,
        filters: Option<&Filters>,
        columns: &str,
        limit: Option<usize>,
    ) -> Envelope {
        let service = self.table(table);
        let mut options = QueryOptions::new().columns(columns);
        options.limit = limit;

        match filters.filter(|f| !f.is_empty()) {
            Some(filters) => service.find(filters, &options).await,
            None => service.get_all(&options).await,
        }
    }

    pub async fn quick_insert<T: Serialize + ?Sized>(&self, table: &str, record: &T) -> Envelope {
        self.table(table).create(record).await
    }

    pub async fn quick_update<T: Serialize + ?Sized>(
        &self,
        table: &str,
        id: impl Into<Value>,
        fields: &T,
        id_column: &str,
    ) -> Envelope {
        self.table(table).update(id, fields, id_column).await
    }

    pub async fn quick_delete(
        &self,
        table: &str,
        id: impl Into<Value>,
        id_column: &str,
    ) -> Envelope {
        self.table(table).delete(id, id_column).await
    }
}

impl std::fmt::Debug for SupabaseApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseApi")
            .field("client", &self.client)
            .field("cached_tables", &self.tables.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use crate::query::filters;
    use crate::services::StatusTrackedService;
    use serde_json::json;

    fn api() -> SupabaseApi {
        let backend = MemoryBackend::new().with_rows(
            "orders",
            vec![
                json!({"id": 1, "status": "open"}),
                json!({"id": 2, "status": "closed"}),
            ],
        );
        SupabaseApi::with_backend(
            SupabaseConfig::new("http://localhost", "test"),
            Arc::new(backend),
        )
    }

    #[test]
    fn test_table_services_are_memoised() {
        let api = api();
        let a = api.table("orders");
        let b = api.table("orders");
        let c = api.table("Orders");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(c.table_name(), "Orders");
    }

    #[tokio::test]
    async fn test_quick_select_with_and_without_filters() {
        let api = api();
        let all = api.quick_select("orders", None, "*", None).await;
        assert_eq!(all.data().as_array().unwrap().len(), 2);

        let empty = Filters::new();
        let all = api.quick_select("orders", Some(&empty), "id", Some(1)).await;
        assert_eq!(all.data(), &json!([{"id": 1}]));

        let open = filters([("status", "open")]);
        let some = api.quick_select("orders", Some(&open), "*", None).await;
        assert_eq!(some.data().as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_quick_mutations() {
        let api = api();
        let created = api.quick_insert("orders", &json!({"id": 3, "status": "open"})).await;
        assert!(created.is_success());

        let updated = api
            .quick_update("orders", 3, &json!({"status": "closed"}), "id")
            .await;
        assert_eq!(updated.data()[0]["status"], "closed");

        let deleted = api.quick_delete("orders", 3, "id").await;
        assert!(deleted.is_success());
        assert_eq!(api.table("orders").count(&Filters::new()).await.count(), Some(2));
    }

    #[tokio::test]
    async fn test_custom_service_binds_table() {
        let api = api();
        let svc: StatusTrackedService = api.custom_service("orders");
        assert_eq!(svc.crud().table_name(), "orders");
        assert!(api.test_connection().await);
    }
}
