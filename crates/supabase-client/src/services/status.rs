//! Service for tables carrying a `status` column

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use apikit_common::{Envelope, Payload};

use crate::crud::{CrudService, QueryOptions};
use crate::query::{filters, Filters};
use crate::services::ResourceService;

const ACTIVE: &str = "active";

/// Row counts reported by [`StatusTrackedService::get_statistics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusStatistics {
    pub total: u64,
    pub active: u64,
}

/// Template service for any table with a `status` column
///
/// Bind it to a table with [`ResourceService::with_table`].
#[derive(Debug, Clone)]
pub struct StatusTrackedService {
    crud: CrudService,
}

impl ResourceService for StatusTrackedService {
    const DEFAULT_TABLE: &'static str = "records";

    fn from_crud(crud: CrudService) -> Self {
        Self { crud }
    }

    fn crud(&self) -> &CrudService {
        &self.crud
    }
}

impl StatusTrackedService {
    pub async fn get_active_records(&self, limit: Option<usize>) -> Envelope {
        let mut options = QueryOptions::new();
        options.limit = limit;
        self.crud.find(&active(), &options).await
    }

    /// Set `status` on every row whose `id` is in `ids`, in one request
    pub async fn bulk_update_status(&self, ids: Vec<Value>, status: &str) -> Envelope {
        let query = self
            .crud
            .query()
            .update(json!({ "status": status }))
            .in_("id", ids);
        let result = query
            .execute()
            .await
            .map(|response| Payload::from_response(response.data, response.count));
        Envelope::from_result(result)
    }

    /// Total and active row counts; fails if either count fails
    pub async fn get_statistics(&self) -> Envelope {
        let total = self.crud.count(&Filters::new()).await;
        if !total.is_success() {
            return total;
        }
        let active = self.crud.count(&active()).await;
        if !active.is_success() {
            return active;
        }

        let stats = StatusStatistics {
            total: total.count().unwrap_or_default(),
            active: active.count().unwrap_or_default(),
        };
        Envelope::success(json!(stats))
    }
}

fn active() -> Filters {
    filters([("status", ACTIVE)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SupabaseClient;
    use crate::config::SupabaseConfig;
    use crate::memory::MemoryBackend;
    use std::sync::Arc;

    fn tasks() -> StatusTrackedService {
        let backend = MemoryBackend::new().with_rows(
            "tasks",
            vec![
                json!({"id": 1, "status": "active"}),
                json!({"id": 2, "status": "pending"}),
                json!({"id": 3, "status": "pending"}),
                json!({"id": 4, "status": "active"}),
            ],
        );
        let client = SupabaseClient::with_backend(
            SupabaseConfig::new("http://localhost", "test"),
            Arc::new(backend),
        );
        StatusTrackedService::with_table(client, "tasks")
    }

    #[tokio::test]
    async fn test_statistics() {
        let envelope = tasks().get_statistics().await;
        let stats: StatusStatistics = envelope.data_as().unwrap().unwrap();
        assert_eq!(stats, StatusStatistics { total: 4, active: 2 });
    }

    #[tokio::test]
    async fn test_bulk_update_status() {
        let svc = tasks();
        let updated = svc
            .bulk_update_status(vec![json!(2), json!(3)], "active")
            .await;
        assert_eq!(updated.data().as_array().unwrap().len(), 2);

        let active = svc.get_active_records(None).await;
        assert_eq!(active.data().as_array().unwrap().len(), 4);

        let limited = svc.get_active_records(Some(1)).await;
        assert_eq!(limited.data().as_array().unwrap().len(), 1);
    }
}
