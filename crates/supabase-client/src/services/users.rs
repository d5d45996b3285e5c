//! Users table service

use serde_json::{json, Value};

use apikit_common::{Envelope, Record};

use crate::crud::{CrudService, QueryOptions};
use crate::query::filters;
use crate::services::ResourceService;

/// Shortcuts for the `users` table
#[derive(Debug, Clone)]
pub struct UsersService {
    crud: CrudService,
}

impl ResourceService for UsersService {
    const DEFAULT_TABLE: &'static str = "users";

    fn from_crud(crud: CrudService) -> Self {
        Self { crud }
    }

    fn crud(&self) -> &CrudService {
        &self.crud
    }
}

impl UsersService {
    pub async fn get_by_email(&self, email: &str) -> Envelope {
        self.crud.find_one(&filters([("email", email)]), "*").await
    }

    pub async fn get_by_username(&self, username: &str) -> Envelope {
        self.crud.find_one(&filters([("username", username)]), "*").await
    }

    /// Users with `status = active`, most recent first by `order_by`
    pub async fn get_active_users(&self, limit: Option<usize>, order_by: &str) -> Envelope {
        let mut options = QueryOptions::new().order_by(order_by, false);
        options.limit = limit;
        self.crud
            .find(&filters([("status", "active")]), &options)
            .await
    }

    /// Insert a user; `extra` fields are merged in, never overriding email or username
    pub async fn create_user(&self, email: &str, username: &str, extra: Record) -> Envelope {
        let mut record = extra;
        record.insert("email".to_string(), Value::from(email));
        record.insert("username".to_string(), Value::from(username));
        self.crud.create(&record).await
    }

    pub async fn update_user_status(&self, user_id: impl Into<Value>, status: &str) -> Envelope {
        self.crud
            .update(user_id, &json!({ "status": status }), "id")
            .await
    }

    pub async fn deactivate_user(&self, user_id: impl Into<Value>) -> Envelope {
        self.update_user_status(user_id, "inactive").await
    }

    /// Case-insensitive match on `email`
    pub async fn search_users(&self, term: &str, limit: Option<usize>) -> Envelope {
        let mut options = QueryOptions::new();
        options.limit = limit;
        self.crud.search("email", term, &options).await
    }

    pub async fn email_exists(&self, email: &str) -> Envelope {
        self.crud.exists(&filters([("email", email)])).await
    }

    pub async fn username_exists(&self, username: &str) -> Envelope {
        self.crud.exists(&filters([("username", username)])).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SupabaseClient;
    use crate::config::SupabaseConfig;
    use crate::memory::MemoryBackend;
    use std::sync::Arc;

    fn users() -> UsersService {
        let backend = MemoryBackend::new().with_rows(
            "users",
            vec![
                json!({"id": 1, "email": "ada@example.com", "username": "ada",
                       "status": "active", "created_at": "2024-01-01T00:00:00Z"}),
                json!({"id": 2, "email": "bob@example.com", "username": "bob",
                       "status": "inactive", "created_at": "2024-02-01T00:00:00Z"}),
                json!({"id": 3, "email": "cy@example.com", "username": "cy",
                       "status": "active", "created_at": "2024-03-01T00:00:00Z"}),
            ],
        );
        let client = SupabaseClient::with_backend(
            SupabaseConfig::new("http://localhost", "test"),
            Arc::new(backend),
        );
        UsersService::new(client)
    }

    #[tokio::test]
    async fn test_lookup_shortcuts() {
        let svc = users();
        assert_eq!(svc.get_by_email("bob@example.com").await.data()["id"], 2);
        assert_eq!(svc.get_by_username("cy").await.data()["id"], 3);
        assert_eq!(svc.get_by_username("nobody").await.data(), &Value::Null);
    }

    #[tokio::test]
    async fn test_active_users_most_recent_first() {
        let envelope = users().get_active_users(None, "created_at").await;
        let ids: Vec<i64> = envelope
            .data()
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[tokio::test]
    async fn test_create_and_deactivate() {
        let svc = users();
        let mut extra = Record::new();
        extra.insert("status".to_string(), json!("active"));
        extra.insert("email".to_string(), json!("ignored@example.com"));

        let created = svc.create_user("dee@example.com", "dee", extra).await;
        assert!(created.is_success());
        assert_eq!(created.data()[0]["email"], "dee@example.com");
        assert_eq!(svc.email_exists("dee@example.com").await.exists(), Some(true));

        let id = created.data()[0]["id"].clone();
        let updated = svc.deactivate_user(id).await;
        assert_eq!(updated.data()[0]["status"], "inactive");
    }

    #[tokio::test]
    async fn test_search_users_by_email() {
        let svc = users();
        let found = svc.search_users("EXAMPLE", Some(2)).await;
        assert_eq!(found.data().as_array().unwrap().len(), 2);
        assert_eq!(svc.username_exists("zed").await.exists(), Some(false));
    }
}
