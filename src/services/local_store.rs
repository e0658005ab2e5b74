// src/services/local_store.rs
//! Registrations kept as a single JSON list under one key of a SQLite
//! key-value table.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::store::{RegistrationStore, StoreError};
use crate::common::safe_email_log;
use crate::registrations::models::Registration;

/// Key the whole registration list is stored under
pub const USERS_KEY: &str = "users";

pub struct LocalStore {
    db: SqlitePool,
    // Serializes read-modify-write cycles on the list
    write_lock: Mutex<()>,
}

impl LocalStore {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            write_lock: Mutex::new(()),
        }
    }

    async fn read_list(&self) -> Result<Vec<Registration>, StoreError> {
        let raw: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?")
            .bind(USERS_KEY)
            .fetch_optional(&self.db)
            .await?;

        let Some(raw) = raw else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<Registration>>(&raw) {
            Ok(list) => Ok(list),
            Err(e) => {
                warn!(error = %e, key = USERS_KEY, "Error loading users, starting from an empty list");
                Ok(Vec::new())
            }
        }
    }

    async fn write_list(&self, list: &[Registration]) -> Result<(), StoreError> {
        let value = serde_json::to_string(list)?;
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(USERS_KEY)
        .bind(value)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl RegistrationStore for LocalStore {
    async fn list(&self) -> Result<Vec<Registration>, StoreError> {
        let list = self.read_list().await?;
        debug!(count = list.len(), "Loaded registrations from local store");
        Ok(list)
    }

    async fn add(&self, registration: Registration) -> Result<Registration, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut list = self.read_list().await?;
        if list.iter().any(|r| r.email == registration.email) {
            warn!(
                email = %safe_email_log(&registration.email),
                "Rejecting registration with an email already stored"
            );
            return Err(StoreError::DuplicateEmail);
        }

        list.push(registration.clone());
        self.write_list(&list).await?;

        info!(
            registration_id = ?registration.id,
            total = list.len(),
            "Registration stored locally"
        );
        Ok(registration)
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Arc;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        crate::common::migrations::create_kv_table(&pool)
            .await
            .unwrap();

        pool
    }

    fn registration(email: &str) -> Registration {
        Registration {
            id: Some("R_TEST01".to_string()),
            first_name: "Jean".to_string(),
            last_name: "Dupont".to_string(),
            email: email.to_string(),
            birth_date: "1990-01-01".to_string(),
            city: "Paris".to_string(),
            postal_code: "75001".to_string(),
            timestamp: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_on_first_read() {
        let store = LocalStore::new(setup_test_db().await);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let store = LocalStore::new(setup_test_db().await);

        store.add(registration("jean@test.com")).await.unwrap();
        store.add(registration("marie@test.com")).await.unwrap();

        let list = store.list().await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].email, "jean@test.com");
        assert_eq!(list[1].email, "marie@test.com");
    }

    #[tokio::test]
    async fn test_whole_list_stored_under_one_key() {
        let pool = setup_test_db().await;
        let store = LocalStore::new(pool.clone());

        store.add(registration("jean@test.com")).await.unwrap();
        store.add(registration("marie@test.com")).await.unwrap();

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv_store")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 1);

        let raw: String = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = 'users'")
            .fetch_one(&pool)
            .await
            .unwrap();
        let stored: Vec<Registration> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = LocalStore::new(setup_test_db().await);

        store.add(registration("jean@test.com")).await.unwrap();
        let err = store.add(registration("jean@test.com")).await.unwrap_err();

        assert!(matches!(err, StoreError::DuplicateEmail));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_value_reads_as_empty() {
        let pool = setup_test_db().await;
        sqlx::query("INSERT INTO kv_store (key, value) VALUES ('users', 'not json')")
            .execute(&pool)
            .await
            .unwrap();

        let store = LocalStore::new(pool);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_adds_are_not_lost() {
        let store = Arc::new(LocalStore::new(setup_test_db().await));

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let store = Arc::clone(&store);
                let email = format!("user{}@test.com", i);
                tokio::spawn(async move { store.add(registration(&email)).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let list = store.list().await.unwrap();
        assert_eq!(list.len(), 20);
        for i in 0..20 {
            let email = format!("user{}@test.com", i);
            assert!(list.iter().any(|r| r.email == email), "{} missing", email);
        }
    }
}
