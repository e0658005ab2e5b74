// src/services/remote_store.rs
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::store::{RegistrationStore, StoreError};
use crate::common::config::RemoteConfig;
use crate::common::safe_email_log;
use crate::registrations::models::Registration;

/// Client for a remote `/users` list endpoint
#[derive(Debug, Clone)]
pub struct RemoteStore {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl RemoteStore {
    pub fn new(http: Client, config: &RemoteConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }

    pub fn build_client(config: &RemoteConfig) -> Result<Client, reqwest::Error> {
        Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
    }

    fn users_url(&self) -> String {
        format!("{}/users", self.base_url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Maps a non-success status of the POST endpoint
fn status_error(status: StatusCode) -> StoreError {
    if status == StatusCode::BAD_REQUEST {
        StoreError::DuplicateEmail
    } else if status.is_server_error() {
        StoreError::Unavailable
    } else {
        StoreError::Rejected(status.as_u16())
    }
}

#[async_trait]
impl RegistrationStore for RemoteStore {
    async fn list(&self) -> Result<Vec<Registration>, StoreError> {
        let url = self.users_url();
        debug!(url = %url, "Fetching registrations from remote store");

        let response = self.authorize(self.http.get(&url)).send().await.map_err(|e| {
            error!(error = %e, url = %url, "Failed to load users from API");
            StoreError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, url = %url, "Remote store refused to list users");
            return Err(if status.is_server_error() {
                StoreError::Unavailable
            } else {
                StoreError::Rejected(status.as_u16())
            });
        }

        let list: Vec<Registration> = response.json().await?;
        debug!(count = list.len(), "Loaded registrations from remote store");
        Ok(list)
    }

    async fn add(&self, mut registration: Registration) -> Result<Registration, StoreError> {
        let url = self.users_url();

        let response = self
            .authorize(self.http.post(&url).json(&registration))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, url = %url, "Failed to post registration");
                StoreError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                status = %status,
                email = %safe_email_log(&registration.email),
                "Remote store rejected registration"
            );
            return Err(status_error(status));
        }

        // The endpoint may assign its own id
        let body: serde_json::Value = response.json().await.unwrap_or(serde_json::Value::Null);
        match body.get("id") {
            Some(serde_json::Value::String(id)) => registration.id = Some(id.clone()),
            Some(serde_json::Value::Number(id)) => registration.id = Some(id.to_string()),
            _ => {}
        }

        info!(
            registration_id = ?registration.id,
            email = %safe_email_log(&registration.email),
            "Registration posted to remote store"
        );
        Ok(registration)
    }

    fn backend_name(&self) -> &'static str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{HeaderMap, StatusCode as AxumStatus},
        routing::get,
        Json, Router,
    };
    use std::net::SocketAddr;

    async fn spawn_endpoint(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn store_for(addr: SocketAddr, token: Option<&str>) -> RemoteStore {
        let config = RemoteConfig {
            base_url: format!("http://{}/", addr),
            token: token.map(str::to_string),
            timeout_secs: 5,
        };
        RemoteStore::new(RemoteStore::build_client(&config).unwrap(), &config)
    }

    fn registration() -> Registration {
        Registration {
            id: Some("R_LOCAL1".to_string()),
            first_name: "New".to_string(),
            last_name: "User".to_string(),
            email: "new@user.com".to_string(),
            birth_date: "1990-01-01".to_string(),
            city: "City".to_string(),
            postal_code: "12345".to_string(),
            timestamp: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_tolerates_foreign_records() {
        let app = Router::new().route(
            "/users",
            get(|| async {
                Json(serde_json::json!([
                    { "id": 1, "name": "Leanne Graham", "email": "Sincere@april.biz" },
                    { "id": "R_ABC123", "firstName": "Jean", "email": "jean@test.com" }
                ]))
            }),
        );
        let store = store_for(spawn_endpoint(app).await, None);

        let list = store.list().await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id.as_deref(), Some("1"));
        assert_eq!(list[0].email, "Sincere@april.biz");
        assert_eq!(list[1].first_name, "Jean");
    }

    #[tokio::test]
    async fn test_post_merges_returned_id() {
        let app = Router::new().route(
            "/users",
            get(|| async { Json(serde_json::json!([])) })
                .post(|| async { (AxumStatus::CREATED, Json(serde_json::json!({ "id": 101 }))) }),
        );
        let store = store_for(spawn_endpoint(app).await, None);

        let stored = store.add(registration()).await.unwrap();
        assert_eq!(stored.id.as_deref(), Some("101"));
        assert_eq!(stored.email, "new@user.com");
    }

    #[tokio::test]
    async fn test_post_400_is_duplicate_email() {
        let app = Router::new().route(
            "/users",
            get(|| async { Json(serde_json::json!([])) })
                .post(|| async { AxumStatus::BAD_REQUEST }),
        );
        let store = store_for(spawn_endpoint(app).await, None);

        let err = store.add(registration()).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
        assert_eq!(err.to_string(), "Email already exists");
    }

    #[tokio::test]
    async fn test_post_500_is_unavailable() {
        let app = Router::new().route(
            "/users",
            get(|| async { Json(serde_json::json!([])) })
                .post(|| async { AxumStatus::INTERNAL_SERVER_ERROR }),
        );
        let store = store_for(spawn_endpoint(app).await, None);

        let err = store.add(registration()).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable));
        assert_eq!(err.to_string(), "Server is down");
    }

    #[tokio::test]
    async fn test_bearer_token_is_sent() {
        let app = Router::new().route(
            "/users",
            get(|headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                if auth == "Bearer secret-token" {
                    (AxumStatus::OK, Json(serde_json::json!([])))
                } else {
                    (AxumStatus::UNAUTHORIZED, Json(serde_json::json!([])))
                }
            }),
        );
        let addr = spawn_endpoint(app).await;

        assert!(store_for(addr, Some("secret-token")).list().await.is_ok());
        let err = store_for(addr, None).list().await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected(401)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = store_for(addr, None).list().await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable));
    }
}
