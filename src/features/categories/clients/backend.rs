use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::config::BackendConfig;
use crate::core::error::{AppError, Result};
use crate::features::categories::models::Category;
use crate::shared::constants::{ADMIN_CATEGORIES_PATH, CATEGORIES_PATH};

/// Editable category fields as sent to the backend on create and update.
///
/// `parent_id` is always serialized so that `null` moves a category to the
/// root level on update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPayload {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<String>,
    pub icon: Option<String>,
}

/// Envelope the backend wraps mutation results in.
#[derive(Debug, Default, Deserialize)]
struct BackendEnvelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    count: Option<u64>,
}

impl BackendEnvelope {
    fn into_result(self) -> Result<Self> {
        if self.success == Some(false) {
            return Err(AppError::Backend(self.error));
        }
        Ok(self)
    }
}

/// The flat listing comes either bare or wrapped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListBody {
    Bare(Vec<Category>),
    Wrapped {
        #[serde(default)]
        success: Option<bool>,
        #[serde(default, alias = "categories")]
        data: Option<Vec<Category>>,
        #[serde(default)]
        error: Option<String>,
    },
}

/// Category operations offered by the backend.
#[async_trait]
pub trait CategoryApi: Send + Sync {
    /// Full flat listing of categories.
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Returns the id assigned by the backend.
    async fn create_category(&self, payload: &CategoryPayload) -> Result<String>;

    async fn update_category(&self, id: &str, payload: &CategoryPayload) -> Result<()>;

    async fn delete_category(&self, id: &str) -> Result<()>;

    /// Returns how many categories were removed.
    async fn delete_all_categories(&self) -> Result<u64>;
}

/// reqwest-backed client for the backend category endpoints
pub struct BackendCategoryClient {
    http_client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl BackendCategoryClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            "MarketplaceAdmin/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http_client = builder
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.api_base_url.clone(),
            api_token: config.api_token.clone(),
        })
    }

    fn admin_url(&self, id: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            ADMIN_CATEGORIES_PATH,
            urlencoding::encode(id)
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send the request and decode the mutation envelope.
    ///
    /// Non-2xx statuses and `success: false` both end up as
    /// [`AppError::Backend`] carrying the backend's `error` string if any.
    async fn execute(&self, request: reqwest::RequestBuilder, action: &str) -> Result<BackendEnvelope> {
        let body = self.execute_raw(request, action).await?;
        if body.trim().is_empty() {
            return Ok(BackendEnvelope::default());
        }

        let envelope = serde_json::from_str::<BackendEnvelope>(&body).map_err(|e| {
            tracing::error!("Failed to parse backend response to {}: {}", action, e);
            AppError::Backend(None)
        })?;

        envelope.into_result()
    }

    async fn execute_raw(&self, request: reqwest::RequestBuilder, action: &str) -> Result<String> {
        let response = self.authorize(request).send().await.map_err(|e| {
            tracing::error!("Failed to {}: {}", action, e);
            AppError::Network(e.to_string())
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read backend response to {}: {}", action, e);
            AppError::Network(e.to_string())
        })?;

        if !status.is_success() {
            tracing::error!("Backend API error on {}: HTTP {} - {}", action, status, body);
            let error = serde_json::from_str::<BackendEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.error);
            return Err(AppError::Backend(error));
        }

        Ok(body)
    }
}

#[async_trait]
impl CategoryApi for BackendCategoryClient {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let url = format!("{}{}", self.base_url, CATEGORIES_PATH);
        tracing::debug!("Fetching categories from backend: {}", url);

        let request = self.http_client.get(&url).query(&[("flat", "true")]);
        let body = self.execute_raw(request, "list categories").await?;

        let parsed = serde_json::from_str::<ListBody>(&body).map_err(|e| {
            tracing::error!("Failed to parse category listing: {}", e);
            AppError::Backend(None)
        })?;

        match parsed {
            ListBody::Bare(categories) => Ok(categories),
            ListBody::Wrapped {
                success: Some(false),
                error,
                ..
            } => Err(AppError::Backend(error)),
            ListBody::Wrapped { data, .. } => Ok(data.unwrap_or_default()),
        }
    }

    async fn create_category(&self, payload: &CategoryPayload) -> Result<String> {
        let url = format!("{}{}", self.base_url, ADMIN_CATEGORIES_PATH);
        tracing::debug!("Creating category in backend: {}", payload.slug);

        let envelope = self
            .execute(self.http_client.post(&url).json(payload), "create category")
            .await?;

        let id = match envelope.id {
            Some(serde_json::Value::String(id)) => id,
            Some(serde_json::Value::Number(id)) => id.to_string(),
            _ => {
                tracing::error!("Backend created category without returning an id");
                return Err(AppError::Backend(envelope.error));
            }
        };

        tracing::info!("Successfully created category: {}", id);
        Ok(id)
    }

    async fn update_category(&self, id: &str, payload: &CategoryPayload) -> Result<()> {
        let url = self.admin_url(id);
        tracing::debug!("Updating category in backend: {}", url);

        self.execute(self.http_client.put(&url).json(payload), "update category")
            .await?;

        tracing::info!("Successfully updated category: {}", id);
        Ok(())
    }

    async fn delete_category(&self, id: &str) -> Result<()> {
        let url = self.admin_url(id);
        tracing::debug!("Deleting category in backend: {}", url);

        self.execute(self.http_client.delete(&url), "delete category")
            .await?;

        tracing::info!("Successfully deleted category: {}", id);
        Ok(())
    }

    async fn delete_all_categories(&self) -> Result<u64> {
        let url = format!("{}{}/all", self.base_url, ADMIN_CATEGORIES_PATH);
        tracing::debug!("Deleting all categories in backend: {}", url);

        let envelope = self
            .execute(self.http_client.delete(&url), "delete all categories")
            .await?;
        let count = envelope.count.unwrap_or(0);

        tracing::info!("Deleted {} categories", count);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, Query, State},
        http::{HeaderMap, StatusCode},
        routing::{delete, get, post, put},
        Json, Router,
    };
    use serde_json::{json, Value};

    use super::*;
    use crate::shared::test_helpers::{catalog, category};

    #[derive(Default)]
    struct Backend {
        categories: Mutex<Vec<Category>>,
        last_auth: Mutex<Option<String>>,
    }

    type Shared = Arc<Backend>;

    async fn list(
        State(backend): State<Shared>,
        Query(query): Query<std::collections::HashMap<String, String>>,
        headers: HeaderMap,
    ) -> Json<Value> {
        *backend.last_auth.lock().unwrap() = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        assert_eq!(query.get("flat").map(String::as_str), Some("true"));
        Json(json!(*backend.categories.lock().unwrap()))
    }

    async fn create(
        State(backend): State<Shared>,
        Json(payload): Json<CategoryPayload>,
    ) -> (StatusCode, Json<Value>) {
        let mut categories = backend.categories.lock().unwrap();
        if categories.iter().any(|c| c.slug == payload.slug) {
            return (
                StatusCode::CONFLICT,
                Json(json!({ "success": false, "error": "Slug už existuje" })),
            );
        }
        let id = format!("{}", categories.len() + 100);
        let mut created = category(&id, &payload.name, payload.parent_id.as_deref());
        created.slug = payload.slug;
        categories.push(created);
        (StatusCode::CREATED, Json(json!({ "id": id })))
    }

    async fn update(
        State(backend): State<Shared>,
        Path(id): Path<String>,
        Json(payload): Json<CategoryPayload>,
    ) -> Json<Value> {
        let mut categories = backend.categories.lock().unwrap();
        match categories.iter_mut().find(|c| c.id == id) {
            Some(existing) => {
                existing.name = payload.name;
                existing.parent_id = payload.parent_id;
                Json(json!({ "success": true }))
            }
            None => Json(json!({ "success": false })),
        }
    }

    async fn remove(State(backend): State<Shared>, Path(id): Path<String>) -> Json<Value> {
        backend.categories.lock().unwrap().retain(|c| c.id != id);
        Json(json!({ "success": true }))
    }

    async fn remove_all(State(backend): State<Shared>) -> Json<Value> {
        let mut categories = backend.categories.lock().unwrap();
        let count = categories.len();
        categories.clear();
        Json(json!({ "success": true, "count": count }))
    }

    async fn spawn_backend(backend: Shared) -> String {
        let app = Router::new()
            .route("/categories", get(list))
            .route("/admin/categories", post(create))
            .route("/admin/categories/all", delete(remove_all))
            .route("/admin/categories/{id}", put(update).delete(remove))
            .with_state(backend);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base_url: String, api_token: Option<&str>) -> BackendCategoryClient {
        BackendCategoryClient::new(&BackendConfig {
            api_base_url: base_url,
            api_token: api_token.map(String::from),
            timeout: None,
        })
        .unwrap()
    }

    fn payload(name: &str, slug: &str, parent_id: Option<&str>) -> CategoryPayload {
        CategoryPayload {
            name: name.to_string(),
            slug: slug.to_string(),
            description: None,
            parent_id: parent_id.map(String::from),
            icon: None,
        }
    }

    #[tokio::test]
    async fn test_list_sends_flat_flag_and_token() {
        let backend = Arc::new(Backend {
            categories: Mutex::new(catalog()),
            ..Default::default()
        });
        let api = client(spawn_backend(backend.clone()).await, Some("secret"));

        let categories = api.list_categories().await.unwrap();

        assert_eq!(categories.len(), 5);
        assert_eq!(
            backend.last_auth.lock().unwrap().as_deref(),
            Some("Bearer secret")
        );
    }

    #[tokio::test]
    async fn test_create_update_delete_roundtrip() {
        let backend = Arc::new(Backend::default());
        let api = client(spawn_backend(backend.clone()).await, None);

        let id = api
            .create_category(&payload("Televízory", "televizory", None))
            .await
            .unwrap();
        api.update_category(&id, &payload("TV", "televizory", None))
            .await
            .unwrap();
        assert_eq!(backend.categories.lock().unwrap()[0].name, "TV");

        api.delete_category(&id).await.unwrap();
        assert!(backend.categories.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_backend_error_is_passed_through() {
        let backend = Arc::new(Backend::default());
        let api = client(spawn_backend(backend).await, None);

        api.create_category(&payload("TV", "tv", None)).await.unwrap();
        let err = api
            .create_category(&payload("TV 2", "tv", None))
            .await
            .unwrap_err();

        assert_eq!(err, AppError::Backend(Some("Slug už existuje".to_string())));
    }

    #[tokio::test]
    async fn test_success_false_without_message() {
        let backend = Arc::new(Backend::default());
        let api = client(spawn_backend(backend).await, None);

        let err = api
            .update_category("missing", &payload("X", "x", None))
            .await
            .unwrap_err();

        assert_eq!(err, AppError::Backend(None));
    }

    #[tokio::test]
    async fn test_delete_all_returns_count() {
        let backend = Arc::new(Backend {
            categories: Mutex::new(catalog()),
            ..Default::default()
        });
        let api = client(spawn_backend(backend).await, None);

        assert_eq!(api.delete_all_categories().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = client(format!("http://{}", addr), None);
        let err = api.list_categories().await.unwrap_err();

        assert!(matches!(err, AppError::Network(_)));
    }

    #[test]
    fn test_wrapped_listing_is_accepted() {
        let body = json!({ "success": true, "categories": [category("1", "TV", None)] });
        let parsed: ListBody = serde_json::from_value(body).unwrap();

        assert!(matches!(parsed, ListBody::Wrapped { data: Some(ref d), .. } if d.len() == 1));
    }
}
