use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::auth::TokenConfig;
use crate::catalog::repository::CatalogRepository;
use crate::directory::repository::DirectoryRepository;
use crate::scoring::{ScoringError, SessionScorer};
use crate::sessions::repository::SessionRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub directory_repository: Arc<dyn DirectoryRepository + Send + Sync>,
    pub catalog_repository: Arc<dyn CatalogRepository + Send + Sync>,
    pub session_repository: Arc<dyn SessionRepository + Send + Sync>,
    pub token_config: TokenConfig,
    pub scorer: SessionScorer,
}

impl AppState {
    pub fn new(
        directory_repository: Arc<dyn DirectoryRepository + Send + Sync>,
        catalog_repository: Arc<dyn CatalogRepository + Send + Sync>,
        session_repository: Arc<dyn SessionRepository + Send + Sync>,
        token_config: TokenConfig,
        scorer: SessionScorer,
    ) -> Self {
        Self {
            directory_repository,
            catalog_repository,
            session_repository,
            token_config,
            scorer,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Integrity error: {0}")]
    Integrity(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// Classifies a store failure. Connection-level problems surface as
    /// `StorageUnavailable`, anything else as a plain database error.
    pub fn from_sqlx(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => {
                warn!(error = %error, "Store unreachable");
                AppError::StorageUnavailable(error.to_string())
            }
            other => AppError::DatabaseError(other.to_string()),
        }
    }
}

impl From<ScoringError> for AppError {
    fn from(error: ScoringError) -> Self {
        AppError::Validation(error.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// JSON request body whose rejections answer with the same
/// `{"error": ...}` shape as every other `AppError`.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::JwtError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Integrity(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Write rolled back: {}", msg),
            ),
            AppError::StorageUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Storage unavailable: {}", msg),
            ),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::catalog::repository::InMemoryCatalogRepository;
    use crate::directory::repository::InMemoryDirectoryRepository;
    use crate::scoring::PointsPolicy;
    use crate::sessions::repository::InMemorySessionRepository;

    /// Builder for creating AppState with overrides for testing
    pub struct AppStateBuilder {
        session_repository: Option<Arc<dyn SessionRepository + Send + Sync>>,
        points_policy: Option<Arc<dyn PointsPolicy>>,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            Self {
                session_repository: None,
                points_policy: None,
            }
        }

        pub fn with_session_repository(
            mut self,
            repo: Arc<dyn SessionRepository + Send + Sync>,
        ) -> Self {
            self.session_repository = Some(repo);
            self
        }

        pub fn with_points_policy(mut self, policy: Arc<dyn PointsPolicy>) -> Self {
            self.points_policy = Some(policy);
            self
        }

        pub fn build(self) -> AppState {
            AppState {
                directory_repository: Arc::new(InMemoryDirectoryRepository::new()),
                catalog_repository: Arc::new(InMemoryCatalogRepository::new()),
                session_repository: self
                    .session_repository
                    .unwrap_or_else(|| Arc::new(InMemorySessionRepository::new())),
                token_config: TokenConfig::new("test-secret".to_string(), 1),
                scorer: self
                    .points_policy
                    .map(SessionScorer::new)
                    .unwrap_or_default(),
            }
        }
    }

    impl Default for AppStateBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoring_errors_become_validation_errors() {
        let error: AppError = ScoringError::EmptySession.into();
        assert!(matches!(error, AppError::Validation(_)));
    }

    #[test]
    fn maps_errors_to_status_codes() {
        let cases = vec![
            (AppError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (AppError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (AppError::Conflict("busy".into()), StatusCode::CONFLICT),
            (
                AppError::StorageUnavailable("down".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::Integrity("partial".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn malformed_bodies_are_validation_errors() {
        use axum::body::Body;

        #[derive(Debug, serde::Deserialize)]
        struct NameBody {
            #[allow(dead_code)]
            name: String,
        }

        let request = axum::http::Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name": 7}"#))
            .unwrap();
        let error = match ApiJson::<NameBody>::from_request(request, &()).await {
            Ok(_) => panic!("a numeric name should not parse"),
            Err(error) => error,
        };
        assert!(matches!(error, AppError::Validation(_)));

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(body["error"].is_string());
    }

    #[test]
    fn pool_timeouts_are_storage_unavailable() {
        assert!(matches!(
            AppError::from_sqlx(sqlx::Error::PoolTimedOut),
            AppError::StorageUnavailable(_)
        ));
        assert!(matches!(
            AppError::from_sqlx(sqlx::Error::RowNotFound),
            AppError::DatabaseError(_)
        ));
    }
}
