use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::{
    service::CatalogService,
    types::{CreateTemplateRequest, GameRequest, GameResponse, TemplateResponse, UpdateTemplateRequest},
};
use crate::shared::{ApiJson, AppError, AppState};

fn catalog_service(state: &AppState) -> CatalogService {
    CatalogService::new(
        Arc::clone(&state.catalog_repository),
        Arc::clone(&state.session_repository),
    )
}

/// POST /games
#[instrument(name = "create_game", skip(state, request))]
pub async fn create_game(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GameRequest>,
) -> Result<Json<GameResponse>, AppError> {
    Ok(Json(catalog_service(&state).create_game(request).await?))
}

/// PUT /games/:game_id
#[instrument(name = "rename_game", skip(state, request))]
pub async fn rename_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    ApiJson(request): ApiJson<GameRequest>,
) -> Result<Json<GameResponse>, AppError> {
    Ok(Json(
        catalog_service(&state)
            .rename_game(&game_id, request)
            .await?,
    ))
}

/// DELETE /games/:game_id
#[instrument(name = "delete_game", skip(state))]
pub async fn delete_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<StatusCode, AppError> {
    catalog_service(&state).delete_game(&game_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /games/:game_id/templates
#[instrument(name = "create_template", skip(state, request))]
pub async fn create_template(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    ApiJson(request): ApiJson<CreateTemplateRequest>,
) -> Result<Json<TemplateResponse>, AppError> {
    Ok(Json(
        catalog_service(&state)
            .create_template(&game_id, request)
            .await?,
    ))
}

/// GET /games/:game_id/templates
#[instrument(name = "list_templates", skip(state))]
pub async fn list_templates(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<Vec<TemplateResponse>>, AppError> {
    Ok(Json(catalog_service(&state).list_templates(&game_id).await?))
}

/// PUT /templates/:template_id
#[instrument(name = "update_template", skip(state, request))]
pub async fn update_template(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
    ApiJson(request): ApiJson<UpdateTemplateRequest>,
) -> Result<Json<TemplateResponse>, AppError> {
    Ok(Json(
        catalog_service(&state)
            .update_template(&template_id, request)
            .await?,
    ))
}

/// DELETE /templates/:template_id
#[instrument(name = "delete_template", skip(state))]
pub async fn delete_template(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> Result<StatusCode, AppError> {
    catalog_service(&state).delete_template(&template_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::Request,
        routing::{get, post},
        Router,
    };
    use tower::ServiceExt; // for `oneshot`

    fn app() -> Router {
        Router::new()
            .route("/games", post(create_game))
            .route("/games/:game_id", axum::routing::delete(delete_game))
            .route("/games/:game_id/templates", get(list_templates).post(create_template))
            .with_state(AppStateBuilder::new().build())
    }

    async fn post_json(app: &Router, uri: &str, body: &str) -> axum::response::Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_game_and_template_handlers() {
        let app = app();

        let response = post_json(&app, "/games", r#"{"name": "7 Wonders"}"#).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let game: GameResponse = serde_json::from_slice(&body).unwrap();

        let response = post_json(
            &app,
            &format!("/games/{}/templates", game.id),
            r#"{"name": "Base", "fields": [{"key": "military", "label": "Military"}, {"key": "science", "label": "Science"}]}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/games/{}/templates", game.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let templates: Vec<TemplateResponse> = serde_json::from_slice(&body).unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].fields[1].key, "science");
    }

    #[tokio::test]
    async fn test_create_template_handler_duplicate_keys() {
        let app = app();

        let response = post_json(&app, "/games", r#"{"name": "7 Wonders"}"#).await;
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let game: GameResponse = serde_json::from_slice(&body).unwrap();

        let response = post_json(
            &app,
            &format!("/games/{}/templates", game.id),
            r#"{"name": "Broken", "fields": [{"key": "a", "label": "A"}, {"key": "a", "label": "A again"}]}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_unknown_game_handler() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/games/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
