use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{auth, catalog, directory, sessions, shared::AppState, stats};

/// Builds the HTTP API. Routes that act on behalf of a user sit behind
/// `jwt_auth`; reads and sign-up are public.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/groups", post(directory::create_group))
        .route("/groups/:group_id/members", post(directory::add_member))
        .route("/groups/:group_id/sessions", post(sessions::record_session))
        .route("/games", post(catalog::create_game))
        .route(
            "/games/:game_id",
            put(catalog::rename_game).delete(catalog::delete_game),
        )
        .route("/games/:game_id/templates", post(catalog::create_template))
        .route(
            "/templates/:template_id",
            put(catalog::update_template).delete(catalog::delete_template),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::jwt_auth,
        ));

    let public = Router::new()
        .route("/", get(|| async { "Board game league" }))
        .route("/users", post(directory::register_user))
        .route("/guests", post(directory::create_guest))
        .route("/users/:user_id/statistics", get(stats::get_user_statistics))
        .route("/groups/:group_id/leaderboard", get(stats::get_leaderboard))
        .route("/groups/:group_id/members", get(directory::list_members))
        .route("/games/:game_id/templates", get(catalog::list_templates));

    public
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
