use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};

use crate::shared::{AppError, AppState};

/// JWT authentication middleware - validates the Authorization Bearer header and adds AuthClaims to the request.
/// Usage: .layer(middleware::from_fn_with_state(app_state.clone(), auth::jwt_auth))
/// Handlers can then extract Extension(claims): Extension<AuthClaims>.
#[instrument(skip(state, req, next))]
pub async fn jwt_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| {
            warn!("Missing Authorization header in request");
            AppError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("Invalid Authorization header format (expected Bearer token)");
        AppError::Unauthorized("Invalid authorization header format".to_string())
    })?;

    let claims = match state.token_config.validate_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            warn!("JWT authentication failed: {}", e);
            return Err(AppError::Unauthorized("Invalid or expired token".to_string()));
        }
    };

    // The user must still exist and must not be a guest
    match state.directory_repository.find_user(&claims.user_id).await? {
        Some(user) if !user.is_guest => {}
        Some(_) => {
            warn!(user_id = %claims.user_id, "Guest users cannot authenticate");
            return Err(AppError::Unauthorized("Guest users cannot sign in".to_string()));
        }
        None => {
            warn!(user_id = %claims.user_id, "Token refers to unknown user");
            return Err(AppError::Unauthorized("Unknown user".to_string()));
        }
    }

    debug!(user_id = %claims.user_id, "Authentication successful, adding claims to request");

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
