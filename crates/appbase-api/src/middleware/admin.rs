//! Admin gate: validates the admin session cookie.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;

use appbase_core::AppError;
use appbase_service::context::AdminContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Admin-only gate. Attaches an [`AdminContext`].
pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar
        .get(&state.config.admin.cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::unauthorized("Admin session required"))?;

    let claims = state.admin_sessions.validate_admin_session(&token)?;
    request.extensions_mut().insert(AdminContext {
        email: claims.email,
        name: claims.name,
    });
    Ok(next.run(request).await)
}
