//! End-user gates. The tenant is always resolved before the bearer token
//! is looked at, so a disabled tenant short-circuits with `Forbidden`.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use tracing::debug;

use appbase_core::AppError;
use appbase_core::error::ErrorKind;
use appbase_core::result::AppResult;
use appbase_entity::tenant::Tenant;
use appbase_service::context::AuthenticatedContext;

use crate::error::ApiError;
use crate::middleware::tenant::resolve_tenant;
use crate::state::AppState;

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
}

/// Validate an access token against the resolved tenant and load its user.
async fn authenticate(
    state: &AppState,
    tenant: Tenant,
    token: &str,
) -> AppResult<AuthenticatedContext> {
    let claims = state.sessions.validate_access(token)?;
    if claims.app_id != tenant.id {
        return Err(AppError::invalid_credential(
            "Token was issued for another app",
        ));
    }

    let user = state
        .users
        .find_user(claims.user_id)
        .await?
        .ok_or_else(|| AppError::invalid_credential("Token subject no longer exists"))?;
    if !user.is_active {
        return Err(AppError::forbidden("Account is disabled"));
    }

    Ok(AuthenticatedContext::with_user(tenant, user, claims))
}

/// Tenant plus required user gate.
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let tenant = resolve_tenant(&state, request.headers()).await?;
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::unauthorized("Bearer token required"))?;

    let ctx = authenticate(&state, tenant, &token).await?;
    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

/// Tenant plus optional user gate.
///
/// A missing or rejected bearer token leaves the request anonymous. Store
/// failures still fail the request.
pub async fn optional_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let tenant = resolve_tenant(&state, request.headers()).await?;

    let ctx = match bearer_token(request.headers()) {
        None => AuthenticatedContext::anonymous(tenant),
        Some(token) => match authenticate(&state, tenant.clone(), &token).await {
            Ok(ctx) => ctx,
            Err(err) if err.kind.is_authentication() || err.is(ErrorKind::Forbidden) => {
                debug!(kind = %err.kind, "Ignoring rejected optional bearer token");
                AuthenticatedContext::anonymous(tenant)
            }
            Err(err) => return Err(err.into()),
        },
    };

    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}
