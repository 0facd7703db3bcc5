//! Tenant gate: resolves the `X-API-Key` header to an active tenant.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use appbase_core::AppError;
use appbase_core::result::AppResult;
use appbase_entity::tenant::Tenant;
use appbase_service::context::AuthenticatedContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the tenant API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Resolve the calling tenant from the request headers and require it to
/// be active.
pub(crate) async fn resolve_tenant(state: &AppState, headers: &HeaderMap) -> AppResult<Tenant> {
    let api_key = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    let tenant = state.tenant_resolver.resolve(api_key).await?;
    if !tenant.is_active {
        debug!(tenant_id = tenant.id, "Rejected API key of inactive tenant");
        return Err(AppError::forbidden("App is disabled"));
    }
    Ok(tenant)
}

/// Tenant-only gate. Attaches an anonymous [`AuthenticatedContext`].
pub async fn require_tenant(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let tenant = resolve_tenant(&state, request.headers()).await?;
    request
        .extensions_mut()
        .insert(AuthenticatedContext::anonymous(tenant));
    Ok(next.run(request).await)
}
