//! Admin console handlers: Google sign-in, session cookie, app management.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderName, HeaderValue};

use appbase_auth::admin::AdminIdentity;
use appbase_core::AppError;
use appbase_core::error::ErrorKind;
use appbase_core::result::AppResult;
use appbase_entity::organization::OrganizationSummary;
use appbase_entity::tenant::Tenant;
use appbase_entity::user::User;
use appbase_service::context::AdminContext;

use crate::dto::request::{AdminLoginRequest, UpdateTenantStatusRequest};
use crate::dto::response::{ApiResponse, MessageResponse, TokenResponse};
use crate::dto::validate_request;
use crate::error::ApiError;
use crate::extractors::AdminSession;
use crate::state::AppState;

type WithCookie<T> = ([(HeaderName, HeaderValue); 1], Json<ApiResponse<T>>);

/// Set-Cookie value for the admin session.
fn session_cookie(state: &AppState, token: &str, max_age_secs: u64) -> AppResult<HeaderValue> {
    let secure = if state.config.server.is_production() {
        "; Secure"
    } else {
        ""
    };
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
        state.config.admin.cookie_name, token, max_age_secs, secure
    );
    HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Invalid session cookie", e))
}

/// POST /admin/auth/google
pub async fn google_login(
    State(state): State<AppState>,
    Json(req): Json<AdminLoginRequest>,
) -> Result<WithCookie<AdminIdentity>, ApiError> {
    validate_request(&req)?;
    let (identity, token) = state.admin_sessions.sign_in(&req.id_token).await?;
    let max_age = state.admin_sessions.session_ttl().as_secs();
    let cookie = session_cookie(&state, &token, max_age)?;
    Ok(([(SET_COOKIE, cookie)], Json(ApiResponse::ok(identity))))
}

/// GET /admin/auth/me
pub async fn me(admin: AdminSession) -> Json<ApiResponse<AdminContext>> {
    Json(ApiResponse::ok(admin.0))
}

/// POST /admin/auth/logout
pub async fn logout(State(state): State<AppState>) -> Result<WithCookie<MessageResponse>, ApiError> {
    let cookie = session_cookie(&state, "", 0)?;
    Ok((
        [(SET_COOKIE, cookie)],
        Json(ApiResponse::ok(MessageResponse::new("Logged out"))),
    ))
}

/// GET /admin/apps
pub async fn list_apps(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Result<Json<ApiResponse<Vec<Tenant>>>, ApiError> {
    let apps = state.tenant_admin_service.list().await?;
    Ok(Json(ApiResponse::ok(apps)))
}

/// GET /admin/apps/{id}
pub async fn get_app(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Tenant>>, ApiError> {
    let app = state.tenant_admin_service.get(id).await?;
    Ok(Json(ApiResponse::ok(app)))
}

/// PATCH /admin/apps/{id}/status
pub async fn update_app_status(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTenantStatusRequest>,
) -> Result<Json<ApiResponse<Tenant>>, ApiError> {
    let app = state
        .tenant_admin_service
        .set_active(&admin, id, req.is_active)
        .await?;
    Ok(Json(ApiResponse::ok(app)))
}

/// GET /admin/apps/{id}/users
pub async fn list_app_users(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    let users = state.tenant_admin_service.list_users(id).await?;
    Ok(Json(ApiResponse::ok(users)))
}

/// GET /admin/apps/{id}/organizations
pub async fn list_app_organizations(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<OrganizationSummary>>>, ApiError> {
    let organizations = state.tenant_admin_service.list_organizations(id).await?;
    Ok(Json(ApiResponse::ok(organizations)))
}

/// POST /admin/apps/{id}/users/{user_id}/token
pub async fn issue_user_tokens(
    State(state): State<AppState>,
    admin: AdminSession,
    Path((id, user_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    let tokens = state
        .tenant_admin_service
        .issue_tokens(&admin, id, user_id)
        .await?;
    Ok(Json(ApiResponse::ok(tokens.into())))
}
