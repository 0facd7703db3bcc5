//! End-user auth handlers: signup, login, device login, refresh, me.

use axum::Json;
use axum::extract::{Path, State};

use appbase_entity::user::User;

use crate::dto::request::{DeviceLoginRequest, LoginRequest, RefreshRequest, SignupRequest};
use crate::dto::response::{ApiResponse, AuthResponse, SessionResponse, TokenResponse};
use crate::dto::validate_request;
use crate::error::ApiError;
use crate::extractors::AppContext;
use crate::state::AppState;

/// POST /auth/signup
pub async fn signup(
    State(state): State<AppState>,
    ctx: AppContext,
    Json(req): Json<SignupRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    validate_request(&req)?;
    let outcome = state
        .account_service
        .signup(&ctx.tenant, &req.email, &req.password, req.name)
        .await?;
    Ok(Json(ApiResponse::ok(outcome.into())))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    ctx: AppContext,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    validate_request(&req)?;
    let outcome = state
        .account_service
        .login(&ctx.tenant, &req.email, &req.password)
        .await?;
    Ok(Json(ApiResponse::ok(outcome.into())))
}

/// POST /auth/device
pub async fn device_login(
    State(state): State<AppState>,
    ctx: AppContext,
    Json(req): Json<DeviceLoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    validate_request(&req)?;
    let outcome = state
        .account_service
        .device_login(&ctx.tenant, &req.device_id)
        .await?;
    Ok(Json(ApiResponse::ok(outcome.into())))
}

/// POST /auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ctx: AppContext,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    validate_request(&req)?;
    let outcome = state
        .account_service
        .refresh(&ctx.tenant, &req.refresh_token)
        .await?;
    Ok(Json(ApiResponse::ok(outcome.into())))
}

/// GET /auth/session
pub async fn session(ctx: AppContext) -> Json<ApiResponse<SessionResponse>> {
    Json(ApiResponse::ok(SessionResponse::from(&*ctx)))
}

/// GET /auth/me
pub async fn me(
    State(state): State<AppState>,
    ctx: AppContext,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.account_service.me(&ctx)?;
    Ok(Json(ApiResponse::ok(user)))
}

/// POST /organizations/{org_id}/session
pub async fn organization_session(
    State(state): State<AppState>,
    ctx: AppContext,
    Path(org_id): Path<i64>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    let tokens = state
        .account_service
        .organization_session(&ctx, org_id)
        .await?;
    Ok(Json(ApiResponse::ok(tokens.into())))
}
