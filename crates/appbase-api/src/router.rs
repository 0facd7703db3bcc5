//! Route definitions for the Appbase HTTP API.
//!
//! Application routes are mounted under `/api/{api_version}`; each group is
//! wrapped in the authorization gate it needs via `route_layer`, so
//! unmatched paths still fall through to a plain 404.

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, patch, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and gates.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(tenant_routes(&state))
        .merge(optional_user_routes(&state))
        .merge(user_routes(&state))
        .merge(organization_routes(&state))
        .merge(admin_public_routes())
        .merge(admin_routes(&state));

    Router::new()
        .nest(&state.config.server.api_prefix(), api_routes)
        .route("/health", get(handlers::health::health))
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Tenant-only: account entry points.
fn tenant_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(handlers::auth::signup))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/device", post(handlers::auth::device_login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_tenant,
        ))
}

/// Tenant plus optional user.
fn optional_user_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/session", get(handlers::auth::session))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::optional_user,
        ))
}

/// Tenant plus required user.
fn user_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_user,
        ))
}

/// Organization CRUD, members, invitations. Tenant plus required user.
fn organization_routes(state: &AppState) -> Router<AppState> {
    use crate::handlers::organization as org;

    Router::new()
        .route(
            "/organizations",
            get(org::list_organizations).post(org::create_organization),
        )
        .route(
            "/organizations/invitations/accept",
            post(org::accept_invitation),
        )
        .route(
            "/organizations/{org_id}",
            get(org::get_organization)
                .patch(org::update_organization)
                .delete(org::delete_organization),
        )
        .route("/organizations/{org_id}/members", get(org::list_members))
        .route(
            "/organizations/{org_id}/members/{user_id}",
            patch(org::update_member_role).delete(org::remove_member),
        )
        .route(
            "/organizations/{org_id}/invitations",
            get(org::list_invitations).post(org::create_invitation),
        )
        .route(
            "/organizations/{org_id}/invitations/{invitation_id}",
            delete(org::revoke_invitation),
        )
        .route(
            "/organizations/{org_id}/session",
            post(handlers::auth::organization_session),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_user,
        ))
}

/// Admin sign-in and sign-out. No gate.
fn admin_public_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/auth/google", post(handlers::admin::google_login))
        .route("/admin/auth/logout", post(handlers::admin::logout))
}

/// Admin-only console endpoints.
fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/auth/me", get(handlers::admin::me))
        .route("/admin/apps", get(handlers::admin::list_apps))
        .route("/admin/apps/{id}", get(handlers::admin::get_app))
        .route(
            "/admin/apps/{id}/status",
            patch(handlers::admin::update_app_status),
        )
        .route("/admin/apps/{id}/users", get(handlers::admin::list_app_users))
        .route(
            "/admin/apps/{id}/users/{user_id}/token",
            post(handlers::admin::issue_user_tokens),
        )
        .route(
            "/admin/apps/{id}/organizations",
            get(handlers::admin::list_app_organizations),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_admin,
        ))
}
