//! Organization, membership, and invitation handlers.
//!
//! All routes here sit behind the tenant plus required user gate.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use appbase_entity::organization::{
    Organization, OrganizationInvitation, OrganizationMember, OrganizationMembership,
};

use crate::dto::request::{
    AcceptInvitationRequest, CreateInvitationRequest, CreateOrganizationRequest,
    UpdateMemberRoleRequest, UpdateOrganizationRequest,
};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::dto::validate_request;
use crate::error::ApiError;
use crate::extractors::AppContext;
use crate::state::AppState;

/// GET /organizations
pub async fn list_organizations(
    State(state): State<AppState>,
    ctx: AppContext,
) -> Result<Json<ApiResponse<Vec<OrganizationMembership>>>, ApiError> {
    let user = ctx.require_user()?;
    let orgs = state
        .organization_service
        .list_for_user(ctx.tenant_id(), user.id)
        .await?;
    Ok(Json(ApiResponse::ok(orgs)))
}

/// POST /organizations
pub async fn create_organization(
    State(state): State<AppState>,
    ctx: AppContext,
    Json(req): Json<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Organization>>), ApiError> {
    validate_request(&req)?;
    let user = ctx.require_user()?;
    let org = state
        .organization_service
        .create_organization(ctx.tenant_id(), user.id, &req.name, &req.slug, req.description)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(org))))
}

/// GET /organizations/{org_id}
pub async fn get_organization(
    State(state): State<AppState>,
    ctx: AppContext,
    Path(org_id): Path<i64>,
) -> Result<Json<ApiResponse<OrganizationMembership>>, ApiError> {
    let user = ctx.require_user()?;
    let org = state
        .organization_service
        .get(ctx.tenant_id(), user.id, org_id)
        .await?;
    Ok(Json(ApiResponse::ok(org)))
}

/// PATCH /organizations/{org_id}
pub async fn update_organization(
    State(state): State<AppState>,
    ctx: AppContext,
    Path(org_id): Path<i64>,
    Json(req): Json<UpdateOrganizationRequest>,
) -> Result<Json<ApiResponse<Organization>>, ApiError> {
    validate_request(&req)?;
    let user = ctx.require_user()?;
    let org = state
        .organization_service
        .update(ctx.tenant_id(), user.id, org_id, &req.into())
        .await?;
    Ok(Json(ApiResponse::ok(org)))
}

/// DELETE /organizations/{org_id}
pub async fn delete_organization(
    State(state): State<AppState>,
    ctx: AppContext,
    Path(org_id): Path<i64>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let user = ctx.require_user()?;
    state
        .organization_service
        .delete(ctx.tenant_id(), user.id, org_id)
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Organization deleted",
    ))))
}

/// GET /organizations/{org_id}/members
pub async fn list_members(
    State(state): State<AppState>,
    ctx: AppContext,
    Path(org_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<OrganizationMember>>>, ApiError> {
    let user = ctx.require_user()?;
    let members = state
        .organization_service
        .list_members(ctx.tenant_id(), user.id, org_id)
        .await?;
    Ok(Json(ApiResponse::ok(members)))
}

/// PATCH /organizations/{org_id}/members/{user_id}
pub async fn update_member_role(
    State(state): State<AppState>,
    ctx: AppContext,
    Path((org_id, member_id)): Path<(i64, i64)>,
    Json(req): Json<UpdateMemberRoleRequest>,
) -> Result<Json<ApiResponse<OrganizationMember>>, ApiError> {
    let user = ctx.require_user()?;
    let member = state
        .organization_service
        .update_member_role(ctx.tenant_id(), user.id, org_id, member_id, req.role)
        .await?;
    Ok(Json(ApiResponse::ok(member)))
}

/// DELETE /organizations/{org_id}/members/{user_id}
pub async fn remove_member(
    State(state): State<AppState>,
    ctx: AppContext,
    Path((org_id, member_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let user = ctx.require_user()?;
    state
        .organization_service
        .remove_member(ctx.tenant_id(), user.id, org_id, member_id)
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Member removed"))))
}

/// GET /organizations/{org_id}/invitations
pub async fn list_invitations(
    State(state): State<AppState>,
    ctx: AppContext,
    Path(org_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<OrganizationInvitation>>>, ApiError> {
    let user = ctx.require_user()?;
    let invitations = state
        .organization_service
        .list_invitations(ctx.tenant_id(), user.id, org_id)
        .await?;
    Ok(Json(ApiResponse::ok(invitations)))
}

/// POST /organizations/{org_id}/invitations
pub async fn create_invitation(
    State(state): State<AppState>,
    ctx: AppContext,
    Path(org_id): Path<i64>,
    Json(req): Json<CreateInvitationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrganizationInvitation>>), ApiError> {
    validate_request(&req)?;
    let user = ctx.require_user()?;
    let invitation = state
        .organization_service
        .create_invitation(ctx.tenant_id(), org_id, user.id, &req.email, req.role)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(invitation))))
}

/// DELETE /organizations/{org_id}/invitations/{invitation_id}
pub async fn revoke_invitation(
    State(state): State<AppState>,
    ctx: AppContext,
    Path((org_id, invitation_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<OrganizationInvitation>>, ApiError> {
    let user = ctx.require_user()?;
    let invitation = state
        .organization_service
        .revoke_invitation(ctx.tenant_id(), user.id, org_id, invitation_id)
        .await?;
    Ok(Json(ApiResponse::ok(invitation)))
}

/// POST /organizations/invitations/accept
pub async fn accept_invitation(
    State(state): State<AppState>,
    ctx: AppContext,
    Json(req): Json<AcceptInvitationRequest>,
) -> Result<Json<ApiResponse<Organization>>, ApiError> {
    validate_request(&req)?;
    let user = ctx.require_user()?;
    let org = state
        .organization_service
        .accept_invitation(ctx.tenant_id(), user.id, &req.token)
        .await?;
    Ok(Json(ApiResponse::ok(org)))
}
