//! Invitation lifecycle: PENDING to ACCEPTED, REVOKED or EXPIRED.

use chrono::Utc;
use rand::Rng;
use tracing::{info, instrument};

use appbase_core::AppError;
use appbase_core::result::AppResult;
use appbase_entity::organization::invitation::CreateInvitation;
use appbase_entity::organization::{
    InvitationStatus, OrgRole, Organization, OrganizationInvitation,
};

use super::service::{OrganizationService, finish};

impl OrganizationService {
    /// Issue a PENDING invitation with a random opaque token.
    ///
    /// Requires ADMIN; inviting someone as OWNER requires OWNER.
    #[instrument(skip(self, email))]
    pub async fn create_invitation(
        &self,
        tenant_id: i64,
        org_id: i64,
        inviter_id: i64,
        email: &str,
        role: OrgRole,
    ) -> AppResult<OrganizationInvitation> {
        self.scoped(tenant_id, org_id).await?;
        let inviter_role = self.require_admin(org_id, inviter_id).await?;
        if role.is_owner() && !inviter_role.is_owner() {
            return Err(AppError::forbidden("Only an owner can invite owners"));
        }
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::validation("A valid email address is required"));
        }

        let invitation = self
            .store
            .create_invitation(&CreateInvitation {
                organization_id: org_id,
                invited_by: inviter_id,
                email: email.to_string(),
                role,
                token: generate_token(self.invitation_token_bytes),
                expires_at: Utc::now() + self.invitation_ttl,
            })
            .await?;

        info!(invitation_id = invitation.id, "Invitation created");
        Ok(invitation)
    }

    /// All invitations of the organization. Requires ADMIN.
    pub async fn list_invitations(
        &self,
        tenant_id: i64,
        actor_id: i64,
        org_id: i64,
    ) -> AppResult<Vec<OrganizationInvitation>> {
        self.scoped(tenant_id, org_id).await?;
        self.require_admin(org_id, actor_id).await?;
        self.store.list_invitations(org_id).await
    }

    /// Redeem an invitation token for a membership.
    ///
    /// Unknown tokens, non-PENDING invitations and invitations of another
    /// tenant are all `NotFound`. A PENDING invitation past its deadline is
    /// moved to EXPIRED and reported as `Expired`. An existing member gets
    /// `Conflict` and the invitation stays PENDING. Otherwise the membership
    /// insert and the ACCEPTED transition commit together.
    #[instrument(skip(self, token))]
    pub async fn accept_invitation(
        &self,
        tenant_id: i64,
        user_id: i64,
        token: &str,
    ) -> AppResult<Organization> {
        let invitation = self
            .store
            .find_invitation_by_token(token)
            .await?
            .filter(|i| i.status.can_transition_to(InvitationStatus::Accepted))
            .ok_or_else(|| AppError::not_found("Invalid or expired invitation"))?;
        let organization = self.scoped(tenant_id, invitation.organization_id).await?;

        if invitation.is_expired_at(Utc::now()) {
            self.store
                .resolve_pending_invitation(invitation.id, InvitationStatus::Expired)
                .await?;
            info!(invitation_id = invitation.id, "Invitation expired");
            return Err(AppError::expired("Invitation has expired"));
        }

        if self
            .store
            .find_member(organization.id, user_id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(
                "User is already a member of this organization",
            ));
        }

        let mut tx = self.store.begin().await?;
        let result = async {
            tx.insert_member(organization.id, user_id, invitation.role)
                .await?;
            if !tx.accept_invitation(invitation.id).await? {
                return Err(AppError::not_found("Invalid or expired invitation"));
            }
            Ok::<(), AppError>(())
        }
        .await;

        finish(tx, result).await?;

        info!(
            invitation_id = invitation.id,
            org_id = organization.id,
            role = %invitation.role,
            "Invitation accepted"
        );
        Ok(organization)
    }

    /// Withdraw a PENDING invitation. Requires ADMIN.
    #[instrument(skip(self))]
    pub async fn revoke_invitation(
        &self,
        tenant_id: i64,
        actor_id: i64,
        org_id: i64,
        invitation_id: i64,
    ) -> AppResult<OrganizationInvitation> {
        self.scoped(tenant_id, org_id).await?;
        self.require_admin(org_id, actor_id).await?;
        let invitation = self
            .store
            .find_invitation(org_id, invitation_id)
            .await?
            .ok_or_else(|| AppError::not_found("Invitation not found"))?;
        if !invitation.status.can_transition_to(InvitationStatus::Revoked) {
            return Err(AppError::conflict(format!(
                "Invitation is already {}",
                invitation.status
            )));
        }

        let revoked = self
            .store
            .resolve_pending_invitation(invitation.id, InvitationStatus::Revoked)
            .await?
            .ok_or_else(|| AppError::conflict("Invitation is no longer pending"))?;
        info!("Invitation revoked");
        Ok(revoked)
    }
}

/// Hex encoding of `bytes` random bytes.
fn generate_token(bytes: usize) -> String {
    let mut raw = vec![0u8; bytes];
    rand::rng().fill_bytes(&mut raw);
    hex::encode(raw)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use super::*;
    use appbase_core::config::OrganizationConfig;
    use appbase_core::error::ErrorKind;
    use appbase_database::MemoryStore;
    use appbase_database::store::{OrganizationStore, TenantStore, UserStore};
    use appbase_entity::tenant::model::CreateTenant;
    use appbase_entity::user::model::CreateUser;

    /// Store, engine, tenant id and three user ids.
    pub(crate) async fn engine() -> (MemoryStore, OrganizationService, i64, Vec<i64>) {
        let store = MemoryStore::new();
        let tenant = store
            .create_tenant(&CreateTenant {
                name: "Demo".into(),
                slug: "demo".into(),
                api_key: "key-demo".into(),
                allowed_origins: vec![],
            })
            .await
            .unwrap();
        let mut users = Vec::new();
        for i in 0..3 {
            let user = store
                .create_user(&CreateUser {
                    email: Some(format!("user{i}@example.com")),
                    device_id: Some(format!("dev-{i}")),
                    ..Default::default()
                })
                .await
                .unwrap();
            users.push(user.id);
        }
        let service = OrganizationService::new(
            Arc::new(store.clone()),
            &OrganizationConfig::default(),
        );
        (store, service, tenant.id, users)
    }

    async fn org_with_invitation(
        role: OrgRole,
    ) -> (MemoryStore, OrganizationService, i64, Vec<i64>, Organization, OrganizationInvitation)
    {
        let (store, service, tenant, users) = engine().await;
        let org = service
            .create_organization(tenant, users[0], "Acme", "acme", None)
            .await
            .unwrap();
        let invitation = service
            .create_invitation(tenant, org.id, users[0], "user1@example.com", role)
            .await
            .unwrap();
        (store, service, tenant, users, org, invitation)
    }

    #[test]
    fn test_generate_token_is_hex_of_requested_length() {
        let token = generate_token(32);
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(generate_token(32), token);
    }

    #[tokio::test]
    async fn test_invitation_defaults() {
        let (_, _, _, _, _, invitation) = org_with_invitation(OrgRole::Admin).await;
        assert_eq!(invitation.status, InvitationStatus::Pending);
        assert_eq!(invitation.token.len(), 64);
        let ttl = invitation.expires_at - invitation.created_at;
        assert!((ttl - chrono::Duration::days(7)).num_seconds().abs() <= 1);
    }

    #[tokio::test]
    async fn test_accept_creates_membership_once() {
        let (store, service, tenant, users, org, invitation) =
            org_with_invitation(OrgRole::Admin).await;

        let joined = service
            .accept_invitation(tenant, users[1], &invitation.token)
            .await
            .unwrap();
        assert_eq!(joined.id, org.id);

        let member = store.find_member(org.id, users[1]).await.unwrap().unwrap();
        assert_eq!(member.role, OrgRole::Admin);
        let stored = store
            .find_invitation_by_token(&invitation.token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, InvitationStatus::Accepted);
        assert!(stored.accepted_at.is_some());

        let err = service
            .accept_invitation(tenant, users[2], &invitation.token)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
        assert_eq!(store.member_count().await, 2);
    }

    #[tokio::test]
    async fn test_expired_invitation_transitions_and_fails() {
        let (store, service, tenant, users) = engine().await;
        let org = service
            .create_organization(tenant, users[0], "Acme", "acme", None)
            .await
            .unwrap();
        let invitation = store
            .create_invitation(&CreateInvitation {
                organization_id: org.id,
                invited_by: users[0],
                email: "late@example.com".into(),
                role: OrgRole::Member,
                token: "stale".into(),
                expires_at: Utc::now() - chrono::Duration::minutes(1),
            })
            .await
            .unwrap();

        let err = service
            .accept_invitation(tenant, users[1], "stale")
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Expired));

        let stored = store
            .find_invitation(org.id, invitation.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, InvitationStatus::Expired);
        assert!(store.find_member(org.id, users[1]).await.unwrap().is_none());

        let err = service
            .accept_invitation(tenant, users[1], "stale")
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_existing_member_conflicts_and_invitation_stays_pending() {
        let (store, service, tenant, users, org, invitation) =
            org_with_invitation(OrgRole::Member).await;

        let err = service
            .accept_invitation(tenant, users[0], &invitation.token)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Conflict));
        let stored = store
            .find_invitation(org.id, invitation.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, InvitationStatus::Pending);
    }

    #[tokio::test]
    async fn test_failed_member_insert_leaves_invitation_pending() {
        let (store, service, tenant, users, org, invitation) =
            org_with_invitation(OrgRole::Member).await;
        store.fail_next_member_insert();

        assert!(
            service
                .accept_invitation(tenant, users[1], &invitation.token)
                .await
                .is_err()
        );
        let stored = store
            .find_invitation(org.id, invitation.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, InvitationStatus::Pending);
        assert!(store.find_member(org.id, users[1]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revoke_is_admin_only_and_terminal() {
        let (store, service, tenant, users, org, invitation) =
            org_with_invitation(OrgRole::Member).await;

        let err = service
            .revoke_invitation(tenant, users[1], org.id, invitation.id)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Forbidden));

        let revoked = service
            .revoke_invitation(tenant, users[0], org.id, invitation.id)
            .await
            .unwrap();
        assert_eq!(revoked.status, InvitationStatus::Revoked);

        let err = service
            .revoke_invitation(tenant, users[0], org.id, invitation.id)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Conflict));
        let err = service
            .accept_invitation(tenant, users[1], &invitation.token)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
        assert!(store.find_member(org.id, users[1]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_non_admin_cannot_invite() {
        let (_, service, tenant, users, org, invitation) =
            org_with_invitation(OrgRole::Member).await;
        service
            .accept_invitation(tenant, users[1], &invitation.token)
            .await
            .unwrap();

        let err = service
            .create_invitation(tenant, org.id, users[1], "x@example.com", OrgRole::Member)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Forbidden));
    }
}
