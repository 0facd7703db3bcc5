//! Organization, membership, and invitation entities.

pub mod invitation;
pub mod member;
pub mod model;
pub mod role;

pub use invitation::{InvitationStatus, OrganizationInvitation};
pub use member::OrganizationMember;
pub use model::{Organization, OrganizationMembership, OrganizationSummary};
pub use role::OrgRole;
