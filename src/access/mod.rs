//! Role-scoped visibility and authorization gating.
//!
//! This module is the decision core shared by every resource type. It answers
//! who may see which rows and who may perform which mutations, reconciling
//! the legacy single-teacher-per-division model with the many-to-many
//! assignment table, and parent access with guardianship mappings.
//!
//! - [`identity`]: the authenticated actor ([`Identity`], [`Role`])
//! - [`store`]: record-store seam ([`AccessStore`]) and its Postgres impl
//! - [`assignments`]: teacher assignment resolution and legacy merge
//! - [`guardians`]: parent/student guardianship resolution
//! - [`status`]: approval lifecycle for moderated resources
//! - [`policy`]: the decision engine ([`AccessPolicy`]) and scope filters
//!
//! All components are stateless per request; scopes are recomputed from
//! current records on every call and never cached across requests.

pub mod assignments;
pub mod guardians;
pub mod identity;
pub mod policy;
pub mod status;
pub mod store;

pub use assignments::{AssignmentResolver, AssignmentType, ClassAssignment};
pub use guardians::{GuardianLink, GuardianResolver};
pub use identity::{Identity, Role};
pub use policy::{
    AccessPolicy, Decision, DenyReason, ListScope, Operation, ResourceDescriptor, ResourceKind,
    ScopeFilter, VisibilityScope, initial_status,
};
pub use status::ApprovalStatus;
pub use store::{AccessStore, PgAccessStore, StoreError};
