//! Authorization policy: typed capability checks evaluated once per request.
//!
//! The external token verifier hands us raw claims. We resolve them into an
//! [`Actor`] with an explicit [`Role`] up front, and every mutating service
//! operation re-validates against that actor. Roles are never inferred from
//! optional fields at point of use.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::WaybillError;
use crate::tenancy::BranchId;

pub type UserId = Uuid;

/// Verified session payload from the external identity service. Trusted as
/// given; see `Actor::from_claims` for the role resolution rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub user_id: UserId,
    pub branch_id: BranchId,
    pub role: String,
    #[serde(default)]
    pub is_manager: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Cross-branch administrator.
    SuperAdmin,
    /// A branch's top admin; full branch control including creating admins.
    BranchManager,
    /// Admin without manager rights; runs shipments, manifests, and staff
    /// assignment day to day.
    Dispatcher,
    /// Mobile-oriented courier; may only progress their own assigned
    /// shipments through delivery or failure.
    DeliveryStaff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "SuperAdmin",
            Self::BranchManager => "BranchManager",
            Self::Dispatcher => "Dispatcher",
            Self::DeliveryStaff => "DeliveryStaff",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolved caller for one request.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: UserId,
    pub branch_id: BranchId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: UserId, branch_id: BranchId, role: Role) -> Self {
        Self {
            user_id,
            branch_id,
            role,
        }
    }

    /// Resolve raw token claims into a typed actor.
    ///
    /// `role == "admin"` splits on `is_manager`: managers become
    /// [`Role::BranchManager`], the rest [`Role::Dispatcher`]. Unknown role
    /// strings are rejected rather than defaulted.
    pub fn from_claims(claims: &TokenClaims) -> Result<Self, WaybillError> {
        let role = match claims.role.to_ascii_lowercase().as_str() {
            "superadmin" => Role::SuperAdmin,
            "admin" if claims.is_manager => Role::BranchManager,
            "admin" => Role::Dispatcher,
            "staff" => Role::DeliveryStaff,
            other => {
                return Err(WaybillError::validation(format!(
                    "unknown role in token claims: {other}"
                )))
            }
        };
        Ok(Self::new(claims.user_id, claims.branch_id, role))
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    /// Branch lifecycle (create/delete) is cross-branch administration.
    pub fn can_manage_branches(&self) -> bool {
        self.is_super_admin()
    }

    /// Only branch managers (and above) may create admin-role staff.
    pub fn can_create_admins(&self) -> bool {
        matches!(self.role, Role::SuperAdmin | Role::BranchManager)
    }

    /// Whether the actor may run day-to-day operations (shipments, manifests,
    /// staff assignment) for the given branch.
    pub fn can_operate_branch(&self, branch_id: BranchId) -> bool {
        match self.role {
            Role::SuperAdmin => true,
            Role::BranchManager | Role::Dispatcher => self.branch_id == branch_id,
            Role::DeliveryStaff => false,
        }
    }

    pub fn is_delivery_staff(&self) -> bool {
        self.role == Role::DeliveryStaff
    }
}
