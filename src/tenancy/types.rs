use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type BranchId = Uuid;
pub type StaffId = Uuid;

/// A branch office. Branches are the tenancy boundary: shipments, staff, and
/// manifests are partitioned by branch id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
    /// Short uppercase slug used to reference the branch from the CLI.
    pub code: String,
    pub address: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

/// Staff roles within a branch.
///
/// `Manager` and `Dispatcher` are admin roles; only managers may create other
/// admins. `DeliveryStaff` progress their own assigned shipments through
/// delivery or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaffRole {
    Manager,
    Dispatcher,
    DeliveryStaff,
}

impl StaffRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Manager | Self::Dispatcher)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => "Manager",
            Self::Dispatcher => "Dispatcher",
            Self::DeliveryStaff => "DeliveryStaff",
        }
    }
}

impl std::str::FromStr for StaffRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "manager" => Ok(Self::Manager),
            "dispatcher" => Ok(Self::Dispatcher),
            "deliverystaff" | "delivery-staff" | "staff" => Ok(Self::DeliveryStaff),
            other => Err(format!("unknown staff role: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: StaffId,
    pub name: String,
    pub branch_id: BranchId,
    pub role: StaffRole,
    pub phone: String,
    /// Deactivated staff keep their history but cannot receive assignments.
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for branch creation.
#[derive(Debug, Clone)]
pub struct NewBranch {
    pub name: String,
    pub code: String,
    pub address: String,
    pub phone: String,
}

/// Input for staff creation.
#[derive(Debug, Clone)]
pub struct NewStaff {
    pub name: String,
    pub branch_id: BranchId,
    pub role: StaffRole,
    pub phone: String,
}
