pub mod service;
pub mod types;

pub use service::TenancyService;
pub use types::{Branch, BranchId, NewBranch, NewStaff, StaffId, StaffMember, StaffRole};
