//! Branch and staff administration. Branch deletion cascades through a single
//! write batch so a failure partway never leaves orphaned shipments or staff.

use std::sync::LazyLock;
use std::sync::Arc;

use chrono::Utc;
use regex::Regex;
use tracing::info;
use uuid::Uuid;

use crate::auth::Actor;
use crate::error::WaybillError;
use crate::shipment::validation::validate_phone;
use crate::shipment::ManifestStatus;
use crate::store::{DocumentStore, ManifestFilter, ShipmentFilter, WriteBatch};
use crate::tenancy::types::{Branch, BranchId, NewBranch, NewStaff, StaffId, StaffMember};

static BRANCH_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{2,6}$").expect("valid branch code regex"));

pub struct TenancyService {
    store: Arc<dyn DocumentStore>,
}

impl TenancyService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create_branch(
        &self,
        req: NewBranch,
        actor: &Actor,
    ) -> Result<Branch, WaybillError> {
        if !actor.can_manage_branches() {
            return Err(WaybillError::forbidden(
                "branch administration requires the super admin",
            ));
        }
        let code = req.code.trim().to_ascii_uppercase();
        if !BRANCH_CODE_PATTERN.is_match(&code) {
            return Err(WaybillError::validation(
                "branch code must be 2-6 uppercase letters or digits",
            ));
        }
        if req.name.trim().len() < 2 {
            return Err(WaybillError::validation("branch name is too short"));
        }
        if req.address.trim().len() < 5 {
            return Err(WaybillError::validation("branch address is too short"));
        }
        validate_phone("branch", &req.phone)?;
        if self.store.find_branch_by_code(&code).await?.is_some() {
            return Err(WaybillError::conflict(format!(
                "branch code {code} is already in use"
            )));
        }

        let branch = Branch {
            id: Uuid::new_v4(),
            name: req.name.trim().to_string(),
            code,
            address: req.address.trim().to_string(),
            phone: req.phone.trim().to_string(),
            created_at: Utc::now(),
        };
        self.store
            .commit(WriteBatch::new().insert_branch(branch.clone()))
            .await?;
        info!(branch.id = %branch.id, branch.code = %branch.code, "branch created");
        Ok(branch)
    }

    pub async fn get_branch(&self, id: BranchId) -> Result<Branch, WaybillError> {
        self.store
            .get_branch(id)
            .await?
            .ok_or_else(|| WaybillError::not_found("branch", id))
    }

    pub async fn find_branch_by_code(&self, code: &str) -> Result<Branch, WaybillError> {
        self.store
            .find_branch_by_code(code)
            .await?
            .ok_or_else(|| WaybillError::not_found("branch", code))
    }

    pub async fn list_branches(&self) -> Result<Vec<Branch>, WaybillError> {
        Ok(self.store.list_branches().await?)
    }

    /// Remove a branch and cascade its staff and shipments in one
    /// all-or-nothing commit. Refused while any open manifest still involves
    /// the branch.
    pub async fn delete_branch(&self, id: BranchId, actor: &Actor) -> Result<(), WaybillError> {
        if !actor.can_manage_branches() {
            return Err(WaybillError::forbidden(
                "branch administration requires the super admin",
            ));
        }
        let branch = self.get_branch(id).await?;

        let open_manifests = self
            .store
            .list_manifests(&ManifestFilter {
                status: Some(ManifestStatus::InTransit),
                ..Default::default()
            })
            .await?;
        if open_manifests
            .iter()
            .any(|manifest| manifest.from_branch_id == id || manifest.to_branch_id == id)
        {
            return Err(WaybillError::conflict(
                "branch has shipments travelling on an open manifest",
            ));
        }

        let staff = self.store.list_staff(Some(id)).await?;
        let mut shipments = self
            .store
            .list_shipments(&ShipmentFilter {
                origin_branch_id: Some(id),
                ..Default::default()
            })
            .await?;
        let inbound = self
            .store
            .list_shipments(&ShipmentFilter {
                destination_branch_id: Some(id),
                ..Default::default()
            })
            .await?;
        for shipment in inbound {
            if shipment.origin_branch_id != id {
                shipments.push(shipment);
            }
        }

        let mut batch = WriteBatch::new();
        for member in &staff {
            batch.push(crate::store::Write::DeleteStaff { id: member.id });
        }
        for shipment in &shipments {
            batch.push(crate::store::Write::DeleteShipment {
                tracking_id: shipment.tracking_id.clone(),
            });
        }
        batch.push(crate::store::Write::DeleteBranch { id });
        self.store.commit(batch).await?;

        info!(
            branch.id = %id,
            branch.code = %branch.code,
            staff = staff.len(),
            shipments = shipments.len(),
            "branch deleted with cascade"
        );
        Ok(())
    }

    pub async fn add_staff(&self, req: NewStaff, actor: &Actor) -> Result<StaffMember, WaybillError> {
        let branch = self.get_branch(req.branch_id).await?;
        if req.role.is_admin() {
            if !actor.can_create_admins() {
                return Err(WaybillError::forbidden(
                    "creating admin staff requires a branch manager",
                ));
            }
            if !actor.is_super_admin() && actor.branch_id != branch.id {
                return Err(WaybillError::forbidden(
                    "admins are created within the manager's own branch",
                ));
            }
        } else if !actor.can_operate_branch(branch.id) {
            return Err(WaybillError::forbidden(
                "staff are created within the actor's own branch",
            ));
        }
        if req.name.trim().len() < 2 {
            return Err(WaybillError::validation("staff name is too short"));
        }
        validate_phone("staff", &req.phone)?;

        let member = StaffMember {
            id: Uuid::new_v4(),
            name: req.name.trim().to_string(),
            branch_id: branch.id,
            role: req.role,
            phone: req.phone.trim().to_string(),
            active: true,
            created_at: Utc::now(),
        };
        self.store
            .commit(WriteBatch::new().put_staff(member.clone()))
            .await?;
        info!(
            staff.id = %member.id,
            branch.code = %branch.code,
            role = member.role.as_str(),
            "staff member added"
        );
        Ok(member)
    }

    pub async fn get_staff(&self, id: StaffId) -> Result<StaffMember, WaybillError> {
        self.store
            .get_staff(id)
            .await?
            .ok_or_else(|| WaybillError::not_found("staff member", id))
    }

    pub async fn list_staff(
        &self,
        branch_id: Option<BranchId>,
    ) -> Result<Vec<StaffMember>, WaybillError> {
        Ok(self.store.list_staff(branch_id).await?)
    }

    /// Soft-remove: the member keeps their history but can no longer be
    /// assigned shipments.
    pub async fn deactivate_staff(&self, id: StaffId, actor: &Actor) -> Result<(), WaybillError> {
        let mut member = self.get_staff(id).await?;
        if !actor.can_operate_branch(member.branch_id) {
            return Err(WaybillError::forbidden(
                "staff are managed within their own branch",
            ));
        }
        member.active = false;
        self.store
            .commit(WriteBatch::new().put_staff(member.clone()))
            .await?;
        info!(staff.id = %id, "staff member deactivated");
        Ok(())
    }
}
