//! Shipment workflow: creation, status progression, assignment, deletion.
//!
//! Every mutation revalidates authority server-side, runs the central
//! transition table, appends exactly one audit entry, and writes through a
//! version-guarded commit so concurrent updates surface as conflicts instead
//! of lost writes.

use std::sync::Arc;

use tracing::info;

use crate::auth::Actor;
use crate::error::WaybillError;
use crate::notify::{Notifier, NotifyEvent};
use crate::shipment::types::{generate_tracking_id, NewShipment, Shipment, StatusChange};
use crate::shipment::validation::validate_new_shipment;
use crate::shipment::ShipmentStatus;
use crate::store::{DocumentStore, Page, PageRequest, ShipmentFilter, StoreError, WriteBatch};
use crate::tenancy::{StaffId, StaffMember};

const TRACKING_ID_ATTEMPTS: usize = 5;

pub struct ShipmentService {
    store: Arc<dyn DocumentStore>,
    notifier: Arc<dyn Notifier>,
}

impl ShipmentService {
    pub fn new(store: Arc<dyn DocumentStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Create a shipment at its origin branch.
    ///
    /// Local deliveries (origin == destination) may carry an immediate
    /// assignee; the assignment runs as a second transition so the audit trail
    /// shows `AtOriginBranch` then `Assigned`.
    pub async fn create(&self, req: NewShipment, actor: &Actor) -> Result<Shipment, WaybillError> {
        if actor.is_delivery_staff() {
            return Err(WaybillError::forbidden(
                "delivery staff cannot create shipments",
            ));
        }
        if !actor.can_operate_branch(req.origin_branch_id) {
            return Err(WaybillError::forbidden(
                "shipments are created at the actor's own branch",
            ));
        }
        validate_new_shipment(&req)?;

        if self.store.get_branch(req.origin_branch_id).await?.is_none() {
            return Err(WaybillError::validation("origin branch does not exist"));
        }
        if self
            .store
            .get_branch(req.destination_branch_id)
            .await?
            .is_none()
        {
            return Err(WaybillError::validation(
                "destination branch does not exist",
            ));
        }

        let is_local = req.origin_branch_id == req.destination_branch_id;
        if req.assignee.is_some() && !is_local {
            return Err(WaybillError::validation(
                "only local deliveries can be assigned at creation",
            ));
        }
        // Resolve the assignee before writing anything so a bad staff id
        // leaves no half-created shipment behind.
        let assignee = match req.assignee {
            Some(staff_id) => Some(
                self.resolve_assignee(staff_id, req.origin_branch_id)
                    .await?,
            ),
            None => None,
        };

        let tracking_id = self.fresh_tracking_id().await?;
        let mut shipment = Shipment {
            tracking_id: tracking_id.clone(),
            sender: req.sender,
            recipient: req.recipient,
            package: req.package,
            origin_branch_id: req.origin_branch_id,
            destination_branch_id: req.destination_branch_id,
            current_branch_id: req.origin_branch_id,
            status: ShipmentStatus::AtOriginBranch,
            assigned_to: None,
            status_history: Vec::new(),
            delivery_proof: None,
            failure_reason: None,
            created_by: actor.user_id,
            created_at: chrono::Utc::now(),
            version: 0,
        };
        shipment.record_status(
            ShipmentStatus::AtOriginBranch,
            actor.user_id,
            req.notes.clone(),
            None,
        );

        self.store
            .commit(WriteBatch::new().insert_shipment(shipment.clone()))
            .await?;
        info!(
            tracking.id = %shipment.tracking_id,
            origin.branch = %shipment.origin_branch_id,
            destination.branch = %shipment.destination_branch_id,
            local = is_local,
            "shipment created"
        );

        if let Some(staff) = assignee {
            let change = StatusChange {
                assignee: Some(staff.id),
                ..Default::default()
            };
            shipment = self
                .update_status(&tracking_id, ShipmentStatus::Assigned, change, actor)
                .await?;
        }
        Ok(shipment)
    }

    pub async fn get(&self, tracking_id: &str) -> Result<Shipment, WaybillError> {
        self.store
            .get_shipment(tracking_id)
            .await?
            .ok_or_else(|| WaybillError::not_found("shipment", tracking_id))
    }

    pub async fn list(
        &self,
        filter: &ShipmentFilter,
        page: PageRequest,
    ) -> Result<Page<Shipment>, WaybillError> {
        let shipments = self.store.list_shipments(filter).await?;
        Ok(Page::slice(shipments, page))
    }

    /// Assign a shipment to a staff member of its current branch.
    pub async fn assign(
        &self,
        tracking_id: &str,
        staff_id: StaffId,
        notes: Option<String>,
        actor: &Actor,
    ) -> Result<Shipment, WaybillError> {
        let change = StatusChange {
            assignee: Some(staff_id),
            notes,
            ..Default::default()
        };
        self.update_status(tracking_id, ShipmentStatus::Assigned, change, actor)
            .await
    }

    /// Apply one status transition with its side effects.
    ///
    /// Transitions into the manifest-only statuses are rejected here; those
    /// move exclusively through manifest dispatch and receive.
    pub async fn update_status(
        &self,
        tracking_id: &str,
        new_status: ShipmentStatus,
        change: StatusChange,
        actor: &Actor,
    ) -> Result<Shipment, WaybillError> {
        let mut shipment = self.get(tracking_id).await?;
        let from = shipment.status;

        self.authorize_status_change(&shipment, new_status, actor)?;

        if new_status.requires_manifest() {
            return Err(WaybillError::InvalidTransition {
                from,
                to: new_status,
            });
        }
        if !from.can_transition_to(new_status) {
            return Err(WaybillError::InvalidTransition {
                from,
                to: new_status,
            });
        }

        let mut notify_assignee: Option<StaffId> = None;
        match new_status {
            ShipmentStatus::Assigned => {
                // Direct assignment from the origin is the local-delivery
                // shortcut; inter-branch shipments must travel first.
                if from == ShipmentStatus::AtOriginBranch && !shipment.is_local() {
                    return Err(WaybillError::InvalidTransition {
                        from,
                        to: new_status,
                    });
                }
                let staff_id = change
                    .assignee
                    .ok_or_else(|| WaybillError::validation("assignment requires a staff id"))?;
                let staff = self
                    .resolve_assignee(staff_id, shipment.current_branch_id)
                    .await?;
                shipment.assigned_to = Some(staff.id);
                notify_assignee = Some(staff.id);
            }
            ShipmentStatus::OutForDelivery => {}
            ShipmentStatus::Delivered => {
                let proof = change.proof.clone().ok_or_else(|| {
                    WaybillError::validation("delivery requires proof (signature or photo)")
                })?;
                shipment.delivery_proof = Some(proof);
            }
            ShipmentStatus::Failed => {
                let reason = change
                    .failure_reason
                    .clone()
                    .filter(|reason| !reason.trim().is_empty())
                    .ok_or_else(|| {
                        WaybillError::validation("failure requires a non-empty reason")
                    })?;
                shipment.failure_reason = Some(reason);
            }
            // Already rejected by the manifest guard and the transition
            // table; kept explicit so the match stays exhaustive.
            ShipmentStatus::AtOriginBranch
            | ShipmentStatus::InTransitToDestination
            | ShipmentStatus::AtDestinationBranch => {
                return Err(WaybillError::InvalidTransition {
                    from,
                    to: new_status,
                })
            }
        }

        let expected_version = shipment.version;
        shipment.record_status(new_status, actor.user_id, change.notes.clone(), None);
        self.store
            .commit(WriteBatch::new().update_shipment(shipment.clone(), expected_version))
            .await
            .map_err(|err| match err {
                StoreError::VersionConflict(id) => WaybillError::conflict(format!(
                    "shipment {id} was modified concurrently; please retry"
                )),
                other => other.into(),
            })?;
        shipment.version = expected_version + 1;

        info!(
            tracking.id = %shipment.tracking_id,
            from = %from,
            to = %new_status,
            actor.id = %actor.user_id,
            "shipment status updated"
        );

        if let Some(staff_id) = notify_assignee {
            self.notifier
                .notify(
                    staff_id,
                    NotifyEvent::ShipmentAssigned {
                        tracking_id: shipment.tracking_id.clone(),
                        notes: change.notes,
                    },
                )
                .await;
        }
        Ok(shipment)
    }

    /// Delete a shipment. Restricted to the origin-branch creator.
    pub async fn delete(&self, tracking_id: &str, actor: &Actor) -> Result<(), WaybillError> {
        let shipment = self.get(tracking_id).await?;
        let is_origin_creator = actor.user_id == shipment.created_by
            && actor.branch_id == shipment.origin_branch_id;
        if !(actor.is_super_admin() || is_origin_creator) {
            return Err(WaybillError::forbidden(
                "only the origin-branch creator can delete a shipment",
            ));
        }
        if shipment.status == ShipmentStatus::InTransitToDestination {
            return Err(WaybillError::conflict(
                "shipment is travelling on a manifest and cannot be deleted",
            ));
        }
        self.store
            .commit(WriteBatch::new().delete_shipment(tracking_id))
            .await?;
        info!(tracking.id = %tracking_id, actor.id = %actor.user_id, "shipment deleted");
        Ok(())
    }

    /// Who may change this shipment: the origin-branch creator, current-branch
    /// admins, or the assigned courier moving it through delivery states.
    fn authorize_status_change(
        &self,
        shipment: &Shipment,
        new_status: ShipmentStatus,
        actor: &Actor,
    ) -> Result<(), WaybillError> {
        if actor.is_super_admin() {
            return Ok(());
        }
        if actor.is_delivery_staff() {
            // A courier's user id is their staff id.
            if shipment.assigned_to != Some(actor.user_id) {
                return Err(WaybillError::forbidden(
                    "delivery staff may only progress their own assigned shipments",
                ));
            }
            if !matches!(
                new_status,
                ShipmentStatus::OutForDelivery
                    | ShipmentStatus::Delivered
                    | ShipmentStatus::Failed
            ) {
                return Err(WaybillError::forbidden(
                    "delivery staff may only progress shipments through delivery",
                ));
            }
            return Ok(());
        }
        let is_origin_creator = actor.user_id == shipment.created_by
            && actor.branch_id == shipment.origin_branch_id;
        let is_custodian = actor.can_operate_branch(shipment.current_branch_id);
        if is_origin_creator || is_custodian {
            Ok(())
        } else {
            Err(WaybillError::forbidden(
                "actor belongs to neither the origin nor the current branch",
            ))
        }
    }

    async fn resolve_assignee(
        &self,
        staff_id: StaffId,
        branch_id: crate::tenancy::BranchId,
    ) -> Result<StaffMember, WaybillError> {
        let staff = self
            .store
            .get_staff(staff_id)
            .await?
            .ok_or_else(|| WaybillError::not_found("staff member", staff_id))?;
        if !staff.active {
            return Err(WaybillError::validation(format!(
                "staff member {} is deactivated",
                staff.name
            )));
        }
        if staff.branch_id != branch_id {
            return Err(WaybillError::validation(format!(
                "staff member {} does not belong to the shipment's current branch",
                staff.name
            )));
        }
        Ok(staff)
    }

    async fn fresh_tracking_id(&self) -> Result<String, WaybillError> {
        for _ in 0..TRACKING_ID_ATTEMPTS {
            let candidate = generate_tracking_id();
            if self.store.get_shipment(&candidate).await?.is_none() {
                return Ok(candidate);
            }
        }
        Err(WaybillError::conflict(
            "could not generate a unique tracking id",
        ))
    }
}
