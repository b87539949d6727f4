//! Manifest dispatch and receive: batching shipments for inter-branch
//! transport and reconciling them atomically on both ends.
//!
//! Both operations re-check their preconditions at commit time through version
//! guards, so two dispatchers racing for the same shipment produce one
//! manifest and one conflict, never a double-claimed shipment.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::auth::Actor;
use crate::error::WaybillError;
use crate::manifest::types::{DispatchRequest, Manifest};
use crate::shipment::{ManifestId, ManifestStatus, Shipment, ShipmentStatus};
use crate::store::{
    DocumentStore, ManifestFilter, Page, PageRequest, ShipmentFilter, StoreError, WriteBatch,
};
use crate::tenancy::BranchId;

pub struct ManifestService {
    store: Arc<dyn DocumentStore>,
}

impl ManifestService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Shipments at `branch_id` that are ready to travel to
    /// `destination_branch_id` and are not already claimed by an open
    /// manifest. Read-only and paginated.
    pub async fn list_available(
        &self,
        branch_id: BranchId,
        destination_branch_id: BranchId,
        page: PageRequest,
        actor: &Actor,
    ) -> Result<Page<Shipment>, WaybillError> {
        if !actor.can_operate_branch(branch_id) {
            return Err(WaybillError::forbidden(
                "availability listing is scoped to the actor's own branch",
            ));
        }
        let claimed = self.claimed_tracking_ids().await?;
        let filter = ShipmentFilter {
            current_branch_id: Some(branch_id),
            destination_branch_id: Some(destination_branch_id),
            status: Some(ShipmentStatus::AtOriginBranch),
            ..Default::default()
        };
        let available: Vec<Shipment> = self
            .store
            .list_shipments(&filter)
            .await?
            .into_iter()
            .filter(|shipment| !claimed.contains(&shipment.tracking_id))
            .collect();
        Ok(Page::slice(available, page))
    }

    /// Create a manifest and move every included shipment into transit, all or
    /// nothing.
    pub async fn dispatch(
        &self,
        req: DispatchRequest,
        actor: &Actor,
    ) -> Result<Manifest, WaybillError> {
        if req.from_branch_id == req.to_branch_id {
            return Err(WaybillError::validation(
                "manifests model inter-branch transfer; origin and destination must differ",
            ));
        }
        if req.tracking_ids.is_empty() {
            return Err(WaybillError::validation(
                "a manifest needs at least one shipment",
            ));
        }
        let unique: HashSet<&String> = req.tracking_ids.iter().collect();
        if unique.len() != req.tracking_ids.len() {
            return Err(WaybillError::validation(
                "duplicate tracking ids in dispatch request",
            ));
        }
        if !actor.can_operate_branch(req.from_branch_id) {
            return Err(WaybillError::forbidden(
                "dispatch is scoped to the origin branch's admins",
            ));
        }
        if self.store.get_branch(req.to_branch_id).await?.is_none() {
            return Err(WaybillError::not_found("branch", req.to_branch_id));
        }

        // Re-check availability at dispatch time; the listing the caller saw
        // may be stale.
        let claimed = self.claimed_tracking_ids().await?;
        let mut shipments = Vec::with_capacity(req.tracking_ids.len());
        for tracking_id in &req.tracking_ids {
            let shipment = self
                .store
                .get_shipment(tracking_id)
                .await?
                .ok_or_else(|| WaybillError::not_found("shipment", tracking_id))?;
            if shipment.destination_branch_id != req.to_branch_id {
                return Err(WaybillError::validation(format!(
                    "shipment {tracking_id} is destined for a different branch"
                )));
            }
            if shipment.current_branch_id != req.from_branch_id
                || shipment.status != ShipmentStatus::AtOriginBranch
            {
                return Err(WaybillError::conflict(format!(
                    "shipment {tracking_id} is not available for dispatch"
                )));
            }
            if claimed.contains(tracking_id) {
                return Err(WaybillError::conflict(format!(
                    "shipment {tracking_id} is already on an open manifest"
                )));
            }
            shipments.push(shipment);
        }

        let manifest = Manifest::new(
            req.from_branch_id,
            req.to_branch_id,
            req.tracking_ids.clone(),
            req.transport,
        );

        let mut batch = WriteBatch::new().insert_manifest(manifest.clone());
        for mut shipment in shipments {
            let expected_version = shipment.version;
            shipment.record_status(
                ShipmentStatus::InTransitToDestination,
                actor.user_id,
                None,
                Some(manifest.id),
            );
            batch = batch.update_shipment(shipment, expected_version);
        }
        self.store.commit(batch).await.map_err(map_race)?;

        info!(
            manifest.id = %manifest.id,
            from.branch = %manifest.from_branch_id,
            to.branch = %manifest.to_branch_id,
            shipments = manifest.shipment_ids.len(),
            "manifest dispatched"
        );
        Ok(manifest)
    }

    /// Close a manifest on arrival and hand its shipments to the destination
    /// branch. A second receive fails rather than re-applying side effects.
    pub async fn receive(
        &self,
        manifest_id: ManifestId,
        actor: &Actor,
    ) -> Result<Manifest, WaybillError> {
        let mut manifest = self.get(manifest_id).await?;
        if manifest.status == ManifestStatus::Completed {
            return Err(WaybillError::AlreadyCompleted(manifest_id));
        }
        if !actor.can_operate_branch(manifest.to_branch_id) {
            return Err(WaybillError::forbidden(
                "only the destination branch can receive a manifest",
            ));
        }

        let mut updates = Vec::with_capacity(manifest.shipment_ids.len());
        for tracking_id in &manifest.shipment_ids {
            let shipment = self
                .store
                .get_shipment(tracking_id)
                .await?
                .ok_or_else(|| WaybillError::not_found("shipment", tracking_id))?;
            if shipment.status != ShipmentStatus::InTransitToDestination {
                return Err(WaybillError::conflict(format!(
                    "shipment {tracking_id} is not in transit on this manifest"
                )));
            }
            updates.push(shipment);
        }

        let manifest_version = manifest.version;
        manifest.status = ManifestStatus::Completed;
        manifest.received_at = Some(Utc::now());

        let mut batch = WriteBatch::new().update_manifest(manifest.clone(), manifest_version);
        for mut shipment in updates {
            let expected_version = shipment.version;
            shipment.current_branch_id = manifest.to_branch_id;
            shipment.record_status(
                ShipmentStatus::AtDestinationBranch,
                actor.user_id,
                None,
                Some(manifest.id),
            );
            batch = batch.update_shipment(shipment, expected_version);
        }
        self.store.commit(batch).await.map_err(map_race)?;
        manifest.version = manifest_version + 1;

        info!(
            manifest.id = %manifest.id,
            to.branch = %manifest.to_branch_id,
            shipments = manifest.shipment_ids.len(),
            "manifest received"
        );
        Ok(manifest)
    }

    pub async fn get(&self, manifest_id: ManifestId) -> Result<Manifest, WaybillError> {
        self.store
            .get_manifest(manifest_id)
            .await?
            .ok_or_else(|| WaybillError::not_found("manifest", manifest_id))
    }

    pub async fn list(
        &self,
        filter: &ManifestFilter,
        page: PageRequest,
    ) -> Result<Page<Manifest>, WaybillError> {
        let manifests = self.store.list_manifests(filter).await?;
        Ok(Page::slice(manifests, page))
    }

    /// Tracking ids referenced by any open manifest.
    async fn claimed_tracking_ids(&self) -> Result<HashSet<String>, WaybillError> {
        let open = self
            .store
            .list_manifests(&ManifestFilter {
                status: Some(ManifestStatus::InTransit),
                ..Default::default()
            })
            .await?;
        Ok(open
            .into_iter()
            .flat_map(|manifest| manifest.shipment_ids)
            .collect())
    }
}

fn map_race(err: StoreError) -> WaybillError {
    match err {
        StoreError::VersionConflict(id) => WaybillError::conflict(format!(
            "shipment {id} was claimed concurrently; the operation was rolled back"
        )),
        other => other.into(),
    }
}
