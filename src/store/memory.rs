//! In-memory document store. The write batch validates every guard under one
//! write lock before applying anything, so a commit is all-or-nothing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::manifest::Manifest;
use crate::shipment::{ManifestId, Shipment};
use crate::store::{
    DocumentStore, ManifestFilter, ShipmentFilter, StoreError, Write, WriteBatch,
};
use crate::tenancy::{Branch, BranchId, StaffId, StaffMember};
use async_trait::async_trait;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreState {
    branches: HashMap<BranchId, Branch>,
    staff: HashMap<StaffId, StaffMember>,
    shipments: HashMap<String, Shipment>,
    manifests: HashMap<ManifestId, Manifest>,
}

/// Serializable snapshot of the full store, used by the JSON persistence layer.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub branches: Vec<Branch>,
    pub staff: Vec<StaffMember>,
    pub shipments: Vec<Shipment>,
    pub manifests: Vec<Manifest>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let state = StoreState {
            branches: snapshot
                .branches
                .into_iter()
                .map(|branch| (branch.id, branch))
                .collect(),
            staff: snapshot
                .staff
                .into_iter()
                .map(|member| (member.id, member))
                .collect(),
            shipments: snapshot
                .shipments
                .into_iter()
                .map(|shipment| (shipment.tracking_id.clone(), shipment))
                .collect(),
            manifests: snapshot
                .manifests
                .into_iter()
                .map(|manifest| (manifest.id, manifest))
                .collect(),
        };
        Self {
            state: RwLock::new(state),
        }
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.read().await;
        StoreSnapshot {
            branches: state.branches.values().cloned().collect(),
            staff: state.staff.values().cloned().collect(),
            shipments: state.shipments.values().cloned().collect(),
            manifests: state.manifests.values().cloned().collect(),
        }
    }
}

impl StoreState {
    /// Phase 1: check every guard against current state without mutating.
    fn validate(&self, writes: &[Write]) -> Result<(), StoreError> {
        for write in writes {
            match write {
                Write::PutShipment {
                    doc,
                    expected_version,
                } => match (self.shipments.get(&doc.tracking_id), expected_version) {
                    (Some(_), None) => {
                        return Err(StoreError::DuplicateKey(doc.tracking_id.clone()))
                    }
                    (None, Some(_)) => return Err(StoreError::NotFound(doc.tracking_id.clone())),
                    (Some(current), Some(expected)) if current.version != *expected => {
                        return Err(StoreError::VersionConflict(doc.tracking_id.clone()))
                    }
                    _ => {}
                },
                Write::DeleteShipment { tracking_id } => {
                    if !self.shipments.contains_key(tracking_id) {
                        return Err(StoreError::NotFound(tracking_id.clone()));
                    }
                }
                Write::PutManifest {
                    doc,
                    expected_version,
                } => match (self.manifests.get(&doc.id), expected_version) {
                    (Some(_), None) => return Err(StoreError::DuplicateKey(doc.id.to_string())),
                    (None, Some(_)) => return Err(StoreError::NotFound(doc.id.to_string())),
                    (Some(current), Some(expected)) if current.version != *expected => {
                        return Err(StoreError::VersionConflict(doc.id.to_string()))
                    }
                    _ => {}
                },
                Write::PutBranch { doc } => {
                    if self.branches.contains_key(&doc.id) {
                        return Err(StoreError::DuplicateKey(doc.id.to_string()));
                    }
                    if self
                        .branches
                        .values()
                        .any(|existing| existing.code == doc.code)
                    {
                        return Err(StoreError::DuplicateKey(doc.code.clone()));
                    }
                }
                Write::DeleteBranch { id } => {
                    if !self.branches.contains_key(id) {
                        return Err(StoreError::NotFound(id.to_string()));
                    }
                }
                // Staff puts are upserts; creation vs update is a service
                // concern.
                Write::PutStaff { .. } => {}
                Write::DeleteStaff { id } => {
                    if !self.staff.contains_key(id) {
                        return Err(StoreError::NotFound(id.to_string()));
                    }
                }
            }
        }
        Ok(())
    }

    /// Phase 2: apply. Guards were validated; version bumps happen here.
    fn apply(&mut self, writes: Vec<Write>) {
        for write in writes {
            match write {
                Write::PutShipment {
                    mut doc,
                    expected_version,
                } => {
                    doc.version = expected_version.map_or(0, |v| v + 1);
                    self.shipments.insert(doc.tracking_id.clone(), doc);
                }
                Write::DeleteShipment { tracking_id } => {
                    self.shipments.remove(&tracking_id);
                }
                Write::PutManifest {
                    mut doc,
                    expected_version,
                } => {
                    doc.version = expected_version.map_or(0, |v| v + 1);
                    self.manifests.insert(doc.id, doc);
                }
                Write::PutBranch { doc } => {
                    self.branches.insert(doc.id, doc);
                }
                Write::DeleteBranch { id } => {
                    self.branches.remove(&id);
                }
                Write::PutStaff { doc } => {
                    self.staff.insert(doc.id, doc);
                }
                Write::DeleteStaff { id } => {
                    self.staff.remove(&id);
                }
            }
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_branch(&self, id: BranchId) -> Result<Option<Branch>, StoreError> {
        Ok(self.state.read().await.branches.get(&id).cloned())
    }

    async fn find_branch_by_code(&self, code: &str) -> Result<Option<Branch>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .branches
            .values()
            .find(|branch| branch.code.eq_ignore_ascii_case(code))
            .cloned())
    }

    async fn list_branches(&self) -> Result<Vec<Branch>, StoreError> {
        let mut branches: Vec<Branch> = self.state.read().await.branches.values().cloned().collect();
        branches.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(branches)
    }

    async fn get_staff(&self, id: StaffId) -> Result<Option<StaffMember>, StoreError> {
        Ok(self.state.read().await.staff.get(&id).cloned())
    }

    async fn list_staff(
        &self,
        branch_id: Option<BranchId>,
    ) -> Result<Vec<StaffMember>, StoreError> {
        let mut staff: Vec<StaffMember> = self
            .state
            .read()
            .await
            .staff
            .values()
            .filter(|member| branch_id.map_or(true, |id| member.branch_id == id))
            .cloned()
            .collect();
        staff.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(staff)
    }

    async fn get_shipment(&self, tracking_id: &str) -> Result<Option<Shipment>, StoreError> {
        Ok(self.state.read().await.shipments.get(tracking_id).cloned())
    }

    async fn list_shipments(&self, filter: &ShipmentFilter) -> Result<Vec<Shipment>, StoreError> {
        let mut shipments: Vec<Shipment> = self
            .state
            .read()
            .await
            .shipments
            .values()
            .filter(|shipment| filter.matches(shipment))
            .cloned()
            .collect();
        shipments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(shipments)
    }

    async fn get_manifest(&self, id: ManifestId) -> Result<Option<Manifest>, StoreError> {
        Ok(self.state.read().await.manifests.get(&id).cloned())
    }

    async fn list_manifests(&self, filter: &ManifestFilter) -> Result<Vec<Manifest>, StoreError> {
        let mut manifests: Vec<Manifest> = self
            .state
            .read()
            .await
            .manifests
            .values()
            .filter(|manifest| filter.matches(manifest))
            .cloned()
            .collect();
        manifests.sort_by(|a, b| a.dispatched_at.cmp(&b.dispatched_at));
        Ok(manifests)
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let writes = batch.into_writes();
        let mut state = self.state.write().await;
        state.validate(&writes)?;
        state.apply(writes);
        Ok(())
    }
}
