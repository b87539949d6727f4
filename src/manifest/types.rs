use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shipment::{ManifestId, ManifestStatus};
use crate::tenancy::BranchId;

/// Optional transport details recorded at dispatch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransportMeta {
    pub vehicle_number: Option<String>,
    pub driver_name: Option<String>,
    pub notes: Option<String>,
}

/// A transport batch of shipments moving between two branches.
///
/// Manifests model inter-branch transfer only: `from_branch_id` and
/// `to_branch_id` always differ, and every listed shipment shares the
/// manifest's destination at dispatch time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub id: ManifestId,
    pub from_branch_id: BranchId,
    pub to_branch_id: BranchId,
    pub shipment_ids: Vec<String>,
    pub status: ManifestStatus,
    pub transport: TransportMeta,
    pub dispatched_at: DateTime<Utc>,
    pub received_at: Option<DateTime<Utc>>,
    /// Optimistic-concurrency guard; bumped by the store on every write.
    pub version: u64,
}

impl Manifest {
    pub fn new(
        from_branch_id: BranchId,
        to_branch_id: BranchId,
        shipment_ids: Vec<String>,
        transport: TransportMeta,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            from_branch_id,
            to_branch_id,
            shipment_ids,
            status: ManifestStatus::InTransit,
            transport,
            dispatched_at: Utc::now(),
            received_at: None,
            version: 0,
        }
    }
}

/// Input for manifest dispatch.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub from_branch_id: BranchId,
    pub to_branch_id: BranchId,
    pub tracking_ids: Vec<String>,
    pub transport: TransportMeta,
}
