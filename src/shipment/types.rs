use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::UserId;
use crate::shipment::ShipmentStatus;
use crate::tenancy::{BranchId, StaffId};

pub type ManifestId = Uuid;

/// Tracking ids look like `WB-7KQ2M9XC`. The alphabet drops easily-confused
/// characters (0/O, 1/I/L) so the code survives being read over the phone.
const TRACKING_CHARSET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const TRACKING_SUFFIX_LEN: usize = 8;

pub fn generate_tracking_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..TRACKING_SUFFIX_LEN)
        .map(|_| TRACKING_CHARSET[rng.random_range(0..TRACKING_CHARSET.len())] as char)
        .collect();
    format!("WB-{suffix}")
}

/// A sender or recipient on a shipment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub address: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageInfo {
    pub description: String,
    pub weight_kg: f64,
    pub declared_value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofKind {
    Signature,
    Photo,
}

impl std::str::FromStr for ProofKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "signature" => Ok(Self::Signature),
            "photo" => Ok(Self::Photo),
            other => Err(format!("unknown proof kind: {other}")),
        }
    }
}

/// Proof of delivery captured at the `Delivered` transition. The url points
/// into the external upload service; the core only stores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryProof {
    pub kind: ProofKind,
    pub url: String,
}

/// One entry in a shipment's append-only audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: ShipmentStatus,
    pub at: DateTime<Utc>,
    pub notes: Option<String>,
    /// Set when the change happened through a manifest dispatch or receive.
    pub manifest_id: Option<ManifestId>,
    pub actor: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub tracking_id: String,
    pub sender: Party,
    pub recipient: Party,
    pub package: PackageInfo,
    pub origin_branch_id: BranchId,
    pub destination_branch_id: BranchId,
    /// Mutates as the shipment moves; stays at origin while in transit and
    /// flips to the destination on manifest receive.
    pub current_branch_id: BranchId,
    pub status: ShipmentStatus,
    pub assigned_to: Option<StaffId>,
    pub status_history: Vec<StatusEntry>,
    pub delivery_proof: Option<DeliveryProof>,
    pub failure_reason: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    /// Optimistic-concurrency guard; bumped by the store on every write.
    pub version: u64,
}

impl Shipment {
    /// A local delivery never travels on a manifest and may be assigned
    /// directly from `AtOriginBranch`.
    pub fn is_local(&self) -> bool {
        self.origin_branch_id == self.destination_branch_id
    }

    /// Apply a status change and append the matching audit entry. This is the
    /// only place the history grows; entries are never edited or removed.
    pub(crate) fn record_status(
        &mut self,
        status: ShipmentStatus,
        actor: UserId,
        notes: Option<String>,
        manifest_id: Option<ManifestId>,
    ) {
        self.status = status;
        self.status_history.push(StatusEntry {
            status,
            at: Utc::now(),
            notes,
            manifest_id,
            actor,
        });
    }
}

/// Input for shipment creation.
#[derive(Debug, Clone)]
pub struct NewShipment {
    pub sender: Party,
    pub recipient: Party,
    pub package: PackageInfo,
    pub origin_branch_id: BranchId,
    pub destination_branch_id: BranchId,
    /// Immediate assignee; only valid for local deliveries.
    pub assignee: Option<StaffId>,
    pub notes: Option<String>,
}

/// A requested status change with the per-target extras.
#[derive(Debug, Clone, Default)]
pub struct StatusChange {
    pub assignee: Option<StaffId>,
    pub notes: Option<String>,
    pub proof: Option<DeliveryProof>,
    pub failure_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_id_shape() {
        let id = generate_tracking_id();
        assert!(id.starts_with("WB-"));
        assert_eq!(id.len(), 3 + TRACKING_SUFFIX_LEN);
        assert!(id[3..]
            .bytes()
            .all(|b| TRACKING_CHARSET.contains(&b)));
    }

    #[test]
    fn test_tracking_id_avoids_ambiguous_characters() {
        for _ in 0..200 {
            let id = generate_tracking_id();
            for banned in ['0', 'O', '1', 'I', 'L'] {
                assert!(!id[3..].contains(banned), "{id} contains {banned}");
            }
        }
    }

    #[test]
    fn test_record_status_appends_matching_entry() {
        let branch = Uuid::new_v4();
        let user = Uuid::new_v4();
        let mut shipment = Shipment {
            tracking_id: "WB-TEST2345".to_string(),
            sender: Party {
                name: "Ada".to_string(),
                address: "12 Queen Street, Westhaven".to_string(),
                phone: "+44 20 7946 011".to_string(),
            },
            recipient: Party {
                name: "Grace".to_string(),
                address: "99 Harbour Road, Eastgate".to_string(),
                phone: "+44 20 7946 0858".to_string(),
            },
            package: PackageInfo {
                description: "documents".to_string(),
                weight_kg: 0.4,
                declared_value: None,
            },
            origin_branch_id: branch,
            destination_branch_id: branch,
            current_branch_id: branch,
            status: ShipmentStatus::AtOriginBranch,
            assigned_to: None,
            status_history: vec![],
            delivery_proof: None,
            failure_reason: None,
            created_by: user,
            created_at: Utc::now(),
            version: 0,
        };

        shipment.record_status(ShipmentStatus::AtOriginBranch, user, None, None);
        shipment.record_status(
            ShipmentStatus::Assigned,
            user,
            Some("local run".to_string()),
            None,
        );

        assert_eq!(shipment.status_history.len(), 2);
        assert_eq!(shipment.status, ShipmentStatus::Assigned);
        assert_eq!(
            shipment.status_history.last().unwrap().status,
            shipment.status
        );
    }
}
