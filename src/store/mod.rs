//! Persistence interface: a document store with per-entity reads and a
//! conditional multi-document write batch.
//!
//! The batch is the transaction surface. Dispatch, receive, and branch cascade
//! delete each build one [`WriteBatch`] of version-guarded writes and commit it
//! in a single call; an implementation applies all of it or none of it.

pub mod memory;
pub mod snapshot;

use async_trait::async_trait;
use thiserror::Error;

use crate::manifest::Manifest;
use crate::shipment::{ManifestId, Shipment, ShipmentStatus};
use crate::tenancy::{Branch, BranchId, StaffId, StaffMember};

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("version conflict on {0}")]
    VersionConflict(String),

    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// One conditional write inside a batch.
///
/// `expected_version: None` means insert (the key must not exist yet);
/// `Some(v)` means the stored document must still be at version `v`. The store
/// bumps the document version on apply.
#[derive(Debug)]
pub enum Write {
    PutShipment {
        doc: Shipment,
        expected_version: Option<u64>,
    },
    DeleteShipment {
        tracking_id: String,
    },
    PutManifest {
        doc: Manifest,
        expected_version: Option<u64>,
    },
    PutBranch {
        doc: Branch,
    },
    DeleteBranch {
        id: BranchId,
    },
    PutStaff {
        doc: StaffMember,
    },
    DeleteStaff {
        id: StaffId,
    },
}

#[derive(Debug, Default)]
pub struct WriteBatch {
    writes: Vec<Write>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, write: Write) -> &mut Self {
        self.writes.push(write);
        self
    }

    pub fn insert_shipment(mut self, doc: Shipment) -> Self {
        self.writes.push(Write::PutShipment {
            doc,
            expected_version: None,
        });
        self
    }

    pub fn update_shipment(mut self, doc: Shipment, expected_version: u64) -> Self {
        self.writes.push(Write::PutShipment {
            doc,
            expected_version: Some(expected_version),
        });
        self
    }

    pub fn delete_shipment(mut self, tracking_id: impl Into<String>) -> Self {
        self.writes.push(Write::DeleteShipment {
            tracking_id: tracking_id.into(),
        });
        self
    }

    pub fn insert_manifest(mut self, doc: Manifest) -> Self {
        self.writes.push(Write::PutManifest {
            doc,
            expected_version: None,
        });
        self
    }

    pub fn update_manifest(mut self, doc: Manifest, expected_version: u64) -> Self {
        self.writes.push(Write::PutManifest {
            doc,
            expected_version: Some(expected_version),
        });
        self
    }

    pub fn insert_branch(mut self, doc: Branch) -> Self {
        self.writes.push(Write::PutBranch { doc });
        self
    }

    pub fn delete_branch(mut self, id: BranchId) -> Self {
        self.writes.push(Write::DeleteBranch { id });
        self
    }

    pub fn put_staff(mut self, doc: StaffMember) -> Self {
        self.writes.push(Write::PutStaff { doc });
        self
    }

    pub fn delete_staff(mut self, id: StaffId) -> Self {
        self.writes.push(Write::DeleteStaff { id });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub(crate) fn into_writes(self) -> Vec<Write> {
        self.writes
    }
}

/// Filter for shipment listings. `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct ShipmentFilter {
    pub current_branch_id: Option<BranchId>,
    pub origin_branch_id: Option<BranchId>,
    pub destination_branch_id: Option<BranchId>,
    pub status: Option<ShipmentStatus>,
    pub assigned_to: Option<StaffId>,
}

impl ShipmentFilter {
    pub fn matches(&self, shipment: &Shipment) -> bool {
        self.current_branch_id
            .map_or(true, |id| shipment.current_branch_id == id)
            && self
                .origin_branch_id
                .map_or(true, |id| shipment.origin_branch_id == id)
            && self
                .destination_branch_id
                .map_or(true, |id| shipment.destination_branch_id == id)
            && self.status.map_or(true, |s| shipment.status == s)
            && self
                .assigned_to
                .map_or(true, |id| shipment.assigned_to == Some(id))
    }
}

/// Filter for manifest listings.
#[derive(Debug, Clone, Default)]
pub struct ManifestFilter {
    pub from_branch_id: Option<BranchId>,
    pub to_branch_id: Option<BranchId>,
    pub status: Option<crate::shipment::ManifestStatus>,
}

impl ManifestFilter {
    pub fn matches(&self, manifest: &Manifest) -> bool {
        self.from_branch_id
            .map_or(true, |id| manifest.from_branch_id == id)
            && self
                .to_branch_id
                .map_or(true, |id| manifest.to_branch_id == id)
            && self.status.map_or(true, |s| manifest.status == s)
    }
}

/// A page request. Pages are 1-based; `per_page` comes from config when the
/// caller has no preference.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    /// Slice an already-filtered listing into one page.
    pub fn slice(mut items: Vec<T>, request: PageRequest) -> Self {
        let total = items.len();
        let start = ((request.page - 1) as usize).saturating_mul(request.per_page as usize);
        let end = total.min(start.saturating_add(request.per_page as usize));
        let items = if start >= total {
            Vec::new()
        } else {
            items.drain(start..end).collect()
        };
        Self {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
        }
    }
}

/// The document store consumed by the workflow services.
///
/// Reads are plain lookups; every mutation goes through [`commit`] so that
/// multi-document invariants hold under concurrent requests.
///
/// [`commit`]: DocumentStore::commit
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_branch(&self, id: BranchId) -> Result<Option<Branch>, StoreError>;
    async fn find_branch_by_code(&self, code: &str) -> Result<Option<Branch>, StoreError>;
    async fn list_branches(&self) -> Result<Vec<Branch>, StoreError>;

    async fn get_staff(&self, id: StaffId) -> Result<Option<StaffMember>, StoreError>;
    async fn list_staff(&self, branch_id: Option<BranchId>) -> Result<Vec<StaffMember>, StoreError>;

    async fn get_shipment(&self, tracking_id: &str) -> Result<Option<Shipment>, StoreError>;
    async fn list_shipments(&self, filter: &ShipmentFilter) -> Result<Vec<Shipment>, StoreError>;

    async fn get_manifest(&self, id: ManifestId) -> Result<Option<Manifest>, StoreError>;
    async fn list_manifests(&self, filter: &ManifestFilter) -> Result<Vec<Manifest>, StoreError>;

    /// Apply every write in the batch, or none of them. Version guards that no
    /// longer hold surface as [`StoreError::VersionConflict`].
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_slice_bounds() {
        let items: Vec<u32> = (1..=7).collect();
        let page = Page::slice(items.clone(), PageRequest::new(1, 3));
        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.total, 7);

        let page = Page::slice(items.clone(), PageRequest::new(3, 3));
        assert_eq!(page.items, vec![7]);

        let page = Page::slice(items, PageRequest::new(4, 3));
        assert!(page.items.is_empty());
        assert_eq!(page.total, 7);
    }

    #[test]
    fn test_page_request_floors_at_one() {
        let request = PageRequest::new(0, 0);
        assert_eq!(request.page, 1);
        assert_eq!(request.per_page, 1);
    }
}
