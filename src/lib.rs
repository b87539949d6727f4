// Waybill Library - Multi-Branch Courier Coordination
// This exposes the core components for testing and integration

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod manifest;
pub mod notify;
pub mod shipment;
pub mod store;
pub mod telemetry;
pub mod tenancy;

// Re-export key types for easy access
pub use auth::{Actor, Role, TokenClaims, UserId};
pub use config::{config, WaybillConfig};
pub use error::WaybillError;
pub use manifest::{DispatchRequest, Manifest, ManifestService, TransportMeta};
pub use notify::{Notifier, NotifyEvent, TracingNotifier};
pub use shipment::{
    DeliveryProof, ManifestId, ManifestStatus, NewShipment, PackageInfo, Party, ProofKind,
    Shipment, ShipmentService, ShipmentStatus, StatusChange, StatusEntry,
};
pub use store::{
    DocumentStore, ManifestFilter, MemoryStore, Page, PageRequest, ShipmentFilter, StoreError,
    WriteBatch,
};
pub use telemetry::{create_workflow_span, generate_correlation_id, init_telemetry};
pub use tenancy::{Branch, BranchId, NewBranch, NewStaff, StaffId, StaffMember, StaffRole, TenancyService};
