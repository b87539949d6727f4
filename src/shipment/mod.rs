pub mod service;
pub mod status;
pub mod types;
pub mod validation;

pub use service::ShipmentService;
pub use status::{ManifestStatus, ShipmentStatus};
pub use types::{
    generate_tracking_id, DeliveryProof, ManifestId, NewShipment, PackageInfo, Party, ProofKind,
    Shipment, StatusChange, StatusEntry,
};
