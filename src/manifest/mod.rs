pub mod service;
pub mod types;

pub use service::ManifestService;
pub use types::{DispatchRequest, Manifest, TransportMeta};
