use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Shipment lifecycle status.
///
/// ### Status Transition Diagram
/// ```text
/// +----------------+  dispatch   +------------------------+  receive   +---------------------+
/// | AtOriginBranch |------------>| InTransitToDestination |----------->| AtDestinationBranch |
/// +----------------+             +------------------------+            +---------------------+
///         |                                                                      |
///         | (local delivery: origin == destination)                              v
///         +------------------------------------------------------------->  +----------+
///                                                                          | Assigned |
///                                                                          +----------+
///                                                                           |    |   |
///                                                              +------------+    |   +------+
///                                                              v                 v          v
///                                                      +----------------+  +-----------+ +--------+
///                                                      | OutForDelivery |  | Delivered | | Failed |
///                                                      +----------------+  +-----------+ +--------+
///                                                              |                ^ ^          ^
///                                                              +----------------+ +----------+
///                                                                     (Terminal States)
/// ```
///
/// The order is strictly forward moving. Entering `InTransitToDestination` or
/// `AtDestinationBranch` happens only through manifest dispatch/receive, never
/// through a direct status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipmentStatus {
    AtOriginBranch,
    InTransitToDestination,
    AtDestinationBranch,
    Assigned,
    OutForDelivery,
    Delivered,
    Failed,
}

impl ShipmentStatus {
    /// Position in the canonical forward order. Both terminal states share the
    /// highest rank.
    pub fn rank(&self) -> u8 {
        match self {
            Self::AtOriginBranch => 0,
            Self::InTransitToDestination => 1,
            Self::AtDestinationBranch => 2,
            Self::Assigned => 3,
            Self::OutForDelivery => 4,
            Self::Delivered | Self::Failed => 5,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Failed)
    }

    /// Statuses a shipment may move to from this one.
    ///
    /// `AtOriginBranch -> Assigned` is listed here but additionally requires
    /// the shipment to be a local delivery; the service layer enforces that.
    pub fn allowed_next(&self) -> &'static [ShipmentStatus] {
        match self {
            Self::AtOriginBranch => &[Self::InTransitToDestination, Self::Assigned],
            Self::InTransitToDestination => &[Self::AtDestinationBranch],
            Self::AtDestinationBranch => &[Self::Assigned],
            Self::Assigned => &[Self::OutForDelivery, Self::Delivered, Self::Failed],
            Self::OutForDelivery => &[Self::Delivered, Self::Failed],
            Self::Delivered | Self::Failed => &[],
        }
    }

    pub fn can_transition_to(&self, to: ShipmentStatus) -> bool {
        self.allowed_next().contains(&to)
    }

    /// Statuses that are only ever entered via manifest dispatch/receive.
    pub fn requires_manifest(&self) -> bool {
        matches!(self, Self::InTransitToDestination | Self::AtDestinationBranch)
    }

    pub const ALL: [ShipmentStatus; 7] = [
        Self::AtOriginBranch,
        Self::InTransitToDestination,
        Self::AtDestinationBranch,
        Self::Assigned,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AtOriginBranch => "AtOriginBranch",
            Self::InTransitToDestination => "InTransitToDestination",
            Self::AtDestinationBranch => "AtDestinationBranch",
            Self::Assigned => "Assigned",
            Self::OutForDelivery => "OutForDelivery",
            Self::Delivered => "Delivered",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("unknown shipment status: {s}"))
    }
}

/// Manifest lifecycle status: a one-way transition, no cancellation modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManifestStatus {
    InTransit,
    Completed,
}

impl fmt::Display for ManifestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InTransit => f.write_str("InTransit"),
            Self::Completed => f.write_str("Completed"),
        }
    }
}
