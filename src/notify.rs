//! Fire-and-forget notification side channel. The core only needs a one-way
//! `notify` call with no return contract; transport (push, service worker) is
//! someone else's problem.

use async_trait::async_trait;

use crate::tenancy::StaffId;

#[derive(Debug, Clone)]
pub enum NotifyEvent {
    ShipmentAssigned {
        tracking_id: String,
        notes: Option<String>,
    },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// One-way call. Implementations must not fail the calling workflow;
    /// delivery problems are logged and dropped.
    async fn notify(&self, staff_id: StaffId, event: NotifyEvent);
}

/// Default notifier: emits the event as a structured log line.
#[derive(Debug, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, staff_id: StaffId, event: NotifyEvent) {
        match event {
            NotifyEvent::ShipmentAssigned { tracking_id, notes } => {
                tracing::info!(
                    staff.id = %staff_id,
                    tracking.id = %tracking_id,
                    notes = notes.as_deref().unwrap_or(""),
                    "shipment assigned"
                );
            }
        }
    }
}
