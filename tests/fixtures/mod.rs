//! Shared world-building for the integration suites: two branches, staff on
//! each side, typed actors, and a notifier that records what it was asked to
//! send.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use waybill::auth::{Actor, Role};
use waybill::manifest::ManifestService;
use waybill::notify::{Notifier, NotifyEvent};
use waybill::shipment::{NewShipment, PackageInfo, Party, ShipmentService};
use waybill::store::MemoryStore;
use waybill::tenancy::{Branch, NewBranch, NewStaff, StaffId, StaffMember, StaffRole, TenancyService};

/// Notifier that records every event instead of sending anything.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<(StaffId, NotifyEvent)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, staff_id: StaffId, event: NotifyEvent) {
        self.events.lock().unwrap().push((staff_id, event));
    }
}

impl RecordingNotifier {
    pub fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

pub struct TestWorld {
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub shipments: ShipmentService,
    pub manifests: ManifestService,
    pub tenancy: TenancyService,

    pub root: Actor,
    pub branch_a: Branch,
    pub branch_b: Branch,
    pub dispatcher_a: Actor,
    pub dispatcher_b: Actor,
    pub manager_a: Actor,
    pub courier_a: StaffMember,
    pub courier_b: StaffMember,
}

impl TestWorld {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let shipments = ShipmentService::new(store.clone(), notifier.clone());
        let manifests = ManifestService::new(store.clone());
        let tenancy = TenancyService::new(store.clone());

        let root = Actor::new(Uuid::new_v4(), Uuid::nil(), Role::SuperAdmin);

        let branch_a = tenancy
            .create_branch(
                NewBranch {
                    name: "Westhaven".to_string(),
                    code: "WST".to_string(),
                    address: "1 Dock Lane, Westhaven".to_string(),
                    phone: "+44 20 7946 0100".to_string(),
                },
                &root,
            )
            .await
            .expect("branch A");
        let branch_b = tenancy
            .create_branch(
                NewBranch {
                    name: "Eastgate".to_string(),
                    code: "EST".to_string(),
                    address: "9 Harbour Road, Eastgate".to_string(),
                    phone: "+44 20 7946 0200".to_string(),
                },
                &root,
            )
            .await
            .expect("branch B");

        let dispatcher_a = Actor::new(Uuid::new_v4(), branch_a.id, Role::Dispatcher);
        let dispatcher_b = Actor::new(Uuid::new_v4(), branch_b.id, Role::Dispatcher);
        let manager_a = Actor::new(Uuid::new_v4(), branch_a.id, Role::BranchManager);

        let courier_a = tenancy
            .add_staff(
                NewStaff {
                    name: "Ada Lovelace".to_string(),
                    branch_id: branch_a.id,
                    role: StaffRole::DeliveryStaff,
                    phone: "+44 20 7946 0111".to_string(),
                },
                &dispatcher_a,
            )
            .await
            .expect("courier A");
        let courier_b = tenancy
            .add_staff(
                NewStaff {
                    name: "Grace Hopper".to_string(),
                    branch_id: branch_b.id,
                    role: StaffRole::DeliveryStaff,
                    phone: "+44 20 7946 0222".to_string(),
                },
                &dispatcher_b,
            )
            .await
            .expect("courier B");

        Self {
            store,
            notifier,
            shipments,
            manifests,
            tenancy,
            root,
            branch_a,
            branch_b,
            dispatcher_a,
            dispatcher_b,
            manager_a,
            courier_a,
            courier_b,
        }
    }

    /// Actor for a courier progressing their own assignments.
    pub fn courier_actor(&self, courier: &StaffMember) -> Actor {
        Actor::new(courier.id, courier.branch_id, Role::DeliveryStaff)
    }

    /// An inter-branch request from A to B (or local when both are A).
    pub fn shipment_request(&self, local: bool) -> NewShipment {
        NewShipment {
            sender: sample_party("Ada Lovelace"),
            recipient: sample_party("Grace Hopper"),
            package: PackageInfo {
                description: "machine parts".to_string(),
                weight_kg: 3.2,
                declared_value: Some(120.0),
            },
            origin_branch_id: self.branch_a.id,
            destination_branch_id: if local { self.branch_a.id } else { self.branch_b.id },
            assignee: None,
            notes: None,
        }
    }
}

pub fn sample_party(name: &str) -> Party {
    Party {
        name: name.to_string(),
        address: "12 Queen Street, Westhaven".to_string(),
        phone: "+44 20 7946 0112".to_string(),
    }
}
