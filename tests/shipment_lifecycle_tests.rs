//! Shipment lifecycle tests
//!
//! These walk shipments through the full inter-branch and local-delivery
//! flows and pin down the audit-trail guarantees:
//! - status history only grows and its last entry matches the current status
//! - terminal states require proof/reason and accept no further changes
//! - transitions that skip dispatch/receive are rejected

mod fixtures;

use fixtures::TestWorld;
use waybill::error::WaybillError;
use waybill::shipment::{DeliveryProof, ProofKind, ShipmentStatus, StatusChange};

fn photo_proof() -> DeliveryProof {
    DeliveryProof {
        kind: ProofKind::Photo,
        url: "https://uploads.example/proofs/abc123.jpg".to_string(),
    }
}

#[tokio::test]
async fn test_inter_branch_end_to_end_flow() {
    let world = TestWorld::new().await;

    // Branch A creates a shipment for branch B.
    let shipment = world
        .shipments
        .create(world.shipment_request(false), &world.dispatcher_a)
        .await
        .unwrap();
    assert_eq!(shipment.status, ShipmentStatus::AtOriginBranch);
    assert_eq!(shipment.current_branch_id, world.branch_a.id);

    // A dispatches a manifest carrying it to B.
    let manifest = world
        .manifests
        .dispatch(
            waybill::manifest::DispatchRequest {
                from_branch_id: world.branch_a.id,
                to_branch_id: world.branch_b.id,
                tracking_ids: vec![shipment.tracking_id.clone()],
                transport: Default::default(),
            },
            &world.dispatcher_a,
        )
        .await
        .unwrap();

    let in_transit = world.shipments.get(&shipment.tracking_id).await.unwrap();
    assert_eq!(in_transit.status, ShipmentStatus::InTransitToDestination);
    // Custody stays with the origin until the destination receives.
    assert_eq!(in_transit.current_branch_id, world.branch_a.id);

    // B receives the manifest.
    world
        .manifests
        .receive(manifest.id, &world.dispatcher_b)
        .await
        .unwrap();
    let arrived = world.shipments.get(&shipment.tracking_id).await.unwrap();
    assert_eq!(arrived.status, ShipmentStatus::AtDestinationBranch);
    assert_eq!(arrived.current_branch_id, world.branch_b.id);

    // B assigns its courier, who delivers with photo proof.
    world
        .shipments
        .assign(
            &shipment.tracking_id,
            world.courier_b.id,
            None,
            &world.dispatcher_b,
        )
        .await
        .unwrap();
    let courier = world.courier_actor(&world.courier_b);
    let delivered = world
        .shipments
        .update_status(
            &shipment.tracking_id,
            ShipmentStatus::Delivered,
            StatusChange {
                proof: Some(photo_proof()),
                ..Default::default()
            },
            &courier,
        )
        .await
        .unwrap();

    assert_eq!(delivered.status, ShipmentStatus::Delivered);
    assert!(delivered.delivery_proof.is_some());
    assert_eq!(delivered.status_history.len(), 5);
    assert_eq!(
        delivered.status_history.last().unwrap().status,
        ShipmentStatus::Delivered
    );
    // Dispatch and receive entries reference the manifest.
    assert_eq!(delivered.status_history[1].manifest_id, Some(manifest.id));
    assert_eq!(delivered.status_history[2].manifest_id, Some(manifest.id));
}

#[tokio::test]
async fn test_local_delivery_assigned_at_creation() {
    let world = TestWorld::new().await;

    let mut req = world.shipment_request(true);
    req.assignee = Some(world.courier_a.id);
    let shipment = world
        .shipments
        .create(req, &world.dispatcher_a)
        .await
        .unwrap();

    assert_eq!(shipment.status, ShipmentStatus::Assigned);
    assert_eq!(shipment.assigned_to, Some(world.courier_a.id));
    // Exactly two entries: AtOriginBranch, then Assigned.
    assert_eq!(shipment.status_history.len(), 2);
    assert_eq!(
        shipment.status_history[0].status,
        ShipmentStatus::AtOriginBranch
    );
    assert_eq!(shipment.status_history[1].status, ShipmentStatus::Assigned);
    // The assignment notification fired.
    assert_eq!(world.notifier.count(), 1);
}

#[tokio::test]
async fn test_assignee_on_inter_branch_creation_rejected() {
    let world = TestWorld::new().await;
    let mut req = world.shipment_request(false);
    req.assignee = Some(world.courier_a.id);
    let result = world.shipments.create(req, &world.dispatcher_a).await;
    assert!(matches!(result, Err(WaybillError::Validation(_))));
}

#[tokio::test]
async fn test_delivery_without_proof_rejected() {
    let world = TestWorld::new().await;
    let mut req = world.shipment_request(true);
    req.assignee = Some(world.courier_a.id);
    let shipment = world
        .shipments
        .create(req, &world.dispatcher_a)
        .await
        .unwrap();

    let courier = world.courier_actor(&world.courier_a);
    let result = world
        .shipments
        .update_status(
            &shipment.tracking_id,
            ShipmentStatus::Delivered,
            StatusChange::default(),
            &courier,
        )
        .await;
    assert!(matches!(result, Err(WaybillError::Validation(_))));
}

#[tokio::test]
async fn test_failure_requires_nonempty_reason() {
    let world = TestWorld::new().await;
    let mut req = world.shipment_request(true);
    req.assignee = Some(world.courier_a.id);
    let shipment = world
        .shipments
        .create(req, &world.dispatcher_a)
        .await
        .unwrap();

    let courier = world.courier_actor(&world.courier_a);
    let result = world
        .shipments
        .update_status(
            &shipment.tracking_id,
            ShipmentStatus::Failed,
            StatusChange {
                failure_reason: Some("   ".to_string()),
                ..Default::default()
            },
            &courier,
        )
        .await;
    assert!(matches!(result, Err(WaybillError::Validation(_))));

    let failed = world
        .shipments
        .update_status(
            &shipment.tracking_id,
            ShipmentStatus::Failed,
            StatusChange {
                failure_reason: Some("recipient moved away".to_string()),
                ..Default::default()
            },
            &courier,
        )
        .await
        .unwrap();
    assert_eq!(failed.status, ShipmentStatus::Failed);
    assert_eq!(
        failed.failure_reason.as_deref(),
        Some("recipient moved away")
    );
}

#[tokio::test]
async fn test_terminal_states_are_final() {
    let world = TestWorld::new().await;
    let mut req = world.shipment_request(true);
    req.assignee = Some(world.courier_a.id);
    let shipment = world
        .shipments
        .create(req, &world.dispatcher_a)
        .await
        .unwrap();

    let courier = world.courier_actor(&world.courier_a);
    world
        .shipments
        .update_status(
            &shipment.tracking_id,
            ShipmentStatus::Delivered,
            StatusChange {
                proof: Some(photo_proof()),
                ..Default::default()
            },
            &courier,
        )
        .await
        .unwrap();

    // Nothing moves a delivered shipment, not even the super admin.
    for next in [
        ShipmentStatus::Assigned,
        ShipmentStatus::OutForDelivery,
        ShipmentStatus::Failed,
    ] {
        let result = world
            .shipments
            .update_status(
                &shipment.tracking_id,
                next,
                StatusChange {
                    assignee: Some(world.courier_a.id),
                    failure_reason: Some("no".to_string()),
                    ..Default::default()
                },
                &world.root,
            )
            .await;
        assert!(
            matches!(result, Err(WaybillError::InvalidTransition { .. })),
            "expected terminal rejection for {next}"
        );
    }
}

#[tokio::test]
async fn test_direct_transit_transitions_rejected() {
    let world = TestWorld::new().await;
    let shipment = world
        .shipments
        .create(world.shipment_request(false), &world.dispatcher_a)
        .await
        .unwrap();

    // Transit states only move via manifest operations.
    for target in [
        ShipmentStatus::InTransitToDestination,
        ShipmentStatus::AtDestinationBranch,
    ] {
        let result = world
            .shipments
            .update_status(
                &shipment.tracking_id,
                target,
                StatusChange::default(),
                &world.dispatcher_a,
            )
            .await;
        assert!(
            matches!(result, Err(WaybillError::InvalidTransition { .. })),
            "expected rejection for direct move to {target}"
        );
    }
}

#[tokio::test]
async fn test_inter_branch_shipment_cannot_be_assigned_at_origin() {
    let world = TestWorld::new().await;
    let shipment = world
        .shipments
        .create(world.shipment_request(false), &world.dispatcher_a)
        .await
        .unwrap();

    let result = world
        .shipments
        .assign(
            &shipment.tracking_id,
            world.courier_a.id,
            None,
            &world.dispatcher_a,
        )
        .await;
    assert!(matches!(
        result,
        Err(WaybillError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn test_assignment_requires_active_staff_of_current_branch() {
    let world = TestWorld::new().await;
    let shipment = world
        .shipments
        .create(world.shipment_request(true), &world.dispatcher_a)
        .await
        .unwrap();

    // Courier B belongs to the other branch.
    let result = world
        .shipments
        .assign(
            &shipment.tracking_id,
            world.courier_b.id,
            None,
            &world.dispatcher_a,
        )
        .await;
    assert!(matches!(result, Err(WaybillError::Validation(_))));

    // Deactivated staff cannot take new work either.
    world
        .tenancy
        .deactivate_staff(world.courier_a.id, &world.dispatcher_a)
        .await
        .unwrap();
    let result = world
        .shipments
        .assign(
            &shipment.tracking_id,
            world.courier_a.id,
            None,
            &world.dispatcher_a,
        )
        .await;
    assert!(matches!(result, Err(WaybillError::Validation(_))));
}

#[tokio::test]
async fn test_unknown_destination_branch_rejected() {
    let world = TestWorld::new().await;
    let mut req = world.shipment_request(false);
    req.destination_branch_id = uuid::Uuid::new_v4();
    let result = world.shipments.create(req, &world.dispatcher_a).await;
    assert!(matches!(result, Err(WaybillError::Validation(_))));
}

#[tokio::test]
async fn test_bad_party_fields_rejected() {
    let world = TestWorld::new().await;

    let mut req = world.shipment_request(false);
    req.sender.phone = "not a phone".to_string();
    assert!(matches!(
        world.shipments.create(req, &world.dispatcher_a).await,
        Err(WaybillError::Validation(_))
    ));

    let mut req = world.shipment_request(false);
    req.recipient.address = "x".to_string();
    assert!(matches!(
        world.shipments.create(req, &world.dispatcher_a).await,
        Err(WaybillError::Validation(_))
    ));
}
