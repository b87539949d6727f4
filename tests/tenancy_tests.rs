//! Branch/staff tenancy tests
//!
//! Branch deletion cascades staff and shipments in one transaction and is
//! refused while an open manifest still involves the branch.

mod fixtures;

use fixtures::TestWorld;
use waybill::error::WaybillError;
use waybill::manifest::DispatchRequest;
use waybill::store::ShipmentFilter;
use waybill::tenancy::NewBranch;

#[tokio::test]
async fn test_branch_delete_cascades_staff_and_shipments() {
    let world = TestWorld::new().await;
    let outbound = world
        .shipments
        .create(world.shipment_request(false), &world.dispatcher_a)
        .await
        .unwrap();
    let local = world
        .shipments
        .create(world.shipment_request(true), &world.dispatcher_a)
        .await
        .unwrap();

    world
        .tenancy
        .delete_branch(world.branch_a.id, &world.root)
        .await
        .unwrap();

    // Branch, staff, and both shipments are gone.
    assert!(matches!(
        world.tenancy.get_branch(world.branch_a.id).await,
        Err(WaybillError::NotFound { .. })
    ));
    assert!(matches!(
        world.tenancy.get_staff(world.courier_a.id).await,
        Err(WaybillError::NotFound { .. })
    ));
    for tracking_id in [&outbound.tracking_id, &local.tracking_id] {
        assert!(matches!(
            world.shipments.get(tracking_id).await,
            Err(WaybillError::NotFound { .. })
        ));
    }

    // The other branch is untouched.
    assert!(world.tenancy.get_branch(world.branch_b.id).await.is_ok());
    assert!(world.tenancy.get_staff(world.courier_b.id).await.is_ok());
}

#[tokio::test]
async fn test_branch_delete_refused_while_manifest_open() {
    let world = TestWorld::new().await;
    let shipment = world
        .shipments
        .create(world.shipment_request(false), &world.dispatcher_a)
        .await
        .unwrap();
    let manifest = world
        .manifests
        .dispatch(
            DispatchRequest {
                from_branch_id: world.branch_a.id,
                to_branch_id: world.branch_b.id,
                tracking_ids: vec![shipment.tracking_id.clone()],
                transport: Default::default(),
            },
            &world.dispatcher_a,
        )
        .await
        .unwrap();

    // Both ends of the open manifest are protected.
    for branch_id in [world.branch_a.id, world.branch_b.id] {
        let result = world.tenancy.delete_branch(branch_id, &world.root).await;
        assert!(matches!(result, Err(WaybillError::Conflict(_))));
    }

    // After receipt the destination branch is still home to the arrived
    // shipment, and deletion proceeds with the cascade.
    world
        .manifests
        .receive(manifest.id, &world.dispatcher_b)
        .await
        .unwrap();
    world
        .tenancy
        .delete_branch(world.branch_b.id, &world.root)
        .await
        .unwrap();
    assert!(matches!(
        world.shipments.get(&shipment.tracking_id).await,
        Err(WaybillError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_duplicate_branch_code_rejected() {
    let world = TestWorld::new().await;
    let result = world
        .tenancy
        .create_branch(
            NewBranch {
                name: "Westhaven Two".to_string(),
                code: "wst".to_string(),
                address: "2 Dock Lane, Westhaven".to_string(),
                phone: "+44 20 7946 0101".to_string(),
            },
            &world.root,
        )
        .await;
    assert!(matches!(result, Err(WaybillError::Conflict(_))));
}

#[tokio::test]
async fn test_branch_code_format_enforced() {
    let world = TestWorld::new().await;
    for bad in ["", "A", "TOOLONGCODE", "w st"] {
        let result = world
            .tenancy
            .create_branch(
                NewBranch {
                    name: "Bad Code".to_string(),
                    code: bad.to_string(),
                    address: "3 Dock Lane, Westhaven".to_string(),
                    phone: "+44 20 7946 0102".to_string(),
                },
                &world.root,
            )
            .await;
        assert!(
            matches!(result, Err(WaybillError::Validation(_))),
            "expected rejection for code {bad:?}"
        );
    }
}

#[tokio::test]
async fn test_staff_managed_within_own_branch() {
    let world = TestWorld::new().await;
    // Branch A's dispatcher cannot deactivate branch B's courier.
    let result = world
        .tenancy
        .deactivate_staff(world.courier_b.id, &world.dispatcher_a)
        .await;
    assert!(matches!(result, Err(WaybillError::Forbidden(_))));

    world
        .tenancy
        .deactivate_staff(world.courier_b.id, &world.dispatcher_b)
        .await
        .unwrap();
    let member = world.tenancy.get_staff(world.courier_b.id).await.unwrap();
    assert!(!member.active);
}

#[tokio::test]
async fn test_listing_scopes_by_branch() {
    let world = TestWorld::new().await;
    world
        .shipments
        .create(world.shipment_request(false), &world.dispatcher_a)
        .await
        .unwrap();

    let store = world.store.clone();
    let at_a = waybill::store::DocumentStore::list_shipments(
        store.as_ref(),
        &ShipmentFilter {
            current_branch_id: Some(world.branch_a.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(at_a.len(), 1);

    let at_b = waybill::store::DocumentStore::list_shipments(
        store.as_ref(),
        &ShipmentFilter {
            current_branch_id: Some(world.branch_b.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(at_b.is_empty());
}
