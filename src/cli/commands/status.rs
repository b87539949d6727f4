use std::collections::HashMap;

use anyhow::Result;

use crate::cli::CliContext;
use crate::shipment::{ManifestStatus, ShipmentStatus};
use crate::store::{DocumentStore, ManifestFilter, ShipmentFilter};
use crate::tenancy::BranchId;

/// Per-branch and per-status overview of the whole operation.
pub async fn run(ctx: &CliContext) -> Result<()> {
    let branches = ctx.tenancy().list_branches().await?;
    let shipments = ctx
        .store_handle()
        .list_shipments(&ShipmentFilter::default())
        .await?;
    let open_manifests = ctx
        .store_handle()
        .list_manifests(&ManifestFilter {
            status: Some(ManifestStatus::InTransit),
            ..Default::default()
        })
        .await?;

    println!("📊 Waybill status");
    println!(
        "   {} branch(es), {} shipment(s), {} open manifest(s)",
        branches.len(),
        shipments.len(),
        open_manifests.len()
    );
    println!();

    let mut by_branch: HashMap<BranchId, HashMap<ShipmentStatus, usize>> = HashMap::new();
    for shipment in &shipments {
        *by_branch
            .entry(shipment.current_branch_id)
            .or_default()
            .entry(shipment.status)
            .or_default() += 1;
    }

    for branch in &branches {
        let counts = by_branch.remove(&branch.id).unwrap_or_default();
        let total: usize = counts.values().sum();
        println!("  {} — {} shipment(s) on hand", branch.code, total);
        for status in ShipmentStatus::ALL {
            if let Some(count) = counts.get(&status) {
                println!("    {:<24} {count}", status.to_string());
            }
        }
    }
    Ok(())
}
