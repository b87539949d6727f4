use anyhow::Result;
use uuid::Uuid;

use crate::cli::CliContext;
use crate::manifest::{DispatchRequest, Manifest, TransportMeta};
use crate::store::ManifestFilter;

/// Resolve an explicit `--from` code, falling back to the actor's own branch.
async fn resolve_from_branch(ctx: &CliContext, from: Option<String>) -> Result<uuid::Uuid> {
    match from {
        Some(code) => Ok(ctx.tenancy().find_branch_by_code(&code).await?.id),
        None => Ok(ctx.actor.branch_id),
    }
}

pub async fn available(ctx: &CliContext, from: Option<String>, to: String, page: u32) -> Result<()> {
    let from_branch_id = resolve_from_branch(ctx, from).await?;
    let destination = ctx.tenancy().find_branch_by_code(&to).await?;
    let page = ctx
        .manifests()
        .list_available(from_branch_id, destination.id, ctx.page(page), &ctx.actor)
        .await?;
    if page.items.is_empty() {
        println!("No shipments ready for {}.", destination.code);
        return Ok(());
    }
    println!("Ready for {} ({} total):", destination.code, page.total);
    for shipment in &page.items {
        println!(
            "  {}  {} → {}",
            shipment.tracking_id, shipment.sender.name, shipment.recipient.name
        );
    }
    Ok(())
}

pub async fn dispatch(
    ctx: &CliContext,
    from: Option<String>,
    to: String,
    tracking_ids: Vec<String>,
    vehicle: Option<String>,
    driver: Option<String>,
    notes: Option<String>,
) -> Result<()> {
    let from_branch_id = resolve_from_branch(ctx, from).await?;
    let destination = ctx.tenancy().find_branch_by_code(&to).await?;
    let manifest = ctx
        .manifests()
        .dispatch(
            DispatchRequest {
                from_branch_id,
                to_branch_id: destination.id,
                tracking_ids,
                transport: TransportMeta {
                    vehicle_number: vehicle,
                    driver_name: driver,
                    notes,
                },
            },
            &ctx.actor,
        )
        .await?;
    ctx.save().await?;
    println!(
        "🚛 Dispatched manifest {} with {} shipment(s) to {}",
        manifest.id,
        manifest.shipment_ids.len(),
        destination.code
    );
    Ok(())
}

pub async fn receive(ctx: &CliContext, id: Uuid) -> Result<()> {
    let manifest = ctx.manifests().receive(id, &ctx.actor).await?;
    ctx.save().await?;
    println!(
        "✅ Received manifest {} — {} shipment(s) now at destination",
        manifest.id,
        manifest.shipment_ids.len()
    );
    Ok(())
}

pub async fn show(ctx: &CliContext, id: Uuid) -> Result<()> {
    let manifest = ctx.manifests().get(id).await?;
    print_manifest(&manifest);
    Ok(())
}

pub async fn list(ctx: &CliContext, page: u32) -> Result<()> {
    let filter = if ctx.actor.is_super_admin() {
        ManifestFilter::default()
    } else {
        ManifestFilter {
            from_branch_id: Some(ctx.actor.branch_id),
            ..Default::default()
        }
    };
    let page = ctx.manifests().list(&filter, ctx.page(page)).await?;
    if page.items.is_empty() {
        println!("No manifests found.");
        return Ok(());
    }
    println!("{:<38} {:<12} SHIPMENTS", "ID", "STATUS");
    for manifest in &page.items {
        println!(
            "{:<38} {:<12} {}",
            manifest.id,
            manifest.status.to_string(),
            manifest.shipment_ids.len()
        );
    }
    Ok(())
}

fn print_manifest(manifest: &Manifest) {
    println!("Manifest {}", manifest.id);
    println!("  Status:     {}", manifest.status);
    println!(
        "  Route:      {} → {}",
        manifest.from_branch_id, manifest.to_branch_id
    );
    println!(
        "  Dispatched: {}",
        manifest.dispatched_at.format("%Y-%m-%d %H:%M:%S")
    );
    if let Some(received_at) = manifest.received_at {
        println!("  Received:   {}", received_at.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(vehicle) = &manifest.transport.vehicle_number {
        println!("  Vehicle:    {vehicle}");
    }
    if let Some(driver) = &manifest.transport.driver_name {
        println!("  Driver:     {driver}");
    }
    println!("  Shipments:");
    for tracking_id in &manifest.shipment_ids {
        println!("    {tracking_id}");
    }
}
