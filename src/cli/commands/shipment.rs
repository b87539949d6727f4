use anyhow::Result;
use clap::Args;
use uuid::Uuid;

use crate::cli::CliContext;
use crate::shipment::{
    DeliveryProof, NewShipment, PackageInfo, Party, ProofKind, Shipment, ShipmentStatus,
    StatusChange,
};
use crate::store::ShipmentFilter;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Origin branch code
    #[arg(long)]
    pub from: String,
    /// Destination branch code (same as --from for a local delivery)
    #[arg(long)]
    pub to: String,

    #[arg(long)]
    pub sender_name: String,
    #[arg(long)]
    pub sender_address: String,
    #[arg(long)]
    pub sender_phone: String,

    #[arg(long)]
    pub recipient_name: String,
    #[arg(long)]
    pub recipient_address: String,
    #[arg(long)]
    pub recipient_phone: String,

    /// What is being shipped
    #[arg(long)]
    pub description: String,
    /// Package weight in kilograms
    #[arg(long)]
    pub weight: f64,
    /// Declared value, if any
    #[arg(long)]
    pub value: Option<f64>,

    /// Assign immediately to this staff member (local deliveries only)
    #[arg(long)]
    pub assign: Option<Uuid>,
    #[arg(long)]
    pub notes: Option<String>,
}

pub async fn create(ctx: &CliContext, args: CreateArgs) -> Result<()> {
    let origin = ctx.tenancy().find_branch_by_code(&args.from).await?;
    let destination = ctx.tenancy().find_branch_by_code(&args.to).await?;
    let req = NewShipment {
        sender: Party {
            name: args.sender_name,
            address: args.sender_address,
            phone: args.sender_phone,
        },
        recipient: Party {
            name: args.recipient_name,
            address: args.recipient_address,
            phone: args.recipient_phone,
        },
        package: PackageInfo {
            description: args.description,
            weight_kg: args.weight,
            declared_value: args.value,
        },
        origin_branch_id: origin.id,
        destination_branch_id: destination.id,
        assignee: args.assign,
        notes: args.notes,
    };
    let shipment = ctx.shipments().create(req, &ctx.actor).await?;
    ctx.save().await?;
    println!(
        "✅ Created shipment {} ({} → {}, {})",
        shipment.tracking_id, origin.code, destination.code, shipment.status
    );
    Ok(())
}

pub async fn show(ctx: &CliContext, tracking_id: String) -> Result<()> {
    let shipment = ctx.shipments().get(&tracking_id).await?;
    print_shipment(&shipment);
    Ok(())
}

pub async fn list(
    ctx: &CliContext,
    branch_code: Option<String>,
    status: Option<ShipmentStatus>,
    page: u32,
) -> Result<()> {
    let current_branch_id = match branch_code {
        Some(code) => Some(ctx.tenancy().find_branch_by_code(&code).await?.id),
        None => None,
    };
    let filter = ShipmentFilter {
        current_branch_id,
        status,
        ..Default::default()
    };
    let page = ctx.shipments().list(&filter, ctx.page(page)).await?;
    if page.items.is_empty() {
        println!("No shipments match.");
        return Ok(());
    }
    println!("{:<14} {:<24} ASSIGNED", "TRACKING", "STATUS");
    for shipment in &page.items {
        println!(
            "{:<14} {:<24} {}",
            shipment.tracking_id,
            shipment.status.to_string(),
            shipment
                .assigned_to
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }
    println!(
        "Page {} of {} shipment(s) total",
        page.page, page.total
    );
    Ok(())
}

pub async fn assign(
    ctx: &CliContext,
    tracking_id: String,
    staff_id: Uuid,
    notes: Option<String>,
) -> Result<()> {
    let shipment = ctx
        .shipments()
        .assign(&tracking_id, staff_id, notes, &ctx.actor)
        .await?;
    ctx.save().await?;
    println!("✅ {} assigned to {staff_id}", shipment.tracking_id);
    Ok(())
}

pub async fn out_for_delivery(ctx: &CliContext, tracking_id: String) -> Result<()> {
    let shipment = ctx
        .shipments()
        .update_status(
            &tracking_id,
            ShipmentStatus::OutForDelivery,
            StatusChange::default(),
            &ctx.actor,
        )
        .await?;
    ctx.save().await?;
    println!("🚚 {} is out for delivery", shipment.tracking_id);
    Ok(())
}

pub async fn deliver(
    ctx: &CliContext,
    tracking_id: String,
    proof_kind: ProofKind,
    proof_url: String,
) -> Result<()> {
    let change = StatusChange {
        proof: Some(DeliveryProof {
            kind: proof_kind,
            url: proof_url,
        }),
        ..Default::default()
    };
    let shipment = ctx
        .shipments()
        .update_status(&tracking_id, ShipmentStatus::Delivered, change, &ctx.actor)
        .await?;
    ctx.save().await?;
    println!("📦 {} delivered", shipment.tracking_id);
    Ok(())
}

pub async fn fail(ctx: &CliContext, tracking_id: String, reason: String) -> Result<()> {
    let change = StatusChange {
        failure_reason: Some(reason),
        ..Default::default()
    };
    let shipment = ctx
        .shipments()
        .update_status(&tracking_id, ShipmentStatus::Failed, change, &ctx.actor)
        .await?;
    ctx.save().await?;
    println!("❌ {} marked failed", shipment.tracking_id);
    Ok(())
}

pub async fn delete(ctx: &CliContext, tracking_id: String) -> Result<()> {
    ctx.shipments().delete(&tracking_id, &ctx.actor).await?;
    ctx.save().await?;
    println!("🗑️  Deleted shipment {tracking_id}");
    Ok(())
}

fn print_shipment(shipment: &Shipment) {
    println!("Shipment {}", shipment.tracking_id);
    println!("  Status:      {}", shipment.status);
    println!(
        "  Route:       {} → {} (currently at {})",
        shipment.origin_branch_id, shipment.destination_branch_id, shipment.current_branch_id
    );
    println!(
        "  Sender:      {} / {}",
        shipment.sender.name, shipment.sender.phone
    );
    println!(
        "  Recipient:   {} / {}",
        shipment.recipient.name, shipment.recipient.phone
    );
    println!(
        "  Package:     {} ({} kg)",
        shipment.package.description, shipment.package.weight_kg
    );
    if let Some(staff_id) = shipment.assigned_to {
        println!("  Assigned to: {staff_id}");
    }
    if let Some(proof) = &shipment.delivery_proof {
        println!("  Proof:       {:?} at {}", proof.kind, proof.url);
    }
    if let Some(reason) = &shipment.failure_reason {
        println!("  Failure:     {reason}");
    }
    println!("  History:");
    for entry in &shipment.status_history {
        let via = entry
            .manifest_id
            .map(|id| format!(" via manifest {id}"))
            .unwrap_or_default();
        let notes = entry
            .notes
            .as_deref()
            .map(|n| format!(" — {n}"))
            .unwrap_or_default();
        println!(
            "    {} {}{via}{notes}",
            entry.at.format("%Y-%m-%d %H:%M:%S"),
            entry.status
        );
    }
}
