use anyhow::Result;
use uuid::Uuid;

use crate::cli::CliContext;
use crate::tenancy::{NewStaff, StaffRole};

pub async fn add(
    ctx: &CliContext,
    branch_code: String,
    name: String,
    role: StaffRole,
    phone: String,
) -> Result<()> {
    let branch = ctx.tenancy().find_branch_by_code(&branch_code).await?;
    let member = ctx
        .tenancy()
        .add_staff(
            NewStaff {
                name,
                branch_id: branch.id,
                role,
                phone,
            },
            &ctx.actor,
        )
        .await?;
    ctx.save().await?;
    println!(
        "✅ Added {} ({}) to {} as {}",
        member.name,
        member.id,
        branch.code,
        member.role.as_str()
    );
    Ok(())
}

pub async fn list(ctx: &CliContext, branch_code: Option<String>) -> Result<()> {
    let branch_id = match branch_code {
        Some(code) => Some(ctx.tenancy().find_branch_by_code(&code).await?.id),
        None => None,
    };
    let staff = ctx.tenancy().list_staff(branch_id).await?;
    if staff.is_empty() {
        println!("No staff found.");
        return Ok(());
    }
    println!("{:<38} {:<14} {:<8} NAME", "ID", "ROLE", "ACTIVE");
    for member in staff {
        println!(
            "{:<38} {:<14} {:<8} {}",
            member.id,
            member.role.as_str(),
            if member.active { "yes" } else { "no" },
            member.name
        );
    }
    Ok(())
}

pub async fn deactivate(ctx: &CliContext, id: Uuid) -> Result<()> {
    ctx.tenancy().deactivate_staff(id, &ctx.actor).await?;
    ctx.save().await?;
    println!("✅ Deactivated staff member {id}");
    Ok(())
}
