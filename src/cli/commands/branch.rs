use anyhow::Result;

use crate::cli::CliContext;
use crate::tenancy::NewBranch;

pub async fn add(
    ctx: &CliContext,
    name: String,
    code: String,
    address: String,
    phone: String,
) -> Result<()> {
    let branch = ctx
        .tenancy()
        .create_branch(
            NewBranch {
                name,
                code,
                address,
                phone,
            },
            &ctx.actor,
        )
        .await?;
    ctx.save().await?;
    println!("✅ Created branch {} ({})", branch.code, branch.id);
    Ok(())
}

pub async fn list(ctx: &CliContext) -> Result<()> {
    let branches = ctx.tenancy().list_branches().await?;
    if branches.is_empty() {
        println!("No branches yet. Create one with: waybill branch add");
        return Ok(());
    }
    println!("{:<8} {:<24} {:<38} NAME", "CODE", "PHONE", "ID");
    for branch in branches {
        println!(
            "{:<8} {:<24} {:<38} {}",
            branch.code, branch.phone, branch.id, branch.name
        );
    }
    Ok(())
}

pub async fn remove(ctx: &CliContext, code: String) -> Result<()> {
    let branch = ctx.tenancy().find_branch_by_code(&code).await?;
    ctx.tenancy().delete_branch(branch.id, &ctx.actor).await?;
    ctx.save().await?;
    println!("🗑️  Removed branch {} and everything it owned", branch.code);
    Ok(())
}
