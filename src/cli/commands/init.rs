use std::path::Path;

use anyhow::Result;

use crate::config::WaybillConfig;
use crate::store::{snapshot, MemoryStore};

/// Set up a working directory: default config file plus an empty data file.
pub async fn run(force: bool) -> Result<()> {
    let config_path = Path::new("waybill.toml");
    if config_path.exists() && !force {
        println!("⚠️  waybill.toml already exists (use --force to overwrite)");
    } else {
        WaybillConfig::default().save_to_file(config_path)?;
        println!("✅ Wrote waybill.toml");
    }

    let config = WaybillConfig::load()?;
    let data_path = Path::new(&config.data.path);
    if data_path.exists() && !force {
        println!(
            "⚠️  Data file {} already exists, leaving it alone",
            data_path.display()
        );
    } else {
        snapshot::save_store(&MemoryStore::new(), data_path).await?;
        println!("✅ Created empty data file at {}", data_path.display());
    }

    println!();
    println!("Next steps:");
    println!("  → Create branches:  waybill branch add --name \"Westhaven\" --code WST ...");
    println!("  → Add staff:        waybill staff add --branch WST --name \"Ada\" ...");
    println!("  → Create shipments: waybill shipment create --help");
    Ok(())
}
