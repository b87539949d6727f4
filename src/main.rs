use anyhow::Result;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use waybill::cli::commands;
use waybill::cli::{ActorArgs, CliContext};
use waybill::shipment::{ProofKind, ShipmentStatus};
use waybill::tenancy::StaffRole;

#[derive(Parser)]
#[command(name = "waybill")]
#[command(about = "Multi-branch courier coordination: shipments, manifests, delivery")]
#[command(long_about = "Waybill coordinates shipments across branch offices: create shipments, \
                       batch them onto inter-branch manifests, receive them at the destination, \
                       and walk them through assignment, delivery, or failure. State lives in a \
                       JSON data file configured in waybill.toml; start with 'waybill init'.")]
struct Cli {
    #[command(flatten)]
    actor: ActorArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a working directory with a config file and empty data file
    Init {
        /// Overwrite existing config and data files
        #[arg(long)]
        force: bool,
    },
    /// Manage branch offices (super admin)
    #[command(subcommand)]
    Branch(BranchCommands),
    /// Manage branch staff
    #[command(subcommand)]
    Staff(StaffCommands),
    /// Create and progress shipments
    #[command(subcommand)]
    Shipment(ShipmentCommands),
    /// Dispatch and receive inter-branch manifests
    #[command(subcommand)]
    Manifest(ManifestCommands),
    /// Display branch and shipment overview
    Status,
}

#[derive(Subcommand)]
enum BranchCommands {
    /// Create a branch office
    Add {
        #[arg(long)]
        name: String,
        /// Short code, 2-6 uppercase letters/digits (e.g. WST)
        #[arg(long)]
        code: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        phone: String,
    },
    /// List all branches
    List,
    /// Delete a branch and cascade its staff and shipments
    Remove {
        /// Branch code
        code: String,
    },
}

#[derive(Subcommand)]
enum StaffCommands {
    /// Add a staff member to a branch
    Add {
        /// Branch code the member belongs to
        #[arg(long)]
        branch: String,
        #[arg(long)]
        name: String,
        /// manager, dispatcher, or staff
        #[arg(long, default_value = "staff")]
        role: StaffRole,
        #[arg(long)]
        phone: String,
    },
    /// List staff, optionally for one branch
    List {
        #[arg(long)]
        branch: Option<String>,
    },
    /// Deactivate a staff member (keeps history, blocks new assignments)
    Deactivate {
        /// Staff member id
        id: Uuid,
    },
}

#[derive(Subcommand)]
enum ShipmentCommands {
    /// Create a shipment at its origin branch
    Create(commands::shipment::CreateArgs),
    /// Show one shipment with its full audit history
    Show {
        tracking_id: String,
    },
    /// List shipments
    List {
        /// Restrict to shipments currently at this branch
        #[arg(long)]
        branch: Option<String>,
        /// Restrict to one status (e.g. AtOriginBranch)
        #[arg(long)]
        status: Option<ShipmentStatus>,
        #[arg(long, default_value = "1")]
        page: u32,
    },
    /// Assign a shipment to a staff member of its current branch
    Assign {
        tracking_id: String,
        /// Staff member id
        #[arg(long)]
        staff: Uuid,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Mark an assigned shipment out for delivery
    Out {
        tracking_id: String,
    },
    /// Record delivery with proof
    Deliver {
        tracking_id: String,
        /// signature or photo
        #[arg(long)]
        proof_kind: ProofKind,
        /// URL returned by the upload service
        #[arg(long)]
        proof_url: String,
    },
    /// Record a failed delivery
    Fail {
        tracking_id: String,
        #[arg(long)]
        reason: String,
    },
    /// Delete a shipment (origin-branch creator only)
    Delete {
        tracking_id: String,
    },
}

#[derive(Subcommand)]
enum ManifestCommands {
    /// List shipments at a branch ready to travel to a destination
    Available {
        /// Origin branch code (defaults to your own branch)
        #[arg(long)]
        from: Option<String>,
        /// Destination branch code
        #[arg(long)]
        to: String,
        #[arg(long, default_value = "1")]
        page: u32,
    },
    /// Create a manifest and put shipments in transit (all-or-nothing)
    Dispatch {
        /// Origin branch code (defaults to your own branch)
        #[arg(long)]
        from: Option<String>,
        /// Destination branch code
        #[arg(long)]
        to: String,
        /// Tracking ids to include
        #[arg(required = true)]
        tracking_ids: Vec<String>,
        #[arg(long)]
        vehicle: Option<String>,
        #[arg(long)]
        driver: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Close an arrived manifest and take custody of its shipments
    Receive {
        /// Manifest id
        id: Uuid,
    },
    /// Show one manifest
    Show {
        id: Uuid,
    },
    /// List manifests for your branch (all branches for the super admin)
    List {
        #[arg(long, default_value = "1")]
        page: u32,
    },
}

fn main() -> Result<()> {
    let Cli { actor, command } = Cli::parse();

    let config = waybill::config()?;
    waybill::init_telemetry(
        &config.observability.log_level,
        config.observability.json_logs,
    )?;
    let correlation_id = waybill::generate_correlation_id();
    let span = waybill::create_workflow_span("cli", None, actor.branch.as_deref(), Some(&correlation_id));
    let _guard = span.enter();

    match command {
        Commands::Init { force } => {
            tokio::runtime::Runtime::new()?.block_on(commands::init::run(force))
        }
        Commands::Branch(branch_command) => tokio::runtime::Runtime::new()?.block_on(async {
            let ctx = CliContext::open(&actor).await?;
            match branch_command {
                BranchCommands::Add {
                    name,
                    code,
                    address,
                    phone,
                } => commands::branch::add(&ctx, name, code, address, phone).await,
                BranchCommands::List => commands::branch::list(&ctx).await,
                BranchCommands::Remove { code } => commands::branch::remove(&ctx, code).await,
            }
        }),
        Commands::Staff(staff_command) => tokio::runtime::Runtime::new()?.block_on(async {
            let ctx = CliContext::open(&actor).await?;
            match staff_command {
                StaffCommands::Add {
                    branch,
                    name,
                    role,
                    phone,
                } => commands::staff::add(&ctx, branch, name, role, phone).await,
                StaffCommands::List { branch } => commands::staff::list(&ctx, branch).await,
                StaffCommands::Deactivate { id } => commands::staff::deactivate(&ctx, id).await,
            }
        }),
        Commands::Shipment(shipment_command) => tokio::runtime::Runtime::new()?.block_on(async {
            let ctx = CliContext::open(&actor).await?;
            match shipment_command {
                ShipmentCommands::Create(args) => commands::shipment::create(&ctx, args).await,
                ShipmentCommands::Show { tracking_id } => {
                    commands::shipment::show(&ctx, tracking_id).await
                }
                ShipmentCommands::List {
                    branch,
                    status,
                    page,
                } => commands::shipment::list(&ctx, branch, status, page).await,
                ShipmentCommands::Assign {
                    tracking_id,
                    staff,
                    notes,
                } => commands::shipment::assign(&ctx, tracking_id, staff, notes).await,
                ShipmentCommands::Out { tracking_id } => {
                    commands::shipment::out_for_delivery(&ctx, tracking_id).await
                }
                ShipmentCommands::Deliver {
                    tracking_id,
                    proof_kind,
                    proof_url,
                } => commands::shipment::deliver(&ctx, tracking_id, proof_kind, proof_url).await,
                ShipmentCommands::Fail {
                    tracking_id,
                    reason,
                } => commands::shipment::fail(&ctx, tracking_id, reason).await,
                ShipmentCommands::Delete { tracking_id } => {
                    commands::shipment::delete(&ctx, tracking_id).await
                }
            }
        }),
        Commands::Manifest(manifest_command) => tokio::runtime::Runtime::new()?.block_on(async {
            let ctx = CliContext::open(&actor).await?;
            match manifest_command {
                ManifestCommands::Available { from, to, page } => {
                    commands::manifest::available(&ctx, from, to, page).await
                }
                ManifestCommands::Dispatch {
                    from,
                    to,
                    tracking_ids,
                    vehicle,
                    driver,
                    notes,
                } => {
                    commands::manifest::dispatch(
                        &ctx,
                        from,
                        to,
                        tracking_ids,
                        vehicle,
                        driver,
                        notes,
                    )
                    .await
                }
                ManifestCommands::Receive { id } => commands::manifest::receive(&ctx, id).await,
                ManifestCommands::Show { id } => commands::manifest::show(&ctx, id).await,
                ManifestCommands::List { page } => commands::manifest::list(&ctx, page).await,
            }
        }),
        Commands::Status => tokio::runtime::Runtime::new()?.block_on(async {
            let ctx = CliContext::open(&actor).await?;
            commands::status::run(&ctx).await
        }),
    }
}
