//! Shared command plumbing: load config and the snapshot store, resolve the
//! operator into a typed actor, save the store back after a mutation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use uuid::Uuid;

use crate::auth::{Actor, TokenClaims};
use crate::config::WaybillConfig;
use crate::manifest::ManifestService;
use crate::notify::TracingNotifier;
use crate::shipment::ShipmentService;
use crate::store::{snapshot, DocumentStore, MemoryStore, PageRequest};
use crate::tenancy::TenancyService;

/// Operator identity flags, shared by every command. These stand in for the
/// verified token claims an HTTP deployment would carry.
#[derive(Args, Debug, Clone)]
pub struct ActorArgs {
    /// Act as this user id (defaults to the configured operator)
    #[arg(long = "as-user", global = true)]
    pub user: Option<Uuid>,

    /// Act for this branch code
    #[arg(long = "as-branch", global = true)]
    pub branch: Option<String>,

    /// Role as the token verifier would supply it: superadmin, admin, staff
    #[arg(long = "as-role", global = true)]
    pub role: Option<String>,

    /// Manager flag for admin roles
    #[arg(long = "as-manager", global = true)]
    pub manager: bool,
}

pub struct CliContext {
    store: Arc<MemoryStore>,
    config: &'static WaybillConfig,
    pub actor: Actor,
    data_path: PathBuf,
}

impl CliContext {
    pub async fn open(actor_args: &ActorArgs) -> Result<Self> {
        let config = crate::config::config()?;
        let data_path = PathBuf::from(&config.data.path);
        let store = Arc::new(
            snapshot::load_store(&data_path)
                .await
                .with_context(|| format!("loading data file {}", data_path.display()))?,
        );
        let actor = resolve_actor(actor_args, config, store.as_ref()).await?;
        Ok(Self {
            store,
            config,
            actor,
            data_path,
        })
    }

    pub fn shipments(&self) -> ShipmentService {
        ShipmentService::new(self.store_handle(), Arc::new(TracingNotifier))
    }

    pub fn manifests(&self) -> ManifestService {
        ManifestService::new(self.store_handle())
    }

    pub fn tenancy(&self) -> TenancyService {
        TenancyService::new(self.store_handle())
    }

    pub fn store_handle(&self) -> Arc<dyn DocumentStore> {
        self.store.clone()
    }

    pub fn page(&self, page: u32) -> PageRequest {
        PageRequest::new(page, self.config.listing.per_page)
    }

    /// Persist the snapshot after a successful mutation.
    pub async fn save(&self) -> Result<()> {
        snapshot::save_store(self.store.as_ref(), &self.data_path)
            .await
            .with_context(|| format!("saving data file {}", self.data_path.display()))
    }
}

/// Resolve CLI flags and config defaults into token claims, then into the
/// typed actor every service call checks against.
async fn resolve_actor(
    args: &ActorArgs,
    config: &WaybillConfig,
    store: &MemoryStore,
) -> Result<Actor> {
    let user_id = match (&args.user, &config.operator.user_id) {
        (Some(id), _) => *id,
        (None, Some(configured)) => configured
            .parse()
            .context("operator.user_id in config is not a uuid")?,
        (None, None) => Uuid::new_v4(),
    };

    // An explicit --role wins together with its --manager flag; otherwise the
    // configured operator defaults apply.
    let (role, is_manager) = match &args.role {
        Some(role) => (role.clone(), args.manager),
        None => (config.operator.role.clone(), config.operator.is_manager),
    };

    let branch_code = args
        .branch
        .clone()
        .or_else(|| config.operator.branch_code.clone());
    let branch_id = match branch_code {
        Some(code) => store
            .find_branch_by_code(&code)
            .await?
            .map(|branch| branch.id)
            .with_context(|| format!("unknown branch code: {code}"))?,
        // The super admin does not act for any one branch.
        None => Uuid::nil(),
    };

    let claims = TokenClaims {
        user_id,
        branch_id,
        role,
        is_manager,
    };
    Ok(Actor::from_claims(&claims)?)
}
