use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Waybill
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WaybillConfig {
    /// Data file settings
    pub data: DataConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
    /// Default operator identity for CLI commands
    pub operator: OperatorConfig,
    /// Listing/pagination settings
    pub listing: ListingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    /// Path to the JSON snapshot the CLI loads and saves
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable output
    pub json_logs: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OperatorConfig {
    /// Default operator user id (uuid); generated per run when unset
    pub user_id: Option<String>,
    /// Default branch code the operator acts for
    pub branch_code: Option<String>,
    /// Default role string as the token verifier would supply it
    /// (superadmin, admin, staff)
    pub role: String,
    /// Manager flag for admin roles
    pub is_manager: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListingConfig {
    /// Default page size for paginated listings
    pub per_page: u32,
}

impl Default for WaybillConfig {
    fn default() -> Self {
        Self {
            data: DataConfig {
                path: ".waybill/waybill.json".to_string(),
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
            operator: OperatorConfig {
                user_id: None,
                branch_code: None,
                // Single-operator installs start with full control; real
                // deployments override this per token.
                role: "superadmin".to_string(),
                is_manager: false,
            },
            listing: ListingConfig { per_page: 20 },
        }
    }
}

impl WaybillConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (waybill.toml)
    /// 3. Environment variables (prefixed with WAYBILL_)
    pub fn load() -> Result<Self> {
        let defaults = Config::try_from(&WaybillConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        if Path::new("waybill.toml").exists() {
            builder = builder.add_source(File::with_name("waybill"));
        }

        builder = builder.add_source(
            Environment::with_prefix("WAYBILL")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<WaybillConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = WaybillConfig::load_env_file();
        WaybillConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static WaybillConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}
