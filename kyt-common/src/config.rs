//! Configuration loading and root folder resolution

use crate::db::init::{
    get_setting_i64, DEFAULT_SLA_ADMIN_REVIEW_HOURS, DEFAULT_SLA_FORMS_HOURS,
    DEFAULT_SLA_MASTERADMIN_APPROVAL_HOURS, DEFAULT_SLA_SUPERADMIN_REVIEW_HOURS,
};
use crate::time::hours_to_ms;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::path::PathBuf;

/// Default listen port for the verification tracker
pub const DEFAULT_PORT: u16 = 5780;

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `KYT_ROOT_FOLDER` environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var("KYT_ROOT_FOLDER") {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = load_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(root_folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    get_default_root_folder()
}

/// Database file path under the resolved root folder
pub fn database_path(root_folder: &std::path::Path) -> PathBuf {
    root_folder.join("kyt.db")
}

/// Listen port resolution: CLI argument, then `KYT_PORT`, then the default.
pub fn resolve_port(cli_arg: Option<u16>) -> u16 {
    if let Some(port) = cli_arg {
        return port;
    }

    if let Ok(port) = std::env::var("KYT_PORT") {
        if let Ok(port) = port.parse() {
            return port;
        }
    }

    DEFAULT_PORT
}

/// Get default configuration file path for the platform
fn load_config_file() -> Result<PathBuf> {
    let config_path = if cfg!(target_os = "linux") {
        // Try ~/.config/kyt/config.toml first, then /etc/kyt/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("kyt").join("config.toml"));
        let system_config = PathBuf::from("/etc/kyt/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    } else {
        dirs::config_dir()
            .map(|d| d.join("kyt").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?
    };

    if config_path.exists() {
        Ok(config_path)
    } else {
        Err(Error::Config(format!("Config file not found: {:?}", config_path)))
    }
}

/// Get OS-dependent default root folder path
fn get_default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("kyt"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/kyt"))
    } else {
        dirs::data_dir()
            .map(|d| d.join("kyt"))
            .unwrap_or_else(|| PathBuf::from("kyt"))
    }
}

/// Per-stage SLA thresholds in milliseconds, against which stuck/bottleneck
/// verdicts are computed.
///
/// The values live in the `settings` table (seeded at init) rather than in
/// code: the shipped defaults are inferred from typical review cadences and
/// operators are expected to tune them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaThresholds {
    pub forms_ms: i64,
    pub admin_review_ms: i64,
    pub superadmin_review_ms: i64,
    pub masteradmin_approval_ms: i64,
}

impl Default for SlaThresholds {
    fn default() -> Self {
        Self {
            forms_ms: hours_to_ms(DEFAULT_SLA_FORMS_HOURS),
            admin_review_ms: hours_to_ms(DEFAULT_SLA_ADMIN_REVIEW_HOURS),
            superadmin_review_ms: hours_to_ms(DEFAULT_SLA_SUPERADMIN_REVIEW_HOURS),
            masteradmin_approval_ms: hours_to_ms(DEFAULT_SLA_MASTERADMIN_APPROVAL_HOURS),
        }
    }
}

impl SlaThresholds {
    /// Load thresholds from the settings table, falling back to defaults
    /// for missing or unparseable rows.
    pub async fn load(pool: &SqlitePool) -> Result<Self> {
        Ok(Self {
            forms_ms: hours_to_ms(
                get_setting_i64(pool, "sla_forms_hours", DEFAULT_SLA_FORMS_HOURS).await?,
            ),
            admin_review_ms: hours_to_ms(
                get_setting_i64(pool, "sla_admin_review_hours", DEFAULT_SLA_ADMIN_REVIEW_HOURS)
                    .await?,
            ),
            superadmin_review_ms: hours_to_ms(
                get_setting_i64(
                    pool,
                    "sla_superadmin_review_hours",
                    DEFAULT_SLA_SUPERADMIN_REVIEW_HOURS,
                )
                .await?,
            ),
            masteradmin_approval_ms: hours_to_ms(
                get_setting_i64(
                    pool,
                    "sla_masteradmin_approval_hours",
                    DEFAULT_SLA_MASTERADMIN_APPROVAL_HOURS,
                )
                .await?,
            ),
        })
    }
}
