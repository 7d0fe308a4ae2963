use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_BAREKSA_URL: &str = "https://www.bareksa.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// A mutual fund known to the app. `pid` is the fund identifier at the price
/// source, `id` is the identifier contributions refer to.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FundConfig {
    pub id: u32,
    pub pid: u32,
    pub name: String,
    pub minimum_investment: Option<String>,
    pub management_fee: Option<String>,
    pub custodian_fee: Option<String>,
    pub switching_fee: Option<String>,
    pub investment_manager: Option<String>,
}

impl FundConfig {
    pub fn new(id: u32, pid: u32, name: &str) -> Self {
        FundConfig {
            id,
            pid,
            name: name.to_string(),
            minimum_investment: None,
            management_fee: None,
            custodian_fee: None,
            switching_fee: None,
            investment_manager: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BareksaProviderConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub bareksa: Option<BareksaProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            bareksa: Some(BareksaProviderConfig {
                base_url: DEFAULT_BAREKSA_URL.to_string(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            }),
        }
    }
}

fn default_account() -> String {
    "default".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_account")]
    pub account: String,
    #[serde(default)]
    pub funds: Vec<FundConfig>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("id", "navgrow", "navgrow")
            .context("Could not determine project directories")
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.yaml"))
    }

    pub fn data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    /// Base url and timeout of the price source, with defaults filled in.
    pub fn bareksa(&self) -> BareksaProviderConfig {
        self.providers
            .bareksa
            .clone()
            .unwrap_or_else(|| BareksaProviderConfig {
                base_url: DEFAULT_BAREKSA_URL.to_string(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            })
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
