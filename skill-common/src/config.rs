//! Settings loading and settings-file resolution
//!
//! The host hands each skill a key-value settings mapping. The same document can
//! also live on disk as TOML or JSON for the CLI harness. Every field is
//! defaulted, so a missing or partial document still yields usable settings.
//!
//! Settings file priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. User config directory (`<config_dir>/skill-invidious/settings.toml`)
//! 4. Built-in defaults (no file)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use url::Url;

/// Environment variable naming a settings file
pub const SETTINGS_ENV_VAR: &str = "SKILL_INVIDIOUS_CONFIG";

/// Mirrors used when discovery and custom instances yield too few candidates
pub const DEFAULT_FALLBACK_INSTANCES: [&str; 4] = [
    "https://invidious.projectsegfau.org",
    "https://invidious.slipfox.xyz",
    "https://invidious.prvcy.projectsegfau.org",
    "https://inv.nadeko.net",
];

/// Page listing public instances
pub const DEFAULT_DISCOVERY_URL: &str = "https://redirect.invidious.io/";

/// Complete skill settings
///
/// Accepts both the flat layout written by the CLI and the nested layout
/// (`search_settings`, `invidious_instances`) found in host settings files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillSettings {
    /// Built-in fallback instance list
    #[serde(alias = "invidious_instances")]
    pub instances: Vec<String>,

    /// Discovery and pool sizing
    pub instance_management: InstanceManagement,

    /// Default search facets
    #[serde(alias = "search_settings")]
    pub search: SearchSettings,

    /// Deprioritise results unless the user named the service
    pub fallback_mode: bool,

    /// Videos fetched per channel result
    pub channel_max_videos: usize,

    /// Case-insensitive words that drop a channel video from its playlist
    pub blacklist_keywords: Vec<String>,

    /// Shape of the playable URI handed to the host
    pub watch_url_style: WatchUrlStyle,

    /// Logging configuration (CLI harness only)
    pub logging: LoggingConfig,
}

/// Instance pool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceManagement {
    /// User-configured instances, always part of the pool
    pub custom_instances: Vec<String>,

    /// Upper bound on pool size
    pub max_instances: usize,

    /// Scrape the discovery page when building the pool
    pub discovery_enabled: bool,

    /// Page scraped for instance URLs
    pub discovery_url: String,
}

impl Default for InstanceManagement {
    fn default() -> Self {
        Self {
            custom_instances: Vec::new(),
            max_instances: 15,
            discovery_enabled: true,
            discovery_url: DEFAULT_DISCOVERY_URL.to_string(),
        }
    }
}

/// Search facets sent with every query
///
/// Empty facets are left out of the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Content type (`video`, `channel`, `playlist`, `all`); the skill
    /// variant decides when unset
    pub default_type: Option<String>,
    pub default_sort: String,
    pub default_date: String,
    pub default_duration: String,
    pub default_features: String,
    pub default_region: String,
    /// Upper bound on parsed search records
    pub max_results: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_type: None,
            default_sort: "relevance".to_string(),
            default_date: String::new(),
            default_duration: String::new(),
            default_features: String::new(),
            default_region: "US".to_string(),
            max_results: 20,
        }
    }
}

/// Playable URI style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchUrlStyle {
    /// `https://www.youtube.com/watch?v={id}`
    #[default]
    Youtube,
    /// `{instance}/watch?v={id}`
    Instance,
    /// `{instance}/latest_version?id={id}&itag=18` (direct stream)
    Direct,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for SkillSettings {
    fn default() -> Self {
        Self {
            instances: DEFAULT_FALLBACK_INSTANCES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            instance_management: InstanceManagement::default(),
            search: SearchSettings::default(),
            fallback_mode: false,
            channel_max_videos: 5,
            blacklist_keywords: default_blacklist(),
            watch_url_style: WatchUrlStyle::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_blacklist() -> Vec<String> {
    ["sponsored", "promo", "promotion", "advertisement", "giveaway", "merch"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl SkillSettings {
    /// Build settings from a host-provided mapping
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let settings: SkillSettings = serde_json::from_value(value)?;
        Ok(settings.normalized())
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let settings: SkillSettings = serde_json::from_str(content)?;
        Ok(settings.normalized())
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: SkillSettings = toml::from_str(content)?;
        Ok(settings.normalized())
    }

    /// Load settings from a file, choosing the format by extension
    ///
    /// `.json` files are parsed as JSON, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Load settings, falling back to defaults when no file exists
    ///
    /// A missing file is not fatal. A file that exists but cannot be parsed is.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => {
                let settings = Self::load(path)?;
                info!("Settings loaded from {}", path.display());
                Ok(settings)
            }
            Some(path) => {
                warn!(
                    "Settings file {} not found, using built-in defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            None => {
                info!("No settings file configured, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Clamp values that would make the skill unusable
    pub fn normalized(mut self) -> Self {
        if self.instance_management.max_instances == 0 {
            warn!("max_instances must be at least 1, using 1");
            self.instance_management.max_instances = 1;
        }
        if self.search.max_results == 0 {
            warn!("max_results must be at least 1, using 1");
            self.search.max_results = 1;
        }
        self
    }
}

/// Resolve the settings file path
///
/// Returns `None` when neither an explicit path nor an existing user file is
/// available; callers then run on built-in defaults.
pub fn resolve_settings_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: User config directory
    default_settings_path().filter(|path| path.exists())
}

/// Platform settings location, whether or not it exists
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("skill-invidious").join("settings.toml"))
}

/// Parse an instance address
///
/// The address must be an absolute http(s) URL with a host.
pub fn parse_instance_url(address: &str) -> Result<Url> {
    let url = Url::parse(address.trim())
        .map_err(|e| Error::Config(format!("Invalid instance address {:?}: {}", address, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "Instance address must use http or https: {}",
            address
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(Error::Config(format!("Instance address has no host: {}", address)));
    }

    Ok(url)
}

/// Canonical pool form of an instance address
///
/// Host lower-cased by the parser, default port dropped, no trailing slash.
/// Two addresses naming the same instance compare equal in this form.
pub fn canonical_instance_url(address: &str) -> Result<String> {
    let url = parse_instance_url(address)?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}
