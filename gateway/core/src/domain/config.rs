// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Gateway Configuration Types
//
// Defines the configuration schema for a repogate gateway process:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - HTTP listener and shared-secret authentication
// - Session TTL and sweep cadence
// - Repository visibility resolution (GitHub API or static table)
// - Legacy global-mode switches
// - Logging settings

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::legacy::LegacyModeConfig;
use crate::domain::session::DEFAULT_SESSION_TTL;
use crate::domain::visibility::{RepositoryRef, RepositoryVisibility};

pub const API_VERSION: &str = "repogate/v1";
pub const KIND: &str = "GatewayConfig";

/// Prefix marking a value to be read from the environment at load time.
const ENV_PREFIX: &str = "env:";

/// Top-level Kubernetes-style gateway configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfigManifest {
    /// API version (must be "repogate/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "GatewayConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    #[serde(default)]
    pub spec: GatewayConfigSpec,
}

/// Manifest metadata (Kubernetes-style)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable gateway name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfigSpec {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub sessions: SessionConfig,

    #[serde(default)]
    pub visibility: VisibilityConfig,

    /// Global-mode switches applied to checks that carry no session
    #[serde(default)]
    pub legacy: LegacyModeConfig,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observability: Option<ObservabilityConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Network bind address (e.g. "0.0.0.0" or "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP API port
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_api_port(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret every API request must present (supports "env:VAR_NAME")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Fixed lifetime of a session from registration
    #[serde(default = "default_session_ttl", with = "humantime_serde")]
    pub ttl: Duration,

    /// How often expired sessions are physically removed
    #[serde(default = "default_sweep_interval", with = "humantime_serde")]
    pub sweep_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: default_session_ttl(),
            sweep_interval: default_sweep_interval(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityProvider {
    /// Query the GitHub REST API
    Github,
    /// Fixed table from this file
    Static,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityConfig {
    #[serde(default = "default_provider")]
    pub provider: VisibilityProvider,

    /// REST API base URL (GitHub provider)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// API token (supports "env:VAR_NAME")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Upper bound on a single resolution, after which the repository is
    /// treated as unresolved
    #[serde(default = "default_resolve_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// How long a resolved visibility is reused. Zero disables the cache.
    #[serde(default = "default_cache_ttl", with = "humantime_serde")]
    pub cache_ttl: Duration,

    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Static provider: visibility for repositories not in `repositories`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<RepositoryVisibility>,

    /// Static provider: "owner/name" -> visibility
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub repositories: BTreeMap<String, RepositoryVisibility>,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_base: default_api_base(),
            token: None,
            timeout: default_resolve_timeout(),
            cache_ttl: default_cache_ttl(),
            cache_capacity: default_cache_capacity(),
            default: None,
            repositories: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "trace")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format ("json" or "text")
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    9443
}

fn default_session_ttl() -> Duration {
    DEFAULT_SESSION_TTL
}

fn default_sweep_interval() -> Duration {
    Duration::from_secs(300)
}

fn default_provider() -> VisibilityProvider {
    VisibilityProvider::Github
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_resolve_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_cache_ttl() -> Duration {
    Duration::from_secs(300)
}

fn default_cache_capacity() -> usize {
    1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for GatewayConfigManifest {
    fn default() -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "repogate".to_string());

        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: hostname,
                labels: None,
            },
            spec: GatewayConfigSpec::default(),
        }
    }
}

/// Resolve an "env:VAR_NAME" indirection, or return the literal value.
pub fn resolve_env_reference(value: &str) -> anyhow::Result<String> {
    match value.strip_prefix(ENV_PREFIX) {
        Some(var) => std::env::var(var)
            .map_err(|_| anyhow::anyhow!("Environment variable '{}' is not set", var)),
        None => Ok(value.to_string()),
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl GatewayConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. REPOGATE_CONFIG_PATH environment variable
    /// 2. ./repogate-config.yaml (working directory)
    /// 3. ~/.repogate/config.yaml (user home)
    /// 4. /etc/repogate/config.yaml (system, Unix) or C:\ProgramData\Repogate\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("REPOGATE_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./repogate-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".repogate").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        let system_config = PathBuf::from("/etc/repogate/config.yaml");
        #[cfg(windows)]
        let system_config = PathBuf::from("C:\\ProgramData\\Repogate\\config.yaml");

        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // 1. Explicit CLI path (Fail if missing/invalid)
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        // 2. Discovery (Env -> Cwd -> Home -> System)
        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup (the process environment in production)
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(secret) = lookup("REPOGATE_SHARED_SECRET") {
            tracing::info!("Environment override: REPOGATE_SHARED_SECRET=<redacted>");
            self.spec.auth.shared_secret = Some(secret);
        }

        if let Some(token) = lookup("REPOGATE_GITHUB_TOKEN") {
            tracing::info!("Environment override: REPOGATE_GITHUB_TOKEN=<redacted>");
            self.spec.visibility.token = Some(token);
        }

        for (key, flag) in [
            ("REPOGATE_PRIVATE_REPOS_ONLY", &mut self.spec.legacy.private_only),
            ("REPOGATE_PUBLIC_REPOS_ONLY", &mut self.spec.legacy.public_only),
        ] {
            if let Some(val) = lookup(key) {
                match parse_bool(&val) {
                    Some(parsed) => {
                        tracing::info!("Environment override: {}={}", key, parsed);
                        *flag = parsed;
                    }
                    None => {
                        tracing::warn!(
                            "Invalid value for {}: '{}'. Expected true/false. Ignoring.",
                            key,
                            val
                        );
                    }
                }
            }
        }
    }

    /// The shared secret with any "env:" indirection resolved.
    pub fn shared_secret(&self) -> anyhow::Result<String> {
        let raw = self
            .spec
            .auth
            .shared_secret
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("spec.auth.shared_secret is not set"))?;
        let secret = resolve_env_reference(raw)?;
        if secret.is_empty() {
            anyhow::bail!("spec.auth.shared_secret resolves to an empty string");
        }
        Ok(secret)
    }

    /// The visibility API token with any "env:" indirection resolved.
    pub fn visibility_token(&self) -> anyhow::Result<Option<String>> {
        self.spec
            .visibility
            .token
            .as_deref()
            .map(resolve_env_reference)
            .transpose()
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        self.shared_secret()?;

        if self.spec.sessions.ttl.is_zero() {
            anyhow::bail!("spec.sessions.ttl must be greater than zero");
        }

        let expiry = chrono::Duration::from_std(self.spec.sessions.ttl)
            .ok()
            .and_then(|ttl| chrono::Utc::now().checked_add_signed(ttl));
        if expiry.is_none() {
            anyhow::bail!("spec.sessions.ttl is out of range");
        }

        if self.spec.sessions.sweep_interval.is_zero() {
            anyhow::bail!("spec.sessions.sweep_interval must be greater than zero");
        }

        if self.spec.visibility.timeout.is_zero() {
            anyhow::bail!("spec.visibility.timeout must be greater than zero");
        }

        self.spec
            .legacy
            .equivalent_mode()
            .map_err(|e| anyhow::anyhow!("spec.legacy: {}", e))?;

        match self.spec.visibility.provider {
            VisibilityProvider::Github => {
                if self.spec.visibility.api_base.is_empty() {
                    anyhow::bail!("spec.visibility.api_base cannot be empty for the github provider");
                }
                self.visibility_token()?;
            }
            VisibilityProvider::Static => {
                for key in self.spec.visibility.repositories.keys() {
                    RepositoryRef::parse(key).map_err(|e| {
                        anyhow::anyhow!("spec.visibility.repositories: {}", e)
                    })?;
                }
            }
        }

        Ok(())
    }
}
