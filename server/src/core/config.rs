use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_HOST, DEFAULT_OTEL_GRPC_PORT,
    DEFAULT_OTLP_BODY_LIMIT, DEFAULT_PORT,
};

// =============================================================================
// Orphan Span Policy
// =============================================================================

/// What to do with decoded spans that carry no run id
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanPolicy {
    /// Persist orphans. They have no run, so the run routes never list them
    #[default]
    Store,
    /// Discard orphans before they reach storage
    Drop,
}

impl fmt::Display for OrphanPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrphanPolicy::Store => write!(f, "store"),
            OrphanPolicy::Drop => write!(f, "drop"),
        }
    }
}

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// gRPC configuration (nested under otel)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct GrpcFileConfig {
    pub enabled: Option<bool>,
    pub port: Option<u16>,
}

/// OpenTelemetry intake configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct OtelFileConfig {
    pub grpc: Option<GrpcFileConfig>,
    /// Maximum OTLP request size in bytes (HTTP body and gRPC message)
    pub body_limit_bytes: Option<usize>,
}

/// Span storage configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StorageFileConfig {
    pub orphan_spans: Option<OrphanPolicy>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub otel: Option<OtelFileConfig>,
    pub storage: Option<StorageFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        if let Some(otel) = other.otel {
            let current = self.otel.get_or_insert_with(OtelFileConfig::default);

            if let Some(grpc) = otel.grpc {
                let current_grpc = current.grpc.get_or_insert_with(GrpcFileConfig::default);
                if grpc.enabled.is_some() {
                    tracing::trace!(enabled = ?grpc.enabled, "Merging otel.grpc.enabled");
                    current_grpc.enabled = grpc.enabled;
                }
                if grpc.port.is_some() {
                    tracing::trace!(port = ?grpc.port, "Merging otel.grpc.port");
                    current_grpc.port = grpc.port;
                }
            }

            if otel.body_limit_bytes.is_some() {
                tracing::trace!(limit = ?otel.body_limit_bytes, "Merging otel.body_limit_bytes");
                current.body_limit_bytes = otel.body_limit_bytes;
            }
        }

        if let Some(storage) = other.storage {
            let current = self.storage.get_or_insert_with(StorageFileConfig::default);
            if storage.orphan_spans.is_some() {
                tracing::trace!(policy = ?storage.orphan_spans, "Merging storage.orphan_spans");
                current.orphan_spans = storage.orphan_spans;
            }
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// OpenTelemetry intake configuration
#[derive(Debug, Clone)]
pub struct OtelConfig {
    pub grpc_enabled: bool,
    pub grpc_port: u16,
    pub body_limit_bytes: usize,
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            grpc_enabled: true,
            grpc_port: DEFAULT_OTEL_GRPC_PORT,
            body_limit_bytes: DEFAULT_OTLP_BODY_LIMIT,
        }
    }
}

/// Span storage configuration
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    pub orphan_spans: OrphanPolicy,
}

/// Final merged application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub otel: OtelConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.runlens/runlens.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        // 1. Load from profile dir (~/.runlens/runlens.json) - skip if not exists
        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        // 2. Load from CLI-specified path OR local directory
        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        // 3. Extract file config values with defaults
        let file_server = file_config.server.unwrap_or_default();
        let file_otel = file_config.otel.unwrap_or_default();
        let file_grpc = file_otel.grpc.unwrap_or_default();
        let file_storage = file_config.storage.unwrap_or_default();

        // 4. Layer configs: defaults -> file config -> CLI/env overrides
        let defaults = Self::default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or(defaults.server.host);

        let port = cli.port.or(file_server.port).unwrap_or(defaults.server.port);

        let otel = OtelConfig {
            grpc_enabled: cli
                .otel_grpc
                .or(file_grpc.enabled)
                .unwrap_or(defaults.otel.grpc_enabled),
            grpc_port: cli
                .otel_grpc_port
                .or(file_grpc.port)
                .unwrap_or(defaults.otel.grpc_port),
            body_limit_bytes: file_otel
                .body_limit_bytes
                .unwrap_or(defaults.otel.body_limit_bytes),
        };

        let storage = StorageConfig {
            orphan_spans: cli
                .orphan_spans
                .or(file_storage.orphan_spans)
                .unwrap_or_default(),
        };

        let config = Self {
            server: ServerConfig { host, port },
            otel,
            storage,
        };

        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            grpc_enabled = config.otel.grpc_enabled,
            grpc_port = config.otel.grpc_port,
            orphan_spans = %config.storage.orphan_spans,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        // Port 0 would bind an ephemeral port nobody can export to
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }
        if self.otel.grpc_enabled && self.otel.grpc_port == 0 {
            anyhow::bail!("Configuration error: otel.grpc.port must be greater than 0");
        }

        if self.otel.grpc_enabled && self.server.port == self.otel.grpc_port {
            anyhow::bail!(
                "Configuration error: server.port ({}) and otel.grpc.port ({}) cannot be the same",
                self.server.port,
                self.otel.grpc_port
            );
        }

        if self.otel.body_limit_bytes == 0 {
            anyhow::bail!("Configuration error: otel.body_limit_bytes must be greater than 0");
        }

        Ok(())
    }
}

/// Get the profile config path (~/.runlens/runlens.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}
