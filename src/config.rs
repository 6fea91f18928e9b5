// Configuration module

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Main server configuration, loaded from TOML with environment-variable
/// overrides for the values that differ per deployment or are secrets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub encryption: EncryptionSettings,
    #[serde(default)]
    pub tenant: TenantSettings,
    #[serde(default)]
    pub oracle: OracleSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Optional admin seed applied together with `--migrate`.
    #[serde(default)]
    pub bootstrap: Option<BootstrapSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// 0 means one worker per CPU core.
    #[serde(default)]
    pub workers: usize,
    /// Cap on the per-worker blocking pool that runs the CPU-bound crypto.
    #[serde(default = "default_blocking_threads")]
    pub worker_max_blocking_threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_url")]
    pub url: String,
    #[serde(default = "default_store_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_store_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptionSettings {
    #[serde(default = "default_private_key_path")]
    pub private_key_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantSettings {
    /// Bound on any tenant-controlled connection attempt.
    #[serde(default = "default_tenant_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleSettings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_oracle_base_url")]
    pub base_url: String,
    #[serde(default = "default_oracle_model")]
    pub model: String,
    #[serde(default = "default_oracle_timeout")]
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Console-only when absent.
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default = "default_true")]
    pub log_to_console: bool,
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapSettings {
    pub admin_username: String,
    pub admin_password: String,
    #[serde(default = "default_admin_role")]
    pub admin_role: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
            worker_max_blocking_threads: default_blocking_threads(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            max_connections: default_store_max_connections(),
            acquire_timeout_seconds: default_store_acquire_timeout(),
        }
    }
}

impl Default for EncryptionSettings {
    fn default() -> Self {
        Self {
            private_key_path: default_private_key_path(),
        }
    }
}

impl Default for TenantSettings {
    fn default() -> Self {
        Self {
            connect_timeout_seconds: default_tenant_connect_timeout(),
        }
    }
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_oracle_base_url(),
            model: default_oracle_model(),
            request_timeout_seconds: default_oracle_timeout(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_path: None,
            log_to_console: true,
            format: default_log_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            store: StoreSettings::default(),
            encryption: EncryptionSettings::default(),
            tenant: TenantSettings::default(),
            oracle: OracleSettings::default(),
            logging: LoggingSettings::default(),
            bootstrap: None,
        }
    }
}

// Default value functions

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_blocking_threads() -> usize {
    64
}

fn default_store_url() -> String {
    "postgres://localhost:5432/sys".to_string()
}

fn default_store_max_connections() -> u32 {
    10
}

fn default_store_acquire_timeout() -> u64 {
    30
}

fn default_private_key_path() -> String {
    "encryption_private_key.pem".to_string()
}

fn default_tenant_connect_timeout() -> u64 {
    10
}

fn default_oracle_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".to_string()
}

fn default_oracle_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_oracle_timeout() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

fn default_true() -> bool {
    true
}

fn default_admin_role() -> String {
    "admin".to_string()
}

impl ServerConfig {
    /// Load configuration from a TOML file, then apply env overrides and
    /// validate.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to read config file: {e}"))?;

        let mut config: ServerConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("failed to parse config file: {e}"))?;

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Environment overrides, applied after the file:
    /// - MEMBERDB_HOST / MEMBERDB_PORT
    /// - MEMBERDB_STORE_URL (contains credentials; prefer env over file)
    /// - MEMBERDB_PRIVATE_KEY_PATH
    /// - MEMBERDB_ORACLE_API_KEY / MEMBERDB_ORACLE_BASE_URL / MEMBERDB_ORACLE_MODEL
    /// - MEMBERDB_LOG_FILE_PATH
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        use std::env;

        if let Ok(host) = env::var("MEMBERDB_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("MEMBERDB_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid MEMBERDB_PORT value: {port}"))?;
        }
        if let Ok(url) = env::var("MEMBERDB_STORE_URL") {
            self.store.url = url;
        }
        if let Ok(path) = env::var("MEMBERDB_PRIVATE_KEY_PATH") {
            self.encryption.private_key_path = path;
        }
        if let Ok(key) = env::var("MEMBERDB_ORACLE_API_KEY") {
            self.oracle.api_key = key;
        }
        if let Ok(url) = env::var("MEMBERDB_ORACLE_BASE_URL") {
            self.oracle.base_url = url;
        }
        if let Ok(model) = env::var("MEMBERDB_ORACLE_MODEL") {
            self.oracle.model = model;
        }
        if let Ok(path) = env::var("MEMBERDB_LOG_FILE_PATH") {
            self.logging.file_path = Some(path);
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("server port cannot be 0"));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "invalid log level '{}', must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            ));
        }

        let valid_formats = ["compact", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "invalid log format '{}', must be one of: {}",
                self.logging.format,
                valid_formats.join(", ")
            ));
        }

        if self.store.max_connections == 0 {
            return Err(anyhow::anyhow!("store.max_connections cannot be 0"));
        }
        if self.tenant.connect_timeout_seconds == 0 {
            return Err(anyhow::anyhow!(
                "tenant.connect_timeout_seconds cannot be 0; tenant endpoints must not hang requests"
            ));
        }
        if self.server.worker_max_blocking_threads == 0 {
            return Err(anyhow::anyhow!(
                "server.worker_max_blocking_threads cannot be 0"
            ));
        }
        Ok(())
    }
}
