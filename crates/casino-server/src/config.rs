use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use casino_core::crypto::PasswordParams;
use casino_core::http::ParseLimits;
use casino_core::StoreOptions;
use serde::{Deserialize, Serialize};

use crate::server::ServerOptions;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CasinoConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    pub read_timeout_seconds: u64,
    pub write_timeout_seconds: u64,
    /// Whole-request budget; slow clients are cut off after this.
    pub request_deadline_seconds: u64,
    pub max_connections: usize,
    pub max_body_bytes: usize,
    pub max_header_lines: usize,
    pub max_line_bytes: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub path: String,
    /// Prefer `CASINO_PASSPHRASE` or the prompt over storing it here.
    pub passphrase: Option<String>,
    pub work_factor: u8,
    pub password_memory_kib: u32,
    pub password_iterations: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub file: Option<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            read_timeout_seconds: 30,
            write_timeout_seconds: 30,
            request_deadline_seconds: 60,
            max_connections: 256,
            max_body_bytes: 16 * 1024,
            max_header_lines: 100,
            max_line_bytes: 8192,
        }
    }
}

impl Default for StorageSection {
    fn default() -> Self {
        let password = PasswordParams::default();
        Self {
            path: "usuarios.txt".to_string(),
            passphrase: None,
            work_factor: StoreOptions::default().work_factor,
            password_memory_kib: password.memory_kib,
            password_iterations: password.iterations,
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl ServerSection {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Connection limits for the acceptor.
    ///
    /// Zero timeouts or a zero connection limit would leave every
    /// connection unanswered, so they are startup errors.
    pub fn options(&self) -> anyhow::Result<ServerOptions> {
        let options = ServerOptions {
            read_timeout: Duration::from_secs(self.read_timeout_seconds),
            write_timeout: Duration::from_secs(self.write_timeout_seconds),
            request_deadline: Duration::from_secs(self.request_deadline_seconds),
            max_connections: self.max_connections,
            limits: ParseLimits {
                max_line_bytes: self.max_line_bytes,
                max_headers: self.max_header_lines,
                max_body_bytes: self.max_body_bytes,
            },
        };
        options
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid [server] settings: {}", e))?;
        Ok(options)
    }
}

impl StorageSection {
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            work_factor: self.work_factor,
            password: PasswordParams {
                memory_kib: self.password_memory_kib,
                iterations: self.password_iterations,
                ..PasswordParams::default()
            },
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .ok_or_else(|| anyhow::anyhow!("Neither XDG_CONFIG_HOME nor HOME is set"))?;
    Ok(base.join("casino").join("config.toml"))
}

/// Load the config at `explicit`, which must exist, or else the default
/// path when present, or else built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<CasinoConfig> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => (default_config_path()?, false),
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => toml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Config {} is not valid TOML: {}", path.display(), e)),
        Err(e) if !required && e.kind() == io::ErrorKind::NotFound => Ok(CasinoConfig::default()),
        Err(e) => Err(anyhow::anyhow!("Cannot read config {}: {}", path.display(), e)),
    }
}

/// Write `config` as TOML, creating parent directories.
pub fn write_config(path: &Path, config: &CasinoConfig) -> anyhow::Result<()> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| anyhow::anyhow!("Cannot serialize config: {}", e))?;
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    parent
        .map_or(Ok(()), std::fs::create_dir_all)
        .and_then(|()| std::fs::write(path, contents))
        .map_err(|e| anyhow::anyhow!("Cannot write config {}: {}", path.display(), e))
}
