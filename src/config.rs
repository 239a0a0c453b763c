//! Command line, settings file and saved connections.
//!
//! Settings come from `<config_dir>/ferry/config.toml` (all keys optional);
//! saved connections live in `~/.ferry.toml`. Neither file is required.

use anyhow::{bail, ensure, Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::heartbeat::DEFAULT_INTERVAL;

pub const DEFAULT_VIEWPORT_HEIGHT: usize = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Parser, Debug)]
#[command(name = "ferry", version, about = "Dual-pane file browser for FTP servers")]
pub struct Cli {
    /// FTP server host
    pub server: Option<String>,

    #[arg(short, long, default_value_t = 21)]
    pub port: u16,

    #[arg(short, long, default_value = "anonymous")]
    pub user: String,

    #[arg(long, env = "FERRY_PASSWORD", hide_env_values = true, default_value = "")]
    pub password: String,

    /// Use explicit FTPS
    #[arg(long)]
    pub tls: bool,

    /// Initial remote directory
    #[arg(long, default_value = "/")]
    pub remote_dir: String,

    /// Initial local directory (defaults to the working directory)
    #[arg(long)]
    pub local_dir: Option<PathBuf>,

    /// Browse a second local directory in the right pane instead of a server
    #[arg(long, conflicts_with = "server")]
    pub mirror: Option<PathBuf>,

    /// Connect to the Nth saved connection (see --list-saved)
    #[arg(long, conflicts_with_all = ["server", "mirror"])]
    pub saved: Option<usize>,

    /// Print saved connections and exit
    #[arg(long)]
    pub list_saved: bool,

    /// Do not remember this connection after a successful login
    #[arg(long)]
    pub no_save: bool,

    /// Settings file to use instead of the default one
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// What the right-hand pane is connected to.
#[derive(Debug, Clone)]
pub enum Target {
    Ftp(ConnectParams),
    Mirror(PathBuf),
}

impl Cli {
    /// Resolve the right-hand pane target from arguments and saved connections.
    pub fn target(&self, saved: &SavedConnections) -> Result<Target> {
        if let Some(dir) = &self.mirror {
            return Ok(Target::Mirror(dir.clone()));
        }

        if let Some(index) = self.saved {
            let record = saved
                .servers
                .get(index)
                .with_context(|| format!("No saved connection #{} ({} saved)", index, saved.servers.len()))?;
            return Ok(Target::Ftp(ConnectParams {
                server: record.server.clone(),
                port: record.port,
                user: record.user.clone(),
                password: self.password.clone(),
                tls: self.tls,
                remote_dir: self.remote_dir.clone(),
            }));
        }

        let Some(server) = &self.server else {
            bail!("No server given; pass a host, --saved N or --mirror DIR");
        };

        Ok(Target::Ftp(ConnectParams {
            server: server.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            tls: self.tls,
            remote_dir: self.remote_dir.clone(),
        }))
    }
}

/// Everything needed to (re)open an FTP session.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectParams {
    pub server: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub tls: bool,
    pub remote_dir: String,
}

impl ConnectParams {
    pub fn record(&self) -> ConnectionRecord {
        ConnectionRecord {
            server: self.server.clone(),
            port: self.port,
            user: self.user.clone(),
        }
    }
}

// Keep the password out of logs.
impl fmt::Debug for ConnectParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectParams")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("tls", &self.tls)
            .field("remote_dir", &self.remote_dir)
            .finish_non_exhaustive()
    }
}

/// User settings. Every key is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rows shown per pane.
    pub viewport_height: usize,
    /// Seconds between remote liveness probes.
    pub heartbeat_secs: u64,
    pub connect_timeout_secs: u64,
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            heartbeat_secs: DEFAULT_INTERVAL.as_secs(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            log_file: None,
        }
    }
}

impl Settings {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("ferry").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("ferry.toml"))
    }

    /// Load settings; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        let settings: Settings = toml::from_str(&text)
            .with_context(|| format!("Invalid settings file: {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.viewport_height > 0, "viewport_height must be at least 1");
        ensure!(self.heartbeat_secs > 0, "heartbeat_secs must be at least 1");
        ensure!(self.connect_timeout_secs > 0, "connect_timeout_secs must be at least 1");
        Ok(())
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("ferry")
                .join("ferry.log")
        })
    }
}

/// A remembered login, without the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub server: String,
    pub port: u16,
    pub user: String,
}

impl fmt::Display for ConnectionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.user, self.server, self.port)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedConnections {
    #[serde(default)]
    pub servers: Vec<ConnectionRecord>,
}

impl SavedConnections {
    pub fn contains(&self, record: &ConnectionRecord) -> bool {
        self.servers.iter().any(|r| r == record)
    }
}

/// Append-only store of saved connections, deduplicated by full equality.
pub struct ConnectionStore {
    path: PathBuf,
}

impl ConnectionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".ferry.toml")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<SavedConnections> {
        if !self.path.exists() {
            return Ok(SavedConnections::default());
        }
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read saved connections: {}", self.path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Invalid saved connections file: {}", self.path.display()))
    }

    /// Remember `record`. Returns `false` if it was already saved.
    pub fn add(&self, record: ConnectionRecord) -> Result<bool> {
        let mut saved = self.load()?;
        if saved.contains(&record) {
            return Ok(false);
        }
        saved.servers.push(record);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let text = toml::to_string_pretty(&saved).context("Failed to encode saved connections")?;
        fs::write(&self.path, text)
            .with_context(|| format!("Failed to write saved connections: {}", self.path.display()))?;
        Ok(true)
    }
}
