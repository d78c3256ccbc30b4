use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use std::{env, fs, io, time::Duration};
use time::UtcOffset;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("invalid config file {path}: {source}")]
    Parse { path: String, source: toml::de::Error },
    #[error("invalid value for {name}: {value}")]
    Env { name: &'static str, value: String },
    #[error("invalid scheduler.utc_offset '{0}', expected e.g. \"+09:00\"")]
    Offset(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            name: "megacitydb".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
            max_connections: 1,
            acquire_timeout_secs: 30,
        }
    }
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.name)
            .username(&self.user)
            .password(&self.password)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Pause after a failed cycle before waiting for the next midnight.
    pub failure_backoff_secs: u64,
    /// Offset used to find local midnight, e.g. "+09:00". Detected from the
    /// host when absent.
    pub utc_offset: Option<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            failure_backoff_secs: 60,
            utc_offset: None,
        }
    }
}

impl SchedulerConfig {
    pub fn failure_backoff(&self) -> Duration {
        Duration::from_secs(self.failure_backoff_secs)
    }

    pub fn parsed_offset(&self) -> Result<Option<UtcOffset>, ConfigError> {
        self.utc_offset.as_deref().map(parse_utc_offset).transpose()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Fixed seed for reproducible runs; OS entropy otherwise.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub scheduler: SchedulerConfig,
    pub generation: GenerationConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    /// Read the TOML file named by `SIMULATOR_CONFIG` (a missing file means
    /// defaults), then apply the `DB_*` environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("SIMULATOR_CONFIG").unwrap_or_else(|_| "simulator-config.toml".to_string());
        let mut cfg = match fs::read_to_string(&path) {
            Ok(contents) => Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path, "no config file, using defaults");
                Self::default()
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        cfg.apply_env(|name| env::var(name).ok())?;
        Ok(cfg)
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Environment wins over the file for connection settings.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db = &mut self.database;
        if let Some(v) = lookup("DB_HOST") {
            db.host = v;
        }
        if let Some(v) = lookup("DB_PORT") {
            let parsed = v.trim().parse::<u16>();
            db.port = parsed.map_err(|_| ConfigError::Env { name: "DB_PORT", value: v })?;
        }
        if let Some(v) = lookup("DB_NAME") {
            db.name = v;
        }
        if let Some(v) = lookup("DB_USER") {
            db.user = v;
        }
        if let Some(v) = lookup("DB_PASSWORD") {
            db.password = v;
        }
        Ok(())
    }
}

fn parse_utc_offset(raw: &str) -> Result<UtcOffset, ConfigError> {
    let bad = || ConfigError::Offset(raw.to_string());
    let s = raw.trim();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1i8, &s[1..]),
        Some(b'-') => (-1i8, &s[1..]),
        _ => return Err(bad()),
    };
    let (h, m) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours: i8 = h.parse().map_err(|_| bad())?;
    let minutes: i8 = m.parse().map_err(|_| bad())?;
    UtcOffset::from_hms(sign * hours, sign * minutes, 0).map_err(|_| bad())
}
