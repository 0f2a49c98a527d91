use crate::smart::overrides::{parse_overrides, AttributeOverride};
use anyhow::{Context, Result};
use dotenvy::dotenv;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_SETUP_CONFIG_PATH: &str = "/etc/smart-health/config.json";

fn setup_config_path() -> PathBuf {
    if let Ok(path) = env::var("SMART_HEALTH_SETUP_CONFIG_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    PathBuf::from(DEFAULT_SETUP_CONFIG_PATH)
}

/// Settings an operator may place in the JSON setup file. Scalars lose to
/// the corresponding environment variable; overrides live only here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetupConfig {
    #[serde(default)]
    database_url: Option<String>,
    #[serde(default)]
    db_pool_size: Option<u32>,
    #[serde(default)]
    downsample_enabled: Option<bool>,
    #[serde(default)]
    downsample_run_on_start: Option<bool>,
    #[serde(default)]
    retention_sweep_interval_secs: Option<u64>,
    #[serde(default)]
    attribute_overrides: Vec<JsonValue>,
}

/// Reads the setup file at `path`. A missing file is not an error; an
/// unparseable one is, since dropping its overrides would change verdicts.
pub fn load_setup_config(path: &Path) -> Result<Option<SetupConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "failed to read setup config; using env defaults"
            );
            return Ok(None);
        }
    };
    let parsed = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse setup config {}", path.display()))?;
    Ok(Some(parsed))
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: Option<String>,
    pub db_pool_size: u32,
    pub downsample_enabled: bool,
    pub downsample_run_on_start: bool,
    pub retention_sweep_interval_secs: u64,
    pub attribute_overrides: Vec<AttributeOverride>,
    pub otlp_endpoint: Option<String>,
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let setup = load_setup_config(&setup_config_path())?;
        Self::from_sources(|key| env::var(key).ok(), setup)
    }

    /// Builds the config from an environment lookup and an optional setup
    /// file. Blank environment values count as unset.
    pub fn from_sources(
        lookup: impl Fn(&str) -> Option<String>,
        setup: Option<SetupConfig>,
    ) -> Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let setup = setup.unwrap_or_default();

        let database_url = var("SMART_HEALTH_DATABASE_URL")
            .or_else(|| var("DATABASE_URL"))
            .or_else(|| {
                setup
                    .database_url
                    .as_deref()
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(str::to_string)
            });
        let db_pool_size = var("SMART_HEALTH_DB_POOL_SIZE")
            .and_then(|v| v.parse::<u32>().ok())
            .or(setup.db_pool_size)
            .filter(|v| *v != 0)
            .unwrap_or(5);
        let downsample_enabled = var("SMART_HEALTH_DOWNSAMPLE_ENABLED")
            .and_then(|v| parse_bool(&v))
            .or(setup.downsample_enabled)
            .unwrap_or(true);
        let downsample_run_on_start = var("SMART_HEALTH_DOWNSAMPLE_RUN_ON_START")
            .and_then(|v| parse_bool(&v))
            .or(setup.downsample_run_on_start)
            .unwrap_or(false);
        let retention_sweep_interval_secs = var("SMART_HEALTH_RETENTION_SWEEP_INTERVAL_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .or(setup.retention_sweep_interval_secs)
            .filter(|v| *v != 0)
            .unwrap_or(86_400);
        let attribute_overrides = parse_overrides(&setup.attribute_overrides)
            .context("setup config has an invalid attribute_overrides entry")?;
        let otlp_endpoint = var("OTEL_EXPORTER_OTLP_ENDPOINT");

        Ok(Self {
            database_url,
            db_pool_size,
            downsample_enabled,
            downsample_run_on_start,
            retention_sweep_interval_secs,
            attribute_overrides,
            otlp_endpoint,
        })
    }

    pub fn database_url(&self) -> Result<&str> {
        self.database_url.as_deref().context(
            "SMART_HEALTH_DATABASE_URL or DATABASE_URL is required (or database_url in the setup config)",
        )
    }

    pub fn retention_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.retention_sweep_interval_secs)
    }
}
