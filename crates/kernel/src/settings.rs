use std::path::PathBuf;

use anyhow::{anyhow, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "LIBRIS_ENV";
const CONFIG_DIR_ENV: &str = "LIBRIS_CONFIG_DIR";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub circulation: CirculationSettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, and environment overlay.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = std::env::var(CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                // Default to repo root `config` directory.
                std::env::current_dir()
                    .map(|cwd| cwd.join("config"))
                    .expect("unable to resolve current directory")
            });

        let base_path = config_dir.join("base.toml");
        let environment_filename = format!("{}.toml", environment);
        let environment_path = config_dir.join(environment_filename);

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(config::Environment::with_prefix("LIBRIS").separator("_"));

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        // Override environment field with parsed enum variant.
        settings.environment = match environment.as_str() {
            "local" => Environment::Local,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            other => {
                return Err(anyhow!(
                    "unsupported environment '{}'; expected local/staging/production",
                    other
                ));
            }
        };

        Ok(settings)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_filter: Option<String>,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_filter: None,
            log_format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Lending-desk policy knobs. These are business policy, not code
/// constants; every value can be overridden per deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct CirculationSettings {
    /// Maximum simultaneously open issues per reader.
    #[serde(default = "CirculationSettings::default_max_open_issues")]
    pub max_open_issues: u32,
    /// Maximum times a single issue may be renewed.
    #[serde(default = "CirculationSettings::default_renewal_cap")]
    pub renewal_cap: u32,
    /// Loan period applied when an issue request does not name one.
    #[serde(default = "CirculationSettings::default_loan_days")]
    pub loan_days: i64,
    /// Upper bound for a requested loan period, in days.
    #[serde(default = "CirculationSettings::default_max_due_days")]
    pub max_due_days: i64,
    /// Fine accrued per whole overdue day, in minor currency units.
    #[serde(default = "CirculationSettings::default_daily_fine")]
    pub daily_fine: i64,
    /// Days a ready reservation holds its copy before expiring.
    #[serde(default = "CirculationSettings::default_hold_days")]
    pub hold_days: i64,
    /// Replacement fee charged when a copy is marked lost or damaged
    /// while out on loan. Absent means no automatic fee.
    #[serde(default)]
    pub replacement_fee: Option<i64>,
}

impl CirculationSettings {
    fn default_max_open_issues() -> u32 {
        5
    }

    fn default_renewal_cap() -> u32 {
        3
    }

    fn default_loan_days() -> i64 {
        14
    }

    fn default_max_due_days() -> i64 {
        30
    }

    fn default_daily_fine() -> i64 {
        50
    }

    fn default_hold_days() -> i64 {
        3
    }
}

impl Default for CirculationSettings {
    fn default() -> Self {
        Self {
            max_open_issues: Self::default_max_open_issues(),
            renewal_cap: Self::default_renewal_cap(),
            loan_days: Self::default_loan_days(),
            max_due_days: Self::default_max_due_days(),
            daily_fine: Self::default_daily_fine(),
            hold_days: Self::default_hold_days(),
            replacement_fee: None,
        }
    }
}
