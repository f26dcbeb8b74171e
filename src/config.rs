use thiserror::Error;

/// Default source bucket holding the raw 5-minute bars
const DEFAULT_SOURCE_BUCKET: &str = "stocks_5m";

/// Default trailing fetch window in days
const DEFAULT_LOOKBACK_DAYS: u32 = 30;

/// Default moving-average window in samples
const DEFAULT_WINDOW: usize = 10;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {var}: '{value}'")]
    InvalidVar { var: &'static str, value: String },
}

/// Run configuration, resolved once at startup
///
/// All knobs are injected explicitly instead of being read ambiently inside
/// the computation logic, keeping the core testable without environment
/// mutation. The optional knobs default to the values the job has always
/// used in production.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// InfluxDB endpoint base URL (`INFLUXDB_URL`)
    pub url: String,

    /// API token (`INFLUXDB_TOKEN`)
    pub token: String,

    /// Organization (`INFLUXDB_ORG`)
    pub org: String,

    /// Target bucket derived points are written to (`INFLUXDB_BUCKET`)
    pub bucket: String,

    /// Source bucket holding the raw bars (`SOURCE_BUCKET`)
    pub source_bucket: String,

    /// Trailing fetch window in days (`LOOKBACK_DAYS`)
    pub lookback_days: u32,

    /// Moving-average window in samples, at least 1 (`MOVING_AVG_WINDOW`)
    pub window: usize,
}

impl AggregatorConfig {
    /// Load configuration from the environment
    ///
    /// Missing required variables and unparseable optional ones are hard
    /// errors; a mistyped override should stop the run, not silently fall
    /// back to a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let window: usize = optional_parsed("MOVING_AVG_WINDOW", DEFAULT_WINDOW)?;
        if window == 0 {
            return Err(ConfigError::InvalidVar {
                var: "MOVING_AVG_WINDOW",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            url: require("INFLUXDB_URL")?,
            token: require("INFLUXDB_TOKEN")?,
            org: require("INFLUXDB_ORG")?,
            bucket: require("INFLUXDB_BUCKET")?,
            source_bucket: std::env::var("SOURCE_BUCKET")
                .unwrap_or_else(|_| DEFAULT_SOURCE_BUCKET.to_string()),
            lookback_days: optional_parsed("LOOKBACK_DAYS", DEFAULT_LOOKBACK_DAYS)?,
            window,
        })
    }
}

fn require(var: &'static str) -> Result<String, ConfigError> {
    std::env::var(var).map_err(|_| ConfigError::MissingVar(var))
}

fn optional_parsed<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(parsed) => Ok(parsed),
            Err(_) => Err(ConfigError::InvalidVar { var, value: raw }),
        },
        Err(_) => Ok(default),
    }
}
