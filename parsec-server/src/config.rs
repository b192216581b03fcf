use crate::errors::config_error::ConfigError;
use axum::http::HeaderValue;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Server settings, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub sweep_interval: Duration,
    pub idle_timeout: chrono::Duration,
    /// Origin allowed by CORS, if any
    pub frontend_url: Option<HeaderValue>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let sweep_interval = positive(&lookup, "SWEEP_INTERVAL_SECS", 60u64)?;
        let idle_timeout = positive(&lookup, "IDLE_TIMEOUT_SECS", 300i64)?;
        // Beyond what chrono can represent
        let idle_timeout =
            chrono::Duration::try_seconds(idle_timeout).ok_or_else(|| ConfigError::InvalidNumber {
                name: "IDLE_TIMEOUT_SECS",
                value: idle_timeout.to_string(),
            })?;

        let frontend_url = lookup("FRONTEND_URL")
            .map(|url| url.parse::<HeaderValue>())
            .transpose()
            .or(Err(ConfigError::InvalidFrontendUrl))?;

        Ok(Config {
            port: positive(&lookup, "PORT", 8080u16)?,
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| String::from("raid_groups.db")),
            sweep_interval: Duration::from_secs(sweep_interval),
            idle_timeout,
            frontend_url,
        })
    }
}

fn positive<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Default,
{
    let Some(value) = lookup(name) else {
        return Ok(default);
    };

    value
        .trim()
        .parse::<T>()
        .ok()
        .filter(|number| *number > T::default())
        .ok_or(ConfigError::InvalidNumber { name, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, "raid_groups.db");
        assert_eq!(config.sweep_interval, Duration::from_secs(60));
        assert_eq!(config.idle_timeout, chrono::Duration::minutes(5));
        assert!(config.frontend_url.is_none());
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("PORT", "9000"),
            ("DATABASE_URL", "/tmp/groups.db"),
            ("SWEEP_INTERVAL_SECS", "5"),
            ("IDLE_TIMEOUT_SECS", "30"),
            ("FRONTEND_URL", "https://parsec.example"),
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.database_url, "/tmp/groups.db");
        assert_eq!(config.sweep_interval, Duration::from_secs(5));
        assert_eq!(config.idle_timeout, chrono::Duration::seconds(30));
        assert_eq!(config.frontend_url.unwrap(), "https://parsec.example");
    }

    #[test]
    fn rejects_zero_and_garbage() {
        assert!(matches!(
            config(&[("SWEEP_INTERVAL_SECS", "0")]),
            Err(ConfigError::InvalidNumber { name: "SWEEP_INTERVAL_SECS", .. })
        ));
        assert!(matches!(
            config(&[("PORT", "eighty")]),
            Err(ConfigError::InvalidNumber { name: "PORT", .. })
        ));
    }

    #[test]
    fn rejects_idle_timeout_out_of_range() {
        let max = i64::MAX.to_string();

        assert!(matches!(
            config(&[("IDLE_TIMEOUT_SECS", &max)]),
            Err(ConfigError::InvalidNumber { name: "IDLE_TIMEOUT_SECS", .. })
        ));
    }
}
