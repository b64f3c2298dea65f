use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 29305;
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(3600);

/// Server configuration, read from the environment (and a `.env` file, if there is one).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Address to bind the listeners to.
    pub address: IpAddr,
    /// Port for game websocket connections.
    pub port: u16,
    /// Port for the HTTP API; the API is disabled if this is unset.
    pub api_port: Option<u16>,
    /// How long a game nobody is connected to is kept around.
    pub idle_timeout: Duration,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not a valid value for {1}")]
    InvalidValue(String, &'static str),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            api_port: None,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

impl Config {
    /// Reads the configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Reads the configuration using the given variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            address: parse(&var, "ADDRESS")?.unwrap_or(defaults.address),
            port: parse(&var, "PORT")?.unwrap_or(defaults.port),
            api_port: parse(&var, "API_PORT")?,
            idle_timeout: parse(&var, "IDLE_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.idle_timeout),
        })
    }
}

fn parse<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match var(key) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(value, key)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(Config::from_vars(vars(&[])), Ok(Config::default()));
    }

    #[test]
    fn reads_every_variable() {
        let config = Config::from_vars(vars(&[
            ("ADDRESS", "0.0.0.0"),
            ("PORT", "8080"),
            ("API_PORT", "8081"),
            ("IDLE_TIMEOUT_SECS", "60"),
        ]))
        .unwrap();
        assert_eq!(config.address, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.port, 8080);
        assert_eq!(config.api_port, Some(8081));
        assert_eq!(config.idle_timeout, Duration::from_secs(60));
    }

    #[test]
    fn rejects_bad_port() {
        assert_eq!(
            Config::from_vars(vars(&[("PORT", "http")])),
            Err(ConfigError::InvalidValue("http".into(), "PORT"))
        );
    }
}
