use crate::errors::ConfigError;
use crate::stats::DurationPolicy;
use std::env;
use url::Url;

pub const DEFAULT_API_URL: &str =
    "https://customer-rest-service-frontend-personaltrainer.2.rahtiapp.fi/api";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub api_url: String,
    pub duration_policy: DurationPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::Port(value))?,
            None => DEFAULT_PORT,
        };

        let api_url = lookup("TRAINER_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        match Url::parse(&api_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(ConfigError::ApiUrl(api_url)),
        }

        let duration_policy = match lookup("DURATION_POLICY") {
            Some(value) => value
                .parse::<DurationPolicy>()
                .map_err(|_| ConfigError::DurationPolicy(value))?,
            None => DurationPolicy::default(),
        };

        Ok(Self {
            port,
            api_url: api_url.trim_end_matches('/').to_string(),
            duration_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.duration_policy, DurationPolicy::CountAsZero);
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "3000"),
            ("TRAINER_API_URL", "http://127.0.0.1:9000/api/"),
            ("DURATION_POLICY", "exclude"),
        ]))
        .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.api_url, "http://127.0.0.1:9000/api");
        assert_eq!(config.duration_policy, DurationPolicy::Exclude);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("PORT", "eighty")])),
            Err(ConfigError::Port(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("TRAINER_API_URL", "ftp://files")])),
            Err(ConfigError::ApiUrl(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("DURATION_POLICY", "ignore")])),
            Err(ConfigError::DurationPolicy(_))
        ));
    }
}
