use std::env;
use tracing::{info, warn};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_REQUIRED_ANGLES: &str = "front,rear,left,right";
pub const DEFAULT_OPERATOR: &str = "front-desk";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub api_base_url: String,
    pub required_angles: Vec<String>,
    pub operator: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = match lookup("PORT") {
            Some(value) => value.parse::<u16>().unwrap_or_else(|err| {
                warn!("invalid PORT {value:?} ({err}), using {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let api_base_url = lookup("API_BASE_URL")
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| {
                info!("API_BASE_URL not set, using {DEFAULT_API_BASE_URL}");
                DEFAULT_API_BASE_URL.to_string()
            });

        let required_angles = lookup("REQUIRED_ANGLES")
            .map(|value| parse_angles(&value))
            .filter(|angles| !angles.is_empty())
            .unwrap_or_else(|| parse_angles(DEFAULT_REQUIRED_ANGLES));

        let operator = lookup("OPERATOR_NAME")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_OPERATOR.to_string());

        Self {
            port,
            api_base_url,
            required_angles,
            operator,
        }
    }
}

/// Comma separated labels, trimmed, blanks dropped. Case is preserved.
pub fn parse_angles(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|angle| !angle.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.required_angles, vec!["front", "rear", "left", "right"]);
        assert_eq!(config.operator, DEFAULT_OPERATOR);
    }

    #[test]
    fn values_are_read_and_normalised() {
        let config = config_from(&[
            ("PORT", "9090"),
            ("API_BASE_URL", "http://shop.local:4000/"),
            ("REQUIRED_ANGLES", " front-left, ,Rear "),
            ("OPERATOR_NAME", "sam"),
        ]);
        assert_eq!(config.port, 9090);
        assert_eq!(config.api_base_url, "http://shop.local:4000");
        assert_eq!(config.required_angles, vec!["front-left", "Rear"]);
        assert_eq!(config.operator, "sam");
    }

    #[test]
    fn bad_port_falls_back() {
        let config = config_from(&[("PORT", "eighty")]);
        assert_eq!(config.port, DEFAULT_PORT);
    }
}
