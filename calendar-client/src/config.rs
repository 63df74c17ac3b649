use std::env;

use reqwest::Url;

use crate::ConfigError;

pub const API_URL_VAR: &str = "CALENDAR_API_URL";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: Url,
}

impl Config {
    /// Picks the API URL from the command line, then the environment, then
    /// the default.
    pub fn resolve(cli: Option<&str>, env: Option<&str>) -> Result<Self, ConfigError> {
        let (value, source_name) = match (cli, env) {
            (Some(value), _) => (value, "--url"),
            (None, Some(value)) => (value, API_URL_VAR),
            (None, None) => (DEFAULT_API_URL, "default"),
        };

        let base_url = Url::parse(value).map_err(|err| ConfigError::InvalidUrl {
            value: value.into(),
            source_name,
            reason: err.to_string(),
        })?;

        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                value: value.into(),
                source_name,
                reason: "not a base URL".into(),
            });
        }

        Ok(Self { base_url })
    }

    pub fn from_env(cli: Option<&str>) -> Result<Self, ConfigError> {
        let env = env::var(API_URL_VAR).ok();
        Self::resolve(cli, env.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn command_line_wins() {
        let config = Config::resolve(Some("http://cli:1"), Some("http://env:2")).unwrap();
        assert_eq!(config.base_url.as_str(), "http://cli:1/");
    }

    #[test]
    fn environment_before_default() {
        let config = Config::resolve(None, Some("http://env:2")).unwrap();
        assert_eq!(config.base_url.as_str(), "http://env:2/");

        let config = Config::resolve(None, None).unwrap();
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:3000/");
    }

    #[test]
    fn invalid_url_names_its_source() {
        let err = Config::resolve(None, Some("not a url")).unwrap_err();
        assert!(err.to_string().contains(API_URL_VAR), "{err}");

        let err = Config::resolve(Some("mailto:someone@example.com"), None).unwrap_err();
        assert!(err.to_string().contains("not a base URL"), "{err}");
    }
}
