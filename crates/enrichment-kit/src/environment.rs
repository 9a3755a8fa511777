//! Deployment environment.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Where the service is running.
///
/// Production hides error details from clients; development passes them through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl From<String> for Environment {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("production") || value.eq_ignore_ascii_case("prod") {
            Self::Production
        } else {
            Self::Development
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_production_aliases() {
        for raw in ["production", "Production", "PROD", "prod"] {
            assert_eq!(raw.parse::<Environment>().unwrap(), Environment::Production);
        }
    }

    #[test]
    fn anything_else_is_development() {
        for raw in ["development", "dev", "staging", ""] {
            assert_eq!(raw.parse::<Environment>().unwrap(), Environment::Development);
        }
    }

    #[test]
    fn deserializes_from_plain_string() {
        let env: Environment = serde_json::from_str(r#""production""#).unwrap();
        assert!(env.is_production());
        assert_eq!(env.to_string(), "production");
    }
}
