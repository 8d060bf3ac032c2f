//! Client configuration

use metaweb_client::{Options, Session, DEFAULT_HOST};

/// Host and default options for new sessions.
#[derive(Debug, Clone)]
pub struct Config {
    /// Hostname (and optional port) of the Metaweb server.
    pub host: String,
    /// Options merged into every request unless overridden per call.
    pub options: Options,
}

impl Config {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            options: Options::new(),
        }
    }

    /// Builder-style default option.
    pub fn with_option(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.options.insert(key, value);
        self
    }

    /// Open a session against the configured host.
    pub fn session(&self) -> metaweb_client::Result<Session> {
        Session::with_options(self.host.clone(), self.options.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_HOST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_host() {
        let config = Config::default();
        assert_eq!(config.host, DEFAULT_HOST);
        assert!(config.options.is_empty());
    }

    #[test]
    fn test_session_carries_config() {
        let config = Config::new("api.example.com").with_option("lang", "/lang/en");
        let session = config.session().unwrap();
        assert_eq!(session.host(), "api.example.com");
        assert_eq!(
            session.options().get("lang"),
            Some(&serde_json::json!("/lang/en"))
        );
    }
}
