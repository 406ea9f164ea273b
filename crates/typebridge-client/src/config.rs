pub const SESSION_PORT_ENV: &str = "DAGGER_SESSION_PORT";
pub const SESSION_TOKEN_ENV: &str = "DAGGER_SESSION_TOKEN";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
    #[error("invalid session port '{0}'")]
    InvalidPort(String),
}

/// Connection details of the session the module runs in.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub port: u16,
    pub token: String,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("port", &self.port)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl SessionConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = lookup(SESSION_PORT_ENV).ok_or(ConfigError::Missing(SESSION_PORT_ENV))?;
        let token = lookup(SESSION_TOKEN_ENV).ok_or(ConfigError::Missing(SESSION_TOKEN_ENV))?;

        let port = port.trim().parse().map_err(|_| ConfigError::InvalidPort(port.clone()))?;

        Ok(Self { port, token })
    }

    pub fn endpoint(&self) -> String {
        format!("http://127.0.0.1:{}/query", self.port)
    }
}
