//! Credential provider seam.
//!
//! Token acquisition happens elsewhere; the relay only reads the resulting
//! username and password.

use crate::config::CredentialsConfig;

/// Source of chat server credentials.
pub trait CredentialProvider: Send + Sync {
    fn username(&self) -> String;

    fn password(&self) -> String;

    /// True when both a username and a password are available.
    fn is_authenticated(&self) -> bool {
        !self.username().is_empty() && !self.password().is_empty()
    }
}

/// Credentials fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl From<&CredentialsConfig> for StaticCredentials {
    fn from(config: &CredentialsConfig) -> Self {
        Self::new(&config.username, &config.password)
    }
}

impl CredentialProvider for StaticCredentials {
    fn username(&self) -> String {
        self.username.clone()
    }

    fn password(&self) -> String {
        self.password.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_authenticated_requires_both() {
        assert!(StaticCredentials::new("bot", "token").is_authenticated());
        assert!(!StaticCredentials::new("bot", "").is_authenticated());
        assert!(!StaticCredentials::new("", "token").is_authenticated());
        assert!(!StaticCredentials::default().is_authenticated());
    }
}
