//! Authentication configuration

use secrecy::Secret;
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Bearer token settings (HS256).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Shared HS256 signing secret. Never logged.
    pub jwt_secret: Option<Secret<String>>,

    /// Expected `iss` claim
    pub issuer: Option<String>,

    /// Expected `aud` claim
    pub audience: Option<String>,
}

impl AuthConfig {
    /// Outside production a missing secret is allowed; the server then
    /// falls back to a development secret.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if *environment == Environment::Production && self.jwt_secret.is_none() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_optional_in_development() {
        let config = AuthConfig::default();
        assert!(config.validate(&Environment::Development).is_ok());
    }

    #[test]
    fn test_secret_required_in_production() {
        let config = AuthConfig::default();
        assert_eq!(
            config.validate(&Environment::Production),
            Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"))
        );

        let config = AuthConfig {
            jwt_secret: Some(Secret::new("s3cret".to_string())),
            ..Default::default()
        };
        assert!(config.validate(&Environment::Production).is_ok());
    }
}
