use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

/// Claims issued by the identity provider. `sub` and `exp` are always
/// required, `iss` only when an issuer is configured.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Authenticated caller, attached to the request by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Clone)]
pub struct JwtService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        let (decoding_key, algorithm) = match config.jwt_public_key_pem.as_deref() {
            Some(pem) if !pem.trim().is_empty() => (
                DecodingKey::from_rsa_pem(pem.as_bytes())?,
                Algorithm::RS256,
            ),
            _ => {
                if config.jwt_secret.is_empty() {
                    return Err(AppError::ConfigError(
                        "Either auth.jwt_public_key_pem or auth.jwt_secret must be set".to_string(),
                    ));
                }
                (
                    DecodingKey::from_secret(config.jwt_secret.as_bytes()),
                    Algorithm::HS256,
                )
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.validate_aud = false;
        if let Some(issuer) = config.issuer.as_deref() {
            validation.set_issuer(&[issuer]);
            validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        }

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Identity> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims;
        if claims.sub.is_empty() {
            return Err(AppError::AuthError("Token has no subject".to_string()));
        }
        Ok(Identity {
            subject: claims.sub,
            email: claims.email,
            name: claims.name,
        })
    }
}
