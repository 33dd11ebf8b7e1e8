use crate::config::Config;
use crate::error::Result;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Access gate: decodes a bearer credential into the subject identity
/// and role flags. Credential issuance lives in a separate service;
/// this side only verifies.
#[derive(Clone)]
pub struct AuthService {
    decoding_key: DecodingKey,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
    #[serde(rename = "isEditor", default)]
    pub is_editor: bool,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

/// The authenticated caller attached to a request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub is_admin: bool,
    pub is_editor: bool,
}

impl AuthService {
    pub fn new(config: &Config) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        }
    }

    pub fn verify_token(&self, token: &str) -> Result<AuthUser> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;

        Ok(AuthUser {
            id: data.claims.user_id,
            is_admin: data.claims.is_admin,
            is_editor: data.claims.is_editor,
        })
    }
}
