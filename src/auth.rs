use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use eyre::Result;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::server::AppState;

/// Session token claims issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// The authenticated caller of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    pub email: Option<String>,
}

/// Verifies HS256 bearer tokens
#[derive(Clone)]
pub struct Authenticator {
    key: DecodingKey,
    validation: Validation,
}

impl Authenticator {
    pub fn new(secret: &str, issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<AuthUser> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        let claims = data.claims;
        if claims.sub.is_empty() {
            eyre::bail!("token has an empty subject");
        }
        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email.filter(|e| !e.is_empty()),
        })
    }

    fn user_from_parts(&self, parts: &Parts) -> Option<AuthUser> {
        let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
        let token = header.strip_prefix("Bearer ")?;
        self.verify(token.trim())
            .inspect_err(|e| debug!("Rejected bearer token: {e}"))
            .ok()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        state.auth.user_from_parts(parts).ok_or(ApiError::Unauthenticated)
    }
}
