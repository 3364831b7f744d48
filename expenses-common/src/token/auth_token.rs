use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::token::{sign_hmac_sha256, Expiring, HmacSha256Verifier, Token, TokenError};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum AuthTokenType {
    Access,
    Refresh,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthTokenClaims {
    #[serde(rename = "uid")]
    pub user_id: Uuid,
    #[serde(rename = "eml")]
    pub user_email: String,
    #[serde(rename = "exp")]
    pub expiration: u64,
    #[serde(rename = "typ")]
    pub token_type: AuthTokenType,
}

#[derive(Clone, Debug, Serialize)]
pub struct NewAuthTokenClaims<'a> {
    #[serde(rename = "uid")]
    pub user_id: Uuid,
    #[serde(rename = "eml")]
    pub user_email: &'a str,
    #[serde(rename = "exp")]
    pub expiration: u64,
    #[serde(rename = "typ")]
    pub token_type: AuthTokenType,
}

impl Expiring for AuthTokenClaims {
    fn expiration(&self) -> u64 {
        self.expiration
    }
}

/// Bearer token identifying the acting user. Tokens are issued elsewhere; this service
/// only needs the signing key to check them.
pub struct AuthToken {}

impl AuthToken {
    pub fn sign_new(claims: &NewAuthTokenClaims, signing_key: &[u8]) -> Result<String, TokenError> {
        let json = serde_json::to_vec(claims).map_err(|_| TokenError::TokenInvalid)?;
        Ok(sign_hmac_sha256(json, signing_key))
    }

    /// Decodes and verifies `token`, accepting only unexpired tokens of `expected_type`.
    pub fn verify_as(
        token: &str,
        expected_type: AuthTokenType,
        signing_key: &[u8],
    ) -> Result<AuthTokenClaims, TokenError> {
        let claims = Self::decode(token)?.verify(signing_key)?;

        if claims.token_type != expected_type {
            return Err(TokenError::WrongTokenType);
        }

        Ok(claims)
    }
}

impl Token for AuthToken {
    type Claims = AuthTokenClaims;
    type Verifier = HmacSha256Verifier;

    fn token_name() -> &'static str {
        "AuthToken"
    }
}
