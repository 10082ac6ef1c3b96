use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{crypto, decode, Algorithm, DecodingKey, EncodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, SystemTimeError};
use thiserror::Error;
use uuid::Uuid;

/// Tokens are only used to load the view, so they are short lived.
pub const TOKEN_LIFETIME_SECS: u64 = 5 * 60;
pub const AUDIENCE: &str = "tableau";
pub const SCOPES: [&str; 2] = ["tableau:views:embed", "tableau:metrics:embed"];

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("secret key is empty")]
    EmptySecret,
    #[error("system clock is before unix epoch: {0}")]
    Clock(#[from] SystemTimeError),
    #[error("serialize token segment: {0}")]
    Json(#[from] serde_json::Error),
    #[error("decode token segment: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("jwt: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Header in the shape connected apps expect. `jsonwebtoken::Header` has no
/// `iss` field, so this one is serialized by hand.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    pub typ: String,
    pub kid: String,
    pub iss: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub exp: u64,
    pub jti: String,
    pub aud: String,
    pub sub: String,
    pub scp: Vec<String>,
}

#[derive(Debug)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: u64,
    pub expires_at: u64,
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, TokenError> {
    Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(value)?))
}

fn sign(header: &TokenHeader, claims: &Claims, secret_key: &[u8]) -> Result<String, TokenError> {
    let message = format!("{}.{}", encode_segment(header)?, encode_segment(claims)?);
    let signature = crypto::sign(
        message.as_bytes(),
        &EncodingKey::from_secret(secret_key),
        Algorithm::HS256,
    )?;
    Ok(format!("{}.{}", message, signature))
}

pub fn issue(
    client_id: &str,
    key_id: &str,
    secret_key: &[u8],
    user: &str,
) -> Result<IssuedToken, TokenError> {
    if secret_key.is_empty() {
        return Err(TokenError::EmptySecret);
    }

    let header = TokenHeader {
        alg: "HS256".to_owned(),
        typ: "JWT".to_owned(),
        kid: key_id.to_owned(),
        iss: client_id.to_owned(),
    };

    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)?
        .as_secs();
    let claims = Claims {
        iss: client_id.to_owned(),
        exp: now + TOKEN_LIFETIME_SECS,
        jti: Uuid::new_v4().to_string(),
        aud: AUDIENCE.to_owned(),
        sub: user.to_owned(),
        scp: SCOPES.iter().map(|scope| scope.to_string()).collect(),
    };

    let token = sign(&header, &claims, secret_key)?;
    Ok(IssuedToken {
        token,
        issued_at: now,
        expires_at: claims.exp,
    })
}

pub fn verify(token: &str, secret_key: &[u8], client_id: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[AUDIENCE]);
    validation.set_issuer(&[client_id]);
    validation.set_required_spec_claims(&["exp", "aud", "iss", "sub"]);

    let token = decode::<Claims>(token, &DecodingKey::from_secret(secret_key), &validation)?;
    Ok(token.claims)
}

/// Reads the header segment without checking the signature.
pub fn decode_header_fields(token: &str) -> Result<TokenHeader, TokenError> {
    let segment = token.split('.').next().unwrap_or_default();
    let bytes = URL_SAFE_NO_PAD.decode(segment)?;
    Ok(serde_json::from_slice(&bytes)?)
}
