use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::auth::Credential;
use crate::error::ApiError;

/// Credential carried by the `Authorization` header, if any:
/// `Bearer <token>` or `Basic base64(username:password)`.
///
/// Absence is not an error here; whether a credential is required is the
/// plot service's decision. A malformed header is rejected outright.
#[derive(Debug, Clone, Default)]
pub struct HeaderCredential(pub Option<Credential>);

impl HeaderCredential {
    /// Prefer the header, fall back to a password from the request body
    /// checked against the path username.
    pub fn into_credential(self, username: &str, password: Option<String>) -> Option<Credential> {
        match (self.0, password) {
            (Some(credential), _) => Some(credential),
            (None, Some(password)) => Some(Credential::password(username, password)),
            (None, None) => None,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for HeaderCredential
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_credential(&parts.headers)
            .map(HeaderCredential)
            .map_err(ApiError::bad_request)
    }
}

fn extract_credential(headers: &HeaderMap) -> Result<Option<Credential>, String> {
    let Some(auth_header) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    let (scheme, value) = auth_str
        .split_once(' ')
        .ok_or_else(|| "Authorization header must be Bearer or Basic".to_string())?;
    let value = value.trim();

    if scheme.eq_ignore_ascii_case("Bearer") {
        if value.is_empty() {
            return Err("Empty bearer token".to_string());
        }
        Ok(Some(Credential::Token(value.to_string())))
    } else if scheme.eq_ignore_ascii_case("Basic") {
        decode_basic(value).map(Some)
    } else {
        Err("Authorization header must be Bearer or Basic".to_string())
    }
}

fn decode_basic(encoded: &str) -> Result<Credential, String> {
    let decoded = STANDARD
        .decode(encoded)
        .map_err(|_| "Basic credentials are not valid base64".to_string())?;
    let decoded = String::from_utf8(decoded).map_err(|_| "Basic credentials are not UTF-8".to_string())?;
    let (username, password) = decoded
        .split_once(':')
        .ok_or_else(|| "Basic credentials must be username:password".to_string())?;
    if username.is_empty() {
        return Err("Basic credentials carry no username".to_string());
    }
    Ok(Credential::password(username, password))
}
