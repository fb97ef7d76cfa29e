//! Request authentication.
//!
//! Two callers exist: end users, who present the access token issued at
//! login as `Authorization: Bearer …`; and the identity-provider bridge, which
//! forwards verified external identities using HTTP Basic credentials checked
//! against an argon2 hash.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use wayfare_core::{SecretKind, token::Claims};

use crate::{AppState, AppStore, error::ApiError};

// ─── Bearer tokens ───────────────────────────────────────────────────────────

/// Claims of a verified access token. Present in a handler means the request
/// was authenticated.
pub struct Authenticated(pub Claims);

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let token = value.strip_prefix("Bearer ")?.trim();
  (!token.is_empty()).then_some(token)
}

impl<S: AppStore> FromRequestParts<AppState<S>> for Authenticated {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers)
      .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;
    let claims = state.tokens.verify(token, SecretKind::Access)?;
    Ok(Authenticated(claims))
  }
}

// ─── Provider bridge ─────────────────────────────────────────────────────────

/// Credentials accepted from the identity-provider bridge.
#[derive(Clone)]
pub struct ProviderConfig {
  pub name:     String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub key_hash: String,
}

/// Zero-size marker: the request came from the provider bridge.
pub struct Provider;

/// Verify the bridge's Basic credentials.
pub fn verify_provider(headers: &HeaderMap, config: &ProviderConfig) -> Result<(), ApiError> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::ProviderUnauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::ProviderUnauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::ProviderUnauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| ApiError::ProviderUnauthorized)?;

  let (name, key) = creds.split_once(':').ok_or(ApiError::ProviderUnauthorized)?;

  if name != config.name {
    return Err(ApiError::ProviderUnauthorized);
  }

  let parsed_hash = PasswordHash::new(&config.key_hash)
    .map_err(|_| ApiError::ProviderUnauthorized)?;

  Argon2::default()
    .verify_password(key.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::ProviderUnauthorized)?;

  Ok(())
}

impl<S: AppStore> FromRequestParts<AppState<S>> for Provider {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    if let Err(e) = verify_provider(&parts.headers, &state.provider) {
      tracing::warn!("rejected identity-provider credentials");
      return Err(e);
    }
    Ok(Provider)
  }
}
