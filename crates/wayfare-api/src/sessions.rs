//! Handlers for login, token refresh and the current principal.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/external` | Provider Basic auth; body: [`ExternalIdentity`] |
//! | `POST` | `/auth/refresh`  | Body: `{"refresh_token":"..."}` |
//! | `GET`  | `/me`            | Bearer access token |

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use wayfare_core::{
  SecretKind, TokenPair,
  principal::{ExternalIdentity, Principal},
};

use crate::{
  AppState, AppStore,
  auth::{Authenticated, Provider},
  error::ApiError,
};

// ─── External login ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub principal:  Principal,
  #[serde(flatten)]
  pub tokens:     TokenPair,
  /// Access-token lifetime in seconds.
  pub expires_in: i64,
}

/// `POST /auth/external`: resolve a verified external identity and issue a
/// token pair for it.
pub async fn external_login<S: AppStore>(
  _provider: Provider,
  State(state): State<AppState<S>>,
  Json(identity): Json<ExternalIdentity>,
) -> Result<Json<LoginResponse>, ApiError> {
  let principal = state.resolver.upsert(identity).await?;
  let tokens = state.tokens.issue(&principal)?;
  tracing::info!(principal = %principal.id, "issued tokens for external login");

  Ok(Json(LoginResponse {
    principal,
    tokens,
    expires_in: state.tokens.access_ttl_secs(),
  }))
}

// ─── Refresh ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RefreshBody {
  pub refresh_token: String,
}

/// `POST /auth/refresh`: trade a valid refresh token for a new pair.
///
/// The principal is re-read so the new tokens carry its current role and
/// email.
pub async fn refresh<S: AppStore>(
  State(state): State<AppState<S>>,
  Json(body): Json<RefreshBody>,
) -> Result<Json<TokenPair>, ApiError> {
  let claims = state.tokens.verify(&body.refresh_token, SecretKind::Refresh)?;

  let principal = match state.resolver.get(claims.sub).await {
    Ok(p) => p,
    Err(wayfare_core::Error::NotFound(_)) => {
      return Err(ApiError::Unauthorized("principal no longer exists".to_string()));
    }
    Err(e) => return Err(e.into()),
  };

  Ok(Json(state.tokens.issue(&principal)?))
}

// ─── Me ──────────────────────────────────────────────────────────────────────

/// `GET /me`
pub async fn me<S: AppStore>(
  Authenticated(claims): Authenticated,
  State(state): State<AppState<S>>,
) -> Result<Json<Principal>, ApiError> {
  Ok(Json(state.resolver.get(claims.sub).await?))
}
