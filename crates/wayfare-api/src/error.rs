//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Missing or rejected bearer token.
  #[error("unauthorized: {0}")]
  Unauthorized(String),

  /// Missing or rejected identity-provider credentials.
  #[error("provider unauthorized")]
  ProviderUnauthorized,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("internal error: {0}")]
  Internal(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<wayfare_core::Error> for ApiError {
  fn from(e: wayfare_core::Error) -> Self {
    use wayfare_core::Error as E;
    match e {
      E::Unauthenticated(reason) => Self::Unauthorized(reason),
      E::NotFound(what) => Self::NotFound(what),
      E::ActorNotFound(id) => Self::NotFound(format!("principal {id}")),
      E::InvalidIdentity(_) | E::UnsupportedTarget { .. } => {
        Self::BadRequest(e.to_string())
      }
      E::EmailTaken(_) => Self::Conflict(e.to_string()),
      E::Configuration(msg) => Self::Internal(msg),
      E::Store(inner) => Self::Store(inner),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message, challenge) = match &self {
      ApiError::Unauthorized(m) => {
        (StatusCode::UNAUTHORIZED, m.clone(), Some("Bearer realm=\"wayfare\""))
      }
      ApiError::ProviderUnauthorized => (
        StatusCode::UNAUTHORIZED,
        "unauthorized".to_string(),
        Some("Basic realm=\"wayfare-provider\""),
      ),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone(), None),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone(), None),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone(), None),
      ApiError::Internal(m) => {
        tracing::error!(error = %m, "internal error");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string(), None)
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store error");
        (StatusCode::INTERNAL_SERVER_ERROR, "storage failure".to_string(), None)
      }
    };

    let mut res = (status, Json(json!({ "error": message }))).into_response();
    if let Some(challenge) = challenge {
      res
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(challenge));
    }
    res
  }
}
