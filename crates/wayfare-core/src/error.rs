//! Error types for `wayfare-core`.

use thiserror::Error;

use crate::{
  engagement::{EngagementKind, TargetType},
  principal::PrincipalId,
};

#[derive(Debug, Error)]
pub enum Error {
  /// A signing secret or TTL is missing or unusable. Raised at startup.
  #[error("configuration error: {0}")]
  Configuration(String),

  /// The token is missing, malformed, signed with another key, or expired.
  #[error("unauthenticated: {0}")]
  Unauthenticated(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("invalid external identity: {0}")]
  InvalidIdentity(String),

  #[error("email {0:?} already belongs to another principal")]
  EmailTaken(String),

  #[error("actor {0} does not exist")]
  ActorNotFound(PrincipalId),

  #[error("{kind} cannot target {target_type}")]
  UnsupportedTarget {
    kind:        EngagementKind,
    target_type: TargetType,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn unauthenticated(reason: impl Into<String>) -> Self {
    Self::Unauthenticated(reason.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
