//! Principal: the local identity an external login resolves to.
//!
//! Exactly one principal exists per external subject id. Profile fields are
//! refreshed from the identity provider on every login, but only when the
//! provider actually supplies them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned, stable principal identifier.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PrincipalId(pub i64);

impl fmt::Display for PrincipalId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// Authorisation role carried in issued tokens.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  #[default]
  User,
  Admin,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::User => "user",
      Self::Admin => "admin",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A resolved local identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
  pub id:                  PrincipalId,
  /// The provider's subject id; the join key for logins.
  pub external_subject_id: String,
  /// Unique among principals when present, but never used for lookup.
  pub email:               Option<String>,
  pub display_name:        Option<String>,
  pub avatar_url:          Option<String>,
  pub email_verified:      bool,
  pub role:                Role,
  pub created_at:          DateTime<Utc>,
}

/// A verified identity delivered by the external provider.
///
/// `None` means "the provider did not say"; it never clears a stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIdentity {
  pub external_subject_id: String,
  #[serde(default)]
  pub email:               Option<String>,
  #[serde(default)]
  pub display_name:        Option<String>,
  #[serde(default)]
  pub avatar_url:          Option<String>,
  #[serde(default)]
  pub email_verified:      Option<bool>,
}

impl ExternalIdentity {
  /// An identity carrying only the subject id.
  pub fn new(external_subject_id: impl Into<String>) -> Self {
    Self {
      external_subject_id: external_subject_id.into(),
      ..Self::default()
    }
  }

  pub fn with_email(mut self, email: impl Into<String>) -> Self {
    self.email = Some(email.into());
    self
  }

  pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
    self.display_name = Some(name.into());
    self
  }

  pub fn with_avatar_url(mut self, url: impl Into<String>) -> Self {
    self.avatar_url = Some(url.into());
    self
  }

  pub fn with_email_verified(mut self, verified: bool) -> Self {
    self.email_verified = Some(verified);
    self
  }
}
