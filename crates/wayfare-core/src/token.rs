//! Access and refresh token issuance.
//!
//! Both tokens are HS256 JWTs carrying the same [`Claims`]. They differ only
//! in signing secret and time-to-live, so each is described by one
//! [`TokenConfig`] and signed by the same code path.
//!
//! Issuance and verification are pure functions of the claims, the two
//! configurations, and the current time; nothing here touches the store.

use std::fmt;

use chrono::{DateTime, Utc};
use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
  errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  principal::{Principal, PrincipalId, Role},
};

pub const DEFAULT_ACCESS_TTL_SECS: u64 = 3600;
pub const DEFAULT_REFRESH_TTL_SECS: u64 = 7 * 24 * 60 * 60;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Secret and lifetime for one kind of token.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenConfig {
  pub secret:   String,
  pub ttl_secs: u64,
}

impl TokenConfig {
  pub fn new(secret: impl Into<String>, ttl_secs: u64) -> Self {
    Self {
      secret: secret.into(),
      ttl_secs,
    }
  }

  /// Access-token configuration with the default one-hour lifetime.
  pub fn access(secret: impl Into<String>) -> Self {
    Self::new(secret, DEFAULT_ACCESS_TTL_SECS)
  }

  /// Refresh-token configuration with the default seven-day lifetime.
  pub fn refresh(secret: impl Into<String>) -> Self {
    Self::new(secret, DEFAULT_REFRESH_TTL_SECS)
  }
}

impl fmt::Debug for TokenConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TokenConfig")
      .field("secret", &"<redacted>")
      .field("ttl_secs", &self.ttl_secs)
      .finish()
  }
}

/// Parse a lifetime such as `3600`, `3600s`, `15m`, `12h` or `7d` into
/// seconds.
pub fn parse_ttl(input: &str) -> Result<u64> {
  let input = input.trim();
  let (digits, unit) = match input.find(|c: char| !c.is_ascii_digit()) {
    Some(split) => input.split_at(split),
    None => (input, "s"),
  };

  let value: u64 = digits
    .parse()
    .map_err(|_| Error::Configuration(format!("invalid ttl {input:?}")))?;

  let scale = match unit {
    "s" => 1,
    "m" => 60,
    "h" => 60 * 60,
    "d" => 24 * 60 * 60,
    other => {
      return Err(Error::Configuration(format!(
        "unknown ttl unit {other:?} in {input:?}"
      )));
    }
  };

  value
    .checked_mul(scale)
    .ok_or_else(|| Error::Configuration(format!("ttl {input:?} overflows")))
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

/// Which of the two secrets a token was signed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
  Access,
  Refresh,
}

/// The signed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  pub sub:   PrincipalId,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(default)]
  pub role:  Role,
  /// Issued at (Unix timestamp).
  pub iat:   i64,
  /// Expiration time (Unix timestamp). Invalid at and after this second.
  pub exp:   i64,
}

/// The credential pair returned to a caller after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
  pub access_token:  String,
  pub refresh_token: String,
}

struct Signer {
  encoding: EncodingKey,
  decoding: DecodingKey,
  ttl_secs: i64,
}

impl Signer {
  fn new(config: &TokenConfig, name: &str) -> Result<Self> {
    if config.secret.is_empty() {
      return Err(Error::Configuration(format!("{name} token secret is not set")));
    }
    if config.ttl_secs == 0 {
      return Err(Error::Configuration(format!("{name} token ttl must be positive")));
    }
    let ttl_secs = i64::try_from(config.ttl_secs)
      .map_err(|_| Error::Configuration(format!("{name} token ttl is too large")))?;

    Ok(Self {
      encoding: EncodingKey::from_secret(config.secret.as_bytes()),
      decoding: DecodingKey::from_secret(config.secret.as_bytes()),
      ttl_secs,
    })
  }
}

/// Issues and verifies access/refresh token pairs.
///
/// Build one at startup; construction is where missing secrets surface.
pub struct TokenIssuer {
  access:     Signer,
  refresh:    Signer,
  validation: Validation,
}

impl TokenIssuer {
  pub fn new(access: TokenConfig, refresh: TokenConfig) -> Result<Self> {
    if !access.secret.is_empty() && access.secret == refresh.secret {
      return Err(Error::Configuration(
        "access and refresh tokens must use different secrets".to_string(),
      ));
    }

    // Expiry is checked against the caller's clock in `verify_at`.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp"]);

    Ok(Self {
      access: Signer::new(&access, "access")?,
      refresh: Signer::new(&refresh, "refresh")?,
      validation,
    })
  }

  fn signer(&self, kind: SecretKind) -> &Signer {
    match kind {
      SecretKind::Access => &self.access,
      SecretKind::Refresh => &self.refresh,
    }
  }

  /// Access-token lifetime in seconds.
  pub fn access_ttl_secs(&self) -> i64 { self.access.ttl_secs }

  pub fn issue(&self, principal: &Principal) -> Result<TokenPair> {
    self.issue_at(principal, Utc::now())
  }

  /// Sign a token pair for `principal` as of `now`.
  pub fn issue_at(
    &self,
    principal: &Principal,
    now: DateTime<Utc>,
  ) -> Result<TokenPair> {
    Ok(TokenPair {
      access_token:  self.sign(SecretKind::Access, principal, now)?,
      refresh_token: self.sign(SecretKind::Refresh, principal, now)?,
    })
  }

  fn sign(
    &self,
    kind: SecretKind,
    principal: &Principal,
    now: DateTime<Utc>,
  ) -> Result<String> {
    let signer = self.signer(kind);
    let iat = now.timestamp();
    let claims = Claims {
      sub:   principal.id,
      email: principal.email.clone(),
      role:  principal.role,
      iat,
      exp:   iat.saturating_add(signer.ttl_secs),
    };

    encode(&Header::new(Algorithm::HS256), &claims, &signer.encoding)
      .map_err(|e| Error::Configuration(format!("failed to sign token: {e}")))
  }

  pub fn verify(&self, token: &str, kind: SecretKind) -> Result<Claims> {
    self.verify_at(token, kind, Utc::now())
  }

  /// Check the signature of `token` against the `kind` secret and reject it
  /// if `now` is at or past its expiry.
  pub fn verify_at(
    &self,
    token: &str,
    kind: SecretKind,
    now: DateTime<Utc>,
  ) -> Result<Claims> {
    let data = decode::<Claims>(token, &self.signer(kind).decoding, &self.validation)
      .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature => Error::unauthenticated("invalid signature"),
        ErrorKind::ExpiredSignature => Error::unauthenticated("token expired"),
        ErrorKind::MissingRequiredClaim(claim) => {
          Error::unauthenticated(format!("missing claim {claim}"))
        }
        _ => Error::unauthenticated("malformed token"),
      })?;

    if now.timestamp() >= data.claims.exp {
      return Err(Error::unauthenticated("token expired"));
    }

    Ok(data.claims)
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};

  use super::*;

  fn principal() -> Principal {
    Principal {
      id:                  PrincipalId(1),
      external_subject_id: "ext-1".into(),
      email:               Some("a@x.com".into()),
      display_name:        None,
      avatar_url:          None,
      email_verified:      false,
      role:                Role::User,
      created_at:          Utc::now(),
    }
  }

  fn issuer(access_ttl: u64) -> TokenIssuer {
    TokenIssuer::new(
      TokenConfig::new("access-secret", access_ttl),
      TokenConfig::refresh("refresh-secret"),
    )
    .unwrap()
  }

  fn t0() -> DateTime<Utc> { Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap() }

  #[test]
  fn issue_returns_two_distinct_tokens() {
    let pair = issuer(3600).issue(&principal()).unwrap();
    assert_ne!(pair.access_token, pair.refresh_token);
  }

  #[test]
  fn access_token_expires_after_ttl() {
    let issuer = issuer(1);
    let pair = issuer.issue_at(&principal(), t0()).unwrap();

    let claims = issuer
      .verify_at(&pair.access_token, SecretKind::Access, t0())
      .unwrap();
    assert_eq!(claims.sub, PrincipalId(1));
    assert_eq!(claims.email.as_deref(), Some("a@x.com"));
    assert_eq!(claims.role, Role::User);
    assert_eq!(claims.exp - claims.iat, 1);

    let err = issuer
      .verify_at(&pair.access_token, SecretKind::Access, t0() + Duration::seconds(2))
      .unwrap_err();
    assert!(matches!(err, Error::Unauthenticated(_)));
  }

  #[test]
  fn token_is_rejected_exactly_at_expiry() {
    let issuer = issuer(1);
    let pair = issuer.issue_at(&principal(), t0()).unwrap();
    let err = issuer
      .verify_at(&pair.access_token, SecretKind::Access, t0() + Duration::seconds(1))
      .unwrap_err();
    assert!(matches!(err, Error::Unauthenticated(_)));
  }

  #[test]
  fn refresh_token_outlives_access_token() {
    let issuer = issuer(60);
    let pair = issuer.issue_at(&principal(), t0()).unwrap();
    let later = t0() + Duration::hours(1);

    assert!(issuer.verify_at(&pair.access_token, SecretKind::Access, later).is_err());
    assert!(issuer.verify_at(&pair.refresh_token, SecretKind::Refresh, later).is_ok());
    assert!(
      issuer
        .verify_at(&pair.refresh_token, SecretKind::Refresh, t0() + Duration::days(7))
        .is_err()
    );
  }

  #[test]
  fn tokens_do_not_verify_under_the_other_secret() {
    let issuer = issuer(3600);
    let pair = issuer.issue_at(&principal(), t0()).unwrap();
    assert!(issuer.verify_at(&pair.access_token, SecretKind::Refresh, t0()).is_err());
    assert!(issuer.verify_at(&pair.refresh_token, SecretKind::Access, t0()).is_err());
  }

  #[test]
  fn malformed_token_is_unauthenticated() {
    let err = issuer(3600)
      .verify_at("not-a-token", SecretKind::Access, t0())
      .unwrap_err();
    assert!(matches!(err, Error::Unauthenticated(_)));
  }

  #[test]
  fn admin_role_is_carried() {
    let issuer = issuer(3600);
    let mut admin = principal();
    admin.role = Role::Admin;
    let pair = issuer.issue_at(&admin, t0()).unwrap();
    let claims = issuer.verify_at(&pair.access_token, SecretKind::Access, t0()).unwrap();
    assert_eq!(claims.role, Role::Admin);
  }

  #[test]
  fn missing_secret_is_a_configuration_error() {
    let err = TokenIssuer::new(TokenConfig::access(""), TokenConfig::refresh("r"))
      .err()
      .unwrap();
    assert!(matches!(err, Error::Configuration(_)));

    let err = TokenIssuer::new(TokenConfig::access("a"), TokenConfig::refresh(""))
      .err()
      .unwrap();
    assert!(matches!(err, Error::Configuration(_)));
  }

  #[test]
  fn shared_secret_is_a_configuration_error() {
    let result = TokenIssuer::new(TokenConfig::access("same"), TokenConfig::refresh("same"));
    assert!(matches!(result, Err(Error::Configuration(_))));
  }

  #[test]
  fn parse_ttl_accepts_suffixes() {
    assert_eq!(parse_ttl("3600").unwrap(), 3600);
    assert_eq!(parse_ttl("3600s").unwrap(), 3600);
    assert_eq!(parse_ttl("15m").unwrap(), 900);
    assert_eq!(parse_ttl("12h").unwrap(), 43_200);
    assert_eq!(parse_ttl("7d").unwrap(), DEFAULT_REFRESH_TTL_SECS);
    assert!(parse_ttl("7w").is_err());
    assert!(parse_ttl("").is_err());
    assert!(parse_ttl("d").is_err());
  }
}
