//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings; enums are their lowercase snake_case
//! names, matching the CHECK constraints in the schema.

use chrono::{DateTime, Utc};
use wayfare_core::{
  engagement::{Engagement, EngagementKind, Target, TargetType},
  principal::{Principal, PrincipalId, Role},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "user" => Ok(Role::User),
    "admin" => Ok(Role::Admin),
    other => Err(Error::Decode(format!("unknown role: {other:?}"))),
  }
}

// ─── Engagement kind / target type ───────────────────────────────────────────

pub fn decode_kind(s: &str) -> Result<EngagementKind> {
  match s {
    "like" => Ok(EngagementKind::Like),
    "scrap" => Ok(EngagementKind::Scrap),
    "bookmark" => Ok(EngagementKind::Bookmark),
    other => Err(Error::Decode(format!("unknown engagement kind: {other:?}"))),
  }
}

pub fn decode_target_type(s: &str) -> Result<TargetType> {
  match s {
    "content_a" => Ok(TargetType::ContentA),
    "content_b" => Ok(TargetType::ContentB),
    "place" => Ok(TargetType::Place),
    other => Err(Error::Decode(format!("unknown target type: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching the field order of [`RawPrincipal::from_row`].
pub const PRINCIPAL_COLUMNS: &str = "principal_id, external_subject_id, email, \
   display_name, avatar_url, email_verified, role, created_at";

/// Raw values read directly from a `principals` row.
pub struct RawPrincipal {
  pub principal_id:        i64,
  pub external_subject_id: String,
  pub email:               Option<String>,
  pub display_name:        Option<String>,
  pub avatar_url:          Option<String>,
  pub email_verified:      bool,
  pub role:                String,
  pub created_at:          String,
}

impl RawPrincipal {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      principal_id:        row.get(0)?,
      external_subject_id: row.get(1)?,
      email:               row.get(2)?,
      display_name:        row.get(3)?,
      avatar_url:          row.get(4)?,
      email_verified:      row.get(5)?,
      role:                row.get(6)?,
      created_at:          row.get(7)?,
    })
  }

  pub fn into_principal(self) -> Result<Principal> {
    Ok(Principal {
      id:                  PrincipalId(self.principal_id),
      external_subject_id: self.external_subject_id,
      email:               self.email,
      display_name:        self.display_name,
      avatar_url:          self.avatar_url,
      email_verified:      self.email_verified,
      role:                decode_role(&self.role)?,
      created_at:          decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching the field order of [`RawEngagement::from_row`].
pub const ENGAGEMENT_COLUMNS: &str =
  "engagement_id, actor_id, kind, target_type, target_id, created_at";

/// Raw values read directly from an `engagements` row.
pub struct RawEngagement {
  pub engagement_id: i64,
  pub actor_id:      i64,
  pub kind:          String,
  pub target_type:   String,
  pub target_id:     i64,
  pub created_at:    String,
}

impl RawEngagement {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      engagement_id: row.get(0)?,
      actor_id:      row.get(1)?,
      kind:          row.get(2)?,
      target_type:   row.get(3)?,
      target_id:     row.get(4)?,
      created_at:    row.get(5)?,
    })
  }

  pub fn into_engagement(self) -> Result<Engagement> {
    Ok(Engagement {
      id:         self.engagement_id,
      actor:      PrincipalId(self.actor_id),
      kind:       decode_kind(&self.kind)?,
      target:     Target::new(decode_target_type(&self.target_type)?, self.target_id),
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
