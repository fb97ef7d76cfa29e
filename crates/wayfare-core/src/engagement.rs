//! Engagement types: likes, scraps and bookmarks.
//!
//! An engagement points at its target through a single tagged reference
//! ([`Target`]) rather than one nullable column per content category. For a
//! given [`EngagementKey`] there are exactly two states, present and absent.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::principal::PrincipalId;

// ─── Kinds and targets ───────────────────────────────────────────────────────

/// What the actor did to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementKind {
  Like,
  Scrap,
  Bookmark,
}

impl EngagementKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Like => "like",
      Self::Scrap => "scrap",
      Self::Bookmark => "bookmark",
    }
  }

  /// Whether this kind of engagement may point at `target_type`.
  ///
  /// Likes and scraps apply to posts; bookmarks apply to places.
  pub fn accepts(self, target_type: TargetType) -> bool {
    match (self, target_type) {
      (Self::Like | Self::Scrap, TargetType::ContentA | TargetType::ContentB) => {
        true
      }
      (Self::Bookmark, TargetType::Place) => true,
      (Self::Like | Self::Scrap, TargetType::Place) => false,
      (Self::Bookmark, TargetType::ContentA | TargetType::ContentB) => false,
    }
  }
}

impl fmt::Display for EngagementKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The content category an engagement points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
  /// Buzz posts.
  ContentA,
  /// Tips.
  ContentB,
  Place,
}

impl TargetType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::ContentA => "content_a",
      Self::ContentB => "content_b",
      Self::Place => "place",
    }
  }
}

impl fmt::Display for TargetType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A tagged reference to a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
  pub target_type: TargetType,
  pub target_id:   i64,
}

impl Target {
  pub fn new(target_type: TargetType, target_id: i64) -> Self {
    Self { target_type, target_id }
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// The uniqueness key of an engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngagementKey {
  pub actor:  PrincipalId,
  pub kind:   EngagementKind,
  pub target: Target,
}

/// A recorded engagement. Never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
  pub id:         i64,
  pub actor:      PrincipalId,
  pub kind:       EngagementKind,
  pub target:     Target,
  pub created_at: DateTime<Utc>,
}

impl Engagement {
  pub fn key(&self) -> EngagementKey {
    EngagementKey {
      actor:  self.actor,
      kind:   self.kind,
      target: self.target,
    }
  }
}

// ─── Transitions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementAction {
  Add,
  Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementState {
  Present,
  Absent,
}

/// Result of applying an [`EngagementAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementOutcome {
  pub state:   EngagementState,
  /// `true` only when this call performed the transition; a repeated add or
  /// remove reports the same state with `changed = false`.
  pub changed: bool,
}

impl EngagementOutcome {
  pub fn is_present(&self) -> bool { self.state == EngagementState::Present }
}
