//! Handlers for `/engagements` endpoints. All require a bearer access token;
//! the actor is always the token's subject.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/engagements/{kind}` | Caller's engagements, newest first |
//! | `GET`    | `/engagements/{kind}/{target_type}/{target_id}` | Current state + count |
//! | `PUT`    | `/engagements/{kind}/{target_type}/{target_id}` | Add (idempotent) |
//! | `DELETE` | `/engagements/{kind}/{target_type}/{target_id}` | Remove (idempotent) |

use axum::{
  Json,
  extract::{Path, State},
};
use serde::Serialize;
use wayfare_core::engagement::{
  Engagement, EngagementAction, EngagementKind, EngagementOutcome, Target, TargetType,
};

use crate::{AppState, AppStore, auth::Authenticated, error::ApiError};

type TargetPath = Path<(EngagementKind, TargetType, i64)>;

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /engagements/{kind}`
pub async fn list<S: AppStore>(
  Authenticated(claims): Authenticated,
  State(state): State<AppState<S>>,
  Path(kind): Path<EngagementKind>,
) -> Result<Json<Vec<Engagement>>, ApiError> {
  Ok(Json(state.guard.list_for_actor(claims.sub, kind).await?))
}

// ─── Show ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct EngagementView {
  pub kind:    EngagementKind,
  pub target:  Target,
  /// Whether the caller holds this engagement.
  pub present: bool,
  /// How many actors hold it.
  pub count:   u64,
}

/// `GET /engagements/{kind}/{target_type}/{target_id}`
pub async fn show<S: AppStore>(
  Authenticated(claims): Authenticated,
  State(state): State<AppState<S>>,
  Path((kind, target_type, target_id)): TargetPath,
) -> Result<Json<EngagementView>, ApiError> {
  let target = Target::new(target_type, target_id);
  let present = state.guard.has_engagement(claims.sub, kind, target).await?;
  let count = state.guard.count_for_target(kind, target).await?;
  Ok(Json(EngagementView { kind, target, present, count }))
}

// ─── Add / remove ────────────────────────────────────────────────────────────

async fn apply<S: AppStore>(
  claims: &wayfare_core::token::Claims,
  state: &AppState<S>,
  (kind, target_type, target_id): (EngagementKind, TargetType, i64),
  action: EngagementAction,
) -> Result<Json<EngagementOutcome>, ApiError> {
  let outcome = state
    .guard
    .apply(claims.sub, kind, Target::new(target_type, target_id), action)
    .await?;
  Ok(Json(outcome))
}

/// `PUT /engagements/{kind}/{target_type}/{target_id}`
pub async fn add<S: AppStore>(
  Authenticated(claims): Authenticated,
  State(state): State<AppState<S>>,
  Path(path): TargetPath,
) -> Result<Json<EngagementOutcome>, ApiError> {
  apply(&claims, &state, path, EngagementAction::Add).await
}

/// `DELETE /engagements/{kind}/{target_type}/{target_id}`
pub async fn remove<S: AppStore>(
  Authenticated(claims): Authenticated,
  State(state): State<AppState<S>>,
  Path(path): TargetPath,
) -> Result<Json<EngagementOutcome>, ApiError> {
  apply(&claims, &state, path, EngagementAction::Remove).await
}
