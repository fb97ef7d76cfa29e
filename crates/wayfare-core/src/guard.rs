//! [`EngagementGuard`]: at most one engagement of a kind per actor per
//! target, with idempotent add and remove.
//!
//! The store's uniqueness constraint is the only arbiter between concurrent
//! writers. A losing insert comes back as [`InsertOutcome::Duplicate`] and is
//! reported as `present`, exactly like a repeated add.

use std::sync::Arc;

use crate::{
  Error, Result,
  engagement::{
    Engagement, EngagementAction, EngagementKey, EngagementKind, EngagementOutcome,
    EngagementState, Target,
  },
  principal::PrincipalId,
  store::{EngagementStore, InsertOutcome},
};

pub struct EngagementGuard<S> {
  store: Arc<S>,
}

impl<S> Clone for EngagementGuard<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
    }
  }
}

impl<S: EngagementStore> EngagementGuard<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Move the `(actor, kind, target)` tuple to the state implied by `action`.
  ///
  /// Adding an existing engagement and removing a missing one are no-ops,
  /// not errors. Whether the target content exists is not checked.
  pub async fn apply(
    &self,
    actor: PrincipalId,
    kind: EngagementKind,
    target: Target,
    action: EngagementAction,
  ) -> Result<EngagementOutcome> {
    if !kind.accepts(target.target_type) {
      return Err(Error::UnsupportedTarget {
        kind,
        target_type: target.target_type,
      });
    }

    let key = EngagementKey { actor, kind, target };
    match action {
      EngagementAction::Add => self.add(key).await,
      EngagementAction::Remove => self.remove(key).await,
    }
  }

  async fn add(&self, key: EngagementKey) -> Result<EngagementOutcome> {
    let outcome = self
      .store
      .insert_engagement(key)
      .await
      .map_err(Into::<Error>::into)?;

    let changed = match outcome {
      InsertOutcome::Inserted(engagement) => {
        tracing::debug!(
          engagement = engagement.id,
          actor = %key.actor,
          kind = %key.kind,
          target_type = %key.target.target_type,
          target_id = key.target.target_id,
          "engagement added"
        );
        true
      }
      InsertOutcome::Duplicate => {
        tracing::debug!(
          actor = %key.actor,
          kind = %key.kind,
          target_type = %key.target.target_type,
          target_id = key.target.target_id,
          "engagement already present"
        );
        false
      }
    };

    Ok(EngagementOutcome {
      state: EngagementState::Present,
      changed,
    })
  }

  async fn remove(&self, key: EngagementKey) -> Result<EngagementOutcome> {
    let changed = self
      .store
      .delete_engagement(key)
      .await
      .map_err(Into::<Error>::into)?;

    if changed {
      tracing::debug!(
        actor = %key.actor,
        kind = %key.kind,
        target_type = %key.target.target_type,
        target_id = key.target.target_id,
        "engagement removed"
      );
    }

    Ok(EngagementOutcome {
      state: EngagementState::Absent,
      changed,
    })
  }

  /// Read the current state of a tuple without changing it.
  pub async fn has_engagement(
    &self,
    actor: PrincipalId,
    kind: EngagementKind,
    target: Target,
  ) -> Result<bool> {
    self
      .store
      .engagement_exists(EngagementKey { actor, kind, target })
      .await
      .map_err(Into::into)
  }

  /// The actor's engagements of `kind`, newest first.
  pub async fn list_for_actor(
    &self,
    actor: PrincipalId,
    kind: EngagementKind,
  ) -> Result<Vec<Engagement>> {
    self
      .store
      .list_engagements(actor, kind)
      .await
      .map_err(Into::into)
  }

  /// How many actors hold an engagement of `kind` on `target`.
  pub async fn count_for_target(
    &self,
    kind: EngagementKind,
    target: Target,
  ) -> Result<u64> {
    self
      .store
      .count_engagements(kind, target)
      .await
      .map_err(Into::into)
  }
}
