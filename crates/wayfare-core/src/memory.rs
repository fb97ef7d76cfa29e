//! In-memory store used by the unit tests in this crate.

use std::sync::Mutex;

use chrono::Utc;

use crate::{
  Error, Result,
  engagement::{Engagement, EngagementKey, EngagementKind, Target},
  principal::{ExternalIdentity, Principal, PrincipalId, Role},
  store::{EngagementStore, IdentityStore, InsertOutcome},
};

#[derive(Default)]
struct State {
  principals:  Vec<Principal>,
  engagements: Vec<Engagement>,
  next_id:     i64,
}

#[derive(Default)]
pub struct MemoryStore {
  state: Mutex<State>,
}

impl MemoryStore {
  pub fn principal_count(&self) -> usize {
    self.state.lock().unwrap().principals.len()
  }

  pub fn engagement_count(&self) -> usize {
    self.state.lock().unwrap().engagements.len()
  }
}

impl IdentityStore for MemoryStore {
  type Error = Error;

  async fn upsert_principal(&self, identity: ExternalIdentity) -> Result<Principal> {
    let mut state = self.state.lock().unwrap();
    if let Some(email) = &identity.email
      && state.principals.iter().any(|p| {
        p.email.as_ref() == Some(email)
          && p.external_subject_id != identity.external_subject_id
      })
    {
      return Err(Error::EmailTaken(email.clone()));
    }

    if let Some(existing) = state
      .principals
      .iter_mut()
      .find(|p| p.external_subject_id == identity.external_subject_id)
    {
      if identity.email.is_some() {
        existing.email = identity.email;
      }
      if identity.display_name.is_some() {
        existing.display_name = identity.display_name;
      }
      if identity.avatar_url.is_some() {
        existing.avatar_url = identity.avatar_url;
      }
      if let Some(verified) = identity.email_verified {
        existing.email_verified = verified;
      }
      return Ok(existing.clone());
    }

    state.next_id += 1;
    let principal = Principal {
      id:                  PrincipalId(state.next_id),
      external_subject_id: identity.external_subject_id,
      email:               identity.email,
      display_name:        identity.display_name,
      avatar_url:          identity.avatar_url,
      email_verified:      identity.email_verified.unwrap_or(false),
      role:                Role::User,
      created_at:          Utc::now(),
    };
    state.principals.push(principal.clone());
    Ok(principal)
  }

  async fn get_principal(&self, id: PrincipalId) -> Result<Option<Principal>> {
    let state = self.state.lock().unwrap();
    Ok(state.principals.iter().find(|p| p.id == id).cloned())
  }

  async fn find_principal_by_subject(
    &self,
    external_subject_id: &str,
  ) -> Result<Option<Principal>> {
    let state = self.state.lock().unwrap();
    Ok(
      state
        .principals
        .iter()
        .find(|p| p.external_subject_id == external_subject_id)
        .cloned(),
    )
  }
}

impl EngagementStore for MemoryStore {
  type Error = Error;

  async fn insert_engagement(&self, key: EngagementKey) -> Result<InsertOutcome> {
    let mut state = self.state.lock().unwrap();
    if state.engagements.iter().any(|e| e.key() == key) {
      return Ok(InsertOutcome::Duplicate);
    }
    state.next_id += 1;
    let engagement = Engagement {
      id:         state.next_id,
      actor:      key.actor,
      kind:       key.kind,
      target:     key.target,
      created_at: Utc::now(),
    };
    state.engagements.push(engagement.clone());
    Ok(InsertOutcome::Inserted(engagement))
  }

  async fn delete_engagement(&self, key: EngagementKey) -> Result<bool> {
    let mut state = self.state.lock().unwrap();
    let before = state.engagements.len();
    state.engagements.retain(|e| e.key() != key);
    Ok(state.engagements.len() != before)
  }

  async fn engagement_exists(&self, key: EngagementKey) -> Result<bool> {
    let state = self.state.lock().unwrap();
    Ok(state.engagements.iter().any(|e| e.key() == key))
  }

  async fn list_engagements(
    &self,
    actor: PrincipalId,
    kind: EngagementKind,
  ) -> Result<Vec<Engagement>> {
    let state = self.state.lock().unwrap();
    let mut rows: Vec<Engagement> = state
      .engagements
      .iter()
      .filter(|e| e.actor == actor && e.kind == kind)
      .cloned()
      .collect();
    rows.sort_by(|a, b| b.id.cmp(&a.id));
    Ok(rows)
  }

  async fn count_engagements(
    &self,
    kind: EngagementKind,
    target: Target,
  ) -> Result<u64> {
    let state = self.state.lock().unwrap();
    Ok(
      state
        .engagements
        .iter()
        .filter(|e| e.kind == kind && e.target == target)
        .count() as u64,
    )
  }
}
