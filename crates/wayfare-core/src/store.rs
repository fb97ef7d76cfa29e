//! Storage traits for principals and engagements.
//!
//! Implemented by storage backends (e.g. `wayfare-store-sqlite`). The
//! services in this crate depend on these abstractions, not on any concrete
//! backend.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use crate::{
  engagement::{Engagement, EngagementKey, EngagementKind, Target},
  principal::{ExternalIdentity, Principal, PrincipalId},
};

/// Result of [`EngagementStore::insert_engagement`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
  /// A new row was written.
  Inserted(Engagement),
  /// The uniqueness constraint already holds this key, either from an
  /// earlier call or from a concurrent writer that won the race.
  Duplicate,
}

/// Persistence for [`Principal`]s.
pub trait IdentityStore: Send + Sync {
  /// Backend error. Conversion into [`crate::Error`] lets backends surface
  /// conflicts (e.g. a taken email) as typed core errors.
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  /// Atomically create or update the principal for
  /// `identity.external_subject_id`.
  ///
  /// On update only the fields that are `Some` in `identity` are written.
  /// Two concurrent calls for a new subject id must leave a single row.
  fn upsert_principal(
    &self,
    identity: ExternalIdentity,
  ) -> impl Future<Output = Result<Principal, Self::Error>> + Send + '_;

  /// Retrieve a principal by id. Returns `None` if not found.
  fn get_principal(
    &self,
    id: PrincipalId,
  ) -> impl Future<Output = Result<Option<Principal>, Self::Error>> + Send + '_;

  /// Retrieve a principal by the provider's subject id.
  fn find_principal_by_subject<'a>(
    &'a self,
    external_subject_id: &'a str,
  ) -> impl Future<Output = Result<Option<Principal>, Self::Error>> + Send + 'a;
}

/// Persistence for [`Engagement`]s, unique on [`EngagementKey`].
pub trait EngagementStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  /// Insert a row for `key`. A uniqueness violation is reported as
  /// [`InsertOutcome::Duplicate`], never as an error.
  fn insert_engagement(
    &self,
    key: EngagementKey,
  ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send + '_;

  /// Delete the row for `key`. Returns whether a row was removed.
  fn delete_engagement(
    &self,
    key: EngagementKey,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn engagement_exists(
    &self,
    key: EngagementKey,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// All engagements of `kind` held by `actor`, newest first.
  fn list_engagements(
    &self,
    actor: PrincipalId,
    kind: EngagementKind,
  ) -> impl Future<Output = Result<Vec<Engagement>, Self::Error>> + Send + '_;

  /// Number of actors holding an engagement of `kind` on `target`.
  fn count_engagements(
    &self,
    kind: EngagementKind,
    target: Target,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
