//! [`IdentityResolver`]: turns a verified external identity into a local
//! [`Principal`].

use std::sync::Arc;

use crate::{
  Error, Result,
  principal::{ExternalIdentity, Principal, PrincipalId},
  store::IdentityStore,
};

/// Create-or-update resolution of external identities.
///
/// The provider's subject id is the only join key. Uniqueness under
/// concurrent first logins is delegated to the store's atomic upsert.
pub struct IdentityResolver<S> {
  store: Arc<S>,
}

impl<S> Clone for IdentityResolver<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
    }
  }
}

impl<S: IdentityStore> IdentityResolver<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Resolve `external` to its principal, creating it on first login.
  ///
  /// Optional fields that are present overwrite the stored values; absent
  /// fields leave them untouched. New principals get [`Role::User`] and
  /// `email_verified = false` unless the provider says otherwise.
  ///
  /// [`Role::User`]: crate::principal::Role::User
  pub async fn upsert(&self, external: ExternalIdentity) -> Result<Principal> {
    if external.external_subject_id.trim().is_empty() {
      return Err(Error::InvalidIdentity(
        "external subject id is empty".to_string(),
      ));
    }

    let principal = self
      .store
      .upsert_principal(external)
      .await
      .map_err(Into::<Error>::into)?;

    tracing::debug!(principal = %principal.id, "resolved external identity");
    Ok(principal)
  }

  /// Fetch a principal that must exist.
  pub async fn get(&self, id: PrincipalId) -> Result<Principal> {
    self
      .store
      .get_principal(id)
      .await
      .map_err(Into::<Error>::into)?
      .ok_or_else(|| Error::NotFound(format!("principal {id}")))
  }
}
