//! HTTP surface for Wayfare.
//!
//! Exposes an axum [`Router`] for external login, token refresh and the
//! like/scrap/bookmark engagement endpoints, backed by any store that
//! implements both [`IdentityStore`] and [`EngagementStore`].

pub mod auth;
pub mod config;
pub mod engagements;
pub mod error;
pub mod sessions;

pub use error::ApiError;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use tower_http::trace::TraceLayer;
use wayfare_core::{
  EngagementGuard, IdentityResolver, TokenIssuer,
  store::{EngagementStore, IdentityStore},
};

use auth::ProviderConfig;

// ─── Application state ────────────────────────────────────────────────────────

/// A backend usable by the HTTP layer.
pub trait AppStore: IdentityStore + EngagementStore + 'static {}

impl<T: IdentityStore + EngagementStore + 'static> AppStore for T {}

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub resolver: IdentityResolver<S>,
  pub guard:    EngagementGuard<S>,
  pub tokens:   Arc<TokenIssuer>,
  pub provider: Arc<ProviderConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      resolver: self.resolver.clone(),
      guard:    self.guard.clone(),
      tokens:   Arc::clone(&self.tokens),
      provider: Arc::clone(&self.provider),
    }
  }
}

impl<S: AppStore> AppState<S> {
  pub fn new(store: Arc<S>, tokens: TokenIssuer, provider: ProviderConfig) -> Self {
    Self {
      resolver: IdentityResolver::new(Arc::clone(&store)),
      guard:    EngagementGuard::new(store),
      tokens:   Arc::new(tokens),
      provider: Arc::new(provider),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`].
pub fn router<S: AppStore>(state: AppState<S>) -> Router {
  Router::new()
    .route("/auth/external", post(sessions::external_login::<S>))
    .route("/auth/refresh",  post(sessions::refresh::<S>))
    .route("/me",            get(sessions::me::<S>))
    .route("/engagements/{kind}", get(engagements::list::<S>))
    .route(
      "/engagements/{kind}/{target_type}/{target_id}",
      get(engagements::show::<S>)
        .put(engagements::add::<S>)
        .delete(engagements::remove::<S>),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
