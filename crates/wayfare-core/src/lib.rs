//! Core types, store traits and services for the Wayfare identity and
//! engagement layer.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! backends implement the traits in [`store`]; the services in [`identity`],
//! [`token`] and [`guard`] are written against those traits only.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod engagement;
pub mod error;
pub mod guard;
pub mod identity;
pub mod principal;
pub mod store;
pub mod token;

#[cfg(test)]
mod memory;

pub use error::{Error, Result};
pub use guard::EngagementGuard;
pub use identity::IdentityResolver;
pub use token::{SecretKind, TokenConfig, TokenIssuer, TokenPair};
