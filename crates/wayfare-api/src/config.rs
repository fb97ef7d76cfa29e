//! Runtime server configuration, deserialised from `config.toml` and
//! `WAYFARE_*` environment variables.

use std::path::PathBuf;

use serde::{Deserialize, Deserializer};
use wayfare_core::token::{
  DEFAULT_ACCESS_TTL_SECS, DEFAULT_REFRESH_TTL_SECS, TokenConfig, TokenIssuer,
  parse_ttl,
};

use crate::auth::ProviderConfig;

/// A token lifetime in seconds. Accepts an integer or a string such as
/// `"3600s"` or `"7d"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ttl(pub u64);

impl<'de> Deserialize<'de> for Ttl {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
      Secs(u64),
      Text(String),
    }

    match Raw::deserialize(deserializer)? {
      Raw::Secs(secs) => Ok(Ttl(secs)),
      Raw::Text(text) => parse_ttl(&text).map(Ttl).map_err(serde::de::Error::custom),
    }
  }
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 3000 }

fn default_access_ttl() -> Ttl { Ttl(DEFAULT_ACCESS_TTL_SECS) }

fn default_refresh_ttl() -> Ttl { Ttl(DEFAULT_REFRESH_TTL_SECS) }

#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:              String,
  #[serde(default = "default_port")]
  pub port:              u16,
  pub store_path:        PathBuf,
  /// Left empty when unset so that startup reports the missing secret.
  #[serde(default)]
  pub access_secret:     String,
  #[serde(default = "default_access_ttl")]
  pub access_ttl:        Ttl,
  #[serde(default)]
  pub refresh_secret:    String,
  #[serde(default = "default_refresh_ttl")]
  pub refresh_ttl:       Ttl,
  /// Basic-auth user name of the identity-provider bridge.
  pub provider_name:     String,
  /// argon2 PHC string of the bridge's key.
  pub provider_key_hash: String,
}

impl ServerConfig {
  /// Build the token issuer; fails when either secret is missing.
  pub fn token_issuer(&self) -> wayfare_core::Result<TokenIssuer> {
    TokenIssuer::new(
      TokenConfig::new(self.access_secret.clone(), self.access_ttl.0),
      TokenConfig::new(self.refresh_secret.clone(), self.refresh_ttl.0),
    )
  }

  pub fn provider(&self) -> ProviderConfig {
    ProviderConfig {
      name:     self.provider_name.clone(),
      key_hash: self.provider_key_hash.clone(),
    }
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}
