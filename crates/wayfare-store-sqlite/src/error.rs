//! Error type for `wayfare-store-sqlite`.

use thiserror::Error;
use wayfare_core::principal::PrincipalId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A column held a value the domain types do not recognise.
  #[error("decode error: {0}")]
  Decode(String),

  #[error("email {0:?} already belongs to another principal")]
  EmailTaken(String),

  #[error("actor {0} does not exist")]
  ActorNotFound(PrincipalId),
}

impl From<Error> for wayfare_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::EmailTaken(email) => Self::EmailTaken(email),
      Error::ActorNotFound(id) => Self::ActorNotFound(id),
      other => Self::Store(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
