//! [`SqliteStore`]: the SQLite implementation of [`IdentityStore`] and
//! [`EngagementStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, ffi};
use wayfare_core::{
  engagement::{Engagement, EngagementKey, EngagementKind, Target},
  principal::{ExternalIdentity, Principal, PrincipalId},
  store::{EngagementStore, IdentityStore, InsertOutcome},
};

use crate::{
  Error, Result,
  encode::{
    ENGAGEMENT_COLUMNS, PRINCIPAL_COLUMNS, RawEngagement, RawPrincipal, encode_dt,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Wayfare store backed by a single SQLite file.
///
/// Clones share one reference-counted connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "opened sqlite store");
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the underlying connection. Other clones of this store fail with
  /// a database error afterwards.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Constraint classification ───────────────────────────────────────────────

enum Violation {
  Unique,
  ForeignKey,
}

/// Classify a constraint failure; `None` for every other error.
fn violation(e: &rusqlite::Error) -> Option<Violation> {
  match e {
    rusqlite::Error::SqliteFailure(err, _)
      if err.code == rusqlite::ErrorCode::ConstraintViolation =>
    {
      match err.extended_code {
        ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
          Some(Violation::Unique)
        }
        ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(Violation::ForeignKey),
        _ => None,
      }
    }
    _ => None,
  }
}

enum RawInsert {
  Inserted(i64),
  Duplicate,
  MissingActor,
}

// ─── IdentityStore impl ──────────────────────────────────────────────────────

impl IdentityStore for SqliteStore {
  type Error = Error;

  async fn upsert_principal(&self, identity: ExternalIdentity) -> Result<Principal> {
    let ExternalIdentity {
      external_subject_id,
      email,
      display_name,
      avatar_url,
      email_verified,
    } = identity;
    let created_at = encode_dt(Utc::now());
    let taken_email = email.clone();

    // One statement, so concurrent first logins collapse onto one row.
    let raw: Option<RawPrincipal> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "INSERT INTO principals (
             external_subject_id, email, display_name, avatar_url,
             email_verified, role, created_at
           ) VALUES (?1, ?2, ?3, ?4, COALESCE(?5, 0), 'user', ?6)
           ON CONFLICT (external_subject_id) DO UPDATE SET
             email          = COALESCE(?2, email),
             display_name   = COALESCE(?3, display_name),
             avatar_url     = COALESCE(?4, avatar_url),
             email_verified = COALESCE(?5, email_verified)
           RETURNING {PRINCIPAL_COLUMNS}"
        );
        let result = conn.query_row(
          &sql,
          rusqlite::params![
            external_subject_id,
            email,
            display_name,
            avatar_url,
            email_verified,
            created_at,
          ],
          RawPrincipal::from_row,
        );
        match result {
          Ok(raw) => Ok(Some(raw)),
          Err(e) if matches!(violation(&e), Some(Violation::Unique)) => Ok(None),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    match raw {
      Some(raw) => raw.into_principal(),
      None => Err(Error::EmailTaken(taken_email.unwrap_or_default())),
    }
  }

  async fn get_principal(&self, id: PrincipalId) -> Result<Option<Principal>> {
    let raw: Option<RawPrincipal> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {PRINCIPAL_COLUMNS} FROM principals WHERE principal_id = ?1"
              ),
              rusqlite::params![id.0],
              RawPrincipal::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPrincipal::into_principal).transpose()
  }

  async fn find_principal_by_subject(
    &self,
    external_subject_id: &str,
  ) -> Result<Option<Principal>> {
    let subject = external_subject_id.to_owned();

    let raw: Option<RawPrincipal> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {PRINCIPAL_COLUMNS} FROM principals \
                 WHERE external_subject_id = ?1"
              ),
              rusqlite::params![subject],
              RawPrincipal::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPrincipal::into_principal).transpose()
  }
}

// ─── EngagementStore impl ────────────────────────────────────────────────────

impl EngagementStore for SqliteStore {
  type Error = Error;

  async fn insert_engagement(&self, key: EngagementKey) -> Result<InsertOutcome> {
    let created_at = Utc::now();
    let created_at_str = encode_dt(created_at);
    let actor_id = key.actor.0;
    let kind = key.kind.as_str();
    let target_type = key.target.target_type.as_str();
    let target_id = key.target.target_id;

    let raw = self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "INSERT INTO engagements (actor_id, kind, target_type, target_id, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![actor_id, kind, target_type, target_id, created_at_str],
        );
        match result {
          Ok(_) => Ok(RawInsert::Inserted(conn.last_insert_rowid())),
          Err(e) => match violation(&e) {
            Some(Violation::Unique) => Ok(RawInsert::Duplicate),
            Some(Violation::ForeignKey) => Ok(RawInsert::MissingActor),
            None => Err(e.into()),
          },
        }
      })
      .await?;

    match raw {
      RawInsert::Inserted(id) => Ok(InsertOutcome::Inserted(Engagement {
        id,
        actor: key.actor,
        kind: key.kind,
        target: key.target,
        created_at,
      })),
      RawInsert::Duplicate => Ok(InsertOutcome::Duplicate),
      RawInsert::MissingActor => Err(Error::ActorNotFound(key.actor)),
    }
  }

  async fn delete_engagement(&self, key: EngagementKey) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM engagements
           WHERE actor_id = ?1 AND kind = ?2 AND target_type = ?3 AND target_id = ?4",
          rusqlite::params![
            key.actor.0,
            key.kind.as_str(),
            key.target.target_type.as_str(),
            key.target.target_id,
          ],
        )?)
      })
      .await?;

    Ok(removed > 0)
  }

  async fn engagement_exists(&self, key: EngagementKey) -> Result<bool> {
    let found = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM engagements
               WHERE actor_id = ?1 AND kind = ?2 AND target_type = ?3 AND target_id = ?4",
              rusqlite::params![
                key.actor.0,
                key.kind.as_str(),
                key.target.target_type.as_str(),
                key.target.target_id,
              ],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(found)
  }

  async fn list_engagements(
    &self,
    actor: PrincipalId,
    kind: EngagementKind,
  ) -> Result<Vec<Engagement>> {
    let raws: Vec<RawEngagement> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ENGAGEMENT_COLUMNS} FROM engagements
           WHERE actor_id = ?1 AND kind = ?2
           ORDER BY engagement_id DESC"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![actor.0, kind.as_str()],
            RawEngagement::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEngagement::into_engagement).collect()
  }

  async fn count_engagements(
    &self,
    kind: EngagementKind,
    target: Target,
  ) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM engagements
           WHERE kind = ?1 AND target_type = ?2 AND target_id = ?3",
          rusqlite::params![kind.as_str(), target.target_type.as_str(), target.target_id],
          |r| r.get(0),
        )?)
      })
      .await?;

    u64::try_from(count).map_err(|_| Error::Decode(format!("negative count {count}")))
  }
}
