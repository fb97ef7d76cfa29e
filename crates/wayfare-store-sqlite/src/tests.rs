//! Integration tests for `SqliteStore` against an in-memory database.

use std::sync::Arc;

use wayfare_core::{
  EngagementGuard, IdentityResolver,
  engagement::{
    EngagementAction, EngagementKey, EngagementKind, EngagementState, Target,
    TargetType,
  },
  principal::{ExternalIdentity, PrincipalId, Role},
  store::{EngagementStore, IdentityStore, InsertOutcome},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn principal(s: &SqliteStore, subject: &str) -> PrincipalId {
  s.upsert_principal(ExternalIdentity::new(subject))
    .await
    .unwrap()
    .id
}

fn key(actor: PrincipalId, kind: EngagementKind, target: Target) -> EngagementKey {
  EngagementKey { actor, kind, target }
}

// ─── Principals ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_upsert_creates_principal() {
  let s = store().await;

  let p = s
    .upsert_principal(ExternalIdentity::new("ext-1").with_email("a@x.com"))
    .await
    .unwrap();

  assert_eq!(p.id, PrincipalId(1));
  assert_eq!(p.external_subject_id, "ext-1");
  assert_eq!(p.email.as_deref(), Some("a@x.com"));
  assert_eq!(p.display_name, None);
  assert_eq!(p.role, Role::User);
  assert!(!p.email_verified);
}

#[tokio::test]
async fn second_upsert_leaves_absent_fields_untouched() {
  let s = store().await;

  let first = s
    .upsert_principal(
      ExternalIdentity::new("ext-1")
        .with_email("a@x.com")
        .with_avatar_url("https://img.example/a.png")
        .with_email_verified(true),
    )
    .await
    .unwrap();

  let second = s
    .upsert_principal(ExternalIdentity::new("ext-1").with_display_name("Ava"))
    .await
    .unwrap();

  assert_eq!(second.id, first.id);
  assert_eq!(second.email.as_deref(), Some("a@x.com"));
  assert_eq!(second.display_name.as_deref(), Some("Ava"));
  assert_eq!(second.avatar_url.as_deref(), Some("https://img.example/a.png"));
  assert!(second.email_verified);
  assert_eq!(second.created_at, first.created_at);
}

#[tokio::test]
async fn present_fields_overwrite() {
  let s = store().await;
  s.upsert_principal(ExternalIdentity::new("ext-1").with_email("old@x.com"))
    .await
    .unwrap();

  let p = s
    .upsert_principal(
      ExternalIdentity::new("ext-1")
        .with_email("new@x.com")
        .with_email_verified(true),
    )
    .await
    .unwrap();

  assert_eq!(p.email.as_deref(), Some("new@x.com"));
  assert!(p.email_verified);
}

#[tokio::test]
async fn concurrent_first_logins_create_one_principal() {
  let s = store().await;

  let tasks: Vec<_> = (0..8)
    .map(|i| {
      let s = s.clone();
      tokio::spawn(async move {
        s.upsert_principal(
          ExternalIdentity::new("ext-race").with_display_name(format!("n{i}")),
        )
        .await
        .unwrap()
      })
    })
    .collect();

  let mut ids = Vec::new();
  for t in tasks {
    ids.push(t.await.unwrap().id);
  }
  ids.dedup();
  assert_eq!(ids.len(), 1);

  let found = s.find_principal_by_subject("ext-race").await.unwrap().unwrap();
  assert_eq!(found.id, ids[0]);
  assert!(s.get_principal(PrincipalId(found.id.0 + 1)).await.unwrap().is_none());
}

#[tokio::test]
async fn email_is_unique_across_principals() {
  let s = store().await;
  s.upsert_principal(ExternalIdentity::new("ext-1").with_email("a@x.com"))
    .await
    .unwrap();

  let err = s
    .upsert_principal(ExternalIdentity::new("ext-2").with_email("a@x.com"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::EmailTaken(ref e) if e == "a@x.com"));

  // Principals without an email never collide.
  principal(&s, "ext-3").await;
  principal(&s, "ext-4").await;
}

#[tokio::test]
async fn email_conflict_maps_to_core_error() {
  let s = Arc::new(store().await);
  let resolver = IdentityResolver::new(s.clone());
  resolver
    .upsert(ExternalIdentity::new("ext-1").with_email("a@x.com"))
    .await
    .unwrap();

  let err = resolver
    .upsert(ExternalIdentity::new("ext-2").with_email("a@x.com"))
    .await
    .unwrap_err();
  assert!(matches!(err, wayfare_core::Error::EmailTaken(_)));
}

#[tokio::test]
async fn lookups_return_none_when_missing() {
  let s = store().await;
  assert!(s.get_principal(PrincipalId(42)).await.unwrap().is_none());
  assert!(s.find_principal_by_subject("nope").await.unwrap().is_none());
}

// ─── Engagements ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_insert_is_reported_not_raised() {
  let s = store().await;
  let actor = principal(&s, "ext-1").await;
  let k = key(actor, EngagementKind::Like, Target::new(TargetType::ContentA, 42));

  let first = s.insert_engagement(k).await.unwrap();
  let InsertOutcome::Inserted(engagement) = &first else {
    panic!("expected insert, got {first:?}");
  };
  assert_eq!(engagement.key(), k);

  assert_eq!(s.insert_engagement(k).await.unwrap(), InsertOutcome::Duplicate);
  assert_eq!(
    s.count_engagements(k.kind, k.target).await.unwrap(),
    1
  );
}

#[tokio::test]
async fn delete_reports_whether_a_row_was_removed() {
  let s = store().await;
  let actor = principal(&s, "ext-1").await;
  let k = key(actor, EngagementKind::Scrap, Target::new(TargetType::ContentB, 9));

  assert!(!s.delete_engagement(k).await.unwrap());
  s.insert_engagement(k).await.unwrap();
  assert!(s.engagement_exists(k).await.unwrap());
  assert!(s.delete_engagement(k).await.unwrap());
  assert!(!s.engagement_exists(k).await.unwrap());
}

#[tokio::test]
async fn unknown_actor_is_rejected() {
  let s = store().await;
  let k = key(PrincipalId(999), EngagementKind::Like, Target::new(TargetType::ContentA, 1));

  let err = s.insert_engagement(k).await.unwrap_err();
  assert!(matches!(err, Error::ActorNotFound(PrincipalId(999))));
}

#[tokio::test]
async fn list_is_newest_first_and_filtered_by_kind() {
  let s = store().await;
  let actor = principal(&s, "ext-1").await;

  for id in [1, 2, 3] {
    s.insert_engagement(key(actor, EngagementKind::Like, Target::new(TargetType::ContentA, id)))
      .await
      .unwrap();
  }
  s.insert_engagement(key(actor, EngagementKind::Bookmark, Target::new(TargetType::Place, 7)))
    .await
    .unwrap();

  let likes = s.list_engagements(actor, EngagementKind::Like).await.unwrap();
  let ids: Vec<i64> = likes.iter().map(|e| e.target.target_id).collect();
  assert_eq!(ids, [3, 2, 1]);

  let bookmarks = s.list_engagements(actor, EngagementKind::Bookmark).await.unwrap();
  assert_eq!(bookmarks.len(), 1);
  assert_eq!(bookmarks[0].target, Target::new(TargetType::Place, 7));
}

// ─── Guard over SQLite ───────────────────────────────────────────────────────

#[tokio::test]
async fn guard_add_add_remove_remove() {
  let s = Arc::new(store().await);
  let resolver = IdentityResolver::new(s.clone());
  let guard = EngagementGuard::new(s.clone());

  let actor = resolver.upsert(ExternalIdentity::new("ext-7")).await.unwrap().id;
  let post = Target::new(TargetType::ContentA, 42);
  let like = EngagementKind::Like;

  for _ in 0..2 {
    let out = guard.apply(actor, like, post, EngagementAction::Add).await.unwrap();
    assert_eq!(out.state, EngagementState::Present);
  }
  for _ in 0..2 {
    let out = guard.apply(actor, like, post, EngagementAction::Remove).await.unwrap();
    assert_eq!(out.state, EngagementState::Absent);
  }
  assert!(!guard.has_engagement(actor, like, post).await.unwrap());
}

#[tokio::test]
async fn concurrent_adds_leave_one_row() {
  let s = Arc::new(store().await);
  let actor = principal(&s, "ext-1").await;
  let guard = EngagementGuard::new(s.clone());
  let post = Target::new(TargetType::ContentB, 3);

  let tasks: Vec<_> = (0..16)
    .map(|_| {
      let guard = guard.clone();
      tokio::spawn(async move {
        guard
          .apply(actor, EngagementKind::Scrap, post, EngagementAction::Add)
          .await
          .unwrap()
      })
    })
    .collect();

  let mut changed = 0;
  for t in tasks {
    let out = t.await.unwrap();
    assert!(out.is_present());
    if out.changed {
      changed += 1;
    }
  }

  assert_eq!(changed, 1);
  assert_eq!(s.count_engagements(EngagementKind::Scrap, post).await.unwrap(), 1);
}

#[tokio::test]
async fn close_consumes_the_store() {
  let s = store().await;
  principal(&s, "ext-1").await;
  s.close().await.unwrap();
}
