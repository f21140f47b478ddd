use chrono::DateTime;
use salesdesk_core::model::contact::Contact;
use salesdesk_core::{parse_id, EntityRepository, FixtureStore, Patch, RepoError};
use serde_json::json;

#[tokio::test]
async fn create_then_get_by_id_roundtrip() {
    let store = FixtureStore::empty();
    let repo = store.contacts();

    let created = repo.create(contact("Ada Lovelace", "ada@x.com")).await.unwrap();
    assert!(created.id > 0);
    assert!(created.created_at > DateTime::UNIX_EPOCH);

    let loaded = repo.get_by_id(created.id).await.unwrap();
    assert_eq!(loaded, created);
}

#[tokio::test]
async fn create_assigns_ids_strictly_above_current_maximum() {
    let store = FixtureStore::empty();
    let repo = store.contacts();

    let first = repo.create(contact("Ada Lovelace", "ada@x.com")).await.unwrap();
    let second = repo.create(contact("Bob Lee", "bob@x.com")).await.unwrap();
    assert!(second.id > first.id);

    // Identity is never reused after a hard delete.
    repo.delete(second.id).await.unwrap();
    let third = repo.create(contact("Carol Park", "carol@x.com")).await.unwrap();
    assert_eq!(third.id, first.id + 1);
}

#[tokio::test]
async fn update_merges_partially_and_preserves_the_rest() {
    let store = FixtureStore::empty();
    let repo = store.contacts();
    let created = repo.create(contact("Ada Lovelace", "ada@x.com")).await.unwrap();

    let merged = repo
        .update(created.id, Patch::single("phone", json!("555-042")))
        .await
        .unwrap();

    assert_eq!(merged.phone, "555-042");
    assert_eq!(merged.name, created.name);
    assert_eq!(merged.email, created.email);
    assert_eq!(merged.created_at, created.created_at);

    let loaded = repo.get_by_id(created.id).await.unwrap();
    assert_eq!(loaded, merged);
}

#[tokio::test]
async fn update_applies_explicit_null_but_never_id() {
    let store = FixtureStore::empty();
    let repo = store.contacts();
    let mut draft = contact("Ada Lovelace", "ada@x.com");
    draft.company_id = Some(5);
    let created = repo.create(draft).await.unwrap();

    let merged = repo
        .update(
            created.id,
            Patch::new()
                .set("company_id", json!(null))
                .set("id", json!(999)),
        )
        .await
        .unwrap();

    assert_eq!(merged.company_id, None);
    assert_eq!(merged.id, created.id);
}

#[tokio::test]
async fn update_missing_id_is_not_found() {
    let store = FixtureStore::empty();
    let repo = store.contacts();

    let err = repo
        .update(404, Patch::single("name", json!("Nobody")))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound { id: 404, .. }));
}

#[tokio::test]
async fn delete_is_hard_and_not_idempotent() {
    let store = FixtureStore::empty();
    let repo = store.contacts();
    let created = repo.create(contact("Ada Lovelace", "ada@x.com")).await.unwrap();

    repo.delete(created.id).await.unwrap();

    let get_err = repo.get_by_id(created.id).await.unwrap_err();
    assert!(matches!(get_err, RepoError::NotFound { .. }));

    let second_delete = repo.delete(created.id).await.unwrap_err();
    assert!(matches!(second_delete, RepoError::NotFound { .. }));
}

#[tokio::test]
async fn get_all_returns_a_defensive_copy() {
    let store = FixtureStore::empty();
    let repo = store.contacts();
    repo.create(contact("Ada Lovelace", "ada@x.com")).await.unwrap();

    let mut snapshot = repo.get_all().await.unwrap();
    snapshot[0].name = "Mutated Locally".to_string();
    snapshot.clear();

    let fresh = repo.get_all().await.unwrap();
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].name, "Ada Lovelace");
}

#[tokio::test]
async fn seeded_collections_are_independent_per_store() {
    let first = FixtureStore::seeded().unwrap();
    let second = FixtureStore::seeded().unwrap();

    let victim = first.contacts().get_all().await.unwrap()[0].id;
    first.contacts().delete(victim).await.unwrap();

    // A second store instance keeps its own lifecycle.
    assert!(second.contacts().get_by_id(victim).await.is_ok());
}

#[test]
fn string_identities_are_coerced_or_rejected() {
    assert_eq!(parse_id("7").unwrap(), 7);
    assert_eq!(parse_id(" 12 ").unwrap(), 12);
    assert!(matches!(parse_id("7.5"), Err(RepoError::InvalidId(_))));
    assert!(matches!(parse_id("abc"), Err(RepoError::InvalidId(_))));
}

fn contact(name: &str, email: &str) -> Contact {
    Contact {
        id: 0,
        name: name.to_string(),
        email: email.to_string(),
        phone: "555-0100".to_string(),
        company_id: None,
        owner_id: None,
        tags: vec!["fixture".to_string()],
        created_at: DateTime::UNIX_EPOCH,
        last_activity: DateTime::UNIX_EPOCH,
    }
}
