//! Integration tests for cascading soft deletes.
//!
//! Exercises the repository layer against a real database to verify that:
//! - Deleting an account soft-deletes its contacts, deals, and activities
//!   atomically, all stamped with the same instant
//! - Deleting a deal soft-deletes its activities
//! - A second delete of the same entity reports not-found
//! - Unrelated rows are never touched

mod common;

use common::{new_account, new_activity_for_account, new_contact, new_deal};
use crm_core::types::Timestamp;
use crm_db::repositories::{AccountRepo, ActivityRepo, ContactRepo, DealRepo};
use sqlx::PgPool;

/// Fetch the raw deleted_at column for one row, bypassing the live-only
/// repository queries.
async fn deleted_at(pool: &PgPool, table: &str, id: i64) -> Option<Timestamp> {
    let query = format!("SELECT deleted_at FROM {table} WHERE id = $1");
    sqlx::query_scalar::<_, Option<Timestamp>>(&query)
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn account_cascade_hides_all_children(pool: PgPool) {
    let account = AccountRepo::create(&pool, &new_account("Acme")).await.unwrap();
    let contact = ContactRepo::create(&pool, &new_contact(account.id, "Ada", "Lovelace"))
        .await
        .unwrap();
    let deal = DealRepo::create(&pool, &new_deal(account.id, "Renewal"))
        .await
        .unwrap();
    let activity = ActivityRepo::create(&pool, &new_activity_for_account(account.id, "Kickoff"))
        .await
        .unwrap();

    let deleted = AccountRepo::soft_delete_cascade(&pool, account.id).await.unwrap();
    assert!(deleted, "first delete should report success");

    assert!(AccountRepo::find_by_id(&pool, account.id).await.unwrap().is_none());
    assert!(ContactRepo::find_by_id(&pool, contact.id).await.unwrap().is_none());
    assert!(DealRepo::find_by_id(&pool, deal.id).await.unwrap().is_none());
    assert!(ActivityRepo::find_by_id(&pool, activity.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn account_cascade_stamps_one_instant(pool: PgPool) {
    let account = AccountRepo::create(&pool, &new_account("Acme")).await.unwrap();
    let contact = ContactRepo::create(&pool, &new_contact(account.id, "Ada", "Lovelace"))
        .await
        .unwrap();
    let deal = DealRepo::create(&pool, &new_deal(account.id, "Renewal"))
        .await
        .unwrap();
    let activity = ActivityRepo::create(&pool, &new_activity_for_account(account.id, "Kickoff"))
        .await
        .unwrap();

    AccountRepo::soft_delete_cascade(&pool, account.id).await.unwrap();

    let stamp = deleted_at(&pool, "accounts", account.id).await;
    assert!(stamp.is_some(), "account should carry a deleted_at stamp");
    assert_eq!(deleted_at(&pool, "contacts", contact.id).await, stamp);
    assert_eq!(deleted_at(&pool, "deals", deal.id).await, stamp);
    assert_eq!(deleted_at(&pool, "activities", activity.id).await, stamp);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn account_cascade_leaves_other_accounts_alone(pool: PgPool) {
    let doomed = AccountRepo::create(&pool, &new_account("Doomed")).await.unwrap();
    let survivor = AccountRepo::create(&pool, &new_account("Survivor")).await.unwrap();
    let survivor_contact =
        ContactRepo::create(&pool, &new_contact(survivor.id, "Safe", "Contact"))
            .await
            .unwrap();
    let survivor_deal = DealRepo::create(&pool, &new_deal(survivor.id, "Safe Deal"))
        .await
        .unwrap();

    AccountRepo::soft_delete_cascade(&pool, doomed.id).await.unwrap();

    assert!(AccountRepo::find_by_id(&pool, survivor.id).await.unwrap().is_some());
    assert!(ContactRepo::find_by_id(&pool, survivor_contact.id)
        .await
        .unwrap()
        .is_some());
    assert!(DealRepo::find_by_id(&pool, survivor_deal.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_account_delete_reports_not_found(pool: PgPool) {
    let account = AccountRepo::create(&pool, &new_account("Once")).await.unwrap();

    assert!(AccountRepo::soft_delete_cascade(&pool, account.id).await.unwrap());
    assert!(
        !AccountRepo::soft_delete_cascade(&pool, account.id).await.unwrap(),
        "second delete should report false"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_account_delete_reports_not_found(pool: PgPool) {
    assert!(!AccountRepo::soft_delete_cascade(&pool, 999_999).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deal_cascade_hides_its_activities(pool: PgPool) {
    let account = AccountRepo::create(&pool, &new_account("Acme")).await.unwrap();
    let deal = DealRepo::create(&pool, &new_deal(account.id, "Renewal"))
        .await
        .unwrap();
    let linked = ActivityRepo::create(&pool, &common::new_activity_for_deal(deal.id, "Negotiate"))
        .await
        .unwrap();
    let unlinked = ActivityRepo::create(&pool, &new_activity_for_account(account.id, "Unrelated"))
        .await
        .unwrap();

    let deleted = DealRepo::soft_delete_cascade(&pool, deal.id).await.unwrap();
    assert!(deleted);

    assert!(DealRepo::find_by_id(&pool, deal.id).await.unwrap().is_none());
    assert!(ActivityRepo::find_by_id(&pool, linked.id).await.unwrap().is_none());
    assert!(
        ActivityRepo::find_by_id(&pool, unlinked.id).await.unwrap().is_some(),
        "activities not linked to the deal must survive"
    );

    let stamp = deleted_at(&pool, "deals", deal.id).await;
    assert_eq!(deleted_at(&pool, "activities", linked.id).await, stamp);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn account_still_listed_after_unrelated_cascade(pool: PgPool) {
    let kept = AccountRepo::create(&pool, &new_account("Kept")).await.unwrap();
    let gone = AccountRepo::create(&pool, &new_account("Gone")).await.unwrap();

    AccountRepo::soft_delete_cascade(&pool, gone.id).await.unwrap();

    let (items, total) = AccountRepo::list(&pool, Default::default(), None).await.unwrap();
    assert_eq!(total, 1);
    assert!(items.iter().any(|a| a.id == kept.id));
    assert!(!items.iter().any(|a| a.id == gone.id));
}
