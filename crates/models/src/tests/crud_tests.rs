use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use sea_orm::EntityTrait;

use crate::db::connect_in_memory;
use crate::errors::ModelError;
use crate::{store_hours, user, user_credentials};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn t(h: u32, m: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(h, m, 0)
}

#[tokio::test]
async fn store_hours_create_then_read() -> Result<()> {
    let db = connect_in_memory().await?;

    let created = store_hours::create(&db, d(2024, 7, 1), t(9, 0), t(17, 30), false).await?;
    let found = store_hours::Entity::find_by_id(created.id).one(&db).await?.unwrap();
    assert_eq!(found.date, d(2024, 7, 1));
    assert_eq!(found.open_time, t(9, 0));
    assert_eq!(found.close_time, t(17, 30));
    assert!(!found.is_closed);

    let by_date = store_hours::find_by_date(&db, d(2024, 7, 1)).await?.unwrap();
    assert_eq!(by_date.id, created.id);
    assert!(store_hours::find_by_date(&db, d(2024, 7, 2)).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn store_hours_closed_day_without_times() -> Result<()> {
    let db = connect_in_memory().await?;
    let created = store_hours::create(&db, d(2024, 12, 25), None, None, true).await?;
    let found = store_hours::Entity::find_by_id(created.id).one(&db).await?.unwrap();
    assert!(found.is_closed);
    assert_eq!(found.open_time, None);
    assert_eq!(found.close_time, None);
    Ok(())
}

#[tokio::test]
async fn store_hours_date_is_unique() -> Result<()> {
    let db = connect_in_memory().await?;
    store_hours::create(&db, d(2024, 7, 1), t(9, 0), t(17, 0), false).await?;
    let dup = store_hours::create(&db, d(2024, 7, 1), None, None, true).await;
    assert!(matches!(dup, Err(ModelError::Conflict(_))), "got {dup:?}");
    Ok(())
}

#[tokio::test]
async fn store_hours_update_and_delete() -> Result<()> {
    let db = connect_in_memory().await?;
    let created = store_hours::create(&db, d(2024, 7, 1), t(9, 0), t(17, 0), false).await?;

    let updated = store_hours::update_fields(&db, created.id, d(2024, 7, 1), t(10, 0), t(16, 0), false).await?;
    assert_eq!(updated.open_time, t(10, 0));

    let invalid = store_hours::update_fields(&db, created.id, d(2024, 7, 1), t(18, 0), t(16, 0), false).await;
    assert!(matches!(invalid, Err(ModelError::Validation(_))));

    let missing = store_hours::update_fields(&db, uuid::Uuid::new_v4(), d(2024, 7, 1), None, None, true).await;
    assert!(matches!(missing, Err(ModelError::NotFound(_))));

    assert!(store_hours::delete(&db, created.id).await?);
    assert!(!store_hours::delete(&db, created.id).await?);
    Ok(())
}

#[tokio::test]
async fn store_hours_list_between_is_ordered_and_paged() -> Result<()> {
    let db = connect_in_memory().await?;
    for day in [5, 1, 3, 2, 4, 9] {
        store_hours::create(&db, d(2024, 7, day), t(9, 0), t(17, 0), false).await?;
    }

    let all = store_hours::list_between(&db, d(2024, 7, 1), d(2024, 7, 5), 0, 100).await?;
    let days: Vec<_> = all.iter().map(|r| r.date).collect();
    assert_eq!(days, (1..=5).map(|day| d(2024, 7, day)).collect::<Vec<_>>());

    let page2 = store_hours::list_between(&db, d(2024, 7, 1), d(2024, 7, 31), 1, 2).await?;
    assert_eq!(page2.iter().map(|r| r.date).collect::<Vec<_>>(), vec![d(2024, 7, 3), d(2024, 7, 4)]);
    Ok(())
}

#[tokio::test]
async fn user_lifecycle() -> Result<()> {
    let db = connect_in_memory().await?;

    let u = user::create(&db, "Owner@Example.com", "Owner").await?;
    assert_eq!(u.email, "owner@example.com");
    assert!(!u.is_verified());

    let dup = user::create(&db, "owner@example.com", "Other").await;
    assert!(matches!(dup, Err(ModelError::Conflict(_))));

    let verified = user::mark_verified(&db, u.id).await?;
    assert!(verified.is_verified());
    let again = user::mark_verified(&db, u.id).await?;
    assert_eq!(again.email_verified_at, verified.email_verified_at);

    let renamed = user::update_profile(&db, u.id, "New Name", "owner@example.com").await?;
    assert_eq!(renamed.name, "New Name");
    assert!(renamed.is_verified());

    let moved = user::update_profile(&db, u.id, "New Name", "new@example.com").await?;
    assert_eq!(moved.email, "new@example.com");
    assert!(!moved.is_verified());

    assert!(user::find_by_email(&db, "NEW@example.com").await?.is_some());
    assert!(user::hard_delete(&db, u.id).await?);
    assert!(user::find_by_email(&db, "new@example.com").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn credentials_upsert_replaces_hash() -> Result<()> {
    let db = connect_in_memory().await?;
    let u = user::create(&db, "cred@example.com", "Cred").await?;

    let first = user_credentials::upsert_password(&db, u.id, "hash-1".into(), "argon2").await?;
    let second = user_credentials::upsert_password(&db, u.id, "hash-2".into(), "argon2").await?;
    assert_eq!(first.id, second.id);

    let stored = user_credentials::find_by_user(&db, u.id).await?.unwrap();
    assert_eq!(stored.password_hash, "hash-2");

    let empty = user_credentials::upsert_password(&db, u.id, " ".into(), "argon2").await;
    assert!(matches!(empty, Err(ModelError::Validation(_))));
    Ok(())
}
