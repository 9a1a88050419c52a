use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::Pagination;
use crate::store_hours::domain::{StoreHoursInput, StoreHoursRecord};
use crate::store_hours::repository::StoreHoursRepository;

use models::store_hours;

pub struct SeaOrmStoreHoursRepository {
    pub db: DatabaseConnection,
}

#[async_trait::async_trait]
impl StoreHoursRepository for SeaOrmStoreHoursRepository {
    async fn create(&self, input: &StoreHoursInput) -> Result<StoreHoursRecord, ServiceError> {
        let created = store_hours::create(&self.db, input.date, input.open_time, input.close_time, input.is_closed).await?;
        Ok(created.into())
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoreHoursRecord>, ServiceError> {
        let found = store_hours::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(found.map(Into::into))
    }

    async fn update(&self, id: Uuid, input: &StoreHoursInput) -> Result<StoreHoursRecord, ServiceError> {
        let updated = store_hours::update_fields(&self.db, id, input.date, input.open_time, input.close_time, input.is_closed).await?;
        Ok(updated.into())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        Ok(store_hours::delete(&self.db, id).await?)
    }

    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<StoreHoursRecord>, ServiceError> {
        Ok(store_hours::find_by_date(&self.db, date).await?.map(Into::into))
    }

    async fn list_between(&self, from: NaiveDate, to: NaiveDate, page: Pagination) -> Result<Vec<StoreHoursRecord>, ServiceError> {
        let (page_idx, per_page) = page.normalize();
        let rows = store_hours::list_between(&self.db, from, to, page_idx, per_page).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use chrono::NaiveTime;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
    }

    #[tokio::test]
    async fn seaorm_repository_roundtrip() -> Result<(), anyhow::Error> {
        let repo = SeaOrmStoreHoursRepository { db: get_db().await? };
        let input = StoreHoursInput {
            date: d(1),
            open_time: NaiveTime::from_hms_opt(8, 0, 0),
            close_time: NaiveTime::from_hms_opt(20, 0, 0),
            is_closed: false,
        };
        let created = repo.create(&input).await?;
        let found = repo.get(created.id).await?.unwrap();
        assert_eq!(found.date, input.date);
        assert_eq!(found.open_time, input.open_time);
        assert_eq!(found.close_time, input.close_time);
        assert_eq!(found.is_closed, input.is_closed);

        let closed = StoreHoursInput { is_closed: true, open_time: None, close_time: None, ..input.clone() };
        let updated = repo.update(created.id, &closed).await?;
        assert!(updated.is_closed);
        assert_eq!(repo.find_by_date(d(1)).await?.unwrap().id, created.id);

        let dup = repo.create(&input).await;
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));

        assert!(repo.delete(created.id).await?);
        assert!(repo.get(created.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn seaorm_repository_lists_range() -> Result<(), anyhow::Error> {
        let repo = SeaOrmStoreHoursRepository { db: get_db().await? };
        for day in [3, 1, 2, 10] {
            repo.create(&StoreHoursInput { date: d(day), open_time: None, close_time: None, is_closed: true }).await?;
        }
        let rows = repo.list_between(d(1), d(3), Pagination::default()).await?;
        assert_eq!(rows.iter().map(|r| r.date).collect::<Vec<_>>(), vec![d(1), d(2), d(3)]);
        Ok(())
    }
}
