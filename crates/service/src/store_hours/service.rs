use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use models::store_hours::validate_hours;

use super::domain::{StoreHoursInput, StoreHoursPatch, StoreHoursRecord};
use super::repository::StoreHoursRepository;
use crate::errors::ServiceError;
use crate::pagination::Pagination;

/// Store hours business rules: hour validation and one record per date.
pub struct StoreHoursService<R: StoreHoursRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: StoreHoursRepository + ?Sized> StoreHoursService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Create the record for a day.
    ///
    /// # Examples
    /// ```
    /// use service::store_hours::{StoreHoursService, domain::StoreHoursInput, repository::mock::InMemoryStoreHoursRepository};
    /// use std::sync::Arc;
    /// let svc = StoreHoursService::new(Arc::new(InMemoryStoreHoursRepository::default()));
    /// let input = StoreHoursInput {
    ///     date: chrono::NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
    ///     open_time: chrono::NaiveTime::from_hms_opt(9, 0, 0),
    ///     close_time: chrono::NaiveTime::from_hms_opt(17, 0, 0),
    ///     is_closed: false,
    /// };
    /// let rec = tokio_test::block_on(svc.create(input)).unwrap();
    /// assert!(!rec.is_closed);
    /// ```
    #[instrument(skip(self, input), fields(date = %input.date))]
    pub async fn create(&self, input: StoreHoursInput) -> Result<StoreHoursRecord, ServiceError> {
        validate_hours(input.open_time, input.close_time, input.is_closed)?;
        if let Some(existing) = self.repo.find_by_date(input.date).await? {
            debug!(existing_id = %existing.id, "date already has store hours");
            return Err(duplicate(input.date));
        }
        let rec = self.repo.create(&input).await?;
        info!(id = %rec.id, date = %rec.date, is_closed = rec.is_closed, "store_hours_created");
        Ok(rec)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<StoreHoursRecord>, ServiceError> {
        self.repo.get(id).await
    }

    pub async fn find_by_date(&self, date: NaiveDate) -> Result<Option<StoreHoursRecord>, ServiceError> {
        self.repo.find_by_date(date).await
    }

    /// Apply a partial update; fields the patch does not mention keep their values.
    #[instrument(skip(self, patch), fields(id = %id))]
    pub async fn update(&self, id: Uuid, patch: StoreHoursPatch) -> Result<StoreHoursRecord, ServiceError> {
        let current = self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found("store_hours"))?;
        if patch.is_empty() {
            return Ok(current);
        }
        let merged = patch.apply_to(&current);
        validate_hours(merged.open_time, merged.close_time, merged.is_closed)?;
        if merged.date != current.date {
            if let Some(other) = self.repo.find_by_date(merged.date).await? {
                debug!(other_id = %other.id, "target date already has store hours");
                return Err(duplicate(merged.date));
            }
        }
        let rec = self.repo.update(id, &merged).await?;
        info!(id = %rec.id, date = %rec.date, "store_hours_updated");
        Ok(rec)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        if !self.repo.delete(id).await? {
            return Err(ServiceError::not_found("store_hours"));
        }
        info!(id = %id, "store_hours_deleted");
        Ok(())
    }

    /// Records for `from..=to`, ordered by date.
    pub async fn list_between(&self, from: NaiveDate, to: NaiveDate, page: Pagination) -> Result<Vec<StoreHoursRecord>, ServiceError> {
        if from > to {
            return Err(ServiceError::Validation("from must not be after to".into()));
        }
        self.repo.list_between(from, to, page).await
    }
}

fn duplicate(date: NaiveDate) -> ServiceError {
    ServiceError::Conflict(format!("store hours for {} already exist", date))
}
