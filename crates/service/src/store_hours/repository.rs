use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use super::domain::{StoreHoursInput, StoreHoursRecord};
use crate::errors::ServiceError;
use crate::pagination::Pagination;

/// Data access for store hours, limited to what callers need.
#[async_trait]
pub trait StoreHoursRepository: Send + Sync {
    async fn create(&self, input: &StoreHoursInput) -> Result<StoreHoursRecord, ServiceError>;
    async fn get(&self, id: Uuid) -> Result<Option<StoreHoursRecord>, ServiceError>;
    /// Overwrite the writable fields of an existing record.
    async fn update(&self, id: Uuid, input: &StoreHoursInput) -> Result<StoreHoursRecord, ServiceError>;
    /// Returns false when no record had `id`.
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;
    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<StoreHoursRecord>, ServiceError>;
    /// Inclusive range ordered by date.
    async fn list_between(&self, from: NaiveDate, to: NaiveDate, page: Pagination) -> Result<Vec<StoreHoursRecord>, ServiceError>;
}

/// Simple in-memory repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use chrono::Utc;
    use models::store_hours::validate_hours;

    /// Keyed by date so iteration is already in calendar order.
    #[derive(Default)]
    pub struct InMemoryStoreHoursRepository {
        rows: Mutex<BTreeMap<NaiveDate, StoreHoursRecord>>,
    }

    #[async_trait]
    impl StoreHoursRepository for InMemoryStoreHoursRepository {
        async fn create(&self, input: &StoreHoursInput) -> Result<StoreHoursRecord, ServiceError> {
            validate_hours(input.open_time, input.close_time, input.is_closed)?;
            let mut rows = self.rows.lock().unwrap();
            if rows.contains_key(&input.date) {
                return Err(ServiceError::Conflict(format!("store hours for {} already exist", input.date)));
            }
            let now = Utc::now();
            let rec = StoreHoursRecord {
                id: Uuid::new_v4(),
                date: input.date,
                open_time: input.open_time,
                close_time: input.close_time,
                is_closed: input.is_closed,
                created_at: now,
                updated_at: now,
            };
            rows.insert(rec.date, rec.clone());
            Ok(rec)
        }

        async fn get(&self, id: Uuid) -> Result<Option<StoreHoursRecord>, ServiceError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.values().find(|r| r.id == id).cloned())
        }

        async fn update(&self, id: Uuid, input: &StoreHoursInput) -> Result<StoreHoursRecord, ServiceError> {
            validate_hours(input.open_time, input.close_time, input.is_closed)?;
            let mut rows = self.rows.lock().unwrap();
            let current = rows
                .values()
                .find(|r| r.id == id)
                .cloned()
                .ok_or_else(|| ServiceError::not_found("store_hours"))?;
            if input.date != current.date && rows.contains_key(&input.date) {
                return Err(ServiceError::Conflict(format!("store hours for {} already exist", input.date)));
            }
            rows.remove(&current.date);
            let rec = StoreHoursRecord {
                date: input.date,
                open_time: input.open_time,
                close_time: input.close_time,
                is_closed: input.is_closed,
                updated_at: Utc::now(),
                ..current
            };
            rows.insert(rec.date, rec.clone());
            Ok(rec)
        }

        async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
            let mut rows = self.rows.lock().unwrap();
            let date = rows.values().find(|r| r.id == id).map(|r| r.date);
            Ok(date.and_then(|d| rows.remove(&d)).is_some())
        }

        async fn find_by_date(&self, date: NaiveDate) -> Result<Option<StoreHoursRecord>, ServiceError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.get(&date).cloned())
        }

        async fn list_between(&self, from: NaiveDate, to: NaiveDate, page: Pagination) -> Result<Vec<StoreHoursRecord>, ServiceError> {
            let (page_idx, per_page) = page.normalize();
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .range(from..=to)
                .map(|(_, r)| r.clone())
                .skip((page_idx * per_page) as usize)
                .take(per_page as usize)
                .collect())
        }
    }
}
