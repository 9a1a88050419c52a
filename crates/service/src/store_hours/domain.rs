use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A stored day. `id` and the timestamps are owned by storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreHoursRecord {
    pub id: Uuid,
    pub date: NaiveDate,
    pub open_time: Option<NaiveTime>,
    pub close_time: Option<NaiveTime>,
    pub is_closed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The caller-writable field set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreHoursInput {
    pub date: NaiveDate,
    #[serde(default)]
    pub open_time: Option<NaiveTime>,
    #[serde(default)]
    pub close_time: Option<NaiveTime>,
    #[serde(default)]
    pub is_closed: bool,
}

/// Partial update. An absent field is left alone; for the times, an explicit
/// `null` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StoreHoursPatch {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "present")]
    pub open_time: Option<Option<NaiveTime>>,
    #[serde(default, deserialize_with = "present")]
    pub close_time: Option<Option<NaiveTime>>,
    #[serde(default)]
    pub is_closed: Option<bool>,
}

fn present<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

impl StoreHoursPatch {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.open_time.is_none() && self.close_time.is_none() && self.is_closed.is_none()
    }

    /// Overlay the mentioned fields on `current`.
    pub fn apply_to(&self, current: &StoreHoursRecord) -> StoreHoursInput {
        StoreHoursInput {
            date: self.date.unwrap_or(current.date),
            open_time: self.open_time.unwrap_or(current.open_time),
            close_time: self.close_time.unwrap_or(current.close_time),
            is_closed: self.is_closed.unwrap_or(current.is_closed),
        }
    }
}

impl From<models::store_hours::Model> for StoreHoursRecord {
    fn from(m: models::store_hours::Model) -> Self {
        Self {
            id: m.id,
            date: m.date,
            open_time: m.open_time,
            close_time: m.close_time,
            is_closed: m.is_closed,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}
