use sea_orm::{entity::prelude::*, DatabaseConnection, PaginatorTrait, QueryOrder, Set};
use uuid::Uuid;
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Operating status of the store for one calendar day.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "store_hours")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub date: Date,
    pub open_time: Option<Time>,
    pub close_time: Option<Time>,
    pub is_closed: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

/// An open day needs both times with `open < close`; closed days accept anything.
pub fn validate_hours(open_time: Option<NaiveTime>, close_time: Option<NaiveTime>, is_closed: bool) -> Result<(), ModelError> {
    if is_closed {
        return Ok(());
    }
    match (open_time, close_time) {
        (Some(open), Some(close)) if open < close => Ok(()),
        (Some(_), Some(_)) => Err(ModelError::Validation("open_time must be before close_time".into())),
        _ => Err(ModelError::Validation("open_time and close_time are required when the store is open".into())),
    }
}

pub async fn create(
    db: &DatabaseConnection,
    date: NaiveDate,
    open_time: Option<NaiveTime>,
    close_time: Option<NaiveTime>,
    is_closed: bool,
) -> Result<Model, ModelError> {
    validate_hours(open_time, close_time, is_closed)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        date: Set(date),
        open_time: Set(open_time),
        close_time: Set(close_time),
        is_closed: Set(is_closed),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(ModelError::from_db)
}

pub async fn find_by_date(db: &DatabaseConnection, date: NaiveDate) -> Result<Option<Model>, ModelError> {
    Entity::find()
        .filter(Column::Date.eq(date))
        .one(db)
        .await
        .map_err(ModelError::from_db)
}

/// Overwrite all writable fields of an existing row.
pub async fn update_fields(
    db: &DatabaseConnection,
    id: Uuid,
    date: NaiveDate,
    open_time: Option<NaiveTime>,
    close_time: Option<NaiveTime>,
    is_closed: bool,
) -> Result<Model, ModelError> {
    validate_hours(open_time, close_time, is_closed)?;
    let mut am: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ModelError::from_db)?
        .ok_or_else(|| ModelError::NotFound("store_hours not found".into()))?
        .into();
    am.date = Set(date);
    am.open_time = Set(open_time);
    am.close_time = Set(close_time);
    am.is_closed = Set(is_closed);
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(ModelError::from_db)
}

/// Rows with `from <= date <= to`, ordered by date. `page_idx` is 0-based.
pub async fn list_between(
    db: &DatabaseConnection,
    from: NaiveDate,
    to: NaiveDate,
    page_idx: u64,
    per_page: u64,
) -> Result<Vec<Model>, ModelError> {
    Entity::find()
        .filter(Column::Date.between(from, to))
        .order_by_asc(Column::Date)
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await
        .map_err(ModelError::from_db)
}

/// Returns true if a row was deleted.
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<bool, ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await.map_err(ModelError::from_db)?;
    Ok(res.rows_affected > 0)
}
