use async_trait::async_trait;
use bson::{doc, DateTime, Document};
use chrono::NaiveDate;
use hideaway_db::models::ReservationSlot;
use mongodb::Database;

use super::base::{BaseDao, DaoError, DaoResult};
use crate::store::{DateRange, SlotStore, SlotWrite};

pub struct SlotDao {
    pub base: BaseDao<ReservationSlot>,
}

impl SlotDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, ReservationSlot::COLLECTION),
        }
    }
}

/// Dates are stored as `YYYY-MM-DD` strings, which sort chronologically.
pub(crate) fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn range_filter(field: &str, range: DateRange) -> Document {
    let mut bounds = Document::new();
    if let Some(start) = range.start {
        bounds.insert("$gte", date_key(start));
    }
    if let Some(end) = range.end {
        bounds.insert("$lte", date_key(end));
    }
    let mut filter = Document::new();
    if !bounds.is_empty() {
        filter.insert(field, bounds);
    }
    filter
}

#[async_trait]
impl SlotStore for SlotDao {
    async fn find(&self, date: NaiveDate) -> DaoResult<Option<ReservationSlot>> {
        self.base.find_by_id(date_key(date)).await
    }

    async fn list_range(&self, range: DateRange) -> DaoResult<Vec<ReservationSlot>> {
        self.base
            .find_many(range_filter("_id", range), Some(doc! { "_id": 1 }))
            .await
    }

    async fn list_reserved(&self) -> DaoResult<Vec<ReservationSlot>> {
        self.base
            .find_many(doc! { "reserved_by": { "$ne": null } }, Some(doc! { "_id": 1 }))
            .await
    }

    async fn set_available(&self, date: NaiveDate, available: bool) -> DaoResult<SlotWrite> {
        let now = DateTime::now();
        // Opening never conflicts. Closing only matches an unreserved slot;
        // against a reserved one the upsert turns into an insert on an
        // existing `_id` and fails with a duplicate key.
        let (filter, on_insert) = if available {
            (
                doc! { "_id": date_key(date) },
                doc! { "reserved_by": null, "created_at": now },
            )
        } else {
            (
                doc! { "_id": date_key(date), "reserved_by": null },
                doc! { "created_at": now },
            )
        };

        let update = doc! {
            "$set": { "available": available },
            "$setOnInsert": on_insert,
        };

        match self.base.update_one(filter, update, true).await {
            Ok(outcome) if outcome.upserted => Ok(SlotWrite::Created),
            Ok(_) => Ok(SlotWrite::Updated),
            Err(DaoError::DuplicateKey(_)) => Ok(SlotWrite::Reserved),
            Err(e) => Err(e),
        }
    }

    async fn bind(&self, date: NaiveDate, user_id: &str) -> DaoResult<bool> {
        let outcome = self
            .base
            .update_one(
                doc! { "_id": date_key(date), "available": true, "reserved_by": null },
                doc! { "$set": { "reserved_by": user_id } },
                false,
            )
            .await?;
        Ok(outcome.matched)
    }

    async fn release(&self, date: NaiveDate, holder: &str) -> DaoResult<bool> {
        let outcome = self
            .base
            .update_one(
                doc! { "_id": date_key(date), "reserved_by": holder },
                doc! { "$set": { "reserved_by": null } },
                false,
            )
            .await?;
        Ok(outcome.matched)
    }
}
