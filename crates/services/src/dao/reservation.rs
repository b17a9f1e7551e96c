use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime, Document};
use hideaway_db::models::{Reservation, ReservationStatus};
use mongodb::Database;

use super::{
    base::{BaseDao, DaoError, DaoResult},
    slot::{date_key, range_filter},
};
use crate::store::{ReservationFilter, ReservationPatch, ReservationStore};

pub struct ReservationDao {
    pub base: BaseDao<Reservation>,
}

impl ReservationDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Reservation::COLLECTION),
        }
    }
}

#[async_trait]
impl ReservationStore for ReservationDao {
    async fn insert(&self, reservation: &Reservation) -> DaoResult<Reservation> {
        let id = self.base.insert_one(reservation).await?;
        let mut stored = reservation.clone();
        stored.id = Some(id.as_object_id().ok_or(DaoError::NotFound)?);
        Ok(stored)
    }

    async fn find(&self, id: ObjectId) -> DaoResult<Option<Reservation>> {
        self.base.find_by_id(id).await
    }

    async fn update_confirmed(
        &self,
        id: ObjectId,
        expected_date: chrono::NaiveDate,
        patch: &ReservationPatch,
    ) -> DaoResult<Option<Reservation>> {
        let mut set = Document::new();
        if let Some(date) = patch.date {
            set.insert("date", date_key(date));
        }
        if let Some(guests) = patch.number_of_guests {
            set.insert("number_of_guests", guests as i64);
        }
        if let Some(notes) = &patch.notes {
            set.insert("notes", notes.as_str());
        }

        self.base
            .find_one_and_update(
                doc! {
                    "_id": id,
                    "status": ReservationStatus::Confirmed.as_str(),
                    "date": date_key(expected_date),
                },
                doc! { "$set": set },
            )
            .await
    }

    async fn cancel(&self, id: ObjectId, at: DateTime) -> DaoResult<Option<Reservation>> {
        self.base
            .find_one_and_update(
                doc! { "_id": id, "status": ReservationStatus::Confirmed.as_str() },
                doc! {
                    "$set": {
                        "status": ReservationStatus::Cancelled.as_str(),
                        "cancelled_at": at,
                    }
                },
            )
            .await
    }

    async fn list(&self, filter: &ReservationFilter) -> DaoResult<Vec<Reservation>> {
        let mut query = range_filter("date", filter.range);
        if let Some(user_id) = &filter.user_id {
            query.insert("user_id", user_id.as_str());
        }
        if let Some(status) = filter.status {
            query.insert("status", status.as_str());
        }

        self.base
            .find_many(query, Some(doc! { "date": -1, "created_at": -1 }))
            .await
    }
}
