//! Storage seams for the reservation core.
//!
//! Each trait maps to one document collection and only offers operations
//! that touch a single document at a time. Anything that must not race
//! (binding a slot, redeeming a code, moving a reservation between
//! states) is a conditional write: it only applies while the stated
//! precondition still holds and reports whether it did.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use bson::{oid::ObjectId, DateTime};
use chrono::NaiveDate;
use hideaway_db::models::{
    Invitation, Notification, Reservation, ReservationSlot, ReservationStatus, User, UserStatus,
};
use mongodb::Database;

use crate::dao::{
    base::DaoResult, invitation::InvitationDao, notification::NotificationDao,
    reservation::ReservationDao, slot::SlotDao, user::UserDao,
};

/// Inclusive date bounds; a missing end is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn day(date: NaiveDate) -> Self {
        Self::new(Some(date), Some(date))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    pub user_id: Option<String>,
    pub status: Option<ReservationStatus>,
    pub range: DateRange,
}

impl ReservationFilter {
    pub fn matches(&self, reservation: &Reservation) -> bool {
        self.user_id.as_deref().is_none_or(|u| u == reservation.user_id)
            && self.status.is_none_or(|s| s == reservation.status)
            && self.range.contains(reservation.date)
    }
}

/// Field changes applied to a confirmed reservation.
#[derive(Debug, Clone, Default)]
pub struct ReservationPatch {
    pub date: Option<NaiveDate>,
    pub number_of_guests: Option<u32>,
    pub notes: Option<String>,
}

impl ReservationPatch {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.number_of_guests.is_none() && self.notes.is_none()
    }
}

/// Result of writing a slot's `available` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotWrite {
    Created,
    Updated,
    /// The slot is bound to a reservation and cannot be closed.
    Reserved,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find(&self, uid: &str) -> DaoResult<Option<User>>;
    /// Fails with `DuplicateKey` when the subject is already registered.
    async fn insert(&self, user: &User) -> DaoResult<()>;
    /// Only applies to non-owner users; returns `None` otherwise.
    async fn update_status(
        &self,
        uid: &str,
        status: UserStatus,
        approved_at: Option<DateTime>,
    ) -> DaoResult<Option<User>>;
    /// Newest invitee first.
    async fn list(&self, status: Option<UserStatus>) -> DaoResult<Vec<User>>;
}

#[async_trait]
pub trait InvitationStore: Send + Sync {
    async fn find_by_code(&self, code: &str) -> DaoResult<Option<Invitation>>;
    /// Fails with `DuplicateKey` when the code is taken.
    async fn insert(&self, invitation: &Invitation) -> DaoResult<Invitation>;
    /// Sets `used_by`/`used_at` only while the code is still unused.
    async fn mark_used(
        &self,
        code: &str,
        used_by: &str,
        used_at: DateTime,
    ) -> DaoResult<Option<Invitation>>;
    /// Newest first.
    async fn list_by_creator(&self, uid: &str) -> DaoResult<Vec<Invitation>>;
}

#[async_trait]
pub trait SlotStore: Send + Sync {
    async fn find(&self, date: NaiveDate) -> DaoResult<Option<ReservationSlot>>;
    /// Ascending by date.
    async fn list_range(&self, range: DateRange) -> DaoResult<Vec<ReservationSlot>>;
    async fn list_reserved(&self) -> DaoResult<Vec<ReservationSlot>>;
    /// Creates the slot if missing. Closing a reserved slot is refused.
    async fn set_available(&self, date: NaiveDate, available: bool) -> DaoResult<SlotWrite>;
    /// Binds an existing, open, unreserved slot to `user_id`.
    async fn bind(&self, date: NaiveDate, user_id: &str) -> DaoResult<bool>;
    /// Clears the binding if it is still held by `holder`.
    async fn release(&self, date: NaiveDate, holder: &str) -> DaoResult<bool>;
}

#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn insert(&self, reservation: &Reservation) -> DaoResult<Reservation>;
    async fn find(&self, id: ObjectId) -> DaoResult<Option<Reservation>>;
    /// Applies `patch` only while the reservation is confirmed and still
    /// on `expected_date`.
    async fn update_confirmed(
        &self,
        id: ObjectId,
        expected_date: NaiveDate,
        patch: &ReservationPatch,
    ) -> DaoResult<Option<Reservation>>;
    /// Confirmed → cancelled. `None` if it was not confirmed.
    async fn cancel(&self, id: ObjectId, at: DateTime) -> DaoResult<Option<Reservation>>;
    /// Latest date first.
    async fn list(&self, filter: &ReservationFilter) -> DaoResult<Vec<Reservation>>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert(&self, notification: &Notification) -> DaoResult<Notification>;
    /// Most recent first.
    async fn list(&self, user_id: Option<&str>) -> DaoResult<Vec<Notification>>;
}

/// Handles to every collection, shared by the services.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub invitations: Arc<dyn InvitationStore>,
    pub slots: Arc<dyn SlotStore>,
    pub reservations: Arc<dyn ReservationStore>,
    pub notifications: Arc<dyn NotificationStore>,
}

impl Stores {
    pub fn mongo(db: &Database) -> Self {
        Self {
            users: Arc::new(UserDao::new(db)),
            invitations: Arc::new(InvitationDao::new(db)),
            slots: Arc::new(SlotDao::new(db)),
            reservations: Arc::new(ReservationDao::new(db)),
            notifications: Arc::new(NotificationDao::new(db)),
        }
    }

    pub fn memory() -> Self {
        let store = Arc::new(memory::MemoryStore::default());
        Self {
            users: store.clone(),
            invitations: store.clone(),
            slots: store.clone(),
            reservations: store.clone(),
            notifications: store,
        }
    }
}
