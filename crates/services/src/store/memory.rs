//! Process-local store used for development and the test suite.
//!
//! Conditional writes take the `DashMap` entry lock for the document they
//! touch, which gives the same single-document compare-and-set semantics
//! as the filtered updates in the MongoDB DAOs.

use async_trait::async_trait;
use bson::{oid::ObjectId, DateTime};
use chrono::NaiveDate;
use dashmap::{DashMap, mapref::entry::Entry};
use hideaway_db::models::{
    Invitation, Notification, Reservation, ReservationSlot, ReservationStatus, Role, User,
    UserStatus,
};

use super::{
    DateRange, InvitationStore, NotificationStore, ReservationFilter, ReservationPatch,
    ReservationStore, SlotStore, SlotWrite, UserStore,
};
use crate::dao::base::{DaoError, DaoResult};

#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<String, User>,
    invitations: DashMap<String, Invitation>,
    slots: DashMap<NaiveDate, ReservationSlot>,
    reservations: DashMap<ObjectId, Reservation>,
    /// Date → id of the confirmed reservation on it. Mirrors the partial
    /// unique index on `reservations.date`.
    confirmed_dates: DashMap<NaiveDate, ObjectId>,
    notifications: DashMap<ObjectId, Notification>,
}

fn duplicate(what: impl std::fmt::Display) -> DaoError {
    DaoError::DuplicateKey(what.to_string())
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find(&self, uid: &str) -> DaoResult<Option<User>> {
        Ok(self.users.get(uid).map(|u| u.clone()))
    }

    async fn insert(&self, user: &User) -> DaoResult<()> {
        match self.users.entry(user.id.clone()) {
            Entry::Occupied(_) => Err(duplicate(format!("users._id {}", user.id))),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(())
            }
        }
    }

    async fn update_status(
        &self,
        uid: &str,
        status: UserStatus,
        approved_at: Option<DateTime>,
    ) -> DaoResult<Option<User>> {
        let Some(mut user) = self.users.get_mut(uid) else {
            return Ok(None);
        };
        if user.role != Role::User {
            return Ok(None);
        }
        user.status = status;
        if approved_at.is_some() {
            user.approved_at = approved_at;
        }
        user.updated_at = DateTime::now();
        Ok(Some(user.clone()))
    }

    async fn list(&self, status: Option<UserStatus>) -> DaoResult<Vec<User>> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .filter(|u| status.is_none_or(|s| s == u.status))
            .map(|u| u.clone())
            .collect();
        users.sort_by(|a, b| b.invited_at.cmp(&a.invited_at));
        Ok(users)
    }
}

#[async_trait]
impl InvitationStore for MemoryStore {
    async fn find_by_code(&self, code: &str) -> DaoResult<Option<Invitation>> {
        Ok(self.invitations.get(code).map(|i| i.clone()))
    }

    async fn insert(&self, invitation: &Invitation) -> DaoResult<Invitation> {
        match self.invitations.entry(invitation.code.clone()) {
            Entry::Occupied(_) => Err(duplicate(format!("invitations.code {}", invitation.code))),
            Entry::Vacant(slot) => {
                let mut stored = invitation.clone();
                stored.id = Some(ObjectId::new());
                slot.insert(stored.clone());
                Ok(stored)
            }
        }
    }

    async fn mark_used(
        &self,
        code: &str,
        used_by: &str,
        used_at: DateTime,
    ) -> DaoResult<Option<Invitation>> {
        let Some(mut invitation) = self.invitations.get_mut(code) else {
            return Ok(None);
        };
        if invitation.used_by.is_some() {
            return Ok(None);
        }
        invitation.used_by = Some(used_by.to_string());
        invitation.used_at = Some(used_at);
        Ok(Some(invitation.clone()))
    }

    async fn list_by_creator(&self, uid: &str) -> DaoResult<Vec<Invitation>> {
        let mut invitations: Vec<Invitation> = self
            .invitations
            .iter()
            .filter(|i| i.created_by == uid)
            .map(|i| i.clone())
            .collect();
        invitations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invitations)
    }
}

#[async_trait]
impl SlotStore for MemoryStore {
    async fn find(&self, date: NaiveDate) -> DaoResult<Option<ReservationSlot>> {
        Ok(self.slots.get(&date).map(|s| s.clone()))
    }

    async fn list_range(&self, range: DateRange) -> DaoResult<Vec<ReservationSlot>> {
        let mut slots: Vec<ReservationSlot> = self
            .slots
            .iter()
            .filter(|s| range.contains(s.date))
            .map(|s| s.clone())
            .collect();
        slots.sort_by_key(|s| s.date);
        Ok(slots)
    }

    async fn list_reserved(&self) -> DaoResult<Vec<ReservationSlot>> {
        let mut slots: Vec<ReservationSlot> = self
            .slots
            .iter()
            .filter(|s| s.reserved_by.is_some())
            .map(|s| s.clone())
            .collect();
        slots.sort_by_key(|s| s.date);
        Ok(slots)
    }

    async fn set_available(&self, date: NaiveDate, available: bool) -> DaoResult<SlotWrite> {
        match self.slots.entry(date) {
            Entry::Vacant(slot) => {
                slot.insert(ReservationSlot::new(date, available));
                Ok(SlotWrite::Created)
            }
            Entry::Occupied(mut slot) => {
                let slot = slot.get_mut();
                if !available && slot.reserved_by.is_some() {
                    return Ok(SlotWrite::Reserved);
                }
                slot.available = available;
                slot.updated_at = DateTime::now();
                Ok(SlotWrite::Updated)
            }
        }
    }

    async fn bind(&self, date: NaiveDate, user_id: &str) -> DaoResult<bool> {
        let Some(mut slot) = self.slots.get_mut(&date) else {
            return Ok(false);
        };
        if !slot.is_bookable() {
            return Ok(false);
        }
        slot.reserved_by = Some(user_id.to_string());
        slot.updated_at = DateTime::now();
        Ok(true)
    }

    async fn release(&self, date: NaiveDate, holder: &str) -> DaoResult<bool> {
        let Some(mut slot) = self.slots.get_mut(&date) else {
            return Ok(false);
        };
        if slot.reserved_by.as_deref() != Some(holder) {
            return Ok(false);
        }
        slot.reserved_by = None;
        slot.updated_at = DateTime::now();
        Ok(true)
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn insert(&self, reservation: &Reservation) -> DaoResult<Reservation> {
        let id = ObjectId::new();
        if reservation.is_confirmed() {
            match self.confirmed_dates.entry(reservation.date) {
                Entry::Occupied(_) => {
                    return Err(duplicate(format!("reservations.date {}", reservation.date)));
                }
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
        }

        let mut stored = reservation.clone();
        stored.id = Some(id);
        self.reservations.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find(&self, id: ObjectId) -> DaoResult<Option<Reservation>> {
        Ok(self.reservations.get(&id).map(|r| r.clone()))
    }

    async fn update_confirmed(
        &self,
        id: ObjectId,
        expected_date: NaiveDate,
        patch: &ReservationPatch,
    ) -> DaoResult<Option<Reservation>> {
        let Some(mut reservation) = self.reservations.get_mut(&id) else {
            return Ok(None);
        };
        if !reservation.is_confirmed() || reservation.date != expected_date {
            return Ok(None);
        }

        if let Some(date) = patch.date.filter(|d| *d != expected_date) {
            match self.confirmed_dates.entry(date) {
                Entry::Occupied(_) => {
                    return Err(duplicate(format!("reservations.date {date}")));
                }
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
            self.confirmed_dates.remove_if(&expected_date, |_, held| *held == id);
            reservation.date = date;
        }
        if let Some(guests) = patch.number_of_guests {
            reservation.number_of_guests = guests;
        }
        if let Some(notes) = &patch.notes {
            reservation.notes = notes.clone();
        }
        reservation.updated_at = DateTime::now();
        Ok(Some(reservation.clone()))
    }

    async fn cancel(&self, id: ObjectId, at: DateTime) -> DaoResult<Option<Reservation>> {
        let Some(mut reservation) = self.reservations.get_mut(&id) else {
            return Ok(None);
        };
        if !reservation.is_confirmed() {
            return Ok(None);
        }
        reservation.status = ReservationStatus::Cancelled;
        reservation.cancelled_at = Some(at);
        reservation.updated_at = at;
        self.confirmed_dates
            .remove_if(&reservation.date, |_, held| *held == id);
        Ok(Some(reservation.clone()))
    }

    async fn list(&self, filter: &ReservationFilter) -> DaoResult<Vec<Reservation>> {
        let mut reservations: Vec<Reservation> = self
            .reservations
            .iter()
            .filter(|r| filter.matches(r))
            .map(|r| r.clone())
            .collect();
        reservations.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(reservations)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert(&self, notification: &Notification) -> DaoResult<Notification> {
        let id = ObjectId::new();
        let mut stored = notification.clone();
        stored.id = Some(id);
        self.notifications.insert(id, stored.clone());
        Ok(stored)
    }

    async fn list(&self, user_id: Option<&str>) -> DaoResult<Vec<Notification>> {
        let mut notifications: Vec<Notification> = self
            .notifications
            .iter()
            .filter(|n| user_id.is_none_or(|uid| n.user_id == uid))
            .map(|n| n.clone())
            .collect();
        notifications.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        Ok(notifications)
    }
}
