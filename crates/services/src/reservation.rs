//! Reservation lifecycle.
//!
//! A confirmed reservation on a date and the slot for that date being
//! bound to the reservation's user go together. The store has no
//! multi-document transactions, so every transition is ordered so that an
//! interruption can only leave a bound slot without a confirmed
//! reservation, never the reverse:
//!
//! - create binds the slot before inserting the reservation;
//! - a date change binds the new slot, moves the reservation, then frees
//!   the old slot;
//! - cancel marks the reservation cancelled before freeing the slot.
//!
//! Once the reservation write has committed, a failure to free a slot is
//! logged and the operation still succeeds. Leftover bindings are cleared
//! by [`SlotCalendar::reconcile`].

use std::sync::Arc;

use bson::{DateTime, oid::ObjectId};
use chrono::NaiveDate;
use hideaway_db::models::{DeliveryStatus, NotificationType, Reservation, ReservationStatus};
use serde::Serialize;
use tracing::{info, warn};

use crate::calendar::SlotCalendar;
use crate::dao::DaoError;
use crate::directory::UserDirectory;
use crate::error::{ServiceError, ServiceResult};
use crate::notification::NotificationDispatcher;
use crate::store::{DateRange, ReservationFilter, ReservationPatch, ReservationStore};
use crate::venue::VenueClock;

/// Requested changes to a reservation, as received from the caller.
#[derive(Debug, Clone, Default)]
pub struct ReservationChanges {
    pub date: Option<NaiveDate>,
    pub number_of_guests: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReminderReport {
    pub date: NaiveDate,
    pub sent: usize,
    pub failed: usize,
}

pub struct ReservationEngine {
    reservations: Arc<dyn ReservationStore>,
    calendar: Arc<SlotCalendar>,
    directory: Arc<UserDirectory>,
    notifier: Arc<NotificationDispatcher>,
    clock: VenueClock,
}

fn guests(n: i64) -> ServiceResult<u32> {
    u32::try_from(n)
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| ServiceError::invalid_input("Number of guests must be at least 1"))
}

fn parse_id(id: &str) -> ServiceResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| ServiceError::NotFound("Reservation".to_string()))
}

fn unavailable(date: NaiveDate) -> ServiceError {
    ServiceError::Unavailable(format!("{date} is not available"))
}

impl ReservationEngine {
    pub fn new(
        reservations: Arc<dyn ReservationStore>,
        calendar: Arc<SlotCalendar>,
        directory: Arc<UserDirectory>,
        notifier: Arc<NotificationDispatcher>,
        clock: VenueClock,
    ) -> Self {
        Self {
            reservations,
            calendar,
            directory,
            notifier,
            clock,
        }
    }

    fn ensure_not_past(&self, date: NaiveDate) -> ServiceResult<()> {
        if self.clock.is_past(date) {
            return Err(ServiceError::invalid_input(format!(
                "{date} is in the past"
            )));
        }
        Ok(())
    }

    async fn load(&self, id: &str) -> ServiceResult<Reservation> {
        self.reservations
            .find(parse_id(id)?)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Reservation".to_string()))
    }

    pub async fn create(
        &self,
        subject: &str,
        date: NaiveDate,
        number_of_guests: i64,
        notes: String,
    ) -> ServiceResult<Reservation> {
        let user = match self.directory.resolve(subject).await {
            Ok(user) if user.is_approved() => user,
            Ok(_) | Err(ServiceError::NotFound(_)) => {
                return Err(ServiceError::forbidden(
                    "Only approved users can make reservations",
                ));
            }
            Err(e) => return Err(e),
        };
        let number_of_guests = guests(number_of_guests)?;
        self.ensure_not_past(date)?;

        if !self.calendar.bind(date, subject).await? {
            return Err(unavailable(date));
        }

        let now = DateTime::now();
        let reservation = Reservation {
            id: None,
            user_id: subject.to_string(),
            user_name: user.display_name,
            date,
            number_of_guests,
            notes,
            status: ReservationStatus::Confirmed,
            created_at: now,
            updated_at: now,
            cancelled_at: None,
        };

        let stored = match self.reservations.insert(&reservation).await {
            Ok(stored) => stored,
            Err(e) => {
                self.calendar.release(date, subject).await?;
                return Err(match e {
                    DaoError::DuplicateKey(_) => unavailable(date),
                    other => other.into(),
                });
            }
        };

        info!(
            id = ?stored.id,
            uid = subject,
            %date,
            guests = number_of_guests,
            "Reservation created"
        );
        self.notifier
            .reservation_event(NotificationType::ReservationConfirmed, &stored)
            .await;
        Ok(stored)
    }

    /// Only the reservation's own user may edit it.
    pub async fn update(
        &self,
        subject: &str,
        id: &str,
        changes: ReservationChanges,
    ) -> ServiceResult<Reservation> {
        let current = self.load(id).await?;
        if current.user_id != subject {
            return Err(ServiceError::forbidden("Not your reservation"));
        }
        if !current.is_confirmed() {
            return Err(ServiceError::invalid_operation(
                "A cancelled reservation cannot be changed",
            ));
        }

        let patch = ReservationPatch {
            date: changes.date.filter(|d| *d != current.date),
            number_of_guests: changes.number_of_guests.map(guests).transpose()?,
            notes: changes.notes,
        };
        if patch.is_empty() {
            return Ok(current);
        }

        let Some(reservation_id) = current.id else {
            return Err(ServiceError::NotFound("Reservation".to_string()));
        };
        let old_date = current.date;

        let updated = match patch.date {
            None => self
                .reservations
                .update_confirmed(reservation_id, old_date, &patch)
                .await?
                .ok_or_else(|| {
                    ServiceError::Conflict("Reservation was changed concurrently".to_string())
                })?,
            Some(new_date) => {
                self.ensure_not_past(new_date)?;
                if !self.calendar.bind(new_date, subject).await? {
                    return Err(unavailable(new_date));
                }

                let moved = match self
                    .reservations
                    .update_confirmed(reservation_id, old_date, &patch)
                    .await
                {
                    Ok(Some(moved)) => moved,
                    Ok(None) => {
                        self.calendar.release(new_date, subject).await?;
                        return Err(ServiceError::Conflict(
                            "Reservation was changed concurrently".to_string(),
                        ));
                    }
                    Err(e) => {
                        self.calendar.release(new_date, subject).await?;
                        return Err(match e {
                            DaoError::DuplicateKey(_) => unavailable(new_date),
                            other => other.into(),
                        });
                    }
                };

                match self.calendar.release(old_date, subject).await {
                    Ok(true) => {}
                    Ok(false) => {
                        warn!(%old_date, uid = subject, "Previous slot was not bound to this user");
                    }
                    Err(e) => {
                        warn!(%old_date, uid = subject, error = %e, "Failed to free previous slot, left for reconcile");
                    }
                }
                moved
            }
        };

        info!(
            id,
            uid = subject,
            date = %updated.date,
            guests = updated.number_of_guests,
            "Reservation updated"
        );
        self.notifier
            .reservation_event(NotificationType::ReservationUpdated, &updated)
            .await;
        Ok(updated)
    }

    /// The reservation's user or the venue owner may cancel.
    pub async fn cancel(&self, subject: &str, id: &str) -> ServiceResult<Reservation> {
        let current = self.load(id).await?;
        if current.user_id != subject && !self.directory.is_owner(subject).await? {
            return Err(ServiceError::forbidden("Not your reservation"));
        }
        if !current.is_confirmed() {
            return Err(ServiceError::invalid_operation(
                "Reservation is already cancelled",
            ));
        }
        let Some(reservation_id) = current.id else {
            return Err(ServiceError::NotFound("Reservation".to_string()));
        };

        let cancelled = self
            .reservations
            .cancel(reservation_id, DateTime::now())
            .await?
            .ok_or_else(|| ServiceError::invalid_operation("Reservation is already cancelled"))?;

        match self
            .calendar
            .release(cancelled.date, &cancelled.user_id)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                warn!(date = %cancelled.date, uid = %cancelled.user_id, "Cancelled reservation held no slot");
            }
            Err(e) => {
                warn!(date = %cancelled.date, uid = %cancelled.user_id, error = %e, "Failed to free slot, left for reconcile");
            }
        }

        info!(id, actor = subject, uid = %cancelled.user_id, date = %cancelled.date, "Reservation cancelled");
        self.notifier
            .reservation_event(NotificationType::ReservationCancelled, &cancelled)
            .await;
        Ok(cancelled)
    }

    pub async fn get(&self, subject: &str, id: &str) -> ServiceResult<Reservation> {
        let reservation = self.load(id).await?;
        if reservation.user_id != subject && !self.directory.is_owner(subject).await? {
            return Err(ServiceError::forbidden("Not your reservation"));
        }
        Ok(reservation)
    }

    pub async fn list_for_user(
        &self,
        subject: &str,
        status: Option<ReservationStatus>,
    ) -> ServiceResult<Vec<Reservation>> {
        let filter = ReservationFilter {
            user_id: Some(subject.to_string()),
            status,
            range: DateRange::default(),
        };
        Ok(self.reservations.list(&filter).await?)
    }

    pub async fn list_all(
        &self,
        actor: &str,
        status: Option<ReservationStatus>,
        range: DateRange,
    ) -> ServiceResult<Vec<Reservation>> {
        self.directory.require_owner(actor).await?;
        let filter = ReservationFilter {
            user_id: None,
            status,
            range,
        };
        Ok(self.reservations.list(&filter).await?)
    }

    /// Pushes a reminder for every confirmed reservation on `date`
    /// (tomorrow, venue time, when omitted).
    pub async fn send_reminders(
        &self,
        actor: &str,
        date: Option<NaiveDate>,
    ) -> ServiceResult<ReminderReport> {
        self.directory.require_owner(actor).await?;
        let date = date.unwrap_or_else(|| self.clock.tomorrow());

        let filter = ReservationFilter {
            user_id: None,
            status: Some(ReservationStatus::Confirmed),
            range: DateRange::day(date),
        };
        let mut report = ReminderReport {
            date,
            sent: 0,
            failed: 0,
        };
        for reservation in self.reservations.list(&filter).await? {
            match self
                .notifier
                .reservation_event(NotificationType::ReservationReminder, &reservation)
                .await
            {
                DeliveryStatus::Sent => report.sent += 1,
                DeliveryStatus::Failed => report.failed += 1,
            }
        }

        info!(actor, %date, sent = report.sent, failed = report.failed, "Reminders sent");
        Ok(report)
    }
}
