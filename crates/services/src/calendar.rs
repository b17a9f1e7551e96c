use std::collections::HashSet;
use std::sync::Arc;

use bson::DateTime;
use chrono::{Duration, NaiveDate};
use hideaway_db::models::{ReservationSlot, ReservationStatus};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::directory::UserDirectory;
use crate::error::{ServiceError, ServiceResult};
use crate::store::{DateRange, ReservationFilter, ReservationStore, SlotStore, SlotWrite};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlotOutcome {
    Created,
    Updated,
    /// The date is reserved and was left unchanged.
    Conflict,
}

#[derive(Debug, Clone, Serialize)]
pub struct DateOutcome {
    pub date: NaiveDate,
    pub outcome: SlotOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityReport {
    /// Dates created or updated.
    pub applied: usize,
    pub results: Vec<DateOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub checked: usize,
    pub released: Vec<NaiveDate>,
    /// Unmatched bindings left alone because they are too recent.
    pub deferred: Vec<NaiveDate>,
}

/// Which dates can be booked.
pub struct SlotCalendar {
    slots: Arc<dyn SlotStore>,
    reservations: Arc<dyn ReservationStore>,
    directory: Arc<UserDirectory>,
    reconcile_grace: Duration,
}

impl SlotCalendar {
    pub fn new(
        slots: Arc<dyn SlotStore>,
        reservations: Arc<dyn ReservationStore>,
        directory: Arc<UserDirectory>,
        reconcile_grace: Duration,
    ) -> Self {
        Self {
            slots,
            reservations,
            directory,
            reconcile_grace,
        }
    }

    /// Materialized slots in `range`, earliest first. Open to any
    /// registered user who is not blocked.
    pub async fn list_range(
        &self,
        actor: &str,
        range: DateRange,
    ) -> ServiceResult<Vec<ReservationSlot>> {
        let user = self.directory.resolve(actor).await?;
        if user.is_blocked() {
            return Err(ServiceError::forbidden("Account is blocked"));
        }
        Ok(self.slots.list_range(range).await?)
    }

    /// Opens or closes each date independently. Reserved dates cannot be
    /// closed and are reported as conflicts.
    pub async fn set_availability(
        &self,
        actor: &str,
        dates: &[NaiveDate],
        available: bool,
    ) -> ServiceResult<AvailabilityReport> {
        self.directory.require_owner(actor).await?;
        if dates.is_empty() {
            return Err(ServiceError::invalid_input("At least one date is required"));
        }

        let mut seen = HashSet::new();
        let mut results = Vec::with_capacity(dates.len());
        for date in dates.iter().copied().filter(|d| seen.insert(*d)) {
            let outcome = match self.slots.set_available(date, available).await? {
                SlotWrite::Created => SlotOutcome::Created,
                SlotWrite::Updated => SlotOutcome::Updated,
                SlotWrite::Reserved => SlotOutcome::Conflict,
            };
            debug!(%date, available, ?outcome, "Slot availability written");
            results.push(DateOutcome { date, outcome });
        }

        let applied = results
            .iter()
            .filter(|r| r.outcome != SlotOutcome::Conflict)
            .count();
        info!(actor, applied, requested = results.len(), available, "Slot availability set");

        Ok(AvailabilityReport { applied, results })
    }

    /// Single-date form of [`set_availability`](Self::set_availability)
    /// where a reserved date is an error.
    pub async fn set_one(
        &self,
        actor: &str,
        date: NaiveDate,
        available: bool,
    ) -> ServiceResult<ReservationSlot> {
        self.directory.require_owner(actor).await?;
        if self.slots.set_available(date, available).await? == SlotWrite::Reserved {
            return Err(ServiceError::Conflict(format!(
                "{date} is reserved and cannot be closed"
            )));
        }
        info!(actor, %date, available, "Slot availability set");
        self.slots
            .find(date)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Slot".to_string()))
    }

    /// Claims an open, unreserved slot for `uid`. `false` when the date
    /// has no slot, is closed, or is already bound.
    pub(crate) async fn bind(&self, date: NaiveDate, uid: &str) -> ServiceResult<bool> {
        let bound = self.slots.bind(date, uid).await?;
        debug!(%date, uid, bound, "Slot bind");
        Ok(bound)
    }

    /// Frees the slot if `holder` still holds it.
    pub(crate) async fn release(&self, date: NaiveDate, holder: &str) -> ServiceResult<bool> {
        let released = self.slots.release(date, holder).await?;
        debug!(%date, holder, released, "Slot release");
        Ok(released)
    }

    /// Frees bound slots whose holder has no confirmed reservation on
    /// that date. A binding touched within the grace window may belong to
    /// a create or date change that has not written its reservation yet,
    /// so it is deferred rather than released.
    pub async fn reconcile(&self, actor: &str) -> ServiceResult<ReconcileReport> {
        self.directory.require_owner(actor).await?;

        let cutoff = DateTime::now()
            .timestamp_millis()
            .saturating_sub(self.reconcile_grace.num_milliseconds());
        let bound = self.slots.list_reserved().await?;
        let mut report = ReconcileReport {
            checked: bound.len(),
            released: Vec::new(),
            deferred: Vec::new(),
        };

        for slot in &bound {
            let Some(holder) = slot.reserved_by.as_deref() else {
                continue;
            };
            if self.holds_confirmed(slot.date, holder).await? {
                continue;
            }
            if slot.updated_at.timestamp_millis() > cutoff {
                debug!(date = %slot.date, holder, "Unmatched binding within grace window");
                report.deferred.push(slot.date);
                continue;
            }
            if !self.release(slot.date, holder).await? {
                continue;
            }

            // The reservation may have landed between the check and the release.
            if self.holds_confirmed(slot.date, holder).await? {
                if !self.bind(slot.date, holder).await? {
                    error!(date = %slot.date, holder, "Could not restore binding for confirmed reservation");
                }
                continue;
            }
            warn!(date = %slot.date, holder, "Released orphaned slot binding");
            report.released.push(slot.date);
        }

        info!(
            actor,
            checked = report.checked,
            released = report.released.len(),
            deferred = report.deferred.len(),
            "Slots reconciled"
        );
        Ok(report)
    }

    async fn holds_confirmed(&self, date: NaiveDate, holder: &str) -> ServiceResult<bool> {
        let filter = ReservationFilter {
            user_id: Some(holder.to_string()),
            status: Some(ReservationStatus::Confirmed),
            range: DateRange::day(date),
        };
        Ok(!self.reservations.list(&filter).await?.is_empty())
    }
}
