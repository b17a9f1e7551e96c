use chrono::{Days, FixedOffset, NaiveDate, Offset, Utc};

/// Calendar dates as seen from the venue's local time zone.
#[derive(Debug, Clone, Copy)]
pub struct VenueClock {
    offset: FixedOffset,
}

impl VenueClock {
    /// Falls back to UTC when the offset is out of range.
    pub fn new(utc_offset_minutes: i32) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix());
        Self { offset }
    }

    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }

    pub fn tomorrow(&self) -> NaiveDate {
        let today = self.today();
        today.checked_add_days(Days::new(1)).unwrap_or(today)
    }

    pub fn is_past(&self, date: NaiveDate) -> bool {
        date < self.today()
    }
}
