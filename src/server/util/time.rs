use chrono::{DateTime, Duration, Utc};

pub(crate) mod helper {
    #[cfg(not(test))]
    pub use super::get_utc_now;
    #[cfg(test)]
    pub use super::mock_chrono::{get_utc_now, set_mock_now};
}

/// Invoices fall due one day after creation.
pub(crate) fn payment_due_date(created_at: DateTime<Utc>) -> DateTime<Utc> {
    created_at + Duration::hours(24)
}

/// A menu window is accepted only when it starts in the future and ends after it starts.
pub(crate) fn in_time_span(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    start > now && end > start
}


#[cfg(not(test))]
pub fn get_utc_now() -> DateTime<Utc> {
    Utc::now()
}
