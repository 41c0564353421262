//! Clock port. Every "now"-dependent rule reads time through this.

use chrono::{DateTime, NaiveDate, Utc};

/// Source of the current instant.
///
/// Implemented by `SystemClock` for production wiring and `FixedClock` for
/// deterministic builds and audits.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar day of `now()` in UTC.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}
