use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Day-count basis for converting calendar dates into a year fraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayCount {
    #[default]
    Act365Fixed,
    Act360,
    Act365_25,
}

impl DayCount {
    fn days_per_year(&self) -> f64 {
        match self {
            DayCount::Act365Fixed => 365.0,
            DayCount::Act360 => 360.0,
            DayCount::Act365_25 => 365.25,
        }
    }
}

/// Signed year fraction from `start` to `end` (negative when `end < start`).
pub fn year_fraction(start: NaiveDate, end: NaiveDate, basis: DayCount) -> f64 {
    let days = (end - start).num_days();
    days as f64 / basis.days_per_year()
}
