use std::fmt::Display;

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone};
use serde::Serialize;

/// Returns the Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(date.weekday().num_days_from_monday() as u64)
}

/// Date and time as shown next to the timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClockReading {
    pub date: String,
    pub time: String,
}

pub fn clock_reading<Tz: TimeZone>(now: &DateTime<Tz>) -> ClockReading
where
    Tz::Offset: Display,
{
    ClockReading {
        date: now.format("%d/%m/%Y").to_string(),
        time: now.format("%H:%M:%S").to_string(),
    }
}
