//! Error types shared by the seed steps.

use chrono::NaiveDateTime;

use crate::model::AirportCode;

/// An airport referenced by some row is missing from the coordinate table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("airport {0} has no entry in the coordinate table")]
    UnknownAirport(AirportCode),
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("failure reading csv: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("airport {0} has no time zone in the coordinate table")]
    MissingTimeZone(AirportCode),

    #[error("unknown time zone {zone:?} for airport {airport}")]
    UnknownTimeZone { airport: AirportCode, zone: String },

    #[error("local time {time} does not exist in {zone}")]
    NonexistentLocalTime { time: NaiveDateTime, zone: String },

    #[error("invalid clock time {0}, expected HHMM")]
    InvalidClockTime(u32),

    #[error("invalid date {0:?}")]
    InvalidDate(String),

    #[error("no {0} left after filtering")]
    EmptyInput(&'static str),

    #[error("configuration error: {0}")]
    Configuration(String),
}
