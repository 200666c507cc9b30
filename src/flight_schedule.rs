//! Loads BTS on-time rows and localizes their scheduled times to UTC.

use std::{io, path::Path};

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use indicatif::ProgressIterator;

use crate::{
    config::DepartureDelayPolicy,
    coordinates::CoordinateTable,
    error::SeedError,
    model::{AirportCode, FlightRecord},
    progress,
};

const CARRIER_COLUMN: &str = "OP_UNIQUE_CARRIER";

#[derive(Debug, Clone, serde::Deserialize)]
struct OnTimeRow {
    #[serde(rename = "FL_DATE")]
    fl_date: String,
    #[serde(rename = "OP_UNIQUE_CARRIER")]
    carrier: String,
    #[serde(rename = "OP_CARRIER_FL_NUM")]
    flight_number: String,
    #[serde(rename = "TAIL_NUM", default)]
    tail_number: Option<String>,
    #[serde(rename = "ORIGIN")]
    origin: String,
    #[serde(rename = "DEST")]
    dest: String,
    #[serde(rename = "CRS_DEP_TIME")]
    crs_dep_time: u32,
    #[serde(rename = "CRS_ARR_TIME")]
    crs_arr_time: u32,
    #[serde(rename = "DEP_DELAY", default)]
    dep_delay: Option<f64>,
    #[serde(rename = "ARR_DELAY", default)]
    arr_delay: Option<f64>,
}

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// BTS exports dates either bare or as US-style timestamps at midnight.
const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

pub fn parse_flight_date(text: &str) -> Result<NaiveDate, SeedError> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
                .ok()
                .map(|timestamp| timestamp.date())
        })
        .ok_or_else(|| SeedError::InvalidDate(text.to_string()))
}

/// Splits an `HHMM` clock value. `2400` is midnight of the next day.
pub fn clock_time(hhmm: u32) -> Result<(NaiveTime, u64), SeedError> {
    if hhmm == 2400 {
        return Ok((NaiveTime::MIN, 1));
    }
    NaiveTime::from_hms_opt(hhmm / 100, hhmm % 100, 0)
        .map(|time| (time, 0))
        .ok_or(SeedError::InvalidClockTime(hhmm))
}

/// Converts a local wall-clock time to UTC. Ambiguous times (the repeated
/// hour when clocks go back) resolve to the earlier instant.
pub fn local_to_utc(date: NaiveDate, hhmm: u32, zone: Tz) -> Result<DateTime<Utc>, SeedError> {
    let (time, carry_days) = clock_time(hhmm)?;
    let date = date
        .checked_add_days(Days::new(carry_days))
        .ok_or_else(|| SeedError::InvalidDate(date.to_string()))?;
    let local = date.and_time(time);
    zone.from_local_datetime(&local)
        .earliest()
        .map(|time| time.with_timezone(&Utc))
        .ok_or_else(|| SeedError::NonexistentLocalTime {
            time: local,
            zone: zone.name().to_string(),
        })
}

/// Arrivals scheduled at least four hours "before" departure on the clock are
/// overnight flights landing the next day.
pub fn arrival_date(date: NaiveDate, crs_dep_time: u32, crs_arr_time: u32) -> NaiveDate {
    if i64::from(crs_arr_time) > i64::from(crs_dep_time) - 400 {
        date
    } else {
        date.succ_opt().unwrap_or(date)
    }
}

pub fn floor_to_hour(time: DateTime<Utc>) -> DateTime<Utc> {
    time.with_minute(0)
        .and_then(|time| time.with_second(0))
        .and_then(|time| time.with_nanosecond(0))
        .unwrap_or(time)
}

fn minutes(delay: f64) -> TimeDelta {
    TimeDelta::seconds((delay * 60.0).round() as i64)
}

pub struct FlightScheduleLoader<'a> {
    coordinates: &'a CoordinateTable,
    carrier: String,
    delay_policy: DepartureDelayPolicy,
}

impl<'a> FlightScheduleLoader<'a> {
    pub fn new(
        coordinates: &'a CoordinateTable,
        carrier: &str,
        delay_policy: DepartureDelayPolicy,
    ) -> Self {
        FlightScheduleLoader {
            coordinates,
            carrier: carrier.to_string(),
            delay_policy,
        }
    }

    pub fn load(
        &self,
        path: &Path,
        first_day: NaiveDate,
        last_day: NaiveDate,
    ) -> Result<Vec<FlightRecord>, SeedError> {
        log::info!(
            "Loading {} flights from {:?} for {} to {}",
            self.carrier,
            path,
            first_day,
            last_day
        );
        self.from_reader(std::fs::File::open(path)?, first_day, last_day)
    }

    /// Flights of the configured carrier whose `FL_DATE` lies in
    /// `[first_day, last_day]`, numbered from 0 in file order.
    pub fn from_reader<R: io::Read>(
        &self,
        reader: R,
        first_day: NaiveDate,
        last_day: NaiveDate,
    ) -> Result<Vec<FlightRecord>, SeedError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let carrier_column = headers.iter().position(|name| name == CARRIER_COLUMN);
        // Other carriers' rows are skipped before typed parsing.
        let mut records = vec![];
        for record in csv_reader.records() {
            let record = record?;
            let carrier = carrier_column.and_then(|column| record.get(column));
            if carrier.is_none() || carrier == Some(self.carrier.as_str()) {
                records.push(record);
            }
        }
        let mut flights = vec![];
        let mut skipped = 0;
        for record in records
            .iter()
            .progress_with_style(progress::bar_style())
            .with_message("Localize flight times.")
            .with_finish(indicatif::ProgressFinish::AndLeave)
        {
            let row: OnTimeRow = record.deserialize(Some(&headers))?;
            if row.carrier != self.carrier {
                continue;
            }
            let date = parse_flight_date(&row.fl_date)?;
            if date < first_day || date > last_day {
                continue;
            }
            let id = flights.len() as u32;
            match self.convert_row(id, date, &row) {
                Ok(flight) => flights.push(flight),
                Err(SeedError::NonexistentLocalTime { time, zone }) => {
                    log::warn!(
                        "Skipping flight {} {}-{}: local time {} does not exist in {}",
                        row.flight_number,
                        row.origin,
                        row.dest,
                        time,
                        zone
                    );
                    skipped += 1;
                }
                Err(error @ (SeedError::Lookup(_) | SeedError::MissingTimeZone(_))) => {
                    log::warn!(
                        "Skipping flight {} {}-{}: {}",
                        row.flight_number,
                        row.origin,
                        row.dest,
                        error
                    );
                    skipped += 1;
                }
                Err(error) => return Err(error),
            }
        }
        if flights.is_empty() {
            return Err(SeedError::EmptyInput("flights"));
        }
        log::info!("Loaded {} flights, skipped {}", flights.len(), skipped);
        Ok(flights)
    }

    fn convert_row(&self, id: u32, date: NaiveDate, row: &OnTimeRow) -> Result<FlightRecord, SeedError> {
        let origin = AirportCode::new(&row.origin);
        let dest = AirportCode::new(&row.dest);
        let sched_depart =
            local_to_utc(date, row.crs_dep_time, self.coordinates.timezone(origin)?)?;
        let sched_arrive = local_to_utc(
            arrival_date(date, row.crs_dep_time, row.crs_arr_time),
            row.crs_arr_time,
            self.coordinates.timezone(dest)?,
        )?;
        let actual_depart = row.dep_delay.map(|delay| {
            sched_depart + minutes(self.delay_policy.effective_delay_minutes(delay))
        });
        let actual_arrive = row.arr_delay.map(|delay| sched_arrive + minutes(delay));

        Ok(FlightRecord {
            id,
            date,
            flight_number: row.flight_number.clone(),
            tail: row.tail_number.clone().filter(|tail| !tail.is_empty()),
            origin,
            dest,
            sched_depart,
            sched_arrive,
            actual_depart,
            actual_arrive,
        })
    }
}
