//! Hourly movement counts per airport, turned into throughput limits so the
//! simulation cannot move more aircraft in an hour than history did.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, TimeDelta, Utc};

use crate::{
    flight_schedule::floor_to_hour,
    model::{AirportCode, FlightRecord},
};

/// Arrivals are counted this long past the window end so that flights
/// departing late in the window still land inside it.
const ARRIVAL_SLACK_HOURS: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ThroughputKind {
    Departure,
    Arrival,
}

impl ThroughputKind {
    /// Disruption type recorded in the database.
    pub fn disruption_type(&self) -> &'static str {
        match self {
            ThroughputKind::Departure => "dep",
            ThroughputKind::Arrival => "gdp",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourlyThroughput {
    pub airport: AirportCode,
    pub kind: ThroughputKind,
    pub hour: DateTime<Utc>,
    pub count: u32,
}

impl HourlyThroughput {
    pub fn end(&self) -> DateTime<Utc> {
        self.hour + TimeDelta::hours(1)
    }
}

fn hourly_counts(
    kind: ThroughputKind,
    movements: impl Iterator<Item = (AirportCode, DateTime<Utc>)>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<HourlyThroughput> {
    let mut counts: BTreeMap<AirportCode, BTreeMap<DateTime<Utc>, u32>> = BTreeMap::new();
    for (airport, time) in movements {
        *counts
            .entry(airport)
            .or_default()
            .entry(floor_to_hour(time))
            .or_default() += 1;
    }

    let first_hour = floor_to_hour(start);
    let last_filled = end + TimeDelta::minutes(1);
    let mut throughputs = vec![];
    for (airport, per_hour) in counts {
        let last_seen = per_hour.keys().next_back().copied().unwrap_or(first_hour);
        let mut hour = first_hour.min(per_hour.keys().next().copied().unwrap_or(first_hour));
        while hour <= last_filled || hour <= last_seen {
            throughputs.push(HourlyThroughput {
                airport,
                kind,
                hour,
                count: per_hour.get(&hour).copied().unwrap_or(0),
            });
            hour += TimeDelta::hours(1);
        }
    }
    throughputs
}

/// Counts actual departures in `[start, end]` and actual arrivals in
/// `[start, end + 10h]`, per airport and UTC hour. Each airport that moved at
/// all gets a row for every hour from the hour of `start` through `end`,
/// including hours where nothing moved.
pub fn hourly_throughputs(
    flights: &[FlightRecord],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<HourlyThroughput> {
    log::info!("Preparing hourly throughputs from {} to {}.", start, end);
    let arrival_end = end + TimeDelta::hours(ARRIVAL_SLACK_HOURS);
    let departures = flights.iter().filter_map(|flight| {
        flight
            .actual_depart
            .filter(|time| (start..=end).contains(time))
            .map(|time| (flight.origin, time))
    });
    let arrivals = flights.iter().filter_map(|flight| {
        flight
            .actual_arrive
            .filter(|time| (start..=arrival_end).contains(time))
            .map(|time| (flight.dest, time))
    });

    let mut throughputs = hourly_counts(ThroughputKind::Departure, departures, start, end);
    throughputs.extend(hourly_counts(ThroughputKind::Arrival, arrivals, start, end));
    log::debug!("{} hourly throughput rows", throughputs.len());
    throughputs
}
