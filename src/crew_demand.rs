//! Estimates how many crew teams each airport must start the day with.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::model::{AirportCode, CrewRecord, FlightRecord};

pub const ARRIVAL: i32 = 1;
pub const DEPARTURE: i32 = -1;

/// A crew becoming available (`+1`, arrival) or committed (`-1`, departure).
///
/// Field order gives the sweep order: by time, then departures before
/// arrivals at the same instant, then by flight id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CrewEvent {
    pub time: DateTime<Utc>,
    pub delta: i32,
    pub flight: u32,
}

impl CrewEvent {
    pub fn arrival(time: DateTime<Utc>, flight: u32) -> Self {
        CrewEvent {
            time,
            delta: ARRIVAL,
            flight,
        }
    }

    pub fn departure(time: DateTime<Utc>, flight: u32) -> Self {
        CrewEvent {
            time,
            delta: DEPARTURE,
            flight,
        }
    }
}

/// Events touching `airport`, ignoring flights without an aircraft.
pub fn airport_crew_events(airport: AirportCode, flights: &[FlightRecord]) -> Vec<CrewEvent> {
    let mut events = vec![];
    for flight in flights.iter().filter(|flight| flight.is_assigned()) {
        if flight.origin == airport {
            events.push(CrewEvent::departure(flight.sched_depart, flight.id));
        }
        if flight.dest == airport {
            events.push(CrewEvent::arrival(flight.sched_arrive, flight.id));
        }
    }
    events
}

/// Smallest starting balance that keeps the running balance non-negative.
pub fn required_crew(mut events: Vec<CrewEvent>) -> u32 {
    events.sort();
    let mut balance: i64 = 0;
    let mut lowest: i64 = 0;
    for event in &events {
        balance += i64::from(event.delta);
        lowest = lowest.min(balance);
    }
    (-lowest) as u32
}

/// Multiply, then truncate toward zero.
pub fn scale_crew(required: u32, multiplier: f64) -> u32 {
    (f64::from(required) * multiplier).trunc().max(0.0) as u32
}

pub fn minimum_crew(airport: AirportCode, flights: &[FlightRecord], multiplier: f64) -> u32 {
    scale_crew(required_crew(airport_crew_events(airport, flights)), multiplier)
}

/// One record per crew team, airports in code order, ids counting up from 0.
pub fn synthesize_crew(flights: &[FlightRecord], multiplier: f64) -> Vec<CrewRecord> {
    let airports: BTreeSet<AirportCode> = flights
        .iter()
        .filter(|flight| flight.is_assigned())
        .flat_map(|flight| [flight.origin, flight.dest])
        .collect();

    let mut roster = vec![];
    for airport in airports {
        let count = minimum_crew(airport, flights, multiplier);
        log::debug!("{} needs {} crew teams", airport, count);
        for _ in 0..count {
            roster.push(CrewRecord {
                id: roster.len() as u32,
                location: airport,
            });
        }
    }
    log::info!("Positioned {} crew teams", roster.len());
    roster
}
