use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, Timelike};

use crate::model::{AirportCode, FlightRecord};

/// Busiest observed hour at an airport, used as its movement limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AirportCapacity {
    pub airport: AirportCode,
    pub max_departures_per_hour: u32,
    pub max_arrivals_per_hour: u32,
}

fn busiest_hours(
    flights: &[FlightRecord],
    key: impl Fn(&FlightRecord) -> (AirportCode, NaiveDate, u32),
) -> HashMap<AirportCode, u32> {
    let mut per_hour: HashMap<(AirportCode, NaiveDate, u32), u32> = HashMap::new();
    for flight in flights {
        *per_hour.entry(key(flight)).or_default() += 1;
    }
    let mut busiest: HashMap<AirportCode, u32> = HashMap::new();
    for ((airport, _, _), count) in per_hour {
        let max = busiest.entry(airport).or_default();
        *max = (*max).max(count);
    }
    busiest
}

/// Airports that have both departures and arrivals in `flights`, sorted by
/// code. Hours are UTC hours of the scheduled times, counted per flight date.
pub fn airport_capacities(flights: &[FlightRecord]) -> Vec<AirportCapacity> {
    log::info!("Preparing airport capacities from {} flights.", flights.len());
    let departures = busiest_hours(flights, |flight| {
        (flight.origin, flight.date, flight.sched_depart.hour())
    });
    let arrivals = busiest_hours(flights, |flight| {
        (flight.dest, flight.date, flight.sched_arrive.hour())
    });

    let capacities: BTreeMap<AirportCode, AirportCapacity> = departures
        .iter()
        .filter_map(|(&airport, &max_departures_per_hour)| {
            arrivals.get(&airport).map(|&max_arrivals_per_hour| {
                (
                    airport,
                    AirportCapacity {
                        airport,
                        max_departures_per_hour,
                        max_arrivals_per_hour,
                    },
                )
            })
        })
        .collect();
    capacities.into_values().collect()
}
