//! Aircraft types from the FAA registry and the starting position of every
//! tail flown on the simulated day.

use std::{
    collections::{BTreeMap, HashMap},
    io,
    path::Path,
};

use crate::{
    error::SeedError,
    model::{AirportCode, FlightRecord},
};

#[derive(Debug, Clone, serde::Deserialize)]
struct RegistryRow {
    #[serde(rename = "N-NUMBER")]
    n_number: String,
    #[serde(rename = "MFR MDL CODE")]
    model_code: String,
    #[serde(rename = "NAME")]
    name: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
struct ReferenceRow {
    #[serde(rename = "CODE")]
    code: String,
    #[serde(rename = "MODEL")]
    model: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AircraftType {
    pub typename: &'static str,
    pub capacity: u32,
}

pub const B737: AircraftType = AircraftType {
    typename: "B737",
    capacity: 143,
};
pub const B738: AircraftType = AircraftType {
    typename: "B738",
    capacity: 175,
};
pub const B73M: AircraftType = AircraftType {
    typename: "B73M",
    capacity: 175,
};

pub fn model_to_type(model: &str) -> Option<AircraftType> {
    let model = model.trim();
    if model.starts_with("737-7") {
        Some(B737)
    } else if model == "737-8" {
        Some(B73M)
    } else if model.starts_with("737-8") {
        Some(B738)
    } else {
        None
    }
}

fn csv_reader<R: io::Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Tail number to aircraft type for one registrant.
#[derive(Debug, Clone, Default)]
pub struct AircraftRegistry {
    types: HashMap<String, AircraftType>,
}

impl AircraftRegistry {
    pub fn from_paths(registry: &Path, reference: &Path, registrant: &str) -> Result<Self, SeedError> {
        log::info!("Loading aircraft registry from {:?} and {:?}", registry, reference);
        Self::from_readers(
            std::fs::File::open(registry)?,
            std::fs::File::open(reference)?,
            registrant,
        )
    }

    pub fn from_readers<R1: io::Read, R2: io::Read>(
        registry: R1,
        reference: R2,
        registrant: &str,
    ) -> Result<Self, SeedError> {
        let mut models: HashMap<String, String> = HashMap::new();
        for record in csv_reader(reference).deserialize() {
            let row: ReferenceRow = record?;
            models.insert(row.code, row.model);
        }

        let mut types = HashMap::new();
        for record in csv_reader(registry).deserialize() {
            let row: RegistryRow = record?;
            if !row.name.contains(registrant) {
                continue;
            }
            let Some(aircraft_type) = models.get(&row.model_code).and_then(|m| model_to_type(m))
            else {
                continue;
            };
            types.insert(format!("N{}", row.n_number), aircraft_type);
        }
        log::info!("Registry lists {} typed aircraft for {}", types.len(), registrant);
        Ok(AircraftRegistry { types })
    }

    /// Tails without a known type are assumed to be 737-800s.
    pub fn aircraft_type(&self, tail: &str) -> AircraftType {
        self.types.get(tail).copied().unwrap_or(B738)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aircraft {
    pub tail: String,
    pub location: AirportCode,
    pub typename: &'static str,
    pub capacity: u32,
}

/// Every tail flown in `flights`, placed at the origin of its first flight,
/// sorted by tail number. Flights are ordered by actual departure; those
/// without one come last.
pub fn initial_fleet(registry: &AircraftRegistry, flights: &[FlightRecord]) -> Vec<Aircraft> {
    log::info!("Preparing initial fleet.");
    let mut first_flights: BTreeMap<&str, &FlightRecord> = BTreeMap::new();
    for flight in flights {
        let Some(tail) = flight.tail.as_deref() else {
            continue;
        };
        let order = |f: &FlightRecord| (f.actual_depart.is_none(), f.actual_depart, f.sched_depart, f.id);
        first_flights
            .entry(tail)
            .and_modify(|first| {
                if order(flight) < order(*first) {
                    *first = flight;
                }
            })
            .or_insert(flight);
    }

    first_flights
        .into_iter()
        .map(|(tail, flight)| {
            let aircraft_type = registry.aircraft_type(tail);
            Aircraft {
                tail: tail.to_string(),
                location: flight.origin,
                typename: aircraft_type.typename,
                capacity: aircraft_type.capacity,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    use super::*;

    const MASTER: &str = "\
N-NUMBER,SERIAL NUMBER,MFR MDL CODE,NAME,
8501V,42520,1384002,SOUTHWEST AIRLINES CO                             ,
941WN,36615,1385006,SOUTHWEST AIRLINES CO                             ,
7700C,12345,1384002,SOMEONE ELSE                                      ,
208WN,27685,1385014,SOUTHWEST AIRLINES CO                             ,
";

    const ACFTREF: &str = "\
CODE,MFR,MODEL,
1384002,BOEING,737-8                ,
1385006,BOEING,737-7H4              ,
1385014,BOEING,737-8H4              ,
";

    fn registry() -> AircraftRegistry {
        AircraftRegistry::from_readers(MASTER.as_bytes(), ACFTREF.as_bytes(), "SOUTHWEST AIRLINES")
            .unwrap()
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 28, hour, 0, 0).unwrap()
    }

    fn flight(id: u32, tail: &str, origin: &str, sched: u32, actual: Option<u32>) -> FlightRecord {
        FlightRecord {
            id,
            date: NaiveDate::from_ymd_opt(2024, 1, 28).unwrap(),
            flight_number: id.to_string(),
            tail: Some(tail.to_string()),
            origin: origin.into(),
            dest: "ZZZ".into(),
            sched_depart: at(sched),
            sched_arrive: at(sched + 1),
            actual_depart: actual.map(at),
            actual_arrive: None,
        }
    }

    #[test]
    fn model_mapping() {
        assert_eq!(model_to_type("737-7H4"), Some(B737));
        assert_eq!(model_to_type("737-8"), Some(B73M));
        assert_eq!(model_to_type("737-8H4"), Some(B738));
        assert_eq!(model_to_type("A320"), None);
    }

    #[test]
    fn registry_filters_on_registrant() {
        let registry = registry();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.aircraft_type("N8501V"), B73M);
        assert_eq!(registry.aircraft_type("N941WN"), B737);
        assert_eq!(registry.aircraft_type("N208WN"), B738);
        assert_eq!(registry.aircraft_type("N7700C"), B738);
    }

    #[test]
    fn fleet_starts_at_first_departure() {
        let flights = vec![
            flight(0, "N941WN", "MDW", 12, Some(12)),
            flight(1, "N941WN", "DAL", 9, Some(10)),
            flight(2, "N8501V", "HOU", 6, None),
            flight(3, "N8501V", "AUS", 8, Some(8)),
            flight(4, "N999ZZ", "BWI", 7, Some(7)),
        ];
        let fleet = initial_fleet(&registry(), &flights);
        assert_eq!(
            fleet,
            vec![
                Aircraft {
                    tail: "N8501V".into(),
                    location: "AUS".into(),
                    typename: "B73M",
                    capacity: 175,
                },
                Aircraft {
                    tail: "N941WN".into(),
                    location: "DAL".into(),
                    typename: "B737",
                    capacity: 143,
                },
                Aircraft {
                    tail: "N999ZZ".into(),
                    location: "BWI".into(),
                    typename: "B738",
                    capacity: 175,
                },
            ]
        );
    }
}
