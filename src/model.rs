use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use ustr::{ustr, Ustr};

/// Interned airport identifier, e.g. `SFO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AirportCode(Ustr);

impl AirportCode {
    pub fn new(code: &str) -> Self {
        AirportCode(ustr(code.trim()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialOrd for AirportCode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// Lexicographic on the code text, not on the interned pointer.
impl Ord for AirportCode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl From<&str> for AirportCode {
    fn from(code: &str) -> Self {
        AirportCode::new(code)
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latitude and longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// A directed airport pair with at least one operated flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentEdge {
    pub origin: AirportCode,
    pub destination: AirportCode,
}

/// Passengers wanting to travel between two airports, whether or not a
/// direct segment exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketDemandRow {
    pub origin: AirportCode,
    pub destination: AirportCode,
    pub passengers: f64,
}

/// Airports visited by an itinerary, origin first.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct Path(Vec<AirportCode>);

impl Path {
    pub fn new(airports: Vec<AirportCode>) -> Self {
        Path(airports)
    }

    pub fn airports(&self) -> &[AirportCode] {
        &self.0
    }

    pub fn origin(&self) -> Option<AirportCode> {
        self.0.first().copied()
    }

    pub fn destination(&self) -> Option<AirportCode> {
        self.0.last().copied()
    }

    /// Number of edges flown.
    pub fn hops(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn edges(&self) -> impl Iterator<Item = SegmentEdge> + '_ {
        self.0.windows(2).map(|pair| SegmentEdge {
            origin: pair[0],
            destination: pair[1],
        })
    }

    /// Codes joined by `-`, the form the simulator reads back.
    pub fn render(&self) -> String {
        self.0
            .iter()
            .map(|code| code.as_str())
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Itinerary {
    pub path: Path,
    pub amount: u32,
}

/// One scheduled flight after normalization to UTC.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightRecord {
    pub id: u32,
    pub date: NaiveDate,
    pub flight_number: String,
    /// `None` when no aircraft is assigned.
    pub tail: Option<String>,
    pub origin: AirportCode,
    pub dest: AirportCode,
    pub sched_depart: DateTime<Utc>,
    pub sched_arrive: DateTime<Utc>,
    pub actual_depart: Option<DateTime<Utc>>,
    pub actual_arrive: Option<DateTime<Utc>>,
}

impl FlightRecord {
    pub fn is_assigned(&self) -> bool {
        self.tail.is_some()
    }
}

/// A crew team positioned at an airport when the simulation starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrewRecord {
    pub id: u32,
    pub location: AirportCode,
}
