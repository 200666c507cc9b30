use std::{collections::HashMap, io, path::Path};

use chrono_tz::Tz;
use tzf_rs::DefaultFinder;

use crate::{
    error::{LookupError, SeedError},
    model::{AirportCode, Coordinate},
};

/// Row of the BTS master coordinate table.
#[derive(Debug, Clone, serde::Deserialize)]
struct MasterCoordinateRow {
    #[serde(rename = "AIRPORT")]
    airport: String,
    #[serde(rename = "LATITUDE")]
    latitude: Option<f64>,
    #[serde(rename = "LONGITUDE")]
    longitude: Option<f64>,
    #[serde(rename = "DISPLAY_AIRPORT_NAME", default)]
    name: Option<String>,
    #[serde(rename = "AIRPORT_IS_CLOSED", default)]
    is_closed: Option<i64>,
    #[serde(rename = "AIRPORT_IS_LATEST", default)]
    is_latest: Option<i64>,
    /// Not part of the BTS export. Overrides the zone found from the coordinate.
    #[serde(rename = "TIMEZONE", default)]
    timezone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AirportInfo {
    pub code: AirportCode,
    pub name: Option<String>,
    pub coordinate: Coordinate,
    pub timezone: Option<Tz>,
}

/// Airport code to location lookup. Read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct CoordinateTable {
    airports: HashMap<AirportCode, AirportInfo>,
}

impl CoordinateTable {
    pub fn from_path(path: &Path) -> Result<Self, SeedError> {
        log::info!("Loading airport coordinates from {:?}", path);
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Keeps open airports from the latest revision of the table. Time zones
    /// come from a `TIMEZONE` column when present and are otherwise looked up
    /// from the coordinate.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, SeedError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut table = CoordinateTable::default();
        // The polygon set is large, build it only when a row needs it.
        let mut finder: Option<DefaultFinder> = None;
        for record in csv_reader.deserialize() {
            let row: MasterCoordinateRow = record?;
            if row.is_closed.unwrap_or(0) >= 1 || row.is_latest.unwrap_or(1) == 0 {
                continue;
            }
            let code = AirportCode::new(&row.airport);
            let (Some(latitude), Some(longitude)) = (row.latitude, row.longitude) else {
                log::warn!("Skipping airport {} without coordinates", code);
                continue;
            };
            let timezone = match row.timezone.as_deref().filter(|zone| !zone.is_empty()) {
                Some(zone) => Some(zone.parse::<Tz>().map_err(|_| {
                    SeedError::UnknownTimeZone {
                        airport: code,
                        zone: zone.to_string(),
                    }
                })?),
                None => {
                    let finder = finder.get_or_insert_with(DefaultFinder::new);
                    zone_at(finder, code, latitude, longitude)
                }
            };
            table.insert(AirportInfo {
                code,
                name: row.name,
                coordinate: Coordinate {
                    latitude,
                    longitude,
                },
                timezone,
            });
        }
        log::info!("Loaded {} airports", table.len());
        Ok(table)
    }

    /// Builds a table without names or time zones.
    pub fn from_coordinates<'a>(rows: impl IntoIterator<Item = (&'a str, f64, f64)>) -> Self {
        let mut table = CoordinateTable::default();
        for (code, latitude, longitude) in rows {
            table.insert(AirportInfo {
                code: AirportCode::new(code),
                name: None,
                coordinate: Coordinate {
                    latitude,
                    longitude,
                },
                timezone: None,
            });
        }
        table
    }

    pub fn insert(&mut self, info: AirportInfo) {
        self.airports.insert(info.code, info);
    }

    pub fn lookup(&self, code: AirportCode) -> Result<&AirportInfo, LookupError> {
        self.airports
            .get(&code)
            .ok_or(LookupError::UnknownAirport(code))
    }

    pub fn coordinate(&self, code: AirportCode) -> Result<Coordinate, LookupError> {
        Ok(self.lookup(code)?.coordinate)
    }

    pub fn timezone(&self, code: AirportCode) -> Result<Tz, SeedError> {
        self.lookup(code)?
            .timezone
            .ok_or(SeedError::MissingTimeZone(code))
    }

    pub fn contains(&self, code: AirportCode) -> bool {
        self.airports.contains_key(&code)
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }
}

fn zone_at(finder: &DefaultFinder, code: AirportCode, latitude: f64, longitude: f64) -> Option<Tz> {
    let name = finder.get_tz_name(longitude, latitude);
    match name.parse::<Tz>() {
        Ok(zone) => Some(zone),
        Err(_) => {
            log::warn!(
                "No time zone for airport {} at ({}, {}), found {:?}",
                code,
                latitude,
                longitude,
                name
            );
            None
        }
    }
}
