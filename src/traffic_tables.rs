//! Readers for the BTS T-100 market and segment tables.

use std::{io, path::Path};

use crate::{
    error::SeedError,
    model::{AirportCode, MarketDemandRow, SegmentEdge},
};

#[derive(Debug, Clone, serde::Deserialize)]
struct T100Row {
    #[serde(rename = "CARRIER")]
    carrier: String,
    #[serde(rename = "ORIGIN")]
    origin: String,
    #[serde(rename = "DEST")]
    dest: String,
    #[serde(rename = "PASSENGERS", default)]
    passengers: Option<f64>,
}

fn read_carrier_rows<R: io::Read>(
    reader: R,
    carrier: &str,
) -> Result<impl Iterator<Item = T100Row>, SeedError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let rows = csv_reader
        .deserialize::<T100Row>()
        .collect::<Result<Vec<_>, _>>()?;
    let carrier = carrier.to_string();
    Ok(rows.into_iter().filter(move |row| row.carrier == carrier))
}

/// One edge per operated segment row of `carrier`.
pub fn read_segments<R: io::Read>(reader: R, carrier: &str) -> Result<Vec<SegmentEdge>, SeedError> {
    Ok(read_carrier_rows(reader, carrier)?
        .map(|row| SegmentEdge {
            origin: AirportCode::new(&row.origin),
            destination: AirportCode::new(&row.dest),
        })
        .collect())
}

pub fn read_markets<R: io::Read>(
    reader: R,
    carrier: &str,
) -> Result<Vec<MarketDemandRow>, SeedError> {
    Ok(read_carrier_rows(reader, carrier)?
        .map(|row| MarketDemandRow {
            origin: AirportCode::new(&row.origin),
            destination: AirportCode::new(&row.dest),
            passengers: row.passengers.unwrap_or(0.0),
        })
        .collect())
}

pub fn load_segments(path: &Path, carrier: &str) -> Result<Vec<SegmentEdge>, SeedError> {
    log::info!("Loading {} segments from {:?}", carrier, path);
    let segments = read_segments(std::fs::File::open(path)?, carrier)?;
    log::info!("Loaded {} segment rows", segments.len());
    Ok(segments)
}

pub fn load_markets(path: &Path, carrier: &str) -> Result<Vec<MarketDemandRow>, SeedError> {
    log::info!("Loading {} markets from {:?}", carrier, path);
    let markets = read_markets(std::fs::File::open(path)?, carrier)?;
    log::info!("Loaded {} market rows", markets.len());
    Ok(markets)
}
