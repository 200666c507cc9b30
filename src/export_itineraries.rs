use anyhow::Result;
use std::{io::Write, path::Path};

use crate::model::Itinerary;

#[derive(Debug, Clone, serde::Serialize)]
struct ItineraryExport {
    itineraries: Vec<ItineraryInfo>,
}

#[derive(Debug, Clone, serde::Serialize)]
struct ItineraryInfo {
    path: String,
    hops: usize,
    amount: u32,
}

fn to_export(itineraries: &[Itinerary]) -> ItineraryExport {
    ItineraryExport {
        itineraries: itineraries
            .iter()
            .map(|itinerary| ItineraryInfo {
                path: itinerary.path.render(),
                hops: itinerary.path.hops(),
                amount: itinerary.amount,
            })
            .collect(),
    }
}

pub fn itineraries_to_json(itineraries: &[Itinerary]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_export(itineraries))?)
}

pub fn export_itineraries(itineraries: &[Itinerary], output_path: &Path) -> Result<()> {
    log::info!("Writing {} itineraries to {:?}", itineraries.len(), output_path);
    let mut file = std::fs::File::create(output_path)?;
    file.write_all(itineraries_to_json(itineraries)?.as_bytes())?;
    Ok(())
}
