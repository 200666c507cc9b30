//! End-to-end seeding: reads the source tables once and writes every
//! configured scenario into the seed database.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::TimeDelta;

use crate::{
    airport_capacity::airport_capacities,
    config::{ScenarioConfig, SeedConfig},
    coordinates::CoordinateTable,
    crew_demand::synthesize_crew,
    fleet::{initial_fleet, AircraftRegistry},
    flight_schedule::FlightScheduleLoader,
    model::MarketDemandRow,
    seed_database::SeedDatabase,
    segment_graph::SegmentGraph,
    synthesize_itineraries::{DemandScale, ItinerarySynthesizer},
    throughput::hourly_throughputs,
    traffic_tables,
};

/// The scenario runs until this long after the last scheduled arrival.
const SCENARIO_TAIL_HOURS: i64 = 7;

/// Source tables shared by all scenarios of one run.
pub struct SeedSources {
    pub coordinates: CoordinateTable,
    pub registry: AircraftRegistry,
    pub segments: SegmentGraph,
    pub markets: Vec<MarketDemandRow>,
}

impl SeedSources {
    pub fn load(config: &SeedConfig) -> Result<Self> {
        let data = &config.data;
        let coordinates = CoordinateTable::from_path(&data.coordinates)
            .with_context(|| format!("loading coordinates from {:?}", data.coordinates))?;
        let registry = AircraftRegistry::from_paths(
            &data.aircraft_registry,
            &data.aircraft_reference,
            &config.registrant,
        )
        .context("loading aircraft registry")?;
        let segments = SegmentGraph::from_edges(
            traffic_tables::load_segments(&data.segments, &config.carrier)
                .with_context(|| format!("loading segments from {:?}", data.segments))?,
        );
        let markets = traffic_tables::load_markets(&data.markets, &config.carrier)
            .with_context(|| format!("loading markets from {:?}", data.markets))?;
        Ok(SeedSources {
            coordinates,
            registry,
            segments,
            markets,
        })
    }
}

pub async fn seed_scenarios(config: &SeedConfig, database_path: &Path) -> Result<()> {
    let sources = SeedSources::load(config)?;
    let db = SeedDatabase::open(database_path)
        .await
        .with_context(|| format!("opening {:?}", database_path))?;
    let mut synthesizer = ItinerarySynthesizer::new(&sources.segments, &sources.coordinates)
        .with_max_hops(config.max_hops);

    for scenario in &config.scenarios {
        seed_scenario(config, scenario, &sources, &mut synthesizer, &db)
            .await
            .with_context(|| format!("seeding scenario {}", scenario.id))?;
    }
    log::info!(
        "Distance index holds {} airport pairs",
        synthesizer.finder().distances().cached_pairs()
    );
    db.close().await;
    Ok(())
}

pub async fn seed_scenario(
    config: &SeedConfig,
    scenario: &ScenarioConfig,
    sources: &SeedSources,
    synthesizer: &mut ItinerarySynthesizer<'_, '_>,
    db: &SeedDatabase,
) -> Result<()> {
    log::info!("Preparing scenario {} ({}).", scenario.id, scenario.name);
    let loader = FlightScheduleLoader::new(
        &sources.coordinates,
        &config.carrier,
        config.departure_delay_policy,
    );
    let flights_path = &config.data.flights;
    let day_flights = loader
        .load(flights_path, scenario.date, scenario.date)
        .with_context(|| format!("loading flights for {}", scenario.date))?;
    let window_flights = loader
        .load(flights_path, scenario.capacity_start, scenario.capacity_end)
        .with_context(|| {
            format!(
                "loading flights for {} to {}",
                scenario.capacity_start, scenario.capacity_end
            )
        })?;

    let (Some(start), Some(last_arrival)) = (
        day_flights.iter().map(|flight| flight.sched_depart).min(),
        day_flights.iter().map(|flight| flight.sched_arrive).max(),
    ) else {
        anyhow::bail!("no flights on {}", scenario.date);
    };
    let end = last_arrival + TimeDelta::hours(SCENARIO_TAIL_HOURS);

    let capacities = airport_capacities(&window_flights);
    let fleet = initial_fleet(&sources.registry, &day_flights);
    log::info!("Preparing crew roster.");
    let crew = synthesize_crew(&day_flights, scenario.crew_multiplier);
    let itineraries = synthesizer.synthesize(
        &sources.markets,
        DemandScale::new(config.demand_period_days, scenario.days),
        config.skip_unknown_airports,
    )?;
    let throughputs = hourly_throughputs(&window_flights, start, end);

    if db.scenario_exists(&scenario.id).await? {
        log::info!("Replacing existing scenario {}", scenario.id);
    }
    let mut writer = db.begin_scenario(&scenario.id).await?;
    writer.write_scenario(&scenario.name, start, end).await?;
    writer
        .write_airports(&capacities, &sources.coordinates)
        .await?;
    writer.write_aircraft(&fleet).await?;
    writer.write_crew(&crew).await?;
    writer.write_flights(&day_flights).await?;
    writer.write_itineraries(&itineraries).await?;
    writer.write_throughput_disruptions(&throughputs).await?;
    writer.commit().await?;
    Ok(())
}
