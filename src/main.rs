use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::LevelFilter;

use flight_seed::{
    config::{DepartureDelayPolicy, SeedConfig},
    coordinates::CoordinateTable,
    crew_demand::synthesize_crew,
    export_itineraries::{export_itineraries, itineraries_to_json},
    find_itinerary_path::DEFAULT_MAX_HOPS,
    flight_schedule::FlightScheduleLoader,
    seed_scenario::seed_scenarios,
    segment_graph::SegmentGraph,
    synthesize_itineraries::{DemandScale, ItinerarySynthesizer},
    traffic_tables,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct SeedApp {
    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write every scenario of a seed configuration into a database.
    Seed {
        /// Seed configuration, `.toml` or `.json`.
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,
        #[arg(short, long, default_value = "seed.db")]
        database: PathBuf,
    },
    /// Route passenger markets over the segment graph.
    Itineraries {
        #[arg(long)]
        coordinates: PathBuf,
        #[arg(long)]
        markets: PathBuf,
        #[arg(long)]
        segments: PathBuf,
        #[arg(long, default_value = "WN")]
        carrier: String,
        /// Simulated days the demand is scaled to.
        #[arg(long, default_value_t = 1.0)]
        days: f64,
        /// Days covered by the market table.
        #[arg(long, default_value_t = 30.0)]
        period_days: f64,
        #[arg(long, default_value_t = DEFAULT_MAX_HOPS)]
        max_hops: usize,
        /// Drop markets touching airports without coordinates.
        #[arg(long)]
        skip_unknown_airports: bool,
        /// Write JSON here instead of printing it.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the starting crew roster for one day of flights.
    Crew {
        #[arg(long)]
        coordinates: PathBuf,
        #[arg(long)]
        flights: PathBuf,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, default_value = "WN")]
        carrier: String,
        #[arg(long, default_value_t = 2.0)]
        multiplier: f64,
        #[arg(long, value_enum, default_value_t = DepartureDelayPolicy::ClampEarly)]
        departure_delay_policy: DepartureDelayPolicy,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let app = SeedApp::parse();
    simple_logger::SimpleLogger::new()
        .with_level(app.log_level)
        .init()?;

    match app.command {
        Command::Seed { config, database } => {
            let seed_config = SeedConfig::try_from(config.as_path())
                .with_context(|| format!("reading configuration {:?}", config))?;
            seed_scenarios(&seed_config, &database).await?;
        }
        Command::Itineraries {
            coordinates,
            markets,
            segments,
            carrier,
            days,
            period_days,
            max_hops,
            skip_unknown_airports,
            output,
        } => {
            let coordinates = CoordinateTable::from_path(&coordinates)?;
            let graph = SegmentGraph::from_edges(traffic_tables::load_segments(&segments, &carrier)?);
            let markets = traffic_tables::load_markets(&markets, &carrier)?;
            let itineraries = ItinerarySynthesizer::new(&graph, &coordinates)
                .with_max_hops(max_hops)
                .synthesize(
                    &markets,
                    DemandScale::new(period_days, days),
                    skip_unknown_airports,
                )?;
            match output {
                Some(output) => export_itineraries(&itineraries, &output)?,
                None => println!("{}", itineraries_to_json(&itineraries)?),
            }
        }
        Command::Crew {
            coordinates,
            flights,
            date,
            carrier,
            multiplier,
            departure_delay_policy,
        } => {
            let coordinates = CoordinateTable::from_path(&coordinates)?;
            let day_flights = FlightScheduleLoader::new(&coordinates, &carrier, departure_delay_policy)
                .load(&flights, date, date)?;
            for crew in synthesize_crew(&day_flights, multiplier) {
                println!("{}\t{}", crew.id, crew.location);
            }
        }
    }
    Ok(())
}
