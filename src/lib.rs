pub mod airport_capacity;
pub mod config;
pub mod coordinates;
pub mod crew_demand;
pub mod distance_index;
pub mod error;
pub mod export_itineraries;
pub mod find_itinerary_path;
pub mod fleet;
pub mod flight_schedule;
pub mod model;
pub mod progress;
pub mod seed_database;
pub mod seed_scenario;
pub mod segment_graph;
pub mod synthesize_itineraries;
pub mod throughput;
pub mod traffic_tables;
