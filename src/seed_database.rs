//! SQLite store the simulator reads its scenarios from.

use std::{path::Path, str::FromStr};

use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Sqlite, SqlitePool, Transaction,
};

use crate::{
    airport_capacity::AirportCapacity,
    coordinates::CoordinateTable,
    error::SeedError,
    fleet::Aircraft,
    model::{CrewRecord, FlightRecord, Itinerary},
    throughput::HourlyThroughput,
};

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_time(time: DateTime<Utc>) -> String {
    time.format(TIME_FORMAT).to_string()
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS scenarios (
    sid TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL,
    crew_turnaround_time INTEGER NOT NULL DEFAULT 30,
    aircraft_turnaround_time INTEGER NOT NULL DEFAULT 45,
    max_delay INTEGER NOT NULL DEFAULT 720,
    aircraft_selector TEXT,
    crew_selector TEXT,
    wait_for_deadheaders INTEGER NOT NULL DEFAULT 0,
    aircraft_reassign_tolerance INTEGER NOT NULL DEFAULT 60,
    crew_reassign_tolerance INTEGER NOT NULL DEFAULT 60
);

CREATE TABLE IF NOT EXISTS airports (
    code TEXT NOT NULL,
    max_dep_per_hour INTEGER NOT NULL,
    max_arr_per_hour INTEGER NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    sid TEXT NOT NULL REFERENCES scenarios(sid) ON DELETE CASCADE,
    PRIMARY KEY (code, sid)
);

CREATE TABLE IF NOT EXISTS aircraft (
    tail TEXT NOT NULL,
    location TEXT NOT NULL,
    typename TEXT NOT NULL,
    capacity INTEGER NOT NULL,
    sid TEXT NOT NULL REFERENCES scenarios(sid) ON DELETE CASCADE,
    PRIMARY KEY (tail, sid)
);

CREATE TABLE IF NOT EXISTS crew (
    id INTEGER NOT NULL,
    location TEXT NOT NULL,
    sid TEXT NOT NULL REFERENCES scenarios(sid) ON DELETE CASCADE,
    PRIMARY KEY (id, sid)
);

CREATE TABLE IF NOT EXISTS flights (
    id INTEGER NOT NULL,
    flight_number TEXT NOT NULL,
    aircraft TEXT,
    origin TEXT NOT NULL,
    dest TEXT NOT NULL,
    pilot INTEGER,
    sched_depart TEXT NOT NULL,
    sched_arrive TEXT NOT NULL,
    sid TEXT NOT NULL REFERENCES scenarios(sid) ON DELETE CASCADE,
    PRIMARY KEY (id, sid)
);

CREATE TABLE IF NOT EXISTS deadheaders (
    id INTEGER NOT NULL,
    fid INTEGER NOT NULL,
    sid TEXT NOT NULL REFERENCES scenarios(sid) ON DELETE CASCADE,
    PRIMARY KEY (id, fid, sid)
);

CREATE TABLE IF NOT EXISTS demand (
    path TEXT NOT NULL,
    amount INTEGER NOT NULL,
    sid TEXT NOT NULL REFERENCES scenarios(sid) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS disruptions (
    airport TEXT NOT NULL,
    start TEXT NOT NULL,
    "end" TEXT NOT NULL,
    hourly_rate INTEGER NOT NULL,
    type TEXT NOT NULL,
    reason TEXT NOT NULL,
    sid TEXT NOT NULL REFERENCES scenarios(sid) ON DELETE CASCADE
);
"#;

const DISRUPTION_REASON: &str = "autogenerated";

/// Rows stored for one scenario.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScenarioCounts {
    pub airports: i64,
    pub aircraft: i64,
    pub crew: i64,
    pub flights: i64,
    pub demand: i64,
    pub disruptions: i64,
}

pub struct SeedDatabase {
    pool: SqlitePool,
}

impl SeedDatabase {
    pub async fn open(path: &Path) -> Result<Self, SeedError> {
        log::info!("Opening seed database {:?}", path);
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    /// A private database that lives as long as this value.
    pub async fn in_memory() -> Result<Self, SeedError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, SeedError> {
        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        Ok(SeedDatabase { pool })
    }

    /// Opens a transaction that replaces scenario `sid`. Nothing is visible
    /// to readers until [`ScenarioWriter::commit`].
    pub async fn begin_scenario(&self, sid: &str) -> Result<ScenarioWriter, SeedError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM scenarios WHERE sid = ?")
            .bind(sid)
            .execute(&mut *tx)
            .await?;
        Ok(ScenarioWriter {
            tx,
            sid: sid.to_string(),
        })
    }

    pub async fn scenario_exists(&self, sid: &str) -> Result<bool, SeedError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scenarios WHERE sid = ?")
            .bind(sid)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn scenario_row_counts(&self, sid: &str) -> Result<ScenarioCounts, SeedError> {
        Ok(ScenarioCounts {
            airports: self.count_rows("airports", sid).await?,
            aircraft: self.count_rows("aircraft", sid).await?,
            crew: self.count_rows("crew", sid).await?,
            flights: self.count_rows("flights", sid).await?,
            demand: self.count_rows("demand", sid).await?,
            disruptions: self.count_rows("disruptions", sid).await?,
        })
    }

    async fn count_rows(&self, table: &'static str, sid: &str) -> Result<i64, SeedError> {
        let count = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table} WHERE sid = ?"))
            .bind(sid)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

pub struct ScenarioWriter {
    tx: Transaction<'static, Sqlite>,
    sid: String,
}

impl ScenarioWriter {
    pub async fn write_scenario(
        &mut self,
        name: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), SeedError> {
        log::info!("Writing scenario {} ({} to {})", self.sid, start, end);
        sqlx::query("INSERT INTO scenarios(sid, name, start_time, end_time) VALUES (?, ?, ?, ?)")
            .bind(&self.sid)
            .bind(name)
            .bind(format_time(start))
            .bind(format_time(end))
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    pub async fn write_airports(
        &mut self,
        capacities: &[AirportCapacity],
        coordinates: &CoordinateTable,
    ) -> Result<(), SeedError> {
        log::info!("Writing {} airports for scenario {}", capacities.len(), self.sid);
        for capacity in capacities {
            let coordinate = coordinates.coordinate(capacity.airport)?;
            sqlx::query(
                "INSERT INTO airports(code, max_dep_per_hour, max_arr_per_hour, latitude, longitude, sid) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(capacity.airport.as_str())
            .bind(capacity.max_departures_per_hour)
            .bind(capacity.max_arrivals_per_hour)
            .bind(coordinate.latitude)
            .bind(coordinate.longitude)
            .bind(&self.sid)
            .execute(&mut *self.tx)
            .await?;
        }
        Ok(())
    }

    pub async fn write_aircraft(&mut self, fleet: &[Aircraft]) -> Result<(), SeedError> {
        log::info!("Writing {} aircraft for scenario {}", fleet.len(), self.sid);
        for aircraft in fleet {
            sqlx::query(
                "INSERT INTO aircraft(tail, location, typename, capacity, sid) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&aircraft.tail)
            .bind(aircraft.location.as_str())
            .bind(aircraft.typename)
            .bind(aircraft.capacity)
            .bind(&self.sid)
            .execute(&mut *self.tx)
            .await?;
        }
        Ok(())
    }

    pub async fn write_crew(&mut self, roster: &[CrewRecord]) -> Result<(), SeedError> {
        log::info!("Writing {} crew teams for scenario {}", roster.len(), self.sid);
        for crew in roster {
            sqlx::query("INSERT INTO crew(id, location, sid) VALUES (?, ?, ?)")
                .bind(crew.id)
                .bind(crew.location.as_str())
                .bind(&self.sid)
                .execute(&mut *self.tx)
                .await?;
        }
        Ok(())
    }

    pub async fn write_flights(&mut self, flights: &[FlightRecord]) -> Result<(), SeedError> {
        log::info!("Writing {} flights for scenario {}", flights.len(), self.sid);
        for flight in flights {
            sqlx::query(
                "INSERT INTO flights(id, flight_number, aircraft, origin, dest, pilot, sched_depart, sched_arrive, sid) \
                 VALUES (?, ?, ?, ?, ?, NULL, ?, ?, ?)",
            )
            .bind(flight.id)
            .bind(&flight.flight_number)
            .bind(flight.tail.as_deref())
            .bind(flight.origin.as_str())
            .bind(flight.dest.as_str())
            .bind(format_time(flight.sched_depart))
            .bind(format_time(flight.sched_arrive))
            .bind(&self.sid)
            .execute(&mut *self.tx)
            .await?;
        }
        Ok(())
    }

    pub async fn write_itineraries(&mut self, itineraries: &[Itinerary]) -> Result<(), SeedError> {
        log::info!("Writing {} itineraries for scenario {}", itineraries.len(), self.sid);
        for itinerary in itineraries {
            sqlx::query("INSERT INTO demand(path, amount, sid) VALUES (?, ?, ?)")
                .bind(itinerary.path.render())
                .bind(itinerary.amount)
                .bind(&self.sid)
                .execute(&mut *self.tx)
                .await?;
        }
        Ok(())
    }

    pub async fn write_throughput_disruptions(
        &mut self,
        throughputs: &[HourlyThroughput],
    ) -> Result<(), SeedError> {
        log::info!(
            "Writing {} throughput disruptions for scenario {}",
            throughputs.len(),
            self.sid
        );
        for throughput in throughputs {
            sqlx::query(
                "INSERT INTO disruptions(airport, start, \"end\", hourly_rate, type, reason, sid) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(throughput.airport.as_str())
            .bind(format_time(throughput.hour))
            .bind(format_time(throughput.end()))
            .bind(throughput.count)
            .bind(throughput.kind.disruption_type())
            .bind(DISRUPTION_REASON)
            .bind(&self.sid)
            .execute(&mut *self.tx)
            .await?;
        }
        Ok(())
    }

    pub async fn commit(self) -> Result<(), SeedError> {
        self.tx.commit().await?;
        log::info!("Committed scenario {}", self.sid);
        Ok(())
    }
}
