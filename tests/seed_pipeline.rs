use std::path::Path;

use chrono::NaiveDate;
use flight_seed::{
    config::{DataFiles, DepartureDelayPolicy, ScenarioConfig, SeedConfig},
    seed_database::{ScenarioCounts, SeedDatabase},
    seed_scenario::seed_scenarios,
};

const COORDINATES: &str = "\
AIRPORT,DISPLAY_AIRPORT_NAME,LATITUDE,LONGITUDE,AIRPORT_IS_CLOSED,AIRPORT_IS_LATEST,UTC_LOCAL_TIME_VARIATION
DAL,\"Dallas Love Field\",32.847,-96.852,0,1,-0600
MDW,\"Chicago Midway International\",41.786,-87.752,0,1,-0600
HOU,\"William P Hobby\",29.646,-95.279,0,1,-0600
BWI,\"Baltimore/Washington International\",39.175,-76.668,0,1,-0500
BWI,\"Friendship International\",39.175,-76.668,0,0,-0500
";

const ONTIME: &str = "\
FL_DATE,OP_UNIQUE_CARRIER,OP_CARRIER_FL_NUM,TAIL_NUM,ORIGIN,DEST,CRS_DEP_TIME,CRS_ARR_TIME,DEP_DELAY,ARR_DELAY
2024-01-27,WN,881,N941WN,DAL,MDW,0800,1030,0.00,0.00
2024-01-28,WN,881,N941WN,DAL,MDW,0800,1030,0.00,0.00
2024-01-28,WN,882,N941WN,MDW,BWI,1130,1430,5.00,5.00
2024-01-28,WN,300,N8501V,HOU,DAL,0700,0805,0.00,0.00
2024-01-28,WN,301,N8501V,DAL,HOU,0900,1005,0.00,0.00
2024-01-28,AA,100,N100AA,DAL,MDW,0600,0830,0.00,0.00
";

const MASTER: &str = "\
N-NUMBER,SERIAL NUMBER,MFR MDL CODE,NAME,
8501V,42520,1384002,SOUTHWEST AIRLINES CO                             ,
941WN,36615,1385006,SOUTHWEST AIRLINES CO                             ,
";

const ACFTREF: &str = "\
CODE,MFR,MODEL,
1384002,BOEING,737-8                ,
1385006,BOEING,737-7H4              ,
";

const MARKETS: &str = "\
PASSENGERS,CARRIER,ORIGIN,DEST
300.00,WN,HOU,BWI
90.00,WN,DAL,MDW
60.00,WN,BWI,HOU
";

const SEGMENTS: &str = "\
PASSENGERS,CARRIER,ORIGIN,DEST
140.00,WN,DAL,MDW
120.00,WN,DAL,MDW
100.00,WN,MDW,BWI
80.00,WN,HOU,DAL
70.00,WN,DAL,HOU
";

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn config(dir: &Path) -> SeedConfig {
    SeedConfig {
        data: DataFiles {
            coordinates: write(dir, "T_MASTER_CORD.csv", COORDINATES),
            flights: write(dir, "T_ONTIME_REPORTING.csv", ONTIME),
            aircraft_registry: write(dir, "MASTER.txt", MASTER),
            aircraft_reference: write(dir, "ACFTREF.txt", ACFTREF),
            markets: write(dir, "T_T100D_MARKET.csv", MARKETS),
            segments: write(dir, "T_T100D_SEGMENT.csv", SEGMENTS),
        },
        carrier: "WN".into(),
        registrant: "SOUTHWEST AIRLINES".into(),
        departure_delay_policy: DepartureDelayPolicy::ClampEarly,
        demand_period_days: 30.0,
        max_hops: 3,
        skip_unknown_airports: false,
        scenarios: vec![ScenarioConfig {
            id: "2024-01-28-bts-import-nodisrupt".into(),
            name: "January 28 BTS".into(),
            date: day(28),
            capacity_start: day(27),
            capacity_end: day(28),
            days: 1.0,
            crew_multiplier: 1.0,
        }],
    }
}

const EXPECTED: ScenarioCounts = ScenarioCounts {
    airports: 3,
    aircraft: 2,
    crew: 2,
    flights: 4,
    demand: 2,
    // 14 hours from 13:00Z through 02:30Z, for 3 departure and 4 arrival airports.
    disruptions: 98,
};

#[tokio::test]
async fn seeds_one_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let database = dir.path().join("seed.db");
    seed_scenarios(&config, &database).await.unwrap();

    let db = SeedDatabase::open(&database).await.unwrap();
    let sid = "2024-01-28-bts-import-nodisrupt";
    assert_eq!(db.scenario_row_counts(sid).await.unwrap(), EXPECTED);

    let (start, end): (String, String) =
        sqlx::query_as("SELECT start_time, end_time FROM scenarios WHERE sid = ?")
            .bind(sid)
            .fetch_one(db.pool())
            .await
            .unwrap();
    assert_eq!(start, "2024-01-28 13:00:00");
    assert_eq!(end, "2024-01-29 02:30:00");

    let demand: Vec<(String, i64)> =
        sqlx::query_as("SELECT path, amount FROM demand WHERE sid = ? ORDER BY path")
            .bind(sid)
            .fetch_all(db.pool())
            .await
            .unwrap();
    assert_eq!(
        demand,
        vec![
            ("DAL-MDW".to_string(), 3),
            ("HOU-DAL-MDW-BWI".to_string(), 10),
        ]
    );

    let crew: Vec<(i64, String)> =
        sqlx::query_as("SELECT id, location FROM crew WHERE sid = ? ORDER BY id")
            .bind(sid)
            .fetch_all(db.pool())
            .await
            .unwrap();
    assert_eq!(crew, vec![(0, "DAL".to_string()), (1, "HOU".to_string())]);
}

#[tokio::test]
async fn reseeding_replaces_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let database = dir.path().join("seed.db");
    seed_scenarios(&config, &database).await.unwrap();
    seed_scenarios(&config, &database).await.unwrap();

    let db = SeedDatabase::open(&database).await.unwrap();
    assert_eq!(
        db.scenario_row_counts("2024-01-28-bts-import-nodisrupt")
            .await
            .unwrap(),
        EXPECTED
    );
}
