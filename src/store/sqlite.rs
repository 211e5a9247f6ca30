use crate::error::{LoadError, Result};
use crate::models::{Measurement, Station};
use crate::store::schema;
use crate::utils::constants::ID_LENGTH;
use rand::distributions::Alphanumeric;
use rand::Rng;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// One query result row: ordered (column-name, text-value) pairs.
pub type QueryRow = Vec<(String, String)>;

/// SQLite-backed store for stations and measurements.
///
/// The connection sits behind a mutex so concurrent batch workers serialize
/// their writes through a single exclusion point; SQLite is not treated as
/// safe for concurrent writers here. The store is cheap to clone and share.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        schema::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Ephemeral store, used by tests and benchmarks.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| LoadError::Lock(format!("Failed to acquire database lock: {}", e)))
    }

    /// Idempotent schema creation.
    pub fn init(&self) -> Result<()> {
        let conn = self.lock()?;
        schema::init_schema(&conn)
    }

    /// Drops all persisted state. Every ingestion run starts from this.
    pub fn clean_all(&self) -> Result<()> {
        let conn = self.lock()?;
        schema::drop_all(&conn)
    }

    pub fn insert_measurement(&self, measurement: &Measurement) -> Result<String> {
        let conn = self.lock()?;
        insert_measurement_on(&conn, measurement)
    }

    /// Bulk insert in a single transaction; returns one generated id per
    /// element, in input order.
    pub fn insert_measurements(&self, measurements: &[Measurement]) -> Result<Vec<String>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut ids = Vec::with_capacity(measurements.len());
        for measurement in measurements {
            ids.push(insert_measurement_on(&tx, measurement)?);
        }

        tx.commit()?;
        Ok(ids)
    }

    pub fn insert_station(&self, station: &Station) -> Result<()> {
        let conn = self.lock()?;
        insert_station_on(&conn, station)
    }

    pub fn insert_stations(&self, stations: &[Station]) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        for station in stations {
            insert_station_on(&tx, station)?;
        }

        tx.commit()?;
        Ok(())
    }

    pub fn count_measurements(&self) -> Result<i64> {
        let conn = self.lock()?;
        let count = conn.query_row("SELECT COUNT(*) FROM measurements", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn count_stations(&self) -> Result<i64> {
        let conn = self.lock()?;
        let count = conn.query_row("SELECT COUNT(*) FROM stations", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Raw SQL passthrough: no validation, every value coerced to text,
    /// NULL rendered as the empty string. Column order is preserved.
    pub fn execute_query(&self, sql: &str) -> Result<Vec<QueryRow>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let column_names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();

        let mut rows = stmt.query([])?;
        let mut results = Vec::new();

        while let Some(row) = rows.next()? {
            let mut result_row = Vec::with_capacity(column_names.len());
            for (index, name) in column_names.iter().enumerate() {
                let value = match row.get_ref(index)? {
                    ValueRef::Null => String::new(),
                    ValueRef::Integer(i) => i.to_string(),
                    ValueRef::Real(f) => f.to_string(),
                    ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
                    ValueRef::Blob(b) => String::from_utf8_lossy(b).into_owned(),
                };
                result_row.push((name.clone(), value));
            }
            results.push(result_row);
        }

        Ok(results)
    }
}

fn insert_measurement_on(conn: &Connection, measurement: &Measurement) -> Result<String> {
    let id = generate_unique_id(conn, "measurements")?;

    conn.execute(
        r#"
        INSERT INTO measurements (
            id, station, date, reportType, qualityControlFlag, wind,
            cloudCeiling, visibilityDistance, temperature, dewPoints, seaLevelPressure
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
        params![
            id,
            measurement.station,
            measurement.date,
            measurement.report_type,
            measurement.quality_control_flag,
            measurement.wind,
            measurement.cloud_ceiling,
            measurement.visibility_distance,
            measurement.temperature,
            measurement.dew_points,
            measurement.sea_level_pressure,
        ],
    )?;

    Ok(id)
}

fn insert_station_on(conn: &Connection, station: &Station) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO stations (id, name, longitude, latitude, elevation, callSign)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            station.id,
            station.name,
            station.longitude,
            station.latitude,
            station.elevation,
            station.call_sign,
        ],
    )?;

    Ok(())
}

/// Draw fixed-length random alphanumeric tokens until one is unused by the
/// target table. Collisions are astronomically unlikely at this length, but
/// the retry loop tolerates them by construction.
fn generate_unique_id(conn: &Connection, table: &str) -> Result<String> {
    loop {
        let id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(ID_LENGTH)
            .map(char::from)
            .collect();

        let taken: Option<i64> = conn
            .query_row(
                &format!("SELECT 1 FROM {} WHERE id = ?1", table),
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        if taken.is_none() {
            return Ok(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_measurement(station: &str) -> Measurement {
        Measurement {
            station: station.to_string(),
            date: "2024-01-15T12:00:00".to_string(),
            report_type: "FM-15".to_string(),
            quality_control_flag: "V020".to_string(),
            wind: "270,0050,N,1".to_string(),
            cloud_ceiling: 22000.0,
            visibility_distance: 16093.0,
            temperature: 10.6,
            dew_points: 7.2,
            sea_level_pressure: 1013.2,
        }
    }

    fn sample_station(id: &str) -> Station {
        Station::new(
            id.to_string(),
            "HEATHROW".to_string(),
            51.478,
            -0.461,
            25.3,
            "EGLL".to_string(),
        )
    }

    #[test]
    fn test_insert_measurement_returns_generated_id() {
        let store = SqliteStore::open_in_memory().expect("open failed");

        let id = store
            .insert_measurement(&sample_measurement("03772099999"))
            .expect("insert failed");

        assert_eq!(id.len(), ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(store.count_measurements().expect("count failed"), 1);
    }

    #[test]
    fn test_bulk_insert_assigns_distinct_ids() {
        let store = SqliteStore::open_in_memory().expect("open failed");
        let batch = vec![sample_measurement("A"), sample_measurement("B"), sample_measurement("C")];

        let ids = store.insert_measurements(&batch).expect("bulk insert failed");

        assert_eq!(ids.len(), 3);
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 3);
        assert_eq!(store.count_measurements().expect("count failed"), 3);
    }

    #[test]
    fn test_duplicate_station_id_is_rejected() {
        let store = SqliteStore::open_in_memory().expect("open failed");

        store
            .insert_station(&sample_station("03772099999"))
            .expect("first insert failed");
        assert!(store.insert_station(&sample_station("03772099999")).is_err());
        assert_eq!(store.count_stations().expect("count failed"), 1);
    }

    #[test]
    fn test_clean_all_then_init_yields_empty_tables() {
        let store = SqliteStore::open_in_memory().expect("open failed");
        store
            .insert_station(&sample_station("03772099999"))
            .expect("insert failed");

        store.clean_all().expect("clean failed");
        store.init().expect("init failed");

        assert_eq!(store.count_stations().expect("count failed"), 0);
        assert_eq!(store.count_measurements().expect("count failed"), 0);
    }

    #[test]
    fn test_execute_query_preserves_column_order() {
        let store = SqliteStore::open_in_memory().expect("open failed");
        store
            .insert_station(&sample_station("03772099999"))
            .expect("insert failed");

        let rows = store
            .execute_query("SELECT callSign, id, elevation FROM stations")
            .expect("query failed");

        assert_eq!(rows.len(), 1);
        let columns: Vec<&str> = rows[0].iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(columns, vec!["callSign", "id", "elevation"]);
        assert_eq!(rows[0][0].1, "EGLL");
        assert_eq!(rows[0][1].1, "03772099999");
    }

    #[test]
    fn test_execute_query_renders_null_as_empty() {
        let store = SqliteStore::open_in_memory().expect("open failed");
        {
            // Drive the connection directly to plant a NULL.
            let conn = store.lock().expect("lock failed");
            conn.execute(
                "INSERT INTO stations (id, name) VALUES ('X1', NULL)",
                [],
            )
            .expect("raw insert failed");
        }

        let rows = store
            .execute_query("SELECT id, name, elevation FROM stations")
            .expect("query failed");

        assert_eq!(rows[0][1].1, "");
        assert_eq!(rows[0][2].1, "");
    }
}
