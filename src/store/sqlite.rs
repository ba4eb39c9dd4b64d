//! SQLite-backed roster store.

use super::error::{StoreError, StoreResult};
use crate::roster::{Dance, DanceId, Dancer, DancerId, Position, Preference, PreferenceEdge, Role};
use rusqlite::{params_from_iter, Connection};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS dancers (
    id      INTEGER PRIMARY KEY,
    name    TEXT    NOT NULL,
    active  INTEGER NOT NULL DEFAULT 1,
    type    INTEGER NOT NULL DEFAULT 1
);
CREATE TABLE IF NOT EXISTS dances (
    id      INTEGER PRIMARY KEY,
    active  INTEGER NOT NULL DEFAULT 1,
    name    TEXT    NOT NULL,
    note    TEXT
);
CREATE TABLE IF NOT EXISTS positions (
    position INTEGER NOT NULL,
    name     TEXT    NOT NULL,
    dance    INTEGER NOT NULL,
    PRIMARY KEY (dance, position)
);
CREATE TABLE IF NOT EXISTS dancerposition (
    dancer     INTEGER NOT NULL,
    position   INTEGER NOT NULL,
    dance      INTEGER NOT NULL,
    preference INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (dancer, dance, position)
);
"#;

/// Read access to dancers, dances and preferences.
///
/// The tables carry no foreign keys, so reads skip rows whose referenced
/// dancer, dance or position no longer exists.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Opens the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening roster database");
        Ok(Self::from_connection(Connection::open(path)?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Creates the tables if they do not exist yet.
    pub fn create_schema(conn: &Connection) -> StoreResult<()> {
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// All dancers, active or not, ordered by name.
    pub fn fetch_dancers(&self) -> StoreResult<Vec<Dancer>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name, active, type FROM dancers ORDER BY name, id")?;
        let dancers = stmt
            .query_map([], read_dancer_row)?
            .map(|row| dancer_from_row(row?))
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(dancers)
    }

    /// Dancers with exactly these names, ordered by name.
    ///
    /// Fails with [`StoreError::MissingDancers`] listing every name that
    /// matched nobody.
    pub fn fetch_dancers_by_name<S: AsRef<str>>(&self, names: &[S]) -> StoreResult<Vec<Dancer>> {
        let mut wanted: Vec<&str> = Vec::with_capacity(names.len());
        for name in names {
            if !wanted.contains(&name.as_ref()) {
                wanted.push(name.as_ref());
            }
        }
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn()?;
        let sql = format!(
            "SELECT id, name, active, type FROM dancers WHERE name IN ({}) ORDER BY name, id",
            placeholders(wanted.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let dancers = stmt
            .query_map(params_from_iter(wanted.iter()), read_dancer_row)?
            .map(|row| dancer_from_row(row?))
            .collect::<StoreResult<Vec<_>>>()?;

        let found: HashSet<&str> = dancers.iter().map(|d| d.name.as_str()).collect();
        let missing: Vec<String> = wanted
            .iter()
            .filter(|name| !found.contains(*name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(StoreError::MissingDancers(missing));
        }
        Ok(dancers)
    }

    /// All dances ordered by name, each with its positions ordered by id.
    pub fn fetch_dances(&self) -> StoreResult<Vec<Dance>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare("SELECT id, name FROM dances ORDER BY name, id")?;
        let mut dances = stmt
            .query_map([], |row| {
                Ok(Dance::new(row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut positions: BTreeMap<DanceId, Vec<Position>> = BTreeMap::new();
        let mut stmt = conn.prepare("SELECT position, name, dance FROM positions ORDER BY dance, position")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                DanceId(row.get(2)?),
                Position::new(row.get::<_, i64>(0)?, row.get::<_, String>(1)?),
            ))
        })?;
        for row in rows {
            let (dance, position) = row?;
            positions.entry(dance).or_default().push(position);
        }

        for dance in &mut dances {
            dance.positions = positions.remove(&dance.id).unwrap_or_default();
        }
        if !positions.is_empty() {
            debug!(orphaned = positions.len(), "skipping positions of unknown dances");
        }
        Ok(dances)
    }

    /// Preference edges, optionally only those of `dancers`.
    ///
    /// Rows referring to a dancer, dance or position that does not exist
    /// are skipped. An unknown preference code is an error.
    pub fn fetch_preferences(&self, dancers: Option<&[DancerId]>) -> StoreResult<Vec<PreferenceEdge>> {
        let mut sql = String::from(
            "SELECT dp.dancer, dp.dance, dp.position, dp.preference
             FROM dancerposition dp
             WHERE dp.dancer IN (SELECT id FROM dancers)
               AND dp.dance IN (SELECT id FROM dances)
               AND EXISTS (
                   SELECT 1 FROM positions p
                   WHERE p.dance = dp.dance AND p.position = dp.position
               )",
        );
        let ids: Vec<i64> = match dancers {
            Some([]) => return Ok(Vec::new()),
            Some(ids) => {
                sql.push_str(&format!(" AND dp.dancer IN ({})", placeholders(ids.len())));
                ids.iter().map(|id| id.0).collect()
            }
            None => Vec::new(),
        };
        sql.push_str(" ORDER BY dp.dance, dp.position, dp.dancer");

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(ids.iter()), |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;
        let edges = rows
            .map(|row| {
                let (dancer, dance, position, code) = row?;
                Ok(PreferenceEdge::new(
                    dancer,
                    dance,
                    position,
                    Preference::from_code(code)?,
                ))
            })
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(edges)
    }
}

type DancerRow = (i64, String, bool, Option<i64>);

fn read_dancer_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DancerRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn dancer_from_row((id, name, active, role): DancerRow) -> StoreResult<Dancer> {
    let role = match role {
        Some(code) => Role::from_code(code)?,
        None => Role::default(),
    };
    let dancer = Dancer::new(id, name).with_role(role);
    Ok(if active { dancer } else { dancer.inactive() })
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
