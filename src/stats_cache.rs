use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use tracing::debug;

use crate::config::app_cache_dir;
use crate::normalize::{CanonicalTeamStats, Precision, STAT_FIELDS, stat_field};
use crate::teams::NBA_TEAMS;

/// Row identifier column written by dataframe-style writers. Never part of a record.
pub const INDEX_COLUMN: &str = "index";
pub const FETCHED_AT_COLUMN: &str = "fetched_at";

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub team_key: String,
    pub stats: CanonicalTeamStats,
    pub fetched_at: Option<String>,
}

/// Persisted store of one current stats row per team.
pub trait StatsStore {
    fn contains(&self, team_key: &str) -> Result<bool>;

    /// Drops whatever the team had and stores only `stats`.
    fn replace(&mut self, team_key: &str, stats: &CanonicalTeamStats) -> Result<()>;

    /// `None` when the team has no entry or the entry holds no readable stat.
    fn read(&self, team_key: &str) -> Result<Option<CacheEntry>>;

    fn remove(&mut self, team_key: &str) -> Result<bool>;

    fn clear(&mut self) -> Result<usize>;

    /// Team keys with a stored entry. Other tables in the file are not listed.
    fn keys(&self) -> Result<Vec<String>>;
}

/// "Los Angeles Lakers" -> "Los_Angeles_Lakers".
pub fn team_key(team_name: &str) -> String {
    team_name.trim().replace(' ', "_")
}

/// Whether `name` is the cache table of a directory team.
pub fn is_team_key(name: &str) -> bool {
    NBA_TEAMS.iter().any(|t| team_key(t.full_name) == name)
}

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join("teams.sqlite"))
}

pub struct SqliteStatsStore {
    conn: Connection,
}

impl SqliteStatsStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create cache dir {}", parent.display()))?;
        }
        let conn =
            Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .context("set sqlite journal mode")?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl StatsStore for SqliteStatsStore {
    fn contains(&self, team_key: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![team_key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("look up cache table {team_key}"))?;
        Ok(found.is_some())
    }

    fn replace(&mut self, team_key: &str, stats: &CanonicalTeamStats) -> Result<()> {
        let table = quote_ident(team_key);
        let mut columns = vec![format!("{} INTEGER", quote_ident(INDEX_COLUMN))];
        let mut names = vec![quote_ident(INDEX_COLUMN)];
        let mut values = vec![SqlValue::Integer(0)];
        for field in STAT_FIELDS {
            let (sql_type, value) = match field.precision {
                Precision::Integer => (
                    "INTEGER",
                    stats
                        .get(field.column)
                        .map_or(SqlValue::Null, |v| SqlValue::Integer(v as i64)),
                ),
                Precision::Decimals(_) => (
                    "REAL",
                    stats
                        .get(field.column)
                        .map_or(SqlValue::Null, SqlValue::Real),
                ),
            };
            columns.push(format!("{} {sql_type}", quote_ident(field.column)));
            names.push(quote_ident(field.column));
            values.push(value);
        }
        columns.push(format!("{} TEXT", quote_ident(FETCHED_AT_COLUMN)));
        names.push(quote_ident(FETCHED_AT_COLUMN));
        values.push(SqlValue::Text(Utc::now().to_rfc3339()));

        let placeholders = (1..=values.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");

        let tx = self.conn.transaction().context("begin cache write")?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table}; CREATE TABLE {table} ({});",
            columns.join(", ")
        ))
        .with_context(|| format!("recreate cache table {team_key}"))?;
        tx.execute(
            &format!(
                "INSERT INTO {table} ({}) VALUES ({placeholders})",
                names.join(", ")
            ),
            params_from_iter(values),
        )
        .with_context(|| format!("insert cache row {team_key}"))?;
        tx.commit().context("commit cache write")?;
        Ok(())
    }

    fn read(&self, team_key: &str) -> Result<Option<CacheEntry>> {
        if !self.contains(team_key)? {
            return Ok(None);
        }
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {} LIMIT 1", quote_ident(team_key)))
            .with_context(|| format!("read cache table {team_key}"))?;
        let names = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let mut rows = stmt.query([]).context("query cache row")?;
        let Some(row) = rows.next().context("fetch cache row")? else {
            return Ok(None);
        };

        let mut stats = CanonicalTeamStats::default();
        let mut fetched_at = None;
        for (idx, name) in names.iter().enumerate() {
            let value: SqlValue = row.get(idx).context("read cache column")?;
            if name == FETCHED_AT_COLUMN {
                if let SqlValue::Text(ts) = value {
                    fetched_at = Some(ts);
                }
            } else if stat_field(name).is_some() {
                stats.set(name, sql_as_f64(&value));
            } else {
                debug!(team = team_key, column = %name, "stripping cache column");
            }
        }
        if stats.present_fields() == 0 {
            debug!(team = team_key, "cache row has no readable stats");
            return Ok(None);
        }

        Ok(Some(CacheEntry {
            team_key: team_key.to_string(),
            stats,
            fetched_at,
        }))
    }

    fn remove(&mut self, team_key: &str) -> Result<bool> {
        if !is_team_key(team_key) || !self.contains(team_key)? {
            return Ok(false);
        }
        self.conn
            .execute_batch(&format!("DROP TABLE IF EXISTS {};", quote_ident(team_key)))
            .with_context(|| format!("drop cache table {team_key}"))?;
        Ok(true)
    }

    fn clear(&mut self) -> Result<usize> {
        let keys = self.keys()?;
        let tx = self.conn.transaction().context("begin cache clear")?;
        for key in &keys {
            tx.execute_batch(&format!("DROP TABLE IF EXISTS {};", quote_ident(key)))
                .with_context(|| format!("drop cache table {key}"))?;
        }
        tx.commit().context("commit cache clear")?;
        Ok(keys.len())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )
            .context("list cache tables")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .context("list cache tables")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("list cache tables")?;
        Ok(keys.into_iter().filter(|k| is_team_key(k)).collect())
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn sql_as_f64(value: &SqlValue) -> Option<f64> {
    match value {
        SqlValue::Integer(i) => Some(*i as f64),
        SqlValue::Real(f) => Some(*f),
        SqlValue::Text(s) => s.trim().parse::<f64>().ok(),
        SqlValue::Null | SqlValue::Blob(_) => None,
    }
}
