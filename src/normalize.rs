use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Provider result row as received: ordered `(header, value)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawStatsRecord {
    fields: Vec<(String, Value)>,
}

impl RawStatsRecord {
    pub fn from_pairs(fields: Vec<(String, Value)>) -> Self {
        Self { fields }
    }

    /// Zips a header list with one row. Extra cells or headers are ignored.
    pub fn from_headers_row(headers: &[String], row: &[Value]) -> Self {
        let fields = headers
            .iter()
            .zip(row.iter())
            .map(|(h, v)| (h.clone(), v.clone()))
            .collect();
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let idx = self.fields.iter().position(|(key, _)| key == name)?;
        Some(self.fields.remove(idx).1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Integer,
    Decimals(i32),
}

#[derive(Debug, Clone, Copy)]
pub struct StatField {
    /// Provider header name.
    pub source: &'static str,
    /// Canonical key, also the cache column name.
    pub column: &'static str,
    pub label: &'static str,
    pub precision: Precision,
}

const fn field(
    source: &'static str,
    column: &'static str,
    label: &'static str,
    precision: Precision,
) -> StatField {
    StatField {
        source,
        column,
        label,
        precision,
    }
}

pub const STAT_FIELDS: &[StatField] = &[
    field("W", "wins", "Wins", Precision::Integer),
    field("L", "losses", "Losses", Precision::Integer),
    field("PTS", "ppg", "PPG", Precision::Decimals(2)),
    field("FG_PCT", "fg_pct", "FG%", Precision::Decimals(3)),
    field("FG3_PCT", "fg3_pct", "3P%", Precision::Decimals(3)),
    field("FT_PCT", "ft_pct", "FT%", Precision::Decimals(3)),
    field("REB", "rebounds", "Rebounds", Precision::Decimals(1)),
    field("AST", "assists", "Assists", Precision::Decimals(1)),
    field("STL", "steals", "Steals", Precision::Decimals(1)),
    field("BLK", "blocks", "Blocks", Precision::Decimals(1)),
    field("TOV", "turnovers", "Turnovers", Precision::Decimals(1)),
];

pub fn stat_field(column: &str) -> Option<&'static StatField> {
    STAT_FIELDS.iter().find(|f| f.column == column)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalTeamStats {
    pub wins: Option<i64>,
    pub losses: Option<i64>,
    pub ppg: Option<f64>,
    pub fg_pct: Option<f64>,
    pub fg3_pct: Option<f64>,
    pub ft_pct: Option<f64>,
    pub rebounds: Option<f64>,
    pub assists: Option<f64>,
    pub steals: Option<f64>,
    pub blocks: Option<f64>,
    pub turnovers: Option<f64>,
}

impl CanonicalTeamStats {
    /// Value of a canonical column widened to `f64`.
    pub fn get(&self, column: &str) -> Option<f64> {
        match column {
            "wins" => self.wins.map(|v| v as f64),
            "losses" => self.losses.map(|v| v as f64),
            "ppg" => self.ppg,
            "fg_pct" => self.fg_pct,
            "fg3_pct" => self.fg3_pct,
            "ft_pct" => self.ft_pct,
            "rebounds" => self.rebounds,
            "assists" => self.assists,
            "steals" => self.steals,
            "blocks" => self.blocks,
            "turnovers" => self.turnovers,
            _ => None,
        }
    }

    /// Stores `value` under `column` at the column's precision.
    /// Returns false for an unknown column.
    pub fn set(&mut self, column: &str, value: Option<f64>) -> bool {
        let Some(field) = stat_field(column) else {
            return false;
        };
        let value = value.filter(|v| v.is_finite());
        match field.precision {
            Precision::Integer => {
                let v = value.map(|v| v.round() as i64);
                match column {
                    "wins" => self.wins = v,
                    "losses" => self.losses = v,
                    _ => return false,
                }
            }
            Precision::Decimals(places) => {
                let v = value.map(|v| round_to(v, places));
                let slot = match column {
                    "ppg" => &mut self.ppg,
                    "fg_pct" => &mut self.fg_pct,
                    "fg3_pct" => &mut self.fg3_pct,
                    "ft_pct" => &mut self.ft_pct,
                    "rebounds" => &mut self.rebounds,
                    "assists" => &mut self.assists,
                    "steals" => &mut self.steals,
                    "blocks" => &mut self.blocks,
                    "turnovers" => &mut self.turnovers,
                    _ => return false,
                };
                *slot = v;
            }
        }
        true
    }

    /// Wins, losses and points per game are all present.
    pub fn has_core_fields(&self) -> bool {
        self.wins.is_some() && self.losses.is_some() && self.ppg.is_some()
    }

    /// Number of the eleven fields that hold a value.
    pub fn present_fields(&self) -> usize {
        STAT_FIELDS
            .iter()
            .filter(|f| self.get(f.column).is_some())
            .count()
    }
}

pub fn normalize(raw: &RawStatsRecord) -> CanonicalTeamStats {
    let mut out = CanonicalTeamStats::default();
    for field in STAT_FIELDS {
        let value = raw.get(field.source).and_then(value_as_f64);
        out.set(field.column, value);
    }
    out
}

/// Half-away-from-zero rounding to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}
