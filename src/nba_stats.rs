use anyhow::{Context, Result, anyhow};
use reqwest::Url;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::http_client::{fetch_json, http_client};
use crate::normalize::{RawStatsRecord, value_as_f64};
use crate::teams::TeamId;

pub const NBA_STATS_BASE_URL: &str = "https://stats.nba.com/stats";

const DASHBOARD_SET: &str = "OverallTeamDashboard";
const ROSTER_SET: &str = "CommonTeamRoster";
const GAME_LOG_SET: &str = "TeamGameLog";

const NBA_HEADERS: &[(&str, &str)] = &[
    ("Accept", "application/json, text/plain, */*"),
    ("Accept-Language", "en-US,en;q=0.9"),
    ("Referer", "https://www.nba.com/"),
    ("Origin", "https://www.nba.com"),
    ("x-nba-stats-origin", "stats"),
    ("x-nba-stats-token", "true"),
];

/// Source of raw team statistics. Every call goes to the source of truth.
pub trait StatsProvider {
    /// Current-season general-splits aggregate for one team.
    fn team_dashboard(&self, team_id: TeamId) -> Result<RawStatsRecord>;

    fn team_roster(&self, team_id: TeamId) -> Result<Vec<PlayerRecord>>;

    fn team_game_log(&self, team_id: TeamId, season: &str) -> Result<Vec<GameRecord>>;
}

impl<T: StatsProvider + ?Sized> StatsProvider for Box<T> {
    fn team_dashboard(&self, team_id: TeamId) -> Result<RawStatsRecord> {
        (**self).team_dashboard(team_id)
    }

    fn team_roster(&self, team_id: TeamId) -> Result<Vec<PlayerRecord>> {
        (**self).team_roster(team_id)
    }

    fn team_game_log(&self, team_id: TeamId, season: &str) -> Result<Vec<GameRecord>> {
        (**self).team_game_log(team_id, season)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub player_id: u64,
    pub name: String,
    pub number: Option<String>,
    pub position: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub age: Option<f64>,
    pub experience: Option<String>,
    pub school: Option<String>,
    pub birth_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: String,
    pub game_date: Option<String>,
    pub matchup: Option<String>,
    pub result: Option<String>,
    pub wins: Option<i64>,
    pub losses: Option<i64>,
    pub points: Option<i64>,
    pub rebounds: Option<i64>,
    pub assists: Option<i64>,
    pub fg_pct: Option<f64>,
}

pub struct NbaStatsClient {
    client: &'static Client,
    base_url: String,
    season: String,
}

impl NbaStatsClient {
    pub fn new(base_url: &str, season: &str) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            season: season.to_string(),
        })
    }

    fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String> {
        let url = Url::parse_with_params(&format!("{}/{endpoint}", self.base_url), params)
            .with_context(|| format!("invalid {endpoint} url"))?;
        debug!(%url, "stats request");
        fetch_json(self.client, url.as_str(), NBA_HEADERS)
            .with_context(|| format!("{endpoint} request failed"))
    }
}

impl StatsProvider for NbaStatsClient {
    fn team_dashboard(&self, team_id: TeamId) -> Result<RawStatsRecord> {
        let team_id = team_id.to_string();
        let body = self.get(
            "teamdashboardbygeneralsplits",
            &[
                ("DateFrom", ""),
                ("DateTo", ""),
                ("GameSegment", ""),
                ("LastNGames", "0"),
                ("LeagueID", "00"),
                ("Location", ""),
                ("MeasureType", "Base"),
                ("Month", "0"),
                ("OpponentTeamID", "0"),
                ("Outcome", ""),
                ("PORound", "0"),
                ("PaceAdjust", "N"),
                ("PerMode", "PerGame"),
                ("Period", "0"),
                ("PlusMinus", "N"),
                ("Rank", "N"),
                ("Season", self.season.as_str()),
                ("SeasonSegment", ""),
                ("SeasonType", "Regular Season"),
                ("ShotClockRange", ""),
                ("TeamID", team_id.as_str()),
                ("VsConference", ""),
                ("VsDivision", ""),
            ],
        )?;
        parse_team_dashboard_json(&body)
    }

    fn team_roster(&self, team_id: TeamId) -> Result<Vec<PlayerRecord>> {
        let team_id = team_id.to_string();
        let body = self.get(
            "commonteamroster",
            &[
                ("LeagueID", "00"),
                ("Season", self.season.as_str()),
                ("TeamID", team_id.as_str()),
            ],
        )?;
        parse_team_roster_json(&body)
    }

    fn team_game_log(&self, team_id: TeamId, season: &str) -> Result<Vec<GameRecord>> {
        let team_id = team_id.to_string();
        let body = self.get(
            "teamgamelog",
            &[
                ("DateFrom", ""),
                ("DateTo", ""),
                ("LeagueID", "00"),
                ("Season", season),
                ("SeasonType", "Regular Season"),
                ("TeamID", team_id.as_str()),
            ],
        )?;
        parse_team_game_log_json(&body)
    }
}

/// First row of the dashboard's overall split. Also accepts a flat keyed object.
pub fn parse_team_dashboard_json(raw: &str) -> Result<RawStatsRecord> {
    let v = parse_body(raw)?.ok_or_else(|| anyhow!("empty stats response"))?;
    if !has_result_sets(&v) {
        return flat_record(&v);
    }
    let rows = rows_from_value(&v, DASHBOARD_SET)?;
    rows.into_iter()
        .find(|rec| !rec.is_empty())
        .ok_or_else(|| anyhow!("stats response has no rows"))
}

pub fn parse_team_roster_json(raw: &str) -> Result<Vec<PlayerRecord>> {
    let Some(v) = parse_body(raw)? else {
        return Ok(Vec::new());
    };
    let rows = rows_from_value(&v, ROSTER_SET)?;
    Ok(rows.iter().filter_map(player_from_row).collect())
}

pub fn parse_team_game_log_json(raw: &str) -> Result<Vec<GameRecord>> {
    let Some(v) = parse_body(raw)? else {
        return Ok(Vec::new());
    };
    let rows = rows_from_value(&v, GAME_LOG_SET)?;
    Ok(rows.iter().filter_map(game_from_row).collect())
}

fn parse_body(raw: &str) -> Result<Option<Value>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let v: Value = serde_json::from_str(trimmed).context("invalid stats json")?;
    Ok(Some(v))
}

fn has_result_sets(v: &Value) -> bool {
    v.get("resultSets").is_some() || v.get("resultSet").is_some()
}

/// All rows of the result set named `preferred`, else of the first set.
fn rows_from_value(v: &Value, preferred: &str) -> Result<Vec<RawStatsRecord>> {
    let sets: Vec<&Value> = match v.get("resultSets").or_else(|| v.get("resultSet")) {
        Some(Value::Array(arr)) => arr.iter().collect(),
        Some(obj @ Value::Object(_)) => vec![obj],
        _ => return Err(anyhow!("stats response has no result sets")),
    };
    let set = sets
        .iter()
        .find(|s| s.get("name").and_then(Value::as_str) == Some(preferred))
        .or_else(|| sets.first())
        .ok_or_else(|| anyhow!("stats response has no result sets"))?;

    let headers = set
        .get("headers")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("result set missing headers"))?
        .iter()
        .map(|h| {
            h.as_str()
                .map(str::to_string)
                .ok_or_else(|| anyhow!("non-string header"))
        })
        .collect::<Result<Vec<_>>>()?;
    let rows = set
        .get("rowSet")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("result set missing rowSet"))?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let cells = row
            .as_array()
            .ok_or_else(|| anyhow!("rowSet entry is not an array"))?;
        out.push(RawStatsRecord::from_headers_row(&headers, cells));
    }
    Ok(out)
}

fn flat_record(v: &Value) -> Result<RawStatsRecord> {
    let obj = v
        .as_object()
        .ok_or_else(|| anyhow!("stats response is not an object"))?;
    let fields = obj
        .iter()
        .filter(|(_, value)| !value.is_array() && !value.is_object())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect::<Vec<_>>();
    if fields.is_empty() {
        return Err(anyhow!("stats response has no scalar fields"));
    }
    Ok(RawStatsRecord::from_pairs(fields))
}

fn player_from_row(row: &RawStatsRecord) -> Option<PlayerRecord> {
    let player_id = any_f64(row, &["PLAYER_ID"])?;
    if player_id < 0.0 {
        return None;
    }
    Some(PlayerRecord {
        player_id: player_id as u64,
        name: any_string(row, &["PLAYER"])?,
        number: any_string(row, &["NUM"]),
        position: any_string(row, &["POSITION"]),
        height: any_string(row, &["HEIGHT"]),
        weight: any_string(row, &["WEIGHT"]),
        age: any_f64(row, &["AGE"]),
        experience: any_string(row, &["EXP"]),
        school: any_string(row, &["SCHOOL"]),
        birth_date: any_string(row, &["BIRTH_DATE"]),
    })
}

fn game_from_row(row: &RawStatsRecord) -> Option<GameRecord> {
    Some(GameRecord {
        game_id: any_string(row, &["Game_ID", "GAME_ID"])?,
        game_date: any_string(row, &["GAME_DATE"]),
        matchup: any_string(row, &["MATCHUP"]),
        result: any_string(row, &["WL"]),
        wins: any_f64(row, &["W"]).map(|v| v as i64),
        losses: any_f64(row, &["L"]).map(|v| v as i64),
        points: any_f64(row, &["PTS"]).map(|v| v as i64),
        rebounds: any_f64(row, &["REB"]).map(|v| v as i64),
        assists: any_f64(row, &["AST"]).map(|v| v as i64),
        fg_pct: any_f64(row, &["FG_PCT"]),
    })
}

fn any_f64(row: &RawStatsRecord, names: &[&str]) -> Option<f64> {
    names
        .iter()
        .find_map(|name| row.get(name).and_then(value_as_f64))
}

fn any_string(row: &RawStatsRecord, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        let rendered = match row.get(name)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!rendered.is_empty()).then_some(rendered)
    })
}
