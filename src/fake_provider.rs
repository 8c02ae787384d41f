use anyhow::{Result, anyhow};
use chrono::{Duration as ChronoDuration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

use crate::nba_stats::{GameRecord, PlayerRecord, StatsProvider};
use crate::normalize::RawStatsRecord;
use crate::teams::{NBA_TEAMS, TeamId};

const ROSTER_SIZE: usize = 15;
const POSITIONS: &[&str] = &["G", "G", "G-F", "F", "F", "F-C", "C"];
const FIRST_NAMES: &[&str] = &[
    "Marcus", "Jalen", "Tyrese", "Devin", "Andre", "Luka", "Cole", "Zion", "Miles", "Trey",
    "Darius", "Keon", "Jaren", "Evan", "Scottie",
];
const LAST_NAMES: &[&str] = &[
    "Walker", "Brooks", "Harper", "Mitchell", "Reed", "Hayes", "Bennett", "Porter", "Grant",
    "Ellis", "Coleman", "Foster", "Hughes", "Price", "Sutton",
];

/// Offline stand-in for the stats API. Output depends only on the team id
/// (and season for game logs), so repeated calls agree with each other.
#[derive(Debug, Clone, Default)]
pub struct FakeStatsProvider {
    games_played: Option<u32>,
}

impl FakeStatsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_games_played(games: u32) -> Self {
        Self {
            games_played: Some(games.clamp(1, 82)),
        }
    }

    fn known(team_id: TeamId) -> Result<()> {
        if NBA_TEAMS.iter().any(|t| t.id == team_id) {
            Ok(())
        } else {
            Err(anyhow!("no such team id {team_id}"))
        }
    }
}

impl StatsProvider for FakeStatsProvider {
    fn team_dashboard(&self, team_id: TeamId) -> Result<RawStatsRecord> {
        Self::known(team_id)?;
        let mut rng = StdRng::seed_from_u64(u64::from(team_id));
        let gp = self.games_played.unwrap_or(82);
        let wins = rng.gen_range(0..=gp);
        let fga: f64 = rng.gen_range(84.0..93.0);
        let fg_pct: f64 = rng.gen_range(0.43..0.50);
        let fg3a: f64 = rng.gen_range(30.0..42.0);
        let fg3_pct: f64 = rng.gen_range(0.33..0.39);
        let fta: f64 = rng.gen_range(18.0..26.0);
        let ft_pct: f64 = rng.gen_range(0.74..0.84);
        let fgm = fga * fg_pct;
        let fg3m = fg3a * fg3_pct;
        let ftm = fta * ft_pct;
        let pts = 2.0 * fgm + fg3m + ftm;

        let headers = [
            "GROUP_SET", "GROUP_VALUE", "SEASON_YEAR", "GP", "W", "L", "W_PCT", "FGM", "FGA",
            "FG_PCT", "FG3M", "FG3A", "FG3_PCT", "FTM", "FTA", "FT_PCT", "REB", "AST", "TOV",
            "STL", "BLK", "PTS",
        ];
        let row = [
            json!("Overall"),
            json!("Overall"),
            json!("offline"),
            json!(gp),
            json!(wins),
            json!(gp - wins),
            json!(f64::from(wins) / f64::from(gp)),
            json!(fgm),
            json!(fga),
            json!(fg_pct),
            json!(fg3m),
            json!(fg3a),
            json!(fg3_pct),
            json!(ftm),
            json!(fta),
            json!(ft_pct),
            json!(rng.gen_range(40.0..48.0)),
            json!(rng.gen_range(22.0..30.0)),
            json!(rng.gen_range(11.0..16.0)),
            json!(rng.gen_range(6.0..9.5)),
            json!(rng.gen_range(3.5..6.5)),
            json!(pts),
        ];
        let headers = headers.iter().map(|h| h.to_string()).collect::<Vec<_>>();
        Ok(RawStatsRecord::from_headers_row(&headers, &row))
    }

    fn team_roster(&self, team_id: TeamId) -> Result<Vec<PlayerRecord>> {
        Self::known(team_id)?;
        let mut rng = StdRng::seed_from_u64(u64::from(team_id) ^ 0x5eed);
        let mut numbers = Vec::new();
        let mut out = Vec::with_capacity(ROSTER_SIZE);
        for idx in 0..ROSTER_SIZE {
            let mut number = rng.gen_range(0..100u32);
            while numbers.contains(&number) {
                number = (number + 1) % 100;
            }
            numbers.push(number);
            let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
            let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
            let inches = rng.gen_range(73..86u32);
            out.push(PlayerRecord {
                player_id: u64::from(team_id) * 100 + idx as u64,
                name: format!("{first} {last}"),
                number: Some(number.to_string()),
                position: Some(POSITIONS[rng.gen_range(0..POSITIONS.len())].to_string()),
                height: Some(format!("{}-{}", inches / 12, inches % 12)),
                weight: Some(rng.gen_range(180..270u32).to_string()),
                age: Some(f64::from(rng.gen_range(19..37u32))),
                experience: Some(rng.gen_range(0..15u32).to_string()),
                school: None,
                birth_date: None,
            });
        }
        Ok(out)
    }

    fn team_game_log(&self, team_id: TeamId, season: &str) -> Result<Vec<GameRecord>> {
        Self::known(team_id)?;
        let start_year = season
            .split('-')
            .next()
            .and_then(|y| y.trim().parse::<i32>().ok())
            .ok_or_else(|| anyhow!("bad season {season}"))?;
        let opener = NaiveDate::from_ymd_opt(start_year, 10, 22)
            .ok_or_else(|| anyhow!("bad season {season}"))?;
        let mut rng = StdRng::seed_from_u64(u64::from(team_id) ^ (start_year as u64) << 32);
        let abbr = NBA_TEAMS
            .iter()
            .find(|t| t.id == team_id)
            .map(|t| t.abbreviation)
            .unwrap_or("???");

        let gp = self.games_played.unwrap_or(82);
        let (mut wins, mut losses) = (0i64, 0i64);
        let mut out = Vec::with_capacity(gp as usize);
        for game in 0..gp {
            let opp = loop {
                let pick = &NBA_TEAMS[rng.gen_range(0..NBA_TEAMS.len())];
                if pick.id != team_id {
                    break pick.abbreviation;
                }
            };
            let won = rng.gen_bool(0.5);
            if won {
                wins += 1;
            } else {
                losses += 1;
            }
            let home = rng.gen_bool(0.5);
            let date = opener + ChronoDuration::days(i64::from(game) * 2);
            out.push(GameRecord {
                game_id: format!("002{:02}{:05}", start_year % 100, game + 1),
                game_date: Some(date.format("%b %d, %Y").to_string().to_uppercase()),
                matchup: Some(if home {
                    format!("{abbr} vs. {opp}")
                } else {
                    format!("{abbr} @ {opp}")
                }),
                result: Some(if won { "W" } else { "L" }.to_string()),
                wins: Some(wins),
                losses: Some(losses),
                points: Some(rng.gen_range(95..135)),
                rebounds: Some(rng.gen_range(35..55)),
                assists: Some(rng.gen_range(18..34)),
                fg_pct: Some(rng.gen_range(0.40..0.55)),
            });
        }
        // Most recent first, as the game log endpoint returns it.
        out.reverse();
        Ok(out)
    }
}
