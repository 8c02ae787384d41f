use std::fs;
use std::path::PathBuf;

use hoops_hustler::nba_stats::{
    parse_team_dashboard_json, parse_team_game_log_json, parse_team_roster_json,
};
use hoops_hustler::normalize::normalize;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn dashboard_uses_overall_split() {
    let raw = read_fixture("team_dashboard.json");
    let rec = parse_team_dashboard_json(&raw).expect("fixture should parse");
    assert_eq!(rec.len(), 29);
    assert_eq!(rec.get("GROUP_SET").and_then(|v| v.as_str()), Some("Overall"));
    assert_eq!(rec.get("W").and_then(|v| v.as_i64()), Some(50));
}

#[test]
fn dashboard_normalizes_to_canonical_record() {
    let raw = read_fixture("team_dashboard.json");
    let stats = normalize(&parse_team_dashboard_json(&raw).expect("fixture should parse"));
    assert_eq!(stats.wins, Some(50));
    assert_eq!(stats.losses, Some(32));
    assert_eq!(stats.ppg, Some(112.67));
    assert_eq!(stats.fg_pct, Some(0.485));
    assert_eq!(stats.fg3_pct, Some(0.373));
    assert_eq!(stats.ft_pct, Some(0.789));
    assert_eq!(stats.rebounds, Some(44.3));
    assert_eq!(stats.assists, Some(29.5));
    assert_eq!(stats.steals, Some(8.8));
    assert_eq!(stats.blocks, Some(4.6));
    assert_eq!(stats.turnovers, Some(13.8));
}

#[test]
fn dashboard_without_steals_header_keeps_other_fields() {
    let raw = read_fixture("team_dashboard.json").replace("\"STL\"", "\"STL_RENAMED\"");
    let stats = normalize(&parse_team_dashboard_json(&raw).expect("fixture should parse"));
    assert_eq!(stats.steals, None);
    assert_eq!(stats.wins, Some(50));
    assert_eq!(stats.blocks, Some(4.6));
    assert!(stats.has_core_fields());
}

#[test]
fn malformed_dashboard_is_an_error() {
    assert!(parse_team_dashboard_json("{not json").is_err());
    assert!(parse_team_dashboard_json("").is_err());
    assert!(parse_team_dashboard_json(r#"{"resultSets": [{"name": "X"}]}"#).is_err());
    assert!(
        parse_team_dashboard_json(r#"{"resultSets": [{"headers": [1], "rowSet": [[1]]}]}"#)
            .is_err()
    );
}

#[test]
fn roster_skips_rows_without_player_id() {
    let raw = read_fixture("team_roster.json");
    let roster = parse_team_roster_json(&raw).expect("fixture should parse");
    assert_eq!(roster.len(), 2);
    assert_eq!(roster[0].player_id, 203999);
    assert_eq!(roster[0].name, "Nikola Jokic");
    assert_eq!(roster[0].number.as_deref(), Some("15"));
    assert_eq!(roster[0].age, Some(29.0));
    assert_eq!(roster[1].school.as_deref(), Some("Kentucky"));
}

#[test]
fn game_log_reads_mixed_case_headers() {
    let raw = read_fixture("team_game_log.json");
    let games = parse_team_game_log_json(&raw).expect("fixture should parse");
    assert_eq!(games.len(), 2);
    assert_eq!(games[0].game_id, "0022400062");
    assert_eq!(games[0].matchup.as_deref(), Some("DEN @ LAC"));
    assert_eq!(games[0].result.as_deref(), Some("L"));
    assert_eq!(games[0].losses, Some(2));
    assert_eq!(games[1].points, Some(87));
    assert_eq!(games[1].fg_pct, Some(0.411));
}
