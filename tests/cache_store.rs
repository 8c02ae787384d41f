use anyhow::{Result, anyhow};

use hoops_hustler::nba_stats::{GameRecord, PlayerRecord, StatsProvider};
use hoops_hustler::normalize::{CanonicalTeamStats, RawStatsRecord};
use hoops_hustler::service::StatsService;
use hoops_hustler::stats_cache::{SqliteStatsStore, StatsStore, team_key};
use hoops_hustler::teams::TeamId;

struct OfflineProvider;

impl StatsProvider for OfflineProvider {
    fn team_dashboard(&self, team_id: TeamId) -> Result<RawStatsRecord> {
        Err(anyhow!("unexpected dashboard call for {team_id}"))
    }

    fn team_roster(&self, _team_id: TeamId) -> Result<Vec<PlayerRecord>> {
        Ok(Vec::new())
    }

    fn team_game_log(&self, _team_id: TeamId, _season: &str) -> Result<Vec<GameRecord>> {
        Ok(Vec::new())
    }
}

fn sample() -> CanonicalTeamStats {
    CanonicalTeamStats {
        wins: Some(50),
        losses: Some(32),
        ppg: Some(110.5),
        fg_pct: Some(0.485),
        fg3_pct: Some(0.37),
        ft_pct: Some(0.8),
        rebounds: Some(45.2),
        assists: Some(24.8),
        steals: Some(7.5),
        blocks: Some(4.3),
        turnovers: Some(12.8),
    }
}

#[test]
fn entries_survive_reopening_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("teams.sqlite");
    {
        let mut store = SqliteStatsStore::open(&path).expect("open");
        store
            .replace(&team_key("Boston Celtics"), &sample())
            .expect("write");
    }
    let store = SqliteStatsStore::open(&path).expect("reopen");
    let entry = store
        .read("Boston_Celtics")
        .expect("read")
        .expect("entry present");
    assert_eq!(entry.stats, sample());
    assert_eq!(store.keys().expect("keys"), vec!["Boston_Celtics".to_string()]);
}

#[test]
fn replace_does_not_merge_with_previous_row() {
    let mut store = SqliteStatsStore::open_in_memory().expect("open");
    store.replace("Utah_Jazz", &sample()).expect("first write");

    let sparse = CanonicalTeamStats {
        wins: Some(10),
        losses: Some(5),
        ..Default::default()
    };
    store.replace("Utah_Jazz", &sparse).expect("second write");

    let entry = store.read("Utah_Jazz").expect("read").expect("entry");
    assert_eq!(entry.stats, sparse);
    let rows: i64 = store
        .connection()
        .query_row("SELECT COUNT(*) FROM \"Utah_Jazz\"", [], |row| row.get(0))
        .expect("count");
    assert_eq!(rows, 1);
}

#[test]
fn missing_table_and_empty_table_are_misses() {
    let store = SqliteStatsStore::open_in_memory().expect("open");
    assert!(store.read("Miami_Heat").expect("read").is_none());
    assert!(!store.contains("Miami_Heat").expect("contains"));

    store
        .connection()
        .execute_batch("CREATE TABLE \"Miami_Heat\" (wins INTEGER);")
        .expect("create");
    assert!(store.contains("Miami_Heat").expect("contains"));
    assert!(store.read("Miami_Heat").expect("read").is_none());
}

#[test]
fn legacy_rows_have_index_column_stripped() {
    let store = SqliteStatsStore::open_in_memory().expect("open");
    store
        .connection()
        .execute_batch(
            r#"
            CREATE TABLE "Los_Angeles_Lakers"
                ("index" INTEGER, wins INTEGER, losses INTEGER, ppg REAL);
            INSERT INTO "Los_Angeles_Lakers" VALUES (0, 47, 35, 116.333);
            "#,
        )
        .expect("seed legacy table");
    assert!(store.read("Los_Angeles_Lakers").expect("read").is_some());

    let mut svc = StatsService::new(OfflineProvider, store, "2024-25");
    let stats = svc.get_team_stats("Los Angeles Lakers").expect("cached stats");
    assert_eq!(
        stats,
        CanonicalTeamStats {
            wins: Some(47),
            losses: Some(35),
            ppg: Some(116.33),
            ..Default::default()
        }
    );

    let entry = svc
        .cached_team_stats("Los Angeles Lakers")
        .expect("read")
        .expect("entry");
    assert_eq!(entry.fetched_at, None);
    assert!(svc.store_mut().remove("Los_Angeles_Lakers").expect("remove"));
}

#[test]
fn rows_without_readable_stats_are_misses() {
    let store = SqliteStatsStore::open_in_memory().expect("open");
    store
        .connection()
        .execute_batch(
            r#"
            CREATE TABLE "Boston_Celtics" (garbage TEXT);
            INSERT INTO "Boston_Celtics" VALUES ('oops');
            CREATE TABLE "Utah_Jazz" (wins TEXT, losses TEXT, ppg TEXT);
            INSERT INTO "Utah_Jazz" VALUES ('abc', 'n/a', '');
            CREATE TABLE "Miami_Heat" (wins TEXT, losses TEXT, ppg TEXT);
            INSERT INTO "Miami_Heat" VALUES ('12', 'x', '101.5');
            "#,
        )
        .expect("seed malformed tables");

    assert!(store.read("Boston_Celtics").expect("read").is_none());
    assert!(store.read("Utah_Jazz").expect("read").is_none());

    let partial = store.read("Miami_Heat").expect("read").expect("entry");
    assert_eq!(partial.stats.wins, Some(12));
    assert_eq!(partial.stats.losses, None);
    assert_eq!(partial.stats.ppg, Some(101.5));
}

#[test]
fn clear_leaves_unrelated_tables_alone() {
    let mut store = SqliteStatsStore::open_in_memory().expect("open");
    store.replace("Utah_Jazz", &sample()).expect("write");
    store
        .connection()
        .execute_batch("CREATE TABLE settings (k TEXT); INSERT INTO settings VALUES ('theme');")
        .expect("seed unrelated table");

    assert_eq!(store.keys().expect("keys"), vec!["Utah_Jazz".to_string()]);
    assert!(!store.remove("settings").expect("remove"));
    assert_eq!(store.clear().expect("clear"), 1);

    let rows: i64 = store
        .connection()
        .query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))
        .expect("settings survive");
    assert_eq!(rows, 1);
    assert!(!store.contains("Utah_Jazz").expect("contains"));
}

#[test]
fn team_names_with_quotes_are_safe_table_names() {
    let mut store = SqliteStatsStore::open_in_memory().expect("open");
    let key = team_key("Team \"Drop\" Tables");
    store.replace(&key, &sample()).expect("write");
    assert_eq!(store.read(&key).expect("read").map(|e| e.stats), Some(sample()));
    assert!(store.keys().expect("keys").is_empty());
    assert_eq!(store.clear().expect("clear"), 0);
}
