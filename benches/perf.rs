use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use hoops_hustler::compare::{compare_teams, render_table};
use hoops_hustler::fake_provider::FakeStatsProvider;
use hoops_hustler::nba_stats::{StatsProvider, parse_team_dashboard_json, parse_team_roster_json};
use hoops_hustler::normalize::normalize;
use hoops_hustler::service::StatsService;
use hoops_hustler::stats_cache::SqliteStatsStore;

fn bench_dashboard_parse(c: &mut Criterion) {
    c.bench_function("dashboard_parse_normalize", |b| {
        b.iter(|| {
            let raw = parse_team_dashboard_json(black_box(DASHBOARD_JSON)).unwrap();
            black_box(normalize(&raw));
        })
    });
}

fn bench_roster_parse(c: &mut Criterion) {
    c.bench_function("roster_parse", |b| {
        b.iter(|| {
            let rows = parse_team_roster_json(black_box(ROSTER_JSON)).unwrap();
            black_box(rows.len());
        })
    });
}

fn bench_cache_hit(c: &mut Criterion) {
    let store = SqliteStatsStore::open_in_memory().unwrap();
    let mut svc = StatsService::new(FakeStatsProvider::new(), store, "2024-25");
    svc.get_team_stats("Boston Celtics").unwrap();

    c.bench_function("stats_cache_hit", |b| {
        b.iter(|| {
            let stats = svc.get_team_stats(black_box("Boston Celtics")).unwrap();
            black_box(stats.wins);
        })
    });
}

fn bench_cache_write(c: &mut Criterion) {
    let store = SqliteStatsStore::open_in_memory().unwrap();
    let mut svc = StatsService::new(FakeStatsProvider::new(), store, "2024-25");

    c.bench_function("stats_refresh_write", |b| {
        b.iter(|| {
            let stats = svc.refresh_team_stats(black_box("Utah Jazz")).unwrap();
            black_box(stats.ppg);
        })
    });
}

fn bench_compare(c: &mut Criterion) {
    let provider = FakeStatsProvider::new();
    let a = normalize(&provider.team_dashboard(1610612738).unwrap());
    let b = normalize(&provider.team_dashboard(1610612762).unwrap());

    c.bench_function("compare_render", |bench| {
        bench.iter(|| {
            let cmp = compare_teams("Boston Celtics", black_box(&a), "Utah Jazz", black_box(&b))
                .unwrap();
            black_box(render_table(&cmp).len());
        })
    });
}

criterion_group!(
    perf,
    bench_dashboard_parse,
    bench_roster_parse,
    bench_cache_hit,
    bench_cache_write,
    bench_compare
);
criterion_main!(perf);

static DASHBOARD_JSON: &str = include_str!("../tests/fixtures/team_dashboard.json");
static ROSTER_JSON: &str = include_str!("../tests/fixtures/team_roster.json");
