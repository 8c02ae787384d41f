use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hoops_hustler::compare::{compare_teams, render_table};
use hoops_hustler::config::{AppConfig, is_valid_season};
use hoops_hustler::error::StatsError;
use hoops_hustler::fake_provider::FakeStatsProvider;
use hoops_hustler::nba_stats::{NbaStatsClient, StatsProvider};
use hoops_hustler::service::StatsService;
use hoops_hustler::stats_cache::SqliteStatsStore;
use hoops_hustler::teams;

type Service = StatsService<Box<dyn StatsProvider>, SqliteStatsStore>;

#[derive(Parser, Debug)]
#[command(name = "hoops_hustler", about = "NBA team showdown: cached season stats side by side")]
struct Cli {
    /// SQLite cache file (defaults to HOOPS_DB_PATH or the user cache dir)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Season as YYYY-YY (defaults to NBA_SEASON or the current season)
    #[arg(long, global = true)]
    season: Option<String>,

    /// Use generated stats instead of stats.nba.com
    #[arg(long, global = true, env = "HOOPS_OFFLINE")]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every team name the resolver accepts
    Teams,
    /// Print one team's canonical stats as JSON
    Stats {
        team: String,
        #[arg(long)]
        refresh: bool,
    },
    /// Compare two teams
    Compare {
        first: String,
        second: String,
        #[arg(long)]
        refresh: bool,
        #[arg(long)]
        json: bool,
    },
    /// Current roster
    Roster { team: String },
    /// Game-by-game log
    History {
        team: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Drop cached stats for one team, or for all teams
    ClearCache { team: Option<String> },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(season) = cli.season {
        if !is_valid_season(&season) {
            return Err(anyhow!("season must look like 2024-25, got {season}"));
        }
        config.season = season;
    }
    config.offline |= cli.offline;

    if let Command::Teams = cli.command {
        for name in teams::team_names() {
            println!("{name}");
        }
        return Ok(());
    }

    let mut service = build_service(&config)?;
    match cli.command {
        Command::Teams => {}
        Command::Stats { team, refresh } => {
            let stats = lookup(&mut service, &team, refresh).map_err(no_data)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Compare {
            first,
            second,
            refresh,
            json,
        } => {
            let (a, b) = match (
                lookup(&mut service, &first, refresh),
                lookup(&mut service, &second, refresh),
            ) {
                (Ok(a), Ok(b)) => (a, b),
                (Err(err), _) | (_, Err(err)) => return Err(no_data(err)),
            };
            let first = display_name(&first);
            let second = display_name(&second);
            if json {
                let mut out = serde_json::Map::new();
                out.insert(first, serde_json::to_value(&a)?);
                out.insert(second, serde_json::to_value(&b)?);
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                let cmp = compare_teams(&first, &a, &second, &b)?;
                print!("{}", render_table(&cmp));
            }
        }
        Command::Roster { team } => {
            let roster = service.get_team_roster(&team);
            if roster.is_empty() {
                println!("No roster found for {team}.");
            }
            for p in roster {
                println!(
                    "{:>3}  {:<28} {:<4} {:>5}  {}",
                    p.number.as_deref().unwrap_or("-"),
                    p.name,
                    p.position.as_deref().unwrap_or("-"),
                    p.height.as_deref().unwrap_or("-"),
                    p.experience.as_deref().unwrap_or("-"),
                );
            }
        }
        Command::History { team, limit } => {
            let Some(games) = service.get_team_history(&team, None) else {
                return Err(anyhow!("Couldn't fetch the game log for {team}."));
            };
            for g in games.iter().take(limit) {
                println!(
                    "{:<14} {:<14} {:<2} {:>4}  ({}-{})",
                    g.game_date.as_deref().unwrap_or("-"),
                    g.matchup.as_deref().unwrap_or("-"),
                    g.result.as_deref().unwrap_or("-"),
                    g.points.map_or("-".to_string(), |p| p.to_string()),
                    g.wins.unwrap_or_default(),
                    g.losses.unwrap_or_default(),
                );
            }
        }
        Command::ClearCache { team } => match team {
            Some(team) => {
                let removed = service.forget(&team)?;
                println!(
                    "{}",
                    if removed {
                        format!("Cleared cached stats for {team}.")
                    } else {
                        format!("Nothing cached for {team}.")
                    }
                );
            }
            None => {
                let n = service.clear_cache()?;
                println!("Cleared {n} cached team(s).");
            }
        },
    }
    Ok(())
}

fn build_service(config: &AppConfig) -> Result<Service> {
    let store = SqliteStatsStore::open(&config.db_path)
        .with_context(|| format!("open stats cache {}", config.db_path.display()))?;
    let provider: Box<dyn StatsProvider> = if config.offline {
        Box::new(FakeStatsProvider::new())
    } else {
        Box::new(NbaStatsClient::new(&config.stats_base_url, &config.season)?)
    };
    Ok(StatsService::new(provider, store, config.season.clone()))
}

fn lookup(
    service: &mut Service,
    team: &str,
    refresh: bool,
) -> Result<hoops_hustler::normalize::CanonicalTeamStats, StatsError> {
    if refresh {
        service.refresh_team_stats(team)
    } else {
        service.get_team_stats(team)
    }
}

fn display_name(input: &str) -> String {
    teams::find_team(input).map_or_else(|| input.to_string(), |t| t.full_name.to_string())
}

fn no_data(err: StatsError) -> anyhow::Error {
    anyhow!("Couldn't fetch stats. Check team names! ({err})")
}
