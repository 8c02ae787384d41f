//! Read-through stats lookups: the persisted store first, the provider on a miss.

use anyhow::anyhow;
use tracing::{debug, info, warn};

use crate::error::StatsError;
use crate::nba_stats::{GameRecord, PlayerRecord, StatsProvider};
use crate::normalize::{CanonicalTeamStats, STAT_FIELDS, normalize};
use crate::stats_cache::{CacheEntry, StatsStore, team_key};
use crate::teams::{TeamId, find_team, resolve};

pub struct StatsService<P, S> {
    provider: P,
    store: S,
    season: String,
}

impl<P: StatsProvider, S: StatsStore> StatsService<P, S> {
    pub fn new(provider: P, store: S, season: impl Into<String>) -> Self {
        Self {
            provider,
            store,
            season: season.into(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn resolve(&self, team_name: &str) -> Option<TeamId> {
        resolve(team_name)
    }

    /// Cached record if present, otherwise a fresh fetch that is then persisted.
    pub fn get_team_stats(&mut self, team_name: &str) -> Result<CanonicalTeamStats, StatsError> {
        match self.cached_team_stats(team_name) {
            Ok(Some(entry)) if entry.stats.has_core_fields() => {
                debug!(team = team_name, "stats cache hit");
                return Ok(entry.stats);
            }
            Ok(Some(_)) => warn!(team = team_name, "cached stats incomplete; fetching"),
            Ok(None) => debug!(team = team_name, "stats cache miss"),
            Err(err) => warn!(team = team_name, %err, "stats cache read failed; fetching"),
        }
        self.refresh_team_stats(team_name)
    }

    /// Skips the cache read, fetches, and overwrites the team's entry.
    /// A response without wins, losses and ppg is rejected and leaves the entry as it was.
    pub fn refresh_team_stats(
        &mut self,
        team_name: &str,
    ) -> Result<CanonicalTeamStats, StatsError> {
        let Some(team_id) = self.resolve(team_name) else {
            return Err(StatsError::UnknownTeam(team_name.to_string()));
        };

        let raw = self
            .provider
            .team_dashboard(team_id)
            .map_err(|err| StatsError::provider(team_name, &err))?;
        let stats = normalize(&raw);
        if !stats.has_core_fields() {
            let err = anyhow!(
                "dashboard row maps {} of {} stats and lacks wins, losses or ppg",
                stats.present_fields(),
                STAT_FIELDS.len()
            );
            warn!(team = team_name, fields = raw.len(), "unusable stats response");
            return Err(StatsError::provider(team_name, &err));
        }
        info!(team = team_name, team_id, fields = raw.len(), "fetched team stats");

        let key = self.cache_key(team_name);
        if let Err(err) = self.store.replace(&key, &stats) {
            warn!(team = team_name, error = %format!("{err:#}"), "stats cache write failed");
        }
        Ok(stats)
    }

    /// Store-only lookup; never calls the provider.
    pub fn cached_team_stats(&self, team_name: &str) -> Result<Option<CacheEntry>, StatsError> {
        let key = self.cache_key(team_name);
        self.store.read(&key).map_err(|err| StatsError::cache(&err))
    }

    pub fn get_team_roster(&self, team_name: &str) -> Vec<PlayerRecord> {
        let Some(team_id) = self.resolve(team_name) else {
            return Vec::new();
        };
        match self.provider.team_roster(team_id) {
            Ok(players) => players,
            Err(err) => {
                warn!(team = team_name, error = %format!("{err:#}"), "roster fetch failed");
                Vec::new()
            }
        }
    }

    /// Game log for `season`, or the service's season when `None`.
    pub fn get_team_history(
        &self,
        team_name: &str,
        season: Option<&str>,
    ) -> Option<Vec<GameRecord>> {
        let team_id = self.resolve(team_name)?;
        let season = season.unwrap_or(&self.season);
        match self.provider.team_game_log(team_id, season) {
            Ok(games) => Some(games),
            Err(err) => {
                warn!(
                    team = team_name,
                    season,
                    error = %format!("{err:#}"),
                    "game log fetch failed"
                );
                None
            }
        }
    }

    pub fn forget(&mut self, team_name: &str) -> Result<bool, StatsError> {
        let key = self.cache_key(team_name);
        self.store.remove(&key).map_err(|err| StatsError::cache(&err))
    }

    pub fn clear_cache(&mut self) -> Result<usize, StatsError> {
        self.store.clear().map_err(|err| StatsError::cache(&err))
    }

    /// Directory spelling when the name resolves, so any casing shares one entry.
    fn cache_key(&self, team_name: &str) -> String {
        match find_team(team_name) {
            Some(team) => team_key(team.full_name),
            None => team_key(team_name),
        }
    }
}
