use thiserror::Error;

/// Why a stats lookup produced no record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error("unknown team: {0}")]
    UnknownTeam(String),

    #[error("stats provider failed for {team}: {message}")]
    Provider { team: String, message: String },

    #[error("stats cache error: {0}")]
    Cache(String),
}

impl StatsError {
    pub(crate) fn provider(team: &str, err: &anyhow::Error) -> Self {
        Self::Provider {
            team: team.to_string(),
            message: format!("{err:#}"),
        }
    }

    pub(crate) fn cache(err: &anyhow::Error) -> Self {
        Self::Cache(format!("{err:#}"))
    }
}
