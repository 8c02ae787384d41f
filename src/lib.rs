pub mod compare;
pub mod config;
pub mod error;
pub mod fake_provider;
pub mod http_client;
pub mod nba_stats;
pub mod normalize;
pub mod service;
pub mod stats_cache;
pub mod teams;
