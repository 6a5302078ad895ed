pub mod aggregator;
pub mod models;
pub mod repository;
pub mod service;

pub use aggregator::{aggregate, RankedPlayer};
pub use service::RankingEntry;
