pub mod aggregates;
pub mod engine;
pub mod errors;
pub mod locks;
pub mod memory;
pub mod pipeline;
pub mod rules;
pub mod standings;
pub mod store;

pub use aggregates::StatisticsMaintainer;
pub use engine::ScoringEngine;
pub use errors::{NotScorableReason, ScoringError};
pub use memory::InMemoryStore;
pub use pipeline::ScoringPipeline;
pub use standings::StandingsRanker;
pub use store::{StoreError, TournamentStore};
