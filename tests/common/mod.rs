use std::sync::Arc;

use scorecast_backend::scoring::{
    InMemoryStore, ScoringPipeline, StandingsRanker, TournamentStore,
};
use scorecast_backend::services::CacheInvalidator;

/// Test rig around the in-memory store: the same pipeline wiring the server
/// uses, minus Postgres and Redis.
pub struct TestHarness {
    pub store: InMemoryStore,
    pub store_dyn: Arc<dyn TournamentStore>,
    pub pipeline: ScoringPipeline,
    pub ranker: StandingsRanker,
}

pub fn harness() -> TestHarness {
    let store = InMemoryStore::new();
    let store_dyn: Arc<dyn TournamentStore> = Arc::new(store.clone());
    let pipeline = ScoringPipeline::new(store_dyn.clone(), CacheInvalidator::new(None));
    let ranker = StandingsRanker::new(store_dyn.clone());
    TestHarness {
        store,
        store_dyn,
        pipeline,
        ranker,
    }
}
