// Challenge content
// Static, authored configuration: seed dataset, tables shown to learners and
// declarative grading rules. Loaded once at startup and never mutated.

pub mod challenges;
pub mod handlers;
pub mod schema;
pub mod seed;

use std::sync::Arc;

use tracing::debug;

use crate::grading::PredicateRegistry;

pub use schema::SqlChallenge;
pub use seed::{SeedDataset, SAMPLE_DATASET};

pub struct Catalog {
    challenges: Vec<Arc<SqlChallenge>>,
    seed: SeedDataset,
}

impl Catalog {
    pub fn new(challenges: Vec<SqlChallenge>, seed: SeedDataset) -> Self {
        Self {
            challenges: challenges.into_iter().map(Arc::new).collect(),
            seed,
        }
    }

    /// The built-in data analyst challenge set.
    pub fn builtin() -> Self {
        Self::new(challenges::sql_challenges(), SAMPLE_DATASET)
    }

    pub fn challenges(&self) -> &[Arc<SqlChallenge>] {
        &self.challenges
    }

    pub fn get(&self, id: &str) -> Option<Arc<SqlChallenge>> {
        self.challenges.iter().find(|c| c.id == id).cloned()
    }

    pub fn seed(&self) -> SeedDataset {
        self.seed
    }

    /// Registers the semantic rule of each challenge's graded test case.
    pub fn predicate_registry(&self) -> PredicateRegistry {
        let mut registry = PredicateRegistry::new();
        for challenge in &self.challenges {
            if let Some(rule) = challenge
                .primary_test_case()
                .and_then(|case| case.semantic.clone())
            {
                registry.register(&challenge.id, Arc::new(rule));
            }
        }
        debug!(predicates = registry.len(), "Predicate registry built");
        registry
    }
}
