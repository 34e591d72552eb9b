use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::error::{ClusterError, Result};
use crate::metric::MetricKind;
use crate::world::EntityCategory;

/// Configuration options for regional clustering.
#[derive(Debug, Clone)]
pub struct ClusteringConfig {
    /// Number of clusters to build.
    pub k: usize,
    /// Iteration budget of the offline (precompute) phase.
    pub precompute_iterations: usize,
    /// Iteration budget of the online (refine) phase.
    pub refine_iterations: usize,
    /// Whether mobile agents are distributed over the clusters after each run.
    pub assign_agents: bool,
    /// Seed for center sampling. `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Upper bound on random draws while sampling distinct initial centers.
    pub max_sampling_attempts: usize,
    /// Categories forming the clustered universe. Must be area-like.
    pub universe: Vec<EntityCategory>,
    /// Agent categories, each distributed in its own round-robin pass.
    pub agent_categories: Vec<EntityCategory>,
}

impl ClusteringConfig {
    /// Create a new config with defaults: 7 precompute iterations, 30 refine
    /// iterations, agent assignment on, every area category clustered.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            precompute_iterations: 7,
            refine_iterations: 30,
            assign_agents: true,
            seed: None,
            max_sampling_attempts: 64 * k + 64,
            universe: EntityCategory::AREAS.to_vec(),
            agent_categories: EntityCategory::AGENTS.to_vec(),
        }
    }

    pub fn with_precompute_iterations(mut self, iterations: usize) -> Self {
        self.precompute_iterations = iterations;
        self
    }

    pub fn with_refine_iterations(mut self, iterations: usize) -> Self {
        self.refine_iterations = iterations;
        self
    }

    pub fn with_assign_agents(mut self, assign_agents: bool) -> Self {
        self.assign_agents = assign_agents;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_sampling_attempts(mut self, attempts: usize) -> Self {
        self.max_sampling_attempts = attempts;
        self
    }

    pub fn with_universe(mut self, categories: Vec<EntityCategory>) -> Self {
        self.universe = categories;
        self
    }

    pub fn with_agent_categories(mut self, categories: Vec<EntityCategory>) -> Self {
        self.agent_categories = categories;
        self
    }

    /// # Errors
    /// * `InvalidInput` if `k` is zero, the universe is empty or holds a
    ///   non-area category, or an agent category is area-like or repeated
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(ClusterError::invalid_input("cluster count k must be > 0"));
        }
        if self.universe.is_empty() {
            return Err(ClusterError::invalid_input("clustering universe has no categories"));
        }
        if let Some(category) = self.universe.iter().find(|c| !c.is_area()) {
            return Err(ClusterError::invalid_input(format!(
                "{category:?} is not an area and cannot be clustered"
            )));
        }
        if let Some(category) = self.agent_categories.iter().find(|c| c.is_area()) {
            return Err(ClusterError::invalid_input(format!(
                "{category:?} is an area and cannot be assigned as an agent"
            )));
        }
        for (i, category) in self.agent_categories.iter().enumerate() {
            if self.agent_categories[..i].contains(category) {
                return Err(ClusterError::invalid_input(format!(
                    "agent category {category:?} is listed more than once"
                )));
            }
        }
        Ok(())
    }

    /// Random source for center sampling: seeded when a seed is configured.
    pub fn rng(&self) -> ChaCha20Rng {
        match self.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        }
    }
}

/// The two points in a simulation's life at which clustering runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Offline pass over map distance, results meant to be persisted.
    Precompute,
    /// Online pass over straight-line distance.
    Refine,
}

impl Phase {
    pub fn metric(self) -> MetricKind {
        match self {
            Phase::Precompute => MetricKind::Path,
            Phase::Refine => MetricKind::Euclidean,
        }
    }

    pub fn iterations(self, config: &ClusteringConfig) -> usize {
        match self {
            Phase::Precompute => config.precompute_iterations,
            Phase::Refine => config.refine_iterations,
        }
    }
}
