use std::collections::HashSet;

use rand::Rng;

use crate::cluster::{assign_agents, ClusterState, ClusteringConfig, Phase};
use crate::error::{ClusterError, Result};
use crate::metric::{DistanceMetric, EuclideanMetric, MetricKind, PathMetric};
use crate::spatial::{ConnectivityGraph, CoordinateStore};
use crate::world::{EntityId, WorldModel};

/// How a clustering run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// An update step left every center in place.
    Converged,
    /// The iteration budget ran out while centers were still moving.
    BudgetExhausted,
}

/// Outcome of one clustering run.
#[derive(Debug, Clone)]
pub struct ClusterRun {
    pub state: ClusterState,
    pub termination: Termination,
    /// Assignment/update iterations executed, excluding the final assignment.
    pub iterations: usize,
    pub metric: MetricKind,
}

/// Steps of the Lloyd loop once centers are seeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    AssigningMembers,
    UpdatingCenters,
    Done(Termination),
}

/// Lloyd-style k-means over world entities.
///
/// Centers are always real entities: each update moves a center to the member
/// closest to the cluster mean. The coordinate store and connectivity graph
/// are built once in [`new`](Self::new); every run builds its own metric, and
/// with it its own caches, so runs never share mutable state and may execute
/// on separate threads.
///
/// # Examples
/// ```
/// use geocluster::cluster::{ClusteringConfig, ClusteringEngine};
/// use geocluster::world::World;
///
/// let world = World::grid(6, 6, 10.0);
/// let config = ClusteringConfig::new(3).with_seed(11);
/// let engine = ClusteringEngine::new(&world, config).unwrap();
///
/// let run = engine.refine().unwrap();
/// assert_eq!(run.state.cluster_count(), 3);
/// assert_eq!(run.state.member_count(), 36);
/// ```
///
/// # Complexity
/// * Time per iteration: O(k * n) distance evaluations; under the path metric
///   each uncached evaluation is one breadth-first search
/// * Space: O(n) plus the per-run caches
pub struct ClusteringEngine<'w, W: ?Sized> {
    world: &'w W,
    config: ClusteringConfig,
    universe: Vec<EntityId>,
    in_universe: HashSet<EntityId>,
    coordinates: CoordinateStore,
    graph: ConnectivityGraph,
}

impl<'w, W> ClusteringEngine<'w, W>
where
    W: WorldModel + ?Sized,
{
    /// Collects the universe and builds the coordinate store and graph.
    ///
    /// The store also covers every other area and agent whose location
    /// resolves, so agents standing outside the universe can still be
    /// measured against cluster centers.
    ///
    /// # Errors
    /// * `InvalidInput` if the configuration is invalid
    /// * `MissingPosition` if a universe entity has no resolvable location
    pub fn new(world: &'w W, config: ClusteringConfig) -> Result<Self> {
        config.validate()?;
        let universe = world.entities_of(&config.universe);
        let mut coordinates = CoordinateStore::build(world, &universe)?;
        coordinates.extend_resolvable(world, &world.areas());
        coordinates.extend_resolvable(world, &world.entities_of(&config.agent_categories));
        let in_universe = universe.iter().copied().collect();
        let graph = ConnectivityGraph::build(world);
        log::info!(
            "clustering engine ready: {} entities, k = {}",
            universe.len(),
            config.k
        );
        Ok(Self {
            world,
            config,
            universe,
            in_universe,
            coordinates,
            graph,
        })
    }

    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// The clustered entities in stable order.
    pub fn universe(&self) -> &[EntityId] {
        &self.universe
    }

    pub fn coordinates(&self) -> &CoordinateStore {
        &self.coordinates
    }

    pub fn graph(&self) -> &ConnectivityGraph {
        &self.graph
    }

    /// Offline pass: map distance, precompute budget.
    pub fn precompute(&self) -> Result<ClusterRun> {
        self.run_phase(Phase::Precompute)
    }

    /// Online pass: straight-line distance, refine budget.
    pub fn refine(&self) -> Result<ClusterRun> {
        self.run_phase(Phase::Refine)
    }

    pub fn run_phase(&self, phase: Phase) -> Result<ClusterRun> {
        let mut rng = self.config.rng();
        self.run(phase.metric(), phase.iterations(&self.config), &mut rng)
    }

    /// Seeds `k` random centers from `rng` and clusters under `metric` for at
    /// most `iterations` iterations.
    ///
    /// # Errors
    /// * `InsufficientEntities` if `k` distinct centers cannot be drawn
    /// * `FatalGraph` / `MissingBoundary` from the path metric
    pub fn run<R: Rng>(&self, metric: MetricKind, iterations: usize, rng: &mut R) -> Result<ClusterRun> {
        let centers = self.initial_centers(rng)?;
        self.run_from_centers(metric, centers, iterations)
    }

    /// Clusters starting from the given centers instead of random ones.
    ///
    /// # Errors
    /// * `InvalidInput` if `centers` is not `k` distinct universe entities
    pub fn run_from_centers(
        &self,
        metric: MetricKind,
        centers: Vec<EntityId>,
        iterations: usize,
    ) -> Result<ClusterRun> {
        self.check_centers(&centers)?;
        log::info!(
            "clustering {} entities into {} clusters ({} metric, budget {})",
            self.universe.len(),
            self.config.k,
            metric,
            iterations
        );
        match metric {
            MetricKind::Euclidean => {
                let mut euclidean = EuclideanMetric::new(&self.coordinates);
                self.cluster_with(&mut euclidean, centers, iterations)
            }
            MetricKind::Path => {
                let mut path = PathMetric::new(self.world, &self.graph, &self.coordinates);
                let run = self.cluster_with(&mut path, centers, iterations)?;
                log::debug!(
                    "path metric cached {} distances ({} unreachable) and {} searches",
                    path.cache().len(),
                    path.unreachable_pairs(),
                    path.finder().cache().len()
                );
                Ok(run)
            }
        }
    }

    /// Draws `k` distinct universe entities uniformly at random, rejecting
    /// repeats, within the configured attempt bound.
    ///
    /// # Errors
    /// * `InsufficientEntities` if `k` exceeds the universe or the attempts run out
    pub fn initial_centers<R: Rng>(&self, rng: &mut R) -> Result<Vec<EntityId>> {
        let requested = self.config.k;
        let available = self.universe.len();
        let insufficient = ClusterError::InsufficientEntities {
            requested,
            available,
        };
        if requested > available {
            return Err(insufficient);
        }

        let mut used = HashSet::with_capacity(requested);
        let mut centers = Vec::with_capacity(requested);
        let mut attempts = 0;
        while centers.len() < requested {
            if attempts == self.config.max_sampling_attempts {
                return Err(insufficient);
            }
            attempts += 1;
            let candidate = self.universe[rng.gen_range(0..available)];
            if used.insert(candidate) {
                centers.push(candidate);
            }
        }
        log::debug!("seeded {} centers in {} draws", requested, attempts);
        Ok(centers)
    }

    fn check_centers(&self, centers: &[EntityId]) -> Result<()> {
        if centers.len() != self.config.k {
            return Err(ClusterError::invalid_input(format!(
                "expected {} centers, got {}",
                self.config.k,
                centers.len()
            )));
        }
        let mut seen = HashSet::with_capacity(centers.len());
        for &center in centers {
            if !self.in_universe.contains(&center) {
                return Err(ClusterError::invalid_input(format!(
                    "center {center} is not part of the clustered universe"
                )));
            }
            if !seen.insert(center) {
                return Err(ClusterError::invalid_input(format!(
                    "center {center} appears more than once"
                )));
            }
        }
        Ok(())
    }

    fn cluster_with(
        &self,
        metric: &mut dyn DistanceMetric,
        centers: Vec<EntityId>,
        budget: usize,
    ) -> Result<ClusterRun> {
        let mut lloyd = Lloyd::new(&self.universe, centers);
        let mut iterations = 0;
        let mut stage = Stage::AssigningMembers;

        let termination = loop {
            stage = match stage {
                Stage::AssigningMembers if iterations == budget => {
                    Stage::Done(Termination::BudgetExhausted)
                }
                Stage::AssigningMembers => {
                    lloyd.assign_members(metric)?;
                    Stage::UpdatingCenters
                }
                Stage::UpdatingCenters => {
                    iterations += 1;
                    if lloyd.update_centers(metric)? {
                        Stage::AssigningMembers
                    } else {
                        Stage::Done(Termination::Converged)
                    }
                }
                Stage::Done(termination) => break termination,
            };
        };
        match termination {
            Termination::Converged => log::info!("converged at iteration {}", iterations),
            Termination::BudgetExhausted => {
                log::info!("iteration budget of {} exhausted", budget)
            }
        }

        // membership must match the final centers exactly
        lloyd.assign_members(metric)?;
        let mut state = ClusterState::new(lloyd.centers, lloyd.members)?;

        if self.config.assign_agents {
            for &category in &self.config.agent_categories {
                let agents = self.world.entities_of(&[category]);
                assign_agents(self.world, &mut state, metric, &agents)?;
            }
        }

        for cluster in state.clusters() {
            log::debug!(
                "cluster {} | center {} | size {}",
                cluster.index(),
                cluster.center(),
                cluster.len()
            );
        }

        Ok(ClusterRun {
            state,
            termination,
            iterations,
            metric: metric.kind(),
        })
    }
}

/// Working buffers of one run.
struct Lloyd<'u> {
    universe: &'u [EntityId],
    centers: Vec<EntityId>,
    members: Vec<Vec<EntityId>>,
}

impl<'u> Lloyd<'u> {
    fn new(universe: &'u [EntityId], centers: Vec<EntityId>) -> Self {
        let members = vec![Vec::new(); centers.len()];
        Self {
            universe,
            centers,
            members,
        }
    }

    /// Replaces the member lists with a fresh nearest-center assignment.
    fn assign_members(&mut self, metric: &mut dyn DistanceMetric) -> Result<()> {
        let mut members = vec![Vec::new(); self.centers.len()];
        for &entity in self.universe {
            let (index, _) = metric
                .nearest(entity, &self.centers)?
                .ok_or_else(|| ClusterError::invalid_input("no centers to assign to"))?;
            members[index].push(entity);
        }
        self.members = members;
        Ok(())
    }

    /// Moves every non-empty cluster's center to the member nearest its mean.
    /// Returns whether any center changed.
    fn update_centers(&mut self, metric: &mut dyn DistanceMetric) -> Result<bool> {
        let mut changed = false;
        for (index, members) in self.members.iter().enumerate() {
            let Some(mean) = metric.coordinates().mean(members)? else {
                continue;
            };
            let current = self.centers[index];
            let Some(nearest) = metric.nearest_to_point(members, &mean, Some(current))? else {
                continue;
            };
            if nearest != current {
                log::debug!("cluster {} center {} -> {}", index, current, nearest);
                self.centers[index] = nearest;
                changed = true;
            }
        }
        Ok(changed)
    }
}
