use std::collections::HashMap;

use crate::error::{ClusterError, Result};
use crate::metric::{DistanceMetric, MetricKind, UNREACHABLE_DISTANCE};
use crate::spatial::{path_length, ConnectivityGraph, CoordinateStore, ShortestPathFinder};
use crate::world::{EntityId, WorldModel};

/// Ordered (target, candidate) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey {
    pub target: EntityId,
    pub candidate: EntityId,
}

/// Map distances computed so far in one run, including unreachable pairs.
#[derive(Debug, Default)]
pub struct DistanceCache {
    distances: HashMap<PairKey, f64>,
}

impl DistanceCache {
    pub fn get(&self, key: &PairKey) -> Option<f64> {
        self.distances.get(key).copied()
    }

    pub fn insert(&mut self, key: PairKey, distance: f64) {
        self.distances.insert(key, distance);
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }
}

/// Map distance: breadth-first route through the area graph, measured across
/// boundary midpoints.
///
/// Both caches live inside the metric, so a fresh metric per run means fresh
/// caches. An unreachable candidate is reported as [`UNREACHABLE_DISTANCE`]
/// instead of an error.
pub struct PathMetric<'a, W: ?Sized> {
    world: &'a W,
    coordinates: &'a CoordinateStore,
    finder: ShortestPathFinder<'a>,
    cache: DistanceCache,
    unreachable: usize,
}

impl<'a, W> PathMetric<'a, W>
where
    W: WorldModel + ?Sized,
{
    pub fn new(world: &'a W, graph: &'a ConnectivityGraph, coordinates: &'a CoordinateStore) -> Self {
        Self {
            world,
            coordinates,
            finder: ShortestPathFinder::new(graph),
            cache: DistanceCache::default(),
            unreachable: 0,
        }
    }

    pub fn cache(&self) -> &DistanceCache {
        &self.cache
    }

    pub fn finder(&self) -> &ShortestPathFinder<'a> {
        &self.finder
    }

    /// Number of distinct pairs found unreachable so far.
    pub fn unreachable_pairs(&self) -> usize {
        self.unreachable
    }
}

impl<W> DistanceMetric for PathMetric<'_, W>
where
    W: WorldModel + ?Sized,
{
    fn kind(&self) -> MetricKind {
        MetricKind::Path
    }

    fn coordinates(&self) -> &CoordinateStore {
        self.coordinates
    }

    fn distance(&mut self, target: EntityId, candidate: EntityId) -> Result<f64> {
        let key = PairKey { target, candidate };
        if let Some(distance) = self.cache.get(&key) {
            return Ok(distance);
        }

        let distance = match self.finder.find(target, &[candidate]) {
            Ok(path) => path_length(self.world, self.coordinates, &path)?,
            Err(ClusterError::Unreachable { .. }) => {
                log::trace!("no route from {} to {}", target, candidate);
                self.unreachable += 1;
                UNREACHABLE_DISTANCE
            }
            Err(err) => return Err(err),
        };
        self.cache.insert(key, distance);
        Ok(distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{EntityCategory, Point, Segment, World};
    use approx::assert_relative_eq;

    fn two_islands() -> World {
        // 1 - 2    3 - 4
        let mut world = World::new();
        let wall = |x: f64| Segment::new(Point::new(x, -1.0), Point::new(x, 1.0));
        world
            .add_area(EntityId(1), EntityCategory::Road, Point::new(0.0, 0.0))
            .add_area(EntityId(2), EntityCategory::Building, Point::new(2.0, 0.0))
            .add_area(EntityId(3), EntityCategory::Road, Point::new(100.0, 0.0))
            .add_area(EntityId(4), EntityCategory::Refuge, Point::new(102.0, 0.0))
            .link(EntityId(1), EntityId(2), wall(1.0))
            .link(EntityId(3), EntityId(4), wall(101.0));
        world
    }

    #[test]
    fn test_distance_follows_the_map() {
        let world = World::grid(3, 3, 10.0);
        let graph = ConnectivityGraph::build(&world);
        let store = CoordinateStore::build(&world, &world.areas()).unwrap();
        let mut metric = PathMetric::new(&world, &graph, &store);

        // route 1-2-3-6-9 cuts the corner inside area 3
        let distance = metric.distance(EntityId(1), EntityId(9)).unwrap();
        assert_relative_eq!(distance, 30.0 + 50f64.sqrt());
        assert_relative_eq!(metric.distance(EntityId(5), EntityId(5)).unwrap(), 0.0);
    }

    #[test]
    fn test_results_are_cached_per_ordered_pair() {
        let world = World::grid(3, 1, 10.0);
        let graph = ConnectivityGraph::build(&world);
        let store = CoordinateStore::build(&world, &world.areas()).unwrap();
        let mut metric = PathMetric::new(&world, &graph, &store);

        metric.distance(EntityId(1), EntityId(3)).unwrap();
        metric.distance(EntityId(1), EntityId(3)).unwrap();
        assert_eq!(metric.cache().len(), 1);
        assert_eq!(metric.finder().cache().len(), 1);

        metric.distance(EntityId(3), EntityId(1)).unwrap();
        assert_eq!(metric.cache().len(), 2);
    }

    #[test]
    fn test_unreachable_returns_sentinel() {
        let world = two_islands();
        let graph = ConnectivityGraph::build(&world);
        let store = CoordinateStore::build(&world, &world.areas()).unwrap();
        let mut metric = PathMetric::new(&world, &graph, &store);

        let distance = metric.distance(EntityId(1), EntityId(4)).unwrap();
        assert_eq!(distance, UNREACHABLE_DISTANCE);
        assert_eq!(metric.unreachable_pairs(), 1);
        assert_eq!(
            metric.cache().get(&PairKey {
                target: EntityId(1),
                candidate: EntityId(4)
            }),
            Some(UNREACHABLE_DISTANCE)
        );
        // a reachable candidate always beats an unreachable one
        let nearest = metric
            .nearest(EntityId(1), &[EntityId(4), EntityId(2)])
            .unwrap();
        assert_eq!(nearest.map(|(i, _)| i), Some(1));
    }

    #[test]
    fn test_missing_boundary_is_not_absorbed() {
        let mut world = World::new();
        world
            .add_area(EntityId(1), EntityCategory::Road, Point::new(0.0, 0.0))
            .add_area(EntityId(2), EntityCategory::Road, Point::new(4.0, 0.0));
        let graph = ConnectivityGraph::from_edges([(EntityId(1), EntityId(2))]);
        let store = CoordinateStore::build(&world, &world.areas()).unwrap();
        let mut metric = PathMetric::new(&world, &graph, &store);
        assert!(matches!(
            metric.distance(EntityId(1), EntityId(2)),
            Err(ClusterError::MissingBoundary { .. })
        ));
        assert!(metric.cache().is_empty());
    }
}
