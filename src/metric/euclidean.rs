use crate::error::Result;
use crate::metric::{DistanceMetric, MetricKind};
use crate::spatial::CoordinateStore;
use crate::world::EntityId;

/// Straight-line distance over precomputed coordinates.
#[derive(Debug, Clone, Copy)]
pub struct EuclideanMetric<'a> {
    coordinates: &'a CoordinateStore,
}

impl<'a> EuclideanMetric<'a> {
    pub fn new(coordinates: &'a CoordinateStore) -> Self {
        Self { coordinates }
    }

    /// Squared distance; the square root does not change the ordering.
    pub fn distance_squared(&self, a: EntityId, b: EntityId) -> Result<f64> {
        self.coordinates.distance_squared(a, b)
    }
}

impl DistanceMetric for EuclideanMetric<'_> {
    fn kind(&self) -> MetricKind {
        MetricKind::Euclidean
    }

    fn coordinates(&self) -> &CoordinateStore {
        self.coordinates
    }

    fn distance(&mut self, target: EntityId, candidate: EntityId) -> Result<f64> {
        self.distance_squared(target, candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClusterError;
    use crate::world::{EntityCategory, Point, World, WorldModel};
    use proptest::prelude::*;

    #[test]
    fn test_distance_squared() {
        let mut world = World::new();
        world
            .add_area(EntityId(1), EntityCategory::Road, Point::new(0.0, 0.0))
            .add_area(EntityId(2), EntityCategory::Road, Point::new(3.0, 4.0));
        let store = CoordinateStore::build(&world, &world.areas()).unwrap();
        let mut metric = EuclideanMetric::new(&store);
        assert_eq!(metric.distance_squared(EntityId(1), EntityId(2)).unwrap(), 25.0);
        assert_eq!(metric.distance(EntityId(2), EntityId(2)).unwrap(), 0.0);
        assert_eq!(
            metric.distance(EntityId(1), EntityId(3)),
            Err(ClusterError::MissingPosition(EntityId(3)))
        );
    }

    proptest! {
        #[test]
        fn distance_squared_is_symmetric(
            ax in -1.0e6f64..1.0e6, ay in -1.0e6f64..1.0e6,
            bx in -1.0e6f64..1.0e6, by in -1.0e6f64..1.0e6
        ) {
            let mut world = World::new();
            world
                .add_area(EntityId(1), EntityCategory::Building, Point::new(ax, ay))
                .add_area(EntityId(2), EntityCategory::Building, Point::new(bx, by));
            let store = CoordinateStore::build(&world, &world.areas()).unwrap();
            let metric = EuclideanMetric::new(&store);
            let forward = metric.distance_squared(EntityId(1), EntityId(2)).unwrap();
            let backward = metric.distance_squared(EntityId(2), EntityId(1)).unwrap();
            prop_assert_eq!(forward, backward);
            prop_assert!(forward >= 0.0);
        }
    }
}
