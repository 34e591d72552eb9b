//! Distance models used to rank candidates during clustering.
//!
//! Two strategies implement [`DistanceMetric`]:
//! - [`EuclideanMetric`]: squared straight-line distance between stored coordinates.
//! - [`PathMetric`]: length of the breadth-first path through the area graph,
//!   measured across boundary midpoints, memoized per ordered pair.
//!
//! Only the relative order of the values a metric returns is meaningful.

pub mod euclidean;
pub mod path;

pub use euclidean::EuclideanMetric;
pub use path::{DistanceCache, PairKey, PathMetric};

use crate::error::Result;
use crate::spatial::CoordinateStore;
use crate::world::{EntityId, Point};

/// Value reported for a candidate that cannot be reached. It sorts after every
/// real distance, so an unreachable candidate only wins when nothing else can.
pub const UNREACHABLE_DISTANCE: f64 = f64::MAX;

/// Which distance model a clustering run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Euclidean,
    Path,
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricKind::Euclidean => write!(f, "euclidean"),
            MetricKind::Path => write!(f, "path"),
        }
    }
}

pub trait DistanceMetric {
    fn kind(&self) -> MetricKind;

    fn coordinates(&self) -> &CoordinateStore;

    /// Distance from `target` to `candidate`.
    fn distance(&mut self, target: EntityId, candidate: EntityId) -> Result<f64>;

    /// Index and distance of the candidate nearest to `target`. Ties go to the
    /// earliest candidate, so a full tie (including all-unreachable) picks
    /// index 0. `None` only for an empty candidate list.
    fn nearest(&mut self, target: EntityId, candidates: &[EntityId]) -> Result<Option<(usize, f64)>> {
        let mut best: Option<(usize, f64)> = None;
        for (index, &candidate) in candidates.iter().enumerate() {
            let distance = self.distance(target, candidate)?;
            if best.map_or(true, |(_, shortest)| distance < shortest) {
                best = Some((index, distance));
            }
        }
        Ok(best)
    }

    /// The candidate closest to `point` in straight-line distance.
    ///
    /// A point off the graph has no map distance, so every metric compares
    /// coordinates here. On a tie the `incumbent` wins if it is among the tied
    /// candidates, otherwise the first one encountered does.
    fn nearest_to_point(
        &self,
        candidates: &[EntityId],
        point: &Point,
        incumbent: Option<EntityId>,
    ) -> Result<Option<EntityId>> {
        let coordinates = self.coordinates();
        let mut best: Option<(EntityId, f64)> = None;
        for &candidate in candidates {
            let distance = coordinates.distance_squared_to(candidate, point)?;
            best = match best {
                None => Some((candidate, distance)),
                Some((_, shortest)) if distance < shortest => Some((candidate, distance)),
                Some((_, shortest)) if distance == shortest && Some(candidate) == incumbent => {
                    Some((candidate, distance))
                }
                keep => keep,
            };
        }
        Ok(best.map(|(id, _)| id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{World, WorldModel};

    #[test]
    fn test_nearest_breaks_ties_by_first_candidate() {
        let world = World::grid(3, 1, 10.0);
        let store = CoordinateStore::build(&world, &world.areas()).unwrap();
        let mut metric = EuclideanMetric::new(&store);
        // 2 sits halfway between 1 and 3
        let nearest = metric
            .nearest(EntityId(2), &[EntityId(3), EntityId(1)])
            .unwrap();
        assert_eq!(nearest, Some((0, 100.0)));
        assert_eq!(metric.nearest(EntityId(2), &[]).unwrap(), None);
    }

    #[test]
    fn test_nearest_to_point_prefers_incumbent_on_tie() {
        let world = World::grid(2, 1, 10.0);
        let store = CoordinateStore::build(&world, &world.areas()).unwrap();
        let metric = EuclideanMetric::new(&store);
        let midpoint = Point::new(5.0, 0.0);
        let members = [EntityId(1), EntityId(2)];

        assert_eq!(
            metric.nearest_to_point(&members, &midpoint, None).unwrap(),
            Some(EntityId(1))
        );
        assert_eq!(
            metric
                .nearest_to_point(&members, &midpoint, Some(EntityId(2)))
                .unwrap(),
            Some(EntityId(2))
        );
        assert_eq!(
            metric
                .nearest_to_point(&members, &Point::new(9.0, 0.0), Some(EntityId(1)))
                .unwrap(),
            Some(EntityId(2))
        );
        assert_eq!(metric.nearest_to_point(&[], &midpoint, None).unwrap(), None);
    }
}
