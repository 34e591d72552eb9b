use std::collections::HashMap;

use crate::error::{ClusterError, Result};
use crate::world::{EntityId, Point, WorldModel};

/// Position lookup for a fixed set of entities, resolved once up front.
#[derive(Debug, Clone, Default)]
pub struct CoordinateStore {
    index: HashMap<EntityId, usize>,
    points: Vec<Point>,
}

impl CoordinateStore {
    /// Resolves the position of every id in `ids`.
    ///
    /// # Errors
    /// * `MissingPosition` if any entity has no resolvable location
    pub fn build<W>(world: &W, ids: &[EntityId]) -> Result<Self>
    where
        W: WorldModel + ?Sized,
    {
        let mut store = Self {
            index: HashMap::with_capacity(ids.len()),
            points: Vec::with_capacity(ids.len()),
        };
        for &id in ids {
            let point = world
                .location(id)
                .ok_or(ClusterError::MissingPosition(id))?;
            if store.index.insert(id, store.points.len()).is_none() {
                store.points.push(point);
            }
        }
        log::debug!("resolved coordinates for {} entities", store.points.len());
        Ok(store)
    }

    /// Adds every id in `ids` whose location resolves, skipping the rest and
    /// ids already stored. Returns how many were added.
    pub fn extend_resolvable<W>(&mut self, world: &W, ids: &[EntityId]) -> usize
    where
        W: WorldModel + ?Sized,
    {
        let before = self.points.len();
        for &id in ids {
            if self.index.contains_key(&id) {
                continue;
            }
            if let Some(point) = world.location(id) {
                self.index.insert(id, self.points.len());
                self.points.push(point);
            }
        }
        self.points.len() - before
    }

    pub fn get(&self, id: EntityId) -> Result<Point> {
        self.index
            .get(&id)
            .map(|&i| self.points[i])
            .ok_or(ClusterError::MissingPosition(id))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn distance_squared(&self, a: EntityId, b: EntityId) -> Result<f64> {
        Ok(self.get(a)?.distance_squared(&self.get(b)?))
    }

    pub fn distance_squared_to(&self, id: EntityId, point: &Point) -> Result<f64> {
        Ok(self.get(id)?.distance_squared(point))
    }

    /// Mean position of the given entities; `None` for an empty slice.
    pub fn mean(&self, ids: &[EntityId]) -> Result<Option<Point>> {
        let points = ids
            .iter()
            .map(|&id| self.get(id))
            .collect::<Result<Vec<_>>>()?;
        Ok(Point::mean(points.iter()))
    }
}
