use std::collections::{BTreeMap, HashMap};

use super::entity::{EntityCategory, EntityId, Placement, SpatialEntity};
use super::geometry::{Point, Segment};
use super::WorldModel;

/// In-memory world model.
///
/// Entities are kept ordered by id so enumeration is stable across runs.
///
/// ```
/// use geocluster::world::{EntityCategory, EntityId, Point, Segment, World, WorldModel};
///
/// let mut world = World::new();
/// world
///     .add_area(EntityId(1), EntityCategory::Road, Point::new(0.0, 0.0))
///     .add_area(EntityId(2), EntityCategory::Building, Point::new(10.0, 0.0))
///     .link(
///         EntityId(1),
///         EntityId(2),
///         Segment::new(Point::new(5.0, -5.0), Point::new(5.0, 5.0)),
///     );
/// assert_eq!(world.neighbours(EntityId(1)), &[EntityId(2)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct World {
    entities: BTreeMap<EntityId, SpatialEntity>,
    neighbours: HashMap<EntityId, Vec<EntityId>>,
    boundaries: HashMap<(EntityId, EntityId), Segment>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entity(&mut self, entity: SpatialEntity) -> &mut Self {
        self.entities.insert(entity.id, entity);
        self
    }

    pub fn add_area(&mut self, id: EntityId, category: EntityCategory, at: Point) -> &mut Self {
        self.add_entity(SpatialEntity::new(id, category, Placement::At(at)))
    }

    /// Adds a mobile entity (agent, civilian, blockade) standing on `area`.
    pub fn add_on(&mut self, id: EntityId, category: EntityCategory, area: EntityId) -> &mut Self {
        self.add_entity(SpatialEntity::new(id, category, Placement::On(area)))
    }

    /// Declares `neighbour` as adjacent to `area` on `area`'s side only.
    pub fn declare_neighbour(
        &mut self,
        area: EntityId,
        neighbour: EntityId,
        boundary: Segment,
    ) -> &mut Self {
        let declared = self.neighbours.entry(area).or_default();
        if !declared.contains(&neighbour) {
            declared.push(neighbour);
        }
        self.boundaries.insert((area, neighbour), boundary);
        self
    }

    /// Declares the adjacency on both sides with the same shared boundary.
    pub fn link(&mut self, a: EntityId, b: EntityId, boundary: Segment) -> &mut Self {
        self.declare_neighbour(a, b, boundary);
        self.declare_neighbour(b, a, boundary)
    }

    /// A `cols` x `rows` grid of roads, `spacing` apart, each linked to its
    /// four orthogonal neighbours. Ids run row by row starting at 1.
    pub fn grid(cols: u32, rows: u32, spacing: f64) -> Self {
        let mut world = World::new();
        let id = |c: u32, r: u32| EntityId(1 + r * cols + c);
        let half = spacing / 2.0;
        for r in 0..rows {
            for c in 0..cols {
                let at = Point::new(c as f64 * spacing, r as f64 * spacing);
                world.add_area(id(c, r), EntityCategory::Road, at);
            }
        }
        for r in 0..rows {
            for c in 0..cols {
                let x = c as f64 * spacing;
                let y = r as f64 * spacing;
                if c + 1 < cols {
                    let wall = Segment::new(
                        Point::new(x + half, y - half),
                        Point::new(x + half, y + half),
                    );
                    world.link(id(c, r), id(c + 1, r), wall);
                }
                if r + 1 < rows {
                    let wall = Segment::new(
                        Point::new(x - half, y + half),
                        Point::new(x + half, y + half),
                    );
                    world.link(id(c, r), id(c, r + 1), wall);
                }
            }
        }
        world
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl WorldModel for World {
    fn entity(&self, id: EntityId) -> Option<&SpatialEntity> {
        self.entities.get(&id)
    }

    fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    fn neighbours(&self, area: EntityId) -> &[EntityId] {
        self.neighbours.get(&area).map(Vec::as_slice).unwrap_or(&[])
    }

    fn boundary(&self, area: EntityId, neighbour: EntityId) -> Option<Segment> {
        self.boundaries.get(&(area, neighbour)).copied()
    }
}
