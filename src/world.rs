//! # World model
//!
//! The clustering engine does not load maps itself. It reads the environment
//! through [`WorldModel`], which exposes just what clustering needs: entity
//! enumeration, coordinates, area adjacency and the boundary segment shared by
//! two adjacent areas.
//!
//! [`World`] is a plain in-memory implementation, handy for tests and tools.

pub mod entity;
pub mod geometry;
pub mod memory;

pub use entity::{EntityCategory, EntityId, Placement, SpatialEntity};
pub use geometry::{Point, Segment};
pub use memory::World;

/// Read-only view of the simulated environment.
pub trait WorldModel {
    fn entity(&self, id: EntityId) -> Option<&SpatialEntity>;

    /// Every entity id, in a stable order.
    fn entity_ids(&self) -> Vec<EntityId>;

    /// Neighbours declared by `area`. Declarations may be one-sided.
    fn neighbours(&self, area: EntityId) -> &[EntityId];

    /// Boundary segment of `area` facing `neighbour`, as declared by `area`.
    fn boundary(&self, area: EntityId, neighbour: EntityId) -> Option<Segment>;

    /// Ids of the entities whose category is in `categories`, in stable order.
    fn entities_of(&self, categories: &[EntityCategory]) -> Vec<EntityId> {
        self.entity_ids()
            .into_iter()
            .filter(|id| {
                self.entity(*id)
                    .is_some_and(|e| categories.contains(&e.category))
            })
            .collect()
    }

    /// Ids of all area-like entities, in stable order.
    fn areas(&self) -> Vec<EntityId> {
        self.entities_of(&EntityCategory::AREAS)
    }

    /// The area an entity occupies: itself for fixed entities, the area it
    /// stands on otherwise.
    fn position_of(&self, id: EntityId) -> Option<EntityId> {
        match self.entity(id)?.placement {
            Placement::At(_) => Some(id),
            Placement::On(area) => Some(area),
            Placement::Unknown => None,
        }
    }

    /// Coordinates of an entity, following at most one `On` indirection.
    fn location(&self, id: EntityId) -> Option<Point> {
        match self.entity(id)?.placement {
            Placement::At(point) => Some(point),
            Placement::On(area) => match self.entity(area)?.placement {
                Placement::At(point) => Some(point),
                _ => None,
            },
            Placement::Unknown => None,
        }
    }
}
