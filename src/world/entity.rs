use std::fmt;

use serde::{Deserialize, Serialize};

use super::geometry::Point;

/// Opaque, stable identifier of a world entity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for EntityId {
    fn from(raw: u32) -> Self {
        EntityId(raw)
    }
}

/// Kind of entity found in a rescue scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityCategory {
    Road,
    Hydrant,
    Building,
    Refuge,
    GasStation,
    AmbulanceCentre,
    FireStation,
    PoliceOffice,
    FireBrigade,
    PoliceForce,
    AmbulanceTeam,
    Civilian,
    Blockade,
}

impl EntityCategory {
    /// Categories that make up the default clustering universe.
    pub const AREAS: [EntityCategory; 8] = [
        EntityCategory::Road,
        EntityCategory::Hydrant,
        EntityCategory::Building,
        EntityCategory::Refuge,
        EntityCategory::GasStation,
        EntityCategory::AmbulanceCentre,
        EntityCategory::FireStation,
        EntityCategory::PoliceOffice,
    ];

    /// Mobile agent categories distributed over clusters after clustering.
    pub const AGENTS: [EntityCategory; 3] = [
        EntityCategory::FireBrigade,
        EntityCategory::PoliceForce,
        EntityCategory::AmbulanceTeam,
    ];

    /// Areas take part in the connectivity graph and carry their own coordinates.
    pub fn is_area(self) -> bool {
        Self::AREAS.contains(&self)
    }

    pub fn is_agent(self) -> bool {
        Self::AGENTS.contains(&self)
    }
}

/// Where an entity is on the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Fixed coordinates of the entity itself.
    At(Point),
    /// Standing on (or blocking) the given area; position resolves through it.
    On(EntityId),
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpatialEntity {
    pub id: EntityId,
    pub category: EntityCategory,
    pub placement: Placement,
}

impl SpatialEntity {
    pub fn new(id: EntityId, category: EntityCategory, placement: Placement) -> Self {
        Self {
            id,
            category,
            placement,
        }
    }

    pub fn is_area(&self) -> bool {
        self.category.is_area()
    }
}
