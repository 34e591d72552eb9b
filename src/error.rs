use thiserror::Error;

use crate::world::EntityId;

/// Errors raised while building the spatial indices or running a clustering pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClusterError {
    /// No coordinate could be resolved for the entity.
    #[error("no position could be resolved for entity {0}")]
    MissingPosition(EntityId),

    /// Not enough distinct entities to seed the requested number of centers.
    #[error("cannot pick {requested} distinct centers from {available} entities")]
    InsufficientEntities { requested: usize, available: usize },

    /// No goal is reachable from `start` through the connectivity graph.
    #[error("no path from {start} to any of {goals:?}")]
    Unreachable { start: EntityId, goals: Vec<EntityId> },

    /// Backtracking met a node without a recorded predecessor.
    #[error("node {node} has no predecessor while backtracking from {goal} to {start}")]
    FatalGraph {
        start: EntityId,
        goal: EntityId,
        node: EntityId,
    },

    /// Neither side of an adjacency declares the shared boundary segment.
    #[error("no boundary declared between area {area} and neighbour {neighbour}")]
    MissingBoundary { area: EntityId, neighbour: EntityId },

    /// The world model does not know the entity.
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ClusterError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        ClusterError::InvalidInput(msg.into())
    }

    /// Errors that abort a clustering run instead of being absorbed by a metric.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ClusterError::Unreachable { .. })
    }
}

pub type Result<T> = std::result::Result<T, ClusterError>;
