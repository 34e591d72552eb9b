use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use crate::error::{ClusterError, Result};
use crate::world::{EntityId, SpatialEntity, WorldModel};

/// One region: its index, its center entity and the entities it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    index: usize,
    center: EntityId,
    members: Vec<EntityId>,
}

impl Cluster {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn center(&self) -> EntityId {
        self.center
    }

    pub fn members(&self) -> &[EntityId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Finalized clustering result with reverse lookups.
///
/// The center index is built eagerly. The entity index is built on the first
/// [`cluster_of`](Self::cluster_of) query and kept in step with later
/// membership changes.
#[derive(Debug, Clone)]
pub struct ClusterState {
    clusters: Vec<Cluster>,
    center_index: HashMap<EntityId, usize>,
    entity_index: OnceLock<HashMap<EntityId, usize>>,
    agents_assigned: bool,
}

impl PartialEq for ClusterState {
    fn eq(&self, other: &Self) -> bool {
        self.clusters == other.clusters && self.agents_assigned == other.agents_assigned
    }
}

impl ClusterState {
    /// Builds a state from ordered centers and the matching member lists.
    ///
    /// # Errors
    /// * `InvalidInput` if there are no clusters, the two lists differ in
    ///   length, or an entity is listed more than once
    pub fn new(centers: Vec<EntityId>, members: Vec<Vec<EntityId>>) -> Result<Self> {
        if centers.is_empty() {
            return Err(ClusterError::invalid_input("a cluster state needs at least one cluster"));
        }
        if centers.len() != members.len() {
            return Err(ClusterError::invalid_input(format!(
                "{} centers but {} member lists",
                centers.len(),
                members.len()
            )));
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = members.iter().flatten().find(|&&id| !seen.insert(id)) {
            return Err(ClusterError::invalid_input(format!(
                "entity {duplicate} belongs to more than one cluster"
            )));
        }
        let clusters: Vec<Cluster> = centers
            .into_iter()
            .zip(members)
            .enumerate()
            .map(|(index, (center, members))| Cluster {
                index,
                center,
                members,
            })
            .collect();
        Ok(Self {
            center_index: center_index(&clusters),
            clusters,
            entity_index: OnceLock::new(),
            agents_assigned: false,
        })
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn cluster(&self, index: usize) -> Option<&Cluster> {
        self.clusters.get(index)
    }

    pub fn members(&self, index: usize) -> Option<&[EntityId]> {
        self.clusters.get(index).map(Cluster::members)
    }

    /// Center ids in cluster-index order.
    pub fn centers(&self) -> Vec<EntityId> {
        self.clusters.iter().map(Cluster::center).collect()
    }

    pub fn center(&self, index: usize) -> Option<EntityId> {
        self.clusters.get(index).map(Cluster::center)
    }

    /// Index of the cluster whose center is `id`.
    pub fn center_index(&self, id: EntityId) -> Option<usize> {
        self.center_index.get(&id).copied()
    }

    /// Index of the cluster owning `id`.
    pub fn cluster_of(&self, id: EntityId) -> Option<usize> {
        self.entity_index
            .get_or_init(|| entity_index(&self.clusters))
            .get(&id)
            .copied()
    }

    /// Total number of members across all clusters.
    pub fn member_count(&self) -> usize {
        self.clusters.iter().map(Cluster::len).sum()
    }

    /// Whether agents were distributed into the member lists.
    pub fn agents_assigned(&self) -> bool {
        self.agents_assigned
    }

    /// Looks up the world entities of one cluster's members.
    ///
    /// # Errors
    /// * `InvalidInput` if `index` is out of range
    /// * `UnknownEntity` if the world no longer knows a member
    pub fn resolve_members<'w, W>(&self, index: usize, world: &'w W) -> Result<Vec<&'w SpatialEntity>>
    where
        W: WorldModel + ?Sized,
    {
        let cluster = self.clusters.get(index).ok_or_else(|| {
            ClusterError::invalid_input(format!(
                "cluster index {index} out of range for {} clusters",
                self.clusters.len()
            ))
        })?;
        cluster
            .members
            .iter()
            .map(|&id| world.entity(id).ok_or(ClusterError::UnknownEntity(id)))
            .collect()
    }

    pub(crate) fn push_member(&mut self, index: usize, id: EntityId) {
        self.clusters[index].members.push(id);
        if let Some(lookup) = self.entity_index.get_mut() {
            lookup.insert(id, index);
        }
    }

    pub(crate) fn set_agents_assigned(&mut self, assigned: bool) {
        self.agents_assigned = assigned;
    }
}

/// Fresh center → index map. The first cluster wins if two share a center.
fn center_index(clusters: &[Cluster]) -> HashMap<EntityId, usize> {
    let mut lookup = HashMap::with_capacity(clusters.len());
    for cluster in clusters {
        lookup.entry(cluster.center).or_insert(cluster.index);
    }
    lookup
}

/// Fresh member → index map.
fn entity_index(clusters: &[Cluster]) -> HashMap<EntityId, usize> {
    let mut lookup = HashMap::new();
    for cluster in clusters {
        for &member in &cluster.members {
            lookup.insert(member, cluster.index);
        }
    }
    lookup
}
