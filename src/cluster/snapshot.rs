use serde::{Deserialize, Serialize};

use crate::cluster::ClusterState;
use crate::error::{ClusterError, Result};
use crate::world::EntityId;

/// Persistable form of a [`ClusterState`]: enough to rebuild every query
/// without running the clustering again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSnapshot {
    pub cluster_count: usize,
    pub centers: Vec<EntityId>,
    pub members: Vec<Vec<EntityId>>,
    #[serde(default)]
    pub agents_assigned: bool,
}

impl ClusterState {
    pub fn snapshot(&self) -> ClusterSnapshot {
        ClusterSnapshot {
            cluster_count: self.cluster_count(),
            centers: self.centers(),
            members: self
                .clusters()
                .iter()
                .map(|cluster| cluster.members().to_vec())
                .collect(),
            agents_assigned: self.agents_assigned(),
        }
    }

    /// Rebuilds a state from a snapshot.
    ///
    /// # Errors
    /// * `InvalidInput` if the recorded cluster count disagrees with the
    ///   center or member lists, or an entity is listed in two clusters
    pub fn from_snapshot(snapshot: ClusterSnapshot) -> Result<Self> {
        if snapshot.centers.len() != snapshot.cluster_count
            || snapshot.members.len() != snapshot.cluster_count
        {
            return Err(ClusterError::invalid_input(format!(
                "snapshot declares {} clusters but holds {} centers and {} member lists",
                snapshot.cluster_count,
                snapshot.centers.len(),
                snapshot.members.len()
            )));
        }
        let mut state = ClusterState::new(snapshot.centers, snapshot.members)?;
        state.set_agents_assigned(snapshot.agents_assigned);
        Ok(state)
    }
}

impl TryFrom<ClusterSnapshot> for ClusterState {
    type Error = ClusterError;

    fn try_from(snapshot: ClusterSnapshot) -> Result<Self> {
        ClusterState::from_snapshot(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u32]) -> Vec<EntityId> {
        raw.iter().copied().map(EntityId).collect()
    }

    #[test]
    fn test_json_round_trip_preserves_queries() {
        let original = ClusterState::new(
            ids(&[2, 7, 9]),
            vec![ids(&[1, 2, 3]), ids(&[7, 8]), ids(&[9])],
        )
        .unwrap();

        let json = serde_json::to_string(&original.snapshot()).unwrap();
        let snapshot: ClusterSnapshot = serde_json::from_str(&json).unwrap();
        let restored = ClusterState::try_from(snapshot).unwrap();

        assert_eq!(restored, original);
        assert_eq!(restored.centers(), original.centers());
        for id in 1..=9 {
            assert_eq!(restored.cluster_of(EntityId(id)), original.cluster_of(EntityId(id)));
        }
        for index in 0..3 {
            assert_eq!(restored.members(index), original.members(index));
        }
        assert_eq!(restored.center_index(EntityId(7)), Some(1));
    }

    #[test]
    fn test_json_layout() {
        let state = ClusterState::new(ids(&[5]), vec![ids(&[5, 6])]).unwrap();
        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "cluster_count": 1,
                "centers": [5],
                "members": [[5, 6]],
                "agents_assigned": false
            })
        );
    }

    #[test]
    fn test_inconsistent_snapshot_is_rejected() {
        let snapshot = ClusterSnapshot {
            cluster_count: 3,
            centers: ids(&[1, 2]),
            members: vec![ids(&[1]), ids(&[2])],
            agents_assigned: false,
        };
        assert!(matches!(
            ClusterState::from_snapshot(snapshot),
            Err(ClusterError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_entity_in_two_clusters_is_rejected() {
        let snapshot = ClusterSnapshot {
            cluster_count: 2,
            centers: ids(&[1, 2]),
            members: vec![ids(&[1, 3]), ids(&[2, 3])],
            agents_assigned: false,
        };
        assert!(matches!(
            ClusterState::from_snapshot(snapshot),
            Err(ClusterError::InvalidInput(_))
        ));
    }
}
