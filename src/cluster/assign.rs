use crate::cluster::ClusterState;
use crate::error::{ClusterError, Result};
use crate::metric::DistanceMetric;
use crate::world::{EntityId, WorldModel};

/// Distributes `agents` over the clusters of `state` in round-robin order.
///
/// Starting at cluster 0, each step takes the remaining agent nearest to the
/// current cluster's center (distance from the center to the area the agent
/// stands on; ties go to the earlier agent), appends it to that cluster and
/// moves on to the next cluster, wrapping after the last. Agent counts per
/// cluster therefore differ by at most one.
///
/// Returns the number of agents assigned.
///
/// # Errors
/// * `MissingPosition` if an agent's position cannot be resolved
/// * any fatal error raised by `metric`
pub fn assign_agents<W>(
    world: &W,
    state: &mut ClusterState,
    metric: &mut dyn DistanceMetric,
    agents: &[EntityId],
) -> Result<usize>
where
    W: WorldModel + ?Sized,
{
    let mut pool = agents.to_vec();
    let mut positions = agents
        .iter()
        .map(|&agent| world.position_of(agent).ok_or(ClusterError::MissingPosition(agent)))
        .collect::<Result<Vec<_>>>()?;

    let cluster_count = state.cluster_count();
    let mut index = 0;
    while !pool.is_empty() {
        let center = state
            .center(index)
            .ok_or_else(|| ClusterError::invalid_input(format!("no cluster at index {index}")))?;
        let Some((nearest, _)) = metric.nearest(center, &positions)? else {
            break;
        };
        let agent = pool.remove(nearest);
        positions.remove(nearest);
        state.push_member(index, agent);
        index = (index + 1) % cluster_count;
    }

    state.set_agents_assigned(true);
    log::debug!(
        "assigned {} agents over {} clusters",
        agents.len(),
        cluster_count
    );
    Ok(agents.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::EuclideanMetric;
    use crate::spatial::CoordinateStore;
    use crate::world::{EntityCategory, Placement, SpatialEntity, World};

    fn ids(raw: &[u32]) -> Vec<EntityId> {
        raw.iter().copied().map(EntityId).collect()
    }

    /// A 4x1 strip of roads split into {1,2} and {3,4}.
    fn strip() -> (World, ClusterState) {
        let world = World::grid(4, 1, 10.0);
        let state =
            ClusterState::new(ids(&[1, 4]), vec![ids(&[1, 2]), ids(&[3, 4])]).unwrap();
        (world, state)
    }

    #[test]
    fn test_nearest_agent_goes_to_current_cluster() {
        let (mut world, mut state) = strip();
        world
            .add_on(EntityId(100), EntityCategory::FireBrigade, EntityId(4))
            .add_on(EntityId(101), EntityCategory::FireBrigade, EntityId(1));
        let store = CoordinateStore::build(&world, &world.areas()).unwrap();
        let mut metric = EuclideanMetric::new(&store);

        let assigned =
            assign_agents(&world, &mut state, &mut metric, &ids(&[100, 101])).unwrap();
        assert_eq!(assigned, 2);
        assert_eq!(state.cluster_of(EntityId(101)), Some(0));
        assert_eq!(state.cluster_of(EntityId(100)), Some(1));
        assert!(state.agents_assigned());
    }

    #[test]
    fn test_round_robin_balances_counts() {
        let (mut world, mut state) = strip();
        // every agent piles up next to cluster 0's center
        let agents: Vec<EntityId> = (200..207).map(EntityId).collect();
        for &agent in &agents {
            world.add_on(agent, EntityCategory::PoliceForce, EntityId(1));
        }
        let store = CoordinateStore::build(&world, &world.areas()).unwrap();
        let mut metric = EuclideanMetric::new(&store);

        assign_agents(&world, &mut state, &mut metric, &agents).unwrap();
        let first = state.members(0).unwrap().len() - 2;
        let second = state.members(1).unwrap().len() - 2;
        assert_eq!(first + second, 7);
        assert_eq!(first, 4);
        assert_eq!(second, 3);
        // ties resolve in pool order
        assert_eq!(&state.members(0).unwrap()[2..], &ids(&[200, 202, 204, 206])[..]);
    }

    #[test]
    fn test_unresolvable_agent_fails() {
        let (mut world, mut state) = strip();
        world.add_entity(SpatialEntity::new(
            EntityId(300),
            EntityCategory::AmbulanceTeam,
            Placement::Unknown,
        ));
        let store = CoordinateStore::build(&world, &world.areas()).unwrap();
        let mut metric = EuclideanMetric::new(&store);
        assert_eq!(
            assign_agents(&world, &mut state, &mut metric, &ids(&[300])),
            Err(ClusterError::MissingPosition(EntityId(300)))
        );
        assert_eq!(state.member_count(), 4);
    }

    #[test]
    fn test_no_agents_is_a_no_op() {
        let (world, mut state) = strip();
        let store = CoordinateStore::build(&world, &world.areas()).unwrap();
        let mut metric = EuclideanMetric::new(&store);
        assert_eq!(assign_agents(&world, &mut state, &mut metric, &[]).unwrap(), 0);
        assert_eq!(state.member_count(), 4);
    }
}
