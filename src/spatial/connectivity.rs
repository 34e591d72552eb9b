use std::collections::{BTreeSet, HashMap};

use crate::world::{EntityId, WorldModel};

/// Undirected adjacency between areas.
///
/// Built from the neighbour lists each area declares, then symmetrized: an
/// adjacency declared by only one side is mirrored onto the other. Neighbour
/// sets are ordered by id, which fixes the scan order of searches over the
/// graph. An area never neighbours itself; such declarations are dropped.
#[derive(Debug, Clone, Default)]
pub struct ConnectivityGraph {
    adjacency: HashMap<EntityId, BTreeSet<EntityId>>,
}

impl ConnectivityGraph {
    pub fn build<W>(world: &W) -> Self
    where
        W: WorldModel + ?Sized,
    {
        let mut adjacency: HashMap<EntityId, BTreeSet<EntityId>> = HashMap::new();
        for area in world.areas() {
            adjacency
                .entry(area)
                .or_default()
                .extend(world.neighbours(area).iter().copied().filter(|&n| n != area));
        }

        let mirrored: Vec<(EntityId, EntityId)> = adjacency
            .iter()
            .flat_map(|(&from, to)| to.iter().map(move |&t| (t, from)))
            .collect();
        for (from, to) in mirrored {
            adjacency.entry(from).or_default().insert(to);
        }

        let graph = Self { adjacency };
        log::debug!(
            "built connectivity graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        graph
    }

    /// Builds a graph directly from undirected edges.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (EntityId, EntityId)>,
    {
        let mut adjacency: HashMap<EntityId, BTreeSet<EntityId>> = HashMap::new();
        for (a, b) in edges {
            if a == b {
                adjacency.entry(a).or_default();
                continue;
            }
            adjacency.entry(a).or_default().insert(b);
            adjacency.entry(b).or_default().insert(a);
        }
        Self { adjacency }
    }

    pub fn neighbours(&self, node: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        self.adjacency
            .get(&node)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn contains(&self, node: EntityId) -> bool {
        self.adjacency.contains_key(&node)
    }

    pub fn is_adjacent(&self, a: EntityId, b: EntityId) -> bool {
        self.adjacency.get(&a).is_some_and(|set| set.contains(&b))
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum::<usize>() / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{EntityCategory, Point, Segment, World};

    fn seg() -> Segment {
        Segment::new(Point::new(0.0, 0.0), Point::new(0.0, 1.0))
    }

    #[test]
    fn test_one_way_declaration_is_mirrored() {
        let mut world = World::new();
        world
            .add_area(EntityId(1), EntityCategory::Road, Point::new(0.0, 0.0))
            .add_area(EntityId(2), EntityCategory::Road, Point::new(1.0, 0.0))
            .add_area(EntityId(3), EntityCategory::Road, Point::new(2.0, 0.0))
            .declare_neighbour(EntityId(1), EntityId(2), seg())
            .declare_neighbour(EntityId(3), EntityId(2), seg());

        let graph = ConnectivityGraph::build(&world);
        assert!(graph.is_adjacent(EntityId(2), EntityId(1)));
        assert!(graph.is_adjacent(EntityId(2), EntityId(3)));
        assert_eq!(
            graph.neighbours(EntityId(2)).collect::<Vec<_>>(),
            vec![EntityId(1), EntityId(3)]
        );
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_isolated_area_is_a_node() {
        let mut world = World::grid(2, 1, 1.0);
        world.add_area(EntityId(9), EntityCategory::Refuge, Point::new(50.0, 50.0));
        let graph = ConnectivityGraph::build(&world);
        assert!(graph.contains(EntityId(9)));
        assert_eq!(graph.neighbours(EntityId(9)).count(), 0);
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn test_non_areas_are_ignored() {
        let mut world = World::grid(2, 1, 1.0);
        world.add_on(EntityId(20), EntityCategory::AmbulanceTeam, EntityId(1));
        let graph = ConnectivityGraph::build(&world);
        assert!(!graph.contains(EntityId(20)));
    }

    #[test]
    fn test_from_edges() {
        let graph = ConnectivityGraph::from_edges([
            (EntityId(1), EntityId(2)),
            (EntityId(2), EntityId(3)),
        ]);
        assert!(graph.is_adjacent(EntityId(3), EntityId(2)));
        assert!(!graph.is_adjacent(EntityId(1), EntityId(3)));
        assert_eq!(graph.neighbours(EntityId(7)).count(), 0);
    }

    #[test]
    fn test_self_neighbour_is_dropped() {
        let mut world = World::new();
        world
            .add_area(EntityId(1), EntityCategory::Road, Point::new(0.0, 0.0))
            .add_area(EntityId(2), EntityCategory::Road, Point::new(1.0, 0.0))
            .declare_neighbour(EntityId(1), EntityId(1), seg())
            .declare_neighbour(EntityId(1), EntityId(2), seg());

        let graph = ConnectivityGraph::build(&world);
        assert!(!graph.is_adjacent(EntityId(1), EntityId(1)));
        assert_eq!(graph.edge_count(), 1);

        let graph = ConnectivityGraph::from_edges([(EntityId(3), EntityId(3))]);
        assert!(graph.contains(EntityId(3)));
        assert_eq!(graph.edge_count(), 0);
    }
}
