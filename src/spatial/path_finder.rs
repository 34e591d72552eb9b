use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};

use crate::error::{ClusterError, Result};
use crate::spatial::{ConnectivityGraph, CoordinateStore};
use crate::world::{EntityId, Point, WorldModel};

/// Cache key: start node plus the goal set in canonical (sorted, deduplicated) form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PathKey {
    start: EntityId,
    goals: Vec<EntityId>,
}

/// Memoized search results for one clustering run. Unreachable results are
/// remembered as `None`.
#[derive(Debug, Default)]
pub struct PathCache {
    paths: HashMap<PathKey, Option<Vec<EntityId>>>,
    hits: usize,
}

impl PathCache {
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }
}

/// Breadth-first multi-goal search over a [`ConnectivityGraph`].
///
/// The search stops at the first goal it meets: either a popped node that is a
/// goal, or a goal spotted while scanning the neighbours of a popped node (the
/// scan is abandoned right there). When several goals lie at the same depth,
/// which one is returned depends on neighbour scan order (ascending id here)
/// and carries no further meaning.
#[derive(Debug)]
pub struct ShortestPathFinder<'g> {
    graph: &'g ConnectivityGraph,
    cache: PathCache,
}

impl<'g> ShortestPathFinder<'g> {
    pub fn new(graph: &'g ConnectivityGraph) -> Self {
        Self {
            graph,
            cache: PathCache::default(),
        }
    }

    /// Finds a path from `start` to the nearest (in hops) member of `goals`.
    ///
    /// The returned path begins with `start` and ends with the goal reached;
    /// `find(x, &[x])` is `[x]`. Keeping `start` in the path means
    /// [`path_length`] counts the crossing out of the first area, so two
    /// adjacent areas are a positive distance apart rather than zero.
    ///
    /// # Errors
    /// * `Unreachable` if no goal can be reached (or `goals` is empty)
    /// * `FatalGraph` if the predecessor chain is broken while backtracking
    pub fn find(&mut self, start: EntityId, goals: &[EntityId]) -> Result<Vec<EntityId>> {
        let mut canonical = goals.to_vec();
        canonical.sort_unstable();
        canonical.dedup();
        let key = PathKey {
            start,
            goals: canonical,
        };

        if let Some(cached) = self.cache.paths.get(&key).cloned() {
            self.cache.hits += 1;
            return cached.ok_or_else(|| ClusterError::Unreachable {
                start,
                goals: key.goals.clone(),
            });
        }

        match breadth_first(self.graph, start, &key.goals) {
            Ok(path) => {
                self.cache.paths.insert(key, Some(path.clone()));
                Ok(path)
            }
            Err(err @ ClusterError::Unreachable { .. }) => {
                self.cache.paths.insert(key, None);
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    pub fn cache(&self) -> &PathCache {
        &self.cache
    }
}

/// `goals` must be sorted.
fn breadth_first(
    graph: &ConnectivityGraph,
    start: EntityId,
    goals: &[EntityId],
) -> Result<Vec<EntityId>> {
    let is_goal = |id: EntityId| goals.binary_search(&id).is_ok();

    let mut open = VecDeque::from([start]);
    let mut ancestors = HashMap::from([(start, start)]);
    let mut reached = None;

    'search: while let Some(next) = open.pop_front() {
        if is_goal(next) {
            reached = Some(next);
            break;
        }
        for neighbour in graph.neighbours(next) {
            if is_goal(neighbour) {
                ancestors.entry(neighbour).or_insert(next);
                reached = Some(neighbour);
                break 'search;
            }
            if let Entry::Vacant(slot) = ancestors.entry(neighbour) {
                slot.insert(next);
                open.push_back(neighbour);
            }
        }
    }

    let goal = reached.ok_or_else(|| ClusterError::Unreachable {
        start,
        goals: goals.to_vec(),
    })?;
    backtrack(&ancestors, start, goal)
}

/// Walks predecessors from `goal` back to `start`.
fn backtrack(
    ancestors: &HashMap<EntityId, EntityId>,
    start: EntityId,
    goal: EntityId,
) -> Result<Vec<EntityId>> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        let broken = ClusterError::FatalGraph {
            start,
            goal,
            node: current,
        };
        current = *ancestors.get(&current).ok_or(broken.clone())?;
        path.push(current);
        // a chain longer than the map itself can only be a cycle
        if path.len() > ancestors.len() + 1 {
            return Err(broken);
        }
    }
    path.reverse();
    Ok(path)
}

/// Length of `path` measured across area boundaries.
///
/// The first and last hops run from the entity location to the midpoint of
/// the boundary toward the next (previous) area; every interior area adds the
/// distance between the midpoints of its entry and exit boundaries.
///
/// # Errors
/// * `MissingPosition` if an endpoint has no stored coordinate
/// * `MissingBoundary` if neither side of a hop declares the shared boundary
pub fn path_length<W>(world: &W, coordinates: &CoordinateStore, path: &[EntityId]) -> Result<f64>
where
    W: WorldModel + ?Sized,
{
    if path.len() <= 1 {
        return Ok(0.0);
    }
    let last = path.len() - 1;

    let first_hop = coordinates
        .get(path[0])?
        .distance(&crossing(world, path[0], path[1])?);
    let last_hop = coordinates
        .get(path[last])?
        .distance(&crossing(world, path[last], path[last - 1])?);
    let interior = path
        .windows(3)
        .map(|w| Ok(crossing(world, w[1], w[0])?.distance(&crossing(world, w[1], w[2])?)))
        .sum::<Result<f64>>()?;

    Ok(first_hop + interior + last_hop)
}

/// Midpoint of the boundary between `area` and `toward`, preferring the
/// segment `area` declares and falling back to the mirrored declaration.
fn crossing<W>(world: &W, area: EntityId, toward: EntityId) -> Result<Point>
where
    W: WorldModel + ?Sized,
{
    world
        .boundary(area, toward)
        .or_else(|| world.boundary(toward, area))
        .map(|segment| segment.midpoint())
        .ok_or(ClusterError::MissingBoundary {
            area,
            neighbour: toward,
        })
}
