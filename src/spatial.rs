//! Spatial indices built once per engine: coordinate lookup, area
//! connectivity and breadth-first path search over it.

pub mod connectivity;
pub mod coordinates;
pub mod path_finder;

pub use connectivity::ConnectivityGraph;
pub use coordinates::CoordinateStore;
pub use path_finder::{path_length, PathCache, ShortestPathFinder};
