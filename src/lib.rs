pub mod cluster;
pub mod error;
pub mod metric;
pub mod spatial;
pub mod world;

pub use cluster::{ClusterRun, ClusterState, ClusteringConfig, ClusteringEngine};
pub use error::{ClusterError, Result};
pub use metric::{DistanceMetric, MetricKind};
pub use world::{EntityId, World, WorldModel};
