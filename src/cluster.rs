//! # Regional clustering
//!
//! Partitions the areas of a rescue map into `k` regions with Lloyd-style
//! k-means, then spreads the mobile agents over those regions.
//!
//! - [`ClusteringEngine`]: seeds centers, alternates assignment and center
//!   updates until the centers stop moving or the budget runs out.
//! - [`assign_agents`]: round-robin, nearest-first agent distribution.
//! - [`ClusterState`]: the finalized regions with O(1) reverse lookups.
//! - [`ClusterSnapshot`]: serializable form used to persist and resume results.

pub mod assign;
pub mod config;
pub mod kmeans;
pub mod snapshot;
pub mod state;


pub use assign::assign_agents;
pub use config::{ClusteringConfig, Phase};
pub use kmeans::{ClusterRun, ClusteringEngine, Termination};
pub use snapshot::ClusterSnapshot;
pub use state::{Cluster, ClusterState};
