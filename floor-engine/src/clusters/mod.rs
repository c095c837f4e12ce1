//! Table clusters - merged table groups per timeslot

mod builder;
mod cache;

pub use builder::{ClusterBuilder, build_clusters, cluster_frame, connected_components};
pub use cache::{ClusterCache, ClusterStats, DEFAULT_CLUSTER_CAPACITY};
