mod centroid;
mod distance;
mod kmeans;
mod types;

#[cfg(test)]
mod tests;

pub use kmeans::ClusteringEngine;
pub use types::{Centroid, Cluster, ClusterAssignment, ClusterResult, Seeding};
