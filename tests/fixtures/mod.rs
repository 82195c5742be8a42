//! Shared test fixtures

#![allow(dead_code)]

pub mod mock_cluster;

pub use mock_cluster::MockCluster;
