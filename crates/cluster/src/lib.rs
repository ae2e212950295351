//! Provisions, starts and tears down a local database cluster for integration tests.
//!
//! All work is delegated to the `ccm` cluster-management tool through
//! [`ccm_process`]. Multi-step workflows run one command at a time and stop at
//! the first failure; after a start, the first node's log is polled until the
//! cluster reports that it accepts CQL clients.
//!
//! # Example
//!
//! ```rust,no_run
//! use ccm_cluster::{ClusterManager, ClusterOptions, NodeIndex, Result, Topology};
//!
//! async fn run() -> Result<()> {
//!     let manager = ClusterManager::local(ClusterOptions::default())?;
//!
//!     let topology: Topology = "3:2".parse()?;
//!     let readiness = manager.start_all(&topology).await?;
//!     assert!(readiness.is_satisfied());
//!
//!     manager.bootstrap_node(NodeIndex::new(6)?).await?;
//!     manager.start_node(NodeIndex::new(6)?).await?;
//!
//!     manager.remove().await
//! }
//! ```
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

pub mod commands;
mod error;
mod manager;
mod node;
mod options;
mod readiness;
mod sequence;
mod test_cluster;
mod topology;

pub use error::{Error, Result};
pub use manager::{ClusterManager, SetupStep};
pub use node::NodeIndex;
pub use options::ClusterOptions;
pub use readiness::{ExhaustionPolicy, READINESS_MARKER, Readiness, ReadinessPolicy, UpPoller};
pub use sequence::run_sequence;
pub use test_cluster::TestCluster;
pub use topology::Topology;
