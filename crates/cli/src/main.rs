//! CLI binary to set up and tear down a local test cluster.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

use std::path::PathBuf;
use std::time::Duration;

use ccm_cluster::{
    ClusterManager, ClusterOptions, ExhaustionPolicy, NodeIndex, Readiness, ReadinessPolicy,
    Topology,
};
use ccm_process::{CommandSpec, ProcessExecutor};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

/// CLI-specific error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Cluster operation failed
    #[error(transparent)]
    Cluster(#[from] ccm_cluster::Error),
}

impl Error {
    /// Exit code of the tool, if the error came from a failed invocation.
    fn tool_exit_code(&self) -> Option<i32> {
        match self {
            Self::Cluster(ccm_cluster::Error::Process(e)) => {
                e.execution_result().map(|result| result.exit_code)
            }
            Self::Cluster(_) => None,
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the cluster-management tool
    #[arg(long, default_value = "ccm", env = "CCM_HARNESS_CCM_BIN")]
    ccm_bin: PathBuf,

    /// Name of the test cluster
    #[arg(long, default_value = "test", env = "CCM_HARNESS_CLUSTER_NAME")]
    cluster_name: String,

    /// Fail `start-all` when the readiness marker never appears
    #[arg(long, env = "CCM_HARNESS_FAIL_ON_READINESS_TIMEOUT")]
    fail_on_readiness_timeout: bool,

    /// Prefix that node indices are appended to for node addresses
    #[arg(long, default_value = "127.0.0.", env = "CCM_HARNESS_IP_PREFIX")]
    ip_prefix: String,

    /// Maximum number of log polls after starting the cluster
    #[arg(long, default_value_t = 10, env = "CCM_HARNESS_READINESS_ATTEMPTS")]
    readiness_attempts: u32,

    /// Delay between log polls in milliseconds
    #[arg(long, default_value_t = 1000, env = "CCM_HARNESS_READINESS_INTERVAL_MS")]
    readiness_interval_ms: u64,

    /// Database version to create the cluster with
    #[arg(long, default_value = "2.0.8", env = "CCM_HARNESS_CLUSTER_VERSION")]
    cluster_version: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Recreate the cluster, start it and wait until it accepts clients
    StartAll {
        /// Node counts per datacenter, colon-separated
        #[arg(long, default_value = "1")]
        topology: Topology,
    },

    /// Remove the cluster
    Remove,

    /// Stop every node
    Stop,

    /// Add a node at its derived address
    BootstrapNode {
        /// One-based node index
        index: u8,
    },

    /// Start a single node
    StartNode {
        /// One-based node index
        index: u8,
    },

    /// Stop a single node
    StopNode {
        /// One-based node index
        index: u8,
    },

    /// Pass arguments straight to the tool
    Exec {
        /// Arguments for the tool
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

impl Args {
    fn cluster_options(&self) -> ClusterOptions {
        let on_exhaustion = if self.fail_on_readiness_timeout {
            ExhaustionPolicy::Fail
        } else {
            ExhaustionPolicy::ReportReady
        };

        ClusterOptions {
            cluster_name: self.cluster_name.clone(),
            ip_prefix: self.ip_prefix.clone(),
            readiness: ReadinessPolicy {
                max_attempts: self.readiness_attempts,
                interval: Duration::from_millis(self.readiness_interval_ms),
                on_exhaustion,
                ..ReadinessPolicy::default()
            },
            version: self.cluster_version.clone(),
        }
    }
}

async fn run(args: Args) -> Result<(), Error> {
    let manager = ClusterManager::new(ProcessExecutor::new(&args.ccm_bin), args.cluster_options())?;

    match args.command {
        Command::StartAll { topology } => match manager.start_all(&topology).await? {
            Readiness::Satisfied { attempts } => {
                info!("cluster ready after {} poll(s)", attempts);
            }
            Readiness::Exhausted { attempts } => {
                warn!("cluster started, readiness unconfirmed after {} poll(s)", attempts);
            }
        },
        Command::Remove => manager.remove().await?,
        Command::Stop => manager.stop().await?,
        Command::BootstrapNode { index } => {
            manager
                .bootstrap_node(NodeIndex::new(index)?)
                .await?;
        }
        Command::StartNode { index } => manager.start_node(NodeIndex::new(index)?).await?,
        Command::StopNode { index } => manager.stop_node(NodeIndex::new(index)?).await?,
        Command::Exec { args } => {
            let result = manager.exec(&CommandSpec::new(args)).await?;
            for line in result.stdout {
                println!("{line}");
            }
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    let result = run(Args::parse()).await;

    if let Err(e) = &result {
        if let Some(code) = e.tool_exit_code() {
            error!("ccm exited with code {}", code);
        }
    }

    result
}
