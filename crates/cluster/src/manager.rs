//! Cluster lifecycle workflows built from tool invocations.

use std::fmt;
use std::sync::Arc;

use ccm_process::{CommandRunner, CommandSpec, ExecutionResult, ProcessExecutor};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::commands;
use crate::error::Result;
use crate::node::NodeIndex;
use crate::options::ClusterOptions;
use crate::readiness::{Readiness, UpPoller};
use crate::sequence::run_sequence;
use crate::topology::Topology;

/// Steps run by [`ClusterManager::start_all`] before readiness polling, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetupStep {
    /// Remove any cluster left behind. Failure is ignored.
    RemoveExisting,

    /// Create the cluster at the configured version.
    Create,

    /// Add nodes according to the topology.
    Populate,

    /// Start every node.
    Start,
}

impl SetupStep {
    /// Every step, in execution order.
    pub const ALL: [Self; 4] = [Self::RemoveExisting, Self::Create, Self::Populate, Self::Start];
}

impl fmt::Display for SetupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoveExisting => f.write_str("remove existing"),
            Self::Create => f.write_str("create"),
            Self::Populate => f.write_str("populate"),
            Self::Start => f.write_str("start"),
        }
    }
}

/// Drives the cluster-management tool through the test cluster's lifecycle.
///
/// The manager keeps no record of which cluster exists; the tool is the
/// authority on that, so every call builds its command from scratch.
pub struct ClusterManager<R = ProcessExecutor>
where
    R: CommandRunner,
{
    cluster_name: String,
    ip_prefix: String,
    poller: UpPoller,
    runner: Arc<R>,
    version: String,
}

impl<R> Clone for ClusterManager<R>
where
    R: CommandRunner,
{
    fn clone(&self) -> Self {
        Self {
            cluster_name: self.cluster_name.clone(),
            ip_prefix: self.ip_prefix.clone(),
            poller: self.poller.clone(),
            runner: Arc::clone(&self.runner),
            version: self.version.clone(),
        }
    }
}

impl<R> fmt::Debug for ClusterManager<R>
where
    R: CommandRunner,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterManager")
            .field("cluster_name", &self.cluster_name)
            .field("ip_prefix", &self.ip_prefix)
            .field("poller", &self.poller)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl ClusterManager<ProcessExecutor> {
    /// Creates a manager that runs `ccm` from the `PATH`.
    ///
    /// # Errors
    ///
    /// Returns an error if the readiness marker is invalid.
    pub fn local(options: ClusterOptions) -> Result<Self> {
        Self::new(ProcessExecutor::default(), options)
    }
}

impl<R> ClusterManager<R>
where
    R: CommandRunner,
{
    /// Creates a new `ClusterManager` running commands through `runner`.
    ///
    /// # Errors
    ///
    /// Returns an error if the readiness marker is invalid.
    pub fn new(
        runner: R,
        ClusterOptions {
            cluster_name,
            ip_prefix,
            readiness,
            version,
        }: ClusterOptions,
    ) -> Result<Self> {
        Ok(Self {
            cluster_name,
            ip_prefix,
            poller: UpPoller::new(&readiness)?,
            runner: Arc::new(runner),
            version,
        })
    }

    /// Returns the runner commands go through.
    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Recreates the cluster from scratch and waits until it accepts clients.
    ///
    /// Runs the [`SetupStep`]s in order, then polls for readiness.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing step other than the initial
    /// cleanup, or the readiness error.
    pub async fn start_all(&self, topology: &Topology) -> Result<Readiness> {
        info!(
            "starting cluster `{}` at version {} with topology {}",
            self.cluster_name, self.version, topology
        );

        run_sequence(SetupStep::ALL, |step| self.run_setup_step(step, topology)).await?;

        self.await_ready().await
    }

    /// Polls the first node's log until the cluster accepts clients.
    ///
    /// # Errors
    ///
    /// See [`UpPoller::poll`].
    pub async fn await_ready(&self) -> Result<Readiness> {
        self.poller.poll(self.runner.as_ref()).await
    }

    /// Removes the cluster.
    ///
    /// # Errors
    ///
    /// Returns the tool's error, including when there is no cluster to remove.
    pub async fn remove(&self) -> Result<()> {
        self.run(&commands::remove()).await
    }

    /// Removes the cluster in the background, ignoring failure.
    pub fn remove_detached(&self) -> JoinHandle<()> {
        Arc::clone(&self.runner).execute_detached(commands::remove())
    }

    /// Stops every node.
    ///
    /// # Errors
    ///
    /// Returns the tool's error.
    pub async fn stop(&self) -> Result<()> {
        self.run(&commands::stop()).await
    }

    /// Adds a node with binary protocol enabled at its derived address and JMX port.
    ///
    /// # Errors
    ///
    /// Returns the tool's error.
    pub async fn bootstrap_node(&self, node: NodeIndex) -> Result<()> {
        info!("bootstrapping {} at {}", node, node.ip_address(&self.ip_prefix));

        self.run(&commands::add_node(node, &self.ip_prefix)).await
    }

    /// Starts a single node.
    ///
    /// # Errors
    ///
    /// Returns the tool's error.
    pub async fn start_node(&self, node: NodeIndex) -> Result<()> {
        self.run(&commands::node_start(node)).await
    }

    /// Stops a single node.
    ///
    /// # Errors
    ///
    /// Returns the tool's error.
    pub async fn stop_node(&self, node: NodeIndex) -> Result<()> {
        self.run(&commands::node_stop(node)).await
    }

    /// Runs an arbitrary command, for operations without a dedicated method.
    ///
    /// # Errors
    ///
    /// Returns the tool's error.
    pub async fn exec(&self, command: &CommandSpec) -> Result<ExecutionResult> {
        Ok(self.runner.execute(command).await?)
    }

    async fn run_setup_step(&self, step: SetupStep, topology: &Topology) -> Result<()> {
        debug!("setup step: {}", step);

        match step {
            SetupStep::RemoveExisting => {
                if let Err(e) = self.runner.execute(&commands::remove()).await {
                    debug!("nothing removed before create: {}", e);
                }

                Ok(())
            }
            SetupStep::Create => {
                self.run(&commands::create(&self.cluster_name, &self.version))
                    .await
            }
            SetupStep::Populate => self.run(&commands::populate(topology)).await,
            SetupStep::Start => self.run(&commands::start()).await,
        }
    }

    async fn run(&self, command: &CommandSpec) -> Result<()> {
        self.runner.execute(command).await?;

        Ok(())
    }
}
