//! A started cluster that cleans up after itself.

use std::fmt;
use std::thread;

use ccm_process::{CommandRunner, ProcessExecutor};
use tokio::runtime;
use tracing::{info, warn};

use crate::error::Result;
use crate::manager::ClusterManager;
use crate::readiness::Readiness;
use crate::topology::Topology;

/// A cluster started by [`TestCluster::start`].
///
/// Call [`TestCluster::shutdown`] to remove it. If the guard is dropped
/// instead, the drop blocks until a best-effort removal has run, unless
/// [`TestCluster::set_keep_on_drop`] asked to keep the cluster around.
/// Removal runs on its own thread and runtime, so it completes even when the
/// guard is dropped as the caller's runtime shuts down.
pub struct TestCluster<R = ProcessExecutor>
where
    R: CommandRunner,
{
    keep_on_drop: bool,
    manager: ClusterManager<R>,
    readiness: Readiness,
    released: bool,
    topology: Topology,
}

impl<R> fmt::Debug for TestCluster<R>
where
    R: CommandRunner,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCluster")
            .field("keep_on_drop", &self.keep_on_drop)
            .field("manager", &self.manager)
            .field("readiness", &self.readiness)
            .field("topology", &self.topology)
            .finish_non_exhaustive()
    }
}

impl<R> TestCluster<R>
where
    R: CommandRunner,
{
    /// Starts a fresh cluster with `topology`.
    ///
    /// # Errors
    ///
    /// Returns the error of [`ClusterManager::start_all`].
    pub async fn start(manager: ClusterManager<R>, topology: Topology) -> Result<Self> {
        let readiness = manager.start_all(&topology).await?;

        Ok(Self {
            keep_on_drop: false,
            manager,
            readiness,
            released: false,
            topology,
        })
    }

    /// Returns the manager for further operations on the cluster.
    #[must_use]
    pub const fn manager(&self) -> &ClusterManager<R> {
        &self.manager
    }

    /// Returns how readiness was established.
    pub const fn readiness(&self) -> Readiness {
        self.readiness
    }

    /// Returns the topology the cluster was started with.
    #[must_use]
    pub const fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Keeps the cluster running when the guard is dropped.
    pub const fn set_keep_on_drop(&mut self, keep: bool) {
        self.keep_on_drop = keep;
    }

    /// Removes the cluster.
    ///
    /// # Errors
    ///
    /// Returns the tool's error.
    pub async fn shutdown(mut self) -> Result<()> {
        self.released = true;

        info!("removing test cluster");
        self.manager.remove().await
    }
}

impl<R> Drop for TestCluster<R>
where
    R: CommandRunner,
{
    fn drop(&mut self) {
        if self.released {
            return;
        }

        if self.keep_on_drop {
            info!("keeping test cluster running");
            return;
        }

        let manager = self.manager.clone();
        let cleanup = thread::Builder::new()
            .name("test-cluster-cleanup".to_string())
            .spawn(move || remove_blocking(&manager));

        match cleanup {
            Ok(handle) => {
                if handle.join().is_err() {
                    warn!("test cluster cleanup panicked");
                }
            }
            Err(e) => warn!("failed to spawn test cluster cleanup, cluster left running: {}", e),
        }
    }
}

fn remove_blocking<R>(manager: &ClusterManager<R>)
where
    R: CommandRunner,
{
    let runtime = match runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            warn!("failed to build cleanup runtime, cluster left running: {}", e);
            return;
        }
    };

    if let Err(e) = runtime.block_on(manager.remove()) {
        warn!("failed to remove test cluster: {}", e);
    }
}
