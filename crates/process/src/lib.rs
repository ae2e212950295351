//! Runs the cluster-management tool as a child process and classifies the result.
//!
//! Every invocation resolves exactly once, keyed off the process-exit event.
//! Output is buffered line by line in arrival order, and a non-zero exit is
//! turned into an [`ExecutionError`] carrying the full [`ExecutionResult`].
//!
//! # Example
//!
//! ```rust,no_run
//! use ccm_process::{CommandSpec, ProcessExecutor, Result};
//!
//! async fn run() -> Result<()> {
//!     let executor = ProcessExecutor::new("ccm");
//!
//!     let result = executor.execute(&CommandSpec::new(["node1", "showlog"])).await?;
//!
//!     for line in &result.stdout {
//!         println!("{line}");
//!     }
//!
//!     Ok(())
//! }
//! ```
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::debug;

mod command;
mod completion;
mod error;
mod executor;

pub use command::CommandSpec;
pub use completion::Completion;
pub use error::{Error, ExecutionError, Result};
pub use executor::{ExecutionResult, ProcessExecutor};

/// Something that can run a [`CommandSpec`] against the cluster-management tool.
///
/// [`ProcessExecutor`] is the real implementation. Workflows are written
/// against this trait so they can be driven by a scripted runner in tests.
#[async_trait]
pub trait CommandRunner
where
    Self: Send + Sync + 'static,
{
    /// Runs the command to completion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Execution`] if the tool exits with a non-zero status, or
    /// an IO error if the tool could not be run at all.
    async fn execute(&self, command: &CommandSpec) -> Result<ExecutionResult>;

    /// Runs the command in the background, discarding its result.
    ///
    /// Failures are only logged. Meant for best-effort cleanup.
    fn execute_detached(self: Arc<Self>, command: CommandSpec) -> JoinHandle<()> {
        tokio::spawn(async move {
            match self.execute(&command).await {
                Ok(_) => debug!("detached command `{}` completed", command),
                Err(e) => debug!("detached command `{}` failed: {}", command, e),
            }
        })
    }
}
