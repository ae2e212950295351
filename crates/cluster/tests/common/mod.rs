//! Scripted stand-in for the cluster-management tool.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use ccm_cluster::{ClusterManager, ClusterOptions};
use ccm_process::{CommandRunner, CommandSpec, ExecutionError, ExecutionResult, Result};
use parking_lot::Mutex;
use tokio::time::Instant;

/// Log line the default readiness policy looks for.
pub const READY_LOG_LINE: &str =
    "INFO  [main] 2024-05-02 10:00:01,123 Server.java:155 - Starting listening for CQL clients on /127.0.0.1:9042...";

/// Canned reply for one invocation of a command.
pub enum Reply {
    /// Exit 0 with the given stdout lines.
    Output(Vec<String>),

    /// Exit with a non-zero code and a single stderr line.
    Failure { exit_code: i32, stderr: String },
}

/// Stdout of a `showlog` that does not contain the marker yet.
pub fn pending_log() -> Reply {
    Reply::Output(vec![
        "INFO  [main] 2024-05-02 10:00:00,001 Loading settings".to_string(),
        "INFO  [main] 2024-05-02 10:00:00,420 Initializing system keyspace".to_string(),
    ])
}

/// Stdout of a `showlog` once the node accepts clients.
pub fn ready_log() -> Reply {
    Reply::Output(vec![
        "INFO  [main] 2024-05-02 10:00:00,001 Loading settings".to_string(),
        READY_LOG_LINE.to_string(),
    ])
}

/// A failed invocation.
pub fn failure(exit_code: i32, stderr: &str) -> Reply {
    Reply::Failure {
        exit_code,
        stderr: stderr.to_string(),
    }
}

/// Records every command and answers from a per-command queue of replies.
///
/// Commands without a queued reply succeed with no output.
#[derive(Default)]
pub struct ScriptedRunner {
    calls: Mutex<Vec<(String, Instant)>>,
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `reply` for the next unanswered invocation of `command`.
    pub fn reply(self, command: &str, reply: Reply) -> Self {
        self.replies
            .lock()
            .entry(command.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Queues the same reply `times` times.
    pub fn reply_times(mut self, command: &str, times: usize, reply: impl Fn() -> Reply) -> Self {
        for _ in 0..times {
            self = self.reply(command, reply());
        }
        self
    }

    /// Every command run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(c, _)| c.clone()).collect()
    }

    /// When each invocation of `command` happened.
    pub fn call_times(&self, command: &str) -> Vec<Instant> {
        self.calls
            .lock()
            .iter()
            .filter(|(c, _)| c == command)
            .map(|(_, at)| *at)
            .collect()
    }

    /// How many times `command` was run.
    pub fn count(&self, command: &str) -> usize {
        self.call_times(command).len()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn execute(&self, command: &CommandSpec) -> Result<ExecutionResult> {
        let key = command.to_string();
        self.calls.lock().push((key.clone(), Instant::now()));

        let reply = self
            .replies
            .lock()
            .get_mut(&key)
            .and_then(VecDeque::pop_front);

        let result = match reply {
            None => ExecutionResult::default(),
            Some(Reply::Output(stdout)) => ExecutionResult {
                exit_code: 0,
                stdout,
                stderr: Vec::new(),
            },
            Some(Reply::Failure { exit_code, stderr }) => ExecutionResult {
                exit_code,
                stdout: Vec::new(),
                stderr: vec![stderr],
            },
        };

        ExecutionError::check(result).map_err(Into::into)
    }
}

/// A manager with default options driving `runner`.
pub fn manager(runner: ScriptedRunner) -> ClusterManager<ScriptedRunner> {
    ClusterManager::new(runner, ClusterOptions::default()).expect("default options are valid")
}
