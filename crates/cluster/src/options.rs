use crate::readiness::ReadinessPolicy;

const DEFAULT_CLUSTER_NAME: &str = "test";
const DEFAULT_IP_PREFIX: &str = "127.0.0.";
const DEFAULT_VERSION: &str = "2.0.8";

/// Options for configuring a `ClusterManager`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterOptions {
    /// Name given to the cluster on creation.
    pub cluster_name: String,

    /// Prefix that node indices are appended to when building node addresses.
    pub ip_prefix: String,

    /// How readiness is polled after the cluster starts.
    pub readiness: ReadinessPolicy,

    /// Database version the cluster is created with.
    pub version: String,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            cluster_name: DEFAULT_CLUSTER_NAME.to_string(),
            ip_prefix: DEFAULT_IP_PREFIX.to_string(),
            readiness: ReadinessPolicy::default(),
            version: DEFAULT_VERSION.to_string(),
        }
    }
}
