//! Argument lists understood by the cluster-management tool.

use ccm_process::CommandSpec;

use crate::node::NodeIndex;
use crate::topology::Topology;

/// `remove`
#[must_use]
pub fn remove() -> CommandSpec {
    CommandSpec::new(["remove"])
}

/// `create <name> -v <version>`
#[must_use]
pub fn create(name: &str, version: &str) -> CommandSpec {
    CommandSpec::new(["create", name, "-v", version])
}

/// `populate -n <topology>`
#[must_use]
pub fn populate(topology: &Topology) -> CommandSpec {
    CommandSpec::new(["populate".to_string(), "-n".to_string(), topology.to_string()])
}

/// `start`
#[must_use]
pub fn start() -> CommandSpec {
    CommandSpec::new(["start"])
}

/// `stop`
#[must_use]
pub fn stop() -> CommandSpec {
    CommandSpec::new(["stop"])
}

/// `add node<N> -i <ip> -j <jmx port> -b`
///
/// `-b` enables the binary protocol on the new node.
#[must_use]
pub fn add_node(node: NodeIndex, ip_prefix: &str) -> CommandSpec {
    CommandSpec::new([
        "add".to_string(),
        node.name(),
        "-i".to_string(),
        node.ip_address(ip_prefix),
        "-j".to_string(),
        node.jmx_port().to_string(),
        "-b".to_string(),
    ])
}

/// `node<N> start`
#[must_use]
pub fn node_start(node: NodeIndex) -> CommandSpec {
    CommandSpec::new([node.name(), "start".to_string()])
}

/// `node<N> stop`
#[must_use]
pub fn node_stop(node: NodeIndex) -> CommandSpec {
    CommandSpec::new([node.name(), "stop".to_string()])
}

/// `node<N> showlog`
#[must_use]
pub fn show_log(node: NodeIndex) -> CommandSpec {
    CommandSpec::new([node.name(), "showlog".to_string()])
}
