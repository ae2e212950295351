use std::fmt;

use crate::error::Error;

const JMX_BASE_PORT: u16 = 7000;
const JMX_PORT_STRIDE: u16 = 100;

/// One-based index of a node in the cluster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(u8);

impl NodeIndex {
    /// The first node, whose log is polled for readiness.
    pub const FIRST: Self = Self(1);

    /// Creates a new `NodeIndex`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is 0.
    pub const fn new(index: u8) -> Result<Self, Error> {
        if index == 0 {
            return Err(Error::InvalidNodeIndex(index));
        }

        Ok(Self(index))
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Returns the name the tool uses for this node, e.g. `node3`.
    #[must_use]
    pub fn name(self) -> String {
        format!("node{}", self.0)
    }

    /// Returns the node's address: the prefix followed by the index.
    #[must_use]
    pub fn ip_address(self, prefix: &str) -> String {
        format!("{prefix}{}", self.0)
    }

    /// Returns the node's JMX port: `7000 + 100 * index`.
    #[must_use]
    pub fn jmx_port(self) -> u16 {
        JMX_BASE_PORT + JMX_PORT_STRIDE * u16::from(self.0)
    }
}

impl TryFrom<u8> for NodeIndex {
    type Error = Error;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::new(index)
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node{}", self.0)
    }
}
