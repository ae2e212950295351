//! Node counts per datacenter.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use crate::error::Error;

/// Node count of a cluster, one entry per datacenter.
///
/// Encoded as a colon-separated list of counts, so `"3:2"` is two datacenters
/// of three and two nodes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Topology {
    datacenters: Vec<NonZeroU32>,
}

impl Topology {
    /// A single datacenter with `count` nodes.
    #[must_use]
    pub fn nodes(count: NonZeroU32) -> Self {
        Self {
            datacenters: vec![count],
        }
    }

    /// One datacenter per entry in `counts`.
    ///
    /// # Errors
    ///
    /// Returns an error if `counts` is empty.
    pub fn datacenters<I>(counts: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = NonZeroU32>,
    {
        let datacenters: Vec<_> = counts.into_iter().collect();

        if datacenters.is_empty() {
            return Err(Error::InvalidTopology(
                String::new(),
                "at least one datacenter is required",
            ));
        }

        Ok(Self { datacenters })
    }

    /// Node counts, one per datacenter.
    #[must_use]
    pub fn datacenter_counts(&self) -> &[NonZeroU32] {
        &self.datacenters
    }

    /// Total number of nodes across all datacenters.
    #[must_use]
    pub fn total_nodes(&self) -> u32 {
        self.datacenters.iter().map(|count| count.get()).sum()
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<String> = self.datacenters.iter().map(ToString::to_string).collect();
        f.write_str(&counts.join(":"))
    }
}

impl FromStr for Topology {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| Error::InvalidTopology(s.to_string(), reason);

        if s.trim().is_empty() {
            return Err(invalid("empty topology"));
        }

        let datacenters = s
            .split(':')
            .map(|segment| {
                let count: u32 = segment
                    .trim()
                    .parse()
                    .map_err(|_| invalid("node counts must be numbers"))?;
                NonZeroU32::new(count).ok_or_else(|| invalid("node counts must be positive"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { datacenters })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(count: u32) -> NonZeroU32 {
        NonZeroU32::new(count).unwrap()
    }

    #[test]
    fn test_single_datacenter() {
        let topology: Topology = "1".parse().unwrap();

        assert_eq!(topology, Topology::nodes(n(1)));
        assert_eq!(topology.total_nodes(), 1);
        assert_eq!(topology.to_string(), "1");
    }

    #[test]
    fn test_multiple_datacenters() {
        let topology: Topology = "3:2".parse().unwrap();

        assert_eq!(topology.datacenter_counts(), &[n(3), n(2)]);
        assert_eq!(topology.total_nodes(), 5);
        assert_eq!(topology.to_string(), "3:2");
    }

    #[test]
    fn test_rejects_malformed_topologies() {
        for input in ["", "  ", "3:", ":2", "a", "3:0", "-1"] {
            let err = input.parse::<Topology>().unwrap_err();
            assert!(
                matches!(err, Error::InvalidTopology(ref raw, _) if raw == input),
                "unexpected result for {input:?}: {err:?}"
            );
        }
    }

    #[test]
    fn test_datacenters_requires_one_entry() {
        assert!(Topology::datacenters(Vec::new()).is_err());
        assert_eq!(
            Topology::datacenters([n(2), n(2)]).unwrap().to_string(),
            "2:2"
        );
    }
}
