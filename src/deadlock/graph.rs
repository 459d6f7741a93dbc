//! Wait-for graph construction
//!
//! An edge `i -> k` means process `i` is blocked on a resource type that
//! process `k` currently holds units of.
//!
//! With [`WaitEdgePolicy::FirstBlockingResource`] (the default) only the
//! first resource type, in index order, whose outstanding request exceeds
//! Available contributes edges for a given process; scanning stops there.
//! This is a deliberate simplification: it changes which edges appear, and
//! one blocking resource is enough evidence that the process waits.
//! [`WaitEdgePolicy::AllBlockingResources`] records every blocking resource
//! type instead.
//!
//! Every holder of the blocking resource gets an edge, the waiter included.
//! A process holding units of a resource it is blocked on therefore gets a
//! self-edge, which the cycle detector reports as a one-process deadlock.

use crate::banker::{ProcessId, Units};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WaitEdgePolicy {
    #[default]
    FirstBlockingResource,
    AllBlockingResources,
}

impl std::str::FromStr for WaitEdgePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "first" | "first-blocking-resource" => Ok(WaitEdgePolicy::FirstBlockingResource),
            "all" | "all-blocking-resources" => Ok(WaitEdgePolicy::AllBlockingResources),
            _ => Err(Error::ConfigError(format!("Invalid wait edge policy: {}", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaitForGraph {
    adjacency: Vec<Vec<ProcessId>>,
}

impl WaitForGraph {
    pub fn new(node_count: usize) -> Self {
        WaitForGraph {
            adjacency: vec![Vec::new(); node_count],
        }
    }

    /// Adds `from -> to`. Duplicate edges are ignored; successors stay sorted.
    pub fn add_edge(&mut self, from: ProcessId, to: ProcessId) -> Result<()> {
        let process_count = self.adjacency.len();
        for endpoint in [from, to] {
            if endpoint.index() >= process_count {
                return Err(Error::ProcessOutOfRange {
                    process: endpoint.index(),
                    process_count,
                });
            }
        }
        let row = &mut self.adjacency[from.index()];
        if let Err(pos) = row.binary_search(&to) {
            row.insert(pos, to);
        }
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    pub fn successors(&self, node: ProcessId) -> &[ProcessId] {
        &self.adjacency[node.index()]
    }

    pub fn has_edge(&self, from: ProcessId, to: ProcessId) -> bool {
        self.adjacency
            .get(from.index())
            .map(|row| row.binary_search(&to).is_ok())
            .unwrap_or(false)
    }

    pub fn edges(&self) -> impl Iterator<Item = (ProcessId, ProcessId)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(i, row)| row.iter().map(move |&k| (ProcessId(i), k)))
    }
}

impl fmt::Display for WaitForGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "WaitForGraph ({} nodes, {} edges):", self.node_count(), self.edge_count())?;
        for (i, row) in self.adjacency.iter().enumerate() {
            if row.is_empty() {
                continue;
            }
            let targets: Vec<String> = row.iter().map(|p| p.to_string()).collect();
            writeln!(f, "  P{} -> {}", i, targets.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WaitForGraphBuilder {
    policy: WaitEdgePolicy,
}

impl WaitForGraphBuilder {
    pub fn new(policy: WaitEdgePolicy) -> Self {
        WaitForGraphBuilder { policy }
    }

    pub fn policy(&self) -> WaitEdgePolicy {
        self.policy
    }

    /// Derives the wait-for graph from outstanding requests.
    ///
    /// The process count is `allocation.len()` and the resource count is
    /// `available.len()`. Every allocation row and every request must have
    /// that many columns, and every requesting process must be in range.
    pub fn build(
        &self,
        requests: &BTreeMap<ProcessId, Vec<Units>>,
        available: &[Units],
        allocation: &[Vec<Units>],
    ) -> Result<WaitForGraph> {
        let process_count = allocation.len();
        let resource_count = available.len();

        for (i, row) in allocation.iter().enumerate() {
            if row.len() != resource_count {
                return Err(Error::dimension(
                    format!("allocation row {}", i),
                    resource_count,
                    row.len(),
                ));
            }
        }
        for (process, request) in requests {
            if process.index() >= process_count {
                return Err(Error::ProcessOutOfRange {
                    process: process.index(),
                    process_count,
                });
            }
            if request.len() != resource_count {
                return Err(Error::dimension(
                    format!("request of {}", process),
                    resource_count,
                    request.len(),
                ));
            }
        }

        let mut graph = WaitForGraph::new(process_count);
        for (&waiter, request) in requests {
            let blocking = request
                .iter()
                .zip(available)
                .enumerate()
                .filter(|(_, (wanted, free))| wanted > free)
                .map(|(j, _)| j);

            for resource in blocking {
                for (k, row) in allocation.iter().enumerate() {
                    if row[resource] > 0 {
                        trace!("{} waits on P{} for resource {}", waiter, k, resource);
                        graph.add_edge(waiter, ProcessId(k))?;
                    }
                }
                if self.policy == WaitEdgePolicy::FirstBlockingResource {
                    break;
                }
            }
        }

        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requests(rows: Vec<Vec<Units>>) -> BTreeMap<ProcessId, Vec<Units>> {
        rows.into_iter()
            .enumerate()
            .map(|(i, r)| (ProcessId(i), r))
            .collect()
    }

    #[test]
    fn test_classic_detection_edges() {
        let reqs = requests(vec![vec![0, 0, 1], vec![1, 0, 0], vec![0, 1, 0]]);
        let alloc = vec![vec![1, 1, 0], vec![0, 2, 1], vec![1, 1, 0]];
        let graph = WaitForGraphBuilder::default()
            .build(&reqs, &[0, 0, 0], &alloc)
            .unwrap();

        let edges: Vec<_> = graph.edges().map(|(a, b)| (a.0, b.0)).collect();
        assert_eq!(edges, vec![(0, 1), (1, 0), (1, 2), (2, 0), (2, 1), (2, 2)]);
    }

    #[test]
    fn test_first_blocking_resource_only() {
        // P0 is blocked on resource 0 (held by P1) and resource 1 (held by P2).
        let reqs = requests(vec![vec![1, 1], vec![0, 0], vec![0, 0]]);
        let alloc = vec![vec![0, 0], vec![1, 0], vec![0, 1]];

        let first = WaitForGraphBuilder::default()
            .build(&reqs, &[0, 0], &alloc)
            .unwrap();
        assert!(first.has_edge(ProcessId(0), ProcessId(1)));
        assert!(!first.has_edge(ProcessId(0), ProcessId(2)));

        let all = WaitForGraphBuilder::new(WaitEdgePolicy::AllBlockingResources)
            .build(&reqs, &[0, 0], &alloc)
            .unwrap();
        assert!(all.has_edge(ProcessId(0), ProcessId(1)));
        assert!(all.has_edge(ProcessId(0), ProcessId(2)));
    }

    #[test]
    fn test_satisfiable_request_adds_no_edge() {
        let reqs = requests(vec![vec![1, 0]]);
        let graph = WaitForGraphBuilder::default()
            .build(&reqs, &[1, 0], &[vec![0, 3]])
            .unwrap();
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_holder_of_blocking_resource_waits_on_itself() {
        let reqs = requests(vec![vec![2]]);
        let graph = WaitForGraphBuilder::default()
            .build(&reqs, &[0], &[vec![1], vec![1]])
            .unwrap();
        assert!(graph.has_edge(ProcessId(0), ProcessId(0)));
        assert!(graph.has_edge(ProcessId(0), ProcessId(1)));

        let reqs = requests(vec![vec![1]]);
        let graph = WaitForGraphBuilder::default()
            .build(&reqs, &[0], &[vec![1]])
            .unwrap();
        assert_eq!(graph.edges().collect::<Vec<_>>(), vec![(ProcessId(0), ProcessId(0))]);
    }

    #[test]
    fn test_self_held_resource_ends_scan() {
        // Resource 0 is blocked and only P0 holds it; resource 1 is never reached.
        let reqs = requests(vec![vec![1, 1], vec![0, 0]]);
        let alloc = vec![vec![1, 0], vec![0, 1]];
        let graph = WaitForGraphBuilder::default()
            .build(&reqs, &[0, 0], &alloc)
            .unwrap();
        assert!(graph.has_edge(ProcessId(0), ProcessId(0)));
        assert!(!graph.has_edge(ProcessId(0), ProcessId(1)));

        let all = WaitForGraphBuilder::new(WaitEdgePolicy::AllBlockingResources)
            .build(&reqs, &[0, 0], &alloc)
            .unwrap();
        assert!(all.has_edge(ProcessId(0), ProcessId(1)));
    }

    #[test]
    fn test_blocking_resource_nobody_holds_ends_scan() {
        let reqs = requests(vec![vec![1, 1], vec![0, 0]]);
        let alloc = vec![vec![0, 0], vec![0, 1]];
        let graph = WaitForGraphBuilder::default()
            .build(&reqs, &[0, 0], &alloc)
            .unwrap();
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_rejects_bad_shapes() {
        let builder = WaitForGraphBuilder::default();
        let mut reqs = BTreeMap::new();
        reqs.insert(ProcessId(3), vec![0]);
        assert!(matches!(
            builder.build(&reqs, &[0], &[vec![0]]),
            Err(Error::ProcessOutOfRange { process: 3, .. })
        ));

        let reqs = requests(vec![vec![0, 0]]);
        assert!(matches!(
            builder.build(&reqs, &[0], &[vec![0]]),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            "first".parse::<WaitEdgePolicy>().unwrap(),
            WaitEdgePolicy::FirstBlockingResource
        );
        assert_eq!(
            "ALL".parse::<WaitEdgePolicy>().unwrap(),
            WaitEdgePolicy::AllBlockingResources
        );
        assert!("some".parse::<WaitEdgePolicy>().is_err());
    }

    #[test]
    fn test_add_edge_dedups_and_sorts() {
        let mut graph = WaitForGraph::new(3);
        graph.add_edge(ProcessId(0), ProcessId(2)).unwrap();
        graph.add_edge(ProcessId(0), ProcessId(1)).unwrap();
        graph.add_edge(ProcessId(0), ProcessId(2)).unwrap();
        assert_eq!(graph.successors(ProcessId(0)), &[ProcessId(1), ProcessId(2)]);
        assert_eq!(graph.edge_count(), 2);
        assert!(format!("{graph}").contains("P0 -> P1, P2"));
    }

    #[test]
    fn test_add_edge_rejects_unknown_nodes() {
        let mut graph = WaitForGraph::new(2);
        assert!(matches!(
            graph.add_edge(ProcessId(0), ProcessId(2)),
            Err(Error::ProcessOutOfRange { process: 2, process_count: 2 })
        ));
        assert!(matches!(
            graph.add_edge(ProcessId(5), ProcessId(1)),
            Err(Error::ProcessOutOfRange { process: 5, .. })
        ));
        assert_eq!(graph.edge_count(), 0);
    }
}
