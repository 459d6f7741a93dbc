// Deadlock Detection (cycle search over the wait-for graph)
use super::graph::WaitForGraph;
use crate::banker::{format_sequence, ProcessId};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadlockResult {
    pub deadlocked: bool,
    /// Processes on the first cycle found, in wait order: each one waits on
    /// the next, and the last waits on the first. Empty when no deadlock.
    pub cycle: Vec<ProcessId>,
}

impl DeadlockResult {
    pub fn none() -> Self {
        DeadlockResult {
            deadlocked: false,
            cycle: Vec::new(),
        }
    }
}

pub struct CycleDetector;

impl CycleDetector {
    /// Depth-first search from every unvisited node, so disconnected graphs
    /// are covered. The first edge back into a node on the current path is
    /// reported as a deadlock.
    ///
    /// Uses an explicit stack of `(node, next successor index)` frames
    /// instead of recursion. Every node is expanded at most once: O(P + E).
    pub fn detect(graph: &WaitForGraph) -> DeadlockResult {
        let node_count = graph.node_count();
        let mut visited = vec![false; node_count];
        let mut on_path = vec![false; node_count];
        let mut path: Vec<ProcessId> = Vec::new();
        let mut stack: Vec<(ProcessId, usize)> = Vec::new();

        for root in (0..node_count).map(ProcessId) {
            if visited[root.index()] {
                continue;
            }
            visited[root.index()] = true;
            on_path[root.index()] = true;
            path.push(root);
            stack.push((root, 0));

            while let Some(frame) = stack.last_mut() {
                let (node, next) = *frame;
                let successors = graph.successors(node);

                if next == successors.len() {
                    on_path[node.index()] = false;
                    path.pop();
                    stack.pop();
                    continue;
                }
                frame.1 += 1;

                let target = successors[next];
                if on_path[target.index()] {
                    let start = path
                        .iter()
                        .position(|&p| p == target)
                        .unwrap_or_default();
                    let cycle = path[start..].to_vec();
                    debug!("Deadlock detected: cycle {}", format_sequence(&cycle));
                    return DeadlockResult {
                        deadlocked: true,
                        cycle,
                    };
                }
                if !visited[target.index()] {
                    visited[target.index()] = true;
                    on_path[target.index()] = true;
                    path.push(target);
                    stack.push((target, 0));
                }
            }
        }

        debug!("No deadlock among {} processes", node_count);
        DeadlockResult::none()
    }
}
