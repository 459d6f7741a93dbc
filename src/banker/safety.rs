// Banker's Safety Check
use super::state::ResourceState;
use super::types::*;
use serde::Serialize;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafeResult {
    pub safe: bool,
    /// Completion order. On an unsafe state this is the prefix of processes
    /// that could still finish before the search stalled.
    pub order: Vec<ProcessId>,
}

impl SafeResult {
    pub fn is_safe(&self) -> bool {
        self.safe
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyChecker {
    trace_steps: bool,
}

impl SafetyChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace_steps(trace_steps: bool) -> Self {
        SafetyChecker { trace_steps }
    }

    /// Searches for a safe completion sequence.
    ///
    /// Each round scans processes from index 0 and picks the first unfinished
    /// one whose Need fits the working Available. Its allocation is returned
    /// to the working vector and the scan restarts from the top, so the
    /// lowest-indexed eligible process always wins. Worst case O(P^2 * R).
    pub fn check(&self, state: &ResourceState) -> SafeResult {
        let process_count = state.process_count();
        let mut work = state.available().to_vec();
        let mut finished = vec![false; process_count];
        let mut order = Vec::with_capacity(process_count);

        while order.len() < process_count {
            let next = state
                .processes()
                .find(|&p| !finished[p.index()] && fits_within(&state.need_row(p), &work));

            let Some(process) = next else {
                debug!(
                    "State is unsafe: {} of {} processes can complete ({})",
                    order.len(),
                    process_count,
                    format_sequence(&order)
                );
                return SafeResult { safe: false, order };
            };

            for (slot, held) in work.iter_mut().zip(state.allocation_row(process)) {
                *slot += held;
            }
            finished[process.index()] = true;
            order.push(process);

            if self.trace_steps {
                trace!("{} runs to completion, work = {:?}", process, work);
            }
        }

        debug!("State is safe, sequence {}", format_sequence(&order));
        SafeResult { safe: true, order }
    }
}
