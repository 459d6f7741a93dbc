//! Resource allocation safety engine
//!
//! [`Engine`] owns one [`ResourceState`] and exposes the three questions a
//! resource manager asks of it:
//!
//! - `is_safe()`: does a safe completion sequence exist right now?
//! - `evaluate(process, request)`: may this request be granted? Granted
//!   requests are committed; denied ones leave the state untouched.
//! - `check_deadlock(requests)`: do these outstanding requests already form
//!   a circular wait?
//!
//! The engine is single-threaded. Its caller must hold exclusive access for
//! the whole of an `evaluate` call, since the safety verdict refers to the
//! exact snapshot the request was checked against. [`SharedEngine`] packages
//! that discipline behind a mutex for callers that share an engine between
//! threads.

use crate::banker::{
    Decision, Evaluation, ProcessId, RequestEvaluator, ResourceState, SafeResult, SafetyChecker,
    Units,
};
use crate::config::EngineConfig;
use crate::deadlock::{CycleDetector, DeadlockResult, WaitForGraph, WaitForGraphBuilder};
use crate::error::Result;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct Engine {
    state: ResourceState,
    evaluator: RequestEvaluator,
    checker: SafetyChecker,
    graph_builder: WaitForGraphBuilder,
}

impl Engine {
    /// Creates an engine over `process_count` processes and `resource_count`
    /// resource types. Available starts as `total` minus the initial allocation.
    pub fn new(
        process_count: usize,
        resource_count: usize,
        claim: Vec<Vec<Units>>,
        initial_allocation: Vec<Vec<Units>>,
        total: Vec<Units>,
    ) -> Result<Self> {
        let state = ResourceState::new(
            process_count,
            resource_count,
            claim,
            initial_allocation,
            total,
        )?;
        Ok(Self::from_state(state, &EngineConfig::default()))
    }

    pub fn from_state(state: ResourceState, config: &EngineConfig) -> Self {
        info!(
            "Engine created: {} processes, {} resource types, total {:?}",
            state.process_count(),
            state.resource_count(),
            state.total()
        );
        let checker = SafetyChecker::with_trace_steps(config.trace_steps);
        Engine {
            state,
            evaluator: RequestEvaluator::new(checker),
            checker,
            graph_builder: WaitForGraphBuilder::new(config.wait_edges),
        }
    }

    pub fn state(&self) -> &ResourceState {
        &self.state
    }

    pub fn into_state(self) -> ResourceState {
        self.state
    }

    pub fn is_safe(&self) -> SafeResult {
        self.checker.check(&self.state)
    }

    /// Evaluates `request` for `process` and commits it when granted.
    ///
    /// Out-of-range process ids and wrong-length requests are errors and
    /// never reach the algorithm. Every denial leaves the state unchanged.
    pub fn evaluate(&mut self, process: ProcessId, request: &[Units]) -> Result<Decision> {
        match self.evaluator.evaluate(&self.state, process, request)? {
            Evaluation::Granted {
                state,
                safe_sequence,
            } => {
                self.state = state;
                Ok(Decision::Granted { safe_sequence })
            }
            Evaluation::Denied(reason) => Ok(Decision::Denied(reason)),
        }
    }

    /// Returns units held by `process` to Available.
    pub fn release(&mut self, process: ProcessId, amounts: &[Units]) -> Result<()> {
        self.state.check_process(process)?;
        self.state.check_vector("release", amounts)?;
        self.state.release_units(process, amounts)?;
        debug!("{} released {:?}", process, amounts);
        Ok(())
    }

    pub fn wait_for_graph(&self, requests: &BTreeMap<ProcessId, Vec<Units>>) -> Result<WaitForGraph> {
        self.graph_builder
            .build(requests, self.state.available(), self.state.allocation())
    }

    /// Checks whether `requests` together with the current allocation form a
    /// circular wait. Errors only on malformed input.
    pub fn check_deadlock(&self, requests: &BTreeMap<ProcessId, Vec<Units>>) -> Result<DeadlockResult> {
        let graph = self.wait_for_graph(requests)?;
        Ok(CycleDetector::detect(&graph))
    }
}

/// Runs the safety check over a bare `(available, claim, allocation)` triple.
pub fn is_safe(
    available: &[Units],
    claim: &[Vec<Units>],
    allocation: &[Vec<Units>],
) -> Result<SafeResult> {
    let state = ResourceState::from_available(claim.to_vec(), allocation.to_vec(), available.to_vec())?;
    Ok(SafetyChecker::new().check(&state))
}

/// Runs deadlock detection over bare vectors, without a claim matrix.
pub fn check_deadlock(
    requests: &BTreeMap<ProcessId, Vec<Units>>,
    available: &[Units],
    allocation: &[Vec<Units>],
) -> Result<DeadlockResult> {
    let graph = WaitForGraphBuilder::default().build(requests, available, allocation)?;
    Ok(CycleDetector::detect(&graph))
}

/// Thread-safe handle that serializes every engine operation.
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<Engine>>,
}

impl SharedEngine {
    pub fn new(engine: Engine) -> Self {
        SharedEngine {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn is_safe(&self) -> SafeResult {
        self.inner.lock().is_safe()
    }

    pub fn evaluate(&self, process: ProcessId, request: &[Units]) -> Result<Decision> {
        self.inner.lock().evaluate(process, request)
    }

    pub fn release(&self, process: ProcessId, amounts: &[Units]) -> Result<()> {
        self.inner.lock().release(process, amounts)
    }

    pub fn check_deadlock(&self, requests: &BTreeMap<ProcessId, Vec<Units>>) -> Result<DeadlockResult> {
        self.inner.lock().check_deadlock(requests)
    }

    pub fn snapshot(&self) -> ResourceState {
        self.inner.lock().state().clone()
    }

    /// Runs `f` with exclusive access, for multi-step transactions such as
    /// release-then-request.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut Engine) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }
}
