//! SafeAlloc Core
//!
//! Resource allocation safety for a fixed set of processes competing for
//! several reusable resource types:
//!
//! - Banker's algorithm: is the current state safe, and may a request be
//!   granted without leaving it unsafe?
//! - Deadlock detection: do the outstanding requests already form a cycle
//!   in the wait-for graph?
//!
//! ```
//! use safealloc_core::{Engine, ProcessId, Decision};
//!
//! let mut engine = Engine::new(
//!     2,
//!     1,
//!     vec![vec![4], vec![2]],
//!     vec![vec![1], vec![1]],
//!     vec![4],
//! ).unwrap();
//!
//! assert!(engine.is_safe().safe);
//! assert!(matches!(engine.evaluate(ProcessId(1), &[1]).unwrap(), Decision::Granted { .. }));
//! ```

pub mod banker;
pub mod config;
pub mod deadlock;
pub mod engine;
pub mod error;
pub mod observability;
pub mod scenario;

pub use banker::{
    Decision, DenialReason, Evaluation, ProcessId, RequestEvaluator, ResourceState, SafeResult,
    SafetyChecker, Units,
};
pub use config::{ConfigBuilder, EngineConfig, LoggingConfig};
pub use deadlock::{CycleDetector, DeadlockResult, WaitEdgePolicy, WaitForGraph, WaitForGraphBuilder};
pub use engine::{check_deadlock, is_safe, Engine, SharedEngine};
pub use error::{Error, Result};
pub use scenario::Scenario;
