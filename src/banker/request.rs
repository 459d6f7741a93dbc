// Request Evaluation (Banker's resource-request algorithm)
use super::safety::SafetyChecker;
use super::state::ResourceState;
use super::types::*;
use crate::error::Result;
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

/// Why a request was refused. These are expected outcomes, not errors: the
/// caller retries later or turns the requesting process away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DenialReason {
    ExceedsMaxClaim {
        resource: usize,
        requested: Units,
        need: Units,
    },
    InsufficientResources {
        resource: usize,
        requested: Units,
        available: Units,
    },
    WouldDeadlock,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialReason::ExceedsMaxClaim {
                resource,
                requested,
                need,
            } => write!(
                f,
                "request of {} units of resource {} exceeds remaining claim of {}",
                requested, resource, need
            ),
            DenialReason::InsufficientResources {
                resource,
                requested,
                available,
            } => write!(
                f,
                "request of {} units of resource {} exceeds {} available",
                requested, resource, available
            ),
            DenialReason::WouldDeadlock => write!(f, "granting the request leaves an unsafe state"),
        }
    }
}

/// Result of evaluating a request against a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    Granted {
        state: ResourceState,
        safe_sequence: Vec<ProcessId>,
    },
    Denied(DenialReason),
}

/// Verdict returned once the engine has committed (or refused) a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Decision {
    Granted { safe_sequence: Vec<ProcessId> },
    Denied(DenialReason),
}

impl Decision {
    pub fn is_granted(&self) -> bool {
        matches!(self, Decision::Granted { .. })
    }

    pub fn denial(&self) -> Option<&DenialReason> {
        match self {
            Decision::Denied(reason) => Some(reason),
            Decision::Granted { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestEvaluator {
    checker: SafetyChecker,
}

impl RequestEvaluator {
    pub fn new(checker: SafetyChecker) -> Self {
        RequestEvaluator { checker }
    }

    /// Decides whether `process` may acquire `request` now.
    ///
    /// The input snapshot is never modified. The request is applied to a
    /// private copy, and that copy is handed back only when it passes the
    /// safety check, so no other reader can observe the tentative state.
    pub fn evaluate(
        &self,
        state: &ResourceState,
        process: ProcessId,
        request: &[Units],
    ) -> Result<Evaluation> {
        state.check_process(process)?;
        state.check_vector("request", request)?;

        for (resource, &requested) in request.iter().enumerate() {
            let need = state.need(process, resource);
            if requested > need {
                debug!("{} denied: exceeds max claim on resource {}", process, resource);
                return Ok(Evaluation::Denied(DenialReason::ExceedsMaxClaim {
                    resource,
                    requested,
                    need,
                }));
            }
        }

        for (resource, (&requested, &available)) in request.iter().zip(state.available()).enumerate() {
            if requested > available {
                debug!("{} denied: resource {} unavailable", process, resource);
                return Ok(Evaluation::Denied(DenialReason::InsufficientResources {
                    resource,
                    requested,
                    available,
                }));
            }
        }

        let mut tentative = state.clone();
        tentative.apply_request(process, request);

        let result = self.checker.check(&tentative);
        if result.safe {
            debug!(
                "{} granted {:?}, safe sequence {}",
                process,
                request,
                format_sequence(&result.order)
            );
            Ok(Evaluation::Granted {
                state: tentative,
                safe_sequence: result.order,
            })
        } else {
            warn!("{} denied {:?}: would leave an unsafe state", process, request);
            Ok(Evaluation::Denied(DenialReason::WouldDeadlock))
        }
    }
}
