//! Scenario files
//!
//! A scenario is a JSON description of one resource snapshot, optionally
//! with the outstanding request of every process:
//!
//! ```json
//! {
//!   "claim":      [[7,5,3],[3,2,2]],
//!   "allocation": [[0,1,0],[2,0,0]],
//!   "available":  [3,3,2],
//!   "requests":   [[0,0,1],[1,0,0]]
//! }
//! ```
//!
//! `claim` may be omitted for pure deadlock detection. It then defaults to
//! `allocation + request` per process, the smallest claim consistent with
//! the snapshot.

use crate::banker::{ProcessId, ResourceState, Units};
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim: Option<Vec<Vec<Units>>>,
    pub allocation: Vec<Vec<Units>>,
    pub available: Vec<Units>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<Vec<Vec<Units>>>,
}

impl Scenario {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The five-process, three-resource snapshot from the classic
    /// Banker's algorithm walkthrough. It is safe, with sequence
    /// `<P1, P3, P0, P2, P4>`.
    pub fn classic_bankers() -> Self {
        Scenario {
            claim: Some(vec![
                vec![7, 5, 3],
                vec![3, 2, 2],
                vec![9, 0, 2],
                vec![2, 2, 2],
                vec![4, 3, 3],
            ]),
            allocation: vec![
                vec![0, 1, 0],
                vec![2, 0, 0],
                vec![3, 0, 2],
                vec![2, 1, 1],
                vec![0, 0, 2],
            ],
            available: vec![3, 3, 2],
            requests: None,
        }
    }

    /// Three processes that each hold what the next one wants. Deadlocked.
    pub fn classic_detection() -> Self {
        Scenario {
            claim: None,
            allocation: vec![vec![1, 1, 0], vec![0, 2, 1], vec![1, 1, 0]],
            available: vec![0, 0, 0],
            requests: Some(vec![vec![0, 0, 1], vec![1, 0, 0], vec![0, 1, 0]]),
        }
    }

    /// Outstanding requests keyed by process. All-zero rows are skipped.
    pub fn outstanding_requests(&self) -> BTreeMap<ProcessId, Vec<Units>> {
        self.requests
            .iter()
            .flatten()
            .enumerate()
            .filter(|(_, row)| row.iter().any(|&units| units > 0))
            .map(|(i, row)| (ProcessId(i), row.clone()))
            .collect()
    }

    pub fn state(&self) -> Result<ResourceState> {
        let claim = match &self.claim {
            Some(claim) => claim.clone(),
            None => self.implied_claim()?,
        };
        ResourceState::from_available(claim, self.allocation.clone(), self.available.clone())
    }

    pub fn engine(&self, config: &EngineConfig) -> Result<Engine> {
        Ok(Engine::from_state(self.state()?, config))
    }

    fn implied_claim(&self) -> Result<Vec<Vec<Units>>> {
        let Some(requests) = &self.requests else {
            return Ok(self.allocation.clone());
        };
        if requests.len() != self.allocation.len() {
            return Err(Error::dimension(
                "request rows",
                self.allocation.len(),
                requests.len(),
            ));
        }

        let mut claim = Vec::with_capacity(self.allocation.len());
        for (i, (held, wanted)) in self.allocation.iter().zip(requests).enumerate() {
            if held.len() != wanted.len() {
                return Err(Error::dimension(
                    format!("request row {}", i),
                    held.len(),
                    wanted.len(),
                ));
            }
            let mut row = Vec::with_capacity(held.len());
            for (&a, &r) in held.iter().zip(wanted) {
                row.push(a.checked_add(r).ok_or_else(|| {
                    Error::InvalidState(format!("claim of process {} overflows", i))
                })?);
            }
            claim.push(row);
        }
        Ok(claim)
    }
}
