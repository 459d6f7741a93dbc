//! Point-in-time resource snapshot
//!
//! A [`ResourceState`] holds the Claim and Allocation matrices and the
//! Available vector for a fixed set of `P` processes and `R` resource types.
//! Need is derived on demand as `claim - allocation`; nothing is cached.
//!
//! Every constructor checks:
//! - matrix shapes (`P` rows of `R` columns)
//! - `allocation[i][j] <= claim[i][j]`
//! - `sum_i allocation[i][j] + available[j] == total[j]`, with `total` fixed
//!   once at construction

use super::types::*;
use crate::error::{Error, Result};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceState {
    claim: Vec<Vec<Units>>,
    allocation: Vec<Vec<Units>>,
    available: Vec<Units>,
    total: Vec<Units>,
}

impl ResourceState {
    /// Builds a state from the total inventory of each resource type.
    /// Available is whatever the initial allocation leaves unheld.
    pub fn new(
        process_count: usize,
        resource_count: usize,
        claim: Vec<Vec<Units>>,
        allocation: Vec<Vec<Units>>,
        total: Vec<Units>,
    ) -> Result<Self> {
        check_matrix("claim", &claim, process_count, resource_count)?;
        check_matrix("allocation", &allocation, process_count, resource_count)?;
        check_len("total", &total, resource_count)?;

        let held = column_sums(&allocation, resource_count)?;
        let mut available = Vec::with_capacity(resource_count);
        for (j, (&total_j, &held_j)) in total.iter().zip(&held).enumerate() {
            let free = total_j.checked_sub(held_j).ok_or_else(|| {
                Error::InvalidState(format!(
                    "resource {} is over-allocated: {} units held, {} in total",
                    j, held_j, total_j
                ))
            })?;
            available.push(free);
        }

        let state = ResourceState {
            claim,
            allocation,
            available,
            total,
        };
        state.check_claims()?;
        Ok(state)
    }

    /// Builds a state from the currently unallocated units of each resource
    /// type. Total is derived as `available + sum of allocations`.
    pub fn from_available(
        claim: Vec<Vec<Units>>,
        allocation: Vec<Vec<Units>>,
        available: Vec<Units>,
    ) -> Result<Self> {
        let process_count = claim.len();
        let resource_count = available.len();
        check_matrix("claim", &claim, process_count, resource_count)?;
        check_matrix("allocation", &allocation, process_count, resource_count)?;

        let held = column_sums(&allocation, resource_count)?;
        let mut total = Vec::with_capacity(resource_count);
        for (j, (&free, &held_j)) in available.iter().zip(&held).enumerate() {
            let sum = free.checked_add(held_j).ok_or_else(|| {
                Error::InvalidState(format!("total units of resource {} overflow", j))
            })?;
            total.push(sum);
        }

        let state = ResourceState {
            claim,
            allocation,
            available,
            total,
        };
        state.check_claims()?;
        Ok(state)
    }

    pub fn process_count(&self) -> usize {
        self.claim.len()
    }

    pub fn resource_count(&self) -> usize {
        self.total.len()
    }

    pub fn claim(&self) -> &[Vec<Units>] {
        &self.claim
    }

    pub fn allocation(&self) -> &[Vec<Units>] {
        &self.allocation
    }

    pub fn available(&self) -> &[Units] {
        &self.available
    }

    pub fn total(&self) -> &[Units] {
        &self.total
    }

    pub fn claim_row(&self, process: ProcessId) -> &[Units] {
        &self.claim[process.index()]
    }

    pub fn allocation_row(&self, process: ProcessId) -> &[Units] {
        &self.allocation[process.index()]
    }

    /// Remaining legitimate demand of `process` for resource `resource`.
    pub fn need(&self, process: ProcessId, resource: usize) -> Units {
        let i = process.index();
        self.claim[i][resource] - self.allocation[i][resource]
    }

    pub fn need_row(&self, process: ProcessId) -> Vec<Units> {
        let i = process.index();
        self.claim[i]
            .iter()
            .zip(&self.allocation[i])
            .map(|(c, a)| c - a)
            .collect()
    }

    pub fn need_matrix(&self) -> Vec<Vec<Units>> {
        (0..self.process_count())
            .map(|i| self.need_row(ProcessId(i)))
            .collect()
    }

    pub fn processes(&self) -> impl Iterator<Item = ProcessId> {
        (0..self.process_count()).map(ProcessId)
    }

    /// Re-verifies `sum_i allocation[i][j] + available[j] == total[j]` for every `j`.
    pub fn is_conserved(&self) -> bool {
        (0..self.resource_count()).all(|j| {
            let held: u128 = self.allocation.iter().map(|row| row[j] as u128).sum();
            held + self.available[j] as u128 == self.total[j] as u128
        })
    }

    pub fn check_process(&self, process: ProcessId) -> Result<()> {
        if process.index() >= self.process_count() {
            return Err(Error::ProcessOutOfRange {
                process: process.index(),
                process_count: self.process_count(),
            });
        }
        Ok(())
    }

    pub fn check_vector(&self, what: &str, vector: &[Units]) -> Result<()> {
        check_len(what, vector, self.resource_count())
    }

    /// Moves `request` from Available into the process's Allocation.
    /// Callers have already checked `request <= need` and `request <= available`.
    pub(crate) fn apply_request(&mut self, process: ProcessId, request: &[Units]) {
        let row = &mut self.allocation[process.index()];
        for (j, &amount) in request.iter().enumerate() {
            self.available[j] -= amount;
            row[j] += amount;
        }
    }

    /// Moves `amounts` from the process's Allocation back into Available.
    pub(crate) fn release_units(&mut self, process: ProcessId, amounts: &[Units]) -> Result<()> {
        let row = &self.allocation[process.index()];
        if let Some((j, (&requested, &held))) = amounts
            .iter()
            .zip(row)
            .enumerate()
            .find(|(_, (requested, held))| requested > held)
        {
            return Err(Error::ReleaseExceedsAllocation {
                process: process.index(),
                resource: j,
                requested,
                held,
            });
        }

        let row = &mut self.allocation[process.index()];
        for (j, &amount) in amounts.iter().enumerate() {
            row[j] -= amount;
            self.available[j] += amount;
        }
        Ok(())
    }

    fn check_claims(&self) -> Result<()> {
        for (i, (claim_row, alloc_row)) in self.claim.iter().zip(&self.allocation).enumerate() {
            for (j, (c, a)) in claim_row.iter().zip(alloc_row).enumerate() {
                if a > c {
                    return Err(Error::InvalidState(format!(
                        "process {} holds {} units of resource {} but claims only {}",
                        i, a, j, c
                    )));
                }
            }
        }
        Ok(())
    }
}

fn check_len(what: &str, vector: &[Units], expected: usize) -> Result<()> {
    if vector.len() != expected {
        return Err(Error::dimension(what, expected, vector.len()));
    }
    Ok(())
}

fn check_matrix(what: &str, matrix: &[Vec<Units>], rows: usize, cols: usize) -> Result<()> {
    if matrix.len() != rows {
        return Err(Error::dimension(format!("{} rows", what), rows, matrix.len()));
    }
    for (i, row) in matrix.iter().enumerate() {
        check_len(&format!("{} row {}", what, i), row, cols)?;
    }
    Ok(())
}

fn column_sums(matrix: &[Vec<Units>], cols: usize) -> Result<Vec<Units>> {
    let mut sums: Vec<Units> = vec![0; cols];
    for row in matrix {
        for (j, &value) in row.iter().enumerate() {
            sums[j] = sums[j].checked_add(value).ok_or_else(|| {
                Error::InvalidState(format!("allocated units of resource {} overflow", j))
            })?;
        }
    }
    Ok(sums)
}
