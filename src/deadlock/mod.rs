// Deadlock Detection Module
// Wait-for graph construction, cycle search

pub mod cycle;
pub mod graph;

pub use cycle::*;
pub use graph::*;
