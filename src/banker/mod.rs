// Banker's Algorithm Module
// Resource snapshot, safety check, request evaluation

pub mod request;
pub mod safety;
pub mod state;
pub mod types;

pub use request::*;
pub use safety::*;
pub use state::*;
pub use types::*;
