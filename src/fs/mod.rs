//! Filesystem layer
//!
//! Exclusion rules, selection handling with the pre-run file count, and the
//! low-level copy primitives used by backup workers.

mod exclude;
mod operations;
mod selection;

pub use exclude::*;
pub use operations::*;
pub use selection::*;
