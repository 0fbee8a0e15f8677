//! Progress reporting
//!
//! Terminal progress display fed from the aggregation loop.

mod reporter;

pub use reporter::*;
