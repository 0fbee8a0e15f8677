//! Core backup functionality
//!
//! Task units, the worker pool they fan out on, the event stream, the
//! aggregation loop, cancellation, and the engine tying them together.

mod aggregator;
mod cancel;
mod engine;
mod events;
mod pool;
mod task;

pub use aggregator::*;
pub use cancel::*;
pub use engine::*;
pub use events::*;
pub use pool::*;
pub use task::*;
