//! Fluent builder APIs for generation runs.
//!
//! The [`RosterBuilder`] wires the member generator and the address
//! resolver together and produces output-ready rows.

mod roster;

pub use roster::{GenerateError, RosterBuilder, RosterMetrics, RosterResult};
