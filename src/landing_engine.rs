//! The pure half of the engine: which windows count, whether a removal
//! emptied the desktop, and which landing surface that calls for.
//!
//! Nothing in here talks to the host. The reactor gathers the inputs and acts
//! on the outputs.

mod decision;
mod evaluator;
mod filter;
mod startup;

pub use decision::{Topology, Trigger, decide};
pub use evaluator::{EvalContext, Evaluation, Reason, evaluate};
pub use filter::WindowFilter;
pub use startup::{StartupCheck, check_startup};
