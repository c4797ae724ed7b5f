//! # bacev-api::fault
//!
//! The boundary to a companion fault algorithm. The event side only ever
//! reads the evaluated output; fault detection itself lives elsewhere.

use bacev_types::state::Reliability;

/// Read-only view of a companion fault algorithm's output.
///
/// `None` means the evaluator has not produced a verdict yet; the event
/// side treats that the same as `NoFaultDetected`. Changes to the output
/// must additionally be delivered through the owning object's reliability
/// property so they coalesce with value changes into a single evaluation.
pub trait ReliabilityEval {
    fn evaluated_reliability(&self) -> Option<Reliability>;
}
