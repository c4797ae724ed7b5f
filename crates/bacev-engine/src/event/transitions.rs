//! # bacev-engine::event::transitions
//!
//! The coarse-state transition table: a total lookup over (current group,
//! proposed group) whose handlers encode the reliability and inhibit
//! interlocks. Every committing handler funnels into the shared
//! [`EventAlgorithm::transition_action`] and reports back whether the
//! transition actually committed, so stateful evaluators can tell an
//! emission apart from a suppressed proposal.

use crate::engine::EvalCtx;
use crate::event::EventAlgorithm;
use bacev_api::NotificationParameters;
use bacev_types::errors::EventError;
use bacev_types::state::{EventState, EventStateGroup};

/// A handler either commits the transition (`Ok(true)`) or suppresses it
/// under an interlock (`Ok(false)`).
pub(crate) type TransitionHandler =
    fn(&mut EventAlgorithm, &EvalCtx, EventState, NotificationParameters) -> Result<bool, EventError>;

fn index(group: EventStateGroup) -> usize {
    match group {
        EventStateGroup::Normal => 0,
        EventStateGroup::OffNormal => 1,
        EventStateGroup::Fault => 2,
    }
}

/// The nine-entry table. Fault to off-normal has no handler: a clearing
/// fault must pass through Normal first.
const TABLE: [[Option<TransitionHandler>; 3]; 3] = [
    [
        Some(normal_to_normal),
        Some(normal_to_offnormal),
        Some(normal_to_fault),
    ],
    [
        Some(offnormal_to_normal),
        Some(offnormal_to_offnormal),
        Some(offnormal_to_fault),
    ],
    [Some(fault_to_normal), None, Some(fault_to_fault)],
];

/// Looks up the handler for a group-to-group transition.
pub(crate) fn lookup(from: EventStateGroup, to: EventStateGroup) -> Option<TransitionHandler> {
    TABLE[index(from)][index(to)]
}

/// Re-enter Normal when no fault is detected and the algorithm is not
/// inhibited.
fn normal_to_normal(
    algorithm: &mut EventAlgorithm,
    ctx: &EvalCtx,
    new_state: EventState,
    parameters: NotificationParameters,
) -> Result<bool, EventError> {
    if algorithm.no_fault_detected() && !algorithm.inhibited() {
        algorithm.transition_action(ctx, new_state, parameters)?;
        return Ok(true);
    }
    Ok(false)
}

/// Enter an off-normal state when no fault is detected and the algorithm
/// is not inhibited.
fn normal_to_offnormal(
    algorithm: &mut EventAlgorithm,
    ctx: &EvalCtx,
    new_state: EventState,
    parameters: NotificationParameters,
) -> Result<bool, EventError> {
    if algorithm.inhibited() {
        tracing::debug!(state = %new_state, "transition suppressed; algorithm inhibit");
        return Ok(false);
    }
    if !algorithm.no_fault_detected() {
        tracing::debug!(state = %new_state, "transition suppressed; fault detected");
        return Ok(false);
    }
    algorithm.transition_action(ctx, new_state, parameters)?;
    Ok(true)
}

/// Enter Fault when reliability-evaluation indicates anything but
/// no-fault-detected.
fn normal_to_fault(
    algorithm: &mut EventAlgorithm,
    ctx: &EvalCtx,
    new_state: EventState,
    parameters: NotificationParameters,
) -> Result<bool, EventError> {
    if !algorithm.no_fault_detected() {
        algorithm.transition_action(ctx, new_state, parameters)?;
        return Ok(true);
    }
    Ok(false)
}

/// Return to Normal when no fault is detected and either the algorithm
/// indicates normal or the operator inhibit is raised.
fn offnormal_to_normal(
    algorithm: &mut EventAlgorithm,
    ctx: &EvalCtx,
    new_state: EventState,
    parameters: NotificationParameters,
) -> Result<bool, EventError> {
    if algorithm.no_fault_detected() {
        algorithm.transition_action(ctx, new_state, parameters)?;
        return Ok(true);
    }
    Ok(false)
}

/// Re-enter (or move within) the off-normal group when no fault is
/// detected and the algorithm is not inhibited.
fn offnormal_to_offnormal(
    algorithm: &mut EventAlgorithm,
    ctx: &EvalCtx,
    new_state: EventState,
    parameters: NotificationParameters,
) -> Result<bool, EventError> {
    if algorithm.no_fault_detected() && !algorithm.inhibited() {
        algorithm.transition_action(ctx, new_state, parameters)?;
        return Ok(true);
    }
    Ok(false)
}

/// Enter Fault from an off-normal state; reliability outranks the event
/// algorithm.
fn offnormal_to_fault(
    algorithm: &mut EventAlgorithm,
    ctx: &EvalCtx,
    new_state: EventState,
    parameters: NotificationParameters,
) -> Result<bool, EventError> {
    if !algorithm.no_fault_detected() {
        algorithm.transition_action(ctx, new_state, parameters)?;
        return Ok(true);
    }
    Ok(false)
}

/// Leave Fault for Normal once reliability-evaluation clears.
fn fault_to_normal(
    algorithm: &mut EventAlgorithm,
    ctx: &EvalCtx,
    new_state: EventState,
    parameters: NotificationParameters,
) -> Result<bool, EventError> {
    if algorithm.no_fault_detected() {
        algorithm.transition_action(ctx, new_state, parameters)?;
        return Ok(true);
    }
    Ok(false)
}

/// Re-stamp Fault on a changed or re-announced (still faulty) reliability.
/// The change/re-announce precondition is established by the evaluate
/// pre-step before this handler is reached.
fn fault_to_fault(
    algorithm: &mut EventAlgorithm,
    ctx: &EvalCtx,
    new_state: EventState,
    parameters: NotificationParameters,
) -> Result<bool, EventError> {
    if !algorithm.no_fault_detected() {
        algorithm.transition_action(ctx, new_state, parameters)?;
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_total_except_fault_to_offnormal() {
        for from in [
            EventStateGroup::Normal,
            EventStateGroup::OffNormal,
            EventStateGroup::Fault,
        ] {
            for to in [
                EventStateGroup::Normal,
                EventStateGroup::OffNormal,
                EventStateGroup::Fault,
            ] {
                let handler = lookup(from, to);
                if from == EventStateGroup::Fault && to == EventStateGroup::OffNormal {
                    assert!(handler.is_none());
                } else {
                    assert!(handler.is_some(), "missing handler {from} -> {to}");
                }
            }
        }
    }
}
