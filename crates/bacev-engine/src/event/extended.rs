//! # bacev-engine::event::extended
//!
//! Vendor-extension evaluators (clause 13.3.10) behind a process-wide
//! registry keyed by (vendor id, extended event type). Registration is
//! init-once-and-replace; a combination nobody registered simply leaves
//! the point in the Normal state.

use crate::binding::{BindSource, ParameterSet};
use crate::event::parameters::{EventEnrollment, EventParameters};
use crate::event::Proposal;
use bacev_api::NotificationParameters;
use bacev_types::errors::{ConfigError, EventError};
use bacev_types::primitives::{StatusFlags, Value};
use bacev_types::state::{EventState, EventType};
use fxhash::FxHashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

/// A vendor evaluator: given the current state and the configured
/// parameter list, propose a new state or leave things alone.
pub type ExtendedEvaluator = fn(current: EventState, parameters: &[Value]) -> Option<EventState>;

static REGISTRY: OnceLock<RwLock<FxHashMap<(u16, u32), ExtendedEvaluator>>> = OnceLock::new();

fn registry() -> &'static RwLock<FxHashMap<(u16, u32), ExtendedEvaluator>> {
    REGISTRY.get_or_init(|| RwLock::new(FxHashMap::default()))
}

/// Registers (or replaces) the evaluator for a vendor/event-type pair.
pub fn register_extended(vendor_id: u16, extended_event_type: u32, evaluator: ExtendedEvaluator) {
    registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert((vendor_id, extended_event_type), evaluator);
}

fn lookup_extended(vendor_id: u16, extended_event_type: u32) -> Option<ExtendedEvaluator> {
    registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&(vendor_id, extended_event_type))
        .copied()
}

/// Extended algorithm instance state. Algorithmic reporting only.
pub(crate) struct ExtendedParams {
    vendor_id: u16,
    extended_event_type: u32,
    parameters: Vec<Value>,
}

impl ExtendedParams {
    pub(crate) fn bind(monitoring: Option<&EventEnrollment>) -> Result<Self, ConfigError> {
        let Some(enrollment) = monitoring else {
            return Err(ConfigError::AlgorithmicOnly(EventType::Extended));
        };
        match &enrollment.parameters {
            EventParameters::Extended {
                vendor_id,
                extended_event_type,
                parameters,
            } => Ok(Self {
                vendor_id: *vendor_id,
                extended_event_type: *extended_event_type,
                parameters: parameters.clone(),
            }),
            other => Err(ConfigError::ParameterKindMismatch {
                expected: EventType::Extended,
                found: other.event_type(),
            }),
        }
    }

    pub(crate) fn evaluate(
        &mut self,
        current: EventState,
        _status_flags: StatusFlags,
    ) -> Result<Option<Proposal>, EventError> {
        let Some(evaluator) = lookup_extended(self.vendor_id, self.extended_event_type) else {
            // unknown combinations are permitted to remain Normal
            return Ok(None);
        };
        let Some(new_state) = evaluator(current, &self.parameters) else {
            return Ok(None);
        };
        Ok(Some(Proposal {
            new_state,
            parameters: self.notification(),
        }))
    }

    pub(crate) fn notification(&self) -> NotificationParameters {
        NotificationParameters::Extended {
            vendor_id: self.vendor_id,
            extended_event_type: self.extended_event_type,
            parameters: self.parameters.clone(),
        }
    }
}

impl ParameterSet for ExtendedParams {
    fn visit_sources(&self, _visit: &mut dyn FnMut(&'static str, &BindSource)) {
        // all parameters are literals from the enrollment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alarm_when_first_param_set(current: EventState, parameters: &[Value]) -> Option<EventState> {
        match parameters.first() {
            Some(Value::Boolean(true)) if current == EventState::Normal => {
                Some(EventState::OffNormal)
            }
            Some(Value::Boolean(false)) if current != EventState::Normal => {
                Some(EventState::Normal)
            }
            _ => None,
        }
    }

    #[test]
    fn unknown_combination_stays_normal() {
        let mut params = ExtendedParams {
            vendor_id: 999,
            extended_event_type: 77,
            parameters: vec![Value::Boolean(true)],
        };
        assert!(params
            .evaluate(EventState::Normal, StatusFlags::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn registered_evaluator_drives_the_state() {
        register_extended(42, 7, alarm_when_first_param_set);
        let mut params = ExtendedParams {
            vendor_id: 42,
            extended_event_type: 7,
            parameters: vec![Value::Boolean(true)],
        };
        let proposal = params
            .evaluate(EventState::Normal, StatusFlags::default())
            .unwrap()
            .expect("evaluator should fire");
        assert_eq!(proposal.new_state, EventState::OffNormal);
    }
}
