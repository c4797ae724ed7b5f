//! # bacev-engine::fault
//!
//! The read-only fault interlock. An event algorithm never runs fault
//! detection itself; it reads the evaluated reliability of a companion
//! evaluator attached to the monitoring or monitored object, and treats a
//! missing evaluator as no fault detected.

use crate::store::Object;
use bacev_api::ReliabilityEval;
use bacev_types::property::PropertyIdentifier;
use bacev_types::state::Reliability;
use std::rc::Rc;

/// Resolves which fault evaluator covers an algorithm, together with the
/// object that owns it (whose reliability property carries change
/// notifications). Precedence: the monitoring object's own evaluator, else
/// the monitored object's, else none.
pub(crate) fn resolve(
    monitoring: Option<&Rc<Object>>,
    monitored: &Rc<Object>,
) -> Option<(Rc<dyn ReliabilityEval>, Rc<Object>)> {
    if let Some(obj) = monitoring {
        if let Some(eval) = obj.fault_algorithm() {
            return Some((eval, obj.clone()));
        }
    }
    monitored
        .fault_algorithm()
        .map(|eval| (eval, monitored.clone()))
}

/// A fault evaluator whose verdict lives in its owner's reliability
/// property. Writing that property both updates the evaluated output and
/// rides the normal property-binding machinery, so fault and value changes
/// coalesce into a single evaluation.
pub struct PropertyReliability {
    object: Rc<Object>,
}

impl PropertyReliability {
    /// Attaches a property-backed evaluator to `object` and returns it.
    pub fn attach(object: &Rc<Object>) -> Rc<Self> {
        let eval = Rc::new(Self {
            object: object.clone(),
        });
        object.attach_fault_algorithm(eval.clone());
        eval
    }
}

impl ReliabilityEval for PropertyReliability {
    fn evaluated_reliability(&self) -> Option<Reliability> {
        match self.object.get(PropertyIdentifier::Reliability) {
            Some(bacev_types::primitives::Value::Reliability(r)) => Some(r),
            _ => None,
        }
    }
}
