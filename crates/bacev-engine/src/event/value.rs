//! # bacev-engine::event::value
//!
//! The stateful accumulation evaluators: change-of-value (algorithmic
//! only, with an increment or bitmask criterion over the last reported
//! value) and buffer-ready (modular record counting against a threshold).

use crate::binding::{BindSource, Binding, ParameterSet};
use crate::event::parameters::{CovCriteria, EventEnrollment, EventParameters};
use crate::event::{monitored_value_source, Proposal};
use crate::store::Object;
use bacev_api::{CovNewValue, NotificationParameters};
use bacev_types::errors::{ConfigError, EventError};
use bacev_types::primitives::{StatusFlags, Value};
use bacev_types::property::{ObjectId, PropertyIdentifier};
use bacev_types::state::{EventState, EventStateGroup, EventType};
use std::rc::Rc;

/// Change-of-value (clause 13.3.3). Algorithmic reporting only: the
/// criterion and its reference come from the enrollment. The last-reported
/// baseline advances only when a proposal survives the interlocks and is
/// emitted; a suppressed proposal must not absorb the change.
pub(crate) struct ChangeOfValueParams {
    monitored_value: Binding<Value>,
    criteria: CovCriteria,
    last_reported: Option<Value>,
    pending_report: Option<Value>,
}

impl ChangeOfValueParams {
    pub(crate) fn bind(
        monitoring: Option<&EventEnrollment>,
        monitored: &Rc<Object>,
    ) -> Result<Self, ConfigError> {
        let Some(enrollment) = monitoring else {
            return Err(ConfigError::AlgorithmicOnly(EventType::ChangeOfValue));
        };
        let criteria = match &enrollment.parameters {
            EventParameters::ChangeOfValue { cov_criteria, .. } => cov_criteria.clone(),
            other => {
                return Err(ConfigError::ParameterKindMismatch {
                    expected: EventType::ChangeOfValue,
                    found: other.event_type(),
                })
            }
        };
        let monitored_value =
            Binding::resolve("monitored_value", monitored_value_source(monitoring, monitored))?;
        let last_reported = monitored_value.value();
        Ok(Self {
            monitored_value,
            criteria,
            last_reported,
            pending_report: None,
        })
    }

    fn criterion_met(&self, v: &Value) -> bool {
        match (&self.criteria, v, &self.last_reported) {
            (CovCriteria::ReferencedPropertyIncrement(increment), Value::Real(new), last) => {
                match last {
                    Some(Value::Real(old)) => (new - old).abs() >= *increment,
                    _ => true,
                }
            }
            (CovCriteria::Bitmask(mask), Value::BitString(new), last) => match last {
                Some(Value::BitString(old)) => new.changed_within(old, mask),
                _ => true,
            },
            // a value of the wrong kind never satisfies the criterion
            _ => false,
        }
    }

    fn new_value(&self, v: &Value) -> Option<CovNewValue> {
        match v {
            Value::Real(r) => Some(CovNewValue::ChangedValue(*r)),
            Value::BitString(b) => Some(CovNewValue::ChangedBits(b.clone())),
            _ => None,
        }
    }

    pub(crate) fn evaluate(
        &mut self,
        current: EventState,
        status_flags: StatusFlags,
    ) -> Result<Option<Proposal>, EventError> {
        self.pending_report = None;
        let Some(v) = self.monitored_value.value() else {
            return Ok(None);
        };
        let Some(new_value) = self.new_value(&v) else {
            return Ok(None);
        };
        let new_state = if self.criterion_met(&v) {
            self.pending_report = Some(v);
            EventState::OffNormal
        } else if current.group() == EventStateGroup::OffNormal {
            EventState::Normal
        } else {
            return Ok(None);
        };
        Ok(Some(Proposal {
            new_state,
            parameters: NotificationParameters::ChangeOfValue {
                new_value,
                status_flags,
            },
        }))
    }

    /// Called once the proposed transition has been emitted.
    pub(crate) fn mark_reported(&mut self) {
        if let Some(v) = self.pending_report.take() {
            self.last_reported = Some(v);
        }
    }

    pub(crate) fn release_parameters(&self, status_flags: StatusFlags) -> NotificationParameters {
        let new_value = self
            .monitored_value
            .value()
            .as_ref()
            .and_then(|v| self.new_value(v))
            .unwrap_or(CovNewValue::ChangedValue(0.0));
        NotificationParameters::ChangeOfValue {
            new_value,
            status_flags,
        }
    }
}

impl ParameterSet for ChangeOfValueParams {
    fn visit_sources(&self, visit: &mut dyn FnMut(&'static str, &BindSource)) {
        visit(self.monitored_value.name(), self.monitored_value.source());
    }
}

/// Buffer-ready (clause 13.3.7): off-normal when the monitored record
/// count has advanced past the previous notification by at least the
/// threshold, using modular arithmetic so counter wrap is harmless. The
/// previous count advances to the current count on every emission.
pub(crate) struct BufferReadyParams {
    monitored_value: Binding<u64>,
    buffer_object: ObjectId,
    threshold: Binding<u64>,
    previous_count: u64,
    pending_count: Option<u64>,
}

impl BufferReadyParams {
    pub(crate) fn bind(
        monitoring: Option<&EventEnrollment>,
        monitored: &Rc<Object>,
    ) -> Result<Self, ConfigError> {
        match monitoring.map(|e| &e.parameters) {
            Some(EventParameters::BufferReady {
                notification_threshold,
                previous_notification_count,
            }) => {
                let monitored_value = Binding::resolve(
                    "monitored_value",
                    monitored_value_source(monitoring, monitored),
                )?;
                Ok(Self {
                    monitored_value,
                    buffer_object: monitored.id(),
                    threshold: Binding::resolve(
                        "threshold",
                        BindSource::literal(Value::Unsigned(*notification_threshold)),
                    )?,
                    previous_count: *previous_notification_count,
                    pending_count: None,
                })
            }
            Some(other) => Err(ConfigError::ParameterKindMismatch {
                expected: EventType::BufferReady,
                found: other.event_type(),
            }),
            None => {
                let monitored_value = Binding::resolve(
                    "monitored_value",
                    BindSource::property(monitored, PropertyIdentifier::RecordCount),
                )?;
                let previous_count = monitored
                    .get(PropertyIdentifier::RecordsSinceNotification)
                    .as_ref()
                    .and_then(|v| match v {
                        Value::Unsigned(n) => Some(*n),
                        _ => None,
                    })
                    .unwrap_or(0);
                Ok(Self {
                    monitored_value,
                    buffer_object: monitored.id(),
                    threshold: Binding::resolve(
                        "threshold",
                        BindSource::property(monitored, PropertyIdentifier::NotificationThreshold),
                    )?,
                    previous_count,
                    pending_count: None,
                })
            }
        }
    }

    pub(crate) fn evaluate(
        &mut self,
        current: EventState,
        _status_flags: StatusFlags,
    ) -> Result<Option<Proposal>, EventError> {
        self.pending_count = None;
        let Some(count) = self.monitored_value.value() else {
            return Ok(None);
        };
        let Some(threshold) = self.threshold.value() else {
            return Ok(None);
        };
        let accumulated = count.wrapping_sub(self.previous_count);
        if threshold > 0 && accumulated >= threshold {
            self.pending_count = Some(count);
            return Ok(Some(Proposal {
                new_state: EventState::OffNormal,
                parameters: NotificationParameters::BufferReady {
                    buffer_object: self.buffer_object,
                    previous_notification: self.previous_count,
                    current_notification: count,
                },
            }));
        }
        if current.group() == EventStateGroup::OffNormal {
            return Ok(Some(Proposal {
                new_state: EventState::Normal,
                parameters: NotificationParameters::BufferReady {
                    buffer_object: self.buffer_object,
                    previous_notification: self.previous_count,
                    current_notification: count,
                },
            }));
        }
        Ok(None)
    }

    /// Called once the proposed transition has been emitted; only then does
    /// the previous notification count advance to the monitored count.
    pub(crate) fn mark_reported(&mut self) {
        if let Some(count) = self.pending_count.take() {
            self.previous_count = count;
        }
    }

    pub(crate) fn release_parameters(&self, _status_flags: StatusFlags) -> NotificationParameters {
        NotificationParameters::BufferReady {
            buffer_object: self.buffer_object,
            previous_notification: self.previous_count,
            current_notification: self.monitored_value.value().unwrap_or(self.previous_count),
        }
    }
}

impl ParameterSet for BufferReadyParams {
    fn visit_sources(&self, visit: &mut dyn FnMut(&'static str, &BindSource)) {
        visit(self.monitored_value.name(), self.monitored_value.source());
        visit(self.threshold.name(), self.threshold.source());
    }
}
