//! # bacev-engine::event::discrete
//!
//! The discrete-comparison evaluators: change-of-state, change-of-bitstring,
//! change-of-characterstring, change-of-discrete-value, change-of-status-flags,
//! and command failure. Each declares its binding table for the intrinsic
//! and algorithmic paths and a predicate over the current values.

use crate::binding::{BindSource, Binding, ParameterSet};
use crate::event::parameters::{validate_reference, EventEnrollment, EventParameters};
use crate::event::{monitored_value_source, Proposal};
use crate::store::{Object, ObjectStore};
use bacev_api::NotificationParameters;
use bacev_types::errors::{ConfigError, EventError};
use bacev_types::primitives::{BitString, PropertyStates, StatusFlags, Value};
use bacev_types::property::PropertyIdentifier;
use bacev_types::state::{EventState, EventStateGroup, EventType};
use std::rc::Rc;

/// Change-of-state (clause 13.3.2): off-normal while the monitored value
/// equals any configured alarm value.
pub(crate) struct ChangeOfStateParams {
    monitored_value: Binding<Value>,
    alarm_values: Binding<Vec<Value>>,
}

impl ChangeOfStateParams {
    pub(crate) fn bind(
        monitoring: Option<&EventEnrollment>,
        monitored: &Rc<Object>,
    ) -> Result<Self, ConfigError> {
        let monitored_value =
            Binding::resolve("monitored_value", monitored_value_source(monitoring, monitored))?;
        let alarm_values = match monitoring.map(|e| &e.parameters) {
            Some(EventParameters::ChangeOfState { list_of_values, .. }) => Binding::resolve(
                "alarm_values",
                BindSource::literal(Value::Array(list_of_values.clone())),
            )?,
            Some(other) => {
                return Err(ConfigError::ParameterKindMismatch {
                    expected: EventType::ChangeOfState,
                    found: other.event_type(),
                })
            }
            None => {
                // Binary points alarm on a single alarmValue; everything
                // else carries an alarmValues list.
                if monitored.has(PropertyIdentifier::AlarmValue) {
                    let single = monitored
                        .get(PropertyIdentifier::AlarmValue)
                        .unwrap_or(Value::Null);
                    Binding::resolve(
                        "alarm_values",
                        BindSource::literal(Value::Array(vec![single])),
                    )?
                } else {
                    Binding::resolve(
                        "alarm_values",
                        BindSource::property(monitored, PropertyIdentifier::AlarmValues),
                    )?
                }
            }
        };
        Ok(Self {
            monitored_value,
            alarm_values,
        })
    }

    pub(crate) fn evaluate(
        &mut self,
        current: EventState,
        status_flags: StatusFlags,
    ) -> Result<Option<Proposal>, EventError> {
        let Some(v) = self.monitored_value.value() else {
            return Ok(None);
        };
        let alarm_values = self.alarm_values.value().unwrap_or_default();
        let in_alarm = alarm_values.contains(&v);

        let new_state = match current.group() {
            EventStateGroup::Normal if in_alarm => EventState::OffNormal,
            EventStateGroup::OffNormal if !in_alarm => EventState::Normal,
            _ => return Ok(None),
        };
        Ok(Some(Proposal {
            new_state,
            parameters: NotificationParameters::ChangeOfState {
                new_state: PropertyStates::for_value(&v)?,
                status_flags,
            },
        }))
    }

    pub(crate) fn release_parameters(
        &self,
        status_flags: StatusFlags,
    ) -> Result<NotificationParameters, EventError> {
        let v = self.monitored_value.value().unwrap_or(Value::Unsigned(0));
        Ok(NotificationParameters::ChangeOfState {
            new_state: PropertyStates::for_value(&v)?,
            status_flags,
        })
    }
}

impl ParameterSet for ChangeOfStateParams {
    fn visit_sources(&self, visit: &mut dyn FnMut(&'static str, &BindSource)) {
        visit(self.monitored_value.name(), self.monitored_value.source());
        visit(self.alarm_values.name(), self.alarm_values.source());
    }
}

/// Change-of-bitstring (clause 13.3.1): off-normal while the masked
/// monitored bits equal any configured alarm bit string.
pub(crate) struct ChangeOfBitstringParams {
    monitored_value: Binding<BitString>,
    bitmask: Binding<BitString>,
    alarm_values: Binding<Vec<BitString>>,
}

impl ChangeOfBitstringParams {
    pub(crate) fn bind(
        monitoring: Option<&EventEnrollment>,
        monitored: &Rc<Object>,
    ) -> Result<Self, ConfigError> {
        let monitored_value =
            Binding::resolve("monitored_value", monitored_value_source(monitoring, monitored))?;
        match monitoring.map(|e| &e.parameters) {
            Some(EventParameters::ChangeOfBitstring {
                bitmask,
                list_of_bitstring_values,
                ..
            }) => Ok(Self {
                monitored_value,
                bitmask: Binding::resolve(
                    "bitmask",
                    BindSource::literal(Value::BitString(bitmask.clone())),
                )?,
                alarm_values: Binding::resolve(
                    "alarm_values",
                    BindSource::literal(Value::Array(
                        list_of_bitstring_values
                            .iter()
                            .cloned()
                            .map(Value::BitString)
                            .collect(),
                    )),
                )?,
            }),
            Some(other) => Err(ConfigError::ParameterKindMismatch {
                expected: EventType::ChangeOfBitstring,
                found: other.event_type(),
            }),
            None => Ok(Self {
                monitored_value,
                bitmask: Binding::resolve(
                    "bitmask",
                    BindSource::property(monitored, PropertyIdentifier::BitMask),
                )?,
                alarm_values: Binding::resolve(
                    "alarm_values",
                    BindSource::property(monitored, PropertyIdentifier::AlarmValues),
                )?,
            }),
        }
    }

    fn in_alarm(&self, v: &BitString) -> bool {
        let mask = self.bitmask.value().unwrap_or_default();
        let masked = v.masked(&mask);
        self.alarm_values
            .value()
            .unwrap_or_default()
            .iter()
            .any(|alarm| masked == *alarm)
    }

    pub(crate) fn evaluate(
        &mut self,
        current: EventState,
        status_flags: StatusFlags,
    ) -> Result<Option<Proposal>, EventError> {
        let Some(v) = self.monitored_value.value() else {
            return Ok(None);
        };
        let in_alarm = self.in_alarm(&v);
        let new_state = match current.group() {
            EventStateGroup::Normal if in_alarm => EventState::OffNormal,
            EventStateGroup::OffNormal if !in_alarm => EventState::Normal,
            _ => return Ok(None),
        };
        Ok(Some(Proposal {
            new_state,
            parameters: NotificationParameters::ChangeOfBitstring {
                referenced_bitstring: v,
                status_flags,
            },
        }))
    }

    pub(crate) fn release_parameters(&self, status_flags: StatusFlags) -> NotificationParameters {
        NotificationParameters::ChangeOfBitstring {
            referenced_bitstring: self.monitored_value.value().unwrap_or_default(),
            status_flags,
        }
    }
}

impl ParameterSet for ChangeOfBitstringParams {
    fn visit_sources(&self, visit: &mut dyn FnMut(&'static str, &BindSource)) {
        visit(self.monitored_value.name(), self.monitored_value.source());
        visit(self.bitmask.name(), self.bitmask.source());
        visit(self.alarm_values.name(), self.alarm_values.source());
    }
}

/// Change-of-characterstring (clause 13.3.16): off-normal while the
/// monitored string contains any non-empty alarm entry as a case-sensitive
/// substring.
pub(crate) struct ChangeOfCharacterStringParams {
    monitored_value: Binding<String>,
    alarm_values: Binding<Vec<String>>,
}

impl ChangeOfCharacterStringParams {
    pub(crate) fn bind(
        monitoring: Option<&EventEnrollment>,
        monitored: &Rc<Object>,
    ) -> Result<Self, ConfigError> {
        let monitored_value =
            Binding::resolve("monitored_value", monitored_value_source(monitoring, monitored))?;
        let alarm_values = match monitoring.map(|e| &e.parameters) {
            Some(EventParameters::ChangeOfCharacterstring {
                list_of_alarm_values,
                ..
            }) => Binding::resolve(
                "alarm_values",
                BindSource::literal(Value::Array(
                    list_of_alarm_values
                        .iter()
                        .cloned()
                        .map(Value::CharacterString)
                        .collect(),
                )),
            )?,
            Some(other) => {
                return Err(ConfigError::ParameterKindMismatch {
                    expected: EventType::ChangeOfCharacterstring,
                    found: other.event_type(),
                })
            }
            None => Binding::resolve(
                "alarm_values",
                BindSource::property(monitored, PropertyIdentifier::AlarmValues),
            )?,
        };
        Ok(Self {
            monitored_value,
            alarm_values,
        })
    }

    fn matched_alarm(&self, v: &str) -> Option<String> {
        self.alarm_values
            .value()
            .unwrap_or_default()
            .into_iter()
            .find(|alarm| !alarm.is_empty() && v.contains(alarm.as_str()))
    }

    pub(crate) fn evaluate(
        &mut self,
        current: EventState,
        status_flags: StatusFlags,
    ) -> Result<Option<Proposal>, EventError> {
        let Some(v) = self.monitored_value.value() else {
            return Ok(None);
        };
        let matched = self.matched_alarm(&v);
        let (new_state, alarm_value) = match current.group() {
            EventStateGroup::Normal => match matched {
                Some(alarm) => (EventState::OffNormal, alarm),
                None => return Ok(None),
            },
            EventStateGroup::OffNormal if matched.is_none() => {
                (EventState::Normal, String::new())
            }
            _ => return Ok(None),
        };
        Ok(Some(Proposal {
            new_state,
            parameters: NotificationParameters::ChangeOfCharacterstring {
                changed_value: v,
                status_flags,
                alarm_value,
            },
        }))
    }

    pub(crate) fn release_parameters(&self, status_flags: StatusFlags) -> NotificationParameters {
        NotificationParameters::ChangeOfCharacterstring {
            changed_value: self.monitored_value.value().unwrap_or_default(),
            status_flags,
            alarm_value: String::new(),
        }
    }
}

impl ParameterSet for ChangeOfCharacterStringParams {
    fn visit_sources(&self, visit: &mut dyn FnMut(&'static str, &BindSource)) {
        visit(self.monitored_value.name(), self.monitored_value.source());
        visit(self.alarm_values.name(), self.alarm_values.source());
    }
}

/// Change-of-discrete-value (clause 13.3.18): any change of the monitored
/// value since the last report is off-normal; a later evaluation without a
/// change returns to normal.
pub(crate) struct ChangeOfDiscreteValueParams {
    monitored_value: Binding<Value>,
    last_reported: Option<Value>,
    pending_report: Option<Value>,
}

impl ChangeOfDiscreteValueParams {
    pub(crate) fn bind(
        monitoring: Option<&EventEnrollment>,
        monitored: &Rc<Object>,
    ) -> Result<Self, ConfigError> {
        if let Some(parameters) = monitoring.map(|e| &e.parameters) {
            if !matches!(parameters, EventParameters::ChangeOfDiscreteValue { .. }) {
                return Err(ConfigError::ParameterKindMismatch {
                    expected: EventType::ChangeOfDiscreteValue,
                    found: parameters.event_type(),
                });
            }
        }
        let monitored_value =
            Binding::resolve("monitored_value", monitored_value_source(monitoring, monitored))?;
        let last_reported = monitored_value.value();
        Ok(Self {
            monitored_value,
            last_reported,
            pending_report: None,
        })
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
        let changed = self.last_reported.as_ref() != Some(&v);
        let new_state = if changed {
            self.pending_report = Some(v.clone());
            EventState::OffNormal
        } else if current.group() == EventStateGroup::OffNormal {
            EventState::Normal
        } else {
            return Ok(None);
        };
        Ok(Some(Proposal {
            new_state,
            parameters: NotificationParameters::ChangeOfDiscreteValue {
                new_value: v,
                status_flags,
            },
        }))
    }

    /// Called once the proposed transition has been emitted; the baseline
    /// a change is measured against advances only then.
    pub(crate) fn mark_reported(&mut self) {
        if let Some(v) = self.pending_report.take() {
            self.last_reported = Some(v);
        }
    }

    pub(crate) fn release_parameters(&self, status_flags: StatusFlags) -> NotificationParameters {
        NotificationParameters::ChangeOfDiscreteValue {
            new_value: self.monitored_value.value().unwrap_or(Value::Null),
            status_flags,
        }
    }
}

impl ParameterSet for ChangeOfDiscreteValueParams {
    fn visit_sources(&self, visit: &mut dyn FnMut(&'static str, &BindSource)) {
        visit(self.monitored_value.name(), self.monitored_value.source());
    }
}

/// Change-of-status-flags (clause 13.3.11): off-normal while any selected
/// flag is set in the monitored flags.
pub(crate) struct ChangeOfStatusFlagsParams {
    monitored_value: Binding<StatusFlags>,
    selected_flags: Binding<StatusFlags>,
    present_value: Option<Binding<Value>>,
}

impl ChangeOfStatusFlagsParams {
    pub(crate) fn bind(
        monitoring: Option<&EventEnrollment>,
        monitored: &Rc<Object>,
    ) -> Result<Self, ConfigError> {
        match monitoring.map(|e| &e.parameters) {
            Some(EventParameters::ChangeOfStatusFlags { selected_flags, .. }) => Ok(Self {
                monitored_value: Binding::resolve(
                    "monitored_value",
                    monitored_value_source(monitoring, monitored),
                )?,
                selected_flags: Binding::resolve(
                    "selected_flags",
                    BindSource::literal(Value::StatusFlags(*selected_flags)),
                )?,
                present_value: Binding::resolve_opt(
                    "present_value",
                    monitored.has(PropertyIdentifier::PresentValue).then(|| {
                        BindSource::property(monitored, PropertyIdentifier::PresentValue)
                    }),
                )?,
            }),
            Some(other) => Err(ConfigError::ParameterKindMismatch {
                expected: EventType::ChangeOfStatusFlags,
                found: other.event_type(),
            }),
            None => Ok(Self {
                monitored_value: Binding::resolve(
                    "monitored_value",
                    BindSource::property(monitored, PropertyIdentifier::MemberStatusFlags),
                )?,
                selected_flags: Binding::resolve(
                    "selected_flags",
                    BindSource::literal(Value::StatusFlags(StatusFlags::IN_ALARM_FAULT)),
                )?,
                present_value: Binding::resolve_opt(
                    "present_value",
                    monitored.has(PropertyIdentifier::PresentValue).then(|| {
                        BindSource::property(monitored, PropertyIdentifier::PresentValue)
                    }),
                )?,
            }),
        }
    }

    pub(crate) fn evaluate(
        &mut self,
        current: EventState,
        _status_flags: StatusFlags,
    ) -> Result<Option<Proposal>, EventError> {
        let Some(v) = self.monitored_value.value() else {
            return Ok(None);
        };
        let selected = self.selected_flags.value().unwrap_or_default();
        let in_alarm = v.intersects(selected);
        let new_state = match current.group() {
            EventStateGroup::Normal if in_alarm => EventState::OffNormal,
            EventStateGroup::OffNormal if !in_alarm => EventState::Normal,
            _ => return Ok(None),
        };
        Ok(Some(Proposal {
            new_state,
            parameters: NotificationParameters::ChangeOfStatusFlags {
                present_value: self.present_value.as_ref().and_then(Binding::value),
                referenced_flags: v,
            },
        }))
    }

    pub(crate) fn release_parameters(&self, _status_flags: StatusFlags) -> NotificationParameters {
        NotificationParameters::ChangeOfStatusFlags {
            present_value: self.present_value.as_ref().and_then(Binding::value),
            referenced_flags: self.monitored_value.value().unwrap_or_default(),
        }
    }
}

impl ParameterSet for ChangeOfStatusFlagsParams {
    fn visit_sources(&self, visit: &mut dyn FnMut(&'static str, &BindSource)) {
        visit(self.monitored_value.name(), self.monitored_value.source());
        visit(self.selected_flags.name(), self.selected_flags.source());
        if let Some(b) = &self.present_value {
            visit(b.name(), b.source());
        }
    }
}

/// Command failure (clause 13.3.4): off-normal while the commanded value
/// and the feedback value disagree.
pub(crate) struct CommandFailureParams {
    monitored_value: Binding<Value>,
    feedback_value: Binding<Value>,
}

impl CommandFailureParams {
    pub(crate) fn bind(
        monitoring: Option<&EventEnrollment>,
        monitored: &Rc<Object>,
        store: &ObjectStore,
    ) -> Result<Self, ConfigError> {
        let monitored_value =
            Binding::resolve("monitored_value", monitored_value_source(monitoring, monitored))?;
        let feedback_value = match monitoring.map(|e| &e.parameters) {
            Some(EventParameters::CommandFailure {
                feedback_property_reference,
                ..
            }) => {
                validate_reference(feedback_property_reference)?;
                let feedback_object = store
                    .get(feedback_property_reference.object_id)
                    .ok_or(ConfigError::ObjectNotFound(
                        feedback_property_reference.object_id,
                    ))?;
                Binding::resolve(
                    "feedback_value",
                    BindSource::property(&feedback_object, feedback_property_reference.property),
                )?
            }
            Some(other) => {
                return Err(ConfigError::ParameterKindMismatch {
                    expected: EventType::CommandFailure,
                    found: other.event_type(),
                })
            }
            None => Binding::resolve(
                "feedback_value",
                BindSource::property(monitored, PropertyIdentifier::FeedbackValue),
            )?,
        };
        Ok(Self {
            monitored_value,
            feedback_value,
        })
    }

    pub(crate) fn evaluate(
        &mut self,
        current: EventState,
        status_flags: StatusFlags,
    ) -> Result<Option<Proposal>, EventError> {
        let (Some(v), Some(feedback)) =
            (self.monitored_value.value(), self.feedback_value.value())
        else {
            return Ok(None);
        };
        let disagree = v != feedback;
        let new_state = match current.group() {
            EventStateGroup::Normal if disagree => EventState::OffNormal,
            EventStateGroup::OffNormal if !disagree => EventState::Normal,
            _ => return Ok(None),
        };
        Ok(Some(Proposal {
            new_state,
            parameters: NotificationParameters::CommandFailure {
                command_value: v,
                status_flags,
                feedback_value: feedback,
            },
        }))
    }

    pub(crate) fn release_parameters(&self, status_flags: StatusFlags) -> NotificationParameters {
        NotificationParameters::CommandFailure {
            command_value: self.monitored_value.value().unwrap_or(Value::Null),
            status_flags,
            feedback_value: self.feedback_value.value().unwrap_or(Value::Null),
        }
    }
}

impl ParameterSet for CommandFailureParams {
    fn visit_sources(&self, visit: &mut dyn FnMut(&'static str, &BindSource)) {
        visit(self.monitored_value.name(), self.monitored_value.source());
        visit(self.feedback_value.name(), self.feedback_value.source());
    }
}
