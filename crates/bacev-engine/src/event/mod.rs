//! # bacev-engine::event
//!
//! The event-algorithm base. An instance binds its parameters against the
//! monitored object (intrinsic reporting) or an enrollment descriptor
//! (algorithmic reporting), watches the bound properties through the
//! scheduler, and on each evaluation proposes at most one state change,
//! which the transition table's interlocks either commit or suppress.
//! Committing writes the initiating object's event-state fields and hands
//! the notification to the distribution sink.

pub mod extended;

mod discrete;
mod parameters;
mod range;
mod template;
mod transitions;
mod value;

pub use parameters::{CovCriteria, EventEnrollment, EventParameters};

use crate::binding::{BindSource, Binding, FromValue, ParameterSet};
use crate::engine::{self, AlgorithmCell, EvalCtx, EventEngine};
use crate::fault;
use crate::store::{Object, ObjectStore};
use bacev_api::{Notification, NotificationParameters, ReliabilityEval};
use bacev_types::errors::{ConfigError, EventError};
use bacev_types::primitives::{EventTransitionBits, StatusFlags, Value};
use bacev_types::property::PropertyIdentifier;
use bacev_types::state::{EventState, EventStateGroup, EventType, Reliability};
use bacev_types::time::TimeStamp;
use std::rc::Rc;

/// The pending-change name reliability updates arrive under.
pub(crate) const PARAM_RELIABILITY: &str = "reliability";

/// One proposed state change with its notification payload.
pub(crate) struct Proposal {
    pub new_state: EventState,
    pub parameters: NotificationParameters,
}

/// The source the monitored value binds to: the property named by the
/// enrollment's reference for algorithmic reporting, the monitored
/// object's present value otherwise.
pub(crate) fn monitored_value_source(
    monitoring: Option<&EventEnrollment>,
    monitored: &Rc<Object>,
) -> BindSource {
    match monitoring {
        Some(enrollment) => {
            BindSource::property(monitored, enrollment.object_property_reference.property)
        }
        None => BindSource::property(monitored, PropertyIdentifier::PresentValue),
    }
}

/// The concrete per-clause evaluators, one variant per supported event
/// type, each carrying its own typed parameter set.
pub(crate) enum EventCriteria {
    ChangeOfBitstring(discrete::ChangeOfBitstringParams),
    ChangeOfState(discrete::ChangeOfStateParams),
    ChangeOfValue(value::ChangeOfValueParams),
    CommandFailure(discrete::CommandFailureParams),
    FloatingLimit(range::FloatingLimitParams),
    OutOfRange(range::RangeParams<f32>),
    BufferReady(value::BufferReadyParams),
    UnsignedRange(range::RangeParams<u64>),
    Extended(extended::ExtendedParams),
    ChangeOfStatusFlags(discrete::ChangeOfStatusFlagsParams),
    DoubleOutOfRange(range::RangeParams<f64>),
    SignedOutOfRange(range::RangeParams<i64>),
    UnsignedOutOfRange(range::RangeParams<u64>),
    ChangeOfCharacterstring(discrete::ChangeOfCharacterStringParams),
    None,
    ChangeOfDiscreteValue(discrete::ChangeOfDiscreteValueParams),
}

impl EventCriteria {
    fn bind(
        event_type: EventType,
        monitoring: Option<&EventEnrollment>,
        monitored: &Rc<Object>,
        store: &ObjectStore,
    ) -> Result<Self, ConfigError> {
        match event_type {
            EventType::ChangeOfBitstring => {
                discrete::ChangeOfBitstringParams::bind(monitoring, monitored)
                    .map(EventCriteria::ChangeOfBitstring)
            }
            EventType::ChangeOfState => discrete::ChangeOfStateParams::bind(monitoring, monitored)
                .map(EventCriteria::ChangeOfState),
            EventType::ChangeOfValue => value::ChangeOfValueParams::bind(monitoring, monitored)
                .map(EventCriteria::ChangeOfValue),
            EventType::CommandFailure => {
                discrete::CommandFailureParams::bind(monitoring, monitored, store)
                    .map(EventCriteria::CommandFailure)
            }
            EventType::FloatingLimit => {
                range::FloatingLimitParams::bind(monitoring, monitored, store)
                    .map(EventCriteria::FloatingLimit)
            }
            EventType::OutOfRange => {
                range::RangeParams::<f32>::bind_out_of_range(monitoring, monitored)
                    .map(EventCriteria::OutOfRange)
            }
            EventType::BufferReady => value::BufferReadyParams::bind(monitoring, monitored)
                .map(EventCriteria::BufferReady),
            EventType::UnsignedRange => {
                range::RangeParams::<u64>::bind_unsigned_range(monitoring, monitored)
                    .map(EventCriteria::UnsignedRange)
            }
            EventType::Extended => {
                extended::ExtendedParams::bind(monitoring).map(EventCriteria::Extended)
            }
            EventType::ChangeOfStatusFlags => {
                discrete::ChangeOfStatusFlagsParams::bind(monitoring, monitored)
                    .map(EventCriteria::ChangeOfStatusFlags)
            }
            EventType::DoubleOutOfRange => {
                range::RangeParams::<f64>::bind_double_out_of_range(monitoring, monitored)
                    .map(EventCriteria::DoubleOutOfRange)
            }
            EventType::SignedOutOfRange => {
                range::RangeParams::<i64>::bind_signed_out_of_range(monitoring, monitored)
                    .map(EventCriteria::SignedOutOfRange)
            }
            EventType::UnsignedOutOfRange => {
                range::RangeParams::<u64>::bind_unsigned_out_of_range(monitoring, monitored)
                    .map(EventCriteria::UnsignedOutOfRange)
            }
            EventType::ChangeOfCharacterstring => {
                discrete::ChangeOfCharacterStringParams::bind(monitoring, monitored)
                    .map(EventCriteria::ChangeOfCharacterstring)
            }
            EventType::None => {
                if let Some(parameters) = monitoring.map(|e| &e.parameters) {
                    if !matches!(parameters, EventParameters::None) {
                        return Err(ConfigError::ParameterKindMismatch {
                            expected: EventType::None,
                            found: parameters.event_type(),
                        });
                    }
                }
                Ok(EventCriteria::None)
            }
            EventType::ChangeOfDiscreteValue => {
                discrete::ChangeOfDiscreteValueParams::bind(monitoring, monitored)
                    .map(EventCriteria::ChangeOfDiscreteValue)
            }
            EventType::AccessEvent | EventType::ChangeOfTimer | EventType::ChangeOfLifeSafety => {
                Err(ConfigError::UnsupportedEventType(event_type))
            }
        }
    }

    fn evaluate(
        &mut self,
        current: EventState,
        status_flags: StatusFlags,
    ) -> Result<Option<Proposal>, EventError> {
        match self {
            EventCriteria::ChangeOfBitstring(p) => p.evaluate(current, status_flags),
            EventCriteria::ChangeOfState(p) => p.evaluate(current, status_flags),
            EventCriteria::ChangeOfValue(p) => p.evaluate(current, status_flags),
            EventCriteria::CommandFailure(p) => p.evaluate(current, status_flags),
            EventCriteria::FloatingLimit(p) => p.evaluate(current, status_flags),
            EventCriteria::OutOfRange(p) => p.evaluate(current, status_flags),
            EventCriteria::BufferReady(p) => p.evaluate(current, status_flags),
            EventCriteria::UnsignedRange(p) => p.evaluate(current, status_flags),
            EventCriteria::Extended(p) => p.evaluate(current, status_flags),
            EventCriteria::ChangeOfStatusFlags(p) => p.evaluate(current, status_flags),
            EventCriteria::DoubleOutOfRange(p) => p.evaluate(current, status_flags),
            EventCriteria::SignedOutOfRange(p) => p.evaluate(current, status_flags),
            EventCriteria::UnsignedOutOfRange(p) => p.evaluate(current, status_flags),
            EventCriteria::ChangeOfCharacterstring(p) => p.evaluate(current, status_flags),
            EventCriteria::None => Ok(Option::None),
            EventCriteria::ChangeOfDiscreteValue(p) => p.evaluate(current, status_flags),
        }
    }

    /// Tells the stateful evaluators their last proposal was emitted, so
    /// they may advance their report baseline. A no-op everywhere else.
    fn mark_reported(&mut self) {
        match self {
            EventCriteria::ChangeOfValue(p) => p.mark_reported(),
            EventCriteria::BufferReady(p) => p.mark_reported(),
            EventCriteria::ChangeOfDiscreteValue(p) => p.mark_reported(),
            _ => {}
        }
    }

    /// Payload for a transition the interlocks force rather than the
    /// predicate proposing it (the inhibit release to Normal).
    fn release_parameters(
        &self,
        current: EventState,
        status_flags: StatusFlags,
    ) -> Result<NotificationParameters, EventError> {
        match self {
            EventCriteria::ChangeOfBitstring(p) => Ok(p.release_parameters(status_flags)),
            EventCriteria::ChangeOfState(p) => p.release_parameters(status_flags),
            EventCriteria::ChangeOfValue(p) => Ok(p.release_parameters(status_flags)),
            EventCriteria::CommandFailure(p) => Ok(p.release_parameters(status_flags)),
            EventCriteria::FloatingLimit(p) => Ok(p.release_parameters(current, status_flags)),
            EventCriteria::OutOfRange(p) => Ok(p.release_parameters(current, status_flags)),
            EventCriteria::BufferReady(p) => Ok(p.release_parameters(status_flags)),
            EventCriteria::UnsignedRange(p) => Ok(p.release_parameters(current, status_flags)),
            EventCriteria::Extended(p) => Ok(p.notification()),
            EventCriteria::ChangeOfStatusFlags(p) => Ok(p.release_parameters(status_flags)),
            EventCriteria::DoubleOutOfRange(p) => Ok(p.release_parameters(current, status_flags)),
            EventCriteria::SignedOutOfRange(p) => Ok(p.release_parameters(current, status_flags)),
            EventCriteria::UnsignedOutOfRange(p) => {
                Ok(p.release_parameters(current, status_flags))
            }
            EventCriteria::ChangeOfCharacterstring(p) => Ok(p.release_parameters(status_flags)),
            EventCriteria::None => Ok(NotificationParameters::ChangeOfReliability {
                reliability: Reliability::NoFaultDetected,
                status_flags,
            }),
            EventCriteria::ChangeOfDiscreteValue(p) => Ok(p.release_parameters(status_flags)),
        }
    }
}

impl ParameterSet for EventCriteria {
    fn visit_sources(&self, visit: &mut dyn FnMut(&'static str, &BindSource)) {
        match self {
            EventCriteria::ChangeOfBitstring(p) => p.visit_sources(visit),
            EventCriteria::ChangeOfState(p) => p.visit_sources(visit),
            EventCriteria::ChangeOfValue(p) => p.visit_sources(visit),
            EventCriteria::CommandFailure(p) => p.visit_sources(visit),
            EventCriteria::FloatingLimit(p) => p.visit_sources(visit),
            EventCriteria::OutOfRange(p) => p.visit_sources(visit),
            EventCriteria::BufferReady(p) => p.visit_sources(visit),
            EventCriteria::UnsignedRange(p) => p.visit_sources(visit),
            EventCriteria::Extended(p) => p.visit_sources(visit),
            EventCriteria::ChangeOfStatusFlags(p) => p.visit_sources(visit),
            EventCriteria::DoubleOutOfRange(p) => p.visit_sources(visit),
            EventCriteria::SignedOutOfRange(p) => p.visit_sources(visit),
            EventCriteria::UnsignedOutOfRange(p) => p.visit_sources(visit),
            EventCriteria::ChangeOfCharacterstring(p) => p.visit_sources(visit),
            EventCriteria::None => {}
            EventCriteria::ChangeOfDiscreteValue(p) => p.visit_sources(visit),
        }
    }
}

/// One bound event algorithm instance.
///
/// Exactly one of intrinsic vs algorithmic configuration is active per
/// instance; switching after bind is not supported. The event-initiating
/// object, whose `eventState`, `eventTimeStamps`, and `eventMessageTexts`
/// this instance writes, is the monitoring object when present, else the
/// monitored object; two instances must never share an initiating object.
pub struct EventAlgorithm {
    event_type: EventType,
    monitored: Rc<Object>,
    monitoring: Option<Rc<Object>>,
    fault: Option<Rc<dyn ReliabilityEval>>,
    current_state: Binding<EventState>,
    status_flags: Option<Binding<StatusFlags>>,
    inhibit: Option<Binding<bool>>,
    time_delay: Option<Binding<u32>>,
    time_delay_normal: Option<Binding<u32>>,
    last_reliability: Option<Reliability>,
    criteria: EventCriteria,
}

impl EventAlgorithm {
    /// Creates, binds, and registers an algorithm.
    ///
    /// Resolves every parameter binding for `event_type` (fatal on any
    /// configuration error) and reads `eventDetectionEnable` on the
    /// configuration object: when false the initiating object's event
    /// fields are forced back to their initial conditions and the instance
    /// stays inert. Otherwise installs the property monitors and the
    /// optional algorithm-inhibit cascade, and registers with the engine.
    pub fn attach(
        engine: &Rc<EventEngine>,
        store: &ObjectStore,
        event_type: EventType,
        monitoring: Option<&Rc<EventEnrollment>>,
        monitored: &Rc<Object>,
    ) -> Result<Rc<AlgorithmCell>, ConfigError> {
        let enrollment = monitoring.map(Rc::as_ref);
        let config_object = enrollment
            .map(|e| e.object.clone())
            .unwrap_or_else(|| monitored.clone());

        // Fault precedence: the monitoring object's own evaluator, else
        // the monitored object's, else none.
        let fault = fault::resolve(enrollment.map(|e| &e.object), monitored);

        let criteria = EventCriteria::bind(event_type, enrollment, monitored, store)?;

        let current_state = Binding::resolve(
            "current_state",
            BindSource::property(&config_object, PropertyIdentifier::EventState),
        )?;
        let inhibit = Binding::resolve_opt(
            "algorithm_inhibit",
            config_object
                .has(PropertyIdentifier::EventAlgorithmInhibit)
                .then(|| {
                    BindSource::property(&config_object, PropertyIdentifier::EventAlgorithmInhibit)
                }),
        )?;
        let status_flags = Binding::resolve_opt(
            "status_flags",
            monitored
                .has(PropertyIdentifier::StatusFlags)
                .then(|| BindSource::property(monitored, PropertyIdentifier::StatusFlags)),
        )?;
        let time_delay = match enrollment {
            Some(e) => Binding::resolve_opt(
                "time_delay",
                e.parameters
                    .time_delay()
                    .map(|d| BindSource::literal(Value::Unsigned(u64::from(d)))),
            )?,
            None => Binding::resolve_opt(
                "time_delay",
                monitored
                    .has(PropertyIdentifier::TimeDelay)
                    .then(|| BindSource::property(monitored, PropertyIdentifier::TimeDelay)),
            )?,
        };
        let time_delay_normal = match enrollment {
            Some(_) => None,
            None => Binding::resolve_opt(
                "time_delay_normal",
                monitored
                    .has(PropertyIdentifier::TimeDelayNormal)
                    .then(|| BindSource::property(monitored, PropertyIdentifier::TimeDelayNormal)),
            )?,
        };

        let (fault_eval, fault_owner) = match fault {
            Some((eval, owner)) => (Some(eval), Some(owner)),
            None => (None, None),
        };

        let algorithm = EventAlgorithm {
            event_type,
            monitored: monitored.clone(),
            monitoring: enrollment.map(|e| e.object.clone()),
            fault: fault_eval,
            current_state,
            status_flags,
            inhibit,
            time_delay,
            time_delay_normal,
            last_reliability: None,
            criteria,
        };
        let cell = AlgorithmCell::new(algorithm);

        let detection_enabled = config_object
            .get(PropertyIdentifier::EventDetectionEnable)
            .as_ref()
            .and_then(bool::from_value)
            .unwrap_or(true);
        if !detection_enabled {
            reset_initial_conditions(&config_object);
            cell.detached.set(true);
            tracing::debug!(
                object = %config_object.id(),
                "event detection disabled; algorithm left inert"
            );
            return Ok(cell);
        }

        // An eventAlgorithmInhibitRef installs a one-way cascade from the
        // referenced property into the configuration object's inhibit.
        if let Some(Value::PropertyRef(reference)) =
            config_object.get(PropertyIdentifier::EventAlgorithmInhibitRef)
        {
            if !config_object.has(PropertyIdentifier::EventAlgorithmInhibit) {
                return Err(ConfigError::InhibitRefWithoutInhibit);
            }
            parameters::validate_reference(&reference)?;
            let source = store
                .get(reference.object_id)
                .ok_or(ConfigError::ObjectNotFound(reference.object_id))?;
            let weak_config = Rc::downgrade(&config_object);
            let monitor = source.add_monitor(reference.property, move |_old, new| {
                if let Some(config) = weak_config.upgrade() {
                    config.set(PropertyIdentifier::EventAlgorithmInhibit, new.clone());
                }
            });
            cell.subscriptions.borrow_mut().push(engine::Subscription {
                object: source,
                property: reference.property,
                monitor,
            });
        }

        // Install a change monitor on every property-bound parameter.
        {
            let algorithm = cell.algorithm.borrow();
            algorithm.visit_sources(&mut |name, source| {
                if let BindSource::Property { object, property } = source {
                    engine::subscribe(engine, &cell, name, object, *property);
                }
            });
        }

        // Reliability changes ride the same machinery, so fault and value
        // changes coalesce into a single evaluation.
        if let Some(owner) = fault_owner {
            engine::subscribe(
                engine,
                &cell,
                PARAM_RELIABILITY,
                &owner,
                PropertyIdentifier::Reliability,
            );
        }

        engine.register(cell.clone());
        Ok(cell)
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// The current event state as mirrored by the configuration object.
    pub fn current_state(&self) -> EventState {
        self.current_state.value().unwrap_or(EventState::Normal)
    }

    /// The operator inhibit; absent bindings read as not inhibited.
    pub fn inhibited(&self) -> bool {
        self.inhibit
            .as_ref()
            .and_then(Binding::value)
            .unwrap_or(false)
    }

    /// The configured time delay, in seconds. Bound and validated; the
    /// debounce mechanism itself is a future extension.
    pub fn time_delay(&self) -> u32 {
        self.time_delay
            .as_ref()
            .and_then(Binding::value)
            .unwrap_or(0)
    }

    /// The configured to-normal time delay, falling back to `time_delay`.
    pub fn time_delay_normal(&self) -> u32 {
        self.time_delay_normal
            .as_ref()
            .and_then(Binding::value)
            .unwrap_or_else(|| self.time_delay())
    }

    fn evaluated_reliability(&self) -> Option<Reliability> {
        self.fault
            .as_ref()
            .and_then(|eval| eval.evaluated_reliability())
    }

    /// True when no fault algorithm is attached or its output is healthy.
    pub(crate) fn no_fault_detected(&self) -> bool {
        self.evaluated_reliability()
            .map_or(true, Reliability::is_no_fault)
    }

    fn status_flags(&self) -> StatusFlags {
        self.status_flags
            .as_ref()
            .and_then(Binding::value)
            .unwrap_or_default()
    }

    fn initiating_object(&self) -> &Rc<Object> {
        self.monitoring.as_ref().unwrap_or(&self.monitored)
    }

    fn visit_sources(&self, visit: &mut dyn FnMut(&'static str, &BindSource)) {
        visit(self.current_state.name(), self.current_state.source());
        if let Some(b) = &self.inhibit {
            visit(b.name(), b.source());
        }
        if let Some(b) = &self.status_flags {
            visit(b.name(), b.source());
        }
        if let Some(b) = &self.time_delay {
            visit(b.name(), b.source());
        }
        if let Some(b) = &self.time_delay_normal {
            visit(b.name(), b.source());
        }
        self.criteria.visit_sources(visit);
    }

    /// One evaluation epoch. Reliability drives the coarse machine first;
    /// a raised inhibit forces off-normal points back to Normal; only then
    /// does the per-clause predicate run.
    pub(crate) fn evaluate(&mut self, ctx: &EvalCtx) -> Result<(), EventError> {
        let current = self.current_state();
        let reliability = self.evaluated_reliability();

        if let Some(r) = reliability.filter(|r| !r.is_no_fault()) {
            if current.group() != EventStateGroup::Fault {
                self.state_transition(ctx, EventState::Fault, self.reliability_parameters(r))?;
            } else if self.reliability_reannounced(ctx, r) {
                self.state_transition(ctx, EventState::Fault, self.reliability_parameters(r))?;
            }
            self.last_reliability = Some(r);
            return Ok(());
        }

        if current.group() == EventStateGroup::Fault {
            let cleared = reliability.unwrap_or(Reliability::NoFaultDetected);
            self.state_transition(ctx, EventState::Normal, self.reliability_parameters(cleared))?;
            self.last_reliability = reliability;
            return Ok(());
        }
        self.last_reliability = reliability;

        if self.inhibited() && current.group() == EventStateGroup::OffNormal {
            let parameters = self
                .criteria
                .release_parameters(current, self.status_flags())?;
            self.state_transition(ctx, EventState::Normal, parameters)?;
            return Ok(());
        }

        let status_flags = self.status_flags();
        if let Some(proposal) = self.criteria.evaluate(current, status_flags)? {
            // The report baseline of the stateful evaluators advances only
            // when the proposal survives the interlocks.
            if self.state_transition(ctx, proposal.new_state, proposal.parameters)? {
                self.criteria.mark_reported();
            }
        }
        Ok(())
    }

    fn reliability_parameters(&self, reliability: Reliability) -> NotificationParameters {
        NotificationParameters::ChangeOfReliability {
            reliability,
            status_flags: self.status_flags(),
        }
    }

    /// A Fault-to-Fault re-stamp needs the reliability to have changed or
    /// to have been re-announced within this epoch's pending changes.
    fn reliability_reannounced(&self, ctx: &EvalCtx, reliability: Reliability) -> bool {
        self.last_reliability != Some(reliability)
            || ctx.changes.iter().any(|c| c.name == PARAM_RELIABILITY)
    }

    /// Maps the current and proposed states onto their groups and runs the
    /// table handler, returning whether the transition committed. A missing
    /// handler is unreachable by construction and guards against corrupt
    /// state.
    pub(crate) fn state_transition(
        &mut self,
        ctx: &EvalCtx,
        new_state: EventState,
        parameters: NotificationParameters,
    ) -> Result<bool, EventError> {
        let from = self.current_state().group();
        let to = new_state.group();
        let Some(handler) = transitions::lookup(from, to) else {
            return Err(EventError::NoTransitionHandler { from, to });
        };
        handler(self, ctx, new_state, parameters)
    }

    /// The shared commit path: write `eventState`, stamp the group's
    /// `eventTimeStamps` slot, clear the group's acked bit, render the
    /// message text, and hand the notification to the emitter.
    pub(crate) fn transition_action(
        &mut self,
        ctx: &EvalCtx,
        new_state: EventState,
        parameters: NotificationParameters,
    ) -> Result<(), EventError> {
        let group = new_state.group();
        let index = group.array_index();
        let initiating = self.initiating_object().clone();

        initiating.set(PropertyIdentifier::EventState, Value::EventState(new_state));

        let timestamp = TimeStamp::now();
        let mut stamps = match initiating.get(PropertyIdentifier::EventTimeStamps) {
            Some(Value::Array(stamps)) if stamps.len() == 3 => stamps,
            _ => vec![Value::TimeStamp(TimeStamp::UNSPECIFIED); 3],
        };
        stamps[index] = Value::TimeStamp(timestamp);
        initiating.set(PropertyIdentifier::EventTimeStamps, Value::Array(stamps));

        if let Some(Value::TransitionBits(mut acked)) =
            initiating.get(PropertyIdentifier::AckedTransitions)
        {
            acked.set_group(group, false);
            initiating.set(
                PropertyIdentifier::AckedTransitions,
                Value::TransitionBits(acked),
            );
        }

        let message = match initiating.get(PropertyIdentifier::EventMessageTexts) {
            Some(Value::Array(mut texts)) if texts.len() == 3 => {
                let map = template::substitution_map(new_state, timestamp, &parameters);
                let text = match initiating.get(PropertyIdentifier::EventMessageTextsConfig) {
                    Some(Value::Array(configs)) => match configs.get(index) {
                        Some(Value::CharacterString(t)) if !t.is_empty() => {
                            template::render(t, &map)
                        }
                        _ => format!("{new_state} at {timestamp}"),
                    },
                    _ => format!("{new_state} at {timestamp}"),
                };
                texts[index] = Value::CharacterString(text.clone());
                initiating.set(PropertyIdentifier::EventMessageTexts, Value::Array(texts));
                Some(text)
            }
            _ => None,
        };

        // Indicate the transition to the alarm-acknowledgment and
        // event-notification-distribution processes.
        ctx.engine.emit(Notification {
            initiating_object: initiating.id(),
            new_state,
            group,
            timestamp,
            message,
            parameters,
        });
        Ok(())
    }
}

/// Forces the initiating object's event fields back to their initial
/// conditions; used when event detection is disabled.
fn reset_initial_conditions(config: &Rc<Object>) {
    config.set(
        PropertyIdentifier::EventState,
        Value::EventState(EventState::Normal),
    );
    if config.has(PropertyIdentifier::AckedTransitions) {
        config.set(
            PropertyIdentifier::AckedTransitions,
            Value::TransitionBits(EventTransitionBits::ALL),
        );
    }
    if config.has(PropertyIdentifier::EventTimeStamps) {
        config.set(
            PropertyIdentifier::EventTimeStamps,
            Value::Array(vec![Value::TimeStamp(TimeStamp::UNSPECIFIED); 3]),
        );
    }
    if config.has(PropertyIdentifier::EventMessageTexts) {
        config.set(
            PropertyIdentifier::EventMessageTexts,
            Value::Array(vec![Value::CharacterString(String::new()); 3]),
        );
    }
}
