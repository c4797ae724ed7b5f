//! # bacev-engine::event::range
//!
//! The limit/deadband family of evaluators: out-of-range over real,
//! double, signed, and unsigned values, the deadband-free unsigned range,
//! and the floating limit whose bounds derive from a live setpoint. The
//! clause ladder is shared; the variants differ in numeric kind and in the
//! notification payload they build.

use crate::binding::{BindSource, Binding, FromValue, ParameterSet};
use crate::event::parameters::{validate_reference, EventEnrollment, EventParameters};
use crate::event::{monitored_value_source, Proposal};
use crate::store::{Object, ObjectStore};
use bacev_api::NotificationParameters;
use bacev_types::errors::{ConfigError, EventError};
use bacev_types::primitives::{LimitEnable, StatusFlags, Value};
use bacev_types::property::PropertyIdentifier;
use bacev_types::state::{EventState, EventType};
use std::rc::Rc;

/// Numeric behaviour the clause ladder needs from a limit kind.
pub(crate) trait LimitValue: FromValue + Copy + PartialOrd {
    const ZERO: Self;

    /// NaN guard; NaN values take part in no comparison and no transition.
    fn comparable(self) -> bool {
        true
    }

    /// `high - deadband` for the hysteretic return from the high limit.
    fn high_minus_deadband(high: Self, deadband: Self) -> Self;

    /// `low + deadband` for the hysteretic return from the low limit.
    fn low_plus_deadband(low: Self, deadband: Self) -> Self;

    fn to_value(self) -> Value;
}

impl LimitValue for f32 {
    const ZERO: f32 = 0.0;
    fn comparable(self) -> bool {
        !self.is_nan()
    }
    fn high_minus_deadband(high: Self, deadband: Self) -> Self {
        high - deadband
    }
    fn low_plus_deadband(low: Self, deadband: Self) -> Self {
        low + deadband
    }
    fn to_value(self) -> Value {
        Value::Real(self)
    }
}

impl LimitValue for f64 {
    const ZERO: f64 = 0.0;
    fn comparable(self) -> bool {
        !self.is_nan()
    }
    fn high_minus_deadband(high: Self, deadband: Self) -> Self {
        high - deadband
    }
    fn low_plus_deadband(low: Self, deadband: Self) -> Self {
        low + deadband
    }
    fn to_value(self) -> Value {
        Value::Double(self)
    }
}

impl LimitValue for i64 {
    const ZERO: i64 = 0;
    fn high_minus_deadband(high: Self, deadband: Self) -> Self {
        high.saturating_sub(deadband)
    }
    fn low_plus_deadband(low: Self, deadband: Self) -> Self {
        low.saturating_add(deadband)
    }
    fn to_value(self) -> Value {
        Value::Integer(self)
    }
}

impl LimitValue for u64 {
    const ZERO: u64 = 0;
    // The hysteresis term saturates to zero when the deadband exceeds the
    // limit.
    fn high_minus_deadband(high: Self, deadband: Self) -> Self {
        high.saturating_sub(deadband)
    }
    fn low_plus_deadband(low: Self, deadband: Self) -> Self {
        low.saturating_add(deadband)
    }
    fn to_value(self) -> Value {
        Value::Unsigned(self)
    }
}

/// The shared clause ladder. First matching clause wins; the ordering
/// encodes priority. Returns the proposed state and the limit whose
/// crossing (or release) justified it.
pub(crate) fn range_decision<T: LimitValue>(
    current: EventState,
    v: T,
    low: T,
    high: T,
    deadband: T,
    le: LimitEnable,
) -> Option<(EventState, T)> {
    if !v.comparable() || !low.comparable() || !high.comparable() {
        return None;
    }
    match current {
        // (a)
        EventState::Normal if le.high_limit_enable && v > high => {
            Some((EventState::HighLimit, high))
        }
        // (b)
        EventState::Normal if le.low_limit_enable && v < low => Some((EventState::LowLimit, low)),
        // (c)
        EventState::HighLimit if !le.high_limit_enable => Some((EventState::Normal, high)),
        // (d) direct cross-over
        EventState::HighLimit if le.low_limit_enable && v < low => {
            Some((EventState::LowLimit, low))
        }
        // (e) hysteresis
        EventState::HighLimit if v < T::high_minus_deadband(high, deadband) => {
            Some((EventState::Normal, high))
        }
        // (f)
        EventState::LowLimit if !le.low_limit_enable => Some((EventState::Normal, low)),
        // (g) direct cross-over
        EventState::LowLimit if le.high_limit_enable && v > high => {
            Some((EventState::HighLimit, high))
        }
        // (h) hysteresis
        EventState::LowLimit if v > T::low_plus_deadband(low, deadband) => {
            Some((EventState::Normal, low))
        }
        _ => None,
    }
}

type NotifyFn<T> = fn(T, StatusFlags, T, T) -> NotificationParameters;

/// Parameters shared by the out-of-range family. `deadband` is absent for
/// the deadband-free unsigned range; `limit_enable` is only bound on the
/// intrinsic path and defaults to both directions enabled.
pub(crate) struct RangeParams<T: LimitValue> {
    monitored_value: Binding<T>,
    low_limit: Binding<T>,
    high_limit: Binding<T>,
    deadband: Option<Binding<T>>,
    limit_enable: Option<Binding<LimitEnable>>,
    notify: NotifyFn<T>,
}

impl<T: LimitValue> RangeParams<T> {
    fn bind(
        monitored_value: Binding<T>,
        literals: Option<(T, T, Option<T>)>,
        monitored: &Rc<Object>,
        notify: NotifyFn<T>,
    ) -> Result<Self, ConfigError> {
        match literals {
            Some((low, high, deadband)) => Ok(Self {
                monitored_value,
                low_limit: Binding::resolve("low_limit", BindSource::literal(low.to_value()))?,
                high_limit: Binding::resolve("high_limit", BindSource::literal(high.to_value()))?,
                deadband: Binding::resolve_opt(
                    "deadband",
                    deadband.map(|d| BindSource::literal(d.to_value())),
                )?,
                limit_enable: None,
                notify,
            }),
            None => Ok(Self {
                monitored_value,
                low_limit: Binding::resolve(
                    "low_limit",
                    BindSource::property(monitored, PropertyIdentifier::LowLimit),
                )?,
                high_limit: Binding::resolve(
                    "high_limit",
                    BindSource::property(monitored, PropertyIdentifier::HighLimit),
                )?,
                deadband: Binding::resolve_opt(
                    "deadband",
                    monitored
                        .has(PropertyIdentifier::Deadband)
                        .then(|| BindSource::property(monitored, PropertyIdentifier::Deadband)),
                )?,
                limit_enable: Binding::resolve_opt(
                    "limit_enable",
                    monitored
                        .has(PropertyIdentifier::LimitEnable)
                        .then(|| BindSource::property(monitored, PropertyIdentifier::LimitEnable)),
                )?,
                notify,
            }),
        }
    }

    fn deadband(&self) -> T {
        self.deadband
            .as_ref()
            .and_then(Binding::value)
            .unwrap_or(T::ZERO)
    }

    fn limit_enable(&self) -> LimitEnable {
        self.limit_enable
            .as_ref()
            .and_then(Binding::value)
            .unwrap_or_default()
    }

    pub(crate) fn evaluate(
        &mut self,
        current: EventState,
        status_flags: StatusFlags,
    ) -> Result<Option<Proposal>, EventError> {
        let Some(v) = self.monitored_value.value() else {
            return Ok(None);
        };
        let (Some(low), Some(high)) = (self.low_limit.value(), self.high_limit.value()) else {
            return Ok(None);
        };
        let deadband = self.deadband();
        let decision = range_decision(current, v, low, high, deadband, self.limit_enable());
        Ok(decision.map(|(new_state, limit)| Proposal {
            new_state,
            parameters: (self.notify)(v, status_flags, deadband, limit),
        }))
    }

    /// Payload for a transition the interlocks force (inhibit release),
    /// picking the limit by the state being left.
    pub(crate) fn release_parameters(
        &self,
        current: EventState,
        status_flags: StatusFlags,
    ) -> NotificationParameters {
        let v = self.monitored_value.value().unwrap_or(T::ZERO);
        let limit = match current {
            EventState::LowLimit => self.low_limit.value().unwrap_or(T::ZERO),
            _ => self.high_limit.value().unwrap_or(T::ZERO),
        };
        (self.notify)(v, status_flags, self.deadband(), limit)
    }
}

impl<T: LimitValue> ParameterSet for RangeParams<T> {
    fn visit_sources(&self, visit: &mut dyn FnMut(&'static str, &BindSource)) {
        visit(self.monitored_value.name(), self.monitored_value.source());
        visit(self.low_limit.name(), self.low_limit.source());
        visit(self.high_limit.name(), self.high_limit.source());
        if let Some(b) = &self.deadband {
            visit(b.name(), b.source());
        }
        if let Some(b) = &self.limit_enable {
            visit(b.name(), b.source());
        }
    }
}

impl RangeParams<f32> {
    pub(crate) fn bind_out_of_range(
        monitoring: Option<&EventEnrollment>,
        monitored: &Rc<Object>,
    ) -> Result<Self, ConfigError> {
        let monitored_value =
            Binding::resolve("monitored_value", monitored_value_source(monitoring, monitored))?;
        let literals = match monitoring.map(|e| &e.parameters) {
            Some(EventParameters::OutOfRange {
                low_limit,
                high_limit,
                deadband,
                ..
            }) => Some((*low_limit, *high_limit, Some(*deadband))),
            Some(other) => {
                return Err(ConfigError::ParameterKindMismatch {
                    expected: EventType::OutOfRange,
                    found: other.event_type(),
                })
            }
            None => None,
        };
        Self::bind(monitored_value, literals, monitored, |v, sf, db, lim| {
            NotificationParameters::OutOfRange {
                exceeding_value: v,
                status_flags: sf,
                deadband: db,
                exceeded_limit: lim,
            }
        })
    }
}

impl RangeParams<f64> {
    pub(crate) fn bind_double_out_of_range(
        monitoring: Option<&EventEnrollment>,
        monitored: &Rc<Object>,
    ) -> Result<Self, ConfigError> {
        let monitored_value =
            Binding::resolve("monitored_value", monitored_value_source(monitoring, monitored))?;
        let literals = match monitoring.map(|e| &e.parameters) {
            Some(EventParameters::DoubleOutOfRange {
                low_limit,
                high_limit,
                deadband,
                ..
            }) => Some((*low_limit, *high_limit, Some(*deadband))),
            Some(other) => {
                return Err(ConfigError::ParameterKindMismatch {
                    expected: EventType::DoubleOutOfRange,
                    found: other.event_type(),
                })
            }
            None => None,
        };
        Self::bind(monitored_value, literals, monitored, |v, sf, db, lim| {
            NotificationParameters::DoubleOutOfRange {
                exceeding_value: v,
                status_flags: sf,
                deadband: db,
                exceeded_limit: lim,
            }
        })
    }
}

impl RangeParams<i64> {
    pub(crate) fn bind_signed_out_of_range(
        monitoring: Option<&EventEnrollment>,
        monitored: &Rc<Object>,
    ) -> Result<Self, ConfigError> {
        let monitored_value =
            Binding::resolve("monitored_value", monitored_value_source(monitoring, monitored))?;
        let literals = match monitoring.map(|e| &e.parameters) {
            Some(EventParameters::SignedOutOfRange {
                low_limit,
                high_limit,
                deadband,
                ..
            }) => {
                let deadband = i64::try_from(*deadband).unwrap_or(i64::MAX);
                Some((*low_limit, *high_limit, Some(deadband)))
            }
            Some(other) => {
                return Err(ConfigError::ParameterKindMismatch {
                    expected: EventType::SignedOutOfRange,
                    found: other.event_type(),
                })
            }
            None => None,
        };
        Self::bind(monitored_value, literals, monitored, |v, sf, db, lim| {
            NotificationParameters::SignedOutOfRange {
                exceeding_value: v,
                status_flags: sf,
                deadband: u64::try_from(db).unwrap_or(0),
                exceeded_limit: lim,
            }
        })
    }
}

impl RangeParams<u64> {
    pub(crate) fn bind_unsigned_out_of_range(
        monitoring: Option<&EventEnrollment>,
        monitored: &Rc<Object>,
    ) -> Result<Self, ConfigError> {
        let monitored_value =
            Binding::resolve("monitored_value", monitored_value_source(monitoring, monitored))?;
        let literals = match monitoring.map(|e| &e.parameters) {
            Some(EventParameters::UnsignedOutOfRange {
                low_limit,
                high_limit,
                deadband,
                ..
            }) => Some((*low_limit, *high_limit, Some(*deadband))),
            Some(other) => {
                return Err(ConfigError::ParameterKindMismatch {
                    expected: EventType::UnsignedOutOfRange,
                    found: other.event_type(),
                })
            }
            None => None,
        };
        Self::bind(monitored_value, literals, monitored, |v, sf, db, lim| {
            NotificationParameters::UnsignedOutOfRange {
                exceeding_value: v,
                status_flags: sf,
                deadband: db,
                exceeded_limit: lim,
            }
        })
    }

    /// The deadband-free unsigned range of clause 13.3.9.
    pub(crate) fn bind_unsigned_range(
        monitoring: Option<&EventEnrollment>,
        monitored: &Rc<Object>,
    ) -> Result<Self, ConfigError> {
        let monitored_value =
            Binding::resolve("monitored_value", monitored_value_source(monitoring, monitored))?;
        let literals = match monitoring.map(|e| &e.parameters) {
            Some(EventParameters::UnsignedRange {
                low_limit,
                high_limit,
                ..
            }) => Some((*low_limit, *high_limit, None)),
            Some(other) => {
                return Err(ConfigError::ParameterKindMismatch {
                    expected: EventType::UnsignedRange,
                    found: other.event_type(),
                })
            }
            None => None,
        };
        let mut params = Self::bind(monitored_value, literals, monitored, |v, sf, _db, lim| {
            NotificationParameters::UnsignedRange {
                exceeding_value: v,
                status_flags: sf,
                exceeded_limit: lim,
            }
        })?;
        // no deadband on the intrinsic path either
        params.deadband = None;
        Ok(params)
    }
}

/// Floating limit: the effective bounds derive from a setpoint plus the
/// configured differential limits; the ladder is then the same as
/// out-of-range. If the low differential is absent, the high differential
/// is used symmetrically.
pub(crate) struct FloatingLimitParams {
    monitored_value: Binding<f32>,
    setpoint: Binding<f32>,
    low_diff_limit: Option<Binding<f32>>,
    high_diff_limit: Binding<f32>,
    deadband: Option<Binding<f32>>,
    limit_enable: Option<Binding<LimitEnable>>,
}

impl FloatingLimitParams {
    pub(crate) fn bind(
        monitoring: Option<&EventEnrollment>,
        monitored: &Rc<Object>,
        store: &ObjectStore,
    ) -> Result<Self, ConfigError> {
        let monitored_value =
            Binding::resolve("monitored_value", monitored_value_source(monitoring, monitored))?;
        match monitoring.map(|e| &e.parameters) {
            Some(EventParameters::FloatingLimit {
                setpoint_reference,
                low_diff_limit,
                high_diff_limit,
                deadband,
                ..
            }) => {
                validate_reference(setpoint_reference)?;
                let setpoint_object = store
                    .get(setpoint_reference.object_id)
                    .ok_or(ConfigError::ObjectNotFound(setpoint_reference.object_id))?;
                Ok(Self {
                    monitored_value,
                    setpoint: Binding::resolve(
                        "setpoint",
                        BindSource::property(&setpoint_object, setpoint_reference.property),
                    )?,
                    low_diff_limit: Binding::resolve_opt(
                        "low_diff_limit",
                        low_diff_limit.map(|d| BindSource::literal(Value::Real(d))),
                    )?,
                    high_diff_limit: Binding::resolve(
                        "high_diff_limit",
                        BindSource::literal(Value::Real(*high_diff_limit)),
                    )?,
                    deadband: Some(Binding::resolve(
                        "deadband",
                        BindSource::literal(Value::Real(*deadband)),
                    )?),
                    limit_enable: None,
                })
            }
            Some(other) => Err(ConfigError::ParameterKindMismatch {
                expected: EventType::FloatingLimit,
                found: other.event_type(),
            }),
            None => {
                // A setpointReference property redirects the setpoint to a
                // property of another object; otherwise the monitored
                // object's own setpoint is used.
                let setpoint = match monitored.get(PropertyIdentifier::SetpointReference) {
                    Some(Value::PropertyRef(reference)) => {
                        validate_reference(&reference)?;
                        let setpoint_object = store
                            .get(reference.object_id)
                            .ok_or(ConfigError::ObjectNotFound(reference.object_id))?;
                        BindSource::property(&setpoint_object, reference.property)
                    }
                    _ => BindSource::property(monitored, PropertyIdentifier::Setpoint),
                };
                let high_diff_source = if monitored.has(PropertyIdentifier::HighDiffLimit) {
                    BindSource::property(monitored, PropertyIdentifier::HighDiffLimit)
                } else {
                    BindSource::property(monitored, PropertyIdentifier::ErrorLimit)
                };
                Ok(Self {
                    monitored_value,
                    setpoint: Binding::resolve("setpoint", setpoint)?,
                    low_diff_limit: Binding::resolve_opt(
                        "low_diff_limit",
                        monitored.has(PropertyIdentifier::LowDiffLimit).then(|| {
                            BindSource::property(monitored, PropertyIdentifier::LowDiffLimit)
                        }),
                    )?,
                    high_diff_limit: Binding::resolve("high_diff_limit", high_diff_source)?,
                    deadband: Binding::resolve_opt(
                        "deadband",
                        monitored
                            .has(PropertyIdentifier::Deadband)
                            .then(|| BindSource::property(monitored, PropertyIdentifier::Deadband)),
                    )?,
                    limit_enable: Binding::resolve_opt(
                        "limit_enable",
                        monitored.has(PropertyIdentifier::LimitEnable).then(|| {
                            BindSource::property(monitored, PropertyIdentifier::LimitEnable)
                        }),
                    )?,
                })
            }
        }
    }

    fn limits(&self) -> Option<(f32, f32, f32)> {
        let setpoint = self.setpoint.value()?;
        let high_diff = self.high_diff_limit.value()?;
        let low_diff = self
            .low_diff_limit
            .as_ref()
            .and_then(Binding::value)
            .unwrap_or(high_diff);
        Some((setpoint, setpoint - low_diff.abs(), setpoint + high_diff))
    }

    pub(crate) fn evaluate(
        &mut self,
        current: EventState,
        status_flags: StatusFlags,
    ) -> Result<Option<Proposal>, EventError> {
        let Some(v) = self.monitored_value.value() else {
            return Ok(None);
        };
        let Some((setpoint, low, high)) = self.limits() else {
            return Ok(None);
        };
        let deadband = self
            .deadband
            .as_ref()
            .and_then(Binding::value)
            .unwrap_or(0.0);
        let le = self
            .limit_enable
            .as_ref()
            .and_then(Binding::value)
            .unwrap_or_default();
        let decision = range_decision(current, v, low, high, deadband, le);
        Ok(decision.map(|(new_state, limit)| Proposal {
            new_state,
            parameters: NotificationParameters::FloatingLimit {
                reference_value: v,
                status_flags,
                setpoint_value: setpoint,
                error_limit: limit,
            },
        }))
    }

    pub(crate) fn release_parameters(
        &self,
        current: EventState,
        status_flags: StatusFlags,
    ) -> NotificationParameters {
        let v = self.monitored_value.value().unwrap_or(0.0);
        let (setpoint, low, high) = self.limits().unwrap_or((0.0, 0.0, 0.0));
        let limit = match current {
            EventState::LowLimit => low,
            _ => high,
        };
        NotificationParameters::FloatingLimit {
            reference_value: v,
            status_flags,
            setpoint_value: setpoint,
            error_limit: limit,
        }
    }
}

impl ParameterSet for FloatingLimitParams {
    fn visit_sources(&self, visit: &mut dyn FnMut(&'static str, &BindSource)) {
        visit(self.monitored_value.name(), self.monitored_value.source());
        visit(self.setpoint.name(), self.setpoint.source());
        visit(self.high_diff_limit.name(), self.high_diff_limit.source());
        if let Some(b) = &self.low_diff_limit {
            visit(b.name(), b.source());
        }
        if let Some(b) = &self.deadband {
            visit(b.name(), b.source());
        }
        if let Some(b) = &self.limit_enable {
            visit(b.name(), b.source());
        }
    }
}
