//! # bacev-engine::event::parameters
//!
//! Typed event parameters for algorithmic reporting. An enrollment
//! descriptor names a monitored property on a foreign object and supplies
//! the literal parameters the algorithm would otherwise read from the
//! monitored object itself.

use crate::store::Object;
use bacev_types::errors::ConfigError;
use bacev_types::primitives::{BitString, StatusFlags, Value};
use bacev_types::property::PropertyReference;
use bacev_types::state::EventType;
use std::rc::Rc;

/// The change-of-value criterion: either a masked bit-string comparison or
/// an absolute increment on a real.
#[derive(Debug, Clone, PartialEq)]
pub enum CovCriteria {
    Bitmask(BitString),
    ReferencedPropertyIncrement(f32),
}

/// Literal event parameters, one variant per supported algorithm. These are
/// the algorithmic-reporting counterpart of the monitored object's own
/// configuration properties.
#[derive(Debug, Clone, PartialEq)]
pub enum EventParameters {
    ChangeOfBitstring {
        time_delay: u32,
        bitmask: BitString,
        list_of_bitstring_values: Vec<BitString>,
    },
    ChangeOfState {
        time_delay: u32,
        list_of_values: Vec<Value>,
    },
    ChangeOfValue {
        time_delay: u32,
        cov_criteria: CovCriteria,
    },
    CommandFailure {
        time_delay: u32,
        feedback_property_reference: PropertyReference,
    },
    FloatingLimit {
        time_delay: u32,
        setpoint_reference: PropertyReference,
        low_diff_limit: Option<f32>,
        high_diff_limit: f32,
        deadband: f32,
    },
    OutOfRange {
        time_delay: u32,
        low_limit: f32,
        high_limit: f32,
        deadband: f32,
    },
    BufferReady {
        notification_threshold: u64,
        previous_notification_count: u64,
    },
    UnsignedRange {
        time_delay: u32,
        low_limit: u64,
        high_limit: u64,
    },
    Extended {
        vendor_id: u16,
        extended_event_type: u32,
        parameters: Vec<Value>,
    },
    ChangeOfStatusFlags {
        time_delay: u32,
        selected_flags: StatusFlags,
    },
    DoubleOutOfRange {
        time_delay: u32,
        low_limit: f64,
        high_limit: f64,
        deadband: f64,
    },
    SignedOutOfRange {
        time_delay: u32,
        low_limit: i64,
        high_limit: i64,
        deadband: u64,
    },
    UnsignedOutOfRange {
        time_delay: u32,
        low_limit: u64,
        high_limit: u64,
        deadband: u64,
    },
    ChangeOfCharacterstring {
        time_delay: u32,
        list_of_alarm_values: Vec<String>,
    },
    None,
    ChangeOfDiscreteValue {
        time_delay: u32,
    },
}

impl EventParameters {
    /// The event type these parameters configure.
    pub fn event_type(&self) -> EventType {
        match self {
            EventParameters::ChangeOfBitstring { .. } => EventType::ChangeOfBitstring,
            EventParameters::ChangeOfState { .. } => EventType::ChangeOfState,
            EventParameters::ChangeOfValue { .. } => EventType::ChangeOfValue,
            EventParameters::CommandFailure { .. } => EventType::CommandFailure,
            EventParameters::FloatingLimit { .. } => EventType::FloatingLimit,
            EventParameters::OutOfRange { .. } => EventType::OutOfRange,
            EventParameters::BufferReady { .. } => EventType::BufferReady,
            EventParameters::UnsignedRange { .. } => EventType::UnsignedRange,
            EventParameters::Extended { .. } => EventType::Extended,
            EventParameters::ChangeOfStatusFlags { .. } => EventType::ChangeOfStatusFlags,
            EventParameters::DoubleOutOfRange { .. } => EventType::DoubleOutOfRange,
            EventParameters::SignedOutOfRange { .. } => EventType::SignedOutOfRange,
            EventParameters::UnsignedOutOfRange { .. } => EventType::UnsignedOutOfRange,
            EventParameters::ChangeOfCharacterstring { .. } => EventType::ChangeOfCharacterstring,
            EventParameters::None => EventType::None,
            EventParameters::ChangeOfDiscreteValue { .. } => EventType::ChangeOfDiscreteValue,
        }
    }

    /// The configured time delay, where the variant carries one.
    pub fn time_delay(&self) -> Option<u32> {
        match self {
            EventParameters::ChangeOfBitstring { time_delay, .. }
            | EventParameters::ChangeOfState { time_delay, .. }
            | EventParameters::ChangeOfValue { time_delay, .. }
            | EventParameters::CommandFailure { time_delay, .. }
            | EventParameters::FloatingLimit { time_delay, .. }
            | EventParameters::OutOfRange { time_delay, .. }
            | EventParameters::UnsignedRange { time_delay, .. }
            | EventParameters::ChangeOfStatusFlags { time_delay, .. }
            | EventParameters::DoubleOutOfRange { time_delay, .. }
            | EventParameters::SignedOutOfRange { time_delay, .. }
            | EventParameters::UnsignedOutOfRange { time_delay, .. }
            | EventParameters::ChangeOfCharacterstring { time_delay, .. }
            | EventParameters::ChangeOfDiscreteValue { time_delay } => Some(*time_delay),
            EventParameters::BufferReady { .. }
            | EventParameters::Extended { .. }
            | EventParameters::None => None,
        }
    }
}

/// Rejects the reference features the core does not support.
pub(crate) fn validate_reference(reference: &PropertyReference) -> Result<(), ConfigError> {
    if reference.array_index.is_some() {
        return Err(ConfigError::ArrayIndexUnsupported);
    }
    if reference.device_id.is_some() {
        return Err(ConfigError::CrossDeviceUnsupported);
    }
    Ok(())
}

/// An enrollment descriptor: the enrollment object itself (which becomes
/// the event-initiating object), the reference naming the monitored
/// property, and the literal event parameters.
pub struct EventEnrollment {
    pub object: Rc<Object>,
    pub object_property_reference: PropertyReference,
    pub parameters: EventParameters,
}

impl EventEnrollment {
    /// Builds a descriptor, rejecting unsupported reference features up
    /// front.
    pub fn new(
        object: Rc<Object>,
        object_property_reference: PropertyReference,
        parameters: EventParameters,
    ) -> Result<Rc<Self>, ConfigError> {
        validate_reference(&object_property_reference)?;
        Ok(Rc::new(Self {
            object,
            object_property_reference,
            parameters,
        }))
    }
}
