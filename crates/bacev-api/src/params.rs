//! # bacev-api::params
//!
//! The notification payloads, one variant per event algorithm. These carry
//! the observations that justified a transition; wire encoding is the
//! distribution collaborator's responsibility.

use bacev_types::primitives::{BitString, PropertyStates, StatusFlags, Value};
use bacev_types::property::ObjectId;
use bacev_types::state::Reliability;
use serde::{Deserialize, Serialize};

/// The changed quantity reported by a change-of-value algorithm: either the
/// monitored bit string or the monitored real, depending on the configured
/// criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CovNewValue {
    ChangedBits(BitString),
    ChangedValue(f32),
}

/// Per-algorithm notification parameters attached to every transition.
///
/// `ChangeOfReliability` is shared by all algorithms: it rides on every
/// transition into, out of, or within the Fault group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationParameters {
    ChangeOfBitstring {
        referenced_bitstring: BitString,
        status_flags: StatusFlags,
    },
    ChangeOfState {
        new_state: PropertyStates,
        status_flags: StatusFlags,
    },
    ChangeOfValue {
        new_value: CovNewValue,
        status_flags: StatusFlags,
    },
    CommandFailure {
        command_value: Value,
        status_flags: StatusFlags,
        feedback_value: Value,
    },
    FloatingLimit {
        reference_value: f32,
        status_flags: StatusFlags,
        setpoint_value: f32,
        error_limit: f32,
    },
    OutOfRange {
        exceeding_value: f32,
        status_flags: StatusFlags,
        deadband: f32,
        exceeded_limit: f32,
    },
    Extended {
        vendor_id: u16,
        extended_event_type: u32,
        parameters: Vec<Value>,
    },
    BufferReady {
        buffer_object: ObjectId,
        previous_notification: u64,
        current_notification: u64,
    },
    UnsignedRange {
        exceeding_value: u64,
        status_flags: StatusFlags,
        exceeded_limit: u64,
    },
    ChangeOfStatusFlags {
        present_value: Option<Value>,
        referenced_flags: StatusFlags,
    },
    DoubleOutOfRange {
        exceeding_value: f64,
        status_flags: StatusFlags,
        deadband: f64,
        exceeded_limit: f64,
    },
    SignedOutOfRange {
        exceeding_value: i64,
        status_flags: StatusFlags,
        deadband: u64,
        exceeded_limit: i64,
    },
    UnsignedOutOfRange {
        exceeding_value: u64,
        status_flags: StatusFlags,
        deadband: u64,
        exceeded_limit: u64,
    },
    ChangeOfCharacterstring {
        changed_value: String,
        status_flags: StatusFlags,
        alarm_value: String,
    },
    ChangeOfDiscreteValue {
        new_value: Value,
        status_flags: StatusFlags,
    },
    ChangeOfReliability {
        reliability: Reliability,
        status_flags: StatusFlags,
    },
}

impl NotificationParameters {
    /// A stable name for the payload variant, used as a metric label.
    pub fn variant_name(&self) -> &'static str {
        match self {
            NotificationParameters::ChangeOfBitstring { .. } => "change-of-bitstring",
            NotificationParameters::ChangeOfState { .. } => "change-of-state",
            NotificationParameters::ChangeOfValue { .. } => "change-of-value",
            NotificationParameters::CommandFailure { .. } => "command-failure",
            NotificationParameters::FloatingLimit { .. } => "floating-limit",
            NotificationParameters::OutOfRange { .. } => "out-of-range",
            NotificationParameters::Extended { .. } => "extended",
            NotificationParameters::BufferReady { .. } => "buffer-ready",
            NotificationParameters::UnsignedRange { .. } => "unsigned-range",
            NotificationParameters::ChangeOfStatusFlags { .. } => "change-of-status-flags",
            NotificationParameters::DoubleOutOfRange { .. } => "double-out-of-range",
            NotificationParameters::SignedOutOfRange { .. } => "signed-out-of-range",
            NotificationParameters::UnsignedOutOfRange { .. } => "unsigned-out-of-range",
            NotificationParameters::ChangeOfCharacterstring { .. } => "change-of-characterstring",
            NotificationParameters::ChangeOfDiscreteValue { .. } => "change-of-discrete-value",
            NotificationParameters::ChangeOfReliability { .. } => "change-of-reliability",
        }
    }
}
