//! # bacev-types::state
//!
//! The event state machine enumerations: the fine-grained `EventState`, its
//! coarse `EventStateGroup` partition, the fault-side `Reliability` output,
//! and the `EventType` selector for the concrete algorithms.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fine-grained event state of a monitored point.
///
/// Every variant belongs to exactly one [`EventStateGroup`]: `Normal` and
/// `Fault` each form a singleton group; everything else is off-normal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventState {
    Normal,
    Fault,
    OffNormal,
    HighLimit,
    LowLimit,
    LifeSafetyAlarm,
}

impl EventState {
    /// Maps the fine state onto its coarse group.
    pub fn group(self) -> EventStateGroup {
        match self {
            EventState::Normal => EventStateGroup::Normal,
            EventState::Fault => EventStateGroup::Fault,
            _ => EventStateGroup::OffNormal,
        }
    }
}

impl fmt::Display for EventState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventState::Normal => "normal",
            EventState::Fault => "fault",
            EventState::OffNormal => "offnormal",
            EventState::HighLimit => "high-limit",
            EventState::LowLimit => "low-limit",
            EventState::LifeSafetyAlarm => "life-safety-alarm",
        };
        f.write_str(name)
    }
}

/// The coarse partition over the event states.
///
/// Declaration order matters: the discriminants index the transition table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventStateGroup {
    Normal,
    OffNormal,
    Fault,
}

impl EventStateGroup {
    /// Index into the three-slot event arrays (timestamps, message texts).
    /// The arrays are ordered to-offnormal, to-fault, to-normal.
    pub fn array_index(self) -> usize {
        match self {
            EventStateGroup::OffNormal => 0,
            EventStateGroup::Fault => 1,
            EventStateGroup::Normal => 2,
        }
    }
}

impl fmt::Display for EventStateGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventStateGroup::Normal => "normal",
            EventStateGroup::OffNormal => "offnormal",
            EventStateGroup::Fault => "fault",
        };
        f.write_str(name)
    }
}

/// The output of a fault algorithm. Only `NoFaultDetected` is healthy;
/// any other variant forces the monitored point into the Fault group.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Reliability {
    NoFaultDetected,
    NoSensor,
    OverRange,
    UnderRange,
    OpenLoop,
    ShortedLoop,
    NoOutput,
    UnreliableOther,
    ProcessError,
    MultiStateFault,
    ConfigurationError,
    CommunicationFailure,
    MemberFault,
    MonitoredObjectFault,
    Tripped,
}

impl Reliability {
    pub fn is_no_fault(self) -> bool {
        self == Reliability::NoFaultDetected
    }
}

impl fmt::Display for Reliability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reliability::NoFaultDetected => "no-fault-detected",
            Reliability::NoSensor => "no-sensor",
            Reliability::OverRange => "over-range",
            Reliability::UnderRange => "under-range",
            Reliability::OpenLoop => "open-loop",
            Reliability::ShortedLoop => "shorted-loop",
            Reliability::NoOutput => "no-output",
            Reliability::UnreliableOther => "unreliable-other",
            Reliability::ProcessError => "process-error",
            Reliability::MultiStateFault => "multi-state-fault",
            Reliability::ConfigurationError => "configuration-error",
            Reliability::CommunicationFailure => "communication-failure",
            Reliability::MemberFault => "member-fault",
            Reliability::MonitoredObjectFault => "monitored-object-fault",
            Reliability::Tripped => "tripped",
        };
        f.write_str(name)
    }
}

/// The standard event-type enumeration, used to select a concrete event
/// algorithm. The discriminants match the standard's numbering so that
/// enrollment configuration and the vendor-extension registry agree on
/// the values.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    ChangeOfBitstring = 0,
    ChangeOfState = 1,
    ChangeOfValue = 2,
    CommandFailure = 3,
    FloatingLimit = 4,
    OutOfRange = 5,
    ChangeOfLifeSafety = 8,
    Extended = 9,
    BufferReady = 10,
    UnsignedRange = 11,
    AccessEvent = 13,
    DoubleOutOfRange = 14,
    SignedOutOfRange = 15,
    UnsignedOutOfRange = 16,
    ChangeOfCharacterstring = 17,
    ChangeOfStatusFlags = 18,
    None = 20,
    ChangeOfDiscreteValue = 21,
    ChangeOfTimer = 22,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventType::ChangeOfBitstring => "change-of-bitstring",
            EventType::ChangeOfState => "change-of-state",
            EventType::ChangeOfValue => "change-of-value",
            EventType::CommandFailure => "command-failure",
            EventType::FloatingLimit => "floating-limit",
            EventType::OutOfRange => "out-of-range",
            EventType::ChangeOfLifeSafety => "change-of-life-safety",
            EventType::Extended => "extended",
            EventType::BufferReady => "buffer-ready",
            EventType::UnsignedRange => "unsigned-range",
            EventType::AccessEvent => "access-event",
            EventType::DoubleOutOfRange => "double-out-of-range",
            EventType::SignedOutOfRange => "signed-out-of-range",
            EventType::UnsignedOutOfRange => "unsigned-out-of-range",
            EventType::ChangeOfCharacterstring => "change-of-characterstring",
            EventType::ChangeOfStatusFlags => "change-of-status-flags",
            EventType::None => "none",
            EventType::ChangeOfDiscreteValue => "change-of-discrete-value",
            EventType::ChangeOfTimer => "change-of-timer",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_partition() {
        assert_eq!(EventState::Normal.group(), EventStateGroup::Normal);
        assert_eq!(EventState::Fault.group(), EventStateGroup::Fault);
        assert_eq!(EventState::OffNormal.group(), EventStateGroup::OffNormal);
        assert_eq!(EventState::HighLimit.group(), EventStateGroup::OffNormal);
        assert_eq!(EventState::LowLimit.group(), EventStateGroup::OffNormal);
        assert_eq!(EventState::LifeSafetyAlarm.group(), EventStateGroup::OffNormal);
    }

    #[test]
    fn array_index_order() {
        assert_eq!(EventStateGroup::OffNormal.array_index(), 0);
        assert_eq!(EventStateGroup::Fault.array_index(), 1);
        assert_eq!(EventStateGroup::Normal.array_index(), 2);
    }
}
