//! # bacev-types::property
//!
//! Object and property identifiers. Using dedicated types for the different
//! kinds of identifiers keeps an object id from being confused with the
//! property it names, and gives the error types something precise to print.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The object types the event core knows about. The set is the subset of
/// the standard's object model that can carry intrinsic event reporting or
/// appear as an enrollment, plus the referenced-object kinds that show up
/// in setpoint and feedback references.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectType {
    AnalogInput,
    AnalogOutput,
    AnalogValue,
    BinaryInput,
    BinaryOutput,
    BinaryValue,
    MultiStateInput,
    MultiStateValue,
    IntegerValue,
    PositiveIntegerValue,
    LargeAnalogValue,
    CharacterstringValue,
    BitstringValue,
    Accumulator,
    Loop,
    Device,
    EventEnrollment,
    NotificationClass,
    TrendLog,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectType::AnalogInput => "analog-input",
            ObjectType::AnalogOutput => "analog-output",
            ObjectType::AnalogValue => "analog-value",
            ObjectType::BinaryInput => "binary-input",
            ObjectType::BinaryOutput => "binary-output",
            ObjectType::BinaryValue => "binary-value",
            ObjectType::MultiStateInput => "multi-state-input",
            ObjectType::MultiStateValue => "multi-state-value",
            ObjectType::IntegerValue => "integer-value",
            ObjectType::PositiveIntegerValue => "positive-integer-value",
            ObjectType::LargeAnalogValue => "large-analog-value",
            ObjectType::CharacterstringValue => "characterstring-value",
            ObjectType::BitstringValue => "bitstring-value",
            ObjectType::Accumulator => "accumulator",
            ObjectType::Loop => "loop",
            ObjectType::Device => "device",
            ObjectType::EventEnrollment => "event-enrollment",
            ObjectType::NotificationClass => "notification-class",
            ObjectType::TrendLog => "trend-log",
        };
        f.write_str(name)
    }
}

/// An object identifier: the object type plus an instance number.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId {
    pub object_type: ObjectType,
    pub instance: u32,
}

impl ObjectId {
    pub fn new(object_type: ObjectType, instance: u32) -> Self {
        Self {
            object_type,
            instance,
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.object_type, self.instance)
    }
}

/// The property identifiers the event core reads or writes. Display uses
/// the standard's camel-case spellings so log lines and error messages
/// match what a configuration tool shows.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyIdentifier {
    PresentValue,
    StatusFlags,
    EventState,
    Reliability,
    EventDetectionEnable,
    EventAlgorithmInhibit,
    EventAlgorithmInhibitRef,
    EventTimeStamps,
    EventMessageTexts,
    EventMessageTextsConfig,
    AckedTransitions,
    EventEnable,
    NotificationClass,
    TimeDelay,
    TimeDelayNormal,
    LowLimit,
    HighLimit,
    Deadband,
    LimitEnable,
    AlarmValue,
    AlarmValues,
    BitMask,
    Setpoint,
    SetpointReference,
    LowDiffLimit,
    HighDiffLimit,
    ErrorLimit,
    FeedbackValue,
    RecordCount,
    NotificationThreshold,
    RecordsSinceNotification,
    MemberStatusFlags,
    ObjectName,
}

impl fmt::Display for PropertyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyIdentifier::PresentValue => "presentValue",
            PropertyIdentifier::StatusFlags => "statusFlags",
            PropertyIdentifier::EventState => "eventState",
            PropertyIdentifier::Reliability => "reliability",
            PropertyIdentifier::EventDetectionEnable => "eventDetectionEnable",
            PropertyIdentifier::EventAlgorithmInhibit => "eventAlgorithmInhibit",
            PropertyIdentifier::EventAlgorithmInhibitRef => "eventAlgorithmInhibitRef",
            PropertyIdentifier::EventTimeStamps => "eventTimeStamps",
            PropertyIdentifier::EventMessageTexts => "eventMessageTexts",
            PropertyIdentifier::EventMessageTextsConfig => "eventMessageTextsConfig",
            PropertyIdentifier::AckedTransitions => "ackedTransitions",
            PropertyIdentifier::EventEnable => "eventEnable",
            PropertyIdentifier::NotificationClass => "notificationClass",
            PropertyIdentifier::TimeDelay => "timeDelay",
            PropertyIdentifier::TimeDelayNormal => "timeDelayNormal",
            PropertyIdentifier::LowLimit => "lowLimit",
            PropertyIdentifier::HighLimit => "highLimit",
            PropertyIdentifier::Deadband => "deadband",
            PropertyIdentifier::LimitEnable => "limitEnable",
            PropertyIdentifier::AlarmValue => "alarmValue",
            PropertyIdentifier::AlarmValues => "alarmValues",
            PropertyIdentifier::BitMask => "bitMask",
            PropertyIdentifier::Setpoint => "setpoint",
            PropertyIdentifier::SetpointReference => "setpointReference",
            PropertyIdentifier::LowDiffLimit => "lowDiffLimit",
            PropertyIdentifier::HighDiffLimit => "highDiffLimit",
            PropertyIdentifier::ErrorLimit => "errorLimit",
            PropertyIdentifier::FeedbackValue => "feedbackValue",
            PropertyIdentifier::RecordCount => "recordCount",
            PropertyIdentifier::NotificationThreshold => "notificationThreshold",
            PropertyIdentifier::RecordsSinceNotification => "recordsSinceNotification",
            PropertyIdentifier::MemberStatusFlags => "memberStatusFlags",
            PropertyIdentifier::ObjectName => "objectName",
        };
        f.write_str(name)
    }
}

/// A reference to a property of another object in the same device.
///
/// `array_index` and `device_id` are carried so that configurations using
/// them can be rejected explicitly at construction time; neither indexed
/// properties nor cross-device references are supported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyReference {
    pub object_id: ObjectId,
    pub property: PropertyIdentifier,
    pub array_index: Option<u32>,
    pub device_id: Option<ObjectId>,
}

impl PropertyReference {
    /// A plain same-device, non-indexed reference.
    pub fn new(object_id: ObjectId, property: PropertyIdentifier) -> Self {
        Self {
            object_id,
            property,
            array_index: None,
            device_id: None,
        }
    }
}

impl fmt::Display for PropertyReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.object_id, self.property)
    }
}
