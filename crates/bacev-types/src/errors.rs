//! # bacev-types::errors
//!
//! Defines the common error types used throughout the bacev workspace.
//! Using `thiserror` provides clean, descriptive error handling. The split
//! follows the failure policy: `ConfigError` is fatal at construction or
//! bind time and indicates a misbuilt object graph; `EventError` is fatal
//! during an evaluation and is surfaced by the scheduler.

use crate::property::{ObjectId, PropertyIdentifier};
use crate::state::{EventStateGroup, EventType};
use thiserror::Error;

/// A configuration error raised while assembling or binding an algorithm.
/// These are never recovered locally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("object {0} not found")]
    ObjectNotFound(ObjectId),
    #[error("object {object} has no {property} property")]
    NoSuchProperty {
        object: ObjectId,
        property: PropertyIdentifier,
    },
    #[error("property {property} holds {found}, expected {expected}")]
    TypeMismatch {
        property: PropertyIdentifier,
        expected: &'static str,
        found: &'static str,
    },
    #[error("literal for {name} is {found}, expected {expected}")]
    LiteralMismatch {
        name: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    #[error("eventAlgorithmInhibitRef requires an eventAlgorithmInhibit property")]
    InhibitRefWithoutInhibit,
    #[error("event type {0} is not supported")]
    UnsupportedEventType(EventType),
    #[error("array-indexed property references are not supported")]
    ArrayIndexUnsupported,
    #[error("cross-device property references are not supported")]
    CrossDeviceUnsupported,
    #[error("event type {0} requires algorithmic reporting")]
    AlgorithmicOnly(EventType),
    #[error("event parameters are for {found}, expected {expected}")]
    ParameterKindMismatch {
        expected: EventType,
        found: EventType,
    },
}

/// An error raised while an algorithm evaluates. The owning evaluation is
/// abandoned; the scheduler reports the error and the state machine stays
/// where it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("no transition handler from {from} to {to}")]
    NoTransitionHandler {
        from: EventStateGroup,
        to: EventStateGroup,
    },
    #[error("no discrete state tag for a {0} value")]
    StateTagUnresolved(&'static str),
    #[error("parameter {name} read back as {found}, expected {expected}")]
    ParameterType {
        name: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}
