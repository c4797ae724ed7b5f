//! # bacev-engine::prelude
//!
//! A convenience module that re-exports the most commonly used types from
//! the engine and its dependencies. This simplifies imports for code that
//! assembles object graphs and algorithms.

pub use crate::{
    binding::{BindSource, Binding, PropertyChange},
    engine::{AlgorithmCell, EvalCtx, EventEngine},
    event::{
        extended::register_extended, CovCriteria, EventAlgorithm, EventEnrollment,
        EventParameters,
    },
    fault::PropertyReliability,
    store::{MonitorId, Object, ObjectStore},
};

pub use bacev_types::{
    errors::{ConfigError, EventError},
    metrics::*,
    primitives::{
        BitString, EventTransitionBits, LimitEnable, PropertyStates, StatusFlags, Value,
    },
    property::{ObjectId, ObjectType, PropertyIdentifier, PropertyReference},
    state::{EventState, EventStateGroup, EventType, Reliability},
    time::TimeStamp,
};

pub use bacev_api::{
    ChannelSink, CovNewValue, DeliveryError, Notification, NotificationParameters,
    NotificationSink, NullSink, ReliabilityEval,
};
