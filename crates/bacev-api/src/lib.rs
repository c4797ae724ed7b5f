//! # bacev-api
//!
//! The collaborator boundary of the event core. This crate defines the
//! interfaces the engine requires from its neighbours (the downstream
//! notification-distribution process and companion fault algorithms)
//! together with the notification payload types both sides agree upon.
//! Keeping the boundary in its own crate lets a distribution stack depend
//! on the payloads without pulling in the engine.

#![forbid(unsafe_code)]

pub mod fault;
pub mod params;
pub mod sink;

pub use fault::ReliabilityEval;
pub use params::{CovNewValue, NotificationParameters};
pub use sink::{ChannelSink, DeliveryError, Notification, NotificationSink, NullSink};
