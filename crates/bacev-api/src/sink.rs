//! # bacev-api::sink
//!
//! The hand-off point between the event core and the downstream
//! alarm-acknowledgment and notification-distribution processes. The core
//! commits the transition to the initiating object first and then calls
//! `deliver`; a failing sink is reported, never retried.

use crate::params::NotificationParameters;
use bacev_types::property::ObjectId;
use bacev_types::state::{EventState, EventStateGroup};
use bacev_types::time::TimeStamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A completed event transition.
///
/// By the time a sink sees this, the initiating object's `eventState` and
/// the matching `eventTimeStamps` slot have already been written, so
/// observers of the object always see a snapshot consistent with the
/// notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub initiating_object: ObjectId,
    pub new_state: EventState,
    pub group: EventStateGroup,
    pub timestamp: TimeStamp,
    /// The rendered message text, when the initiating object carries an
    /// `eventMessageTexts` array.
    pub message: Option<String>,
    pub parameters: NotificationParameters,
}

/// Raised when the downstream sink cannot accept a notification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("notification channel is full")]
    ChannelFull,
    #[error("notification channel is disconnected")]
    Disconnected,
    #[error("sink rejected the notification: {0}")]
    Rejected(String),
}

/// The downstream distribution boundary.
///
/// `deliver` runs while the scheduler's re-entrancy guard is down, so
/// implementations must not read back into the parameter store through
/// bindings; everything they need is in the `Notification`.
pub trait NotificationSink {
    fn deliver(&self, notification: Notification) -> Result<(), DeliveryError>;
}

/// A sink backed by a bounded channel. `deliver` never blocks the
/// executor: a full channel is an error the engine reports and drops.
pub struct ChannelSink {
    tx: crossbeam_channel::Sender<Notification>,
}

impl ChannelSink {
    /// Creates a sink and its receiving half with the given capacity.
    pub fn bounded(capacity: usize) -> (Self, crossbeam_channel::Receiver<Notification>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn deliver(&self, notification: Notification) -> Result<(), DeliveryError> {
        self.tx.try_send(notification).map_err(|e| match e {
            crossbeam_channel::TrySendError::Full(_) => DeliveryError::ChannelFull,
            crossbeam_channel::TrySendError::Disconnected(_) => DeliveryError::Disconnected,
        })
    }
}

/// A sink that discards every notification. Useful when only the state
/// machine side effects are wanted.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn deliver(&self, _notification: Notification) -> Result<(), DeliveryError> {
        Ok(())
    }
}
