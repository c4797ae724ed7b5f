//! # bacev-types::metrics
//!
//! Defines constants for metric names and labels.
//! Centralizing these constants prevents typos and ensures consistency
//! between the engine (where metrics are emitted) and external consumers.

// --- Metric Names ---
pub const MET_EVALUATIONS: &str = "bacev_evaluations_total";
pub const MET_EVALUATION_ERRORS: &str = "bacev_evaluation_errors_total";
pub const MET_TRANSITIONS: &str = "bacev_transitions_total";
pub const MET_NOTIFICATIONS_SENT: &str = "bacev_notifications_sent_total";
pub const MET_NOTIFICATIONS_FAILED: &str = "bacev_notifications_failed_total";

// --- Label Keys ---
pub const LBL_OBJECT: &str = "object";
pub const LBL_GROUP: &str = "group";
pub const LBL_STATE: &str = "state";
pub const LBL_EVENT_TYPE: &str = "event_type";
