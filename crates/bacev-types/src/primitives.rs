//! # bacev-types::primitives
//!
//! The atomic property values: the `Value` sum type that property cells
//! hold, plus the small composite types that ride inside it (bit strings,
//! status flags, limit enables, transition bits) and the discrete-state
//! tagging used by change-of-state notifications.

use crate::errors::EventError;
use crate::property::PropertyReference;
use crate::state::{EventState, EventStateGroup, Reliability};
use crate::time::TimeStamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A bit string of arbitrary length. Bits beyond the stored length read as
/// zero, which matches how masked comparisons treat short operands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitString(Vec<bool>);

impl BitString {
    pub fn new(bits: Vec<bool>) -> Self {
        Self(bits)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reads one bit; out-of-range positions are zero.
    pub fn bit(&self, index: usize) -> bool {
        self.0.get(index).copied().unwrap_or(false)
    }

    /// Bitwise AND against a mask, keeping this string's length.
    pub fn masked(&self, mask: &BitString) -> BitString {
        BitString(
            self.0
                .iter()
                .enumerate()
                .map(|(i, b)| *b && mask.bit(i))
                .collect(),
        )
    }

    /// True if any bit is set.
    pub fn any_set(&self) -> bool {
        self.0.iter().any(|b| *b)
    }

    /// True if any position is set in both strings.
    pub fn intersects(&self, other: &BitString) -> bool {
        self.0.iter().enumerate().any(|(i, b)| *b && other.bit(i))
    }

    /// True if any bit inside `mask` differs between `self` and `other`.
    pub fn changed_within(&self, other: &BitString, mask: &BitString) -> bool {
        let len = self.len().max(other.len());
        (0..len).any(|i| mask.bit(i) && self.bit(i) != other.bit(i))
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            f.write_str(if *b { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// The four standard status flags carried alongside a present value.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusFlags {
    pub in_alarm: bool,
    pub fault: bool,
    pub overridden: bool,
    pub out_of_service: bool,
}

impl StatusFlags {
    /// The default flag selection for intrinsic change-of-status-flags
    /// monitoring: in-alarm and fault.
    pub const IN_ALARM_FAULT: StatusFlags = StatusFlags {
        in_alarm: true,
        fault: true,
        overridden: false,
        out_of_service: false,
    };

    /// True if any flag selected in `selected` is set here.
    pub fn intersects(self, selected: StatusFlags) -> bool {
        (self.in_alarm && selected.in_alarm)
            || (self.fault && selected.fault)
            || (self.overridden && selected.overridden)
            || (self.out_of_service && selected.out_of_service)
    }
}

impl fmt::Display for StatusFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}{}{}{}]",
            u8::from(self.in_alarm),
            u8::from(self.fault),
            u8::from(self.overridden),
            u8::from(self.out_of_service)
        )
    }
}

/// Per-direction limit checking enables. Unbound parameters default to
/// both directions enabled.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LimitEnable {
    pub low_limit_enable: bool,
    pub high_limit_enable: bool,
}

impl Default for LimitEnable {
    fn default() -> Self {
        Self {
            low_limit_enable: true,
            high_limit_enable: true,
        }
    }
}

/// Acknowledgment state per transition group. The initial condition is all
/// transitions acknowledged.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventTransitionBits {
    pub to_offnormal: bool,
    pub to_fault: bool,
    pub to_normal: bool,
}

impl EventTransitionBits {
    pub const ALL: EventTransitionBits = EventTransitionBits {
        to_offnormal: true,
        to_fault: true,
        to_normal: true,
    };

    /// Writes the bit for one transition group.
    pub fn set_group(&mut self, group: EventStateGroup, value: bool) {
        match group {
            EventStateGroup::OffNormal => self.to_offnormal = value,
            EventStateGroup::Fault => self.to_fault = value,
            EventStateGroup::Normal => self.to_normal = value,
        }
    }
}

impl Default for EventTransitionBits {
    fn default() -> Self {
        Self::ALL
    }
}

/// A single atomic property value as held by an object's property cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Value {
    Null,
    Boolean(bool),
    Unsigned(u64),
    Integer(i64),
    Real(f32),
    Double(f64),
    CharacterString(String),
    BitString(BitString),
    EventState(EventState),
    Reliability(Reliability),
    StatusFlags(StatusFlags),
    LimitEnable(LimitEnable),
    TransitionBits(EventTransitionBits),
    TimeStamp(TimeStamp),
    PropertyRef(PropertyReference),
    Array(Vec<Value>),
}

impl Value {
    /// The value's kind name, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Unsigned(_) => "unsigned",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Double(_) => "double",
            Value::CharacterString(_) => "character-string",
            Value::BitString(_) => "bit-string",
            Value::EventState(_) => "event-state",
            Value::Reliability(_) => "reliability",
            Value::StatusFlags(_) => "status-flags",
            Value::LimitEnable(_) => "limit-enable",
            Value::TransitionBits(_) => "transition-bits",
            Value::TimeStamp(_) => "timestamp",
            Value::PropertyRef(_) => "property-reference",
            Value::Array(_) => "array",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Unsigned(v) => write!(f, "{v}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::CharacterString(v) => f.write_str(v),
            Value::BitString(v) => write!(f, "{v}"),
            Value::EventState(v) => write!(f, "{v}"),
            Value::Reliability(v) => write!(f, "{v}"),
            Value::StatusFlags(v) => write!(f, "{v}"),
            Value::LimitEnable(v) => {
                write!(f, "[{}{}]", u8::from(v.low_limit_enable), u8::from(v.high_limit_enable))
            }
            Value::TransitionBits(v) => write!(
                f,
                "[{}{}{}]",
                u8::from(v.to_offnormal),
                u8::from(v.to_fault),
                u8::from(v.to_normal)
            ),
            Value::TimeStamp(v) => write!(f, "{v}"),
            Value::PropertyRef(v) => write!(f, "{v}"),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// The discrete-value tagging used in change-of-state notifications. The
/// tag is chosen by the payload type of the monitored value; non-discrete
/// kinds have no tag and are a configuration error when monitored by a
/// change-of-state algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyStates {
    Boolean(bool),
    Unsigned(u64),
    Integer(i64),
}

impl PropertyStates {
    /// Picks the variant whose payload type matches the value. Exactly one
    /// variant may match; values without a discrete tag are rejected.
    pub fn for_value(value: &Value) -> Result<Self, EventError> {
        match value {
            Value::Boolean(v) => Ok(PropertyStates::Boolean(*v)),
            Value::Unsigned(v) => Ok(PropertyStates::Unsigned(*v)),
            Value::Integer(v) => Ok(PropertyStates::Integer(*v)),
            other => Err(EventError::StateTagUnresolved(other.kind())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(s: &str) -> BitString {
        BitString::new(s.chars().map(|c| c == '1').collect())
    }

    #[test]
    fn bitstring_masking() {
        let v = bits("1010");
        let mask = bits("1100");
        assert_eq!(v.masked(&mask), bits("1000"));
        assert!(v.intersects(&mask));
        assert!(!bits("0011").intersects(&bits("1100")));
    }

    #[test]
    fn bitstring_change_detection() {
        let mask = bits("1100");
        assert!(bits("1000").changed_within(&bits("0000"), &mask));
        // change outside the mask is invisible
        assert!(!bits("0001").changed_within(&bits("0000"), &mask));
        // length mismatch: missing bits read as zero
        assert!(bits("1").changed_within(&bits("0000"), &mask));
    }

    #[test]
    fn status_flag_selection() {
        let flags = StatusFlags {
            fault: true,
            ..StatusFlags::default()
        };
        assert!(flags.intersects(StatusFlags::IN_ALARM_FAULT));
        assert!(!StatusFlags::default().intersects(StatusFlags::IN_ALARM_FAULT));
    }

    #[test]
    fn discrete_state_tagging() {
        assert_eq!(
            PropertyStates::for_value(&Value::Unsigned(3)),
            Ok(PropertyStates::Unsigned(3))
        );
        assert_eq!(
            PropertyStates::for_value(&Value::Boolean(true)),
            Ok(PropertyStates::Boolean(true))
        );
        assert!(PropertyStates::for_value(&Value::Real(1.0)).is_err());
    }
}
