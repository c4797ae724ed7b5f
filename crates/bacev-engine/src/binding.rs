//! # bacev-engine::binding
//!
//! Binds an algorithm parameter either to a literal value or to a live
//! (object, property) reference. Type agreement is proven once at bind
//! time; reads always go to the current value, never a cache. Monitor
//! installation for property-backed sources lives with the scheduler so
//! bursts of changes coalesce into one evaluation.

use crate::store::Object;
use bacev_types::errors::{ConfigError, EventError};
use bacev_types::primitives::{
    BitString, EventTransitionBits, LimitEnable, StatusFlags, Value,
};
use bacev_types::property::{PropertyIdentifier, PropertyReference};
use bacev_types::state::{EventState, Reliability};
use bacev_types::time::TimeStamp;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

/// Extraction of a typed parameter from a stored [`Value`].
pub trait FromValue: Sized {
    /// The kind name reported in type-mismatch errors.
    const EXPECTED: &'static str;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for bool {
    const EXPECTED: &'static str = "boolean";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for u32 {
    const EXPECTED: &'static str = "unsigned";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Unsigned(v) => u32::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl FromValue for u64 {
    const EXPECTED: &'static str = "unsigned";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Unsigned(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "integer";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(v) => Some(*v),
            // Unsigned deadbands pair with signed limits.
            Value::Unsigned(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl FromValue for f32 {
    const EXPECTED: &'static str = "real";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Real(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "double";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "character-string";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::CharacterString(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromValue for BitString {
    const EXPECTED: &'static str = "bit-string";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::BitString(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromValue for EventState {
    const EXPECTED: &'static str = "event-state";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::EventState(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for Reliability {
    const EXPECTED: &'static str = "reliability";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Reliability(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for StatusFlags {
    const EXPECTED: &'static str = "status-flags";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::StatusFlags(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for LimitEnable {
    const EXPECTED: &'static str = "limit-enable";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::LimitEnable(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for EventTransitionBits {
    const EXPECTED: &'static str = "transition-bits";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::TransitionBits(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for TimeStamp {
    const EXPECTED: &'static str = "timestamp";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::TimeStamp(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for PropertyReference {
    const EXPECTED: &'static str = "property-reference";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::PropertyRef(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromValue for Value {
    const EXPECTED: &'static str = "any";
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for Vec<Value> {
    const EXPECTED: &'static str = "array";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(items.clone()),
            _ => None,
        }
    }
}

impl FromValue for Vec<BitString> {
    const EXPECTED: &'static str = "array of bit-strings";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => items.iter().map(BitString::from_value).collect(),
            _ => None,
        }
    }
}

impl FromValue for Vec<String> {
    const EXPECTED: &'static str = "array of character-strings";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => items.iter().map(String::from_value).collect(),
            _ => None,
        }
    }
}

/// Where a parameter draws its value from: a literal fixed at bind time,
/// or a live property cell.
#[derive(Clone)]
pub enum BindSource {
    Literal(Value),
    Property {
        object: Rc<Object>,
        property: PropertyIdentifier,
    },
}

impl BindSource {
    pub fn literal(value: Value) -> Self {
        BindSource::Literal(value)
    }

    pub fn property(object: &Rc<Object>, property: PropertyIdentifier) -> Self {
        BindSource::Property {
            object: object.clone(),
            property,
        }
    }

    fn read(&self) -> Option<Value> {
        match self {
            BindSource::Literal(value) => Some(value.clone()),
            BindSource::Property { object, property } => object.get(*property),
        }
    }
}

impl fmt::Debug for BindSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindSource::Literal(value) => write!(f, "Literal({})", value.kind()),
            BindSource::Property { object, property } => {
                write!(f, "Property({}/{})", object.id(), property)
            }
        }
    }
}

/// A typed view over a bind source.
///
/// Resolution proves once that the source carries (or currently carries) a
/// value of the bound type; later reads that no longer convert surface as
/// absent values, which evaluators treat as "no transition this cycle".
pub struct Binding<T: FromValue> {
    name: &'static str,
    source: BindSource,
    _marker: PhantomData<T>,
}

impl<T: FromValue> Binding<T> {
    /// Resolves and type-checks a source. A literal of the wrong kind or a
    /// referenced property that is missing or mistyped is a fatal
    /// configuration error.
    pub fn resolve(name: &'static str, source: BindSource) -> Result<Self, ConfigError> {
        match &source {
            BindSource::Literal(value) => {
                T::from_value(value).ok_or(ConfigError::LiteralMismatch {
                    name,
                    expected: T::EXPECTED,
                    found: value.kind(),
                })?;
            }
            BindSource::Property { object, property } => {
                let value = object.get(*property).ok_or(ConfigError::NoSuchProperty {
                    object: object.id(),
                    property: *property,
                })?;
                T::from_value(&value).ok_or(ConfigError::TypeMismatch {
                    property: *property,
                    expected: T::EXPECTED,
                    found: value.kind(),
                })?;
            }
        }
        Ok(Self {
            name,
            source,
            _marker: PhantomData,
        })
    }

    /// Resolves an optional source, keeping `None` as "parameter unbound".
    pub fn resolve_opt(
        name: &'static str,
        source: Option<BindSource>,
    ) -> Result<Option<Self>, ConfigError> {
        source.map(|s| Self::resolve(name, s)).transpose()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn source(&self) -> &BindSource {
        &self.source
    }

    /// The current value, if it is readable and still of the bound type.
    pub fn value(&self) -> Option<T> {
        self.source.read().as_ref().and_then(T::from_value)
    }

    /// The current value, or an evaluation error naming the parameter.
    pub fn require(&self) -> Result<T, EventError> {
        let value = self.source.read();
        match value.as_ref().and_then(T::from_value) {
            Some(v) => Ok(v),
            None => Err(EventError::ParameterType {
                name: self.name,
                expected: T::EXPECTED,
                found: value.as_ref().map(Value::kind).unwrap_or("absent"),
            }),
        }
    }
}

impl<T: FromValue> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Binding({} <- {:?})", self.name, self.source)
    }
}

/// A recorded property change delivered to an algorithm's pending set.
#[derive(Debug, Clone)]
pub struct PropertyChange {
    /// The bound parameter name the change arrived through.
    pub name: &'static str,
    pub old: Value,
    pub new: Value,
}

/// Uniform enumeration of a parameter set's bound sources, so monitor
/// installation does not need to know each algorithm's field layout.
pub(crate) trait ParameterSet {
    fn visit_sources(&self, visit: &mut dyn FnMut(&'static str, &BindSource));
}

#[cfg(test)]
mod tests {
    use super::*;
    use bacev_types::property::{ObjectId, ObjectType};

    fn object() -> Rc<Object> {
        let obj = Object::new(ObjectId::new(ObjectType::AnalogValue, 3), "av-3");
        obj.set(PropertyIdentifier::PresentValue, Value::Real(21.5));
        obj
    }

    #[test]
    fn literal_type_mismatch_is_fatal() {
        let err = Binding::<f32>::resolve("high_limit", BindSource::literal(Value::Unsigned(3)))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::LiteralMismatch {
                name: "high_limit",
                expected: "real",
                found: "unsigned",
            }
        );
    }

    #[test]
    fn missing_property_is_fatal() {
        let obj = object();
        let err = Binding::<f32>::resolve(
            "monitored_value",
            BindSource::property(&obj, PropertyIdentifier::LowLimit),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::NoSuchProperty { .. }));
    }

    #[test]
    fn property_reads_are_live() {
        let obj = object();
        let binding = Binding::<f32>::resolve(
            "monitored_value",
            BindSource::property(&obj, PropertyIdentifier::PresentValue),
        )
        .unwrap();
        assert_eq!(binding.value(), Some(21.5));
        obj.set(PropertyIdentifier::PresentValue, Value::Real(30.0));
        assert_eq!(binding.value(), Some(30.0));
    }

    #[test]
    fn retyped_property_reads_as_absent() {
        let obj = object();
        let binding = Binding::<f32>::resolve(
            "monitored_value",
            BindSource::property(&obj, PropertyIdentifier::PresentValue),
        )
        .unwrap();
        obj.set(PropertyIdentifier::PresentValue, Value::CharacterString("?".into()));
        assert_eq!(binding.value(), None);
        assert!(binding.require().is_err());
    }
}
