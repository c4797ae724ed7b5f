//! # bacev-engine::store::object
//!
//! The monitored property container. Each `Object` is a bag of property
//! cells keyed by `PropertyIdentifier`; every cell carries an observer list
//! that fires after a committed write. The whole store runs on one logical
//! executor, so cells use `RefCell` interior mutability rather than locks.

use bacev_api::ReliabilityEval;
use bacev_types::primitives::Value;
use bacev_types::property::{ObjectId, ObjectType, PropertyIdentifier};
use fxhash::FxHashMap;
use indexmap::IndexMap;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Identifies one registered monitor so it can be removed on teardown.
pub type MonitorId = u64;

struct Monitor {
    id: MonitorId,
    callback: Rc<dyn Fn(&Value, &Value)>,
}

/// An object in the store: an identifier, a name, and monitored property
/// cells.
///
/// Invariants:
/// - a monitor fires with `(old, new)` strictly after the write has
///   committed, so reading the property from inside a monitor sees `new`;
/// - monitors fire on every committed write, including writes of an equal
///   value (re-announcement is meaningful to the fault interlock).
pub struct Object {
    id: ObjectId,
    name: String,
    properties: RefCell<IndexMap<PropertyIdentifier, Value>>,
    monitors: RefCell<FxHashMap<PropertyIdentifier, Vec<Monitor>>>,
    next_monitor_id: Cell<MonitorId>,
    fault_algorithm: RefCell<Option<Rc<dyn ReliabilityEval>>>,
}

impl Object {
    pub fn new(id: ObjectId, name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            id,
            name: name.into(),
            properties: RefCell::new(IndexMap::new()),
            monitors: RefCell::new(FxHashMap::default()),
            next_monitor_id: Cell::new(0),
            fault_algorithm: RefCell::new(None),
        })
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn object_type(&self) -> ObjectType {
        self.id.object_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reads the current value of a property, if the cell exists.
    pub fn get(&self, property: PropertyIdentifier) -> Option<Value> {
        self.properties.borrow().get(&property).cloned()
    }

    /// True if the object carries the property at all.
    pub fn has(&self, property: PropertyIdentifier) -> bool {
        self.properties.borrow().contains_key(&property)
    }

    /// Writes a property cell, creating it if absent, then notifies the
    /// cell's monitors with `(old, new)`. A previously absent cell reports
    /// `Value::Null` as the old value.
    pub fn set(&self, property: PropertyIdentifier, value: Value) {
        let old = {
            let mut properties = self.properties.borrow_mut();
            properties.insert(property, value.clone()).unwrap_or(Value::Null)
        };

        // Snapshot the callbacks before dispatch: a monitor may register or
        // remove monitors on this same object.
        let callbacks: Vec<Rc<dyn Fn(&Value, &Value)>> = {
            let monitors = self.monitors.borrow();
            monitors
                .get(&property)
                .map(|list| list.iter().map(|m| m.callback.clone()).collect())
                .unwrap_or_default()
        };
        for callback in callbacks {
            callback(&old, &value);
        }
    }

    /// Registers a monitor on one property cell. The cell does not need to
    /// exist yet; the monitor fires once the property is first written.
    pub fn add_monitor(
        &self,
        property: PropertyIdentifier,
        callback: impl Fn(&Value, &Value) + 'static,
    ) -> MonitorId {
        let id = self.next_monitor_id.get();
        self.next_monitor_id.set(id + 1);
        self.monitors
            .borrow_mut()
            .entry(property)
            .or_default()
            .push(Monitor {
                id,
                callback: Rc::new(callback),
            });
        id
    }

    /// Removes a previously registered monitor. Returns whether it existed.
    pub fn remove_monitor(&self, property: PropertyIdentifier, id: MonitorId) -> bool {
        let mut monitors = self.monitors.borrow_mut();
        match monitors.get_mut(&property) {
            Some(list) => {
                let before = list.len();
                list.retain(|m| m.id != id);
                before != list.len()
            }
            None => false,
        }
    }

    /// Attaches a companion fault algorithm whose evaluated reliability
    /// gates this object's event reporting.
    pub fn attach_fault_algorithm(&self, algorithm: Rc<dyn ReliabilityEval>) {
        *self.fault_algorithm.borrow_mut() = Some(algorithm);
    }

    pub fn fault_algorithm(&self) -> Option<Rc<dyn ReliabilityEval>> {
        self.fault_algorithm.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bacev_types::property::ObjectType;
    use std::cell::RefCell;

    fn object() -> Rc<Object> {
        Object::new(ObjectId::new(ObjectType::AnalogInput, 7), "ai-7")
    }

    #[test]
    fn set_commits_before_notifying() {
        let obj = object();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen2 = seen.clone();
        let obj2 = obj.clone();
        obj.add_monitor(PropertyIdentifier::PresentValue, move |old, new| {
            // the cell already holds the new value
            assert_eq!(obj2.get(PropertyIdentifier::PresentValue), Some(new.clone()));
            seen2.borrow_mut().push((old.clone(), new.clone()));
        });

        obj.set(PropertyIdentifier::PresentValue, Value::Real(1.0));
        obj.set(PropertyIdentifier::PresentValue, Value::Real(2.0));
        assert_eq!(
            *seen.borrow(),
            vec![
                (Value::Null, Value::Real(1.0)),
                (Value::Real(1.0), Value::Real(2.0)),
            ]
        );
    }

    #[test]
    fn equal_value_writes_still_notify() {
        let obj = object();
        let count = Rc::new(Cell::new(0));
        let count2 = count.clone();
        obj.add_monitor(PropertyIdentifier::Reliability, move |_, _| {
            count2.set(count2.get() + 1);
        });
        obj.set(PropertyIdentifier::Reliability, Value::Unsigned(1));
        obj.set(PropertyIdentifier::Reliability, Value::Unsigned(1));
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn removed_monitor_stops_firing() {
        let obj = object();
        let count = Rc::new(Cell::new(0));
        let count2 = count.clone();
        let id = obj.add_monitor(PropertyIdentifier::PresentValue, move |_, _| {
            count2.set(count2.get() + 1);
        });
        obj.set(PropertyIdentifier::PresentValue, Value::Real(1.0));
        assert!(obj.remove_monitor(PropertyIdentifier::PresentValue, id));
        obj.set(PropertyIdentifier::PresentValue, Value::Real(2.0));
        assert_eq!(count.get(), 1);
        assert!(!obj.remove_monitor(PropertyIdentifier::PresentValue, id));
    }
}
