//! # bacev-engine::store
//!
//! The object store: the flat container of monitored objects that property
//! references resolve against. Insertion order is preserved so iteration
//! and diagnostics stay deterministic.

mod object;

pub use object::{MonitorId, Object};

use bacev_types::property::ObjectId;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

/// The flat object container property references resolve against.
#[derive(Default)]
pub struct ObjectStore {
    objects: RefCell<IndexMap<ObjectId, Rc<Object>>>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an object, replacing any previous object with the same id.
    pub fn insert(&self, object: Rc<Object>) {
        self.objects.borrow_mut().insert(object.id(), object);
    }

    /// Looks an object up by its identifier.
    pub fn get(&self, id: ObjectId) -> Option<Rc<Object>> {
        self.objects.borrow().get(&id).cloned()
    }

    pub fn remove(&self, id: ObjectId) -> Option<Rc<Object>> {
        self.objects.borrow_mut().shift_remove(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.borrow().is_empty()
    }
}
