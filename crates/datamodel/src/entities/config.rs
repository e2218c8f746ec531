//! Config - root of a configuration document

use std::cell::RefCell;
use std::rc::Rc;

use crate::aggregation::{Aggregation, Holder};
use crate::entities::ParameterSet;
use crate::error::DataModelError;
use crate::ids::{ObjectKey, PublicId};
use crate::object::{Class, Object, ObjectCore, ObjectRef, PublicObject, Shared, SharedExt};
use crate::scope::Scope;
use crate::visitor::{visit_all, visit_composite, Visitor};

/// Root entity. Holds the parameter sets of one document and never has a
/// parent itself.
#[derive(Debug)]
pub struct Config {
    core: ObjectCore,
    public_id: PublicId,
    parameter_sets: Aggregation<ParameterSet>,
}

impl Class for Config {
    const CLASS_NAME: &'static str = "Config";
}

impl Config {
    fn build(public_id: PublicId, scope: Option<Rc<Scope>>) -> Shared<Self> {
        Rc::new_cyclic(|this| {
            RefCell::new(Self {
                core: ObjectCore::new(this, scope),
                public_id,
                parameter_sets: Aggregation::new(),
            })
        })
    }

    pub fn new(public_id: PublicId) -> Shared<Self> {
        Self::build(public_id, None)
    }

    pub fn create(scope: &Rc<Scope>) -> Result<Shared<Self>, DataModelError> {
        Self::create_with_id(scope, scope.generate_id(Self::CLASS_NAME))
    }

    pub fn create_with_id(scope: &Rc<Scope>, public_id: PublicId) -> Result<Shared<Self>, DataModelError> {
        let config = Self::build(public_id.clone(), Some(Rc::clone(scope)));
        scope.adopt(&public_id, &config.as_object())?;
        Ok(config)
    }

    pub fn add_parameter_set(&mut self, set: Shared<ParameterSet>) -> Result<(), DataModelError> {
        let holder = Holder::new(&self.core, &self.public_id);
        self.parameter_sets.add(holder, set)
    }

    pub fn remove_parameter_set(&mut self, set: &Shared<ParameterSet>) -> Result<Shared<ParameterSet>, DataModelError> {
        let holder = Holder::new(&self.core, &self.public_id);
        self.parameter_sets.remove(holder, &set.as_object())
    }

    pub fn remove_parameter_set_at(&mut self, index: usize) -> Result<Shared<ParameterSet>, DataModelError> {
        let holder = Holder::new(&self.core, &self.public_id);
        self.parameter_sets.remove_at(holder, index)
    }

    pub fn parameter_set_count(&self) -> usize {
        self.parameter_sets.len()
    }

    pub fn parameter_set(&self, index: usize) -> Result<Shared<ParameterSet>, DataModelError> {
        self.parameter_sets.at(index)
    }

    pub fn find_parameter_set(&self, public_id: &str) -> Option<Shared<ParameterSet>> {
        self.parameter_sets.find_public(public_id)
    }

    pub fn parameter_sets(&self) -> &Aggregation<ParameterSet> {
        &self.parameter_sets
    }
}

/// A configuration carries no scalars, so any two are equal.
impl PartialEq for Config {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Object for Config {
    object_plumbing!();

    fn public_id(&self) -> Option<&PublicId> {
        Some(&self.public_id)
    }

    fn key(&self) -> ObjectKey {
        ObjectKey::Public(self.public_id.clone())
    }

    fn equals(&self, other: &dyn Object) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| self == other)
    }

    /// No scalars to copy; only the runtime type is checked.
    fn assign(&mut self, other: &dyn Object) -> Result<(), DataModelError> {
        if other.as_any().is::<Self>() {
            Ok(())
        } else {
            Err(DataModelError::type_mismatch(Self::CLASS_NAME, other.class_name()))
        }
    }

    fn clone_object(&self) -> ObjectRef {
        Self::build(self.public_id.clone(), None).as_object()
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::Object(serde_json::Map::new())
    }

    fn accept(&self, visitor: &mut dyn Visitor) {
        visit_composite(self, visitor, |visitor| visit_all(&self.parameter_sets, visitor));
    }

    fn remove_child(&mut self, child: &ObjectRef) -> Result<(), DataModelError> {
        let holder = Holder::new(&self.core, &self.public_id);
        self.parameter_sets.remove(holder, child).map(drop)
    }

    fn update_child(&self, child: &ObjectRef) -> Result<(), DataModelError> {
        self.parameter_sets
            .update(Holder::new(&self.core, &self.public_id), child)
    }

    fn release_children(&mut self) -> usize {
        self.parameter_sets.release_all()
    }
}

impl PublicObject for Config {
    fn id(&self) -> &PublicId {
        &self.public_id
    }
}
