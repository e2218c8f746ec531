//! ParameterSet - the composite entity of a configuration
//!
//! A parameter set groups the [`Parameter`]s of one module and may inherit
//! from another set through `base_id`. It owns two aggregations, parameters
//! and comments, and is itself held by a [`Config`].

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregation::{Aggregation, Holder};
use crate::entities::{Comment, Config, Parameter};
use crate::error::DataModelError;
use crate::ids::{CommentIndex, ObjectKey, PublicId};
use crate::object::{
    downcast, Attach, Class, Object, ObjectCore, ObjectRef, PublicObject, Shared, SharedExt,
};
use crate::scope::Scope;
use crate::visitor::{visit_all, visit_composite, Visitor};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSetAttributes {
    /// Public identifier of the set this one inherits from
    #[serde(default, rename = "baseID")]
    pub base_id: String,
    #[serde(default, rename = "moduleID")]
    pub module_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct ParameterSet {
    core: ObjectCore,
    public_id: PublicId,
    attributes: ParameterSetAttributes,
    parameters: Aggregation<Parameter>,
    comments: Aggregation<Comment>,
}

impl Class for ParameterSet {
    const CLASS_NAME: &'static str = "ParameterSet";
}

impl ParameterSet {
    fn build(public_id: PublicId, scope: Option<Rc<Scope>>, attributes: ParameterSetAttributes) -> Shared<Self> {
        Rc::new_cyclic(|this| {
            RefCell::new(Self {
                core: ObjectCore::new(this, scope),
                public_id,
                attributes,
                parameters: Aggregation::new(),
                comments: Aggregation::new(),
            })
        })
    }

    /// Unbound, unregistered parameter set.
    ///
    /// It joins a scope when added to a bound parent or through
    /// [`Scope::register`].
    pub fn new(public_id: PublicId) -> Shared<Self> {
        Self::build(public_id, None, ParameterSetAttributes::default())
    }

    /// Creates a parameter set with a generated identifier.
    pub fn create(scope: &Rc<Scope>) -> Result<Shared<Self>, DataModelError> {
        Self::create_with_id(scope, scope.generate_id(Self::CLASS_NAME))
    }

    /// Creates a parameter set bound to `scope` and registers it.
    ///
    /// # Errors
    ///
    /// `DuplicateIdentifier` if another live object of the scope owns `public_id`.
    pub fn create_with_id(scope: &Rc<Scope>, public_id: PublicId) -> Result<Shared<Self>, DataModelError> {
        let set = Self::build(public_id.clone(), Some(Rc::clone(scope)), ParameterSetAttributes::default());
        scope.adopt(&public_id, &set.as_object())?;
        Ok(set)
    }

    pub fn find(scope: &Scope, public_id: &str) -> Option<Shared<Self>> {
        scope.find_as::<Self>(public_id)
    }

    #[inline]
    fn holder(&self) -> Holder<'_> {
        Holder::new(&self.core, &self.public_id)
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    pub fn base_id(&self) -> &str {
        &self.attributes.base_id
    }

    pub fn module_id(&self) -> &str {
        &self.attributes.module_id
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.attributes.created
    }

    pub fn set_base_id(&mut self, base_id: impl Into<String>) {
        self.attributes.base_id = base_id.into();
    }

    pub fn set_module_id(&mut self, module_id: impl Into<String>) {
        self.attributes.module_id = module_id.into();
    }

    pub fn set_created(&mut self, created: Option<DateTime<Utc>>) {
        self.attributes.created = created;
    }

    pub fn attributes(&self) -> &ParameterSetAttributes {
        &self.attributes
    }

    pub fn set_attributes(&mut self, attributes: ParameterSetAttributes) {
        self.attributes = attributes;
    }

    // =========================================================================
    // Relations
    // =========================================================================

    /// The owning configuration.
    pub fn config(&self) -> Option<Shared<Config>> {
        self.core.parent().and_then(|parent| downcast::<Config>(&parent))
    }

    /// Resolves `base_id` through the registry of this set's scope.
    pub fn base(&self) -> Option<Shared<ParameterSet>> {
        if self.attributes.base_id.is_empty() {
            return None;
        }
        self.core.scope()?.find_as::<ParameterSet>(&self.attributes.base_id)
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    pub fn add_parameter(&mut self, parameter: Shared<Parameter>) -> Result<(), DataModelError> {
        let holder = Holder::new(&self.core, &self.public_id);
        self.parameters.add(holder, parameter)
    }

    pub fn remove_parameter(&mut self, parameter: &Shared<Parameter>) -> Result<Shared<Parameter>, DataModelError> {
        let holder = Holder::new(&self.core, &self.public_id);
        self.parameters.remove(holder, &parameter.as_object())
    }

    pub fn remove_parameter_at(&mut self, index: usize) -> Result<Shared<Parameter>, DataModelError> {
        let holder = Holder::new(&self.core, &self.public_id);
        self.parameters.remove_at(holder, index)
    }

    pub fn remove_parameter_by_id(&mut self, public_id: &PublicId) -> Result<Shared<Parameter>, DataModelError> {
        let holder = Holder::new(&self.core, &self.public_id);
        self.parameters
            .remove_by_key(holder, &ObjectKey::Public(public_id.clone()))
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn parameter(&self, index: usize) -> Result<Shared<Parameter>, DataModelError> {
        self.parameters.at(index)
    }

    /// Child parameter with the given public identifier.
    pub fn find_parameter(&self, public_id: &str) -> Option<Shared<Parameter>> {
        self.parameters.find_public(public_id)
    }

    /// First child parameter with the given name.
    pub fn parameter_by_name(&self, name: &str) -> Option<Shared<Parameter>> {
        self.parameters
            .iter()
            .find(|parameter| parameter.borrow().name() == name)
            .cloned()
    }

    pub fn parameters(&self) -> &Aggregation<Parameter> {
        &self.parameters
    }

    // =========================================================================
    // Comments
    // =========================================================================

    pub fn add_comment(&mut self, comment: Shared<Comment>) -> Result<(), DataModelError> {
        let holder = Holder::new(&self.core, &self.public_id);
        self.comments.add(holder, comment)
    }

    pub fn remove_comment(&mut self, comment: &Shared<Comment>) -> Result<Shared<Comment>, DataModelError> {
        let holder = Holder::new(&self.core, &self.public_id);
        self.comments.remove(holder, &comment.as_object())
    }

    pub fn remove_comment_at(&mut self, index: usize) -> Result<Shared<Comment>, DataModelError> {
        let holder = Holder::new(&self.core, &self.public_id);
        self.comments.remove_at(holder, index)
    }

    pub fn remove_comment_by_index(&mut self, index: &CommentIndex) -> Result<Shared<Comment>, DataModelError> {
        let holder = Holder::new(&self.core, &self.public_id);
        self.comments
            .remove_by_key(holder, &ObjectKey::Comment(index.clone()))
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    pub fn comment(&self, index: usize) -> Result<Shared<Comment>, DataModelError> {
        self.comments.at(index)
    }

    pub fn comment_by_index(&self, index: &CommentIndex) -> Option<Shared<Comment>> {
        self.comments.find(&ObjectKey::Comment(index.clone()))
    }

    pub fn comments(&self) -> &Aggregation<Comment> {
        &self.comments
    }

    /// Unattached, unregistered copy with the same identifier and empty
    /// aggregations.
    pub fn clone_detached(&self) -> Shared<Self> {
        Self::build(self.public_id.clone(), None, self.attributes.clone())
    }
}

impl PartialEq for ParameterSet {
    fn eq(&self, other: &Self) -> bool {
        self.attributes == other.attributes
    }
}

impl Object for ParameterSet {
    object_plumbing!();
    scalar_contract!();

    fn public_id(&self) -> Option<&PublicId> {
        Some(&self.public_id)
    }

    fn key(&self) -> ObjectKey {
        ObjectKey::Public(self.public_id.clone())
    }

    fn clone_object(&self) -> ObjectRef {
        self.clone_detached().as_object()
    }

    fn accept(&self, visitor: &mut dyn Visitor) {
        visit_composite(self, visitor, |visitor| {
            visit_all(&self.parameters, visitor);
            visit_all(&self.comments, visitor);
        });
    }

    fn remove_child(&mut self, child: &ObjectRef) -> Result<(), DataModelError> {
        let holder = Holder::new(&self.core, &self.public_id);
        if self.parameters.contains(child) {
            return self.parameters.remove(holder, child).map(drop);
        }
        self.comments.remove(holder, child).map(drop)
    }

    fn update_child(&self, child: &ObjectRef) -> Result<(), DataModelError> {
        if self.parameters.contains(child) {
            return self.parameters.update(self.holder(), child);
        }
        self.comments.update(self.holder(), child)
    }

    fn release_children(&mut self) -> usize {
        self.parameters.release_all() + self.comments.release_all()
    }
}

impl PublicObject for ParameterSet {
    fn id(&self) -> &PublicId {
        &self.public_id
    }
}

impl Attach for ParameterSet {
    fn attach_to(this: &Shared<Self>, parent: &ObjectRef) -> Result<(), DataModelError> {
        let mut parent = parent.borrow_mut();
        let found = parent.class_name();
        match parent.as_any_mut().downcast_mut::<Config>() {
            Some(config) => config.add_parameter_set(Rc::clone(this)),
            None => Err(DataModelError::type_mismatch(Config::CLASS_NAME, found)),
        }
    }
}
