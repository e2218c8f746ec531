//! Parameter - a named value inside a parameter set

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::aggregation::{Aggregation, Holder};
use crate::entities::{Comment, ParameterSet};
use crate::error::DataModelError;
use crate::ids::{CommentIndex, ObjectKey, PublicId};
use crate::object::{
    downcast, Attach, Class, Object, ObjectCore, ObjectRef, PublicObject, Shared, SharedExt,
};
use crate::scope::Scope;
use crate::visitor::{visit_all, visit_composite, Visitor};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterAttributes {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug)]
pub struct Parameter {
    core: ObjectCore,
    public_id: PublicId,
    attributes: ParameterAttributes,
    comments: Aggregation<Comment>,
}

impl Class for Parameter {
    const CLASS_NAME: &'static str = "Parameter";
}

impl Parameter {
    fn build(public_id: PublicId, scope: Option<Rc<Scope>>, attributes: ParameterAttributes) -> Shared<Self> {
        Rc::new_cyclic(|this| {
            RefCell::new(Self {
                core: ObjectCore::new(this, scope),
                public_id,
                attributes,
                comments: Aggregation::new(),
            })
        })
    }

    /// Unbound, unregistered parameter.
    pub fn new(public_id: PublicId) -> Shared<Self> {
        Self::build(public_id, None, ParameterAttributes::default())
    }

    /// Creates a parameter with a generated identifier.
    pub fn create(scope: &Rc<Scope>) -> Result<Shared<Self>, DataModelError> {
        Self::create_with_id(scope, scope.generate_id(Self::CLASS_NAME))
    }

    /// Creates a parameter bound to `scope` and registers it.
    ///
    /// # Errors
    ///
    /// `DuplicateIdentifier` if another live object of the scope owns `public_id`.
    pub fn create_with_id(scope: &Rc<Scope>, public_id: PublicId) -> Result<Shared<Self>, DataModelError> {
        let parameter = Self::build(public_id.clone(), Some(Rc::clone(scope)), ParameterAttributes::default());
        scope.adopt(&public_id, &parameter.as_object())?;
        Ok(parameter)
    }

    pub fn find(scope: &Scope, public_id: &str) -> Option<Shared<Self>> {
        scope.find_as::<Self>(public_id)
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.attributes.name
    }

    pub fn value(&self) -> Option<&str> {
        self.attributes.value.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.attributes.name = name.into();
    }

    pub fn set_value(&mut self, value: Option<String>) {
        self.attributes.value = value;
    }

    pub fn attributes(&self) -> &ParameterAttributes {
        &self.attributes
    }

    pub fn set_attributes(&mut self, attributes: ParameterAttributes) {
        self.attributes = attributes;
    }

    /// The owning parameter set.
    pub fn parameter_set(&self) -> Option<Shared<ParameterSet>> {
        self.core.parent().and_then(|parent| downcast::<ParameterSet>(&parent))
    }

    // =========================================================================
    // Comments
    // =========================================================================

    pub fn add_comment(&mut self, comment: Shared<Comment>) -> Result<(), DataModelError> {
        self.comments.add(Holder::new(&self.core, &self.public_id), comment)
    }

    pub fn remove_comment(&mut self, comment: &Shared<Comment>) -> Result<Shared<Comment>, DataModelError> {
        self.comments
            .remove(Holder::new(&self.core, &self.public_id), &comment.as_object())
    }

    pub fn remove_comment_at(&mut self, index: usize) -> Result<Shared<Comment>, DataModelError> {
        self.comments
            .remove_at(Holder::new(&self.core, &self.public_id), index)
    }

    pub fn remove_comment_by_index(&mut self, index: &CommentIndex) -> Result<Shared<Comment>, DataModelError> {
        self.comments.remove_by_key(
            Holder::new(&self.core, &self.public_id),
            &ObjectKey::Comment(index.clone()),
        )
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

    /// Unattached, unregistered copy with the same identifier and no comments.
    pub fn clone_detached(&self) -> Shared<Self> {
        Self::build(self.public_id.clone(), None, self.attributes.clone())
    }
}

impl PartialEq for Parameter {
    fn eq(&self, other: &Self) -> bool {
        self.attributes == other.attributes
    }
}

impl Object for Parameter {
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
        visit_composite(self, visitor, |visitor| visit_all(&self.comments, visitor));
    }

    fn remove_child(&mut self, child: &ObjectRef) -> Result<(), DataModelError> {
        let holder = Holder::new(&self.core, &self.public_id);
        self.comments.remove(holder, child).map(drop)
    }

    fn update_child(&self, child: &ObjectRef) -> Result<(), DataModelError> {
        self.comments
            .update(Holder::new(&self.core, &self.public_id), child)
    }

    fn release_children(&mut self) -> usize {
        self.comments.release_all()
    }
}

impl PublicObject for Parameter {
    fn id(&self) -> &PublicId {
        &self.public_id
    }
}

impl Attach for Parameter {
    fn attach_to(this: &Shared<Self>, parent: &ObjectRef) -> Result<(), DataModelError> {
        let mut parent = parent.borrow_mut();
        let found = parent.class_name();
        match parent.as_any_mut().downcast_mut::<ParameterSet>() {
            Some(set) => set.add_parameter(Rc::clone(this)),
            None => Err(DataModelError::type_mismatch(ParameterSet::CLASS_NAME, found)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{detach, same_object};

    fn pid(value: &str) -> PublicId {
        PublicId::new(value).unwrap()
    }

    #[test]
    fn create_registers_in_scope() {
        let scope = Scope::with_defaults("doc");
        let parameter = Parameter::create_with_id(&scope, pid("Par/1")).unwrap();

        let found = Parameter::find(&scope, "Par/1").unwrap();
        assert!(Rc::ptr_eq(&found, &parameter));
    }

    #[test]
    fn create_with_taken_identifier_fails() {
        let scope = Scope::with_defaults("doc");
        let _first = Parameter::create_with_id(&scope, pid("Par/1")).unwrap();

        let err = Parameter::create_with_id(&scope, pid("Par/1")).unwrap_err();
        assert_eq!(err, DataModelError::duplicate_identifier(pid("Par/1")));
    }

    #[test]
    fn create_generates_identifier_from_pattern() {
        let scope = Scope::with_defaults("doc");
        let parameter = Parameter::create(&scope).unwrap();

        let id = parameter.borrow().id().clone();
        assert!(id.as_str().starts_with("Parameter/"));
        assert!(scope.registry().contains(id.as_str()));
    }

    #[test]
    fn comments_keep_insertion_order_and_unique_index() {
        let parameter = Parameter::new(pid("Par/1"));
        parameter.borrow_mut().add_comment(Comment::new("a", "first")).unwrap();
        parameter.borrow_mut().add_comment(Comment::new("b", "second")).unwrap();

        let err = parameter
            .borrow_mut()
            .add_comment(Comment::new("a", "again"))
            .unwrap_err();
        assert!(matches!(err, DataModelError::DuplicateKey { .. }));

        let parameter = parameter.borrow();
        assert_eq!(parameter.comment_count(), 2);
        assert_eq!(parameter.comment(0).unwrap().borrow().text(), "first");
        assert_eq!(parameter.comment(1).unwrap().borrow().text(), "second");
        assert!(matches!(
            parameter.comment(2),
            Err(DataModelError::IndexOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn comment_parent_is_the_parameter() {
        let parameter = Parameter::new(pid("Par/1"));
        let comment = Comment::new("a", "text");
        parameter.borrow_mut().add_comment(Rc::clone(&comment)).unwrap();

        let parent = comment.borrow().parent().unwrap();
        assert!(same_object(&parent, &parameter.as_object()));

        detach(&comment.as_object()).unwrap();
        assert!(!comment.borrow().is_attached());
        assert_eq!(parameter.borrow().comment_count(), 0);
    }

    #[test]
    fn remove_comment_by_index_missing_is_not_member() {
        let parameter = Parameter::new(pid("Par/1"));
        let err = parameter
            .borrow_mut()
            .remove_comment_by_index(&CommentIndex::new("ghost"))
            .unwrap_err();
        assert!(matches!(err, DataModelError::NotMember { .. }));
    }

    #[test]
    fn attach_to_requires_parameter_set() {
        let parameter = Parameter::new(pid("Par/1"));
        let other = Parameter::new(pid("Par/2"));

        let err = Parameter::attach_to(&parameter, &other.as_object()).unwrap_err();
        assert_eq!(err, DataModelError::type_mismatch("ParameterSet", "Parameter"));
    }

    #[test]
    fn clone_detached_keeps_identity_and_drops_children() {
        let parameter = Parameter::new(pid("Par/1"));
        parameter.borrow_mut().set_name("detecsScale");
        parameter.borrow_mut().add_comment(Comment::new("a", "text")).unwrap();

        let copy = parameter.borrow().clone_detached();
        let copy = copy.borrow();
        assert_eq!(copy.id(), &pid("Par/1"));
        assert_eq!(copy.name(), "detecsScale");
        assert_eq!(copy.comment_count(), 0);
        assert!(copy.equals(&*parameter.borrow()));
    }
}
