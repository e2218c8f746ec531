//! Comment - free text annotation keyed by a per-parent index

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Parameter, ParameterSet};
use crate::error::DataModelError;
use crate::ids::{CommentIndex, ObjectKey, PublicId};
use crate::object::{Attach, Class, Object, ObjectCore, ObjectRef, Shared, SharedExt};
use crate::visitor::Visitor;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAttributes {
    pub text: String,
    /// Index key, unique among the comments of one parent
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
}

/// A comment attached to a [`ParameterSet`] or a [`Parameter`].
///
/// Comments are not public objects: they are never registered and are
/// addressed inside their parent by [`CommentIndex`].
#[derive(Debug)]
pub struct Comment {
    core: ObjectCore,
    attributes: CommentAttributes,
}

impl Class for Comment {
    const CLASS_NAME: &'static str = "Comment";
}

impl Comment {
    /// Create an unattached comment.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Shared<Self> {
        Self::from_attributes(CommentAttributes {
            text: text.into(),
            id: id.into(),
            ..CommentAttributes::default()
        })
    }

    pub fn from_attributes(attributes: CommentAttributes) -> Shared<Self> {
        Rc::new_cyclic(|this| {
            RefCell::new(Self {
                core: ObjectCore::new(this, None),
                attributes,
            })
        })
    }

    #[inline]
    pub fn index(&self) -> CommentIndex {
        CommentIndex::new(self.attributes.id.clone())
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.attributes.text
    }

    #[inline]
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.attributes.start
    }

    #[inline]
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.attributes.end
    }

    #[inline]
    pub fn author(&self) -> Option<&str> {
        self.attributes.author.as_deref()
    }

    #[inline]
    pub fn creation_time(&self) -> Option<DateTime<Utc>> {
        self.attributes.creation_time
    }

    #[inline]
    pub fn attributes(&self) -> &CommentAttributes {
        &self.attributes
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.attributes.text = text.into();
    }

    pub fn set_start(&mut self, start: Option<DateTime<Utc>>) {
        self.attributes.start = start;
    }

    pub fn set_end(&mut self, end: Option<DateTime<Utc>>) {
        self.attributes.end = end;
    }

    pub fn set_author(&mut self, author: Option<String>) {
        self.attributes.author = author;
    }

    pub fn set_creation_time(&mut self, creation_time: Option<DateTime<Utc>>) {
        self.attributes.creation_time = creation_time;
    }

    /// Unattached copy of this comment.
    pub fn clone_detached(&self) -> Shared<Self> {
        Self::from_attributes(self.attributes.clone())
    }
}

impl PartialEq for Comment {
    fn eq(&self, other: &Self) -> bool {
        self.attributes == other.attributes
    }
}

impl Object for Comment {
    object_plumbing!();
    scalar_contract!();

    fn public_id(&self) -> Option<&PublicId> {
        None
    }

    fn key(&self) -> ObjectKey {
        ObjectKey::Comment(self.index())
    }

    fn clone_object(&self) -> ObjectRef {
        self.clone_detached().as_object()
    }

    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_leaf(self);
    }
}

impl Attach for Comment {
    fn attach_to(this: &Shared<Self>, parent: &ObjectRef) -> Result<(), DataModelError> {
        let mut parent = parent.borrow_mut();
        let found = parent.class_name();
        let target = parent.as_any_mut();
        if let Some(set) = target.downcast_mut::<ParameterSet>() {
            return set.add_comment(Rc::clone(this));
        }
        if let Some(parameter) = target.downcast_mut::<Parameter>() {
            return parameter.add_comment(Rc::clone(this));
        }
        Err(DataModelError::type_mismatch("ParameterSet or Parameter", found))
    }
}
