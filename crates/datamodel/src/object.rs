//! Object base - the capability set shared by every data model entity
//!
//! # Ownership
//!
//! Entities live behind [`Shared<T>`] handles (`Rc<RefCell<T>>`). A parent's
//! [`Aggregation`](crate::Aggregation) holds the only owning handle of each
//! child; the child points back at its parent through a `Weak`, and the
//! [`Registry`](crate::Registry) only holds `Weak` entries. Dropping a root
//! therefore drops the whole tree and empties the registry lazily.
//!
//! # Capabilities
//!
//! | Capability | Where |
//! |------------|-------|
//! | equality on scalars | [`Object::equals`], typed `PartialEq` |
//! | scalar assignment | [`Object::assign`] |
//! | detached clone | [`Object::clone_object`] |
//! | public identity | [`PublicObject`] |
//! | attach protocol | [`Attach`], [`detach`], [`detach_from`] |
//! | in-place updates | [`update`], [`Object::update_child`] |

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::DataModelError;
use crate::ids::{ObjectKey, PublicId};
use crate::scope::Scope;
use crate::visitor::Visitor;

/// Owning handle to an entity.
pub type Shared<T> = Rc<RefCell<T>>;

/// Type-erased owning handle.
pub type ObjectRef = Rc<RefCell<dyn Object>>;

/// Type-erased non-owning handle (parent back-references, registry entries).
pub type WeakObjectRef = Weak<RefCell<dyn Object>>;

/// Common behaviour of every entity in the data model.
///
/// Equality, assignment and cloning only ever consider scalar attributes:
/// children held in aggregations are never compared, copied or assigned.
pub trait Object: Any + fmt::Debug {
    /// Runtime class name (e.g. `"ParameterSet"`).
    fn class_name(&self) -> &'static str;

    fn core(&self) -> &ObjectCore;

    fn core_mut(&mut self) -> &mut ObjectCore;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// The public identifier, for objects that carry one.
    fn public_id(&self) -> Option<&PublicId>;

    /// Key under which this object is addressed inside its parent.
    fn key(&self) -> ObjectKey;

    /// True iff `other` has the same runtime type and equal scalar attributes.
    fn equals(&self, other: &dyn Object) -> bool;

    /// Copies the scalar attributes of `other` into `self`.
    ///
    /// The public identifier and all children are left untouched.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if `other` is of a different runtime type.
    fn assign(&mut self, other: &dyn Object) -> Result<(), DataModelError>;

    /// Creates an unattached, unregistered copy with empty aggregations.
    fn clone_object(&self) -> ObjectRef;

    /// Scalar attributes as a serialisation-neutral value.
    fn snapshot(&self) -> serde_json::Value;

    /// Exposes this object and its children to `visitor` in insertion order.
    fn accept(&self, visitor: &mut dyn Visitor);

    /// Removes `child` from whichever aggregation holds it.
    fn remove_child(&mut self, child: &ObjectRef) -> Result<(), DataModelError> {
        let child = child.borrow();
        Err(DataModelError::not_member(child.class_name(), child.key()))
    }

    /// Announces an in-place change of `child` without touching membership.
    fn update_child(&self, child: &ObjectRef) -> Result<(), DataModelError> {
        let child = child.borrow();
        Err(DataModelError::not_member(child.class_name(), child.key()))
    }

    /// Clears the parent pointer of every child and empties all aggregations.
    ///
    /// Returns the number of released children.
    fn release_children(&mut self) -> usize {
        0
    }

    /// The current parent, if attached and still alive.
    fn parent(&self) -> Option<ObjectRef> {
        self.core().parent()
    }

    fn is_attached(&self) -> bool {
        self.core().is_attached()
    }
}

/// Class name known without an instance at hand.
pub trait Class {
    const CLASS_NAME: &'static str;
}

/// Objects that carry a public identifier and may be registered.
pub trait PublicObject: Object {
    fn id(&self) -> &PublicId;
}

/// Typed attach protocol.
///
/// `attach_to` is implemented per type because only the child knows which
/// parent types can hold it; detaching is type independent.
pub trait Attach: Object + Sized {
    /// Adds `this` to the matching aggregation of `parent`.
    ///
    /// # Errors
    ///
    /// - `AlreadyAttached` if `this` already has a parent
    /// - `TypeMismatch` if `parent` cannot hold this type
    /// - any error of the underlying aggregation add
    fn attach_to(this: &Shared<Self>, parent: &ObjectRef) -> Result<(), DataModelError>;

    fn detach_from(this: &Shared<Self>, parent: &ObjectRef) -> Result<(), DataModelError> {
        detach_from(&this.as_object(), parent)
    }

    fn detach(this: &Shared<Self>) -> Result<(), DataModelError> {
        detach(&this.as_object())
    }
}

/// Conversion of typed handles into type-erased ones.
pub trait SharedExt {
    fn as_object(&self) -> ObjectRef;
}

impl<T: Object> SharedExt for Shared<T> {
    fn as_object(&self) -> ObjectRef {
        self.clone()
    }
}

// ============================================================================
// ObjectCore
// ============================================================================

/// State every entity embeds: self handles, parent slot and owning scope.
pub struct ObjectCore {
    this: WeakObjectRef,
    this_any: Weak<dyn Any>,
    parent: Option<WeakObjectRef>,
    scope: Option<Rc<Scope>>,
}

impl ObjectCore {
    /// Builds the core from the handle produced by `Rc::new_cyclic`.
    pub(crate) fn new<T: Object>(this: &Weak<RefCell<T>>, scope: Option<Rc<Scope>>) -> Self {
        let this_any: Weak<dyn Any> = this.clone();
        let this: WeakObjectRef = this.clone();
        Self {
            this,
            this_any,
            parent: None,
            scope,
        }
    }

    pub fn parent(&self) -> Option<ObjectRef> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    pub fn is_attached(&self) -> bool {
        self.parent().is_some()
    }

    /// Whether the parent slot points at `candidate`.
    pub fn is_child_of(&self, candidate: &ObjectRef) -> bool {
        self.parent()
            .is_some_and(|parent| same_object(&parent, candidate))
    }

    pub fn scope(&self) -> Option<&Rc<Scope>> {
        self.scope.as_ref()
    }

    pub(crate) fn this(&self) -> Option<ObjectRef> {
        self.this.upgrade()
    }

    pub(crate) fn this_weak(&self) -> WeakObjectRef {
        self.this.clone()
    }

    pub(crate) fn this_any(&self) -> Option<Rc<dyn Any>> {
        self.this_any.upgrade()
    }

    pub(crate) fn set_parent(&mut self, parent: Option<WeakObjectRef>) {
        self.parent = parent;
    }

    /// Binds the object to `scope` unless it is already bound.
    pub(crate) fn bind_scope(&mut self, scope: &Rc<Scope>) {
        if self.scope.is_none() {
            self.scope = Some(Rc::clone(scope));
        }
    }
}

impl fmt::Debug for ObjectCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectCore")
            .field("attached", &self.is_attached())
            .field("scope", &self.scope.as_ref().map(|scope| scope.name()))
            .finish()
    }
}

// ============================================================================
// Handle helpers
// ============================================================================

/// Address of the allocation behind a handle, without trait-object metadata.
pub(crate) fn address<T: ?Sized>(handle: &Rc<T>) -> *const () {
    Rc::as_ptr(handle) as *const ()
}

/// Identity comparison of two type-erased handles.
pub fn same_object(a: &ObjectRef, b: &ObjectRef) -> bool {
    address(a) == address(b)
}

/// Recovers the typed handle behind a type-erased one.
pub fn downcast<T: Object>(object: &ObjectRef) -> Option<Shared<T>> {
    let any = object.borrow().core().this_any()?;
    any.downcast::<RefCell<T>>().ok()
}

// ============================================================================
// Attach protocol
// ============================================================================

/// Detaches `object` from `parent`.
///
/// # Errors
///
/// `NotAttached` unless `object` is currently attached to exactly `parent`.
pub fn detach_from(object: &ObjectRef, parent: &ObjectRef) -> Result<(), DataModelError> {
    let attached_here = object.borrow().core().is_child_of(parent);
    if !attached_here {
        let object = object.borrow();
        return Err(DataModelError::not_attached(object.class_name(), object.key()));
    }
    parent.borrow_mut().remove_child(object)?;
    tracing::debug!(
        class = object.borrow().class_name(),
        key = %object.borrow().key(),
        "detached object from parent"
    );
    Ok(())
}

/// Detaches `object` from its current parent.
///
/// Calling this on an unattached object is a reported failure, never a
/// silent no-op, and leaves the object untouched.
///
/// # Errors
///
/// `NotAttached` if `object` has no parent.
pub fn detach(object: &ObjectRef) -> Result<(), DataModelError> {
    let parent = object.borrow().parent();
    match parent {
        Some(parent) => detach_from(object, &parent),
        None => {
            let object = object.borrow();
            Err(DataModelError::not_attached(object.class_name(), object.key()))
        }
    }
}

/// Announces that `object` changed in place by asking its parent to emit
/// an update notification.
///
/// # Errors
///
/// `NotAttached` if `object` has no parent.
pub fn update(object: &ObjectRef) -> Result<(), DataModelError> {
    let Some(parent) = object.borrow().parent() else {
        let object = object.borrow();
        return Err(DataModelError::not_attached(object.class_name(), object.key()));
    };
    let parent = parent.borrow();
    parent.update_child(object)
}

/// Tears an object down: detaches it from its parent (if any), releases all
/// of its children and removes its identifier from the registry.
///
/// Released children keep their own registrations; they disappear from the
/// registry once the last handle to them is dropped.
pub fn destroy(object: &ObjectRef) -> Result<(), DataModelError> {
    if object.borrow().is_attached() {
        detach(object)?;
    }
    let released = object.borrow_mut().release_children();

    let (public_id, scope) = {
        let guard = object.borrow();
        (guard.public_id().cloned(), guard.core().scope().cloned())
    };
    if let (Some(public_id), Some(scope)) = (public_id, scope) {
        scope.registry().unregister_object(public_id.as_str(), object);
    }
    tracing::debug!(
        class = object.borrow().class_name(),
        key = %object.borrow().key(),
        released,
        "destroyed object"
    );
    Ok(())
}
