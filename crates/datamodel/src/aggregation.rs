//! Aggregation - ordered, owning child collection
//!
//! # Invariants
//!
//! - Every element's parent pointer refers to the holder of the aggregation.
//! - An element appears at most once, and no two elements share a key.
//! - Parent pointer and membership change together: no caller can observe
//!   a child whose parent disagrees with the container that lists it.
//!
//! A violated invariant means the graph was already corrupted; it is reported
//! as a panic rather than an error.

use std::fmt;
use std::rc::Rc;

use crate::error::DataModelError;
use crate::ids::{ObjectKey, PublicId};
use crate::notifier::{Notification, Operation};
use crate::object::{address, same_object, Class, Object, ObjectCore, ObjectRef, Shared, SharedExt};
use crate::scope::Scope;

/// The object owning an aggregation, as seen by the aggregation.
#[derive(Clone, Copy)]
pub(crate) struct Holder<'a> {
    core: &'a ObjectCore,
    public_id: &'a PublicId,
}

impl<'a> Holder<'a> {
    pub(crate) fn new(core: &'a ObjectCore, public_id: &'a PublicId) -> Self {
        Self { core, public_id }
    }

    fn emit(&self, operation: Operation, child: &dyn Object) {
        if let Some(scope) = self.core.scope() {
            scope.notify(Notification::new(operation, self.public_id.clone(), child));
        }
    }
}

pub struct Aggregation<T: Object + Class> {
    items: Vec<Shared<T>>,
}

impl<T: Object + Class> Aggregation<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    // =========================================================================
    // Read access
    // =========================================================================

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Shared<T>> {
        self.items.get(index).cloned()
    }

    /// Positional access.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` if `index >= len()`.
    pub fn at(&self, index: usize) -> Result<Shared<T>, DataModelError> {
        self.get(index)
            .ok_or_else(|| DataModelError::index_out_of_range(index, self.items.len()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shared<T>> {
        self.items.iter()
    }

    pub fn position(&self, child: &ObjectRef) -> Option<usize> {
        let target = address(child);
        self.items.iter().position(|item| address(item) == target)
    }

    pub fn contains(&self, child: &ObjectRef) -> bool {
        self.position(child).is_some()
    }

    /// Linear lookup by key.
    pub fn find(&self, key: &ObjectKey) -> Option<Shared<T>> {
        self.items
            .iter()
            .find(|item| item.borrow().key() == *key)
            .cloned()
    }

    /// Linear lookup by public identifier.
    pub fn find_public(&self, public_id: &str) -> Option<Shared<T>> {
        self.items
            .iter()
            .find(|item| {
                item.borrow()
                    .public_id()
                    .is_some_and(|id| id.as_str() == public_id)
            })
            .cloned()
    }

    // =========================================================================
    // Structural changes (through the holder)
    // =========================================================================

    /// Appends `child` and makes the holder its parent.
    ///
    /// Public children are registered in the holder's scope, or in their own
    /// scope when the holder is unbound. A child bound to a scope other than
    /// the holder's is rejected. A failed registration aborts the add before
    /// anything changes.
    pub(crate) fn add(&mut self, holder: Holder<'_>, child: Shared<T>) -> Result<(), DataModelError> {
        let object = child.as_object();
        let (class_name, key, attached) = {
            let guard = child.borrow();
            (guard.class_name(), guard.key(), guard.is_attached())
        };

        if let Some(index) = self.position(&object) {
            if !attached {
                invariant_violation(class_name, &key, "listed in a container but has no parent");
            }
            self.check_member(holder, &self.items[index]);
            return Err(DataModelError::already_attached(class_name, key));
        }
        if attached {
            return Err(DataModelError::already_attached(class_name, key));
        }
        if self.find(&key).is_some() {
            return Err(DataModelError::duplicate_key(class_name, key));
        }
        if !same_scope(holder.core.scope(), child.borrow().core().scope()) {
            return Err(DataModelError::foreign_scope(class_name, key));
        }

        register_child(holder, &child, &object)?;

        child
            .borrow_mut()
            .core_mut()
            .set_parent(Some(holder.core.this_weak()));
        self.items.push(child);

        tracing::debug!(
            parent = %holder.public_id,
            class = class_name,
            key = %key,
            "added child"
        );
        holder.emit(Operation::Add, &*object.borrow());
        Ok(())
    }

    /// Removes `child`, clearing its parent pointer.
    ///
    /// # Errors
    ///
    /// `NotMember` if `child` is not an element of this aggregation.
    pub(crate) fn remove(&mut self, holder: Holder<'_>, child: &ObjectRef) -> Result<Shared<T>, DataModelError> {
        match self.position(child) {
            Some(index) => self.remove_at(holder, index),
            None => {
                let child = child.borrow();
                Err(DataModelError::not_member(child.class_name(), child.key()))
            }
        }
    }

    /// Removes the element at `index`, preserving the order of the rest.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` if `index >= len()`.
    pub(crate) fn remove_at(&mut self, holder: Holder<'_>, index: usize) -> Result<Shared<T>, DataModelError> {
        if index >= self.items.len() {
            return Err(DataModelError::index_out_of_range(index, self.items.len()));
        }
        self.check_member(holder, &self.items[index]);

        let child = self.items.remove(index);
        child.borrow_mut().core_mut().set_parent(None);

        let guard = child.borrow();
        tracing::debug!(
            parent = %holder.public_id,
            class = guard.class_name(),
            key = %guard.key(),
            "removed child"
        );
        holder.emit(Operation::Remove, &*guard);
        drop(guard);
        Ok(child)
    }

    /// Removes the element addressed by `key`.
    ///
    /// # Errors
    ///
    /// `NotMember` if no element has that key.
    pub(crate) fn remove_by_key(&mut self, holder: Holder<'_>, key: &ObjectKey) -> Result<Shared<T>, DataModelError> {
        let index = self
            .items
            .iter()
            .position(|item| item.borrow().key() == *key);
        match index {
            Some(index) => self.remove_at(holder, index),
            None => Err(DataModelError::not_member(T::CLASS_NAME, key.clone())),
        }
    }

    /// Emits an update notification for `child`.
    ///
    /// # Errors
    ///
    /// `NotMember` if `child` is not an element of this aggregation.
    pub(crate) fn update(&self, holder: Holder<'_>, child: &ObjectRef) -> Result<(), DataModelError> {
        let Some(index) = self.position(child) else {
            let child = child.borrow();
            return Err(DataModelError::not_member(child.class_name(), child.key()));
        };
        self.check_member(holder, &self.items[index]);
        holder.emit(Operation::Update, &*child.borrow());
        Ok(())
    }

    /// Clears every element's parent pointer and empties the aggregation.
    pub(crate) fn release_all(&mut self) -> usize {
        let released = self.items.len();
        for child in self.items.drain(..) {
            child.borrow_mut().core_mut().set_parent(None);
        }
        released
    }

    fn check_member(&self, holder: Holder<'_>, child: &Shared<T>) {
        let guard = child.borrow();
        let owned = match (guard.parent(), holder.core.this()) {
            (Some(parent), Some(this)) => same_object(&parent, &this),
            _ => false,
        };
        if !owned {
            invariant_violation(guard.class_name(), &guard.key(), "parent pointer disagrees with container");
        }
    }
}

impl<T: Object + Class> Default for Aggregation<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Object + Class> fmt::Debug for Aggregation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> = self
            .items
            .iter()
            .map(|item| item.borrow().key().to_string())
            .collect();
        f.debug_struct("Aggregation").field("items", &keys).finish()
    }
}

fn register_child<T: Object>(holder: Holder<'_>, child: &Shared<T>, object: &ObjectRef) -> Result<(), DataModelError> {
    let (public_id, own_scope) = {
        let guard = child.borrow();
        (guard.public_id().cloned(), guard.core().scope().cloned())
    };
    let Some(public_id) = public_id else {
        return Ok(());
    };
    let Some(scope) = holder.core.scope().cloned().or(own_scope) else {
        return Ok(());
    };
    if !scope.registration_enabled() {
        return Ok(());
    }
    scope.registry().register(&public_id, object)?;
    child.borrow_mut().core_mut().bind_scope(&scope);
    Ok(())
}

/// True unless both sides are bound and the scopes differ.
fn same_scope(holder: Option<&Rc<Scope>>, child: Option<&Rc<Scope>>) -> bool {
    match (holder, child) {
        (Some(holder), Some(child)) => Rc::ptr_eq(holder, child),
        _ => true,
    }
}

fn invariant_violation(class_name: &str, key: &ObjectKey, what: &str) -> ! {
    tracing::error!(class = class_name, key = %key, "single-parent invariant violated: {}", what);
    panic!("single-parent invariant violated for {} {}: {}", class_name, key, what);
}
