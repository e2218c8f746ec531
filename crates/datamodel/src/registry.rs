//! Identity registry - public identifier to live object lookup
//!
//! Entries are weak: the registry never keeps an object alive. An entry whose
//! object has been dropped is treated as absent and pruned on access.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::error::DataModelError;
use crate::ids::PublicId;
use crate::object::{downcast, same_object, Object, ObjectRef, Shared, WeakObjectRef};

/// Lookup table of the public objects of one scope.
///
/// Not internally synchronised: the handles it stores are `!Send`, so the
/// registry can only ever be used from the thread that owns the scope.
#[derive(Debug, Default)]
pub struct Registry {
    entries: RefCell<HashMap<PublicId, WeakObjectRef>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `object` under `id`.
    ///
    /// Re-registering the same object under the same id is a no-op; an entry
    /// left behind by a dropped object is replaced.
    ///
    /// # Errors
    ///
    /// `DuplicateIdentifier` if a different live object owns `id`.
    pub fn register(&self, id: &PublicId, object: &ObjectRef) -> Result<(), DataModelError> {
        let mut entries = self.entries.borrow_mut();
        if let Some(existing) = entries.get(id).and_then(Weak::upgrade) {
            if same_object(&existing, object) {
                return Ok(());
            }
            tracing::debug!(public_id = %id, "rejected duplicate public identifier");
            return Err(DataModelError::duplicate_identifier(id.clone()));
        }
        entries.insert(id.clone(), Rc::downgrade(object));
        tracing::debug!(public_id = %id, "registered public object");
        Ok(())
    }

    /// Looks up the live object registered under `id`.
    pub fn find(&self, id: &str) -> Option<ObjectRef> {
        let mut entries = self.entries.borrow_mut();
        match entries.get(id).map(Weak::upgrade) {
            Some(Some(object)) => Some(object),
            Some(None) => {
                entries.remove(id);
                None
            }
            None => None,
        }
    }

    /// Typed lookup: `None` if absent or registered with another type.
    pub fn find_as<T: Object>(&self, id: &str) -> Option<Shared<T>> {
        let object = self.find(id)?;
        downcast::<T>(&object)
    }

    /// Removes the entry for `id`. Returns whether a live entry was removed.
    pub fn unregister(&self, id: &str) -> bool {
        let removed = self.entries.borrow_mut().remove(id);
        let live = removed.is_some_and(|weak| weak.strong_count() > 0);
        if live {
            tracing::debug!(public_id = id, "unregistered public object");
        }
        live
    }

    /// Removes the entry for `id` only if it still maps to `object`.
    pub fn unregister_object(&self, id: &str, object: &ObjectRef) -> bool {
        let mut entries = self.entries.borrow_mut();
        let owned = entries
            .get(id)
            .and_then(Weak::upgrade)
            .is_some_and(|existing| same_object(&existing, object));
        if owned {
            entries.remove(id);
            tracing::debug!(public_id = id, "unregistered public object");
        }
        owned
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries
            .borrow()
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identifiers of all live entries, sorted.
    pub fn ids(&self) -> Vec<PublicId> {
        let mut ids: Vec<PublicId> = self
            .entries
            .borrow()
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Drops entries whose objects are gone. Returns the number removed.
    pub fn prune(&self) -> usize {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|_, weak| weak.strong_count() > 0);
        before - entries.len()
    }
}
