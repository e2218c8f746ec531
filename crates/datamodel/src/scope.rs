//! Scope - one in-memory document
//!
//! A scope bundles the identity registry, the notifier slot and the id
//! generator of one document. It is passed to factories explicitly, so
//! independent documents (and tests) never see each other's identifiers.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::config::ModelConfig;
use crate::error::DataModelError;
use crate::ids::{IdGenerator, PublicId};
use crate::notifier::{Notification, Notifier};
use crate::object::{Object, ObjectRef, Shared};
use crate::registry::Registry;

pub struct Scope {
    name: String,
    registry: Registry,
    notifier: RefCell<Option<Rc<dyn Notifier>>>,
    registration_enabled: Cell<bool>,
    notifications_enabled: Cell<bool>,
    ids: IdGenerator,
}

impl Scope {
    /// Create a scope from configuration.
    ///
    /// # Errors
    ///
    /// `Validation` if the configured id pattern is unusable.
    pub fn new(name: impl Into<String>, config: &ModelConfig) -> Result<Rc<Self>, DataModelError> {
        let ids = IdGenerator::new(config.id_pattern.clone())?;
        Ok(Rc::new(Self {
            name: name.into(),
            registry: Registry::new(),
            notifier: RefCell::new(None),
            registration_enabled: Cell::new(config.registration_enabled),
            notifications_enabled: Cell::new(config.notifications_enabled),
            ids,
        }))
    }

    /// Create a scope with the default configuration.
    pub fn with_defaults(name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            registry: Registry::new(),
            notifier: RefCell::new(None),
            registration_enabled: Cell::new(true),
            notifications_enabled: Cell::new(true),
            ids: IdGenerator::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Finds any live public object of this scope by identifier.
    pub fn find_by_identifier(&self, id: &str) -> Option<ObjectRef> {
        self.registry.find(id)
    }

    pub fn find_as<T: Object>(&self, id: &str) -> Option<Shared<T>> {
        self.registry.find_as::<T>(id)
    }

    // =========================================================================
    // Registration
    // =========================================================================

    pub fn registration_enabled(&self) -> bool {
        self.registration_enabled.get()
    }

    pub fn set_registration_enabled(&self, enabled: bool) {
        self.registration_enabled.set(enabled);
    }

    /// Generates a fresh identifier for an object of `class_name`.
    pub fn generate_id(&self, class_name: &str) -> PublicId {
        self.ids.generate(class_name)
    }

    /// Explicitly registers `object` (typically a clone) in this scope and
    /// binds it to the scope.
    ///
    /// Registers regardless of the registration switch: the caller asked.
    ///
    /// # Errors
    ///
    /// - `TypeMismatch` if the object carries no public identifier
    /// - `DuplicateIdentifier` if another live object owns its identifier
    pub fn register(self: &Rc<Self>, object: &ObjectRef) -> Result<(), DataModelError> {
        let public_id = {
            let guard = object.borrow();
            guard
                .public_id()
                .cloned()
                .ok_or_else(|| DataModelError::type_mismatch("PublicObject", guard.class_name()))?
        };
        self.registry.register(&public_id, object)?;
        object.borrow_mut().core_mut().bind_scope(self);
        Ok(())
    }

    /// Registers a freshly built object if registration is enabled.
    pub(crate) fn adopt(&self, public_id: &PublicId, object: &ObjectRef) -> Result<(), DataModelError> {
        if self.registration_enabled() {
            self.registry.register(public_id, object)?;
        }
        Ok(())
    }

    // =========================================================================
    // Notification
    // =========================================================================

    pub fn notifications_enabled(&self) -> bool {
        self.notifications_enabled.get()
    }

    pub fn set_notifications_enabled(&self, enabled: bool) {
        self.notifications_enabled.set(enabled);
    }

    pub fn set_notifier(&self, notifier: Rc<dyn Notifier>) {
        *self.notifier.borrow_mut() = Some(notifier);
    }

    pub fn clear_notifier(&self) {
        *self.notifier.borrow_mut() = None;
    }

    pub fn has_notifier(&self) -> bool {
        self.notifier.borrow().is_some()
    }

    /// Forwards `notification` to the notifier, fire-and-forget.
    ///
    /// A failing notifier is logged and otherwise ignored: the structural
    /// change that produced the notification stands.
    pub(crate) fn notify(&self, notification: Notification) {
        if !self.notifications_enabled() {
            return;
        }
        let Some(notifier) = self.notifier.borrow().clone() else {
            return;
        };
        let operation = notification.operation;
        let parent_id = notification.parent_id.clone();
        if let Err(err) = notifier.notify(notification) {
            tracing::warn!(
                scope = %self.name,
                %operation,
                parent = %parent_id,
                error = %err,
                "notifier rejected event"
            );
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("name", &self.name)
            .field("registered", &self.registry.len())
            .field("registration_enabled", &self.registration_enabled())
            .field("notifications_enabled", &self.notifications_enabled())
            .field("has_notifier", &self.has_notifier())
            .field("id_pattern", &self.ids.pattern())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Comment, ParameterSet};
    use crate::object::{same_object, SharedExt};

    #[test]
    fn new_rejects_unusable_pattern() {
        let config = ModelConfig {
            id_pattern: "@classname@".to_string(),
            ..ModelConfig::default()
        };
        assert!(Scope::new("doc", &config).is_err());
    }

    #[test]
    fn register_binds_unbound_object() {
        let scope = Scope::with_defaults("doc");
        let set = ParameterSet::new(PublicId::new("P1").unwrap());
        assert!(set.borrow().core().scope().is_none());

        scope.register(&set.as_object()).unwrap();

        assert!(set.borrow().core().scope().is_some());
        let found = scope.find_by_identifier("P1").unwrap();
        assert!(same_object(&found, &set.as_object()));
    }

    #[test]
    fn register_rejects_objects_without_identifier() {
        let scope = Scope::with_defaults("doc");
        let comment = Comment::new("note", "text");

        let err = scope.register(&comment.as_object()).unwrap_err();
        assert!(matches!(err, DataModelError::TypeMismatch { .. }));
    }

    #[test]
    fn separate_scopes_do_not_share_identifiers() {
        let first = Scope::with_defaults("first");
        let second = Scope::with_defaults("second");

        let a = ParameterSet::create_with_id(&first, PublicId::new("P1").unwrap()).unwrap();
        let b = ParameterSet::create_with_id(&second, PublicId::new("P1").unwrap()).unwrap();

        assert!(Rc::ptr_eq(&first.find_as::<ParameterSet>("P1").unwrap(), &a));
        assert!(Rc::ptr_eq(&second.find_as::<ParameterSet>("P1").unwrap(), &b));
    }

    #[test]
    fn debug_does_not_walk_objects() {
        let scope = Scope::with_defaults("doc");
        let rendered = format!("{:?}", scope);
        assert!(rendered.contains("doc"));
        assert!(rendered.contains("has_notifier: false"));
    }
}
