//! Seisdm data model
//!
//! Public-object identity, single-parent ownership trees and change
//! notification for seismological parameter configurations.
//!
//! The graph is single threaded (`Rc`/`RefCell`); notifications are plain
//! records and may cross to other tasks through a [`ChannelNotifier`].

pub mod aggregation;
pub mod config;
pub mod entities;
pub mod error;
pub mod ids;
pub mod notifier;
pub mod object;
pub mod records;
pub mod registry;
pub mod scope;
pub mod visitor;

#[cfg(test)]
mod tests;

pub use aggregation::Aggregation;
pub use config::ModelConfig;
pub use error::DataModelError;
pub use registry::Registry;
pub use scope::Scope;

// Re-export entities
pub use entities::{
    Comment, CommentAttributes, Config, Parameter, ParameterAttributes, ParameterSet,
    ParameterSetAttributes,
};

// Re-export identifier types
pub use ids::{CommentIndex, IdGenerator, ObjectKey, PublicId};

// Re-export notification types
pub use notifier::{
    ChannelNotifier, Notification, NotificationBuffer, Notifier, NotifyError, Operation,
};

// Re-export the object protocol
pub use object::{
    destroy, detach, detach_from, downcast, same_object, update, Attach, Class, Object,
    ObjectCore, ObjectRef, PublicObject, Shared, SharedExt, WeakObjectRef,
};

pub use records::{CommentRecord, ConfigRecord, ParameterRecord, ParameterSetRecord};
pub use visitor::{Traversal, Visitor};
