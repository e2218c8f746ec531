//! Concrete entities of the parameter model
//!
//! ```text
//! Config
//! └── ParameterSet*        (public)
//!     ├── Parameter*       (public)
//!     │   └── Comment*     (keyed by CommentIndex)
//!     └── Comment*
//! ```
//!
//! Each entity keeps its scalar attributes in a plain `…Attributes` struct.
//! That struct is what equality, assignment, cloning and notification
//! payloads operate on; aggregations are never part of it.

/// Type plumbing shared by every `impl Object` block.
macro_rules! object_plumbing {
    () => {
        fn class_name(&self) -> &'static str {
            <Self as $crate::object::Class>::CLASS_NAME
        }

        fn core(&self) -> &$crate::object::ObjectCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut $crate::object::ObjectCore {
            &mut self.core
        }

        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }
    };
}

/// `equals`/`assign`/`snapshot` for entities whose scalars live in `attributes`.
macro_rules! scalar_contract {
    () => {
        fn equals(&self, other: &dyn $crate::object::Object) -> bool {
            other
                .as_any()
                .downcast_ref::<Self>()
                .is_some_and(|other| self == other)
        }

        fn assign(
            &mut self,
            other: &dyn $crate::object::Object,
        ) -> Result<(), $crate::error::DataModelError> {
            let source = other.as_any().downcast_ref::<Self>().ok_or_else(|| {
                $crate::error::DataModelError::type_mismatch(
                    <Self as $crate::object::Class>::CLASS_NAME,
                    other.class_name(),
                )
            })?;
            self.attributes = source.attributes.clone();
            Ok(())
        }

        fn snapshot(&self) -> ::serde_json::Value {
            ::serde_json::to_value(&self.attributes).unwrap_or(::serde_json::Value::Null)
        }
    };
}

pub mod comment;
pub mod config;
pub mod parameter;
pub mod parameter_set;

pub use comment::{Comment, CommentAttributes};
pub use config::Config;
pub use parameter::{Parameter, ParameterAttributes};
pub use parameter_set::{ParameterSet, ParameterSetAttributes};
