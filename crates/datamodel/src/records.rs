//! Serde records for documents
//!
//! Records are plain, owned snapshots of a tree: they are what codecs read
//! and write. Turning a record back into objects always goes through the
//! factories and container adds, so a loaded document obeys exactly the same
//! registration and single-parent rules as one built by hand.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::entities::{
    Comment, CommentAttributes, Config, Parameter, ParameterAttributes, ParameterSet,
    ParameterSetAttributes,
};
use crate::error::DataModelError;
use crate::ids::PublicId;
use crate::object::{PublicObject, Shared};
use crate::scope::Scope;

/// A comment has no identity of its own, so its record is its attributes.
pub type CommentRecord = CommentAttributes;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRecord {
    #[serde(rename = "publicID")]
    pub public_id: PublicId,
    #[serde(default)]
    pub parameter_sets: Vec<ParameterSetRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSetRecord {
    #[serde(rename = "publicID")]
    pub public_id: PublicId,
    #[serde(flatten)]
    pub attributes: ParameterSetAttributes,
    #[serde(default)]
    pub parameters: Vec<ParameterRecord>,
    #[serde(default)]
    pub comments: Vec<CommentRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterRecord {
    #[serde(rename = "publicID")]
    pub public_id: PublicId,
    #[serde(flatten)]
    pub attributes: ParameterAttributes,
    #[serde(default)]
    pub comments: Vec<CommentRecord>,
}

// =============================================================================
// Object -> record
// =============================================================================

impl From<&Config> for ConfigRecord {
    fn from(config: &Config) -> Self {
        Self {
            public_id: config.id().clone(),
            parameter_sets: config
                .parameter_sets()
                .iter()
                .map(|set| ParameterSetRecord::from(&*set.borrow()))
                .collect(),
        }
    }
}

impl From<&ParameterSet> for ParameterSetRecord {
    fn from(set: &ParameterSet) -> Self {
        Self {
            public_id: set.id().clone(),
            attributes: set.attributes().clone(),
            parameters: set
                .parameters()
                .iter()
                .map(|parameter| ParameterRecord::from(&*parameter.borrow()))
                .collect(),
            comments: set
                .comments()
                .iter()
                .map(|comment| comment.borrow().attributes().clone())
                .collect(),
        }
    }
}

impl From<&Parameter> for ParameterRecord {
    fn from(parameter: &Parameter) -> Self {
        Self {
            public_id: parameter.id().clone(),
            attributes: parameter.attributes().clone(),
            comments: parameter
                .comments()
                .iter()
                .map(|comment| comment.borrow().attributes().clone())
                .collect(),
        }
    }
}

// =============================================================================
// Record -> objects
// =============================================================================

impl ConfigRecord {
    /// Builds the document in `scope`.
    ///
    /// # Errors
    ///
    /// Any registration or container error; objects built before the failure
    /// are dropped and vanish from the registry.
    pub fn build(&self, scope: &Rc<Scope>) -> Result<Shared<Config>, DataModelError> {
        let config = Config::create_with_id(scope, self.public_id.clone())?;
        for record in &self.parameter_sets {
            let set = record.build(scope)?;
            config.borrow_mut().add_parameter_set(set)?;
        }
        tracing::debug!(
            scope = scope.name(),
            public_id = %self.public_id,
            parameter_sets = self.parameter_sets.len(),
            "built config from record"
        );
        Ok(config)
    }
}

impl ParameterSetRecord {
    pub fn build(&self, scope: &Rc<Scope>) -> Result<Shared<ParameterSet>, DataModelError> {
        let set = ParameterSet::create_with_id(scope, self.public_id.clone())?;
        set.borrow_mut().set_attributes(self.attributes.clone());
        for record in &self.parameters {
            let parameter = record.build(scope)?;
            set.borrow_mut().add_parameter(parameter)?;
        }
        for record in &self.comments {
            set.borrow_mut()
                .add_comment(Comment::from_attributes(record.clone()))?;
        }
        Ok(set)
    }
}

impl ParameterRecord {
    pub fn build(&self, scope: &Rc<Scope>) -> Result<Shared<Parameter>, DataModelError> {
        let parameter = Parameter::create_with_id(scope, self.public_id.clone())?;
        parameter.borrow_mut().set_attributes(self.attributes.clone());
        for record in &self.comments {
            parameter
                .borrow_mut()
                .add_comment(Comment::from_attributes(record.clone()))?;
        }
        Ok(parameter)
    }
}
