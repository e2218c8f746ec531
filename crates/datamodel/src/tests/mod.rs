//! Cross-module behaviour of the object graph: identity, ownership,
//! notification and traversal working together.

mod notifications;
mod traversal;

use std::rc::Rc;

use crate::entities::{Config, Parameter, ParameterSet};
use crate::ids::PublicId;
use crate::object::Shared;
use crate::scope::Scope;

fn pid(value: &str) -> PublicId {
    PublicId::new(value).unwrap()
}

fn parameter_set(scope: &Rc<Scope>, id: &str) -> Shared<ParameterSet> {
    ParameterSet::create_with_id(scope, pid(id)).unwrap()
}

fn parameter(scope: &Rc<Scope>, id: &str, name: &str) -> Shared<Parameter> {
    let parameter = Parameter::create_with_id(scope, pid(id)).unwrap();
    parameter.borrow_mut().set_name(name);
    parameter
}

/// `Config/1` holding `PS/1` (parameters `Par/1`, `Par/2`, comment `c1`)
/// and an empty `PS/2`.
fn sample_document(scope: &Rc<Scope>) -> Shared<Config> {
    use crate::entities::Comment;

    let config = Config::create_with_id(scope, pid("Config/1")).unwrap();
    let first = parameter_set(scope, "PS/1");
    first
        .borrow_mut()
        .add_parameter(parameter(scope, "Par/1", "detector"))
        .unwrap();
    first
        .borrow_mut()
        .add_parameter(parameter(scope, "Par/2", "filter"))
        .unwrap();
    first
        .borrow_mut()
        .add_comment(Comment::new("c1", "initial import"))
        .unwrap();
    config.borrow_mut().add_parameter_set(first).unwrap();
    config
        .borrow_mut()
        .add_parameter_set(parameter_set(scope, "PS/2"))
        .unwrap();
    config
}
