//! Visitor hook
//!
//! Objects expose themselves and their children to a [`Visitor`]; what the
//! visitor does with them (printing, counting, serialising) is up to it.

use crate::aggregation::Aggregation;
use crate::object::{Class, Object};

/// Order in which a public object is reported relative to its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Traversal {
    /// Parent first; `visit` may prune the subtree
    #[default]
    TopDown,
    /// Children first
    BottomUp,
}

pub trait Visitor {
    fn traversal(&self) -> Traversal {
        Traversal::TopDown
    }

    /// Called for objects that can hold children. In top-down mode, returning
    /// `false` skips the object's children.
    fn visit(&mut self, object: &dyn Object) -> bool;

    /// Called for objects without children of their own.
    fn visit_leaf(&mut self, object: &dyn Object);

    /// Called after the children of a top-down visited object.
    fn finished(&mut self) {}
}

/// Reports `object` around `children` according to the visitor's traversal.
pub(crate) fn visit_composite(
    object: &dyn Object,
    visitor: &mut dyn Visitor,
    children: impl FnOnce(&mut dyn Visitor),
) {
    match visitor.traversal() {
        Traversal::TopDown => {
            if !visitor.visit(object) {
                return;
            }
            children(visitor);
            visitor.finished();
        }
        Traversal::BottomUp => {
            children(visitor);
            visitor.visit(object);
        }
    }
}

/// Hands every element of `aggregation` to `visitor` in insertion order.
pub(crate) fn visit_all<T: Object + Class>(aggregation: &Aggregation<T>, visitor: &mut dyn Visitor) {
    for child in aggregation.iter() {
        child.borrow().accept(visitor);
    }
}
