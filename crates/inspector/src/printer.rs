//! Indented text rendering of an object tree

use std::fmt::Write;

use seisdm_datamodel::{Object, Visitor};

/// Renders one line per object, children indented below their parent.
///
/// Scalars are shown as `key=value` pairs taken from the object snapshot.
#[derive(Debug, Default)]
pub struct TreePrinter {
    depth: usize,
    output: String,
    objects: usize,
}

impl TreePrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects rendered so far.
    pub fn objects(&self) -> usize {
        self.objects
    }

    pub fn into_output(self) -> String {
        self.output
    }

    fn line(&mut self, object: &dyn Object) {
        let indent = "  ".repeat(self.depth);
        let _ = write!(self.output, "{indent}{} {}", object.class_name(), object.key());

        if let serde_json::Value::Object(fields) = object.snapshot() {
            for (name, value) in fields {
                match value {
                    serde_json::Value::Null => {}
                    serde_json::Value::String(text) if text.is_empty() => {}
                    serde_json::Value::String(text) => {
                        let _ = write!(self.output, " {name}={text:?}");
                    }
                    other => {
                        let _ = write!(self.output, " {name}={other}");
                    }
                }
            }
        }
        self.output.push('\n');
        self.objects += 1;
    }
}

impl Visitor for TreePrinter {
    fn visit(&mut self, object: &dyn Object) -> bool {
        self.line(object);
        self.depth += 1;
        true
    }

    fn visit_leaf(&mut self, object: &dyn Object) {
        self.line(object);
    }

    fn finished(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
