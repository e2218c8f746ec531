use super::sample_document;
use crate::object::Object;
use crate::scope::Scope;
use crate::visitor::{Traversal, Visitor};

/// Records every callback as a short string.
#[derive(Default)]
struct Recorder {
    traversal: Traversal,
    skip: Option<&'static str>,
    log: Vec<String>,
}

impl Recorder {
    fn label(object: &dyn Object) -> String {
        match object.public_id() {
            Some(id) => id.to_string(),
            None => format!("#{}", object.key()),
        }
    }
}

impl Visitor for Recorder {
    fn traversal(&self) -> Traversal {
        self.traversal
    }

    fn visit(&mut self, object: &dyn Object) -> bool {
        let label = Self::label(object);
        let descend = self.skip != Some(label.as_str());
        self.log.push(label);
        descend
    }

    fn visit_leaf(&mut self, object: &dyn Object) {
        self.log.push(Self::label(object));
    }

    fn finished(&mut self) {
        self.log.push("end".to_string());
    }
}

#[test]
fn top_down_reports_parents_first_in_insertion_order() {
    let scope = Scope::with_defaults("doc");
    let config = sample_document(&scope);
    let mut recorder = Recorder::default();

    config.borrow().accept(&mut recorder);

    assert_eq!(
        recorder.log,
        [
            "Config/1", "PS/1", "Par/1", "end", "Par/2", "end", "#c1", "end", "PS/2", "end",
            "end"
        ]
    );
}

#[test]
fn bottom_up_reports_children_first() {
    let scope = Scope::with_defaults("doc");
    let config = sample_document(&scope);
    let mut recorder = Recorder {
        traversal: Traversal::BottomUp,
        ..Recorder::default()
    };

    config.borrow().accept(&mut recorder);

    assert_eq!(
        recorder.log,
        ["Par/1", "Par/2", "#c1", "PS/1", "PS/2", "Config/1"]
    );
}

#[test]
fn rejecting_a_visit_prunes_the_subtree() {
    let scope = Scope::with_defaults("doc");
    let config = sample_document(&scope);
    let mut recorder = Recorder {
        skip: Some("PS/1"),
        ..Recorder::default()
    };

    config.borrow().accept(&mut recorder);

    assert_eq!(recorder.log, ["Config/1", "PS/1", "PS/2", "end", "end"]);
}
