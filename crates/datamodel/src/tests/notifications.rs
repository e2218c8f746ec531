use std::rc::Rc;

use super::{parameter, parameter_set, pid, sample_document};
use crate::entities::{Comment, Parameter};
use crate::error::DataModelError;
use crate::ids::{CommentIndex, ObjectKey};
use crate::notifier::{ChannelNotifier, MockNotifier, NotificationBuffer, NotifyError, Operation};
use crate::object::{destroy, detach, update, Attach, Object, SharedExt};
use crate::scope::Scope;

fn buffered_scope() -> (Rc<Scope>, Rc<NotificationBuffer>) {
    let scope = Scope::with_defaults("doc");
    let buffer = Rc::new(NotificationBuffer::new());
    scope.set_notifier(buffer.clone());
    (scope, buffer)
}

#[test]
fn add_update_remove_are_published_in_order() {
    let (scope, buffer) = buffered_scope();
    let set = parameter_set(&scope, "PS/1");
    let parameter = parameter(&scope, "Par/1", "gain");

    set.borrow_mut().add_parameter(Rc::clone(&parameter)).unwrap();
    parameter.borrow_mut().set_value(Some("4".to_string()));
    update(&parameter.as_object()).unwrap();
    Parameter::detach(&parameter).unwrap();

    let events = buffer.drain();
    let operations: Vec<Operation> = events.iter().map(|event| event.operation).collect();
    assert_eq!(operations, [Operation::Add, Operation::Update, Operation::Remove]);
    for event in &events {
        assert_eq!(event.parent_id, pid("PS/1"));
        assert_eq!(event.class_name, "Parameter");
        assert_eq!(event.key, ObjectKey::Public(pid("Par/1")));
    }
    assert!(events[0].payload.get("value").is_none());
    assert_eq!(events[1].payload["value"], "4");
}

#[test]
fn setters_alone_do_not_notify() {
    let (scope, buffer) = buffered_scope();
    let set = parameter_set(&scope, "PS/1");
    let parameter = parameter(&scope, "Par/1", "gain");
    set.borrow_mut().add_parameter(Rc::clone(&parameter)).unwrap();
    buffer.drain();

    parameter.borrow_mut().set_name("renamed");
    set.borrow_mut().set_module_id("scautopick");

    assert!(buffer.is_empty());
}

#[test]
fn comment_events_carry_comment_index() {
    let (scope, buffer) = buffered_scope();
    let set = parameter_set(&scope, "PS/1");

    set.borrow_mut()
        .add_comment(Comment::new("c1", "hello"))
        .unwrap();
    set.borrow_mut()
        .remove_comment_by_index(&CommentIndex::new("c1"))
        .unwrap();

    let events = buffer.drain();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].key, ObjectKey::Comment(CommentIndex::new("c1")));
    assert_eq!(events[1].operation, Operation::Remove);
}

#[test]
fn update_child_rejects_non_members_silently() {
    let (scope, buffer) = buffered_scope();
    let set = parameter_set(&scope, "PS/1");
    let other = parameter_set(&scope, "PS/2");
    let elsewhere = parameter(&scope, "Par/1", "gain");
    other.borrow_mut().add_parameter(Rc::clone(&elsewhere)).unwrap();
    let loose = parameter(&scope, "Par/2", "filter");
    buffer.drain();

    for child in [&elsewhere, &loose] {
        let err = set.borrow().update_child(&child.as_object()).unwrap_err();
        assert!(matches!(err, DataModelError::NotMember { class_name: "Parameter", .. }));
    }
    assert!(buffer.is_empty());
}

#[test]
fn failed_operations_publish_nothing() {
    let (scope, buffer) = buffered_scope();
    let first = parameter_set(&scope, "PS/1");
    let second = parameter_set(&scope, "PS/2");
    let parameter = parameter(&scope, "Par/1", "gain");
    first.borrow_mut().add_parameter(Rc::clone(&parameter)).unwrap();
    buffer.drain();

    assert!(second.borrow_mut().add_parameter(Rc::clone(&parameter)).is_err());
    assert!(second.borrow_mut().remove_parameter(&parameter).is_err());
    assert!(second.borrow_mut().remove_parameter_at(3).is_err());

    assert!(buffer.is_empty());
}

#[test]
fn destroy_publishes_only_the_detach() {
    let (scope, buffer) = buffered_scope();
    let config = sample_document(&scope);
    buffer.drain();

    let set = config.borrow().find_parameter_set("PS/1").unwrap();
    destroy(&set.as_object()).unwrap();

    let events = buffer.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].operation, Operation::Remove);
    assert_eq!(events[0].parent_id, pid("Config/1"));
}

#[test]
fn disabled_notifications_are_dropped() {
    let (scope, buffer) = buffered_scope();
    scope.set_notifications_enabled(false);

    let set = parameter_set(&scope, "PS/1");
    set.borrow_mut()
        .add_parameter(parameter(&scope, "Par/1", "gain"))
        .unwrap();

    assert!(buffer.is_empty());
}

#[test]
fn notifier_failure_does_not_roll_back() {
    let scope = Scope::with_defaults("doc");
    let mut notifier = MockNotifier::new();
    notifier
        .expect_notify()
        .times(2)
        .returning(|_| Err(NotifyError::Rejected("downstream offline".to_string())));
    scope.set_notifier(Rc::new(notifier));

    let set = parameter_set(&scope, "PS/1");
    let parameter = parameter(&scope, "Par/1", "gain");

    set.borrow_mut().add_parameter(Rc::clone(&parameter)).unwrap();
    assert!(parameter.borrow().core().is_attached());

    detach(&parameter.as_object()).unwrap();
    assert_eq!(set.borrow().parameter_count(), 0);
}

#[test]
fn full_buffer_is_reported_but_change_stands() {
    let scope = Scope::with_defaults("doc");
    let buffer = Rc::new(NotificationBuffer::with_capacity(1));
    scope.set_notifier(buffer.clone());

    let set = parameter_set(&scope, "PS/1");
    set.borrow_mut().add_comment(Comment::new("a", "one")).unwrap();
    set.borrow_mut().add_comment(Comment::new("b", "two")).unwrap();

    assert_eq!(set.borrow().comment_count(), 2);
    assert_eq!(buffer.len(), 1);
}

#[test]
fn unbound_holders_publish_nothing() {
    let mut notifier = MockNotifier::new();
    notifier.expect_notify().never();
    let scope = Scope::with_defaults("doc");
    scope.set_notifier(Rc::new(notifier));

    let set = crate::entities::ParameterSet::new(pid("PS/1"));
    set.borrow_mut().add_comment(Comment::new("a", "one")).unwrap();
    assert_eq!(set.borrow().comment_count(), 1);
}

#[tokio::test]
async fn channel_notifier_feeds_async_consumer() {
    let scope = Scope::with_defaults("doc");
    let (notifier, mut receiver) = ChannelNotifier::new();
    scope.set_notifier(Rc::new(notifier));

    let set = parameter_set(&scope, "PS/1");
    let comment = Comment::new("c1", "queued");
    Comment::attach_to(&comment, &set.as_object()).unwrap();

    let consumer = tokio::spawn(async move {
        let event = receiver.recv().await.expect("one event");
        (event.operation, event.payload["text"].clone())
    });
    let (operation, text) = consumer.await.unwrap();

    assert_eq!(operation, Operation::Add);
    assert_eq!(text, "queued");
}

#[tokio::test]
async fn closed_channel_is_tolerated() {
    let scope = Scope::with_defaults("doc");
    let (notifier, receiver) = ChannelNotifier::new();
    drop(receiver);
    scope.set_notifier(Rc::new(notifier));

    let set = parameter_set(&scope, "PS/1");
    set.borrow_mut()
        .add_comment(Comment::new("c1", "nobody listens"))
        .unwrap();

    assert_eq!(set.borrow().comment_count(), 1);
}
