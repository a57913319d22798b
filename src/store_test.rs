use std::cell::RefCell;
use std::rc::Rc;

use super::*;

type Log = Rc<RefCell<Vec<StoreEvent<String>>>>;

fn recording_store() -> (Store<String, i32>, Log) {
    let mut store = Store::new();
    let log: Log = Rc::default();
    let sink = Rc::clone(&log);
    store.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    (store, log)
}

fn key(s: &str) -> String {
    s.to_owned()
}

#[test]
fn add_then_get() {
    let mut store = Store::new();
    assert!(store.add(key("a"), 1).is_none());
    assert_eq!(store.get(&key("a")), Some(&1));
    assert_eq!(store.len(), 1);
    assert!(store.contains(&key("a")));
}

#[test]
fn add_replaces_and_returns_previous() {
    let mut store = Store::new();
    store.add(key("a"), 1);
    assert_eq!(store.add(key("a"), 2), Some(1));
    assert_eq!(store.get(&key("a")), Some(&2));
    assert_eq!(store.len(), 1);
}

#[test]
fn get_missing_is_none() {
    let store: Store<String, i32> = Store::new();
    assert!(store.get(&key("nope")).is_none());
    assert!(store.is_empty());
}

#[test]
fn get_all_is_in_key_order() {
    let mut store = Store::new();
    store.add(key("c"), 3);
    store.add(key("a"), 1);
    store.add(key("b"), 2);
    assert_eq!(store.get_all(), vec![&1, &2, &3]);
    assert_eq!(store.keys(), vec![key("a"), key("b"), key("c")]);
}

#[test]
fn remove_returns_value() {
    let mut store = Store::new();
    store.add(key("a"), 1);
    assert_eq!(store.remove(&key("a")), Some(1));
    assert!(store.remove(&key("a")).is_none());
    assert!(store.is_empty());
}

#[test]
fn subscribers_see_every_mutation_in_order() {
    let (mut store, log) = recording_store();
    store.add(key("a"), 1);
    store.add(key("a"), 2);
    store.update(&key("a"), |v| *v += 1);
    store.remove(&key("a"));
    store.clear();
    assert_eq!(
        *log.borrow(),
        vec![
            StoreEvent::Added(key("a")),
            StoreEvent::Updated(key("a")),
            StoreEvent::Updated(key("a")),
            StoreEvent::Removed(key("a")),
            StoreEvent::Cleared,
        ]
    );
}

#[test]
fn update_missing_does_not_notify() {
    let (mut store, log) = recording_store();
    assert!(store.update(&key("ghost"), |v| *v += 1).is_none());
    assert!(store.remove(&key("ghost")).is_none());
    assert!(log.borrow().is_empty());
}

#[test]
fn update_returns_closure_result() {
    let mut store = Store::new();
    store.add(key("a"), 10);
    assert_eq!(store.update(&key("a"), |v| *v * 2), Some(20));
}

#[test]
fn unsubscribe_stops_notifications() {
    let mut store: Store<String, i32> = Store::new();
    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    let id = store.subscribe(move |_| *sink.borrow_mut() += 1);
    store.add(key("a"), 1);
    assert!(store.unsubscribe(id));
    assert!(!store.unsubscribe(id));
    store.add(key("b"), 2);
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn subscribers_run_in_registration_order() {
    let mut store: Store<String, i32> = Store::new();
    let order = Rc::new(RefCell::new(Vec::new()));
    for n in 0..3 {
        let sink = Rc::clone(&order);
        store.subscribe(move |_| sink.borrow_mut().push(n));
    }
    store.add(key("a"), 1);
    assert_eq!(*order.borrow(), vec![0, 1, 2]);
}

#[test]
fn debug_reports_subscriber_count() {
    let (store, _log) = recording_store();
    let s = format!("{store:?}");
    assert!(s.contains("subscribers: 1"));
}
