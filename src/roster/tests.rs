use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::topic::Topic;
use super::{MemoryRoster, Roster, watch};
use crate::subscriber::Subscriber;
use crate::subscriber::testing::Recorder;

fn as_dyn(recorder: &Arc<Recorder>) -> Arc<dyn Subscriber> {
    recorder.clone()
}

fn ids(subs: &[Arc<dyn Subscriber>]) -> Vec<String> {
    let mut ids: Vec<String> = subs.iter().map(|s| s.id()).collect();
    ids.sort();
    ids
}

#[test]
fn test_topic_subscribe_and_unsubscribe() {
    let recorder = as_dyn(&Recorder::new());
    let mut topic = Topic::new("cov");
    assert_eq!(topic.name, "cov");
    assert!(topic.is_empty());

    topic.subscribe("cov-1".to_string(), Arc::downgrade(&recorder));
    assert!(topic.contains("cov-1"));

    assert!(topic.unsubscribe("cov-1"));
    assert!(!topic.unsubscribe("cov-1"));
    assert!(topic.is_empty());
}

#[test]
fn test_topic_live_prunes_dropped_subscribers() {
    let kept = as_dyn(&Recorder::new());
    let dropped = as_dyn(&Recorder::new());
    let mut topic = Topic::new("cov");
    topic.subscribe("cov-1".to_string(), Arc::downgrade(&kept));
    topic.subscribe("cov-2".to_string(), Arc::downgrade(&dropped));
    drop(dropped);

    let (alive, gone) = topic.live();
    assert_eq!(alive.len(), 1);
    assert_eq!(gone, vec!["cov-2".to_string()]);
    assert_eq!(topic.len(), 1);
}

#[test]
fn test_subscribe_assigns_id() {
    let roster = MemoryRoster::new();
    let recorder = Recorder::new();

    let id = roster.subscribe("cov", &as_dyn(&recorder)).unwrap();

    assert_eq!(id.as_deref(), Some("cov-1"));
    assert_eq!(recorder.id(), "cov-1");
    assert_eq!(roster.count("cov"), 1);
}

#[test]
fn test_subscribe_with_empty_name_is_noop() {
    let roster = MemoryRoster::new();
    let recorder = Recorder::new();

    assert!(roster.subscribe("", &as_dyn(&recorder)).unwrap().is_none());
    assert_eq!(recorder.id(), "");
    assert!(roster.subscribers("").unwrap().is_empty());

    // no id was consumed
    let id = roster.subscribe("cov", &as_dyn(&recorder)).unwrap();
    assert_eq!(id.as_deref(), Some("cov-1"));
}

#[test]
fn test_counter_is_shared_across_names() {
    let roster = MemoryRoster::new();
    let recorder = Recorder::new();
    let sub = as_dyn(&recorder);

    assert_eq!(roster.subscribe("foo", &sub).unwrap().unwrap(), "foo-1");
    assert_eq!(roster.subscribe("bar", &sub).unwrap().unwrap(), "bar-2");
    assert_eq!(roster.subscribe("foo", &sub).unwrap().unwrap(), "foo-3");
}

#[test]
fn test_same_subscriber_many_subscriptions() {
    let roster = MemoryRoster::new();
    let recorder = Recorder::new();
    let sub = as_dyn(&recorder);

    roster.subscribe("cov", &sub).unwrap();
    roster.subscribe("cov", &sub).unwrap();

    assert_eq!(roster.subscribers("cov").unwrap().len(), 2);
}

#[test]
fn test_subscribers_unknown_name_is_empty() {
    let roster = MemoryRoster::new();
    assert!(roster.subscribers("nothing").unwrap().is_empty());
}

#[test]
fn test_subscribers_by_name() {
    let roster = MemoryRoster::new();
    let subs: Vec<Arc<Recorder>> = (0..4).map(|_| Recorder::new()).collect();

    roster.subscribe("foo", &as_dyn(&subs[0])).unwrap();
    roster.subscribe("bar", &as_dyn(&subs[1])).unwrap();
    roster.subscribe("foo", &as_dyn(&subs[2])).unwrap();
    roster.subscribe("bar", &as_dyn(&subs[3])).unwrap();

    assert_eq!(ids(&roster.subscribers("foo").unwrap()), vec!["foo-1", "foo-3"]);
    assert_eq!(ids(&roster.subscribers("bar").unwrap()), vec!["bar-2", "bar-4"]);
}

#[test]
fn test_subscribers_is_a_snapshot() {
    let roster = MemoryRoster::new();
    let first = Recorder::new();
    roster.subscribe("cov", &as_dyn(&first)).unwrap();

    let snapshot = roster.subscribers("cov").unwrap();
    let second = Recorder::new();
    roster.subscribe("cov", &as_dyn(&second)).unwrap();
    roster.unsubscribe("cov-1").unwrap();

    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id(), "cov-1");
}

#[test]
fn test_subscribe_then_unsubscribe_restores_count() {
    let roster = MemoryRoster::new();
    let existing = Recorder::new();
    roster.subscribe("cov", &as_dyn(&existing)).unwrap();
    let before = roster.count("cov");

    let recorder = Recorder::new();
    let id = roster.subscribe("cov", &as_dyn(&recorder)).unwrap().unwrap();
    roster.unsubscribe(&id).unwrap();

    assert_eq!(roster.count("cov"), before);
}

#[test]
fn test_unsubscribe_is_idempotent_and_ignores_unknown_ids() {
    let roster = MemoryRoster::new();
    let recorder = Recorder::new();
    let id = roster.subscribe("cov", &as_dyn(&recorder)).unwrap().unwrap();

    roster.unsubscribe(&id).unwrap();
    roster.unsubscribe(&id).unwrap();
    roster.unsubscribe("").unwrap();
    roster.unsubscribe("no-separator").unwrap();
    roster.unsubscribe("cov-999").unwrap();

    assert!(roster.subscribers("cov").unwrap().is_empty());
}

#[test]
fn test_names_containing_separator() {
    let roster = MemoryRoster::new();
    let recorder = Recorder::new();
    let id = roster
        .subscribe("build-finished", &as_dyn(&recorder))
        .unwrap()
        .unwrap();
    assert_eq!(id, "build-finished-1");

    assert_eq!(roster.subscribers("build-finished").unwrap().len(), 1);
    roster.unsubscribe(&id).unwrap();
    assert!(roster.subscribers("build-finished").unwrap().is_empty());
}

#[test]
fn test_ids_are_never_reused() {
    let roster = MemoryRoster::new();
    let recorder = Recorder::new();
    let sub = as_dyn(&recorder);
    let names = ["cov", "other", "build"];

    let mut seen = HashSet::new();
    for i in 0..1000 {
        let id = roster.subscribe(names[i % 3], &sub).unwrap().unwrap();
        if i % 2 == 0 {
            roster.unsubscribe(&id).unwrap();
        }
        assert!(seen.insert(id));
    }
    assert_eq!(seen.len(), 1000);
}

#[test]
fn test_separate_rosters_count_independently() {
    let first = MemoryRoster::new();
    let second = MemoryRoster::new();
    let recorder = Recorder::new();
    let sub = as_dyn(&recorder);

    first.subscribe("cov", &sub).unwrap();
    first.subscribe("cov", &sub).unwrap();
    assert_eq!(second.subscribe("cov", &sub).unwrap().unwrap(), "cov-1");
}

#[test]
fn test_dropped_subscriber_is_not_returned() {
    let roster = MemoryRoster::new();
    let kept = Recorder::new();
    roster.subscribe("cov", &as_dyn(&kept)).unwrap();
    {
        let transient = Recorder::new();
        roster.subscribe("cov", &as_dyn(&transient)).unwrap();
    }

    assert_eq!(ids(&roster.subscribers("cov").unwrap()), vec!["cov-1"]);
    assert_eq!(roster.count("cov"), 1);
}

#[test]
fn test_close_releases_everything() {
    let roster = MemoryRoster::new();
    let recorder = Recorder::new();
    let sub = as_dyn(&recorder);
    roster.subscribe("cov", &sub).unwrap();
    roster.subscribe("other", &sub).unwrap();

    roster.close().unwrap();

    assert!(roster.subscribers("cov").unwrap().is_empty());
    assert!(roster.subscribers("other").unwrap().is_empty());
    // the counter survives close
    assert_eq!(roster.subscribe("cov", &sub).unwrap().unwrap(), "cov-3");
}

#[test]
fn test_concurrent_subscribes_yield_distinct_ids() {
    let roster = Arc::new(MemoryRoster::new());
    let recorder = Recorder::new();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let roster = roster.clone();
            let sub = as_dyn(&recorder);
            std::thread::spawn(move || {
                (0..50)
                    .map(|_| roster.subscribe("cov", &sub).unwrap().unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(seen.insert(id));
        }
    }
    assert_eq!(seen.len(), 400);
    assert_eq!(roster.count("cov"), 400);
}

#[tokio::test]
async fn test_watch_unsubscribes_on_cancel() {
    let roster = Arc::new(MemoryRoster::new());
    let recorder = Recorder::new();
    let id = roster.subscribe("cov", &as_dyn(&recorder)).unwrap().unwrap();

    let token = CancellationToken::new();
    let watcher = tokio::spawn(watch(roster.clone(), id, token.clone()));

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(roster.count("cov"), 1);

    token.cancel();
    watcher.await.unwrap();
    assert_eq!(roster.count("cov"), 0);
}
