use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::tempdir;
use tokio::sync::mpsc;
use tungstenite::protocol::Message as WsMessage;

use super::*;
use crate::broker::{Broker, MemoryBroker};
use crate::cache::{Cache, MemoryCache};
use crate::emailer::Emailer;
use crate::event::{Coverage, EVENT_COVERAGE, GithubEvent, Message};
use crate::persistence::{Repo, SledRepo};
use crate::transport::message::ServerMessage;
use crate::utils::error::EmailError;

#[derive(Default)]
struct OutboxEmailer {
    sent: Mutex<Vec<(String, String, Vec<String>)>>,
}

#[async_trait]
impl Emailer for OutboxEmailer {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        recipients: &[String],
    ) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push((
            subject.to_string(),
            body.to_string(),
            recipients.to_vec(),
        ));
        Ok(())
    }
}

fn github_event() -> Event {
    Event::Github(GithubEvent {
        event: "push".to_string(),
        repository: "fluxy/covbus".to_string(),
        commit: "abc123".to_string(),
        coverage: vec![
            Coverage::new("covbus/cache", 70, "t1"),
            Coverage::new("covbus/event", 100, "t1"),
        ],
        ..GithubEvent::default()
    })
}

fn unrelated_event() -> Event {
    Event::Message(Message::new("deploys", "rolled out"))
}

#[test]
fn test_identity_starts_empty_and_updates() {
    let identity = Identity::default();
    assert_eq!(identity.get(), "");
    identity.set("cov-7");
    assert_eq!(identity.get(), "cov-7");
}

#[tokio::test]
async fn test_repo_writer_saves_coverage() {
    let dir = tempdir().unwrap();
    let repo = Arc::new(SledRepo::open(dir.path().to_str().unwrap()).unwrap());
    let writer = RepoWriter::new(repo.clone());

    writer.notify(&github_event()).await.unwrap();

    let saved = repo.load().unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].pkg, "covbus/cache");
}

#[tokio::test]
async fn test_repo_writer_rejects_other_events() {
    let dir = tempdir().unwrap();
    let repo = Arc::new(SledRepo::open(dir.path().to_str().unwrap()).unwrap());
    let writer = RepoWriter::new(repo);

    let err = writer.notify(&unrelated_event()).await.unwrap_err();
    assert!(matches!(
        err,
        NotifyError::UnsupportedEvent { kind: "message", .. }
    ));
}

#[tokio::test]
async fn test_cache_writer_resets_cache() {
    let cache = Arc::new(MemoryCache::new());
    cache.reset(&[Coverage::new("stale", 1, "t0")]).unwrap();
    let writer = CacheWriter::new(cache.clone());

    writer.notify(&github_event()).await.unwrap();

    assert_eq!(cache.keys().unwrap(), vec!["covbus/cache", "covbus/event"]);
    assert!(cache.get("stale").is_none());
}

#[tokio::test]
async fn test_cache_writer_rejects_other_events() {
    let writer = CacheWriter::new(Arc::new(MemoryCache::new()));
    let cov = Event::Coverage(Coverage::new("pkg", 1, "t"));
    assert!(matches!(
        writer.notify(&cov).await,
        Err(NotifyError::UnsupportedEvent { .. })
    ));
}

#[tokio::test]
async fn test_cache_writer_reports_closed_cache() {
    let cache = Arc::new(MemoryCache::new());
    cache.close().unwrap();
    let writer = CacheWriter::new(cache);

    assert!(matches!(
        writer.notify(&github_event()).await,
        Err(NotifyError::Cache(_))
    ));
}

#[tokio::test]
async fn test_coverage_splitter_publishes_one_event_per_package() {
    let broker = Arc::new(MemoryBroker::new());
    let mut listener = broker.listen().await.unwrap();
    let splitter = CoverageSplitter::new(broker.clone());

    splitter.notify(&github_event()).await.unwrap();

    let first = listener.try_recv().unwrap();
    let second = listener.try_recv().unwrap();
    assert!(listener.try_recv().is_none());
    assert_eq!(first.name(), EVENT_COVERAGE);
    assert_eq!(*first, Event::Coverage(Coverage::new("covbus/cache", 70, "t1")));
    assert_eq!(*second, Event::Coverage(Coverage::new("covbus/event", 100, "t1")));
}

#[tokio::test]
async fn test_coverage_splitter_rejects_other_events() {
    let splitter = CoverageSplitter::new(Arc::new(MemoryBroker::new()));
    assert!(matches!(
        splitter.notify(&unrelated_event()).await,
        Err(NotifyError::UnsupportedEvent { .. })
    ));
}

#[tokio::test]
async fn test_email_notifier_sends_name_and_body() {
    let mailer = Arc::new(OutboxEmailer::default());
    let notifier = EmailNotifier::new(mailer.clone(), "dev@example.com");
    let event = Event::Coverage(Coverage::new("covbus/cache", 70, "t1"));

    notifier.notify(&event).await.unwrap();

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, EVENT_COVERAGE);
    assert_eq!(sent[0].1, "pkg: covbus/cache; percentage: 70; time: t1");
    assert_eq!(sent[0].2, vec!["dev@example.com".to_string()]);
}

#[tokio::test]
async fn test_email_notifier_requires_recipient() {
    let mailer = Arc::new(OutboxEmailer::default());
    let notifier = EmailNotifier::new(mailer.clone(), "");

    assert!(matches!(
        notifier.notify(&unrelated_event()).await,
        Err(NotifyError::EmptyRecipient)
    ));
    assert!(mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_stream_writer_frames_event() {
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();
    let writer = StreamWriter::new("client-1", tx);
    assert_eq!(writer.client_id(), "client-1");

    let event = Event::Coverage(Coverage::new("covbus/cache", 70, "t1"));
    writer.notify(&event).await.unwrap();

    let WsMessage::Text(text) = rx.try_recv().unwrap() else {
        panic!("Expected a text message");
    };
    let frame: ServerMessage = serde_json::from_str(&text).unwrap();
    match frame {
        ServerMessage::Event { name, data } => {
            assert_eq!(name, EVENT_COVERAGE);
            assert_eq!(data, "pkg: covbus/cache; percentage: 70; time: t1");
        }
        other => panic!("Expected an event frame, got {other:?}"),
    }
}

#[tokio::test]
async fn test_stream_writer_reports_disconnected_client() {
    let (tx, rx) = mpsc::unbounded_channel::<WsMessage>();
    let writer = StreamWriter::new("client-1", tx);
    drop(rx);

    assert!(matches!(
        writer.notify(&unrelated_event()).await,
        Err(NotifyError::StreamClosed)
    ));
}

#[tokio::test]
async fn test_set_id_is_visible_through_id() {
    let writer = CacheWriter::new(Arc::new(MemoryCache::new()));
    writer.set_id("EVENT_GITHUB-3");
    assert_eq!(writer.id(), "EVENT_GITHUB-3");
}
