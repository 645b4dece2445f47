use super::*;

fn github_event() -> GithubEvent {
    GithubEvent {
        event: "push".to_string(),
        repository: "fluxy/covbus".to_string(),
        commit: "abc123".to_string(),
        git_ref: "refs/heads/main".to_string(),
        head: "main".to_string(),
        workflow: "ci".to_string(),
        coverage: vec![
            Coverage::new("covbus/broker", 81, "2024-03-01T10:00:00Z"),
            Coverage::new("covbus/roster", 94, "2024-03-01T10:00:01Z"),
        ],
    }
}

#[test]
fn test_event_names() {
    assert_eq!(Event::from(github_event()).name(), EVENT_GITHUB);
    assert_eq!(
        Event::from(Coverage::new("pkg", 50, "now")).name(),
        EVENT_COVERAGE
    );
    assert_eq!(Event::from(Message::new("cov", "hello")).name(), "cov");
}

#[test]
fn test_event_kinds() {
    assert_eq!(Event::from(github_event()).kind(), "github");
    assert_eq!(Event::from(Coverage::new("pkg", 1, "t")).kind(), "coverage");
    assert_eq!(Event::from(Message::new("x", "y")).kind(), "message");
}

#[test]
fn test_coverage_display() {
    let cov = Coverage::new("covbus/cache", 73, "2024-03-01");
    assert_eq!(cov.to_string(), "[2024-03-01] pkg = \"covbus/cache\" %73");
}

#[test]
fn test_coverage_event_display() {
    let ev = Event::from(Coverage::new("covbus/cache", 73, "2024-03-01"));
    assert_eq!(
        ev.to_string(),
        "pkg: covbus/cache; percentage: 73; time: 2024-03-01"
    );
}

#[test]
fn test_github_event_display() {
    let text = Event::from(github_event()).to_string();
    let expected = "Event = \"push\"\n\
                    Repository = \"fluxy/covbus\"\n\
                    Commit = \"abc123\"\n\
                    Ref = \"refs/heads/main\"\n\
                    Head = \"main\"\n\
                    Workflow = \"ci\"\n\
                    Coverage =\n\
                    [2024-03-01T10:00:00Z] pkg = \"covbus/broker\" %81\n\
                    [2024-03-01T10:00:01Z] pkg = \"covbus/roster\" %94\n";
    assert_eq!(text, expected);
}

#[test]
fn test_message_display_is_payload() {
    let ev = Event::from(Message::new("deploys", "api rolled out"));
    assert_eq!(ev.to_string(), "api rolled out");
}

#[test]
fn test_message_is_timestamped() {
    let before = chrono::Utc::now().timestamp_millis();
    let msg = Message::new("a", "b");
    assert!(msg.timestamp >= before);
}

#[test]
fn test_message_try_new_rejects_empty_name() {
    assert!(Message::try_new("", "b").is_none());
    let msg = Message::try_new("deploys", "b").unwrap();
    assert_eq!(msg.name, "deploys");
}

#[test]
fn test_github_event_serializes_ref_field() {
    let json = serde_json::to_value(github_event()).unwrap();
    assert_eq!(json["ref"], "refs/heads/main");
    assert_eq!(json["coverage"][1]["percentage"], 94);
}
