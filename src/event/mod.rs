//! The `event` module defines what travels through the broker.
//!
//! An [`Event`] is an immutable, named message. Its name is the key the
//! roster uses to find interested subscribers, and its `Display` output is
//! the human readable payload (email bodies, stream frames).
//!
//! Events are a closed set of variants rather than trait objects, so a
//! subscriber recovers the concrete payload with a `match` and reports
//! [`NotifyError::UnsupportedEvent`](crate::utils::error::NotifyError) for
//! the variants it does not handle.

mod coverage;
mod github;
mod message;

use std::fmt;

pub use coverage::Coverage;
pub use github::GithubEvent;
pub use message::Message;

/// Name of events carrying a CI run received from GitHub.
pub const EVENT_GITHUB: &str = "EVENT_GITHUB";

/// Name of events carrying coverage data for a single package.
pub const EVENT_COVERAGE: &str = "EVENT_COVERAGE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Github(GithubEvent),
    Coverage(Coverage),
    Message(Message),
}

impl Event {
    /// The name subscribers register under.
    pub fn name(&self) -> &str {
        match self {
            Event::Github(_) => EVENT_GITHUB,
            Event::Coverage(_) => EVENT_COVERAGE,
            Event::Message(msg) => &msg.name,
        }
    }

    /// Short stable label of the variant, for logs and error reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Github(_) => "github",
            Event::Coverage(_) => "coverage",
            Event::Message(_) => "message",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Github(ev) => fmt::Display::fmt(ev, f),
            Event::Coverage(cov) => write!(
                f,
                "pkg: {}; percentage: {}; time: {}",
                cov.pkg, cov.percentage, cov.time
            ),
            Event::Message(msg) => f.write_str(&msg.payload),
        }
    }
}

impl From<GithubEvent> for Event {
    fn from(ev: GithubEvent) -> Self {
        Event::Github(ev)
    }
}

impl From<Coverage> for Event {
    fn from(cov: Coverage) -> Self {
        Event::Coverage(cov)
    }
}

impl From<Message> for Event {
    fn from(msg: Message) -> Self {
        Event::Message(msg)
    }
}

#[cfg(test)]
mod tests;
