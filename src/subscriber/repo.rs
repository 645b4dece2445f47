use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{Identity, Subscriber};
use crate::event::Event;
use crate::persistence::Repo;
use crate::utils::error::NotifyError;

/// Persists the coverage of every GitHub event it receives.
pub struct RepoWriter {
    identity: Identity,
    repo: Arc<dyn Repo>,
}

impl RepoWriter {
    pub fn new(repo: Arc<dyn Repo>) -> Self {
        Self {
            identity: Identity::default(),
            repo,
        }
    }
}

#[async_trait]
impl Subscriber for RepoWriter {
    fn id(&self) -> String {
        self.identity.get()
    }

    fn set_id(&self, id: &str) {
        self.identity.set(id);
    }

    async fn notify(&self, event: &Event) -> Result<(), NotifyError> {
        let Event::Github(ev) = event else {
            return Err(NotifyError::unsupported(event));
        };

        self.repo.save(&ev.coverage)?;
        debug!(records = ev.coverage.len(), commit = %ev.commit, "coverage saved");
        Ok(())
    }
}
