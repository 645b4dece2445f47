use std::fmt;

use serde::{Deserialize, Serialize};

use super::Coverage;

/// A CI run reported by a GitHub webhook, with the coverage it produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubEvent {
    pub event: String,
    pub repository: String,
    pub commit: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub head: String,
    pub workflow: String,
    pub coverage: Vec<Coverage>,
}

impl fmt::Display for GithubEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Event = \"{}\"", self.event)?;
        writeln!(f, "Repository = \"{}\"", self.repository)?;
        writeln!(f, "Commit = \"{}\"", self.commit)?;
        writeln!(f, "Ref = \"{}\"", self.git_ref)?;
        writeln!(f, "Head = \"{}\"", self.head)?;
        writeln!(f, "Workflow = \"{}\"", self.workflow)?;
        writeln!(f, "Coverage =")?;
        for cov in &self.coverage {
            writeln!(f, "{cov}")?;
        }
        Ok(())
    }
}
