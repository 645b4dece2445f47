use serde::Deserialize;

use crate::event::{Coverage, GithubEvent};

const COVERAGE_PREFIX: &str = "coverage: ";

/// Body of a CI webhook delivery.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Payload {
    pub event: String,
    pub repository: String,
    pub commit: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub head: String,
    pub workflow: String,
    pub data: Vec<Datum>,
}

/// One line of `go test -json` style output.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Datum {
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Action")]
    pub action: String,
    #[serde(rename = "Package")]
    pub package: String,
    #[serde(rename = "Test")]
    pub test: String,
    #[serde(rename = "Output")]
    pub output: String,
}

impl Datum {
    /// Reads a `coverage: NN.N% ...` line. Fractions are truncated.
    pub fn coverage(&self) -> Option<Coverage> {
        let rest = self.output.strip_prefix(COVERAGE_PREFIX)?;
        let end = rest.find('%')?;
        let percentage = rest[..end].parse::<f64>().ok()?;

        Some(Coverage::new(
            self.package.clone(),
            percentage as i32,
            self.time.clone(),
        ))
    }
}

impl Payload {
    pub fn into_event(self) -> GithubEvent {
        let coverage = self.data.iter().filter_map(Datum::coverage).collect();

        GithubEvent {
            event: self.event,
            repository: self.repository,
            commit: self.commit,
            git_ref: self.git_ref,
            head: self.head,
            workflow: self.workflow,
            coverage,
        }
    }
}
