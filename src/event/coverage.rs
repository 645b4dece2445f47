use std::fmt;

use serde::{Deserialize, Serialize};

/// Test coverage of a single package.
///
/// `percentage` is expressed to the nearest lower integer on a 0-100 scale;
/// `time` is the timestamp reported by the test run, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    pub pkg: String,
    pub percentage: i32,
    pub time: String,
}

impl Coverage {
    pub fn new(pkg: impl Into<String>, percentage: i32, time: impl Into<String>) -> Self {
        Self {
            pkg: pkg.into(),
            percentage,
            time: time.into(),
        }
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] pkg = \"{}\" %{}", self.time, self.pkg, self.percentage)
    }
}
