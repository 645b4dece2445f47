use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::{Batch, Db, Tree};

use super::Repo;
use crate::event::Coverage;
use crate::utils::error::RepoError;

const COVERAGE_TREE: &str = "coverage";

/// What is written per package: the record plus when its snapshot was saved.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StoredCoverage {
    pub coverage: Coverage,
    pub saved_at: i64,
}

/// [`Repo`] backed by an embedded sled database.
///
/// The snapshot lives in a single tree keyed by package name, so loading
/// returns records sorted by package.
#[derive(Clone)]
pub struct SledRepo {
    db: Db,
    tree: Tree,
}

impl SledRepo {
    pub fn open(path: &str) -> Result<Self, RepoError> {
        let db = sled::open(path)?;
        let tree = db.open_tree(COVERAGE_TREE)?;
        Ok(Self { db, tree })
    }

    /// When the current snapshot was written, `None` if nothing was saved yet.
    pub fn last_saved_at(&self) -> Result<Option<DateTime<Utc>>, RepoError> {
        let Some((_, value)) = self.tree.first()? else {
            return Ok(None);
        };
        let stored: StoredCoverage = serde_json::from_slice(&value)?;
        Ok(DateTime::from_timestamp_millis(stored.saved_at))
    }
}

impl Repo for SledRepo {
    fn save(&self, items: &[Coverage]) -> Result<(), RepoError> {
        let saved_at = Utc::now().timestamp_millis();
        let mut batch = Batch::default();

        for entry in self.tree.iter() {
            let (key, _) = entry?;
            batch.remove(key);
        }

        for cov in items {
            let stored = StoredCoverage {
                coverage: cov.clone(),
                saved_at,
            };
            batch.insert(cov.pkg.as_bytes(), serde_json::to_vec(&stored)?);
        }

        self.tree.apply_batch(batch)?;
        Ok(())
    }

    fn load(&self) -> Result<Vec<Coverage>, RepoError> {
        self.tree
            .iter()
            .map(|entry| {
                let (_, value) = entry?;
                let stored: StoredCoverage = serde_json::from_slice(&value)?;
                Ok(stored.coverage)
            })
            .collect()
    }

    fn close(&self) -> Result<(), RepoError> {
        self.db.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for SledRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledRepo")
            .field("db", &"sled::Db")
            .field("tree", &COVERAGE_TREE)
            .finish()
    }
}
