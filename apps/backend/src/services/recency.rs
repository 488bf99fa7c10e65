//! Durable per-user storage for the recently-practiced list.
//!
//! One JSON file per user under a local data directory. No network
//! dependency; the list survives process restarts. The ordering and
//! eviction policy lives in [`quiz_core::RecencyList`]; this type only
//! handles durability.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use quiz_core::RecencyList;

#[derive(Debug, Error)]
pub enum RecencyError {
    #[error("recency store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("recency store corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub struct RecencyStore {
    dir: PathBuf,
    capacity: usize,
    // Serializes read-modify-write cycles on the list files.
    lock: Mutex<()>,
}

impl RecencyStore {
    pub fn new(dir: impl Into<PathBuf>, capacity: usize) -> Result<Self, RecencyError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            capacity,
            lock: Mutex::new(()),
        })
    }

    fn path_for(&self, user_id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", user_id))
    }

    async fn load(&self, path: &Path) -> Result<RecencyList, RecencyError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(RecencyList::with_capacity(self.capacity))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Mark a quiz as just practiced by this user.
    pub async fn record_practiced(
        &self,
        user_id: Uuid,
        quiz_id: Uuid,
    ) -> Result<(), RecencyError> {
        let _guard = self.lock.lock().await;
        let path = self.path_for(user_id);
        let mut list = self.load(&path).await?;
        list.record(quiz_id);
        tokio::fs::write(&path, serde_json::to_vec(&list)?).await?;
        Ok(())
    }

    /// Practiced quiz ids for a user, most recent first.
    pub async fn list_recently_practiced(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Uuid>, RecencyError> {
        let _guard = self.lock.lock().await;
        let path = self.path_for(user_id);
        Ok(self.load(&path).await?.ids().to_vec())
    }
}
