//! Label vocabulary store
//!
//! Process-wide deduplicated set of tags shared across all users, persisted
//! to a line-delimited file. One async mutex guards both the in-memory set
//! and the file write, so every mutation observes and produces a consistent
//! on-disk snapshot. Labels are never removed.

use crate::error::Result;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// File-backed label vocabulary.
pub struct LabelStore {
    path: PathBuf,
    set: Mutex<BTreeSet<String>>,
}

impl LabelStore {
    /// Load the vocabulary from `path`, creating an empty store when the
    /// file does not exist yet. Lines are trimmed; blank lines are skipped.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut set = BTreeSet::new();

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                for line in content.lines() {
                    let label = line.trim();
                    if !label.is_empty() {
                        set.insert(label.to_string());
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No label file yet, starting empty");
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(count = set.len(), "Label vocabulary loaded");

        Ok(Self {
            path,
            set: Mutex::new(set),
        })
    }

    /// Add labels to the vocabulary. Returns `true` when at least one was
    /// new, in which case the whole set is rewritten to disk before the
    /// lock is released.
    pub async fn add<I, S>(&self, labels: I) -> Result<bool>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = self.set.lock().await;

        let mut added = false;
        for label in labels {
            let label = label.as_ref().trim();
            if !label.is_empty() && set.insert(label.to_string()) {
                added = true;
            }
        }

        if added {
            Self::persist(&self.path, &set).await?;
            tracing::debug!(count = set.len(), "Label vocabulary persisted");
        }

        Ok(added)
    }

    /// Snapshot of the vocabulary, sorted.
    pub async fn all(&self) -> Vec<String> {
        self.set.lock().await.iter().cloned().collect()
    }

    /// Whether the vocabulary contains `label`.
    pub async fn contains(&self, label: &str) -> bool {
        self.set.lock().await.contains(label)
    }

    async fn persist(path: &Path, set: &BTreeSet<String>) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut content = String::new();
        for label in set {
            content.push_str(label);
            content.push('\n');
        }

        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_label_file() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.txt");
        (dir, path)
    }

    #[tokio::test]
    async fn test_load_missing_file_starts_empty() {
        let (_dir, path) = temp_label_file();
        let store = LabelStore::load(&path).await.unwrap();
        assert!(store.all().await.is_empty());
    }

    #[tokio::test]
    async fn test_add_reports_new_labels() {
        let (_dir, path) = temp_label_file();
        let store = LabelStore::load(&path).await.unwrap();

        assert!(store.add(["rust", "ml"]).await.unwrap());
        assert!(!store.add(["rust"]).await.unwrap());
        assert!(store.add(["rust", "new"]).await.unwrap());

        assert_eq!(store.all().await, vec!["ml", "new", "rust"]);
    }

    #[tokio::test]
    async fn test_add_trims_and_skips_blank() {
        let (_dir, path) = temp_label_file();
        let store = LabelStore::load(&path).await.unwrap();

        assert!(store.add(["  rust  ", "", "   "]).await.unwrap());
        assert_eq!(store.all().await, vec!["rust"]);
        assert!(store.contains("rust").await);
    }

    #[tokio::test]
    async fn test_round_trip() {
        let (_dir, path) = temp_label_file();

        let store = LabelStore::load(&path).await.unwrap();
        store.add(["rust", "ml", "papers"]).await.unwrap();

        let reloaded = LabelStore::load(&path).await.unwrap();
        assert_eq!(reloaded.all().await, store.all().await);
    }

    #[tokio::test]
    async fn test_load_normalizes_whitespace_and_blank_lines() {
        let (_dir, path) = temp_label_file();
        tokio::fs::write(&path, "  rust  \n\n\nml\n   \n")
            .await
            .unwrap();

        let store = LabelStore::load(&path).await.unwrap();
        assert_eq!(store.all().await, vec!["ml", "rust"]);
    }

    #[tokio::test]
    async fn test_no_write_when_nothing_new() {
        let (_dir, path) = temp_label_file();
        let store = LabelStore::load(&path).await.unwrap();

        store.add(["rust"]).await.unwrap();
        let modified = tokio::fs::metadata(&path).await.unwrap().modified().unwrap();

        store.add(["rust"]).await.unwrap();
        let modified_after = tokio::fs::metadata(&path).await.unwrap().modified().unwrap();
        assert_eq!(modified, modified_after);
    }
}
