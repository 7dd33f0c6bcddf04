use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;

use crate::error::{StoreError, StoreResult};
use crate::memory::InMemoryWorldState;
use crate::staged::WriteSet;
use crate::traits::{BoxedStateIterator, StateCommitter, WorldState};

/// World state persisted to a single JSON file.
///
/// The file maps each key to its hex-encoded value. The whole state is loaded
/// on open and rewritten atomically (temp file + rename) on every write or
/// commit. The new state reaches memory only after it is on disk, so a failed
/// write leaves both views unchanged.
pub struct FileWorldState {
    path: PathBuf,
    inner: InMemoryWorldState,
    writer: Mutex<()>,
}

impl FileWorldState {
    /// Open the state file at `path`, starting empty if it does not exist.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let entries = if path.exists() {
            load(&path)?
        } else {
            BTreeMap::new()
        };
        tracing::debug!(path = %path.display(), entries = entries.len(), "opened state file");
        Ok(Self {
            path,
            inner: InMemoryWorldState::from_entries(entries),
            writer: Mutex::new(()),
        })
    }

    /// Enable or disable selector queries.
    pub fn with_rich_query(mut self, enabled: bool) -> Self {
        self.inner = self.inner.with_rich_query(enabled);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The in-memory view backing this file.
    pub fn state(&self) -> &InMemoryWorldState {
        &self.inner
    }

    /// Persist the state with `writes` applied, then apply them in memory.
    fn apply(&self, writes: WriteSet) -> StoreResult<()> {
        if writes.iter().any(|(key, _)| key.is_empty()) {
            return Err(StoreError::EmptyKey);
        }
        let _writer = self.lock_writer()?;
        let mut next = self.inner.snapshot()?;
        for (key, value) in writes.iter() {
            next.insert(key.clone(), value.clone());
        }
        self.persist(&next)?;
        self.inner.commit(writes)
    }

    fn lock_writer(&self) -> StoreResult<std::sync::MutexGuard<'_, ()>> {
        self.writer
            .lock()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn persist(&self, entries: &BTreeMap<String, Vec<u8>>) -> StoreResult<()> {
        let encoded: BTreeMap<&str, String> = entries
            .iter()
            .map(|(key, value)| (key.as_str(), hex::encode(value)))
            .collect();
        let json = serde_json::to_vec_pretty(&encoded)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        tracing::debug!(
            path = %self.path.display(),
            entries = encoded.len(),
            "flushed state file"
        );
        Ok(())
    }
}

fn load(path: &Path) -> StoreResult<BTreeMap<String, Vec<u8>>> {
    let bytes = fs::read(path)?;
    let encoded: BTreeMap<String, String> =
        serde_json::from_slice(&bytes).map_err(|e| StoreError::CorruptStateFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    encoded
        .into_iter()
        .map(|(key, value)| {
            let decoded = hex::decode(&value).map_err(|e| StoreError::CorruptStateFile {
                path: path.to_path_buf(),
                reason: format!("value of {key:?}: {e}"),
            })?;
            Ok((key, decoded))
        })
        .collect()
}

impl WorldState for FileWorldState {
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.inner.get_state(key)
    }

    fn put_state(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let mut writes = WriteSet::new();
        writes.put(key, value.to_vec());
        self.apply(writes)
    }

    fn get_state_by_range(&self, start: &str, end: &str) -> StoreResult<BoxedStateIterator<'_>> {
        self.inner.get_state_by_range(start, end)
    }

    fn get_query_result(
        &self,
        namespace: &str,
        query: &str,
    ) -> StoreResult<BoxedStateIterator<'_>> {
        self.inner.get_query_result(namespace, query)
    }
}

impl StateCommitter for FileWorldState {
    fn commit(&self, writes: WriteSet) -> StoreResult<()> {
        if writes.is_empty() {
            return Ok(());
        }
        self.apply(writes)
    }
}

impl std::fmt::Debug for FileWorldState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWorldState")
            .field("path", &self.path)
            .field("state", &self.inner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileWorldState::open(dir.path().join("state.json")).unwrap();
        assert!(store.state().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        {
            let store = FileWorldState::open(&path).unwrap();
            store.put_state("1", br#"{"id":"1"}"#).unwrap();
        }
        let reopened = FileWorldState::open(&path).unwrap();
        assert_eq!(reopened.get_state("1").unwrap(), Some(br#"{"id":"1"}"#.to_vec()));
    }

    #[test]
    fn commit_persists_write_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        let store = FileWorldState::open(&path).unwrap();
        let mut writes = WriteSet::new();
        writes.put("a", vec![0, 159, 146, 150]);
        store.commit(writes).unwrap();

        let reopened = FileWorldState::open(&path).unwrap();
        assert_eq!(reopened.get_state("a").unwrap(), Some(vec![0, 159, 146, 150]));
    }

    #[test]
    fn empty_commit_does_not_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileWorldState::open(dir.path().join("state.json")).unwrap();
        store.commit(WriteSet::new()).unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, b"{ not json").unwrap();
        let err = FileWorldState::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::CorruptStateFile { .. }));
    }

    #[test]
    fn bad_hex_value_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, br#"{"k":"zz"}"#).unwrap();
        let err = FileWorldState::open(&path).unwrap_err();
        assert!(matches!(
            err,
            StoreError::CorruptStateFile { reason, .. } if reason.contains("\"k\"")
        ));
    }

    #[test]
    fn failed_commit_leaves_memory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = FileWorldState::open(&path).unwrap();
        store.put_state("kept", b"0").unwrap();

        // A non-empty directory at the target path makes the rename fail.
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        fs::write(path.join("blocker"), b"").unwrap();

        let mut writes = WriteSet::new();
        writes.put("a", b"1".to_vec());
        assert!(store.commit(writes).is_err());
        assert_eq!(store.get_state("a").unwrap(), None);
        assert_eq!(store.get_state("kept").unwrap(), Some(b"0".to_vec()));

        assert!(store.put_state("b", b"2").is_err());
        assert_eq!(store.get_state("b").unwrap(), None);
        assert_eq!(store.state().len(), 1);
    }

    #[test]
    fn empty_key_is_rejected_before_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileWorldState::open(dir.path().join("state.json")).unwrap();
        assert!(matches!(store.put_state("", b"x"), Err(StoreError::EmptyKey)));
        assert!(!store.path().exists());
    }

    #[test]
    fn rich_query_toggle_is_forwarded() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileWorldState::open(dir.path().join("s.json"))
            .unwrap()
            .with_rich_query(false);
        assert!(!store.state().supports_rich_query());
    }
}
