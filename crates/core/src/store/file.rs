//! File-backed document store.
//!
//! ## Storage Layout
//!
//! Each document is one pretty-printed JSON file, sharded by its internal `_id`:
//!
//! ```text
//! patient_data/
//!   <s1>/
//!     <s2>/
//!       <_id>.json
//! ```
//!
//! where `s1` and `s2` are the first four hex characters of the canonical `_id`.
//!
//! Lookups by any other field (such as `patient_id`) walk the shard tree. A missing root
//! directory is an empty collection; any other IO failure on the tree is reported as
//! [`StoreError::Unavailable`]. Files that cannot be parsed are skipped with a warning.
//!
//! Writes (insert, update, delete) are serialised by a lock shared between clones of the
//! same store, so a read-merge-write cannot interleave with another write. Documents are
//! replaced through a uniquely named temp file in the shard directory, so readers see either
//! the old or the new document and never a partial one.

use super::{
    assign_internal_id, merge_fields, DeleteResult, Document, DocumentStore, Filter,
    InsertOneResult, Projection, UpdateResult,
};
use crate::constants::DOCUMENT_EXTENSION;
use crate::error::{StoreError, StoreResult};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tempfile::NamedTempFile;

#[derive(Clone, Debug)]
pub struct FileStore {
    data_dir: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    /// Creates a store rooted at `data_dir` without touching the filesystem.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Creates a store rooted at `data_dir`, creating the directory and checking it is usable.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the directory cannot be created or read.
    pub fn open(data_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let store = Self::new(data_dir);
        fs::create_dir_all(&store.data_dir).map_err(|e| unavailable(&store.data_dir, e))?;
        fs::read_dir(&store.data_dir).map_err(|e| unavailable(&store.data_dir, e))?;
        Ok(store)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn lock_writes(&self) -> StoreResult<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("file store write lock poisoned".into()))
    }

    /// Reads every parseable document under the shard tree, paired with its path.
    fn scan(&self) -> StoreResult<Vec<(PathBuf, Document)>> {
        let mut found = Vec::new();

        let s1_iter = match fs::read_dir(&self.data_dir) {
            Ok(it) => it,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(found),
            Err(e) => return Err(unavailable(&self.data_dir, e)),
        };

        for s1 in s1_iter {
            let s1_path = s1.map_err(|e| unavailable(&self.data_dir, e))?.path();
            if !s1_path.is_dir() {
                continue;
            }

            for s2 in read_dir_or_skip(&s1_path)? {
                let s2_path = s2.map_err(|e| unavailable(&s1_path, e))?.path();
                if !s2_path.is_dir() {
                    continue;
                }

                for entry in read_dir_or_skip(&s2_path)? {
                    let doc_path = entry.map_err(|e| unavailable(&s2_path, e))?.path();
                    if doc_path.extension().and_then(|e| e.to_str()) != Some(DOCUMENT_EXTENSION)
                    {
                        continue;
                    }
                    if let Some(doc) = read_document(&doc_path)? {
                        found.push((doc_path, doc));
                    }
                }
            }
        }

        Ok(found)
    }

    fn find_first(&self, filter: &Filter) -> StoreResult<Option<(PathBuf, Document)>> {
        Ok(self
            .scan()?
            .into_iter()
            .find(|(_, doc)| filter.matches(doc)))
    }
}

impl DocumentStore for FileStore {
    fn insert_one(&self, mut doc: Document) -> StoreResult<InsertOneResult> {
        let id = assign_internal_id(&mut doc)?;
        let path = id.sharded_file(&self.data_dir, DOCUMENT_EXTENSION);

        let _guard = self.lock_writes()?;
        if path.exists() {
            return Err(StoreError::DuplicateKey(id.to_string()));
        }

        let shard_dir = id.shard_dir(&self.data_dir);
        fs::create_dir_all(&shard_dir).map_err(|e| unavailable(&shard_dir, e))?;
        write_document(&path, &doc)?;

        tracing::debug!("inserted document {}", path.display());
        Ok(InsertOneResult {
            inserted_id: id.to_string(),
        })
    }

    fn find(&self, filter: &Filter, projection: Projection) -> StoreResult<Vec<Document>> {
        Ok(self
            .scan()?
            .into_iter()
            .filter(|(_, doc)| filter.matches(doc))
            .map(|(_, doc)| projection.apply(doc))
            .collect())
    }

    fn find_one(&self, filter: &Filter, projection: Projection) -> StoreResult<Option<Document>> {
        Ok(self
            .find_first(filter)?
            .map(|(_, doc)| projection.apply(doc)))
    }

    fn update_one(&self, filter: &Filter, set: Document) -> StoreResult<UpdateResult> {
        let _guard = self.lock_writes()?;
        let Some((path, mut doc)) = self.find_first(filter)? else {
            return Ok(UpdateResult { matched_count: 0 });
        };
        merge_fields(&mut doc, set)?;
        write_document(&path, &doc)?;
        Ok(UpdateResult { matched_count: 1 })
    }

    fn delete_one(&self, filter: &Filter) -> StoreResult<DeleteResult> {
        let _guard = self.lock_writes()?;
        let Some((path, _)) = self.find_first(filter)? else {
            return Ok(DeleteResult { deleted_count: 0 });
        };
        match fs::remove_file(&path) {
            Ok(()) => Ok(DeleteResult { deleted_count: 1 }),
            // Lost a race with another delete.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(DeleteResult { deleted_count: 0 }),
            Err(e) => Err(StoreError::Write { path, source: e }),
        }
    }
}

fn unavailable(path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Unavailable(format!("{}: {}", path.display(), err))
}

/// Lists a shard directory; a shard removed mid-scan yields no entries.
fn read_dir_or_skip(path: &Path) -> StoreResult<Vec<std::io::Result<fs::DirEntry>>> {
    match fs::read_dir(path) {
        Ok(it) => Ok(it.collect()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(unavailable(path, e)),
    }
}

fn read_document(path: &Path) -> StoreResult<Option<Document>> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    match serde_json::from_str::<Document>(&contents) {
        Ok(doc) => Ok(Some(doc)),
        Err(e) => {
            tracing::warn!("skipping unparseable document {}: {}", path.display(), e);
            Ok(None)
        }
    }
}

/// Writes via a uniquely named sibling temp file, then renames it over `path`.
///
/// The temp file has no `.json` extension, so a scan never picks it up.
fn write_document(path: &Path, doc: &Document) -> StoreResult<()> {
    let json = serde_json::to_string_pretty(doc).map_err(StoreError::Serialization)?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(json.as_bytes()).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::INTERNAL_ID_FIELD;
    use serde_json::{json, Value};
    use spm_uuid::ShardableUuid;
    use tempfile::TempDir;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_insert_writes_sharded_json_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();

        let result = store.insert_one(doc(json!({"patient_id": "p-1"}))).unwrap();
        let key = ShardableUuid::parse(&result.inserted_id).unwrap();
        let path = key.sharded_file(temp_dir.path(), DOCUMENT_EXTENSION);

        assert!(path.is_file());
        let on_disk: Document =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.get("patient_id"), Some(&json!("p-1")));
        assert_eq!(
            on_disk.get(INTERNAL_ID_FIELD),
            Some(&json!(result.inserted_id))
        );
    }

    #[test]
    fn test_find_on_missing_root_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("not-created-yet"));
        assert!(store
            .find(&Filter::All, Projection::ExcludeInternalId)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_update_merges_and_persists() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();
        store
            .insert_one(doc(json!({"patient_id": "p-1", "ward": "A", "status": "inpatient"})))
            .unwrap();

        let filter = Filter::eq("patient_id", "p-1");
        let result = store.update_one(&filter, doc(json!({"ward": "B"}))).unwrap();
        assert_eq!(result.matched_count, 1);

        let reopened = FileStore::open(temp_dir.path()).unwrap();
        let found = reopened
            .find_one(&filter, Projection::ExcludeInternalId)
            .unwrap()
            .unwrap();
        assert_eq!(
            found,
            doc(json!({"patient_id": "p-1", "ward": "B", "status": "inpatient"}))
        );
    }

    #[test]
    fn test_delete_removes_file_once() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();
        store.insert_one(doc(json!({"patient_id": "p-1"}))).unwrap();

        let filter = Filter::eq("patient_id", "p-1");
        assert_eq!(store.delete_one(&filter).unwrap().deleted_count, 1);
        assert_eq!(store.delete_one(&filter).unwrap().deleted_count, 0);
        assert!(store.find(&Filter::All, Projection::Full).unwrap().is_empty());
    }

    #[test]
    fn test_unparseable_document_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();
        store.insert_one(doc(json!({"patient_id": "p-1"}))).unwrap();

        let shard = temp_dir.path().join("ab").join("cd");
        fs::create_dir_all(&shard).unwrap();
        fs::write(shard.join("abcd0000000000000000000000000000.json"), "{not json").unwrap();

        let all = store.find(&Filter::All, Projection::ExcludeInternalId).unwrap();
        assert_eq!(all, vec![doc(json!({"patient_id": "p-1"}))]);
    }

    #[test]
    fn test_root_that_is_a_file_is_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        assert!(matches!(
            FileStore::open(&blocker),
            Err(StoreError::Unavailable(_))
        ));

        let store = FileStore::new(&blocker);
        assert!(matches!(
            store.find(&Filter::All, Projection::Full),
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.insert_one(doc(json!({}))),
            Err(StoreError::Unavailable(_))
        ));
    }

    #[test]
    fn test_concurrent_updates_keep_both_fields() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(FileStore::open(temp_dir.path()).unwrap());
        let filter = Filter::eq("patient_id", "p-1");

        for round in 0..50 {
            store
                .insert_one(doc(json!({"patient_id": "p-1", "ward": "A", "status": "inpatient"})))
                .unwrap();

            let handles: Vec<_> = [json!({"ward": "X"}), json!({"status": "outpatient"})]
                .into_iter()
                .map(|set| {
                    let store = Arc::clone(&store);
                    let filter = filter.clone();
                    std::thread::spawn(move || store.update_one(&filter, doc(set)).unwrap())
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap().matched_count, 1);
            }

            let found = store
                .find_one(&filter, Projection::ExcludeInternalId)
                .unwrap()
                .unwrap_or_else(|| panic!("record lost in round {}", round));
            assert_eq!(found.get("ward"), Some(&json!("X")), "round {}", round);
            assert_eq!(
                found.get("status"),
                Some(&json!("outpatient")),
                "round {}",
                round
            );

            assert_eq!(store.delete_one(&filter).unwrap().deleted_count, 1);
        }
    }

    #[test]
    fn test_update_racing_delete_never_resurrects_record() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(FileStore::open(temp_dir.path()).unwrap());
        let filter = Filter::eq("patient_id", "p-1");

        for round in 0..50 {
            store.insert_one(doc(json!({"patient_id": "p-1"}))).unwrap();

            let updater = {
                let store = Arc::clone(&store);
                let filter = filter.clone();
                std::thread::spawn(move || {
                    store
                        .update_one(&filter, doc(json!({"ward": "B"})))
                        .unwrap()
                })
            };
            let deleter = {
                let store = Arc::clone(&store);
                let filter = filter.clone();
                std::thread::spawn(move || store.delete_one(&filter).unwrap())
            };
            updater.join().unwrap();
            assert_eq!(deleter.join().unwrap().deleted_count, 1, "round {}", round);

            assert!(
                store.find(&Filter::All, Projection::Full).unwrap().is_empty(),
                "deleted record came back in round {}",
                round
            );
        }
    }

    #[test]
    fn test_writes_leave_no_temp_files_behind() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();
        let result = store.insert_one(doc(json!({"patient_id": "p-1"}))).unwrap();
        store
            .update_one(&Filter::eq("patient_id", "p-1"), doc(json!({"ward": "B"})))
            .unwrap();

        let key = ShardableUuid::parse(&result.inserted_id).unwrap();
        let entries: Vec<_> = fs::read_dir(key.shard_dir(temp_dir.path()))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 1);
    }
}
