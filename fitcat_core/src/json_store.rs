//! JSON document backend for the catalog store.
//!
//! The whole catalog lives in one JSON file. Access is serialized through a
//! sidecar `.lock` file:
//! - loads hold a shared lock while reading
//! - commits hold an exclusive lock, re-read the latest document, replay the
//!   queued changes, then atomically replace the file (temp file + fsync + rename)
//!
//! Replaying onto the latest document means two processes committing
//! different records both land; on the same record the later commit wins.

use crate::store::{Backend, Change, Snapshot};
use crate::{Error, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File-backed [`Backend`]
#[derive(Clone, Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    /// Create a backend for the given path. The file is created on first commit.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }

    /// Ensure the parent directory exists and open the lock file
    fn open_lock(&self) -> Result<File> {
        std::fs::create_dir_all(self.parent_dir())
            .map_err(|e| db_err("create store directory", e))?;
        OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(|e| db_err("open lock file", e))
    }

    /// Read the document; caller holds the lock.
    fn read_unlocked(&self) -> Result<Snapshot> {
        if !self.path.exists() {
            return Ok(Snapshot::default());
        }

        let mut contents = String::new();
        File::open(&self.path)
            .and_then(|f| std::io::BufReader::new(f).read_to_string(&mut contents))
            .map_err(|e| db_err("read store", e))?;

        if contents.trim().is_empty() {
            return Ok(Snapshot::default());
        }

        serde_json::from_str(&contents).map_err(|e| {
            Error::Database(format!("store file {:?} is corrupt: {}", self.path, e))
        })
    }

    /// Atomically replace the document; caller holds the exclusive lock.
    fn write_unlocked(&self, snapshot: &Snapshot) -> Result<()> {
        let temp = NamedTempFile::new_in(self.parent_dir())
            .map_err(|e| db_err("create temp file", e))?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(snapshot)?;
            writer
                .write_all(contents.as_bytes())
                .and_then(|_| writer.flush())
                .map_err(|e| db_err("write store", e))?;
        }

        temp.as_file()
            .sync_all()
            .map_err(|e| db_err("sync store", e))?;
        temp.persist(&self.path)
            .map_err(|e| db_err("replace store", e.error))?;
        Ok(())
    }
}

fn release(lock: &File, path: &Path) {
    if let Err(e) = FileExt::unlock(lock) {
        tracing::warn!("Failed to unlock store {:?}: {}", path, e);
    }
}

fn db_err(action: &str, e: std::io::Error) -> Error {
    Error::Database(format!("failed to {}: {}", action, e))
}

impl Backend for JsonFileBackend {
    fn load(&self) -> Result<Snapshot> {
        if !self.path.exists() {
            tracing::debug!("No store file at {:?}, starting empty", self.path);
            return Ok(Snapshot::default());
        }

        let lock = self.open_lock()?;
        lock.lock_shared().map_err(|e| db_err("lock store", e))?;
        let result = self.read_unlocked();
        release(&lock, &self.path);

        let snapshot = result?;
        tracing::debug!(
            "Loaded store {:?} at revision {}",
            self.path,
            snapshot.revision
        );
        Ok(snapshot)
    }

    fn commit(&self, changes: &[Change]) -> Result<Snapshot> {
        let lock = self.open_lock()?;
        lock.lock_exclusive().map_err(|e| db_err("lock store", e))?;

        let result = self.read_unlocked().and_then(|mut snapshot| {
            snapshot.apply_batch(changes)?;
            self.write_unlocked(&snapshot)?;
            Ok(snapshot)
        });

        // The outcome is decided once the rename is done; the lock is also
        // dropped with the file handle.
        release(&lock, &self.path);

        let snapshot = result?;
        tracing::debug!(
            "Wrote store {:?} at revision {}",
            self.path,
            snapshot.revision
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Store, StoreContext};
    use crate::taxonomy::{Equipment, ExerciseCategory, FoodCategory};
    use crate::{Exercise, ExerciseRecord, Food, FoodRecord};

    fn exercise(name: &str) -> Exercise {
        Exercise::from_record(ExerciseRecord {
            name_en: name.into(),
            name_local: name.into(),
            category: ExerciseCategory::Strength,
            equipment: Equipment::Barbell,
            supports_weight: true,
            supports_reps: true,
            supports_time: false,
            supports_distance: false,
        })
    }

    fn food(name: &str) -> Food {
        Food::from_record(FoodRecord {
            name_en: name.into(),
            name_local: String::new(),
            brand: Some("Acme".into()),
            calories: 52.0,
            protein: 0.3,
            carbs: 14.0,
            fat: 0.2,
            category: FoodCategory::Fruits,
            serving_size_grams: Some(182.0),
            serving_name: Some("1 medium".into()),
        })
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(temp_dir.path().join("catalog.json"));
        let snapshot = backend.load().unwrap();
        assert_eq!(snapshot.revision, 0);
        assert!(snapshot.exercises.is_empty());
    }

    #[test]
    fn test_commit_persists_across_contexts() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("catalog.json");

        let mut store = StoreContext::open(JsonFileBackend::new(&path)).unwrap();
        let deadlift = exercise("Deadlift");
        let apple = food("Apple");
        store.insert(deadlift.clone());
        store.insert(apple.clone());
        store.save().unwrap();
        assert!(path.exists());

        let reopened = StoreContext::open(JsonFileBackend::new(&path)).unwrap();
        let exercises = reopened.fetch::<Exercise>(|_| true).unwrap();
        assert_eq!(exercises, vec![deadlift]);
        let foods = reopened.fetch::<Food>(|_| true).unwrap();
        assert_eq!(foods, vec![apple]);
        assert_eq!(reopened.revision(), 1);
    }

    #[test]
    fn test_commits_from_stale_contexts_merge() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("catalog.json");

        let mut first = StoreContext::open(JsonFileBackend::new(&path)).unwrap();
        let mut second = StoreContext::open(JsonFileBackend::new(&path)).unwrap();

        first.insert(exercise("Squat"));
        first.save().unwrap();
        // `second` was opened before `first` committed
        second.insert(exercise("Lunge"));
        second.save().unwrap();

        assert_eq!(second.fetch_count::<Exercise>(|_| true).unwrap(), 2);
        assert_eq!(second.revision(), 2);
    }

    #[test]
    fn test_corrupt_file_is_database_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("catalog.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = StoreContext::open(JsonFileBackend::new(&path));
        assert!(matches!(result, Err(Error::Database(_))));
        // The corrupt file is left for inspection, not overwritten
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_no_stray_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("catalog.json");

        let mut store = StoreContext::open(JsonFileBackend::new(&path)).unwrap();
        store.insert(exercise("Row"));
        store.save().unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n != "catalog.json" && n != "catalog.json.lock")
            .collect();
        assert!(extras.is_empty(), "unexpected files: {:?}", extras);
    }

    #[test]
    fn test_refused_batch_leaves_file_and_releases_lock() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("catalog.json");

        let mut first = StoreContext::open(JsonFileBackend::new(&path)).unwrap();
        let mut second = StoreContext::open(JsonFileBackend::new(&path)).unwrap();

        first.require_empty::<Exercise>();
        first.insert(exercise("Squat"));
        first.save().unwrap();
        let committed = std::fs::read_to_string(&path).unwrap();

        second.require_empty::<Exercise>();
        second.insert(exercise("Lunge"));
        assert!(matches!(second.save(), Err(Error::Conflict(_))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), committed);

        // The lock was released, so later commits still go through
        second.refresh().unwrap();
        second.insert(food("Apple"));
        second.save().unwrap();
        assert_eq!(second.revision(), 2);
        assert_eq!(second.fetch_count::<Exercise>(|_| true).unwrap(), 1);
    }
}
