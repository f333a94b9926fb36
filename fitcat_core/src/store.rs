//! Storage context for persisted catalog entities.
//!
//! The pipeline only talks to the [`Store`] trait: insert, fetch by predicate,
//! count by predicate, update, delete, and commit (`save`). [`StoreContext`]
//! implements it on top of a [`Backend`], queueing changes in memory until
//! `save()` hands them to the backend as one atomic batch.

use crate::{EntityKind, Error, Exercise, Food, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ============================================================================
// Snapshot and changes
// ============================================================================

/// The full committed contents of a store
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub exercises: BTreeMap<Uuid, Exercise>,
    #[serde(default)]
    pub foods: BTreeMap<Uuid, Food>,
}

/// An entity value carried by a [`Change`]
#[derive(Clone, Debug)]
pub enum Row {
    Exercise(Exercise),
    Food(Food),
}

/// One queued mutation
#[derive(Clone, Debug)]
pub enum Change {
    Insert(Row),
    /// Replaces an existing entity; dropped if it no longer exists.
    Update(Row),
    Delete(EntityKind, Uuid),
    /// Precondition: the whole batch is refused if any entity of this kind exists.
    RequireEmpty(EntityKind),
}

impl Snapshot {
    /// Apply a single change in place.
    pub fn apply(&mut self, change: &Change) {
        match change {
            Change::Insert(Row::Exercise(e)) => {
                self.exercises.insert(e.id, e.clone());
            }
            Change::Insert(Row::Food(f)) => {
                self.foods.insert(f.id, f.clone());
            }
            Change::Update(Row::Exercise(e)) => {
                if let Some(slot) = self.exercises.get_mut(&e.id) {
                    *slot = e.clone();
                }
            }
            Change::Update(Row::Food(f)) => {
                if let Some(slot) = self.foods.get_mut(&f.id) {
                    *slot = f.clone();
                }
            }
            Change::Delete(EntityKind::Exercise, id) => {
                self.exercises.remove(id);
            }
            Change::Delete(EntityKind::Food, id) => {
                self.foods.remove(id);
            }
            Change::RequireEmpty(_) => {}
        }
    }

    fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Exercise => self.exercises.len(),
            EntityKind::Food => self.foods.len(),
        }
    }

    /// Apply a committed batch and bump the revision.
    ///
    /// Preconditions are checked against this snapshot before anything is
    /// applied; a failed check is a `Conflict` and leaves the snapshot as is.
    pub fn apply_batch(&mut self, changes: &[Change]) -> Result<()> {
        for change in changes {
            if let Change::RequireEmpty(kind) = change {
                let existing = self.count(*kind);
                if existing > 0 {
                    return Err(Error::Conflict(format!(
                        "expected no {} records, found {}",
                        kind, existing
                    )));
                }
            }
        }
        for change in changes {
            self.apply(change);
        }
        self.revision += 1;
        self.updated_at = Some(Utc::now());
        Ok(())
    }
}

// ============================================================================
// Entities
// ============================================================================

/// A persisted entity kind that a [`Store`] can hold
pub trait Entity: Clone + std::fmt::Debug {
    const KIND: EntityKind;

    fn id(&self) -> Uuid;
    fn table(snapshot: &Snapshot) -> &BTreeMap<Uuid, Self>;
    fn into_row(self) -> Row;
}

impl Entity for Exercise {
    const KIND: EntityKind = EntityKind::Exercise;

    fn id(&self) -> Uuid {
        self.id
    }

    fn table(snapshot: &Snapshot) -> &BTreeMap<Uuid, Self> {
        &snapshot.exercises
    }

    fn into_row(self) -> Row {
        Row::Exercise(self)
    }
}

impl Entity for Food {
    const KIND: EntityKind = EntityKind::Food;

    fn id(&self) -> Uuid {
        self.id
    }

    fn table(snapshot: &Snapshot) -> &BTreeMap<Uuid, Self> {
        &snapshot.foods
    }

    fn into_row(self) -> Row {
        Row::Food(self)
    }
}

// ============================================================================
// Store trait
// ============================================================================

/// The storage interface consumed by seeding, resolution and normalization
pub trait Store {
    /// Queue a new entity for insertion.
    fn insert<E: Entity>(&mut self, entity: E);

    /// All entities of a kind matching `predicate`, including uncommitted changes.
    fn fetch<E: Entity>(&self, predicate: impl Fn(&E) -> bool) -> Result<Vec<E>>;

    /// Number of entities of a kind matching `predicate`.
    fn fetch_count<E: Entity>(&self, predicate: impl Fn(&E) -> bool) -> Result<usize>;

    /// Queue a replacement of an existing entity (matched by id).
    fn update<E: Entity>(&mut self, entity: E);

    /// Queue deletion of an entity by id.
    fn delete<E: Entity>(&mut self, id: Uuid);

    /// Make the next commit fail with `Conflict` unless the committed store
    /// holds no entity of this kind at commit time.
    fn require_empty<E: Entity>(&mut self);

    /// Commit all queued changes atomically.
    fn save(&mut self) -> Result<()>;

    /// Discard all queued changes.
    fn rollback(&mut self);

    /// Whether there are uncommitted changes.
    fn has_changes(&self) -> bool;

    /// Discard queued changes and re-read the latest committed data.
    fn refresh(&mut self) -> Result<()>;
}

// ============================================================================
// Backends
// ============================================================================

/// Durable storage behind a [`StoreContext`]
pub trait Backend {
    /// Read the latest committed snapshot.
    fn load(&self) -> Result<Snapshot>;

    /// Apply `changes` on top of the latest committed snapshot as one unit and
    /// return the resulting snapshot. Nothing is applied on error.
    fn commit(&self, changes: &[Change]) -> Result<Snapshot>;
}

/// In-memory backend. Clones share the same data, so several contexts can
/// work against one store.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<Snapshot>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Snapshot>> {
        self.inner
            .lock()
            .map_err(|_| Error::Database("memory store lock poisoned".into()))
    }
}

impl Backend for MemoryBackend {
    fn load(&self) -> Result<Snapshot> {
        Ok(self.lock()?.clone())
    }

    fn commit(&self, changes: &[Change]) -> Result<Snapshot> {
        let mut guard = self.lock()?;
        guard.apply_batch(changes)?;
        Ok(guard.clone())
    }
}

// ============================================================================
// Context
// ============================================================================

/// A unit-of-work over a [`Backend`]
///
/// Reads see the snapshot loaded at open (or last save) plus this context's
/// own queued changes.
pub struct StoreContext<B: Backend> {
    backend: B,
    committed: Snapshot,
    working: Snapshot,
    pending: Vec<Change>,
}

impl<B: Backend> StoreContext<B> {
    /// Open a context on the backend's latest snapshot.
    pub fn open(backend: B) -> Result<Self> {
        let committed = backend.load()?;
        tracing::debug!(
            "Opened store at revision {} ({} exercises, {} foods)",
            committed.revision,
            committed.exercises.len(),
            committed.foods.len()
        );
        Ok(Self {
            backend,
            working: committed.clone(),
            committed,
            pending: Vec::new(),
        })
    }

    pub fn revision(&self) -> u64 {
        self.committed.revision
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.committed.updated_at
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn queue(&mut self, change: Change) {
        self.working.apply(&change);
        self.pending.push(change);
    }
}

impl StoreContext<MemoryBackend> {
    /// A context over a fresh, empty in-memory store.
    pub fn in_memory() -> Self {
        Self {
            backend: MemoryBackend::new(),
            committed: Snapshot::default(),
            working: Snapshot::default(),
            pending: Vec::new(),
        }
    }
}

impl<B: Backend> Store for StoreContext<B> {
    fn insert<E: Entity>(&mut self, entity: E) {
        self.queue(Change::Insert(entity.into_row()));
    }

    fn fetch<E: Entity>(&self, predicate: impl Fn(&E) -> bool) -> Result<Vec<E>> {
        Ok(E::table(&self.working)
            .values()
            .filter(|e| predicate(e))
            .cloned()
            .collect())
    }

    fn fetch_count<E: Entity>(&self, predicate: impl Fn(&E) -> bool) -> Result<usize> {
        Ok(E::table(&self.working)
            .values()
            .filter(|e| predicate(e))
            .count())
    }

    fn update<E: Entity>(&mut self, entity: E) {
        self.queue(Change::Update(entity.into_row()));
    }

    fn delete<E: Entity>(&mut self, id: Uuid) {
        self.queue(Change::Delete(E::KIND, id));
    }

    fn require_empty<E: Entity>(&mut self) {
        self.queue(Change::RequireEmpty(E::KIND));
    }

    fn save(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let count = self.pending.len();
        self.committed = self.backend.commit(&self.pending)?;
        self.working = self.committed.clone();
        self.pending.clear();
        tracing::info!(
            "Committed {} changes (store revision {})",
            count,
            self.committed.revision
        );
        Ok(())
    }

    fn rollback(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        tracing::warn!("Rolling back {} uncommitted changes", self.pending.len());
        self.pending.clear();
        self.working = self.committed.clone();
    }

    fn has_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    fn refresh(&mut self) -> Result<()> {
        self.committed = self.backend.load()?;
        self.working = self.committed.clone();
        self.pending.clear();
        Ok(())
    }
}
