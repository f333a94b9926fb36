//! Name -> identifier lookup for exercises, with a per-run cache.
//!
//! A resolver is meant to live for one seeding or normalization run and then be
//! dropped. Each instance owns its cache; nothing is shared between instances,
//! so a new run never sees answers from an older one.
//!
//! Matching is case-sensitive and exact: the English name is checked first,
//! then the local name.

use crate::store::Store;
use crate::Exercise;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct ExerciseResolver {
    cache: HashMap<String, Option<Uuid>>,
    store_queries: usize,
}

impl ExerciseResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a display name (English or local) to an exercise id.
    ///
    /// Both hits and misses are cached for the life of this resolver. A store
    /// error is logged and reported as a miss, but not cached.
    pub fn resolve_id<S: Store>(&mut self, name: &str, store: &S) -> Option<Uuid> {
        if let Some(cached) = self.cache.get(name) {
            return *cached;
        }

        self.store_queries += 1;
        match lookup(name, store) {
            Ok(found) => {
                if found.is_none() {
                    tracing::debug!("No exercise named '{}'", name);
                }
                self.cache.insert(name.to_string(), found);
                found
            }
            Err(e) => {
                tracing::warn!("Exercise lookup for '{}' failed: {}", name, e);
                None
            }
        }
    }

    /// Resolve many names, returning only the ids that were found.
    ///
    /// Results follow the input order, minus misses. Duplicates are kept.
    pub fn resolve_ids<S: Store, N: AsRef<str>>(&mut self, names: &[N], store: &S) -> Vec<Uuid> {
        names
            .iter()
            .filter_map(|name| self.resolve_id(name.as_ref(), store))
            .collect()
    }

    /// Number of names held in the cache.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Number of times the store has been queried.
    pub fn store_queries(&self) -> usize {
        self.store_queries
    }
}

fn lookup<S: Store>(name: &str, store: &S) -> crate::Result<Option<Uuid>> {
    let by_english = store.fetch::<Exercise>(|e| e.name_en == name)?;
    if let Some(e) = by_english.first() {
        return Ok(Some(e.id));
    }
    let by_local = store.fetch::<Exercise>(|e| e.name_local == name)?;
    Ok(by_local.first().map(|e| e.id))
}
