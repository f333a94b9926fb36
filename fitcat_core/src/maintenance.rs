//! Store maintenance: emptiness check, counts and scoped clearing.

use crate::store::{Entity, Store};
use crate::{Exercise, Food, Result};
use serde::Serialize;

/// Entity totals in a store
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub exercises: usize,
    pub foods: usize,
}

/// True when the store has no exercises.
///
/// Foods are not considered: this gates seeding, and exercises are what
/// seeding is keyed on.
pub fn is_empty<S: Store>(store: &S) -> Result<bool> {
    Ok(store.fetch_count::<Exercise>(|_| true)? == 0)
}

pub fn counts<S: Store>(store: &S) -> Result<Counts> {
    Ok(Counts {
        exercises: store.fetch_count::<Exercise>(|_| true)?,
        foods: store.fetch_count::<Food>(|_| true)?,
    })
}

/// Queue deletion of every entity of one kind without committing.
///
/// Used by reseeding so the clear and the new inserts land in one commit.
pub(crate) fn queue_delete_all<E: Entity, S: Store>(store: &mut S) -> Result<usize> {
    let all = store.fetch::<E>(|_| true)?;
    let count = all.len();
    for entity in all {
        store.delete::<E>(entity.id());
    }
    Ok(count)
}

fn clear_kind<E: Entity, S: Store>(store: &mut S) -> Result<usize> {
    let count = queue_delete_all::<E, S>(store)?;
    if let Err(e) = store.save() {
        store.rollback();
        return Err(e);
    }
    tracing::info!("Cleared {} {} records", count, E::KIND);
    Ok(count)
}

/// Delete every exercise and commit. Foods are never touched.
pub fn clear_exercises_only<S: Store>(store: &mut S) -> Result<usize> {
    clear_kind::<Exercise, S>(store)
}

/// Delete every food and commit. Exercises are never touched.
pub fn clear_foods_only<S: Store>(store: &mut S) -> Result<usize> {
    clear_kind::<Food, S>(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::fallback_catalog;
    use crate::store::StoreContext;

    fn populated(exercises: usize, foods: usize) -> StoreContext<crate::store::MemoryBackend> {
        let catalog = fallback_catalog();
        let mut store = StoreContext::in_memory();
        for record in catalog.exercises.iter().cycle().take(exercises) {
            store.insert(Exercise::from_record(record.clone()));
        }
        for record in catalog.foods.iter().cycle().take(foods) {
            store.insert(Food::from_record(record.clone()));
        }
        store.save().unwrap();
        store
    }

    #[test]
    fn test_is_empty_only_looks_at_exercises() {
        assert!(is_empty(&populated(0, 0)).unwrap());
        assert!(is_empty(&populated(0, 5)).unwrap());
        assert!(!is_empty(&populated(1, 0)).unwrap());
    }

    #[test]
    fn test_clear_exercises_keeps_foods() {
        let mut store = populated(20, 7);
        let foods_before = store.fetch::<Food>(|_| true).unwrap();

        assert_eq!(clear_exercises_only(&mut store).unwrap(), 20);
        assert_eq!(
            counts(&store).unwrap(),
            Counts {
                exercises: 0,
                foods: 7
            }
        );
        assert_eq!(store.fetch::<Food>(|_| true).unwrap(), foods_before);

        // Committed, not just queued
        let reopened = StoreContext::open(store.backend().clone()).unwrap();
        assert!(is_empty(&reopened).unwrap());
        assert_eq!(counts(&reopened).unwrap().foods, 7);
    }

    #[test]
    fn test_clear_foods_keeps_exercises() {
        let mut store = populated(3, 4);
        assert_eq!(clear_foods_only(&mut store).unwrap(), 4);
        assert_eq!(
            counts(&store).unwrap(),
            Counts {
                exercises: 3,
                foods: 0
            }
        );
    }

    #[test]
    fn test_clear_empty_store() {
        let mut store = populated(0, 0);
        assert_eq!(clear_exercises_only(&mut store).unwrap(), 0);
        // Nothing queued, so nothing committed
        assert_eq!(store.revision(), 0);
    }
}
