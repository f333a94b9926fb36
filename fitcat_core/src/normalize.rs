//! Idempotent repair passes over already-persisted catalog data.
//!
//! Each pass fetches the records it may touch, rewrites them, and commits once.
//! A second run with no intervening writes finds nothing to change. Passes
//! work per record, so two racing runs converge on the same result.

use crate::store::Store;
use crate::taxonomy::{classify_food_name, ExerciseCategory, FoodCategory};
use crate::{Exercise, Food, Result};
use serde::Serialize;

/// Outcome of [`backfill_foods`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FoodBackfill {
    /// Foods whose blank local name was filled from the English name
    pub names_filled: usize,
    /// Foods moved out of `other` by the name heuristic
    pub recategorized: usize,
    /// Foods still in `other` after the heuristic
    pub still_other: usize,
    /// Foods rewritten (one food can count in both buckets above)
    pub written: usize,
}

/// Outcome of [`normalize_all`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NormalizationReport {
    pub exercises_recategorized: usize,
    pub foods: FoodBackfill,
}

/// Rewrite every exercise still categorized `other` to the default concrete
/// category. Returns how many were rewritten.
pub fn backfill_exercise_categories<S: Store>(store: &mut S) -> Result<usize> {
    let stale = store.fetch::<Exercise>(|e| e.category == ExerciseCategory::Other)?;
    if stale.is_empty() {
        tracing::debug!("Exercise category backfill: nothing to do");
        return Ok(0);
    }

    let count = stale.len();
    for mut exercise in stale {
        tracing::debug!(
            "Exercise '{}': {} -> {}",
            exercise.name_en,
            exercise.category,
            ExerciseCategory::DEFAULT_CONCRETE
        );
        exercise.category = ExerciseCategory::DEFAULT_CONCRETE;
        store.update(exercise);
    }

    if let Err(e) = store.save() {
        store.rollback();
        return Err(e);
    }
    tracing::info!(
        "Exercise category backfill: {} exercises moved to {}",
        count,
        ExerciseCategory::DEFAULT_CONCRETE
    );
    Ok(count)
}

/// Fill blank local food names from the English name, and try to move foods
/// out of the `other` category using the name heuristic.
pub fn backfill_foods<S: Store>(store: &mut S) -> Result<FoodBackfill> {
    let candidates = store.fetch::<Food>(|f| {
        needs_local_name(f) || f.category == FoodCategory::Other
    })?;

    let mut report = FoodBackfill::default();

    for mut food in candidates {
        let mut changed = false;

        if needs_local_name(&food) {
            food.name_local = food.name_en.clone();
            report.names_filled += 1;
            changed = true;
        }

        if food.category == FoodCategory::Other {
            match classify_food_name([food.name_en.as_str(), food.name_local.as_str()]) {
                Some(category) => {
                    tracing::debug!("Food '{}': other -> {}", food.name_en, category);
                    food.category = category;
                    report.recategorized += 1;
                    changed = true;
                }
                None => report.still_other += 1,
            }
        }

        if changed {
            store.update(food);
            report.written += 1;
        }
    }

    if report.written > 0 {
        if let Err(e) = store.save() {
            store.rollback();
            return Err(e);
        }
        tracing::info!(
            "Food backfill: {} names filled, {} recategorized, {} left as other",
            report.names_filled,
            report.recategorized,
            report.still_other
        );
    } else {
        tracing::debug!("Food backfill: nothing to do");
    }
    Ok(report)
}

/// Blank local name that can be repaired from a non-blank English name.
fn needs_local_name(food: &Food) -> bool {
    food.name_local.trim().is_empty() && !food.name_en.trim().is_empty()
}

/// Run both passes.
pub fn normalize_all<S: Store>(store: &mut S) -> Result<NormalizationReport> {
    Ok(NormalizationReport {
        exercises_recategorized: backfill_exercise_categories(store)?,
        foods: backfill_foods(store)?,
    })
}
