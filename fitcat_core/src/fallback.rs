//! Built-in minimal catalog.
//!
//! Inserted when a bundled resource is missing, empty or unusable, so the
//! application never starts with zero reference data.

use crate::taxonomy::{Equipment, ExerciseCategory, FoodCategory};
use crate::{ExerciseRecord, FoodRecord};
use once_cell::sync::Lazy;

/// The fallback dataset
#[derive(Clone, Debug)]
pub struct FallbackCatalog {
    pub exercises: Vec<ExerciseRecord>,
    pub foods: Vec<FoodRecord>,
}

/// Built once and reused by every fallback
static FALLBACK_CATALOG: Lazy<FallbackCatalog> = Lazy::new(build_fallback_catalog);

/// Get a reference to the cached fallback catalog
pub fn fallback_catalog() -> &'static FallbackCatalog {
    &FALLBACK_CATALOG
}

fn exercise(
    name_en: &str,
    name_local: &str,
    category: ExerciseCategory,
    equipment: Equipment,
    weight: bool,
    time: bool,
) -> ExerciseRecord {
    ExerciseRecord {
        name_en: name_en.into(),
        name_local: name_local.into(),
        category,
        equipment,
        supports_weight: weight,
        supports_reps: !time,
        supports_time: time,
        supports_distance: false,
    }
}

fn food(
    name_en: &str,
    name_local: &str,
    macros: [f64; 4],
    category: FoodCategory,
    serving: Option<(f64, &str)>,
) -> FoodRecord {
    let [calories, protein, carbs, fat] = macros;
    FoodRecord {
        name_en: name_en.into(),
        name_local: name_local.into(),
        brand: None,
        calories,
        protein,
        carbs,
        fat,
        category,
        serving_size_grams: serving.map(|(g, _)| g),
        serving_name: serving.map(|(_, n)| n.to_string()),
    }
}

/// Builds the fallback catalog
pub fn build_fallback_catalog() -> FallbackCatalog {
    use Equipment::*;
    use ExerciseCategory as C;

    let mut exercises = vec![
        // legs
        exercise("Squat", "Squat", C::Legs, Bodyweight, true, false),
        exercise("Lunge", "Hamle", C::Legs, Bodyweight, true, false),
        // push
        exercise("Push Up", "Şınav", C::Push, Bodyweight, false, false),
        exercise("Bench Press", "Bench Press", C::Push, Barbell, true, false),
        // pull
        exercise("Pull Up", "Barfiks", C::Pull, PullUpBar, false, false),
        exercise("Dumbbell Row", "Dumbbell Row", C::Pull, Dumbbell, true, false),
        // core
        exercise("Plank", "Plank", C::Core, Bodyweight, false, true),
        exercise("Crunch", "Mekik", C::Core, Bodyweight, false, false),
        // compound
        exercise("Deadlift", "Deadlift", C::Strength, Barbell, true, false),
        exercise("Kettlebell Swing", "Kettlebell Salınımı", C::Functional, Kettlebell, true, false),
        // conditioning
        exercise("Burpee", "Burpee", C::Cardio, Bodyweight, false, false),
        exercise("Jumping Jack", "Jumping Jack", C::Cardio, Bodyweight, false, false),
        exercise("Box Jump", "Kutu Sıçrama", C::Plyometric, Other, false, false),
        exercise("Hamstring Stretch", "Arka Bacak Esnetme", C::Flexibility, Bodyweight, false, true),
    ];

    let mut running = exercise("Running", "Koşu", C::Cardio, Other, false, true);
    running.supports_distance = true;
    exercises.push(running);

    let foods = vec![
        food("Egg", "Yumurta", [155.0, 13.0, 1.1, 11.0], FoodCategory::Dairy, Some((50.0, "1 large"))),
        food("Chicken Breast", "Tavuk Göğsü", [165.0, 31.0, 0.0, 3.6], FoodCategory::Meat, None),
        food("White Rice (cooked)", "Pirinç Pilavı", [130.0, 2.7, 28.0, 0.3], FoodCategory::Grains, None),
        food("Oats", "Yulaf", [389.0, 16.9, 66.3, 6.9], FoodCategory::Grains, Some((40.0, "1/2 cup"))),
        food("Whole Wheat Bread", "Tam Buğday Ekmeği", [247.0, 13.0, 41.0, 3.4], FoodCategory::Bakery, Some((30.0, "1 slice"))),
        food("Milk", "Süt", [61.0, 3.2, 4.8, 3.3], FoodCategory::Dairy, Some((244.0, "1 cup"))),
        food("Plain Yogurt", "Yoğurt", [61.0, 3.5, 4.7, 3.3], FoodCategory::Dairy, None),
        food("Apple", "Elma", [52.0, 0.3, 14.0, 0.2], FoodCategory::Fruits, Some((182.0, "1 medium"))),
        food("Banana", "Muz", [89.0, 1.1, 23.0, 0.3], FoodCategory::Fruits, Some((118.0, "1 medium"))),
        food("Lentils (cooked)", "Mercimek", [116.0, 9.0, 20.0, 0.4], FoodCategory::Vegetables, None),
        food("Almonds", "Badem", [579.0, 21.0, 22.0, 50.0], FoodCategory::Nuts, Some((28.0, "1 handful"))),
        food("Salmon", "Somon", [208.0, 20.0, 0.0, 13.0], FoodCategory::Seafood, None),
    ];

    FallbackCatalog { exercises, foods }
}

impl FallbackCatalog {
    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for e in &self.exercises {
            if e.name_en.trim().is_empty() || e.name_local.trim().is_empty() {
                errors.push(format!("Exercise {:?} has an empty name", e.name_en));
            }
            if !e.category.is_concrete() {
                errors.push(format!("Exercise '{}' has no concrete category", e.name_en));
            }
        }

        for f in &self.foods {
            if f.name_en.trim().is_empty() || f.name_local.trim().is_empty() {
                errors.push(format!("Food {:?} has an empty name", f.name_en));
            }
            for (label, value) in [
                ("calories", f.calories),
                ("protein", f.protein),
                ("carbs", f.carbs),
                ("fat", f.fat),
            ] {
                if !value.is_finite() || value < 0.0 {
                    errors.push(format!("Food '{}': {} is {}", f.name_en, label, value));
                }
            }
        }

        // Every major movement family must be represented
        for required in [
            ExerciseCategory::Push,
            ExerciseCategory::Pull,
            ExerciseCategory::Legs,
            ExerciseCategory::Core,
            ExerciseCategory::Cardio,
            ExerciseCategory::Strength,
        ] {
            if !self.exercises.iter().any(|e| e.category == required) {
                errors.push(format!("Fallback catalog has no {} exercise", required));
            }
        }

        let mut names: Vec<&str> = self.exercises.iter().map(|e| e.name_en.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        if names.len() != self.exercises.len() {
            errors.push("Fallback catalog has duplicate exercise names".to_string());
        }

        errors
    }
}
