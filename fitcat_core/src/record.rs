//! Turns parsed rows into validated records.
//!
//! Exercise columns: `nameEN, nameTR, category, equipment,
//! supportsWeight, supportsReps, supportsTime, supportsDistance` (last four optional).
//!
//! Food columns: `nameEN, nameTR, brand, calories, protein, carbs, fat,
//! category, servingSizeGrams, servingName` (last two optional).

use crate::taxonomy::{equipment, exercise_category, food_category};
use crate::{Error, ExerciseRecord, FoodRecord, Result};

pub const EXERCISE_MIN_COLUMNS: usize = 4;
pub const FOOD_MIN_COLUMNS: usize = 8;

/// Literals accepted as `true` by [`parse_flag`], compared case-insensitively.
pub const TRUE_LITERALS: [&str; 3] = ["true", "1", "yes"];

/// Parse a permissive boolean column.
///
/// `true`, `1` and `yes` (any case, surrounding whitespace ignored) are true.
/// Everything else, including the empty string, is false.
pub fn parse_flag(raw: &str) -> bool {
    let raw = raw.trim();
    TRUE_LITERALS.iter().any(|t| t.eq_ignore_ascii_case(raw))
}

/// Resolve the English/local name pair, filling whichever side is blank.
///
/// Returns `None` when both are blank.
fn resolve_names(english: &str, local: &str) -> Option<(String, String)> {
    let english = english.trim();
    let local = local.trim();
    match (english.is_empty(), local.is_empty()) {
        (true, true) => None,
        (false, true) => Some((english.to_string(), english.to_string())),
        (true, false) => Some((local.to_string(), local.to_string())),
        (false, false) => Some((english.to_string(), local.to_string())),
    }
}

fn require_columns(columns: &[String], min: usize, kind: &str) -> Result<()> {
    if columns.len() < min {
        return Err(Error::InvalidDataFormat(format!(
            "{} row has {} columns, expected at least {}",
            kind,
            columns.len(),
            min
        )));
    }
    Ok(())
}

/// Build an exercise from one parsed row.
pub fn build_exercise(columns: &[String]) -> Result<ExerciseRecord> {
    require_columns(columns, EXERCISE_MIN_COLUMNS, "Exercise")?;

    let (name_en, name_local) = resolve_names(&columns[0], &columns[1]).ok_or_else(|| {
        Error::InvalidDataFormat("Exercise row has neither an English nor a local name".into())
    })?;

    let flag = |idx: usize, default: bool| columns.get(idx).map_or(default, |c| parse_flag(c));

    Ok(ExerciseRecord {
        name_en,
        name_local,
        category: exercise_category(&columns[2]),
        equipment: equipment(&columns[3]),
        supports_weight: flag(4, true),
        supports_reps: flag(5, true),
        supports_time: flag(6, false),
        supports_distance: flag(7, false),
    })
}

/// Parse a required macro column: finite and non-negative.
fn parse_amount(raw: &str, column: &str, name: &str) -> Result<f64> {
    let value: f64 = raw.trim().parse().map_err(|_| {
        Error::InvalidDataFormat(format!(
            "Food '{}': {} '{}' is not a number",
            name, column, raw
        ))
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidDataFormat(format!(
            "Food '{}': {} must be a non-negative number, got {}",
            name, column, raw
        )));
    }
    Ok(value)
}

fn non_empty(raw: Option<&String>) -> Option<String> {
    raw.map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Build a food from one parsed row.
pub fn build_food(columns: &[String]) -> Result<FoodRecord> {
    require_columns(columns, FOOD_MIN_COLUMNS, "Food")?;

    let name_en = columns[0].trim();
    if name_en.is_empty() {
        return Err(Error::InvalidDataFormat(
            "Food row has an empty English name".into(),
        ));
    }
    let name_local = match columns[1].trim() {
        "" => name_en.to_string(),
        local => local.to_string(),
    };

    let calories = parse_amount(&columns[3], "calories", name_en)?;
    let protein = parse_amount(&columns[4], "protein", name_en)?;
    let carbs = parse_amount(&columns[5], "carbs", name_en)?;
    let fat = parse_amount(&columns[6], "fat", name_en)?;

    // Serving info is advisory; a bad value is dropped rather than rejecting the food.
    let serving_size_grams = non_empty(columns.get(8)).and_then(|raw| match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Some(v),
        _ => {
            tracing::debug!("Food '{}': ignoring serving size '{}'", name_en, raw);
            None
        }
    });

    Ok(FoodRecord {
        name_en: name_en.to_string(),
        name_local,
        brand: non_empty(columns.get(2)),
        calories,
        protein,
        carbs,
        fat,
        category: food_category(&columns[7]),
        serving_size_grams,
        serving_name: non_empty(columns.get(9)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::parse_row;
    use crate::taxonomy::{Equipment, ExerciseCategory, FoodCategory};

    fn cols(line: &str) -> Vec<String> {
        parse_row(line)
    }

    #[test]
    fn test_parse_flag_literals() {
        for t in ["true", "TRUE", "1", "yes", " Yes "] {
            assert!(parse_flag(t), "{} should be true", t);
        }
        for f in ["false", "0", "no", "", "y", "on", "2"] {
            assert!(!parse_flag(f), "{} should be false", f);
        }
    }

    #[test]
    fn test_build_exercise_full_row() {
        let record = build_exercise(&cols("Bench Press,Bench Press,push,barbell,true,1,no,0")).unwrap();
        assert_eq!(record.name_en, "Bench Press");
        assert_eq!(record.category, ExerciseCategory::Push);
        assert_eq!(record.equipment, Equipment::Barbell);
        assert!(record.supports_weight);
        assert!(record.supports_reps);
        assert!(!record.supports_time);
        assert!(!record.supports_distance);
    }

    #[test]
    fn test_build_exercise_defaults_for_missing_flags() {
        let record = build_exercise(&cols("Plank,Plank,core,bodyweight")).unwrap();
        assert!(record.supports_weight);
        assert!(record.supports_reps);
        assert!(!record.supports_time);
        assert!(!record.supports_distance);

        let record = build_exercise(&cols("Running,Koşu,cardio,other,false,false,yes")).unwrap();
        assert!(!record.supports_weight);
        assert!(record.supports_time);
        assert!(!record.supports_distance);
    }

    #[test]
    fn test_build_exercise_name_fallback() {
        let record = build_exercise(&cols("Squat,,legs,bodyweight")).unwrap();
        assert_eq!(record.name_local, "Squat");

        let record = build_exercise(&cols(",Şınav,push,bodyweight")).unwrap();
        assert_eq!(record.name_en, "Şınav");
        assert_eq!(record.name_local, "Şınav");
    }

    #[test]
    fn test_build_exercise_rejects_nameless_and_short_rows() {
        assert!(matches!(
            build_exercise(&cols(" , ,legs,bodyweight")),
            Err(Error::InvalidDataFormat(_))
        ));
        assert!(matches!(build_exercise(&[]), Err(Error::InvalidDataFormat(_))));
        assert!(matches!(
            build_exercise(&cols("Squat,Squat,legs")),
            Err(Error::InvalidDataFormat(_))
        ));
    }

    #[test]
    fn test_build_exercise_unknown_labels_fall_back() {
        let record = build_exercise(&cols("Thing,Şey,mystery,spaceship")).unwrap();
        assert_eq!(record.category, ExerciseCategory::Other);
        assert_eq!(record.equipment, Equipment::Other);
    }

    #[test]
    fn test_build_food_full_row() {
        let record = build_food(&cols(
            r#"Greek Yogurt,Süzme Yoğurt,"Brand, Inc.",97,9,3.98,5,dairy,150,1 cup"#,
        ))
        .unwrap();
        assert_eq!(record.name_local, "Süzme Yoğurt");
        assert_eq!(record.brand.as_deref(), Some("Brand, Inc."));
        assert_eq!(record.carbs, 3.98);
        assert_eq!(record.category, FoodCategory::Dairy);
        assert_eq!(record.serving_size_grams, Some(150.0));
        assert_eq!(record.serving_name.as_deref(), Some("1 cup"));
    }

    #[test]
    fn test_build_food_optional_fields() {
        let record = build_food(&cols("Apple,,,52,0.3,14,0.2,")).unwrap();
        assert_eq!(record.name_local, "Apple");
        assert_eq!(record.brand, None);
        assert_eq!(record.category, FoodCategory::Other);
        assert_eq!(record.serving_size_grams, None);
        assert_eq!(record.serving_name, None);

        let record = build_food(&cols("Apple,Elma,,52,0.3,14,0.2,fruits,abc,")).unwrap();
        assert_eq!(record.serving_size_grams, None);
        assert_eq!(record.serving_name, None);
    }

    #[test]
    fn test_build_food_rejects_bad_numbers() {
        for line in [
            "Apple,Elma,,fifty,0.3,14,0.2,fruits",
            "Apple,Elma,,52,-1,14,0.2,fruits",
            "Apple,Elma,,52,0.3,,0.2,fruits",
            "Apple,Elma,,52,0.3,14,NaN,fruits",
        ] {
            assert!(
                matches!(build_food(&cols(line)), Err(Error::InvalidDataFormat(_))),
                "{} should be rejected",
                line
            );
        }
    }

    #[test]
    fn test_build_food_rejects_short_rows_and_missing_name() {
        assert!(matches!(build_food(&[]), Err(Error::InvalidDataFormat(_))));
        assert!(matches!(
            build_food(&cols("Apple,Elma,,52,0.3,14,0.2")),
            Err(Error::InvalidDataFormat(_))
        ));
        assert!(matches!(
            build_food(&cols(",Elma,,52,0.3,14,0.2,fruits")),
            Err(Error::InvalidDataFormat(_))
        ));
    }
}
