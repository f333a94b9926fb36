//! Core domain types for the reference catalog.
//!
//! Two layers:
//! - Records (`ExerciseRecord`, `FoodRecord`): validated, transient values
//!   built from resource rows, without identity
//! - Entities (`Exercise`, `Food`): records after insertion into a store,
//!   carrying a stable identifier

use crate::taxonomy::{Equipment, ExerciseCategory, FoodCategory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Records
// ============================================================================

/// A validated exercise row, ready to be inserted
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExerciseRecord {
    pub name_en: String,
    pub name_local: String,
    pub category: ExerciseCategory,
    pub equipment: Equipment,
    pub supports_weight: bool,
    pub supports_reps: bool,
    pub supports_time: bool,
    pub supports_distance: bool,
}

/// A validated food row, ready to be inserted
///
/// Macros are per 100 g and never negative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoodRecord {
    pub name_en: String,
    pub name_local: String,
    pub brand: Option<String>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub category: FoodCategory,
    pub serving_size_grams: Option<f64>,
    pub serving_name: Option<String>,
}

// ============================================================================
// Persisted entities
// ============================================================================

/// An exercise as stored in the catalog
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: Uuid,
    pub name_en: String,
    pub name_local: String,
    pub category: ExerciseCategory,
    pub equipment: Equipment,
    pub supports_weight: bool,
    pub supports_reps: bool,
    pub supports_time: bool,
    pub supports_distance: bool,
    pub created_at: DateTime<Utc>,
}

impl Exercise {
    /// Give a record its persisted identity.
    pub fn from_record(record: ExerciseRecord) -> Self {
        Exercise {
            id: Uuid::new_v4(),
            name_en: record.name_en,
            name_local: record.name_local,
            category: record.category,
            equipment: record.equipment,
            supports_weight: record.supports_weight,
            supports_reps: record.supports_reps,
            supports_time: record.supports_time,
            supports_distance: record.supports_distance,
            created_at: Utc::now(),
        }
    }
}

/// A food as stored in the catalog
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: Uuid,
    pub name_en: String,
    pub name_local: String,
    pub brand: Option<String>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub category: FoodCategory,
    pub serving_size_grams: Option<f64>,
    pub serving_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Food {
    /// Give a record its persisted identity.
    pub fn from_record(record: FoodRecord) -> Self {
        Food {
            id: Uuid::new_v4(),
            name_en: record.name_en,
            name_local: record.name_local,
            brand: record.brand,
            calories: record.calories,
            protein: record.protein,
            carbs: record.carbs,
            fat: record.fat,
            category: record.category,
            serving_size_grams: record.serving_size_grams,
            serving_name: record.serving_name,
            created_at: Utc::now(),
        }
    }
}

/// Which resource a record or count belongs to
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Exercise,
    Food,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Exercise => f.write_str("exercise"),
            EntityKind::Food => f.write_str("food"),
        }
    }
}
