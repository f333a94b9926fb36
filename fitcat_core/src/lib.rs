#![forbid(unsafe_code)]

//! Core domain model and ingestion pipeline for the fitcat reference catalog.
//!
//! This crate provides:
//! - Domain types (exercise and food records, category taxonomies)
//! - Row parsing and record validation for the bundled CSV resources
//! - Persistence (unit-of-work store context, JSON file backend)
//! - Seeding with a built-in fallback catalog
//! - Normalization passes and maintenance operations
//! - Name-to-id resolution for exercises

pub mod types;
pub mod error;
pub mod taxonomy;
pub mod row;
pub mod record;
pub mod store;
pub mod json_store;
pub mod resolver;
pub mod fallback;
pub mod seed;
pub mod normalize;
pub mod maintenance;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use taxonomy::{Equipment, ExerciseCategory, FoodCategory};
pub use config::Config;
pub use store::{Backend, MemoryBackend, Store, StoreContext};
pub use json_store::JsonFileBackend;
pub use resolver::ExerciseResolver;
pub use fallback::fallback_catalog;
pub use seed::{Resources, SeedOptions, SeedPhase, SeedReport, Seeder};
pub use normalize::{normalize_all, NormalizationReport};
pub use maintenance::{clear_exercises_only, clear_foods_only, counts, is_empty, Counts};
