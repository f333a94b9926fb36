//! Seeding: load the bundled resources into an empty store.
//!
//! Phases of a run:
//!
//! ```text
//! NotStarted -> Loading -> Parsing -> Inserting -> Normalizing -> Done
//!                  \           \
//!                   +-----------+--> FallenBack -> Normalizing -> Done
//! ```
//!
//! Each resource is handled on its own. A missing, empty or undecodable
//! resource, or one where no row survives validation, is replaced by the
//! built-in fallback data for that kind. Single bad rows are logged and
//! skipped. Everything a run inserts is committed in one `save()`.

use crate::fallback::fallback_catalog;
use crate::maintenance::{is_empty, queue_delete_all};
use crate::normalize::{normalize_all, NormalizationReport};
use crate::record::{build_exercise, build_food};
use crate::row::data_rows;
use crate::store::Store;
use crate::{EntityKind, Error, Exercise, ExerciseRecord, Food, FoodRecord, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ============================================================================
// Inputs
// ============================================================================

/// Locations of the two reference resources
#[derive(Clone, Debug)]
pub struct Resources {
    pub exercises: PathBuf,
    pub foods: PathBuf,
}

impl Resources {
    pub fn in_dir(dir: impl AsRef<Path>, exercises: &str, foods: &str) -> Self {
        let dir = dir.as_ref();
        Self {
            exercises: dir.join(exercises),
            foods: dir.join(foods),
        }
    }
}

/// Seeding switches
#[derive(Clone, Debug)]
pub struct SeedOptions {
    /// Normalize a non-empty store even though seeding is skipped
    pub normalize_existing: bool,
    /// Drop rows repeating an earlier English name in the same resource
    pub skip_duplicate_names: bool,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            normalize_existing: true,
            skip_duplicate_names: true,
        }
    }
}

/// Read a resource as text.
///
/// Missing file -> `FileNotFound`, zero bytes -> `EmptyFile`, bad UTF-8 ->
/// `Parsing`. A leading byte-order mark is dropped.
pub fn load_resource(path: &Path) -> Result<String> {
    let name = path.display().to_string();
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::FileNotFound(name));
        }
        Err(e) => return Err(Error::Io(e)),
    };

    if bytes.is_empty() {
        return Err(Error::EmptyFile(name));
    }

    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
    let text = std::str::from_utf8(bytes)
        .map_err(|e| Error::Parsing(format!("{} is not valid UTF-8: {}", name, e)))?;
    tracing::debug!("Loaded resource {} ({} bytes)", name, bytes.len());
    Ok(text.to_string())
}

// ============================================================================
// Report
// ============================================================================

/// Where a run currently is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedPhase {
    NotStarted,
    Loading,
    Parsing,
    Inserting,
    Normalizing,
    Done,
    FallenBack,
}

/// What happened to one resource
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResourceOutcome {
    pub kind: EntityKind,
    /// Non-blank data rows read (header excluded)
    pub rows: usize,
    pub inserted: usize,
    pub rejected: usize,
    pub duplicates: usize,
    /// Set when the built-in fallback data was used instead
    pub fallback_reason: Option<String>,
}

impl ResourceOutcome {
    fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            rows: 0,
            inserted: 0,
            rejected: 0,
            duplicates: 0,
            fallback_reason: None,
        }
    }

    pub fn fell_back(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

/// Summary of a seeding run
#[derive(Clone, Debug, Serialize)]
pub struct SeedReport {
    /// False when the store already had data and seeding was skipped
    pub seeded: bool,
    /// Phases entered, in order
    pub phases: Vec<SeedPhase>,
    pub exercises: Option<ResourceOutcome>,
    pub foods: Option<ResourceOutcome>,
    pub normalization: Option<NormalizationReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl SeedReport {
    fn new() -> Self {
        Self {
            seeded: false,
            phases: vec![SeedPhase::NotStarted],
            exercises: None,
            foods: None,
            normalization: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// True if any resource was replaced by fallback data.
    pub fn fell_back(&self) -> bool {
        self.exercises.iter().chain(self.foods.iter()).any(|o| o.fell_back())
    }

    pub fn phase(&self) -> SeedPhase {
        self.phases.last().copied().unwrap_or(SeedPhase::NotStarted)
    }

    fn enter(&mut self, phase: SeedPhase) {
        if self.phase() != phase {
            tracing::debug!("Seeding phase: {:?} -> {:?}", self.phase(), phase);
            self.phases.push(phase);
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Records that survived validation, plus row statistics
struct Parsed<R> {
    records: Vec<R>,
    rows: usize,
    rejected: usize,
    duplicates: usize,
}

fn parse_records<R>(
    text: &str,
    kind: EntityKind,
    build: fn(&[String]) -> Result<R>,
    name_of: fn(&R) -> &str,
    skip_duplicates: bool,
) -> Result<Parsed<R>> {
    let mut parsed = Parsed {
        records: Vec::new(),
        rows: 0,
        rejected: 0,
        duplicates: 0,
    };
    let mut seen = HashSet::new();

    for (line, columns) in data_rows(text) {
        parsed.rows += 1;
        match build(&columns) {
            Ok(record) => {
                if skip_duplicates && !seen.insert(name_of(&record).to_string()) {
                    tracing::debug!(
                        "Skipping duplicate {} '{}' at line {}",
                        kind,
                        name_of(&record),
                        line
                    );
                    parsed.duplicates += 1;
                    continue;
                }
                parsed.records.push(record);
            }
            Err(e) => {
                tracing::warn!("Skipping {} row at line {}: {}", kind, line, e);
                parsed.rejected += 1;
            }
        }
    }

    if parsed.records.is_empty() {
        return Err(Error::InvalidDataFormat(format!(
            "no valid {} rows ({} read, {} rejected)",
            kind, parsed.rows, parsed.rejected
        )));
    }
    Ok(parsed)
}

fn exercise_name(record: &ExerciseRecord) -> &str {
    &record.name_en
}

fn food_name(record: &FoodRecord) -> &str {
    &record.name_en
}

fn parse_exercises(text: &str, skip_duplicates: bool) -> Result<Parsed<ExerciseRecord>> {
    parse_records(
        text,
        EntityKind::Exercise,
        build_exercise,
        exercise_name,
        skip_duplicates,
    )
}

fn parse_foods(text: &str, skip_duplicates: bool) -> Result<Parsed<FoodRecord>> {
    parse_records(
        text,
        EntityKind::Food,
        build_food,
        food_name,
        skip_duplicates,
    )
}

// ============================================================================
// Seeder
// ============================================================================

/// Drives loading, parsing, insertion and normalization
#[derive(Clone, Debug)]
pub struct Seeder {
    resources: Resources,
    options: SeedOptions,
}

/// Records for one kind after loading and parsing, or the reason they're missing
enum Loaded<R> {
    Parsed(Parsed<R>),
    Failed(Error),
}

impl<R> Loaded<R> {
    /// Resource-level failures become fallback; anything else aborts the run.
    fn from_result(result: Result<Parsed<R>>) -> Result<Self> {
        match result {
            Ok(parsed) => Ok(Loaded::Parsed(parsed)),
            Err(e) if e.triggers_fallback() => Ok(Loaded::Failed(e)),
            Err(e) => Err(e),
        }
    }
}

impl Seeder {
    pub fn new(resources: Resources) -> Self {
        Self {
            resources,
            options: SeedOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SeedOptions) -> Self {
        self.options = options;
        self
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    /// Seed the store if it has no exercises, then normalize.
    ///
    /// A non-empty store is never seeded again; it is only normalized (when
    /// `normalize_existing` is set). Emptiness is checked again at commit
    /// time, so a store seeded by another process in the meantime is skipped
    /// the same way. A commit failure is returned as `Database` after a
    /// best-effort commit of the fallback catalog.
    pub fn run<S: Store>(&self, store: &mut S) -> Result<SeedReport> {
        let report = SeedReport::new();

        if !is_empty(store)? {
            tracing::info!("Store already has exercises, skipping seeding");
            return self.skip(store, report);
        }
        self.seed_empty(store, report)
    }

    fn seed_empty<S: Store>(&self, store: &mut S, mut report: SeedReport) -> Result<SeedReport> {

        tracing::info!("Seeding empty store from {:?}", self.resources);
        report.enter(SeedPhase::Loading);
        let exercise_text = load_resource(&self.resources.exercises);
        let food_text = load_resource(&self.resources.foods);

        if exercise_text.is_ok() || food_text.is_ok() {
            report.enter(SeedPhase::Parsing);
        }
        let skip = self.options.skip_duplicate_names;
        let exercises =
            Loaded::from_result(exercise_text.and_then(|t| parse_exercises(&t, skip)))?;
        let foods = Loaded::from_result(food_text.and_then(|t| parse_foods(&t, skip)))?;

        let any_parsed =
            matches!(exercises, Loaded::Parsed(_)) || matches!(foods, Loaded::Parsed(_));
        let any_failed =
            matches!(exercises, Loaded::Failed(_)) || matches!(foods, Loaded::Failed(_));
        if any_failed {
            report.enter(SeedPhase::FallenBack);
        }
        if any_parsed {
            report.enter(SeedPhase::Inserting);
        }

        store.require_empty::<Exercise>();
        let mut exercise_outcome = queue_exercises(store, exercises);
        let mut food_outcome = queue_foods(store, foods);

        if let Err(e) = store.save() {
            store.rollback();
            if let Error::Conflict(detail) = &e {
                tracing::info!("Store was seeded elsewhere ({}), skipping seeding", detail);
                store.refresh()?;
                return self.skip(store, report);
            }
            tracing::error!("Seeding commit failed: {}", e);
            self.commit_full_fallback(store, &mut exercise_outcome, &mut food_outcome);
            return Err(e.into_database());
        }

        tracing::info!(
            "Seeded {} exercises and {} foods",
            exercise_outcome.inserted,
            food_outcome.inserted
        );
        report.seeded = true;
        report.exercises = Some(exercise_outcome);
        report.foods = Some(food_outcome);

        report.enter(SeedPhase::Normalizing);
        report.normalization = Some(normalize_all(store)?);
        Ok(self.finish(report))
    }

    /// Replace every exercise with the contents of the exercise resource,
    /// in a single commit. Foods are not touched.
    pub fn reseed_exercises<S: Store>(&self, store: &mut S) -> Result<SeedReport> {
        let mut report = SeedReport::new();

        report.enter(SeedPhase::Loading);
        let parsed = load_resource(&self.resources.exercises).and_then(|text| {
            report.enter(SeedPhase::Parsing);
            parse_exercises(&text, self.options.skip_duplicate_names)
        });
        let loaded = Loaded::from_result(parsed)?;
        report.enter(match loaded {
            Loaded::Parsed(_) => SeedPhase::Inserting,
            Loaded::Failed(_) => SeedPhase::FallenBack,
        });

        let removed = queue_delete_all::<Exercise, S>(store)?;
        let outcome = queue_exercises(store, loaded);
        if let Err(e) = store.save() {
            store.rollback();
            return Err(e);
        }
        tracing::info!(
            "Reseeded exercises: removed {}, inserted {}",
            removed,
            outcome.inserted
        );
        report.seeded = true;
        report.exercises = Some(outcome);

        report.enter(SeedPhase::Normalizing);
        report.normalization = Some(normalize_all(store)?);
        Ok(self.finish(report))
    }

    /// Leave the store as it is, normalizing it if configured to.
    fn skip<S: Store>(&self, store: &mut S, mut report: SeedReport) -> Result<SeedReport> {
        if self.options.normalize_existing {
            report.enter(SeedPhase::Normalizing);
            report.normalization = Some(normalize_all(store)?);
        }
        Ok(self.finish(report))
    }

    /// After a failed commit: try once to leave the store with the built-in catalog.
    fn commit_full_fallback<S: Store>(
        &self,
        store: &mut S,
        exercises: &mut ResourceOutcome,
        foods: &mut ResourceOutcome,
    ) {
        store.require_empty::<Exercise>();
        let failed = Loaded::Failed(Error::Database("commit failed".into()));
        *exercises = queue_exercises(store, failed);
        let failed = Loaded::Failed(Error::Database("commit failed".into()));
        *foods = queue_foods(store, failed);
        match store.save() {
            Ok(()) => tracing::warn!("Committed fallback catalog after failed seeding commit"),
            Err(e) => {
                tracing::error!("Fallback commit also failed: {}", e);
                store.rollback();
                exercises.inserted = 0;
                foods.inserted = 0;
            }
        }
    }

    fn finish(&self, mut report: SeedReport) -> SeedReport {
        report.enter(SeedPhase::Done);
        report.finished_at = Some(Utc::now());
        report
    }
}

fn queue_exercises<S: Store>(store: &mut S, loaded: Loaded<ExerciseRecord>) -> ResourceOutcome {
    let mut outcome = ResourceOutcome::new(EntityKind::Exercise);
    let records = match loaded {
        Loaded::Parsed(parsed) => {
            outcome.rows = parsed.rows;
            outcome.rejected = parsed.rejected;
            outcome.duplicates = parsed.duplicates;
            parsed.records
        }
        Loaded::Failed(e) => {
            tracing::warn!("Exercise resource unusable ({}), using built-in exercises", e);
            outcome.fallback_reason = Some(e.to_string());
            fallback_catalog().exercises.clone()
        }
    };
    outcome.inserted = records.len();
    for record in records {
        store.insert(Exercise::from_record(record));
    }
    outcome
}

fn queue_foods<S: Store>(store: &mut S, loaded: Loaded<FoodRecord>) -> ResourceOutcome {
    let mut outcome = ResourceOutcome::new(EntityKind::Food);
    let records = match loaded {
        Loaded::Parsed(parsed) => {
            outcome.rows = parsed.rows;
            outcome.rejected = parsed.rejected;
            outcome.duplicates = parsed.duplicates;
            parsed.records
        }
        Loaded::Failed(e) => {
            tracing::warn!("Food resource unusable ({}), using built-in foods", e);
            outcome.fallback_reason = Some(e.to_string());
            fallback_catalog().foods.clone()
        }
    };
    outcome.inserted = records.len();
    for record in records {
        store.insert(Food::from_record(record));
    }
    outcome
}
