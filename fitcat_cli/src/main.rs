use clap::{Parser, Subcommand};
use fitcat_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fitcat")]
#[command(about = "Exercise and food reference catalog maintenance", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override the directory holding exercises.csv / foods.csv
    #[arg(long, global = true)]
    resources: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed an empty store from the resources, then normalize
    Seed {
        /// Print the seed report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace all exercises from the exercise resource (foods are kept)
    ReseedExercises,

    /// Run the normalization passes over stored data
    Normalize,

    /// Delete every exercise
    ClearExercises,

    /// Delete every food
    ClearFoods,

    /// Show store location and record counts (default)
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve exercise names (English or local) to ids
    Resolve {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    fitcat_core::logging::init_with_level(fitcat_core::logging::level_for_verbosity(cli.verbose));

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }
    if let Some(dir) = cli.resources {
        config.resources.dir = Some(dir);
    }

    tracing::debug!("Using store at {:?}", config.store_path());
    let mut store = StoreContext::open(JsonFileBackend::new(config.store_path()))?;

    match cli.command {
        Some(Commands::Seed { json }) => cmd_seed(&config, &mut store, json),
        Some(Commands::ReseedExercises) => cmd_reseed_exercises(&config, &mut store),
        Some(Commands::Normalize) => cmd_normalize(&mut store),
        Some(Commands::ClearExercises) => {
            let removed = clear_exercises_only(&mut store)?;
            println!("✓ Removed {} exercises", removed);
            Ok(())
        }
        Some(Commands::ClearFoods) => {
            let removed = clear_foods_only(&mut store)?;
            println!("✓ Removed {} foods", removed);
            Ok(())
        }
        Some(Commands::Status { json }) => cmd_status(&config, &store, json),
        Some(Commands::Resolve { names }) => cmd_resolve(&store, &names),
        None => cmd_status(&config, &store, false),
    }
}

type FileStore = StoreContext<JsonFileBackend>;

fn seeder(config: &Config) -> Seeder {
    Seeder::new(config.resources()).with_options(config.seed_options())
}

fn cmd_seed(config: &Config, store: &mut FileStore, json: bool) -> Result<()> {
    let report = seeder(config).run(store)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if !report.seeded {
        println!("Store already populated - seeding skipped.");
    }
    display_report(&report);
    Ok(())
}

fn cmd_reseed_exercises(config: &Config, store: &mut FileStore) -> Result<()> {
    let report = seeder(config).reseed_exercises(store)?;
    display_report(&report);
    Ok(())
}

fn cmd_normalize(store: &mut FileStore) -> Result<()> {
    let report = normalize_all(store)?;
    display_normalization(&report);
    Ok(())
}

fn cmd_status(config: &Config, store: &FileStore, json: bool) -> Result<()> {
    let counts = counts(store)?;

    if json {
        let status = serde_json::json!({
            "store": config.store_path(),
            "resources": config.resource_dir(),
            "revision": store.revision(),
            "updated_at": store.updated_at(),
            "exercises": counts.exercises,
            "foods": counts.foods,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("Store:     {}", config.store_path().display());
    println!("Resources: {}", config.resource_dir().display());
    println!("Revision:  {}", store.revision());
    if let Some(updated_at) = store.updated_at() {
        println!("Updated:   {}", updated_at.to_rfc3339());
    }
    println!("Exercises: {}", counts.exercises);
    println!("Foods:     {}", counts.foods);
    Ok(())
}

fn cmd_resolve(store: &FileStore, names: &[String]) -> Result<()> {
    let mut resolver = ExerciseResolver::new();
    for name in names {
        match resolver.resolve_id(name, store) {
            Some(id) => println!("{}\t{}", name, id),
            None => println!("{}\t(not found)", name),
        }
    }
    tracing::debug!(
        "Resolved {} names with {} store queries ({} distinct)",
        names.len(),
        resolver.store_queries(),
        resolver.cached()
    );
    Ok(())
}

fn display_report(report: &SeedReport) {
    for outcome in [&report.exercises, &report.foods].into_iter().flatten() {
        match &outcome.fallback_reason {
            Some(reason) => {
                println!(
                    "✓ {}: {} built-in records (fallback: {})",
                    outcome.kind, outcome.inserted, reason
                );
            }
            None => {
                println!(
                    "✓ {}: {} inserted from {} rows",
                    outcome.kind, outcome.inserted, outcome.rows
                );
                if outcome.rejected > 0 || outcome.duplicates > 0 {
                    println!(
                        "  {} rejected, {} duplicates skipped",
                        outcome.rejected, outcome.duplicates
                    );
                }
            }
        }
    }

    if let Some(normalization) = &report.normalization {
        display_normalization(normalization);
    }
}

fn display_normalization(report: &NormalizationReport) {
    println!(
        "✓ Normalized: {} exercises recategorized, {} food names filled, {} foods recategorized",
        report.exercises_recategorized, report.foods.names_filled, report.foods.recategorized
    );
    if report.foods.still_other > 0 {
        println!("  {} foods remain uncategorized", report.foods.still_other);
    }
}
