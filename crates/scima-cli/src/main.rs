//! scima CLI - versioned SQL schema migrations for SAP HANA and PostgreSQL.

use clap::{Parser, Subcommand};
use scima::{
    drivers, migrate, Config, ConfigOverrides, DialectCatalog, MigrateError, MigrationFile,
    Migrator,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info, Level};

#[derive(Parser)]
#[command(name = "scima")]
#[command(about = "Versioned SQL schema migrations for SAP HANA and PostgreSQL")]
#[command(version)]
struct Cli {
    /// Path to configuration file (YAML, JSON or TOML) [default: ./scima.yaml, ./scima.yml, ./scima.json, ./scima.toml]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database driver: hana, postgres (alias: pg)
    #[arg(long, global = true)]
    driver: Option<String>,

    /// Driver-specific connection string
    #[arg(long, env = "SCIMA_DSN", hide_env_values = true, global = true)]
    dsn: Option<String>,

    /// Directory containing migration files
    #[arg(long, global = true)]
    migrations_dir: Option<PathBuf>,

    /// Schema for {{schema}} placeholders and the migration table
    #[arg(long, global = true)]
    schema: Option<String>,

    /// Output JSON result to stdout
    #[arg(long, global = true)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text", global = true)]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info", global = true)]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the migration table if it does not exist
    Init,

    /// Show applied and pending migrations
    Status,

    /// Apply all pending migrations
    Up {
        /// Show the migrations that would run without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Revert applied migrations, newest first
    Down {
        /// Number of migrations to revert (0 = all)
        #[arg(long, default_value = "1")]
        steps: usize,

        /// Show the migrations that would be reverted without running them
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), MigrateError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format).map_err(MigrateError::Config)?;

    let config = match &cli.config {
        Some(path) => {
            let config = Config::load(path)?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => Config::discover()?,
    };
    let config = config.with_overrides(ConfigOverrides {
        driver: cli.driver.clone(),
        dsn: cli.dsn.clone(),
        migrations_dir: cli.migrations_dir.clone(),
        schema: cli.schema.clone(),
    });
    config.validate()?;
    debug!("Effective configuration: {:?}", config);

    // Unknown drivers fail here, before any database contact
    let catalog = DialectCatalog::with_builtins();
    let dialect = catalog.require_dialect(&config.driver)?;

    // Migration files are validated before connecting as well
    let pairs = match cli.command {
        Commands::Init => Vec::new(),
        _ => {
            let pairs = migrate::scan_dir(&config.migrations_dir)?;
            migrate::validate(&pairs)?;
            pairs
        }
    };

    let conn = drivers::connect(dialect.name(), &config.dsn).await?;
    let migrator = Migrator::new(dialect, conn, config.schema.clone());

    match cli.command {
        Commands::Init => {
            migrator.ensure_migration_table().await?;
            info!("Migration table {} ready", migrator.migration_table());
            println!("migration table ensured");
        }

        Commands::Status => {
            let applied = migrator.status().await?;
            let report = migrate::status_report(&pairs, &applied);

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", migrate::format_status(&report));
            }
        }

        Commands::Up { dry_run } => {
            let applied = migrator.status().await?;
            let pending = migrate::filter_pending(&pairs, &applied);

            if dry_run {
                print_plan(&pending, cli.output_json)?;
                return Ok(());
            }

            info!("Applying {} pending migrations", pending.len());
            let summary = migrator.apply_up(&pending).await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "applied {} migrations in {:.2}s",
                    summary.count(),
                    summary.duration_seconds
                );
            }
        }

        Commands::Down { steps, dry_run } => {
            let applied = migrator.status().await?;
            let plan = migrate::reverse_for_down(&pairs, &applied, steps);

            if dry_run {
                print_plan(&plan, cli.output_json)?;
                return Ok(());
            }

            if plan.is_empty() && !cli.output_json {
                println!("no migrations to revert");
                return Ok(());
            }

            info!("Reverting {} migrations", plan.len());
            let summary = migrator.apply_down(&plan).await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "reverted {} migrations in {:.2}s",
                    summary.count(),
                    summary.duration_seconds
                );
            }
        }
    }

    Ok(())
}

/// Print the migrations a dry run would execute, in execution order.
fn print_plan(files: &[MigrationFile], output_json: bool) -> Result<(), MigrateError> {
    if output_json {
        let plan: Vec<_> = files
            .iter()
            .map(|f| {
                serde_json::json!({
                    "version": f.version,
                    "name": f.name,
                    "direction": f.direction,
                    "path": f.path,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    if files.is_empty() {
        println!("nothing to do");
    }
    for f in files {
        println!("{:04}\t{}\t{}", f.version, f.name, f.direction);
    }
    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => return Err(format!("unknown verbosity '{}'", other)),
    };

    // stdout carries command output; logs go to stderr
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        "json" => subscriber.json().init(),
        "text" => subscriber.init(),
        other => return Err(format!("unknown log format '{}'", other)),
    }

    Ok(())
}
