use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tier_backup::config::{self, ResolvedConfig};
use tier_backup::managers::backup::{ArtifactOutcome, BackupManager};
use tier_backup::managers::logging::{init_logging, LoggingConfig};
use tier_backup::policy::{select_base_tier, Tier};
use tier_backup::strategies;

#[derive(Parser)]
#[command(name = "tier-backup")]
#[command(about = "Tiered backups with per-tier retention", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file (.toml, or legacy .json)
    #[arg(short, long, default_value = "tier-backup.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create due backups, then rotate old ones (default)
    Run,

    /// Create due backups without rotating
    Create,

    /// Delete backups beyond each tier's retention count
    Rotate {
        /// Show what would be deleted without deleting
        #[arg(long)]
        dry_run: bool,
    },

    /// Show which tier is due and what rotation would delete
    Plan {
        /// Evaluate tier selection for this date (YYYY-MM-DD) instead of today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List existing backups grouped by tier
    List,

    /// Validate configuration file
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration {:?}", cli.config))?;
    let resolved = config::resolve_config(&config)?;

    // Setup logging with file rotation (must keep guard alive)
    let logging_config = LoggingConfig::from_section(&config.logging);
    let _log_guard = init_logging(&logging_config)?;

    let manager = BackupManager::new(resolved.clone());

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let report = manager.run(Local::now())?;
            print_creation(&report.creation.base, &report.creation.hourly);
            println!(
                "✓ Rotation: {} kept, {} deleted",
                report.rotation.kept(),
                report.rotation.deleted.len()
            );
            for (path, error) in &report.rotation.failed {
                eprintln!("⚠️  Could not delete {}: {}", path.display(), error);
            }
        }

        Commands::Create => {
            let report = manager.create_backups(Local::now())?;
            print_creation(&report.base, &report.hourly);
        }

        Commands::Rotate { dry_run } => {
            let report = manager.rotate(dry_run)?;
            if report.expired.is_empty() {
                println!("Nothing to rotate");
            }
            for artifact in &report.expired {
                let verb = if dry_run { "Would delete" } else { "Deleting" };
                println!("{} [{}] {}", verb, artifact.tier, artifact.path.display());
            }
            for (path, error) in &report.failed {
                eprintln!("⚠️  Could not delete {}: {}", path.display(), error);
            }
        }

        Commands::Plan { date } => {
            handle_plan(&manager, &resolved, date)?;
        }

        Commands::List => {
            handle_list(&manager, &resolved)?;
        }

        Commands::Validate => {
            handle_validate(&manager, &resolved);
        }
    }

    Ok(())
}

fn print_creation(base: &ArtifactOutcome, hourly: &ArtifactOutcome) {
    let mut produced = false;
    for outcome in [base, hourly] {
        match outcome {
            ArtifactOutcome::Created(path) => {
                produced = true;
                println!("✓ Created {}", path.display());
            }
            ArtifactOutcome::Duplicated { from, to } => {
                produced = true;
                println!("✓ Copied {} -> {}", from.display(), to.display());
            }
            ArtifactOutcome::AlreadyExists(path) => {
                println!("Already exists: {}", path.display());
            }
            ArtifactOutcome::Disabled => {}
        }
    }
    if !produced {
        println!("Nothing to create");
    }
}

fn handle_plan(manager: &BackupManager, config: &ResolvedConfig, date: Option<NaiveDate>) -> Result<()> {
    let now = Local::now().naive_local();
    let at = date.map(|d| d.and_time(now.time())).unwrap_or(now);

    let tier = select_base_tier(at.date(), &config.retention);
    let enabled = config.retention.is_enabled(tier);

    println!("=== Plan for '{}' on {} ===\n", config.project, at.date());
    println!(
        "Base tier: {}{}",
        tier,
        if enabled { "" } else { " (disabled, nothing created)" }
    );
    if enabled {
        println!("  Target: {}", manager.namer().base_path(tier, at).display());
    }
    if config.retention.is_enabled(Tier::Hourly) {
        println!("Hourly target: {}", manager.namer().hourly_path(at).display());
    }

    let expired = manager.rotator().plan()?;
    println!();
    if expired.is_empty() {
        println!("Rotation: nothing to delete");
    } else {
        println!("Rotation would delete {} backup(s):", expired.len());
        for artifact in expired {
            println!("  [{}] {}", artifact.tier, artifact.path.display());
        }
    }

    Ok(())
}

fn handle_list(manager: &BackupManager, config: &ResolvedConfig) -> Result<()> {
    let mut artifacts = manager.rotator().scan()?;
    artifacts.sort_by(|a, b| b.created.cmp(&a.created));

    println!("=== Backups for '{}' in {} ===", config.project, config.destination.display());

    for tier in Tier::ALL {
        let tier_artifacts: Vec<_> = artifacts.iter().filter(|a| a.tier == tier).collect();
        println!(
            "\n{} ({} of {} kept)",
            tier,
            tier_artifacts.len(),
            config.retention.count(tier)
        );
        for artifact in tier_artifacts {
            println!(
                "  {}  {}",
                artifact.created.format("%Y-%m-%d %H:%M:%S"),
                artifact.name
            );
        }
    }

    Ok(())
}

fn handle_validate(manager: &BackupManager, config: &ResolvedConfig) {
    let strategy = strategies::for_method(config.method);
    let output_kind = if strategy.produces_directory() {
        "mirrored directory"
    } else {
        "archive file"
    };

    println!("✓ Configuration is valid\n");
    println!("Project:     {}", config.project);
    println!("Source:      {}", config.source.display());
    println!("Destination: {}", config.destination.display());
    println!("Method:      {} ({})", config.method, output_kind);
    println!("Command:     {}", config.command);
    println!(
        "Retention:   hourly={} daily={} weekly={} monthly={} yearly={}",
        config.retention.hourly,
        config.retention.daily,
        config.retention.weekly,
        config.retention.monthly,
        config.retention.yearly
    );

    if let Err(e) = manager.check_archiver() {
        println!("\n⚠️  {:#}", e);
    }
}
