pub mod cli;
pub mod column;
pub mod config;
pub mod destination;
pub mod error;
pub mod inspect;
pub mod orchestrator;
pub mod row;
pub mod source;
pub mod table;
pub mod xml;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, info};

use crate::{
    cli::{Cli, Commands},
    destination::{ScriptDestination, SqliteDestination},
    orchestrator::{LogObserver, MigrationOrchestrator, RunSummary},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("datatable_migrate", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Migrate(args) => handle_migrate(&args),
        Commands::Infer(args) => inspect::execute(&args),
    }
}

fn handle_migrate(args: &cli::MigrateArgs) -> Result<()> {
    let config = args.settings.resolve()?;
    info!(
        "Migrating '{}' files from {:?}",
        config.file_pattern, args.folder
    );

    let summary = if let Some(database) = &args.database {
        let mut destination = SqliteDestination::open(database)
            .with_context(|| format!("Opening SQLite database {database:?}"))?;
        MigrationOrchestrator::new(&mut destination, &LogObserver, config)
            .run(&args.folder)
            .with_context(|| format!("Migrating {:?} into {database:?}", args.folder))?
    } else if let Some(script) = &args.script {
        let mut destination = ScriptDestination::create(script)
            .with_context(|| format!("Creating script output {script:?}"))?;
        let summary = MigrationOrchestrator::new(&mut destination, &LogObserver, config)
            .run(&args.folder)
            .with_context(|| format!("Migrating {:?} into script {script:?}", args.folder))?;
        destination
            .into_inner()
            .with_context(|| format!("Flushing script output {script:?}"))?;
        summary
    } else {
        bail!("Either --database or --script is required");
    };

    report(&summary);
    Ok(())
}

fn report(summary: &RunSummary) {
    info!(
        "Migrated {} file(s): {} table(s) created, {} row(s) inserted",
        summary.sources.len(),
        summary.tables_created(),
        summary.rows_inserted()
    );
}
