mod cli;
mod ops;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("custnote={level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (path, settings) = ops::resolve_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Init { data_dir, storage_root } => {
            ops::do_init(&path, settings, data_dir, storage_root)?;
        }
        Commands::Add { first_name, fields } => {
            ops::do_add(&settings, first_name, fields.into_patch(None))?;
        }
        Commands::Edit { id, first_name, fields } => {
            ops::do_edit(&settings, id, fields.into_patch(first_name))?;
        }
        Commands::Delete { id, yes } => {
            ops::do_delete(&settings, id, yes)?;
        }
        Commands::Show { id } => {
            ops::do_show(&settings, id)?;
        }
        Commands::List { terms } => {
            ops::do_list(&settings, &terms)?;
        }
        Commands::Backup { overwrite } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(ops::do_backup(&settings, overwrite))?;
        }
        Commands::Restore { overwrite } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(ops::do_restore(&settings, overwrite))?;
        }
        Commands::Config => {
            ops::do_config(&path, &settings)?;
        }
        Commands::Version => {
            ops::do_version();
        }
    }

    Ok(())
}
