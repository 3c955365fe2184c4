use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use colored::*;
use comfy_table::{Attribute, Cell, ContentArrangement, Table, presets::UTF8_FULL};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::runtime::Handle;

use custnote::config::loader;
use custnote::config::settings::{Settings, TASK_ID_BACKUP, TASK_ID_RESTORE};
use custnote::customers::{Customer, CustomerPatch, CustomerRepository};
use custnote::drivers::sqlite::SqliteFileTransfer;
use custnote::jobs::backup::{BackupExecutor, BackupOutcome};
use custnote::jobs::restore::{RestoreExecutor, RestoreOutcome};
use custnote::jobs::{BackupJob, RestoreJob};
use custnote::storage::{LocalStorage, StorageProbe};

/// What the user is told about a finished job.
#[derive(Debug, PartialEq, Eq)]
enum Notice {
    Success(String),
    /// Ask before re-issuing the job with overwrite enabled.
    Confirm(String),
    /// Nothing was copied, or the copy broke off; the command exits non-zero.
    Failure(String),
}

impl Notice {
    fn emit(self) -> Result<()> {
        match self {
            Notice::Success(msg) => println!("{} {}", "✔".green().bold(), msg.green()),
            Notice::Confirm(msg) => println!("{} {}", "i".yellow().bold(), msg.yellow()),
            Notice::Failure(msg) => return Err(anyhow!(msg)),
        }
        Ok(())
    }
}

pub fn resolve_settings(config: Option<&Path>) -> Result<(PathBuf, Settings)> {
    let path = match config {
        Some(p) => p.to_path_buf(),
        None => loader::default_settings_path()?,
    };
    let settings = loader::load_settings(&path)?;
    Ok((path, settings))
}

pub fn do_init(
    path: &Path,
    mut settings: Settings,
    data_dir: Option<PathBuf>,
    storage_root: Option<PathBuf>,
) -> Result<()> {
    let existed = path.exists();
    if let Some(dir) = data_dir {
        settings.data_dir = dir;
    }
    if let Some(root) = storage_root {
        settings.storage_root = root;
    }
    settings.touch();
    loader::save_settings(path, &settings)?;
    CustomerRepository::open(&settings.database_path())
        .with_context(|| format!("failed to open {}", settings.database_path().display()))?;

    let verb = if existed { "Updated" } else { "Initialized" };
    println!(
        "{} {}",
        "✔".green().bold(),
        format!("{} settings at {}", verb, path.display()).green()
    );
    Ok(())
}

pub fn do_config(path: &Path, settings: &Settings) -> Result<()> {
    let storage = LocalStorage::new(&settings.storage_root);
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Setting").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);
    let rows = [
        ("settings file", path.display().to_string()),
        ("database", settings.database_path().display().to_string()),
        ("storage root", settings.storage_root.display().to_string()),
        ("storage state", format!("{:?}", storage.state())),
        ("backup file", settings.backup_path().display().to_string()),
        ("last updated", settings.last_updated.format("%Y-%m-%d %H:%M:%S").to_string()),
    ];
    for (key, value) in rows {
        table.add_row(vec![Cell::new(key), Cell::new(value)]);
    }
    println!("{}", table);
    Ok(())
}

fn open_repository(settings: &Settings) -> Result<CustomerRepository> {
    let path = settings.database_path();
    CustomerRepository::open(&path).with_context(|| format!("failed to open {}", path.display()))
}

pub fn do_add(settings: &Settings, first_name: String, patch: CustomerPatch) -> Result<()> {
    let repo = open_repository(settings)?;
    let mut customer = Customer::new(first_name);
    customer.merge(patch);
    let id = repo.insert(&customer)?;
    println!(
        "{} {}",
        "✔".green().bold(),
        format!("Saved '{}' as customer {}", customer.display_name(), id).green()
    );
    Ok(())
}

pub fn do_edit(settings: &Settings, id: i64, patch: CustomerPatch) -> Result<()> {
    if patch.is_empty() {
        println!("{} {}", "i".yellow().bold(), "Nothing to change".yellow());
        return Ok(());
    }
    let repo = open_repository(settings)?;
    let mut customer = repo
        .get(id)?
        .ok_or_else(|| anyhow!("customer {} not found", id))?;
    customer.merge(patch);
    repo.update(&customer)?;
    println!(
        "{} {}",
        "✔".green().bold(),
        format!("Updated '{}'", customer.display_name()).green()
    );
    Ok(())
}

pub fn do_delete(settings: &Settings, id: i64, yes: bool) -> Result<()> {
    let repo = open_repository(settings)?;
    let customer = repo
        .get(id)?
        .ok_or_else(|| anyhow!("customer {} not found", id))?;
    if !yes && !prompt_confirm(&format!("Delete customer '{}'? [y/N] ", customer.display_name()))? {
        println!("Aborted.");
        return Ok(());
    }
    repo.delete(id)?;
    println!(
        "{} {}",
        "✔".green().bold(),
        format!("Deleted '{}'", customer.display_name()).green()
    );
    Ok(())
}

pub fn do_show(settings: &Settings, id: i64) -> Result<()> {
    let repo = open_repository(settings)?;
    let c = repo
        .get(id)?
        .ok_or_else(|| anyhow!("customer {} not found", id))?;
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_content_arrangement(ContentArrangement::Dynamic);
    for (key, value) in [
        ("Id", id.to_string()),
        ("First name", c.first_name),
        ("Last name", c.last_name),
        ("Profession", c.profession),
        ("Company", c.company_name),
        ("Phone", c.phone_number),
        ("Notes", c.notes),
    ] {
        table.add_row(vec![Cell::new(key).add_attribute(Attribute::Bold), Cell::new(value)]);
    }
    println!("{}", table);
    Ok(())
}

pub fn do_list(settings: &Settings, terms: &[String]) -> Result<()> {
    let repo = open_repository(settings)?;
    let query = terms.join(" ");
    let customers = repo.search(Some(query.as_str()))?;

    if customers.is_empty() {
        println!("{} {}", "i".yellow().bold(), "No customers found".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Id").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Profession").add_attribute(Attribute::Bold),
            Cell::new("Company").add_attribute(Attribute::Bold),
            Cell::new("Phone").add_attribute(Attribute::Bold),
        ]);
    for c in &customers {
        table.add_row(vec![
            Cell::new(c.id.map(|id| id.to_string()).unwrap_or_default()),
            Cell::new(c.display_name()),
            Cell::new(&c.profession),
            Cell::new(&c.company_name),
            Cell::new(&c.phone_number),
        ]);
    }
    println!("{}", table);
    Ok(())
}

fn backup_notice(outcome: BackupOutcome, settings: &Settings) -> Notice {
    match outcome {
        BackupOutcome::Completed => {
            Notice::Success(format!("Backup written to {}", settings.backup_path().display()))
        }
        BackupOutcome::RequiresOverwrite => Notice::Confirm(format!(
            "Backup file {} already exists. Overwrite it? [y/N] ",
            settings.backup_path().display()
        )),
        BackupOutcome::ReadOnly => Notice::Failure("storage is read-only; backup not written".into()),
        BackupOutcome::StorageProblem => Notice::Failure(format!(
            "storage root {} is missing or unavailable",
            settings.storage_root.display()
        )),
        BackupOutcome::CopyFailed => Notice::Failure("backup copy failed; the backup file may be incomplete".into()),
    }
}

fn restore_notice(outcome: RestoreOutcome, settings: &Settings) -> Notice {
    match outcome {
        RestoreOutcome::Completed => Notice::Success("Restore complete".into()),
        RestoreOutcome::RequiresOverwrite => {
            Notice::Confirm("Restoring replaces all current customers. Continue? [y/N] ".into())
        }
        RestoreOutcome::VersionMismatch => {
            Notice::Failure("backup file was made by an incompatible database version".into())
        }
        RestoreOutcome::FileNotFound => Notice::Failure(format!(
            "no backup file found at {}",
            settings.backup_path().display()
        )),
        RestoreOutcome::Problem => Notice::Failure(format!(
            "storage root {} is missing or unavailable",
            settings.storage_root.display()
        )),
        RestoreOutcome::CopyFailed => {
            Notice::Failure("restore copy failed; the customers database may be damaged".into())
        }
    }
}

pub async fn do_backup(settings: &Settings, overwrite: bool) -> Result<()> {
    // Make sure there is a database to copy.
    drop(open_repository(settings)?);

    let executor = BackupExecutor::new(
        Handle::current(),
        Arc::new(LocalStorage::new(&settings.storage_root)),
        Arc::new(SqliteFileTransfer),
    );
    let mut overwrite = overwrite;
    loop {
        let job = BackupJob::new(
            TASK_ID_BACKUP,
            settings.database_path(),
            &settings.backup_folder,
            &settings.backup_filename,
        )
        .with_overwrite(overwrite);

        let bar = create_progress_bar("Backing up database");
        let report = executor.perform(job).wait().await;
        bar.finish_and_clear();

        match backup_notice(report?.outcome, settings) {
            Notice::Confirm(question) => {
                if !prompt_confirm(&question)? {
                    println!("Aborted.");
                    return Ok(());
                }
                overwrite = true;
            }
            notice => return notice.emit(),
        }
    }
}

pub async fn do_restore(settings: &Settings, overwrite: bool) -> Result<()> {
    // Create the live database on first use so versions can be compared.
    drop(open_repository(settings)?);

    let executor = RestoreExecutor::new(
        Handle::current(),
        Arc::new(LocalStorage::new(&settings.storage_root)),
        Arc::new(SqliteFileTransfer),
    );
    let mut overwrite = overwrite;
    loop {
        let job = RestoreJob::new(
            TASK_ID_RESTORE,
            settings.database_path(),
            &settings.backup_folder,
            &settings.backup_filename,
        )
        .with_overwrite(overwrite);

        let bar = create_progress_bar("Restoring database");
        let report = executor.perform(job).wait().await;
        bar.finish_and_clear();

        let outcome = report?.outcome;
        match restore_notice(outcome, settings) {
            Notice::Confirm(question) => {
                if !prompt_confirm(&question)? {
                    println!("Aborted.");
                    return Ok(());
                }
                overwrite = true;
            }
            notice => {
                notice.emit()?;
                if outcome == RestoreOutcome::Completed {
                    let count = open_repository(settings)?.count()?;
                    println!("{} {}", "i".yellow().bold(), format!("{} customers restored", count).yellow());
                }
                return Ok(());
            }
        }
    }
}

fn create_progress_bar(prefix: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ");
    bar.set_style(style);
    bar.set_message(prefix.to_string());
    bar.enable_steady_tick(std::time::Duration::from_millis(80));
    bar
}

fn prompt_confirm(message: &str) -> Result<bool> {
    use std::io::{self, Write};
    print!("{} {}", "?".cyan().bold(), message.cyan());
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let ans = input.trim().to_lowercase();
    Ok(ans == "y" || ans == "yes")
}

pub fn do_version() {
    println!("{} {}", "custnote".bold(), env!("CARGO_PKG_VERSION").cyan());
}
