use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use custnote::customers::CustomerPatch;

/// custnote: personal customer notes with local database backup
#[derive(Parser, Debug)]
#[command(name = "custnote", version, about = "Keep notes on your customers and back them up locally.", long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Settings file to use instead of the default one
    #[arg(short = 'c', long = "config", global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log job steps and other diagnostics to stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a settings file, optionally pointing at custom locations
    Init {
        /// Directory holding the live customers database
        #[arg(long, value_name = "DIR")]
        data_dir: Option<PathBuf>,
        /// Storage root that receives backups
        #[arg(long, value_name = "DIR")]
        storage_root: Option<PathBuf>,
    },

    /// Add a new customer
    Add {
        /// Customer's first name (required)
        first_name: String,
        #[command(flatten)]
        fields: CustomerFields,
    },

    /// Change fields of an existing customer
    Edit {
        /// Customer id
        id: i64,
        /// New first name
        #[arg(long)]
        first_name: Option<String>,
        #[command(flatten)]
        fields: CustomerFields,
    },

    /// Delete a customer
    Delete {
        /// Customer id
        id: i64,
        /// Do not ask for confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show all fields of a customer
    Show {
        /// Customer id
        id: i64,
    },

    /// List customers, optionally filtered by search terms
    List {
        /// Terms that must each prefix-match a name, profession, company or phone
        terms: Vec<String>,
    },

    /// Back up the customers database to the storage root
    Backup {
        /// Replace an existing backup file without asking
        #[arg(long)]
        overwrite: bool,
    },

    /// Restore the customers database from the backup file
    Restore {
        /// Replace the current database without asking
        #[arg(long)]
        overwrite: bool,
    },

    /// Print the effective settings
    Config,

    /// Print CLI version
    Version,
}

#[derive(Args, Debug, Default)]
pub struct CustomerFields {
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub profession: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl CustomerFields {
    pub fn into_patch(self, first_name: Option<String>) -> CustomerPatch {
        CustomerPatch {
            first_name,
            last_name: self.last_name,
            profession: self.profession,
            company_name: self.company,
            phone_number: self.phone,
            notes: self.notes,
        }
    }
}
