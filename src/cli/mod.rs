pub mod categories;
pub mod import;
pub mod init;
pub mod transactions;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "penny",
    about = "Delimited-file transaction importer with category reconciliation."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up Penny: choose a data directory and initialize the database.
    Init {
        /// Path for Penny data (default: ~/Documents/penny)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Import a delimited transaction file. The file is removed on success.
    Import {
        /// Path to the file to import
        file: String,
    },
    /// List imported transactions with a balance summary.
    Transactions,
    /// List categories.
    Categories,
}
