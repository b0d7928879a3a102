use std::path::PathBuf;

use colored::Colorize;

use crate::db::SqliteStore;
use crate::error::Result;
use crate::importer::import_from_file;
use crate::settings::get_data_dir;

pub fn run(file: &str) -> Result<()> {
    let file_path = PathBuf::from(file);
    let store = SqliteStore::open(&get_data_dir().join("penny.db"))?;

    let outcome = import_from_file(&store, &file_path)?;

    println!("{} transactions imported", outcome.transactions.len());
    if !outcome.source_removed {
        eprintln!(
            "{} records were saved, but {} could not be removed",
            "warning:".yellow().bold(),
            file_path.display()
        );
    }
    Ok(())
}
