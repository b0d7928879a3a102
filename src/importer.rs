use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::Result;
use crate::models::{Category, NewTransaction, Transaction, TransactionType, ValidatedRow};
use crate::store::TransactionStore;

// ---------------------------------------------------------------------------
// Row parsing
// ---------------------------------------------------------------------------

fn parse_value(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(0.0)
}

/// Read the delimited file at `path` into validated rows.
///
/// The first line is a header and is skipped unconditionally. Every field is
/// trimmed. A row survives only when title, type, and value are all non-empty
/// and the type names a known transaction kind; anything else is dropped
/// without an error. The category field may be empty and is carried through
/// as-is.
pub fn parse_rows(path: &Path) -> Result<Vec<ValidatedRow>> {
    let file = File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut rows = Vec::new();
    for result in rdr.records().skip(1) {
        let record = result?;
        let title = record.get(0).unwrap_or("").trim();
        let kind = record.get(1).unwrap_or("").trim();
        let value = record.get(2).unwrap_or("").trim();
        let category = record.get(3).unwrap_or("").trim();

        if title.is_empty() || kind.is_empty() || value.is_empty() {
            continue;
        }
        let Some(kind) = TransactionType::parse(kind) else {
            continue;
        };

        rows.push(ValidatedRow {
            title: title.to_string(),
            kind,
            value: parse_value(value),
            category: category.to_string(),
        });
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Category reconciliation
// ---------------------------------------------------------------------------

/// Resolve every referenced category name to a stored record, creating the
/// ones that don't exist yet.
///
/// One membership query covers the whole name set, and one batch insert
/// covers the missing names. A name referenced by several rows resolves to
/// exactly one record either way.
pub fn reconcile_categories(
    store: &dyn TransactionStore,
    names: &[String],
) -> Result<HashMap<String, Category>> {
    let mut titles: Vec<String> = Vec::new();
    for name in names {
        if !titles.contains(name) {
            titles.push(name.clone());
        }
    }

    let existing = store.find_categories_by_titles(&titles)?;
    let existing_titles: HashSet<&str> = existing.iter().map(|c| c.title.as_str()).collect();

    let missing: Vec<String> = titles
        .iter()
        .filter(|title| !existing_titles.contains(title.as_str()))
        .cloned()
        .collect();

    let mut created = store.create_categories(&missing);
    store.save_categories(&mut created)?;

    let mut resolved = HashMap::new();
    for category in existing.into_iter().chain(created) {
        resolved.insert(category.title.clone(), category);
    }
    Ok(resolved)
}

// ---------------------------------------------------------------------------
// Materialization
// ---------------------------------------------------------------------------

/// Pair each row with its resolved category id. A name absent from the
/// lookup leaves the link empty instead of failing the import.
pub fn build_transactions(
    rows: &[ValidatedRow],
    categories: &HashMap<String, Category>,
) -> Vec<NewTransaction> {
    rows.iter()
        .map(|row| NewTransaction {
            title: row.title.clone(),
            kind: row.kind,
            value: row.value,
            category_id: categories.get(&row.category).and_then(|c| c.id),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// import_from_file
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ImportOutcome {
    /// Persisted transactions, one per valid input row, in row order.
    pub transactions: Vec<Transaction>,
    /// False when the source file survived a successful import because the
    /// delete failed. The import itself still counts as successful.
    pub source_removed: bool,
}

/// Run the whole pipeline: parse, reconcile categories, persist the batch,
/// remove the source file.
///
/// The file is deleted only after persistence succeeds; on any earlier
/// failure it is left in place so the run can be diagnosed and retried.
pub fn import_from_file(store: &dyn TransactionStore, path: &Path) -> Result<ImportOutcome> {
    let rows = parse_rows(path)?;

    let names: Vec<String> = rows.iter().map(|row| row.category.clone()).collect();
    let categories = reconcile_categories(store, &names)?;

    let inputs = build_transactions(&rows, &categories);
    let mut transactions = store.create_transactions(&inputs);
    store.save_transactions(&mut transactions)?;

    let source_removed = std::fs::remove_file(path).is_ok();

    Ok(ImportOutcome {
        transactions,
        source_removed,
    })
}
