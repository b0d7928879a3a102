use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;
use crate::models::{Category, NewTransaction, Transaction};
use crate::store::TransactionStore;

// categories.title is not UNIQUE: two imports running at once may both
// create a missing category, and the second insert must not fail.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    kind TEXT NOT NULL,
    value REAL NOT NULL,
    category_id INTEGER,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (category_id) REFERENCES categories(id)
);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// SQLite-backed implementation of the pipeline's storage interface.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open (and initialize, if needed) the database at `db_path`.
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = get_connection(db_path)?;
        init_db(&conn)?;
        Ok(Self::new(conn))
    }
}

impl TransactionStore for SqliteStore {
    fn find_categories_by_titles(&self, titles: &[String]) -> Result<Vec<Category>> {
        if titles.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; titles.len()].join(",");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, title FROM categories WHERE title IN ({placeholders})"
        ))?;
        let rows = stmt.query_map(rusqlite::params_from_iter(titles), |row| {
            Ok(Category {
                id: Some(row.get(0)?),
                title: row.get(1)?,
            })
        })?;

        let mut categories = Vec::new();
        for row in rows {
            categories.push(row?);
        }
        Ok(categories)
    }

    fn create_categories(&self, titles: &[String]) -> Vec<Category> {
        titles
            .iter()
            .map(|title| Category {
                id: None,
                title: title.clone(),
            })
            .collect()
    }

    fn save_categories(&self, categories: &mut [Category]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare("INSERT INTO categories (title) VALUES (?1)")?;
            for category in categories.iter_mut() {
                stmt.execute([&category.title])?;
                category.id = Some(tx.last_insert_rowid());
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn create_transactions(&self, inputs: &[NewTransaction]) -> Vec<Transaction> {
        inputs
            .iter()
            .map(|input| Transaction {
                id: None,
                title: input.title.clone(),
                kind: input.kind,
                value: input.value,
                category_id: input.category_id,
            })
            .collect()
    }

    fn save_transactions(&self, transactions: &mut [Transaction]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO transactions (title, kind, value, category_id) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for transaction in transactions.iter_mut() {
                stmt.execute(rusqlite::params![
                    transaction.title,
                    transaction.kind.as_str(),
                    transaction.value,
                    transaction.category_id,
                ])?;
                transaction.id = Some(tx.last_insert_rowid());
            }
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionType;

    fn test_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, store) = test_store();
        let tables: Vec<String> = store
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["categories", "transactions"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, store) = test_store();
        init_db(&store.conn).unwrap();
    }

    #[test]
    fn test_save_categories_assigns_ids() {
        let (_dir, store) = test_store();
        let mut categories = store.create_categories(&["Job".to_string(), "Food".to_string()]);
        assert!(categories.iter().all(|c| c.id.is_none()));

        store.save_categories(&mut categories).unwrap();
        assert!(categories.iter().all(|c| c.id.is_some()));

        let count: i64 = store
            .conn
            .query_row("SELECT count(*) FROM categories", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_find_categories_by_titles_returns_only_matches() {
        let (_dir, store) = test_store();
        let mut categories = store.create_categories(&["Job".to_string(), "Food".to_string()]);
        store.save_categories(&mut categories).unwrap();

        let found = store
            .find_categories_by_titles(&["Food".to_string(), "House".to_string()])
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Food");
        assert_eq!(found[0].id, categories[1].id);
    }

    #[test]
    fn test_find_categories_by_titles_empty_input() {
        let (_dir, store) = test_store();
        assert!(store.find_categories_by_titles(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_save_transactions_assigns_ids_and_links_category() {
        let (_dir, store) = test_store();
        let mut categories = store.create_categories(&["Job".to_string()]);
        store.save_categories(&mut categories).unwrap();

        let inputs = vec![NewTransaction {
            title: "Salary".to_string(),
            kind: TransactionType::Income,
            value: 5000.0,
            category_id: categories[0].id,
        }];
        let mut transactions = store.create_transactions(&inputs);
        assert!(transactions[0].id.is_none());

        store.save_transactions(&mut transactions).unwrap();
        assert!(transactions[0].id.is_some());

        let linked: i64 = store
            .conn
            .query_row(
                "SELECT count(*) FROM transactions WHERE category_id = ?1",
                [categories[0].id],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(linked, 1);
    }

    #[test]
    fn test_save_transactions_accepts_missing_category_link() {
        let (_dir, store) = test_store();
        let inputs = vec![NewTransaction {
            title: "Orphan".to_string(),
            kind: TransactionType::Outcome,
            value: 1.0,
            category_id: None,
        }];
        let mut transactions = store.create_transactions(&inputs);
        store.save_transactions(&mut transactions).unwrap();

        let category_id: Option<i64> = store
            .conn
            .query_row("SELECT category_id FROM transactions LIMIT 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(category_id, None);
    }
}
