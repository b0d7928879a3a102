use comfy_table::{Cell, Table};
use rusqlite::Connection;

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::signed_value;
use crate::models::TransactionType;
use crate::settings::get_data_dir;

struct TransactionRow {
    id: i64,
    title: String,
    kind: TransactionType,
    value: f64,
    category: Option<String>,
}

pub fn run() -> Result<()> {
    let conn = get_connection(&get_data_dir().join("penny.db"))?;
    let rows = list_transactions(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Type", "Value", "Category"]);
    for row in &rows {
        table.add_row(vec![
            Cell::new(row.id),
            Cell::new(&row.title),
            Cell::new(row.kind.as_str()),
            Cell::new(signed_value(row.kind, row.value)),
            Cell::new(row.category.clone().unwrap_or_default()),
        ]);
    }
    println!("Transactions\n{table}");

    let income: f64 = rows
        .iter()
        .filter(|r| r.kind == TransactionType::Income)
        .map(|r| r.value)
        .sum();
    let outcome: f64 = rows
        .iter()
        .filter(|r| r.kind == TransactionType::Outcome)
        .map(|r| r.value)
        .sum();
    println!(
        "income: {income:.2}  outcome: {outcome:.2}  total: {:.2}",
        income - outcome
    );
    Ok(())
}

fn list_transactions(conn: &Connection) -> Result<Vec<TransactionRow>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.title, t.kind, t.value, c.title
         FROM transactions t
         LEFT JOIN categories c ON c.id = t.category_id
         ORDER BY t.id",
    )?;
    let rows = stmt.query_map([], |row| {
        let kind: String = row.get(2)?;
        Ok(TransactionRow {
            id: row.get(0)?,
            title: row.get(1)?,
            kind: TransactionType::parse(&kind).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    rusqlite::types::Type::Text,
                    format!("unknown transaction type: {kind}").into(),
                )
            })?,
            value: row.get(3)?,
            category: row.get(4)?,
        })
    })?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
