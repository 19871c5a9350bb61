use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};

use crate::catalog::models::{DecisionRecord, Product, ProductId};

const PRODUCT_COLUMNS: &str = "id, description, img_file, url, prices";

pub fn insert_product(conn: &Connection, product: &Product) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO products (id, url, img_file, description, prices)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            product.id.get(),
            product.url,
            product.image_file,
            product.description,
            product.prices,
        ],
    )?;

    Ok(inserted == 1)
}

pub fn find_product(conn: &Connection, product_id: i64) -> Result<Option<Product>> {
    conn.query_row(
        &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"),
        params![product_id],
        product_from_row,
    )
    .optional()
}

pub fn list_products(conn: &Connection) -> Result<Vec<Product>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id ASC"
    ))?;

    let rows = stmt.query_map([], product_from_row)?;
    rows.collect()
}

pub fn first_product_id(conn: &Connection) -> Result<Option<i64>> {
    conn.query_row("SELECT MIN(id) FROM products", [], |row| row.get(0))
}

pub fn last_product_id(conn: &Connection) -> Result<Option<i64>> {
    conn.query_row("SELECT MAX(id) FROM products", [], |row| row.get(0))
}

pub fn next_product_id_after(conn: &Connection, product_id: i64) -> Result<Option<i64>> {
    conn.query_row(
        "SELECT MIN(id) FROM products WHERE id > ?1",
        params![product_id],
        |row| row.get(0),
    )
}

pub fn insert_decision(
    conn: &Connection,
    session_id: i64,
    product_id: i64,
    label: &str,
    decided_at: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO decisions (session_id, product_id, label, decided_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![session_id, product_id, label, decided_at],
    )?;
    Ok(())
}

pub fn list_decisions(conn: &Connection, session_id: i64) -> Result<Vec<DecisionRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, session_id, product_id, label, decided_at
         FROM decisions
         WHERE session_id = ?1
         ORDER BY id ASC",
    )?;

    let rows = stmt.query_map(params![session_id], |row| {
        Ok(DecisionRecord {
            id: row.get(0)?,
            session_id: row.get(1)?,
            product_id: row.get(2)?,
            label: row.get(3)?,
            decided_at: row.get(4)?,
        })
    })?;

    rows.collect()
}

fn product_from_row(row: &Row<'_>) -> Result<Product> {
    let id_value: i64 = row.get(0)?;
    let id = ProductId::new(id_value).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(error))
    })?;

    Ok(Product {
        id,
        description: row.get(1)?,
        image_file: row.get(2)?,
        url: row.get(3)?,
        prices: row.get(4)?,
    })
}
