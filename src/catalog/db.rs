use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::Connection;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::catalog::migrations::MIGRATIONS;
use crate::catalog::models::{DecisionLabel, DecisionRecord, Product, ProductId, SeedReport};
use crate::catalog::queries;
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct CatalogDb {
    path: PathBuf,
}

impl CatalogDb {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn initialize(&self) -> Result<(), AppError> {
        if self.path.as_os_str().is_empty() {
            return Err(AppError::InvalidInput(
                "catalog path must not be empty".to_string(),
            ));
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = self.open_connection()?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        for migration in MIGRATIONS {
            conn.execute_batch(migration)?;
        }

        debug!(path = %self.path.display(), "catalog schema ready");
        Ok(())
    }

    pub fn seed_products(&self, products: &[Product]) -> Result<SeedReport, AppError> {
        let mut conn = self.open_connection()?;
        let tx = conn.transaction()?;

        let mut report = SeedReport {
            read_products: products.len(),
            newly_inserted: 0,
        };
        for product in products {
            if queries::insert_product(&tx, product)? {
                report.newly_inserted += 1;
            }
        }
        tx.commit()?;

        info!(
            read = report.read_products,
            inserted = report.newly_inserted,
            "catalog seeded"
        );
        Ok(report)
    }

    pub fn seed_from_json(&self, file: &Path) -> Result<SeedReport, AppError> {
        let products = read_products_json(file)?;
        self.seed_products(&products)
    }

    pub fn list_products(&self) -> Result<Vec<Product>, AppError> {
        let conn = self.open_connection()?;
        Ok(queries::list_products(&conn)?)
    }

    pub fn find_product(&self, product_id: ProductId) -> Result<Option<Product>, AppError> {
        let conn = self.open_connection()?;
        Ok(queries::find_product(&conn, product_id.get())?)
    }

    pub fn first_product_id(&self) -> Result<Option<ProductId>, AppError> {
        let conn = self.open_connection()?;
        queries::first_product_id(&conn)?
            .map(ProductId::new)
            .transpose()
    }

    pub fn last_product_id(&self) -> Result<Option<ProductId>, AppError> {
        let conn = self.open_connection()?;
        queries::last_product_id(&conn)?
            .map(ProductId::new)
            .transpose()
    }

    pub fn next_product_id_after(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductId>, AppError> {
        let conn = self.open_connection()?;
        queries::next_product_id_after(&conn, product_id.get())?
            .map(ProductId::new)
            .transpose()
    }

    pub fn record_decision(
        &self,
        session_id: i64,
        product_id: ProductId,
        label: DecisionLabel,
    ) -> Result<(), AppError> {
        let conn = self.open_connection()?;
        queries::insert_decision(
            &conn,
            session_id,
            product_id.get(),
            label.as_str(),
            &now_timestamp_string(),
        )?;
        Ok(())
    }

    pub fn list_decisions(&self, session_id: i64) -> Result<Vec<DecisionRecord>, AppError> {
        let conn = self.open_connection()?;
        Ok(queries::list_decisions(&conn, session_id)?)
    }

    /// Products whose image file is not present anywhere under `images_dir`.
    pub fn find_missing_images(&self, images_dir: &Path) -> Result<Vec<Product>, AppError> {
        if !images_dir.is_dir() {
            return Err(AppError::InvalidInput(format!(
                "image folder does not exist or is not a directory: {}",
                images_dir.display()
            )));
        }

        let available: HashSet<String> = WalkDir::new(images_dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(images_dir)
                    .ok()
                    .map(|relative| relative.to_string_lossy().replace('\\', "/"))
            })
            .collect();

        let missing = self
            .list_products()?
            .into_iter()
            .filter(|product| !available.contains(&product.image_file))
            .collect();
        Ok(missing)
    }

    fn open_connection(&self) -> Result<Connection, AppError> {
        Ok(Connection::open(&self.path)?)
    }
}

pub fn read_products_json(file: &Path) -> Result<Vec<Product>, AppError> {
    let raw = fs::read_to_string(file)?;
    Ok(serde_json::from_str(&raw)?)
}

fn now_timestamp_string() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or_default();
    secs.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn catalog_in(dir: &TempDir) -> CatalogDb {
        let db = CatalogDb::new(dir.path().join("catalog.sqlite3"));
        db.initialize().expect("schema should initialize");
        db
    }

    fn product(id: i64, image_file: &str) -> Product {
        Product {
            id: ProductId::new(id).expect("id"),
            description: format!("Product {id}"),
            image_file: image_file.to_string(),
            url: format!("p/{id}"),
            prices: Some("19.99".to_string()),
        }
    }

    #[test]
    fn initialize_creates_schema() {
        let dir = TempDir::new().expect("tempdir should be created");
        let db = catalog_in(&dir);

        let conn = Connection::open(db.path()).expect("db should open");
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type='table' AND name IN ('products', 'decisions')",
                [],
                |row| row.get(0),
            )
            .expect("query should succeed");
        assert_eq!(tables, 2);
    }

    #[test]
    fn initialize_rejects_empty_path() {
        let db = CatalogDb::new("");
        assert!(matches!(db.initialize(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn seed_from_json_inserts_each_product_once() {
        let dir = TempDir::new().expect("tempdir should be created");
        let db = catalog_in(&dir);
        let seed = dir.path().join("products.json");
        fs::write(
            &seed,
            r#"[
                {"Id": 7, "Description": "Shirt", "ImgFile": "shirt.jpg", "Url": "p/7"},
                {"Id": 9, "Description": "Boots", "ImgFile": "boots.jpg", "Url": "p/9",
                 "Prices": "49.00"}
            ]"#,
        )
        .expect("seed file should be written");

        let first = db.seed_from_json(&seed).expect("seed should succeed");
        assert_eq!(first.read_products, 2);
        assert_eq!(first.newly_inserted, 2);

        let second = db.seed_from_json(&seed).expect("reseed should succeed");
        assert_eq!(second.newly_inserted, 0);

        let boots = db
            .find_product(ProductId::new(9).expect("id"))
            .expect("query")
            .expect("boots should exist");
        assert_eq!(boots.prices.as_deref(), Some("49.00"));
        assert_eq!(
            db.first_product_id().expect("min").map(ProductId::get),
            Some(7)
        );
        assert_eq!(
            db.last_product_id().expect("max").map(ProductId::get),
            Some(9)
        );
    }

    #[test]
    fn seed_from_json_rejects_malformed_file() {
        let dir = TempDir::new().expect("tempdir should be created");
        let db = catalog_in(&dir);
        let seed = dir.path().join("broken.json");
        fs::write(&seed, "[{\"Id\": \"seven\"}]").expect("seed file should be written");

        assert!(matches!(db.seed_from_json(&seed), Err(AppError::Decode(_))));
    }

    #[test]
    fn record_decision_is_listed_for_session() {
        let dir = TempDir::new().expect("tempdir should be created");
        let db = catalog_in(&dir);
        let id = ProductId::new(7).expect("id");

        db.record_decision(1, id, DecisionLabel::Disliked)
            .expect("decision should be recorded");

        let decisions = db.list_decisions(1).expect("list");
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].product_id, 7);
        assert_eq!(decisions[0].label, "disliked");
        assert!(db.list_decisions(2).expect("list").is_empty());
    }

    #[test]
    fn find_missing_images_reports_products_without_files() {
        let dir = TempDir::new().expect("tempdir should be created");
        let db = catalog_in(&dir);
        db.seed_products(&[
            product(1, "shirt.jpg"),
            product(2, "nested/boots.jpg"),
            product(3, "gone.jpg"),
        ])
        .expect("seed");

        let images = dir.path().join("static").join("images");
        fs::create_dir_all(images.join("nested")).expect("image dirs");
        fs::write(images.join("shirt.jpg"), b"jpg").expect("image");
        fs::write(images.join("nested").join("boots.jpg"), b"jpg").expect("image");

        let missing = db.find_missing_images(&images).expect("check");
        let ids: Vec<i64> = missing.iter().map(|product| product.id.get()).collect();
        assert_eq!(ids, vec![3]);
    }
}
