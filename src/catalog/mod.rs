pub mod db;
pub mod migrations;
pub mod models;
pub mod queries;

pub use db::{read_products_json, CatalogDb};
pub use models::{DecisionLabel, DecisionRecord, Product, ProductId, SeedReport};
