pub mod app;
pub mod cache;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod infra;
pub mod server;
pub mod ui;

pub use error::AppError;
