use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::{info, warn};

use crate::catalog::ProductId;
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub catalog_path: PathBuf,
    pub static_dir: PathBuf,
    pub default_product_id: ProductId,
    pub server_url: String,
    pub first_product_id: ProductId,
    pub link_base: String,
    pub local_images_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            catalog_path: PathBuf::from("catalog.sqlite3"),
            static_dir: PathBuf::from("static"),
            default_product_id: ProductId::SERVER_DEFAULT,
            server_url: "http://127.0.0.1:8080".to_string(),
            first_product_id: ProductId::CLIENT_DEFAULT,
            link_base: "http://www.macys.com/".to_string(),
            local_images_dir: PathBuf::from("images"),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; unset keys keep their
    /// defaults, unparseable values are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let default_product_id: i64 = try_load(
            &lookup,
            "LOR_DEFAULT_PRODUCT_ID",
            defaults.default_product_id.get(),
        )?;
        let first_product_id: i64 =
            try_load(&lookup, "LOR_FIRST_ID", defaults.first_product_id.get())?;

        Ok(Self {
            port: try_load(&lookup, "LOR_PORT", defaults.port)?,
            catalog_path: try_load(&lookup, "LOR_CATALOG", defaults.catalog_path)?,
            static_dir: try_load(&lookup, "LOR_STATIC_DIR", defaults.static_dir)?,
            default_product_id: ProductId::new(default_product_id)
                .map_err(|error| AppError::Config(format!("LOR_DEFAULT_PRODUCT_ID: {error}")))?,
            server_url: try_load(&lookup, "LOR_SERVER_URL", defaults.server_url)?,
            first_product_id: ProductId::new(first_product_id)
                .map_err(|error| AppError::Config(format!("LOR_FIRST_ID: {error}")))?,
            link_base: try_load(&lookup, "LOR_LINK_BASE", defaults.link_base)?,
            local_images_dir: try_load(&lookup, "LOR_LOCAL_IMAGES", defaults.local_images_dir)?,
        })
    }

    pub fn images_dir(&self) -> PathBuf {
        self.static_dir.join("images")
    }
}

fn try_load<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Debug,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|error: T::Err| {
            warn!("Invalid {key} value: {error}");
            AppError::Config(format!("invalid {key} value {raw:?}: {error}"))
        }),
        None => {
            info!("{key} not set, using default: {default:?}");
            Ok(default)
        }
    }
}
