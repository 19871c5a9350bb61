use std::sync::Arc;

use tracing::info;

use crate::catalog::CatalogDb;
use crate::engine::{CatalogWalk, NextProductService};
use crate::error::AppError;
use crate::infra::AppConfig;

pub struct ServerState {
    pub config: AppConfig,
    pub exchange: NextProductService,
}

impl ServerState {
    pub fn new(config: AppConfig) -> Result<Arc<Self>, AppError> {
        let catalog = CatalogDb::new(config.catalog_path.clone());
        catalog.initialize()?;
        info!(catalog = %catalog.path().display(), "catalog opened");

        let exchange = NextProductService::new(
            catalog,
            Box::new(CatalogWalk),
            config.default_product_id,
        );

        Ok(Arc::new(Self { config, exchange }))
    }
}
