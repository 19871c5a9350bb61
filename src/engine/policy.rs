use crate::catalog::{CatalogDb, DecisionLabel, ProductId};
use crate::error::AppError;

/// Chooses which product follows `current` once the user has decided on it.
pub trait NextProductPolicy: Send + Sync {
    fn next_after(
        &self,
        catalog: &CatalogDb,
        current: ProductId,
        label: DecisionLabel,
    ) -> Result<Option<ProductId>, AppError>;
}

/// Steps through the catalog in id order and stays on the last product.
/// The label does not influence the walk.
#[derive(Debug, Default, Clone, Copy)]
pub struct CatalogWalk;

impl NextProductPolicy for CatalogWalk {
    fn next_after(
        &self,
        catalog: &CatalogDb,
        current: ProductId,
        _label: DecisionLabel,
    ) -> Result<Option<ProductId>, AppError> {
        match catalog.next_product_id_after(current)? {
            Some(next) => Ok(Some(next)),
            None => catalog.last_product_id(),
        }
    }
}
