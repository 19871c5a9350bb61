use tracing::{debug, info};

use crate::catalog::{CatalogDb, DecisionLabel, Product, ProductId};
use crate::engine::policy::NextProductPolicy;
use crate::error::AppError;

/// Feedback from every client lands in one server session.
pub const SERVER_SESSION_ID: i64 = 1;

pub struct NextProductService {
    catalog: CatalogDb,
    policy: Box<dyn NextProductPolicy>,
    default_product_id: ProductId,
}

impl NextProductService {
    pub fn new(
        catalog: CatalogDb,
        policy: Box<dyn NextProductPolicy>,
        default_product_id: ProductId,
    ) -> Self {
        Self {
            catalog,
            policy,
            default_product_id,
        }
    }

    pub fn catalog(&self) -> &CatalogDb {
        &self.catalog
    }

    /// Answers one next-product exchange. `requested` is the raw id the
    /// client sent; `None` or zero falls back to the server default.
    pub fn next_product(
        &self,
        requested: Option<i64>,
        label: DecisionLabel,
    ) -> Result<Product, AppError> {
        let current = self.resolve_product_id(requested)?;

        // Feedback is only kept once a product can be returned for it.
        let mut product = if label.is_decision() {
            let next = self
                .policy
                .next_after(&self.catalog, current, label)?
                .ok_or_else(|| AppError::NotFound("catalog is empty".to_string()))?;
            let product = self.load(next)?;
            self.catalog
                .record_decision(SERVER_SESSION_ID, current, label)?;
            product
        } else {
            self.starting_product(current)?
        };

        echo_decision(&mut product, label);
        info!(
            current = %current,
            label = %label,
            next = %product.id,
            "next product chosen"
        );
        Ok(product)
    }

    /// The product a fresh page starts on: `requested` when the catalog has
    /// it, the first catalog product otherwise.
    pub fn starting_product(&self, requested: ProductId) -> Result<Product, AppError> {
        if let Some(product) = self.catalog.find_product(requested)? {
            return Ok(product);
        }

        debug!(requested = %requested, "starting product not in catalog, using first");
        let first = self
            .catalog
            .first_product_id()?
            .ok_or_else(|| AppError::NotFound("catalog is empty".to_string()))?;
        self.load(first)
    }

    fn resolve_product_id(&self, requested: Option<i64>) -> Result<ProductId, AppError> {
        match requested {
            None | Some(0) => Ok(self.default_product_id),
            Some(value) => ProductId::new(value),
        }
    }

    fn load(&self, product_id: ProductId) -> Result<Product, AppError> {
        self.catalog
            .find_product(product_id)?
            .ok_or_else(|| AppError::NotFound(format!("product not found for id={product_id}")))
    }
}

fn echo_decision(product: &mut Product, label: DecisionLabel) {
    match label {
        DecisionLabel::Liked => product.description.push('!'),
        DecisionLabel::Disliked => product.description.push('?'),
        DecisionLabel::First => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::policy::CatalogWalk;
    use tempfile::TempDir;

    fn id(value: i64) -> ProductId {
        ProductId::new(value).expect("id")
    }

    fn service(dir: &TempDir, ids: &[i64], default_id: i64) -> NextProductService {
        let db = CatalogDb::new(dir.path().join("catalog.sqlite3"));
        db.initialize().expect("initialize");
        let products: Vec<Product> = ids
            .iter()
            .map(|value| Product {
                id: id(*value),
                description: format!("Item {value}"),
                image_file: format!("{value}.jpg"),
                url: format!("p/{value}"),
                prices: None,
            })
            .collect();
        db.seed_products(&products).expect("seed");
        NextProductService::new(db, Box::new(CatalogWalk), id(default_id))
    }

    #[test]
    fn liked_decision_returns_next_product_and_records_feedback() {
        let dir = TempDir::new().expect("tempdir");
        let service = service(&dir, &[10, 20, 30], 10);

        let product = service
            .next_product(Some(10), DecisionLabel::Liked)
            .expect("exchange");
        assert_eq!(product.id, id(20));
        assert_eq!(product.description, "Item 20!");

        let decisions = service
            .catalog()
            .list_decisions(SERVER_SESSION_ID)
            .expect("decisions");
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].product_id, 10);
        assert_eq!(decisions[0].label, "liked");
    }

    #[test]
    fn disliked_decision_marks_description_with_question() {
        let dir = TempDir::new().expect("tempdir");
        let service = service(&dir, &[10, 20], 10);

        let product = service
            .next_product(Some(10), DecisionLabel::Disliked)
            .expect("exchange");
        assert_eq!(product.description, "Item 20?");
    }

    #[test]
    fn missing_or_zero_id_uses_server_default() {
        let dir = TempDir::new().expect("tempdir");
        let service = service(&dir, &[10, 20, 30], 20);

        let from_zero = service
            .next_product(Some(0), DecisionLabel::Liked)
            .expect("exchange");
        assert_eq!(from_zero.id, id(30));

        let from_none = service
            .next_product(None, DecisionLabel::First)
            .expect("exchange");
        assert_eq!(from_none.id, id(20));
    }

    #[test]
    fn first_label_returns_requested_product_without_feedback() {
        let dir = TempDir::new().expect("tempdir");
        let service = service(&dir, &[10, 20, 30], 10);

        let product = service
            .next_product(Some(30), DecisionLabel::First)
            .expect("exchange");
        assert_eq!(product.id, id(30));
        assert_eq!(product.description, "Item 30");
        assert!(service
            .catalog()
            .list_decisions(SERVER_SESSION_ID)
            .expect("decisions")
            .is_empty());
    }

    #[test]
    fn first_label_for_unknown_id_starts_at_catalog_head() {
        let dir = TempDir::new().expect("tempdir");
        let service = service(&dir, &[10, 20], 1184526);

        let product = service
            .next_product(Some(1082639), DecisionLabel::First)
            .expect("exchange");
        assert_eq!(product.id, id(10));
    }

    #[test]
    fn negative_id_is_invalid_input() {
        let dir = TempDir::new().expect("tempdir");
        let service = service(&dir, &[10], 10);

        assert!(matches!(
            service.next_product(Some(-5), DecisionLabel::Liked),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn empty_catalog_is_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let service = service(&dir, &[], 10);

        assert!(matches!(
            service.next_product(Some(10), DecisionLabel::Liked),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.next_product(None, DecisionLabel::First),
            Err(AppError::NotFound(_))
        ));
        assert!(service
            .catalog()
            .list_decisions(SERVER_SESSION_ID)
            .expect("decisions")
            .is_empty());
    }
}
