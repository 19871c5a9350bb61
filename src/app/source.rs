use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;
use tracing::debug;

use crate::catalog::{read_products_json, DecisionLabel, Product, ProductId};
use crate::error::AppError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const PAGE_BASE: &str = "http://localhost/";

/// Where the widget gets its products and image bytes from.
pub trait ProductSource: Send + Sync {
    fn fetch_next(&self, product_id: ProductId, label: DecisionLabel) -> Result<Product, AppError>;
    fn load_image(&self, image_src: &str) -> Result<Vec<u8>, AppError>;
}

/// Talks to a running server over the next-product exchange.
pub struct RemoteSource {
    endpoint: String,
    client: Client,
}

impl RemoteSource {
    pub fn new(server_url: &str) -> Result<Self, AppError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            endpoint: format!("{}/leftorright", server_url.trim_end_matches('/')),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ProductSource for RemoteSource {
    fn fetch_next(&self, product_id: ProductId, label: DecisionLabel) -> Result<Product, AppError> {
        let form = [
            ("productId", product_id.to_string()),
            ("liked", label.as_str().to_string()),
        ];
        debug!(endpoint = %self.endpoint, %product_id, %label, "posting decision");

        let product = self
            .client
            .post(&self.endpoint)
            .form(&form)
            .send()?
            .error_for_status()?
            .json::<Product>()?;
        Ok(product)
    }

    fn load_image(&self, image_src: &str) -> Result<Vec<u8>, AppError> {
        let bytes = self
            .client
            .get(image_src)
            .send()?
            .error_for_status()?
            .bytes()?;
        Ok(bytes.to_vec())
    }
}

/// A fixed product list walked in order; decisions advance and stop on the
/// last entry.
pub struct LocalSource {
    products: Vec<Product>,
    index: Mutex<usize>,
}

impl LocalSource {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            index: Mutex::new(0),
        }
    }

    pub fn from_json(file: &Path) -> Result<Self, AppError> {
        Ok(Self::new(read_products_json(file)?))
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl ProductSource for LocalSource {
    fn fetch_next(&self, product_id: ProductId, label: DecisionLabel) -> Result<Product, AppError> {
        let last = self
            .products
            .len()
            .checked_sub(1)
            .ok_or_else(|| AppError::NotFound("local product list is empty".to_string()))?;

        let mut index = self
            .index
            .lock()
            .map_err(|_| AppError::LockPoisoned("local product index".to_string()))?;
        *index = match label {
            DecisionLabel::First => self
                .products
                .iter()
                .position(|product| product.id == product_id)
                .unwrap_or(0),
            DecisionLabel::Liked | DecisionLabel::Disliked => (*index + 1).min(last),
        };

        Ok(self.products[*index].clone())
    }

    fn load_image(&self, image_src: &str) -> Result<Vec<u8>, AppError> {
        Ok(fs::read(PathBuf::from(image_src))?)
    }
}

/// Reads `firstId` from the page URL the widget was opened with. Relative
/// URLs and bare query strings are accepted.
pub fn first_product_id(page_url: Option<&str>, default: ProductId) -> ProductId {
    let Some(raw) = page_url.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return default;
    };

    let parsed = Url::parse(raw).or_else(|_| Url::parse(PAGE_BASE)?.join(raw));
    let Ok(url) = parsed else {
        return default;
    };

    url.query_pairs()
        .find(|(key, _)| key == "firstId")
        .and_then(|(_, value)| value.trim().parse::<i64>().ok())
        .and_then(|value| ProductId::new(value).ok())
        .unwrap_or(default)
}
