use crate::catalog::{DecisionLabel, Product, ProductId};

/// Where product images and outbound links resolve for one data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    pub image_base: String,
    pub link_base: String,
}

/// What the widget shows for the current product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductView {
    pub product_id: ProductId,
    pub description: String,
    pub image_src: String,
    pub link_href: String,
}

impl ProductView {
    pub fn display(product: &Product, config: &DisplayConfig) -> Self {
        Self {
            product_id: product.id,
            description: product.description.clone(),
            image_src: image_src(&config.image_base, &product.image_file),
            link_href: link_href(&config.link_base, &product.url),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub product_id: ProductId,
    pub image_src: String,
}

/// The liked and disliked thumbnail strips, in decision order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecisionBoard {
    pub liked: Vec<Thumbnail>,
    pub disliked: Vec<Thumbnail>,
}

impl DecisionBoard {
    pub fn record_decision(&mut self, view: &ProductView, label: DecisionLabel) {
        let thumbnail = Thumbnail {
            product_id: view.product_id,
            image_src: view.image_src.clone(),
        };
        match label {
            DecisionLabel::Liked => self.liked.push(thumbnail),
            DecisionLabel::Disliked => self.disliked.push(thumbnail),
            DecisionLabel::First => {}
        }
    }

    pub fn len(&self) -> usize {
        self.liked.len() + self.disliked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn image_src(image_base: &str, image_file: &str) -> String {
    if image_base.is_empty() {
        return image_file.to_string();
    }
    format!("{}/{}", image_base.trim_end_matches('/'), image_file)
}

pub fn link_href(link_base: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    format!("{link_base}{url}")
}
