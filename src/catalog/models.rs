use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ProductId(i64);

impl ProductId {
    /// Product a client starts on when its page URL names none.
    pub const CLIENT_DEFAULT: ProductId = ProductId(1082639);
    /// Product the server assumes when a request carries no usable id.
    pub const SERVER_DEFAULT: ProductId = ProductId(1184526);

    pub fn new(value: i64) -> Result<Self, AppError> {
        if value <= 0 {
            return Err(AppError::InvalidInput(format!(
                "product id must be positive, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for ProductId {
    type Error = AppError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProductId> for i64 {
    fn from(value: ProductId) -> Self {
        value.0
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A catalog item as it travels over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "Id")]
    pub id: ProductId,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "ImgFile")]
    pub image_file: String,
    #[serde(rename = "Url")]
    pub url: String,
    #[serde(rename = "Prices", default, skip_serializing_if = "Option::is_none")]
    pub prices: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionLabel {
    Liked,
    Disliked,
    /// Initial load; carries no judgment.
    First,
}

impl DecisionLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Liked => "liked",
            Self::Disliked => "disliked",
            Self::First => "first",
        }
    }

    pub fn is_decision(self) -> bool {
        !matches!(self, Self::First)
    }
}

impl FromStr for DecisionLabel {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "liked" => Ok(Self::Liked),
            "disliked" => Ok(Self::Disliked),
            "first" => Ok(Self::First),
            other => Err(AppError::MalformedPayload(format!(
                "unknown decision label: {other}"
            ))),
        }
    }
}

impl Display for DecisionLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionRecord {
    pub id: i64,
    pub session_id: i64,
    pub product_id: i64,
    pub label: String,
    pub decided_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub read_products: usize,
    pub newly_inserted: usize,
}
