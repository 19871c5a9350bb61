use std::sync::Arc;

use axum::{
    extract::{Form, Query, State},
    response::Html,
    Json,
};
use serde::Deserialize;
use tokio::task::spawn_blocking;
use tracing::debug;

use crate::catalog::{DecisionLabel, Product, ProductId};
use crate::error::AppError;
use crate::server::pages;
use crate::server::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct ExchangeForm {
    #[serde(rename = "productId", default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub liked: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(rename = "firstId", default)]
    pub first_id: Option<String>,
}

pub async fn next_product_handler(
    State(state): State<Arc<ServerState>>,
    Form(form): Form<ExchangeForm>,
) -> Result<Json<Product>, AppError> {
    let requested = parse_requested_id(form.product_id.as_deref())?;
    let label: DecisionLabel = form
        .liked
        .as_deref()
        .ok_or_else(|| AppError::MalformedPayload("missing liked field".to_string()))?
        .parse()?;
    debug!(?requested, %label, "next product requested");

    let task = spawn_blocking(move || state.exchange.next_product(requested, label));
    let product = task.await??;
    Ok(Json(product))
}

pub async fn start_page_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let first_id = query
        .first_id
        .as_deref()
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .and_then(|value| ProductId::new(value).ok())
        .unwrap_or(state.config.first_product_id);

    let page_state = Arc::clone(&state);
    let task = spawn_blocking(move || page_state.exchange.starting_product(first_id));
    let product = task.await??;
    Ok(Html(pages::start_page(&product, &state.config.link_base)))
}

pub async fn showcase_handler() -> Html<String> {
    Html(pages::showcase_page())
}

/// Empty or absent ids defer to the server default; anything else must be an
/// integer.
fn parse_requested_id(raw: Option<&str>) -> Result<Option<i64>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<i64>()
            .map(Some)
            .map_err(|_| {
                AppError::MalformedPayload(format!("productId is not an integer: {value}"))
            }),
    }
}
