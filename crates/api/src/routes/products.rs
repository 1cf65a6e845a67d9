//! Product CRUD and stock endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{Money, OrderNo, ProductId};
use domain::{OrderRepository, UserRepository};
use product::{NewProduct, Product, ProductRepository, StockRequest, StockService};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;
use crate::response::ApiResponse;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub price_cents: i64,
    pub stock: u32,
}

#[derive(Deserialize)]
pub struct UpdateProductRequest {
    pub id: i64,
    pub name: String,
    pub price_cents: i64,
    pub stock: u32,
}

#[derive(Deserialize)]
pub struct DeleteProductRequest {
    pub id: i64,
}

#[derive(Deserialize, Clone)]
pub struct StockMutationRequest {
    pub product_id: i64,
    pub quantity: u32,
    pub order_no: String,
}

impl From<StockMutationRequest> for StockRequest {
    fn from(req: StockMutationRequest) -> Self {
        StockRequest::new(
            ProductId::new(req.product_id),
            req.quantity,
            OrderNo::new(req.order_no),
        )
    }
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub price_cents: i64,
    pub stock: u32,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.as_i64(),
            name: product.name,
            price_cents: product.price.cents(),
            stock: product.stock,
        }
    }
}

// -- Handlers --

/// POST /v1/product/create — add a product to the catalog.
#[tracing::instrument(skip(state, req))]
pub async fn create<R, U, P>(
    State(state): State<Arc<AppState<R, U, P>>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductResponse>>), ApiError>
where
    R: OrderRepository + Clone + 'static,
    U: UserRepository + 'static,
    P: StockService + ProductRepository + Clone + 'static,
{
    let product = state
        .products
        .create(NewProduct {
            name: req.name,
            price: Money::from_cents(req.price_cents),
            stock: req.stock,
        })
        .await?;

    Ok((StatusCode::CREATED, ApiResponse::ok(product.into())))
}

/// POST /v1/product/update — replace a product's fields.
#[tracing::instrument(skip(state, req))]
pub async fn update<R, U, P>(
    State(state): State<Arc<AppState<R, U, P>>>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ApiResponse<ProductResponse>>, ApiError>
where
    R: OrderRepository + Clone + 'static,
    U: UserRepository + 'static,
    P: StockService + ProductRepository + Clone + 'static,
{
    let product = state
        .products
        .update(Product {
            id: ProductId::new(req.id),
            name: req.name,
            price: Money::from_cents(req.price_cents),
            stock: req.stock,
        })
        .await?;

    Ok(ApiResponse::ok(product.into()))
}

/// POST /v1/product/delete — remove a product.
#[tracing::instrument(skip(state, req))]
pub async fn delete<R, U, P>(
    State(state): State<Arc<AppState<R, U, P>>>,
    Json(req): Json<DeleteProductRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError>
where
    R: OrderRepository + Clone + 'static,
    U: UserRepository + 'static,
    P: StockService + ProductRepository + Clone + 'static,
{
    state.products.delete(ProductId::new(req.id)).await?;
    Ok(ApiResponse::ok_empty())
}

/// GET /v1/product/detail/{id} — load a product.
#[tracing::instrument(skip(state))]
pub async fn detail<R, U, P>(
    State(state): State<Arc<AppState<R, U, P>>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ProductResponse>>, ApiError>
where
    R: OrderRepository + Clone + 'static,
    U: UserRepository + 'static,
    P: StockService + ProductRepository + Clone + 'static,
{
    let product_id = ProductId::new(id);
    let product = state
        .products
        .get(product_id)
        .await?
        .ok_or(ApiError::Product(product::ProductError::NotFound(product_id)))?;

    Ok(ApiResponse::ok(product.into()))
}

/// GET /v1/product/list — list the catalog.
#[tracing::instrument(skip(state))]
pub async fn list<R, U, P>(
    State(state): State<Arc<AppState<R, U, P>>>,
) -> Result<Json<ApiResponse<Vec<ProductResponse>>>, ApiError>
where
    R: OrderRepository + Clone + 'static,
    U: UserRepository + 'static,
    P: StockService + ProductRepository + Clone + 'static,
{
    let products = state.products.list().await?;
    Ok(ApiResponse::ok(
        products.into_iter().map(Into::into).collect(),
    ))
}

/// POST /v1/product/decrease_stock — forward action, idempotent per order
/// number.
#[tracing::instrument(skip(state, req))]
pub async fn decrease_stock<R, U, P>(
    State(state): State<Arc<AppState<R, U, P>>>,
    Json(req): Json<StockMutationRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError>
where
    R: OrderRepository + Clone + 'static,
    U: UserRepository + 'static,
    P: StockService + ProductRepository + Clone + 'static,
{
    state.products.decrease_stock(req.into()).await?;
    Ok(ApiResponse::ok_empty())
}

/// POST /v1/product/decrease_stock_revert — compensating action, idempotent
/// per order number.
#[tracing::instrument(skip(state, req))]
pub async fn decrease_stock_revert<R, U, P>(
    State(state): State<Arc<AppState<R, U, P>>>,
    Json(req): Json<StockMutationRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError>
where
    R: OrderRepository + Clone + 'static,
    U: UserRepository + 'static,
    P: StockService + ProductRepository + Clone + 'static,
{
    state.products.decrease_stock_revert(req.into()).await?;
    Ok(ApiResponse::ok_empty())
}
