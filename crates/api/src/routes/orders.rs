//! Order CRUD and saga endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{Money, OrderNo, ProductId, UserId};
use domain::{CreateOrder, Order, OrderRepository, PaymentType, UpdateOrder, UserRepository};
use product::{ProductRepository, StockService};
use saga::{CreateOrderSaga, RevertOrder};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;
use crate::response::ApiResponse;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub order_no: Option<String>,
    pub user_id: String,
    pub product_id: i64,
    pub amount_cents: i64,
    #[serde(default)]
    pub payment_type: PaymentType,
}

#[derive(Deserialize)]
pub struct CreateOrderSagaRequest {
    pub order_no: Option<String>,
    pub user_id: String,
    pub product_id: i64,
    pub amount_cents: i64,
    #[serde(default)]
    pub payment_type: PaymentType,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct CreateOrderRevertRequest {
    pub order_no: String,
    pub product_id: i64,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct UpdateOrderRequest {
    pub order_no: String,
    pub amount_cents: i64,
    pub payment_type: PaymentType,
}

#[derive(Deserialize)]
pub struct DeleteOrderRequest {
    pub order_no: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub order_no: String,
    pub user_id: String,
    pub product_id: i64,
    pub amount_cents: i64,
    pub payment_type: PaymentType,
    pub status: String,
    pub created_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            order_no: order.order_no.to_string(),
            user_id: order.user_id.to_string(),
            product_id: order.product_id.as_i64(),
            amount_cents: order.amount.cents(),
            payment_type: order.payment_type,
            status: order.status.to_string(),
            created_at: order.created_at.to_rfc3339(),
        }
    }
}

// -- Handlers --

/// POST /v1/order/create — plain forward action: persist the order record.
///
/// Used when a remote coordinator drives the cross-service saga itself.
#[tracing::instrument(skip(state, req))]
pub async fn create<R, U, P>(
    State(state): State<Arc<AppState<R, U, P>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>), ApiError>
where
    R: OrderRepository + Clone + 'static,
    U: UserRepository + 'static,
    P: StockService + ProductRepository + Clone + 'static,
{
    let order = state
        .orders
        .create(CreateOrder {
            order_no: req.order_no.map(OrderNo::new),
            user_id: parse_user_id(&req.user_id)?,
            product_id: ProductId::new(req.product_id),
            amount: Money::from_cents(req.amount_cents),
            payment_type: req.payment_type,
        })
        .await?;

    Ok((StatusCode::CREATED, ApiResponse::ok(order.into())))
}

/// POST /v1/order/create_saga — saga-initiating variant: create the order
/// and decrement stock, compensating on partial failure.
#[tracing::instrument(skip(state, req))]
pub async fn create_saga<R, U, P>(
    State(state): State<Arc<AppState<R, U, P>>>,
    Json(req): Json<CreateOrderSagaRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>), ApiError>
where
    R: OrderRepository + Clone + 'static,
    U: UserRepository + 'static,
    P: StockService + ProductRepository + Clone + 'static,
{
    if req.quantity == 0 {
        return Err(ApiError::BadRequest("quantity must be positive".to_string()));
    }

    let order = state
        .saga
        .create_saga(CreateOrderSaga {
            order_no: req.order_no.map(OrderNo::new),
            user_id: parse_user_id(&req.user_id)?,
            product_id: ProductId::new(req.product_id),
            amount: Money::from_cents(req.amount_cents),
            payment_type: req.payment_type,
            quantity: req.quantity,
        })
        .await?;

    Ok((StatusCode::CREATED, ApiResponse::ok(order.into())))
}

/// POST /v1/order/create_revert — explicitly reverse a previously created
/// order's effects.
#[tracing::instrument(skip(state, req))]
pub async fn create_revert<R, U, P>(
    State(state): State<Arc<AppState<R, U, P>>>,
    Json(req): Json<CreateOrderRevertRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError>
where
    R: OrderRepository + Clone + 'static,
    U: UserRepository + 'static,
    P: StockService + ProductRepository + Clone + 'static,
{
    state
        .saga
        .create_revert(RevertOrder {
            order_no: OrderNo::new(req.order_no),
            product_id: ProductId::new(req.product_id),
            quantity: req.quantity,
        })
        .await?;

    Ok(ApiResponse::ok_empty())
}

/// POST /v1/order/update — update a live order.
#[tracing::instrument(skip(state, req))]
pub async fn update<R, U, P>(
    State(state): State<Arc<AppState<R, U, P>>>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError>
where
    R: OrderRepository + Clone + 'static,
    U: UserRepository + 'static,
    P: StockService + ProductRepository + Clone + 'static,
{
    let order = state
        .orders
        .update(UpdateOrder {
            order_no: OrderNo::new(req.order_no),
            amount: Money::from_cents(req.amount_cents),
            payment_type: req.payment_type,
        })
        .await?;

    Ok(ApiResponse::ok(order.into()))
}

/// POST /v1/order/delete — soft-delete an order.
#[tracing::instrument(skip(state, req))]
pub async fn delete<R, U, P>(
    State(state): State<Arc<AppState<R, U, P>>>,
    Json(req): Json<DeleteOrderRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError>
where
    R: OrderRepository + Clone + 'static,
    U: UserRepository + 'static,
    P: StockService + ProductRepository + Clone + 'static,
{
    let order = state.orders.delete(&OrderNo::new(req.order_no)).await?;
    Ok(ApiResponse::ok(order.into()))
}

/// GET /v1/order/detail/{order_no} — load an order by its order number.
#[tracing::instrument(skip(state))]
pub async fn detail<R, U, P>(
    State(state): State<Arc<AppState<R, U, P>>>,
    Path(order_no): Path<String>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError>
where
    R: OrderRepository + Clone + 'static,
    U: UserRepository + 'static,
    P: StockService + ProductRepository + Clone + 'static,
{
    let order = state
        .orders
        .detail(&OrderNo::new(order_no.clone()))
        .await?
        .ok_or_else(|| {
            ApiError::Domain(domain::OrderError::NotFound { order_no }.into())
        })?;

    Ok(ApiResponse::ok(order.into()))
}

/// GET /v1/order/list — list all orders.
#[tracing::instrument(skip(state))]
pub async fn list<R, U, P>(
    State(state): State<Arc<AppState<R, U, P>>>,
) -> Result<Json<ApiResponse<Vec<OrderResponse>>>, ApiError>
where
    R: OrderRepository + Clone + 'static,
    U: UserRepository + 'static,
    P: StockService + ProductRepository + Clone + 'static,
{
    let orders = state.orders.list().await?;
    Ok(ApiResponse::ok(orders.into_iter().map(Into::into).collect()))
}

fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    let uuid = uuid::Uuid::parse_str(raw)
        .map_err(|e| ApiError::BadRequest(format!("invalid user_id: {e}")))?;
    Ok(UserId::from_uuid(uuid))
}
