//! Saga coordinator for order creation across the order and product
//! services.

use std::future::Future;
use std::time::Duration;

use common::{Money, OrderNo, ProductId, UserId};
use domain::{CreateOrder, Order, OrderRepository, OrderService, PaymentType};
use product::{StockRequest, StockService};

use crate::error::SagaError;
use crate::state::SagaState;

/// Default bound on each remote stock call.
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Request for the saga-initiating create-order entry point.
#[derive(Debug, Clone)]
pub struct CreateOrderSaga {
    /// Business key; generated when absent.
    pub order_no: Option<OrderNo>,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub amount: Money,
    pub payment_type: PaymentType,
    /// Units of stock the order reserves.
    pub quantity: u32,
}

/// Request for the explicit reversal entry point.
#[derive(Debug, Clone)]
pub struct RevertOrder {
    pub order_no: OrderNo,
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Orchestrates the two-step order creation saga.
///
/// Step A persists the order record, Step B decrements product stock. On a
/// Step B failure the coordinator takes the compensation edge: revert the
/// (possibly applied) stock decrement, then delete the order record. Both
/// compensating actions are idempotent per order number, so retries and
/// replays cannot double-credit.
pub struct OrderSagaCoordinator<R, P>
where
    R: OrderRepository + Clone + Send + Sync + 'static,
    P: StockService + Clone + Send + Sync + 'static,
{
    orders: OrderService<R>,
    stock: P,
    step_timeout: Duration,
}

impl<R, P> OrderSagaCoordinator<R, P>
where
    R: OrderRepository + Clone + Send + Sync + 'static,
    P: StockService + Clone + Send + Sync + 'static,
{
    /// Creates a new coordinator over the given order repository and stock
    /// service.
    pub fn new(order_repo: R, stock: P) -> Self {
        Self {
            orders: OrderService::new(order_repo),
            stock,
            step_timeout: DEFAULT_STEP_TIMEOUT,
        }
    }

    /// Overrides the per-step remote call timeout.
    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = timeout;
        self
    }

    /// Executes the order-creation saga.
    ///
    /// Returns the committed order, or the failure of whichever step broke
    /// the saga. The stock step and its compensation run on a detached task
    /// so that a cancelled caller cannot leave a dispatched decrement
    /// unobserved.
    #[tracing::instrument(skip(self, cmd), fields(order_no))]
    pub async fn create_saga(&self, cmd: CreateOrderSaga) -> Result<Order, SagaError> {
        metrics::counter!("saga_executions_total").increment(1);
        let started = std::time::Instant::now();
        let mut state = SagaState::Init;

        // Step A: persist the order record. Failure here terminates the
        // saga with no compensation; nothing external has happened yet.
        let order = self
            .orders
            .create(CreateOrder {
                order_no: cmd.order_no,
                user_id: cmd.user_id,
                product_id: cmd.product_id,
                amount: cmd.amount,
                payment_type: cmd.payment_type,
            })
            .await?;

        tracing::Span::current().record("order_no", order.order_no.as_str());
        advance(&mut state, SagaState::OrderCreated, &order.order_no);

        // Step B and its compensation must reach a terminal state even if
        // the caller goes away mid-flight.
        let handle = tokio::spawn(stock_phase(
            self.orders.clone(),
            self.stock.clone(),
            order,
            cmd.quantity,
            self.step_timeout,
            state,
        ));

        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(SagaError::Aborted(e.to_string())),
        };

        let duration = started.elapsed().as_secs_f64();
        metrics::histogram!("saga_duration_seconds").record(duration);
        match &result {
            Ok(order) => {
                metrics::counter!("saga_completed").increment(1);
                tracing::info!(order_no = %order.order_no, duration, "saga committed");
            }
            Err(SagaError::CompensationFailed { order_no, .. }) => {
                metrics::counter!("saga_compensation_failed").increment(1);
                tracing::error!(%order_no, "saga compensation failed, manual reconciliation required");
            }
            Err(e) => {
                metrics::counter!("saga_failed").increment(1);
                tracing::warn!(error = %e, "saga rolled back");
            }
        }

        result
    }

    /// Explicitly reverses a previously created order's effects: the stock
    /// decrement is credited back and the order record is marked deleted.
    ///
    /// This entry point serves remote callers that orchestrate the
    /// cross-service saga themselves; it is idempotent per order number and
    /// tolerates the forward path having stopped at any point (an unknown
    /// order or a never-applied decrement are no-ops).
    #[tracing::instrument(skip(self))]
    pub async fn create_revert(&self, cmd: RevertOrder) -> Result<(), SagaError> {
        let req = StockRequest::new(cmd.product_id, cmd.quantity, cmd.order_no.clone());
        call_with_timeout(self.step_timeout, self.stock.decrease_stock_revert(req)).await?;

        if self.orders.detail(&cmd.order_no).await?.is_some() {
            self.orders.delete(&cmd.order_no).await?;
        }

        tracing::info!(order_no = %cmd.order_no, "order creation reverted");
        Ok(())
    }
}

/// Step B plus its compensation edge; runs detached from the caller.
async fn stock_phase<R, P>(
    orders: OrderService<R>,
    stock: P,
    order: Order,
    quantity: u32,
    step_timeout: Duration,
    mut state: SagaState,
) -> Result<Order, SagaError>
where
    R: OrderRepository + Clone + Send + Sync + 'static,
    P: StockService + Send + Sync,
{
    let req = StockRequest::new(order.product_id, quantity, order.order_no.clone());

    let step_failure = match call_with_timeout(step_timeout, stock.decrease_stock(req.clone())).await
    {
        Ok(()) => {
            advance(&mut state, SagaState::Committed, &order.order_no);
            return Ok(order);
        }
        Err(e) => e,
    };

    advance(&mut state, SagaState::Compensating, &order.order_no);
    tracing::warn!(order_no = %order.order_no, error = %step_failure, "stock step failed, compensating");

    // Revert first: the decrement may have been applied even though the
    // call reported failure (e.g. a timeout), and the revert is a no-op
    // when it wasn't.
    if let Err(revert_failure) =
        call_with_timeout(step_timeout, stock.decrease_stock_revert(req)).await
    {
        advance(&mut state, SagaState::CompensationFailed, &order.order_no);
        return Err(SagaError::CompensationFailed {
            order_no: order.order_no.to_string(),
            reason: revert_failure.to_string(),
            cause: step_failure.to_string(),
        });
    }

    if let Err(delete_failure) = orders.delete(&order.order_no).await {
        advance(&mut state, SagaState::CompensationFailed, &order.order_no);
        return Err(SagaError::CompensationFailed {
            order_no: order.order_no.to_string(),
            reason: delete_failure.to_string(),
            cause: step_failure.to_string(),
        });
    }

    advance(&mut state, SagaState::RolledBack, &order.order_no);
    Err(step_failure.into())
}

/// Bounds a remote stock call; a timeout is a step failure, not an error to
/// retry.
async fn call_with_timeout<F>(timeout: Duration, call: F) -> Result<(), product::ProductError>
where
    F: Future<Output = Result<(), product::ProductError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(product::ProductError::Unavailable(format!(
            "call timed out after {} ms",
            timeout.as_millis()
        ))),
    }
}

fn advance(state: &mut SagaState, next: SagaState, order_no: &OrderNo) {
    debug_assert!(state.can_transition_to(next), "{state} -> {next}");
    tracing::debug!(%order_no, from = %state, to = %next, "saga transition");
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{InMemoryOrderRepository, OrderRepository, OrderStatus};
    use product::{InMemoryProductStore, NewProduct, Product, ProductError, ProductRepository};

    type TestCoordinator = OrderSagaCoordinator<InMemoryOrderRepository, InMemoryProductStore>;

    async fn setup(stock: u32) -> (TestCoordinator, InMemoryOrderRepository, InMemoryProductStore, Product) {
        let orders = InMemoryOrderRepository::new();
        let products = InMemoryProductStore::new();
        let product = products
            .create(NewProduct {
                name: "Widget".to_string(),
                price: Money::from_cents(1000),
                stock,
            })
            .await
            .unwrap();

        let coordinator = OrderSagaCoordinator::new(orders.clone(), products.clone());
        (coordinator, orders, products, product)
    }

    fn saga_cmd(product: &Product, quantity: u32) -> CreateOrderSaga {
        CreateOrderSaga {
            order_no: Some(OrderNo::new("ORD-1")),
            user_id: UserId::new(),
            product_id: product.id,
            amount: Money::from_cents(2000),
            payment_type: PaymentType::Wechat,
            quantity,
        }
    }

    #[tokio::test]
    async fn test_happy_path_commits_order_and_stock() {
        let (coordinator, _orders, products, product) = setup(10).await;

        let order = coordinator.create_saga(saga_cmd(&product, 3)).await.unwrap();

        assert_eq!(order.status, OrderStatus::Normal);
        assert_eq!(products.stock_of(product.id), Some(7));
        assert!(products.has_applied_decrement(&order.order_no));
    }

    #[tokio::test]
    async fn test_step_a_failure_needs_no_compensation() {
        let (coordinator, _orders, products, product) = setup(10).await;
        coordinator.create_saga(saga_cmd(&product, 3)).await.unwrap();

        // Same order number again: Step A conflicts, stock is untouched.
        let result = coordinator.create_saga(saga_cmd(&product, 3)).await;
        assert!(matches!(result, Err(SagaError::OrderStep(_))));
        assert_eq!(products.stock_of(product.id), Some(7));
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back() {
        let (coordinator, orders, products, product) = setup(2).await;

        let result = coordinator.create_saga(saga_cmd(&product, 5)).await;

        assert!(matches!(
            result,
            Err(SagaError::StockStep(ProductError::InsufficientStock { .. }))
        ));
        assert_eq!(products.stock_of(product.id), Some(2));

        // No order with status Normal survives the rollback.
        let order = orders
            .find_by_order_no(&OrderNo::new("ORD-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.status, OrderStatus::Deleted);
    }

    #[tokio::test]
    async fn test_stock_unreachable_rolls_back() {
        let (coordinator, orders, products, product) = setup(10).await;
        products.set_fail_on_decrease(true);

        let result = coordinator.create_saga(saga_cmd(&product, 3)).await;

        assert!(matches!(
            result,
            Err(SagaError::StockStep(ProductError::Unavailable(_)))
        ));
        products.set_fail_on_decrease(false);
        assert_eq!(products.stock_of(product.id), Some(10));
        let order = orders
            .find_by_order_no(&OrderNo::new("ORD-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.status, OrderStatus::Deleted);
    }

    #[tokio::test]
    async fn test_revert_failure_is_fatal_and_distinct() {
        let (coordinator, orders, products, product) = setup(10).await;
        products.set_fail_on_decrease(true);
        products.set_fail_on_revert(true);

        let result = coordinator.create_saga(saga_cmd(&product, 3)).await;

        assert!(matches!(result, Err(SagaError::CompensationFailed { .. })));

        // The order is left in place for reconciliation.
        let order = orders
            .find_by_order_no(&OrderNo::new("ORD-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.status, OrderStatus::Normal);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stock_timeout_is_a_step_failure() {
        use async_trait::async_trait;

        /// Stock service whose decrease never completes in time.
        #[derive(Clone)]
        struct SlowStock {
            inner: InMemoryProductStore,
        }

        #[async_trait]
        impl StockService for SlowStock {
            async fn decrease_stock(&self, req: StockRequest) -> Result<(), ProductError> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                self.inner.decrease_stock(req).await
            }

            async fn decrease_stock_revert(&self, req: StockRequest) -> Result<(), ProductError> {
                self.inner.decrease_stock_revert(req).await
            }
        }

        let orders = InMemoryOrderRepository::new();
        let products = InMemoryProductStore::new();
        let product = products
            .create(NewProduct {
                name: "Widget".to_string(),
                price: Money::from_cents(1000),
                stock: 10,
            })
            .await
            .unwrap();

        let coordinator = OrderSagaCoordinator::new(
            orders.clone(),
            SlowStock {
                inner: products.clone(),
            },
        )
        .with_step_timeout(Duration::from_millis(100));

        let result = coordinator.create_saga(saga_cmd(&product, 3)).await;

        assert!(matches!(
            result,
            Err(SagaError::StockStep(ProductError::Unavailable(_)))
        ));
        assert_eq!(products.stock_of(product.id), Some(10));
        let order = orders
            .find_by_order_no(&OrderNo::new("ORD-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.status, OrderStatus::Deleted);
    }

    #[tokio::test]
    async fn test_create_revert_after_commit() {
        let (coordinator, orders, products, product) = setup(10).await;
        let order = coordinator.create_saga(saga_cmd(&product, 4)).await.unwrap();
        assert_eq!(products.stock_of(product.id), Some(6));

        let revert = RevertOrder {
            order_no: order.order_no.clone(),
            product_id: product.id,
            quantity: 4,
        };
        coordinator.create_revert(revert.clone()).await.unwrap();

        assert_eq!(products.stock_of(product.id), Some(10));
        let reverted = orders
            .find_by_order_no(&order.order_no)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reverted.status, OrderStatus::Deleted);

        // Reverting again credits nothing.
        coordinator.create_revert(revert).await.unwrap();
        assert_eq!(products.stock_of(product.id), Some(10));
    }

    #[tokio::test]
    async fn test_create_revert_unknown_order_is_noop() {
        let (coordinator, _orders, products, product) = setup(10).await;

        coordinator
            .create_revert(RevertOrder {
                order_no: OrderNo::new("never-created"),
                product_id: product.id,
                quantity: 5,
            })
            .await
            .unwrap();

        assert_eq!(products.stock_of(product.id), Some(10));
    }
}
