//! Integration tests for the order-creation saga.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{Money, OrderNo, ProductId, UserId};
use domain::{InMemoryOrderRepository, OrderRepository, OrderStatus, PaymentType};
use product::{
    InMemoryProductStore, NewProduct, Product, ProductError, ProductRepository, StockRequest,
    StockService,
};
use saga::{CreateOrderSaga, OrderSagaCoordinator, RevertOrder, SagaError};
use tokio::sync::Notify;

struct TestHarness {
    coordinator: OrderSagaCoordinator<InMemoryOrderRepository, InMemoryProductStore>,
    orders: InMemoryOrderRepository,
    products: InMemoryProductStore,
    product: Product,
}

impl TestHarness {
    async fn new(stock: u32) -> Self {
        let orders = InMemoryOrderRepository::new();
        let products = InMemoryProductStore::new();
        let product = products
            .create(NewProduct {
                name: "Widget".to_string(),
                price: Money::from_cents(1500),
                stock,
            })
            .await
            .unwrap();

        let coordinator = OrderSagaCoordinator::new(orders.clone(), products.clone());

        Self {
            coordinator,
            orders,
            products,
            product,
        }
    }

    fn cmd(&self, order_no: &str, quantity: u32) -> CreateOrderSaga {
        CreateOrderSaga {
            order_no: Some(OrderNo::new(order_no)),
            user_id: UserId::new(),
            product_id: self.product.id,
            amount: Money::from_cents(3000),
            payment_type: PaymentType::Alipay,
            quantity,
        }
    }

    async fn order_status(&self, order_no: &str) -> Option<OrderStatus> {
        self.orders
            .find_by_order_no(&OrderNo::new(order_no))
            .await
            .unwrap()
            .map(|o| o.status)
    }
}

#[tokio::test]
async fn test_committed_saga_decrements_stock_exactly_once() {
    let h = TestHarness::new(10).await;

    let order = h.coordinator.create_saga(h.cmd("ORD-1", 4)).await.unwrap();

    assert_eq!(order.status, OrderStatus::Normal);
    assert_eq!(h.products.stock_of(h.product.id), Some(6));
    assert!(h.products.has_applied_decrement(&order.order_no));
}

#[tokio::test]
async fn test_independent_sagas_run_for_distinct_order_numbers() {
    let h = TestHarness::new(10).await;

    let (a, b) = tokio::join!(
        h.coordinator.create_saga(h.cmd("ORD-A", 2)),
        h.coordinator.create_saga(h.cmd("ORD-B", 3)),
    );
    a.unwrap();
    b.unwrap();

    assert_eq!(h.products.stock_of(h.product.id), Some(5));
    assert_eq!(h.order_status("ORD-A").await, Some(OrderStatus::Normal));
    assert_eq!(h.order_status("ORD-B").await, Some(OrderStatus::Normal));
}

#[tokio::test]
async fn test_zero_stock_leaves_no_normal_order() {
    let h = TestHarness::new(0).await;

    let result = h.coordinator.create_saga(h.cmd("ORD-1", 1)).await;

    assert!(matches!(
        result,
        Err(SagaError::StockStep(ProductError::InsufficientStock { .. }))
    ));
    assert_eq!(h.products.stock_of(h.product.id), Some(0));
    assert_eq!(h.order_status("ORD-1").await, Some(OrderStatus::Deleted));
}

#[tokio::test]
async fn test_rollback_then_retry_with_fresh_order_number() {
    let h = TestHarness::new(3).await;

    // First attempt over-asks and rolls back.
    let result = h.coordinator.create_saga(h.cmd("ORD-1", 5)).await;
    assert!(result.is_err());
    assert_eq!(h.products.stock_of(h.product.id), Some(3));

    // The caller retries by issuing a new saga.
    let order = h.coordinator.create_saga(h.cmd("ORD-2", 3)).await.unwrap();
    assert_eq!(order.status, OrderStatus::Normal);
    assert_eq!(h.products.stock_of(h.product.id), Some(0));
}

#[tokio::test]
async fn test_compensation_failure_is_surfaced_distinctly() {
    let h = TestHarness::new(10).await;
    h.products.set_fail_on_decrease(true);
    h.products.set_fail_on_revert(true);

    let result = h.coordinator.create_saga(h.cmd("ORD-1", 2)).await;

    match result {
        Err(SagaError::CompensationFailed { order_no, .. }) => {
            assert_eq!(order_no, "ORD-1");
        }
        other => panic!("expected CompensationFailed, got {other:?}"),
    }
    // Order left for reconciliation, never silently dropped.
    assert_eq!(h.order_status("ORD-1").await, Some(OrderStatus::Normal));
}

#[tokio::test]
async fn test_create_revert_roundtrip() {
    let h = TestHarness::new(10).await;
    let order = h.coordinator.create_saga(h.cmd("ORD-1", 4)).await.unwrap();

    let revert = RevertOrder {
        order_no: order.order_no.clone(),
        product_id: h.product.id,
        quantity: 4,
    };
    h.coordinator.create_revert(revert.clone()).await.unwrap();
    h.coordinator.create_revert(revert).await.unwrap();

    assert_eq!(h.products.stock_of(h.product.id), Some(10));
    assert_eq!(h.order_status("ORD-1").await, Some(OrderStatus::Deleted));
}

/// Stock service that parks the decrement until released, so tests can
/// cancel the caller while Step B is in flight.
#[derive(Clone)]
struct GatedStock {
    inner: InMemoryProductStore,
    started: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait]
impl StockService for GatedStock {
    async fn decrease_stock(&self, req: StockRequest) -> Result<(), ProductError> {
        self.started.notify_one();
        self.release.notified().await;
        self.inner.decrease_stock(req).await
    }

    async fn decrease_stock_revert(&self, req: StockRequest) -> Result<(), ProductError> {
        self.inner.decrease_stock_revert(req).await
    }
}

#[tokio::test]
async fn test_cancelled_caller_still_observes_stock_outcome() {
    let orders = InMemoryOrderRepository::new();
    let products = InMemoryProductStore::new();
    let product = products
        .create(NewProduct {
            name: "Widget".to_string(),
            price: Money::from_cents(1500),
            stock: 10,
        })
        .await
        .unwrap();

    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let gated = GatedStock {
        inner: products.clone(),
        started: started.clone(),
        release: release.clone(),
    };

    let coordinator = Arc::new(
        OrderSagaCoordinator::new(orders.clone(), gated)
            .with_step_timeout(Duration::from_secs(30)),
    );

    let caller = {
        let coordinator = coordinator.clone();
        let product_id = product.id;
        tokio::spawn(async move {
            coordinator
                .create_saga(CreateOrderSaga {
                    order_no: Some(OrderNo::new("ORD-1")),
                    user_id: UserId::new(),
                    product_id,
                    amount: Money::from_cents(3000),
                    payment_type: PaymentType::Wechat,
                    quantity: 4,
                })
                .await
        })
    };

    // Cancel the caller while the decrement is dispatched but unresolved.
    started.notified().await;
    caller.abort();
    assert!(caller.await.unwrap_err().is_cancelled());

    // The decrement then succeeds; the saga must commit rather than assume
    // failure and spuriously revert.
    release.notify_one();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        if products.has_applied_decrement(&OrderNo::new("ORD-1")) {
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "decrement never applied");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(products.stock_of(product.id), Some(6));
    let order = orders
        .find_by_order_no(&OrderNo::new("ORD-1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.status, OrderStatus::Normal);
}
