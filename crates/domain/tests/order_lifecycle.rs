//! Integration tests for the order service over the in-memory repository.

use common::{Money, OrderNo, ProductId, UserId};
use domain::{
    CreateOrder, DomainError, InMemoryOrderRepository, OrderError, OrderService, OrderStatus,
    PaymentType, UpdateOrder,
};

fn service() -> OrderService<InMemoryOrderRepository> {
    OrderService::new(InMemoryOrderRepository::new())
}

fn create_cmd(order_no: &str, amount_cents: i64) -> CreateOrder {
    CreateOrder {
        order_no: Some(OrderNo::new(order_no)),
        user_id: UserId::new(),
        product_id: ProductId::new(10),
        amount: Money::from_cents(amount_cents),
        payment_type: PaymentType::Wechat,
    }
}

#[tokio::test]
async fn test_full_order_lifecycle() {
    let service = service();

    let order = service.create(create_cmd("ORD-100", 2000)).await.unwrap();
    assert_eq!(order.status, OrderStatus::Normal);

    let updated = service
        .update(UpdateOrder {
            order_no: OrderNo::new("ORD-100"),
            amount: Money::from_cents(2500),
            payment_type: PaymentType::Alipay,
        })
        .await
        .unwrap();
    assert_eq!(updated.amount, Money::from_cents(2500));

    let detail = service
        .detail(&OrderNo::new("ORD-100"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.payment_type, PaymentType::Alipay);

    let deleted = service.delete(&OrderNo::new("ORD-100")).await.unwrap();
    assert_eq!(deleted.status, OrderStatus::Deleted);

    // The record survives as a soft-deleted row.
    let after = service
        .detail(&OrderNo::new("ORD-100"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.status, OrderStatus::Deleted);
}

#[tokio::test]
async fn test_order_no_is_a_unique_business_key() {
    let service = service();
    service.create(create_cmd("ORD-1", 100)).await.unwrap();

    let result = service.create(create_cmd("ORD-1", 200)).await;
    assert!(matches!(
        result,
        Err(DomainError::Order(OrderError::DuplicateOrderNo { .. }))
    ));

    // A deleted order still owns its order number; no resurrection through
    // re-creation.
    service.delete(&OrderNo::new("ORD-1")).await.unwrap();
    let result = service.create(create_cmd("ORD-1", 300)).await;
    assert!(matches!(
        result,
        Err(DomainError::Order(OrderError::DuplicateOrderNo { .. }))
    ));
}

#[tokio::test]
async fn test_status_transitions_are_append_only() {
    let service = service();
    service.create(create_cmd("ORD-1", 100)).await.unwrap();
    service.delete(&OrderNo::new("ORD-1")).await.unwrap();

    // No path leads out of Deleted.
    let result = service
        .update(UpdateOrder {
            order_no: OrderNo::new("ORD-1"),
            amount: Money::from_cents(1),
            payment_type: PaymentType::Undefined,
        })
        .await;
    assert!(matches!(
        result,
        Err(DomainError::Order(OrderError::InvalidStatusTransition { .. }))
    ));

    let detail = service
        .detail(&OrderNo::new("ORD-1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.status, OrderStatus::Deleted);
}

#[tokio::test]
async fn test_list_returns_all_statuses() {
    let service = service();
    service.create(create_cmd("ORD-1", 100)).await.unwrap();
    service.create(create_cmd("ORD-2", 200)).await.unwrap();
    service.delete(&OrderNo::new("ORD-1")).await.unwrap();

    let orders = service.list().await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(
        orders
            .iter()
            .filter(|o| o.status == OrderStatus::Normal)
            .count(),
        1
    );
}
