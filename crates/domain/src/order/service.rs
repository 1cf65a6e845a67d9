//! Order service providing a simplified API for order operations.

use common::{Money, OrderNo, ProductId, UserId};

use super::OrderError;
use super::model::{NewOrder, Order, PaymentType};
use super::repository::OrderRepository;
use super::state::OrderStatus;
use crate::error::DomainError;

/// Fields for creating an order.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    /// Business key; generated when absent.
    pub order_no: Option<OrderNo>,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub amount: Money,
    pub payment_type: PaymentType,
}

/// Fields for updating an order.
#[derive(Debug, Clone)]
pub struct UpdateOrder {
    pub order_no: OrderNo,
    pub amount: Money,
    pub payment_type: PaymentType,
}

/// Service for managing orders.
pub struct OrderService<R: OrderRepository> {
    repo: R,
}

impl<R: OrderRepository + Clone> Clone for OrderService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}

impl<R: OrderRepository> OrderService<R> {
    /// Creates a new order service with the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an order with status Normal.
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, cmd: CreateOrder) -> Result<Order, DomainError> {
        let order_no = cmd.order_no.unwrap_or_else(OrderNo::generate);
        self.repo
            .insert(NewOrder {
                order_no,
                user_id: cmd.user_id,
                product_id: cmd.product_id,
                amount: cmd.amount,
                payment_type: cmd.payment_type,
                status: OrderStatus::Normal,
            })
            .await
    }

    /// Updates a live order's amount and payment type.
    #[tracing::instrument(skip(self))]
    pub async fn update(&self, cmd: UpdateOrder) -> Result<Order, DomainError> {
        let mut order = self.require(&cmd.order_no).await?;

        if !order.status.can_update() {
            return Err(OrderError::InvalidStatusTransition {
                current: order.status,
                action: "update",
            }
            .into());
        }

        order.amount = cmd.amount;
        order.payment_type = cmd.payment_type;
        self.repo.update(order).await
    }

    /// Marks an order deleted.
    ///
    /// Deleting an already-deleted order succeeds without change, which
    /// keeps compensation replays harmless. Deleted orders are never
    /// resurrected.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, order_no: &OrderNo) -> Result<Order, DomainError> {
        let order = self.require(order_no).await?;

        match order.status {
            OrderStatus::Deleted => Ok(order),
            status if status.can_delete() => {
                self.repo.set_status(order_no, OrderStatus::Deleted).await
            }
            status => Err(OrderError::InvalidStatusTransition {
                current: status,
                action: "delete",
            }
            .into()),
        }
    }

    /// Loads an order by its order number.
    ///
    /// Returns None if the order doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn detail(&self, order_no: &OrderNo) -> Result<Option<Order>, DomainError> {
        self.repo.find_by_order_no(order_no).await
    }

    /// Lists all orders.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Order>, DomainError> {
        self.repo.list().await
    }

    async fn require(&self, order_no: &OrderNo) -> Result<Order, DomainError> {
        self.repo
            .find_by_order_no(order_no)
            .await?
            .ok_or_else(|| {
                OrderError::NotFound {
                    order_no: order_no.to_string(),
                }
                .into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::memory::InMemoryOrderRepository;

    fn create_cmd(order_no: &str) -> CreateOrder {
        CreateOrder {
            order_no: Some(OrderNo::new(order_no)),
            user_id: UserId::new(),
            product_id: ProductId::new(1),
            amount: Money::from_cents(1500),
            payment_type: PaymentType::Alipay,
        }
    }

    #[tokio::test]
    async fn test_create_sets_status_normal() {
        let service = OrderService::new(InMemoryOrderRepository::new());
        let order = service.create(create_cmd("ORD-1")).await.unwrap();
        assert_eq!(order.status, OrderStatus::Normal);
        assert_eq!(order.order_no, OrderNo::new("ORD-1"));
    }

    #[tokio::test]
    async fn test_create_generates_order_no_when_absent() {
        let service = OrderService::new(InMemoryOrderRepository::new());
        let mut cmd = create_cmd("ignored");
        cmd.order_no = None;
        let order = service.create(cmd).await.unwrap();
        assert!(!order.order_no.as_str().is_empty());
    }

    #[tokio::test]
    async fn test_create_duplicate_conflicts() {
        let service = OrderService::new(InMemoryOrderRepository::new());
        service.create(create_cmd("ORD-1")).await.unwrap();

        let result = service.create(create_cmd("ORD-1")).await;
        assert!(matches!(
            result,
            Err(DomainError::Order(OrderError::DuplicateOrderNo { .. }))
        ));
    }

    #[tokio::test]
    async fn test_update() {
        let service = OrderService::new(InMemoryOrderRepository::new());
        service.create(create_cmd("ORD-1")).await.unwrap();

        let updated = service
            .update(UpdateOrder {
                order_no: OrderNo::new("ORD-1"),
                amount: Money::from_cents(9900),
                payment_type: PaymentType::Wechat,
            })
            .await
            .unwrap();

        assert_eq!(updated.amount, Money::from_cents(9900));
        assert_eq!(updated.payment_type, PaymentType::Wechat);
    }

    #[tokio::test]
    async fn test_update_deleted_order_rejected() {
        let service = OrderService::new(InMemoryOrderRepository::new());
        service.create(create_cmd("ORD-1")).await.unwrap();
        service.delete(&OrderNo::new("ORD-1")).await.unwrap();

        let result = service
            .update(UpdateOrder {
                order_no: OrderNo::new("ORD-1"),
                amount: Money::from_cents(1),
                payment_type: PaymentType::Wechat,
            })
            .await;

        assert!(matches!(
            result,
            Err(DomainError::Order(OrderError::InvalidStatusTransition { .. }))
        ));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent_and_terminal() {
        let service = OrderService::new(InMemoryOrderRepository::new());
        service.create(create_cmd("ORD-1")).await.unwrap();

        let deleted = service.delete(&OrderNo::new("ORD-1")).await.unwrap();
        assert_eq!(deleted.status, OrderStatus::Deleted);

        // Second delete is a no-op success; the order stays deleted.
        let again = service.delete(&OrderNo::new("ORD-1")).await.unwrap();
        assert_eq!(again.status, OrderStatus::Deleted);
    }

    #[tokio::test]
    async fn test_delete_unknown_order() {
        let service = OrderService::new(InMemoryOrderRepository::new());
        let result = service.delete(&OrderNo::new("missing")).await;
        assert!(matches!(
            result,
            Err(DomainError::Order(OrderError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_detail_and_list() {
        let service = OrderService::new(InMemoryOrderRepository::new());
        assert!(service.detail(&OrderNo::new("ORD-1")).await.unwrap().is_none());

        service.create(create_cmd("ORD-1")).await.unwrap();
        service.create(create_cmd("ORD-2")).await.unwrap();

        assert!(service.detail(&OrderNo::new("ORD-1")).await.unwrap().is_some());
        assert_eq!(service.list().await.unwrap().len(), 2);
    }
}
