use crate::{
    db_types::{NewRefund, Order, OrderStatusType, Refund},
    traits::StoreError,
};

/// The refund ledger. Refund rows are append-only.
#[allow(async_fn_in_trait)]
pub trait RefundManagement {
    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, StoreError>;

    /// All refunds with `succeeded` status for the order, oldest first.
    async fn fetch_succeeded_refunds(&self, order_id: i64) -> Result<Vec<Refund>, StoreError>;

    async fn insert_refund(&self, refund: NewRefund) -> Result<Refund, StoreError>;

    /// Sets the order's status and returns the updated order.
    async fn update_order_status(&self, order_id: i64, status: OrderStatusType) -> Result<Order, StoreError>;

    /// Marks every `valid` ticket of the order as `invalid`. Returns the number of tickets changed.
    async fn invalidate_tickets_for_order(&self, order_id: i64) -> Result<u64, StoreError>;
}
