use chrono::{DateTime, Utc};
use mockall::mock;
use tix_engine::{
    db_types::{
        Business,
        Event,
        NewOrder,
        NewRefund,
        NewTicket,
        Order,
        OrderStatusType,
        PlatformSettings,
        PromoCode,
        Refund,
        Ticket,
        TicketType,
    },
    traits::{
        CatalogManagement,
        ChargeCreated,
        ChargeRecord,
        ChargeRequest,
        GatewayError,
        GatewayRefund,
        GatewayRefundRequest,
        InsertOrderResult,
        PaymentGateway,
        RefundManagement,
        SettlementDatabase,
        StoreError,
        TicketManagement,
    },
};

mock! {
    pub CheckoutStore {}
    impl CatalogManagement for CheckoutStore {
        async fn fetch_event(&self, event_id: i64) -> Result<Option<Event>, StoreError>;
        async fn fetch_ticket_types_for_event(&self, event_id: i64) -> Result<Vec<TicketType>, StoreError>;
        async fn fetch_business(&self, business_id: i64) -> Result<Option<Business>, StoreError>;
        async fn fetch_platform_settings(&self) -> Result<PlatformSettings, StoreError>;
        async fn fetch_promo_code(&self, event_id: i64, code: &str) -> Result<Option<PromoCode>, StoreError>;
    }
    impl TicketManagement for CheckoutStore {
        async fn fetch_ticket_by_number(&self, ticket_number: &str) -> Result<Option<Ticket>, StoreError>;
        async fn fetch_tickets_for_order(&self, order_id: i64) -> Result<Vec<Ticket>, StoreError>;
        async fn check_in_ticket(&self, ticket_id: i64, at: DateTime<Utc>) -> Result<Option<Ticket>, StoreError>;
    }
    impl SettlementDatabase for CheckoutStore {
        async fn fetch_order_by_payment_reference(&self, reference: &str) -> Result<Option<Order>, StoreError>;
        async fn insert_order(&self, order: NewOrder) -> Result<InsertOrderResult, StoreError>;
        async fn decrement_ticket_type_inventory(&self, ticket_type_id: i64, quantity: i64) -> Result<i64, StoreError>;
        async fn decrement_event_inventory(&self, event_id: i64, quantity: i64) -> Result<i64, StoreError>;
        async fn insert_tickets(&self, tickets: Vec<NewTicket>) -> Result<Vec<Ticket>, StoreError>;
        async fn increment_promo_usage(&self, promo_code_id: i64) -> Result<(), StoreError>;
    }
}

mock! {
    pub RefundStore {}
    impl RefundManagement for RefundStore {
        async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, StoreError>;
        async fn fetch_succeeded_refunds(&self, order_id: i64) -> Result<Vec<Refund>, StoreError>;
        async fn insert_refund(&self, refund: NewRefund) -> Result<Refund, StoreError>;
        async fn update_order_status(&self, order_id: i64, status: OrderStatusType) -> Result<Order, StoreError>;
        async fn invalidate_tickets_for_order(&self, order_id: i64) -> Result<u64, StoreError>;
    }
}

mock! {
    pub TicketStore {}
    impl TicketManagement for TicketStore {
        async fn fetch_ticket_by_number(&self, ticket_number: &str) -> Result<Option<Ticket>, StoreError>;
        async fn fetch_tickets_for_order(&self, order_id: i64) -> Result<Vec<Ticket>, StoreError>;
        async fn check_in_ticket(&self, ticket_id: i64, at: DateTime<Utc>) -> Result<Option<Ticket>, StoreError>;
    }
}

mock! {
    pub Gateway {}
    impl PaymentGateway for Gateway {
        async fn create_charge(&self, request: ChargeRequest) -> Result<ChargeCreated, GatewayError>;
        async fn retrieve_charge(&self, reference: &str) -> Result<ChargeRecord, GatewayError>;
        async fn create_refund(&self, request: GatewayRefundRequest) -> Result<GatewayRefund, GatewayError>;
        async fn recent_charges(&self, limit: usize) -> Result<Vec<ChargeRecord>, GatewayError>;
    }
}
