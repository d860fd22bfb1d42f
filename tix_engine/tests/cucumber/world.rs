use cucumber::World;
use log::*;
use tix_engine::{
    db_types::{Business, Event, Order},
    events::EventProducers,
    fees::FeeBreakdown,
    CheckoutApi,
    RefundApi,
    SqliteDatabase,
};

use crate::support::{
    fake_gateway::FakeGateway,
    prepare_env::{prepare_test_env, random_db_path},
};

#[derive(Default, Debug, World)]
pub struct TicketingWorld {
    pub system: Option<TicketingSystem>,
    pub business: Option<Business>,
    pub event: Option<Event>,
    pub breakdown: Option<FeeBreakdown>,
    pub order: Option<Order>,
    pub payment_reference: Option<String>,
    pub last_error: Option<String>,
}

#[derive(Debug)]
pub struct TicketingSystem {
    pub db: SqliteDatabase,
    pub gateway: FakeGateway,
    pub checkout: CheckoutApi<SqliteDatabase, FakeGateway>,
    pub refunds: RefundApi<SqliteDatabase, FakeGateway>,
}

impl TicketingSystem {
    pub async fn new() -> Self {
        let url = random_db_path();
        let db = prepare_test_env(&url).await;
        debug!("Created database: {url}");
        let gateway = FakeGateway::new();
        let producers = EventProducers::default();
        let checkout = CheckoutApi::new(db.clone(), gateway.clone(), producers.clone());
        let refunds = RefundApi::new(db.clone(), gateway.clone(), producers);
        Self { db, gateway, checkout, refunds }
    }
}

impl TicketingWorld {
    pub fn system(&self) -> &TicketingSystem {
        self.system.as_ref().expect("Ticketing platform not initialised")
    }

    pub fn event(&self) -> &Event {
        self.event.as_ref().expect("No event has been created")
    }

    pub fn order(&self) -> &Order {
        self.order.as_ref().expect("No order has been placed")
    }
}
