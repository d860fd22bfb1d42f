use cucumber::{given, then, when};
use tix_common::{Cents, Percent};
use tix_engine::{
    checkout_objects::{CheckoutRequest, CustomerDetails},
    db_types::{Discount, FeePayer, NewBusiness, NewEvent, NewPromoCode, OrderStatusType, PlatformFeeType},
    pricing::CartSelection,
    CatalogManagement,
    RefundManagement,
};

use crate::cucumber::{TicketingSystem, TicketingWorld};

#[given("a ticketing platform")]
async fn ticketing_platform(world: &mut TicketingWorld) {
    world.system = Some(TicketingSystem::new().await);
}

#[given(expr = "the platform fee is {word} with a flat fee of {int} cents and {int}%")]
async fn platform_fee(world: &mut TicketingWorld, fee_type: String, flat: i64, pct: i64) {
    let db = &world.system().db;
    let mut settings = db.fetch_platform_settings().await.unwrap();
    settings.platform_fee_type = fee_type.parse::<PlatformFeeType>().expect("Unknown platform fee type");
    settings.flat_fee_amount = Cents::from(flat);
    settings.percentage_fee = Percent::from_whole(pct);
    db.update_platform_settings(&settings).await.unwrap();
}

#[given(expr = "the {word} pays the {word} fee")]
async fn fee_payer(world: &mut TicketingWorld, payer: String, fee: String) {
    let db = &world.system().db;
    let payer = payer.parse::<FeePayer>().expect("Payer must be customer or business");
    let mut settings = db.fetch_platform_settings().await.unwrap();
    match fee.as_str() {
        "platform" => settings.platform_fee_payer = payer,
        "processor" => settings.stripe_fee_payer = payer,
        _ => panic!("Unknown fee: {fee}"),
    }
    db.update_platform_settings(&settings).await.unwrap();
}

#[given(expr = "a business that charges {int}% tax")]
async fn business(world: &mut TicketingWorld, tax: i64) {
    let business = NewBusiness::new("Riverside Theatre", "box-office@riverside.example")
        .with_stripe_account("acct_riverside")
        .with_tax(Percent::from_whole(tax));
    let business = world.system().db.insert_business(business).await.unwrap();
    world.business = Some(business);
}

#[given(expr = "an event with {int} tickets priced at {int} cents")]
async fn event(world: &mut TicketingWorld, tickets: i64, price: i64) {
    let business_id = world.business.as_ref().expect("No business has been created").id;
    let event = NewEvent::new(business_id, "Opening Night", Cents::from(price), tickets);
    let event = world.system().db.insert_event(event).await.unwrap();
    world.event = Some(event);
}

#[given(expr = "a {word} promo code {string} worth {int}")]
async fn promo_code(world: &mut TicketingWorld, kind: String, code: String, value: i64) {
    let discount = match kind.as_str() {
        "fixed" => Discount::Fixed(Cents::from(value)),
        "percentage" => Discount::Percentage(Percent::from_whole(value)),
        _ => panic!("Unknown promo code type: {kind}"),
    };
    let promo = NewPromoCode::new(world.event().id, code, discount);
    world.system().db.insert_promo_code(promo).await.unwrap();
}

fn request(world: &TicketingWorld, quantity: i64, promo_code: Option<String>) -> CheckoutRequest {
    CheckoutRequest {
        event_id: world.event().id,
        selection: CartSelection::legacy(quantity),
        promo_code,
        customer: CustomerDetails::new("Sam Okafor", "sam@example.com"),
    }
}

#[when(expr = "the customer asks for an estimate for {int} ticket(s)")]
async fn estimate(world: &mut TicketingWorld, quantity: i64) {
    let request = request(world, quantity, None);
    let estimate = world.system().checkout.estimate(&request).await.expect("Error estimating cart");
    world.breakdown = Some(estimate.breakdown);
}

#[when(expr = "the customer buys {int} ticket(s)")]
async fn buy(world: &mut TicketingWorld, quantity: i64) {
    purchase(world, quantity, None).await;
}

#[when(expr = "the customer buys {int} ticket(s) with promo code {string}")]
async fn buy_with_promo(world: &mut TicketingWorld, quantity: i64, code: String) {
    purchase(world, quantity, Some(code)).await;
}

async fn purchase(world: &mut TicketingWorld, quantity: i64, promo_code: Option<String>) {
    let request = request(world, quantity, promo_code);
    let sys = world.system();
    let quote = sys.checkout.estimate(&request).await.expect("Error pricing cart");
    let result = if quote.breakdown.is_free() {
        sys.checkout.create_free_order(&request).await.expect("Error creating free order")
    } else {
        let intent = sys.checkout.create_payment(&request).await.expect("Error creating payment");
        sys.gateway.complete_charge(&intent.payment_reference);
        world.payment_reference = Some(intent.payment_reference.clone());
        world.system().checkout.verify_payment(&intent.payment_reference).await.expect("Error verifying payment")
    };
    world.breakdown = Some(quote.breakdown);
    world.order = Some(result.into_settled_order().order);
}

#[when("the payment is verified again")]
async fn verify_again(world: &mut TicketingWorld) {
    let reference = world.payment_reference.clone().expect("No payment has been made");
    let result = world.system().checkout.verify_payment(&reference).await.expect("Error verifying payment");
    assert!(!result.is_new(), "The payment was settled twice");
    assert_eq!(result.order().id, world.order().id);
}

#[when(expr = "the business refunds {int} cents")]
async fn refund(world: &mut TicketingWorld, amount: i64) {
    let order_id = world.order().id;
    match world.system().refunds.refund_order(order_id, Cents::from(amount), None).await {
        Ok(_) => world.last_error = None,
        Err(e) => world.last_error = Some(e.to_string()),
    }
}

#[then(expr = "the customer is charged {int} cents")]
async fn customer_charged(world: &mut TicketingWorld, amount: i64) {
    let breakdown = world.breakdown.as_ref().expect("No price has been calculated");
    assert_eq!(breakdown.total, Cents::from(amount));
    assert!(breakdown.reconciles());
}

#[then(expr = "the platform keeps {int} cents")]
async fn platform_keeps(world: &mut TicketingWorld, amount: i64) {
    let breakdown = world.breakdown.as_ref().expect("No price has been calculated");
    assert_eq!(breakdown.application_fee, Cents::from(amount));
}

#[then(expr = "the business nets {int} cents")]
async fn business_nets(world: &mut TicketingWorld, amount: i64) {
    let breakdown = world.breakdown.as_ref().expect("No price has been calculated");
    assert_eq!(breakdown.business_net, Cents::from(amount));
}

#[then(expr = "the order total is {int} cents")]
async fn order_total(world: &mut TicketingWorld, amount: i64) {
    assert_eq!(world.order().total, Cents::from(amount));
}

#[then(expr = "the order status is {word}")]
async fn order_status(world: &mut TicketingWorld, status: String) {
    let expected = status.parse::<OrderStatusType>().expect("Unknown order status");
    let order_id = world.order().id;
    let order = world.system().db.fetch_order(order_id).await.unwrap().unwrap();
    assert_eq!(order.status, expected);
}

#[then(expr = "the refund is rejected with {int} cents remaining")]
async fn refund_rejected(world: &mut TicketingWorld, remaining: i64) {
    let err = world.last_error.as_ref().expect("The refund was not rejected");
    let remaining = Cents::from(remaining);
    assert!(err.contains(&remaining.to_string()), "Unexpected error: {err}");
    let order_id = world.order().id;
    assert_eq!(world.system().refunds.remaining_refundable(order_id).await.unwrap(), remaining);
}

#[then("the refund succeeds")]
async fn refund_succeeded(world: &mut TicketingWorld) {
    assert!(world.last_error.is_none(), "Refund failed: {:?}", world.last_error);
}

#[then(expr = "the event has {int} tickets left")]
async fn tickets_left(world: &mut TicketingWorld, count: i64) {
    let event = world.system().db.fetch_event(world.event().id).await.unwrap().unwrap();
    assert_eq!(event.available_tickets, count);
}

#[then(expr = "there is {int} order(s) for the event")]
async fn order_count(world: &mut TicketingWorld, count: usize) {
    let orders = world.system().db.fetch_orders_for_event(world.event().id).await.unwrap();
    assert_eq!(orders.len(), count);
}
