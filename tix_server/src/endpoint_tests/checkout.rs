use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::Utc;
use tix_common::Cents;
use tix_engine::{
    db_types::{Business, Event, OrderStatusType, PlatformSettings, Ticket, TicketStatus},
    events::EventProducers,
    traits::{ChargeCreated, ChargeRecord, ChargeStatus, GatewayError, InsertOrderResult},
    CheckoutApi,
};

use super::{
    helpers::{business, event, json, order, post_request, ticket},
    mocks::{MockCheckoutStore, MockGateway},
};
use crate::{
    routes::{CheckoutEstimateRoute, CheckoutFreeRoute, CheckoutPaymentIntentRoute, CheckoutVerifyRoute},
    server::json_config,
};

const SOLD_OUT_EVENT: i64 = 3;
const UNCONNECTED_EVENT: i64 = 4;
const FREE_EVENT: i64 = 5;

fn checkout_body(event_id: i64, quantity: i64) -> String {
    format!(
        r#"{{"event_id":{event_id},"selection":{{"kind":"legacy","quantity":{quantity}}},"customer":{{"name":"Jo Rivera","email":"jo@example.com"}}}}"#
    )
}

#[actix_web::test]
async fn estimate_single_price_event() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/checkout/estimate", &checkout_body(1, 1), configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let estimate = json(&body);
    assert_eq!(estimate["subtotal"], 10_000);
    assert_eq!(estimate["platform_fee"], 300);
    assert_eq!(estimate["processor_fee"], 329);
    assert_eq!(estimate["total"], 10_629);
    assert_eq!(estimate["application_fee"], 629);
    assert_eq!(estimate["line_items"].as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn estimate_for_unknown_event() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/checkout/estimate", &checkout_body(2, 1), configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body)["code"], "EVENT_NOT_FOUND");
}

#[actix_web::test]
async fn estimate_for_sold_out_event() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/checkout/estimate", &checkout_body(SOLD_OUT_EVENT, 3), configure)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json(&body)["code"], "OUT_OF_STOCK");
}

#[actix_web::test]
async fn malformed_body() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/checkout/estimate", "{not json", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["code"], "INVALID_REQUEST_BODY");
}

#[actix_web::test]
async fn create_payment_intent() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/checkout/payment_intent", &checkout_body(1, 2), configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let created = json(&body);
    assert_eq!(created["payment_reference"], "pi_test_1");
    assert_eq!(created["client_secret"], "pi_test_1_secret");
    assert_eq!(created["amount"], 21_227);
    assert_eq!(created["breakdown"]["business_transfer"], 20_000);
}

#[actix_web::test]
async fn payment_intent_needs_customer_email() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"event_id":1,"selection":{"kind":"legacy","quantity":1},"customer":{"name":"Jo Rivera","email":""}}"#;
    let (status, body) = post_request("/checkout/payment_intent", body, configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["code"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn payment_intent_for_unconnected_business() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/checkout/payment_intent", &checkout_body(UNCONNECTED_EVENT, 1), configure)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json(&body)["code"], "BUSINESS_NOT_CONNECTED");
}

#[actix_web::test]
async fn payment_intent_for_free_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/checkout/payment_intent", &checkout_body(FREE_EVENT, 1), configure)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["code"], "USE_FREE_CHECKOUT");
}

#[actix_web::test]
async fn verify_settled_payment() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/checkout/verify", r#"{"payment_reference":"pi_test_1"}"#, configure)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let summary = json(&body);
    assert_eq!(summary["order_number"], "ORD-7K2M9QX4TB");
    assert_eq!(summary["event_title"], "Summer Jazz Night");
    assert_eq!(summary["total_amount"], 10_629);
    assert_eq!(summary["customer_email"], "jo@example.com");
}

#[actix_web::test]
async fn verify_unpaid_payment() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/checkout/verify", r#"{"payment_reference":"pi_unpaid"}"#, configure)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(json(&body)["code"], "PAYMENT_NOT_CONFIRMED");
}

#[actix_web::test]
async fn verify_unknown_payment() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/checkout/verify", r#"{"payment_reference":"pi_nope"}"#, configure)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body)["code"], "PAYMENT_NOT_FOUND");
}

#[actix_web::test]
async fn verify_without_reference() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/checkout/verify", r#"{"payment_reference":"  "}"#, configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["code"], "INVALID_REQUEST_BODY");
}

#[actix_web::test]
async fn free_checkout() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/checkout/free", &checkout_body(FREE_EVENT, 2), configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let created = json(&body);
    assert_eq!(created["order_id"], 43);
    assert_eq!(created["order_number"], "ORD-FREE000001");
}

#[actix_web::test]
async fn free_checkout_for_paid_event() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/checkout/free", &checkout_body(1, 1), configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err = json(&body);
    assert_eq!(err["code"], "ORDER_NOT_FREE");
    assert_eq!(err["error"], "This order is not free. It costs $106.29");
}

fn configure(cfg: &mut ServiceConfig) {
    let mut store = MockCheckoutStore::new();
    store.expect_fetch_event().returning(|id| {
        let e = match id {
            1 => event(10_000, 100),
            SOLD_OUT_EVENT => event(10_000, 1),
            UNCONNECTED_EVENT => event(10_000, 100),
            FREE_EVENT => event(0, 100),
            _ => return Ok(None),
        };
        let business_id = if id == UNCONNECTED_EVENT { 2 } else { 1 };
        Ok(Some(Event { id, business_id, ..e }))
    });
    store.expect_fetch_business().returning(|id| match id {
        1 => Ok(Some(business(Some("acct_lakeside")))),
        _ => Ok(Some(Business { id, ..business(None) })),
    });
    store.expect_fetch_platform_settings().returning(|| Ok(PlatformSettings::default()));
    store.expect_fetch_order_by_payment_reference().returning(|reference: &str| match reference {
        "pi_test_1" => Ok(Some(order(OrderStatusType::Completed))),
        _ => Ok(None),
    });
    store.expect_fetch_tickets_for_order().returning(|_| Ok(vec![ticket(TicketStatus::Valid)]));
    store.expect_insert_order().returning(|new_order| {
        let mut o = order(OrderStatusType::Completed);
        o.id = 43;
        o.order_number = "ORD-FREE000001".into();
        o.quantity = new_order.quantity;
        o.subtotal = Cents::ZERO;
        o.platform_fee = Cents::ZERO;
        o.stripe_fee = Cents::ZERO;
        o.application_fee = Cents::ZERO;
        o.total = Cents::ZERO;
        o.payment_reference = None;
        Ok(InsertOrderResult::Inserted(o))
    });
    store.expect_decrement_event_inventory().returning(|_, _| Ok(0));
    store.expect_insert_tickets().returning(|tickets| {
        Ok(tickets
            .into_iter()
            .enumerate()
            .map(|(i, t)| Ticket {
                id: i as i64 + 1,
                order_id: t.order_id,
                event_id: t.event_id,
                ticket_type_id: t.ticket_type_id,
                ticket_number: t.ticket_number,
                price: t.price,
                qr_code_data: t.qr_code_data,
                status: TicketStatus::Valid,
                checked_in_at: None,
                created_at: Utc::now(),
            })
            .collect())
    });

    let mut gateway = MockGateway::new();
    gateway
        .expect_create_charge()
        .withf(|req| req.destination_account == "acct_lakeside" && req.currency == "usd")
        .returning(|req| {
            Ok(ChargeCreated {
                reference: "pi_test_1".into(),
                client_secret: "pi_test_1_secret".into(),
                amount: req.amount,
            })
        });
    gateway.expect_retrieve_charge().returning(|reference: &str| match reference {
        "pi_unpaid" => Ok(ChargeRecord {
            reference: reference.to_string(),
            status: ChargeStatus::Incomplete,
            amount: Cents::from(10_629),
            transaction_id: None,
            metadata: Default::default(),
            created: Utc::now(),
        }),
        _ => Err(GatewayError::Rejected { status: 404, message: format!("No such payment_intent: '{reference}'") }),
    });

    let api = CheckoutApi::new(store, gateway, EventProducers::default());
    cfg.app_data(json_config())
        .app_data(web::Data::new(api))
        .service(CheckoutEstimateRoute::<MockCheckoutStore, MockGateway>::new())
        .service(CheckoutPaymentIntentRoute::<MockCheckoutStore, MockGateway>::new())
        .service(CheckoutVerifyRoute::<MockCheckoutStore, MockGateway>::new())
        .service(CheckoutFreeRoute::<MockCheckoutStore, MockGateway>::new());
}
