use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::Utc;
use tix_common::Cents;
use tix_engine::{
    db_types::{OrderStatusType, Refund},
    events::EventProducers,
    traits::{ChargeRecord, ChargeStatus, GatewayError, GatewayRefund, GatewayRefundStatus},
    RefundApi,
};

use super::{
    helpers::{json, order, post_request},
    mocks::{MockGateway, MockRefundStore},
};
use crate::{routes::RefundOrderRoute, server::json_config};

const PENDING_ORDER: i64 = 43;
/// Refunds of this amount fail at the processor
const DECLINED_AMOUNT: i64 = 1234;

#[actix_web::test]
async fn partial_refund() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/orders/42/refund", r#"{"amount":2500,"reason":"Requested by customer"}"#, configure)
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let outcome = json(&body);
    assert_eq!(outcome["new_order_status"], "partially_refunded");
    assert_eq!(outcome["remaining_refundable"], 7_500);
    assert_eq!(outcome["refund_reference"], "re_test_1");
    assert_eq!(outcome["refund"]["amount"], 2_500);
    assert_eq!(outcome["refund"]["status"], "succeeded");
}

#[actix_web::test]
async fn full_refund() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/orders/42/refund", r#"{"amount":10000}"#, configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let outcome = json(&body);
    assert_eq!(outcome["new_order_status"], "refunded");
    assert_eq!(outcome["remaining_refundable"], 0);
}

#[actix_web::test]
async fn refund_more_than_the_business_received() {
    let _ = env_logger::try_init().ok();
    // The customer paid $106.29, but only $100 reached the business
    let (status, body) =
        post_request("/orders/42/refund", r#"{"amount":10629}"#, configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let err = json(&body);
    assert_eq!(err["code"], "REFUND_EXCEEDS_REMAINING");
    assert_eq!(err["remaining_refundable"], 10_000);
}

#[actix_web::test]
async fn zero_refund() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/orders/42/refund", r#"{"amount":0}"#, configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err = json(&body);
    assert_eq!(err["code"], "INVALID_REFUND_AMOUNT");
    assert_eq!(err["remaining_refundable"], 10_000);
}

#[actix_web::test]
async fn refund_of_unpaid_order() {
    let _ = env_logger::try_init().ok();
    let path = format!("/orders/{PENDING_ORDER}/refund");
    let (status, body) = post_request(&path, r#"{"amount":500}"#, configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json(&body)["code"], "REFUND_NOT_ALLOWED");
}

#[actix_web::test]
async fn refund_of_unknown_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/orders/99/refund", r#"{"amount":500}"#, configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body)["code"], "ORDER_NOT_FOUND");
}

#[actix_web::test]
async fn declined_refund() {
    let _ = env_logger::try_init().ok();
    let body = format!(r#"{{"amount":{DECLINED_AMOUNT}}}"#);
    let (status, body) = post_request("/orders/42/refund", &body, configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json(&body)["code"], "REFUND_FAILED");
}

fn configure(cfg: &mut ServiceConfig) {
    let mut store = MockRefundStore::new();
    store.expect_fetch_order().returning(|id| match id {
        42 => Ok(Some(order(OrderStatusType::Completed))),
        PENDING_ORDER => Ok(Some(order(OrderStatusType::Pending))),
        _ => Ok(None),
    });
    store.expect_fetch_succeeded_refunds().returning(|_| Ok(vec![]));
    store.expect_insert_refund().returning(|refund| {
        Ok(Refund {
            id: 1,
            order_id: refund.order_id,
            amount: refund.amount,
            reason: refund.reason,
            refund_reference: refund.refund_reference,
            status: refund.status,
            created_at: Utc::now(),
        })
    });
    store.expect_update_order_status().returning(|_, status| Ok(order(status)));
    store.expect_invalidate_tickets_for_order().returning(|_| Ok(1));

    let mut gateway = MockGateway::new();
    gateway.expect_retrieve_charge().returning(|reference: &str| {
        Ok(ChargeRecord {
            reference: reference.to_string(),
            status: ChargeStatus::Succeeded,
            amount: Cents::from(10_629),
            transaction_id: Some("ch_test_1".into()),
            metadata: Default::default(),
            created: Utc::now(),
        })
    });
    gateway
        .expect_create_refund()
        .withf(|req| req.transaction_id == "ch_test_1" && req.reverse_transfer)
        .returning(|req| {
            if req.amount == Cents::from(DECLINED_AMOUNT) {
                Err(GatewayError::Rejected { status: 402, message: "Insufficient balance".into() })
            } else {
                Ok(GatewayRefund { reference: "re_test_1".into(), status: GatewayRefundStatus::Succeeded })
            }
        });

    let api = RefundApi::new(store, gateway, EventProducers::default());
    cfg.app_data(json_config())
        .app_data(web::Data::new(api))
        .service(RefundOrderRoute::<MockRefundStore, MockGateway>::new());
}
