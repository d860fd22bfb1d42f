use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{DateTime, Utc};
use tix_engine::{db_types::TicketStatus, TicketApi};

use super::{
    helpers::{get_request, json, post_request, ticket},
    mocks::MockTicketStore,
};
use crate::routes::{CheckInRoute, OrderTicketsRoute};

#[actix_web::test]
async fn check_in_valid_ticket() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/tickets/TKT-VALID0000001/check_in", "", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let checked_in = json(&body);
    assert_eq!(checked_in["status"], "used");
    assert!(checked_in["checked_in_at"].is_string());
}

#[actix_web::test]
async fn check_in_twice() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/tickets/TKT-USED00000001/check_in", "", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::CONFLICT);
    let err = json(&body);
    assert_eq!(err["code"], "ALREADY_CHECKED_IN");
    assert!(err["error"].as_str().unwrap().starts_with("Ticket was already checked in at "));
}

#[actix_web::test]
async fn check_in_refunded_ticket() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/tickets/TKT-VOID00000001/check_in", "", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json(&body)["code"], "TICKET_INVALID");
}

#[actix_web::test]
async fn check_in_unknown_ticket() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/tickets/TKT-NOPE/check_in", "", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body)["code"], "TICKET_NOT_FOUND");
}

#[actix_web::test]
async fn tickets_for_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/orders/42/tickets", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let tickets = json(&body);
    assert_eq!(tickets.as_array().map(Vec::len), Some(2));
    assert_eq!(tickets[0]["order_id"], 42);
    assert_eq!(tickets[0]["price"], 10_000);

    let (status, body) = get_request("/orders/99/tickets", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

fn configure(cfg: &mut ServiceConfig) {
    let mut store = MockTicketStore::new();
    store.expect_fetch_ticket_by_number().returning(|number: &str| {
        let status = match number {
            "TKT-VALID0000001" => TicketStatus::Valid,
            "TKT-USED00000001" => TicketStatus::Used,
            "TKT-VOID00000001" => TicketStatus::Invalid,
            _ => return Ok(None),
        };
        Ok(Some(ticket(status)))
    });
    store.expect_check_in_ticket().returning(|_, at: DateTime<Utc>| {
        let mut t = ticket(TicketStatus::Used);
        t.checked_in_at = Some(at);
        Ok(Some(t))
    });
    store.expect_fetch_tickets_for_order().returning(|order_id| match order_id {
        42 => Ok(vec![ticket(TicketStatus::Valid), ticket(TicketStatus::Valid)]),
        _ => Ok(vec![]),
    });

    let api = TicketApi::new(store);
    cfg.app_data(web::Data::new(api))
        .service(OrderTicketsRoute::<MockTicketStore>::new())
        .service(CheckInRoute::<MockTicketStore>::new());
}
