use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use chrono::Utc;
use log::debug;
use tix_common::{Cents, Percent};
use tix_engine::db_types::{Business, Event, Order, OrderStatusType, Ticket, TicketStatus};

pub async fn get_request(path: &str, configure: fn(&mut ServiceConfig)) -> Result<(StatusCode, String), String> {
    send(TestRequest::get().uri(path), configure).await
}

pub async fn post_request(
    path: &str,
    body: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let req = TestRequest::post()
        .uri(path)
        .insert_header(("Content-Type", "application/json"))
        .set_payload(body.to_string());
    send(req, configure).await
}

async fn send(req: TestRequest, configure: fn(&mut ServiceConfig)) -> Result<(StatusCode, String), String> {
    let req = req.to_request();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = res.into_body().try_into_bytes().map_err(|_| "Could not read response body".to_string())?;
    Ok((status, String::from_utf8_lossy(&body).into_owned()))
}

pub fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).expect("Response was not JSON")
}

pub fn business(stripe_account: Option<&str>) -> Business {
    Business {
        id: 1,
        name: "Lakeside Promotions".into(),
        email: "box-office@lakeside.example".into(),
        stripe_account_id: stripe_account.map(String::from),
        use_custom_fees: false,
        platform_fee_type: None,
        flat_fee_amount: None,
        percentage_fee: None,
        stripe_fee_payer: None,
        platform_fee_payer: None,
        tax_percentage: Percent::ZERO,
        created_at: Utc::now(),
    }
}

pub fn event(price: i64, available: i64) -> Event {
    Event {
        id: 1,
        business_id: 1,
        title: "Summer Jazz Night".into(),
        ticket_price: Cents::from(price),
        total_tickets: 100,
        available_tickets: available,
        is_active: true,
        starts_at: None,
        created_at: Utc::now(),
    }
}

/// A paid single-ticket order for a $100 ticket, with default platform fees.
pub fn order(status: OrderStatusType) -> Order {
    Order {
        id: 42,
        order_number: "ORD-7K2M9QX4TB".into(),
        event_id: 1,
        customer_name: "Jo Rivera".into(),
        customer_email: "jo@example.com".into(),
        customer_phone: None,
        quantity: 1,
        subtotal: Cents::from(10_000),
        discount_amount: Cents::ZERO,
        promo_code: None,
        promo_code_id: None,
        tax_amount: Cents::ZERO,
        tax_percentage: Percent::ZERO,
        platform_fee: Cents::from(300),
        stripe_fee: Cents::from(329),
        application_fee: Cents::from(629),
        total: Cents::from(10_629),
        payment_reference: Some("pi_test_1".into()),
        status,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn ticket(status: TicketStatus) -> Ticket {
    let checked_in_at = (status == TicketStatus::Used).then(Utc::now);
    Ticket {
        id: 7,
        order_id: 42,
        event_id: 1,
        ticket_type_id: None,
        ticket_number: "TKT-A1B2C3D4E5F6".into(),
        price: Cents::from(10_000),
        qr_code_data: "TKT-A1B2C3D4E5F6|1|42|0123456789abcdef".into(),
        status,
        checked_in_at,
        created_at: Utc::now(),
    }
}
