use std::time::Duration;

use actix_web::{
    dev::Server,
    error::JsonPayloadError,
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    Error,
    HttpRequest,
    HttpServer,
};
use log::*;
use tix_engine::{events::EventProducers, CheckoutApi, RefundApi, SqliteDatabase, TicketApi};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::{notifications::create_notification_event_handlers, stripe::StripeGateway},
    routes::{
        health,
        CheckInRoute,
        CheckoutEstimateRoute,
        CheckoutFreeRoute,
        CheckoutPaymentIntentRoute,
        CheckoutVerifyRoute,
        OrderTicketsRoute,
        RefundOrderRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    if config.database_url.is_empty() {
        return Err(ServerError::ConfigurationError("TIX_DATABASE_URL is not set".into()));
    }
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.run_migrations {
        db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    }
    let gateway = StripeGateway::new(config.stripe_config.clone())
        .map_err(|e| ServerError::InitializeError(format!("Could not create the Stripe client. {e}")))?;
    let handlers = create_notification_event_handlers();
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, gateway, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: StripeGateway,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let currency = config.currency.clone();
    let srv = HttpServer::new(move || {
        let checkout_api =
            CheckoutApi::new(db.clone(), gateway.clone(), producers.clone()).with_currency(currency.as_str());
        let refund_api = RefundApi::new(db.clone(), gateway.clone(), producers.clone());
        let ticket_api = TicketApi::new(db.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("tix::access_log"))
            .app_data(json_config())
            .app_data(web::Data::new(checkout_api))
            .app_data(web::Data::new(refund_api))
            .app_data(web::Data::new(ticket_api))
            .service(health)
            .service(CheckoutEstimateRoute::<SqliteDatabase, StripeGateway>::new())
            .service(CheckoutPaymentIntentRoute::<SqliteDatabase, StripeGateway>::new())
            .service(CheckoutVerifyRoute::<SqliteDatabase, StripeGateway>::new())
            .service(CheckoutFreeRoute::<SqliteDatabase, StripeGateway>::new())
            .service(RefundOrderRoute::<SqliteDatabase, StripeGateway>::new())
            .service(OrderTicketsRoute::<SqliteDatabase>::new())
            .service(CheckInRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    info!("💻️ Listening on {}:{}", config.host, config.port);
    Ok(srv)
}

/// Malformed JSON bodies are reported in the same shape as every other error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> Error {
    debug!("💻️ Could not deserialize the body of {} {}. {err}", req.method(), req.path());
    ServerError::InvalidRequestBody(err.to_string()).into()
}
