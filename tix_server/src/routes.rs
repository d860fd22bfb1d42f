//! Request handler definitions
//!
//! Define each route and its handler here. Handlers are thin: they unpack the request, call one engine API method,
//! and serialize the result. Anything more involved belongs in the engine.
//!
//! Handlers must not block the worker thread. All I/O goes through the engine's async APIs.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use tix_engine::{
    checkout_objects::CheckoutRequest,
    traits::{CheckoutDatabase, PaymentGateway, RefundManagement, TicketManagement},
    CheckoutApi,
    RefundApi,
    TicketApi,
};

use crate::{
    data_objects::{FreeOrderResponse, RefundRequest, VerifyPaymentRequest},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

// ----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout_estimate => Post "/checkout/estimate" impl CheckoutDatabase, PaymentGateway);
/// Prices a cart without creating anything. The browser shows these totals before the customer pays.
pub async fn checkout_estimate<B, G>(
    body: web::Json<CheckoutRequest>,
    api: web::Data<CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase,
    G: PaymentGateway,
{
    trace!("💻️ Received checkout estimate request for event #{}", body.event_id);
    let estimate = api.estimate(&body).await?;
    Ok(HttpResponse::Ok().json(estimate))
}

route!(checkout_payment_intent => Post "/checkout/payment_intent" impl CheckoutDatabase, PaymentGateway);
/// Creates the charge for a paid checkout. The response carries the client secret that the browser uses to collect
/// payment, and the payment reference it must send back to `/checkout/verify`.
pub async fn checkout_payment_intent<B, G>(
    body: web::Json<CheckoutRequest>,
    api: web::Data<CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase,
    G: PaymentGateway,
{
    debug!("💻️ Received payment intent request for event #{}", body.event_id);
    let created = api.create_payment(&body).await?;
    Ok(HttpResponse::Ok().json(created))
}

route!(checkout_verify => Post "/checkout/verify" impl CheckoutDatabase, PaymentGateway);
/// Settles a completed payment. Safe to call any number of times for the same payment.
pub async fn checkout_verify<B, G>(
    body: web::Json<VerifyPaymentRequest>,
    api: web::Data<CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase,
    G: PaymentGateway,
{
    let reference = body.payment_reference.trim();
    if reference.is_empty() {
        return Err(ServerError::InvalidRequestBody("payment_reference is required".into()));
    }
    debug!("💻️ Received payment verification for {reference}");
    let result = api.verify_payment(reference).await?;
    Ok(HttpResponse::Ok().json(result.summary()))
}

route!(checkout_free => Post "/checkout/free" impl CheckoutDatabase, PaymentGateway);
pub async fn checkout_free<B, G>(
    body: web::Json<CheckoutRequest>,
    api: web::Data<CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase,
    G: PaymentGateway,
{
    debug!("💻️ Received free order request for event #{}", body.event_id);
    let result = api.create_free_order(&body).await?;
    Ok(HttpResponse::Ok().json(FreeOrderResponse::from(&result)))
}

// ----------------------------------------------   Refunds  ----------------------------------------------------
route!(refund_order => Post "/orders/{order_id}/refund" impl RefundManagement, PaymentGateway);
pub async fn refund_order<B, G>(
    path: web::Path<i64>,
    body: web::Json<RefundRequest>,
    api: web::Data<RefundApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: RefundManagement,
    G: PaymentGateway,
{
    let order_id = path.into_inner();
    let RefundRequest { amount, reason } = body.into_inner();
    info!("💻️ Received refund request of {amount} for order #{order_id}");
    let outcome = api.refund_order(order_id, amount, reason).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

// ----------------------------------------------   Tickets  ----------------------------------------------------
route!(order_tickets => Get "/orders/{order_id}/tickets" impl TicketManagement);
pub async fn order_tickets<B: TicketManagement>(
    path: web::Path<i64>,
    api: web::Data<TicketApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    trace!("💻️ Fetching tickets for order #{order_id}");
    let tickets = api.tickets_for_order(order_id).await?;
    Ok(HttpResponse::Ok().json(tickets))
}

route!(check_in => Post "/tickets/{ticket_number}/check_in" impl TicketManagement);
pub async fn check_in<B: TicketManagement>(
    path: web::Path<String>,
    api: web::Data<TicketApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let ticket_number = path.into_inner();
    debug!("💻️ Checking in ticket {ticket_number}");
    let ticket = api.check_in(&ticket_number).await?;
    Ok(HttpResponse::Ok().json(ticket))
}
