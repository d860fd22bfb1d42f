//! A minimal REST client for the parts of the Stripe API that the ticketing server uses: destination-charge payment
//! intents and refunds.
mod api;
mod config;
mod data_objects;
mod error;
pub mod helpers;

pub use api::StripeApi;
pub use config::StripeConfig;
pub use data_objects::{
    NewPaymentIntent,
    NewRefund,
    PaymentIntent,
    PaymentIntentStatus,
    RefundStatus,
    StripeList,
    StripeRefund,
};
pub use error::StripeApiError;
