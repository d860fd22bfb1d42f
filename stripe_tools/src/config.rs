use log::*;
use tix_common::Secret;

pub const DEFAULT_STRIPE_API_URL: &str = "https://api.stripe.com/v1";

#[derive(Debug, Clone, Default)]
pub struct StripeConfig {
    /// Base URL of the API, without a trailing slash
    pub api_url: String,
    pub secret_key: Secret<String>,
}

impl StripeConfig {
    pub fn new<S: Into<String>>(api_url: S, secret_key: S) -> Self {
        Self { api_url: api_url.into(), secret_key: Secret::new(secret_key.into()) }
    }

    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("TIX_STRIPE_API_URL").unwrap_or_else(|_| {
            debug!("TIX_STRIPE_API_URL not set, using {DEFAULT_STRIPE_API_URL}");
            DEFAULT_STRIPE_API_URL.to_string()
        });
        let secret_key = Secret::new(std::env::var("TIX_STRIPE_SECRET_KEY").unwrap_or_else(|_| {
            warn!("TIX_STRIPE_SECRET_KEY not set, using (probably useless) default");
            "sk_test_00000000000000".to_string()
        }));
        Self { api_url: api_url.trim_end_matches('/').to_string(), secret_key }
    }
}
