use std::env;

use log::*;
use stripe_tools::StripeConfig;
use tix_common::{helpers::parse_boolean_flag, DEFAULT_CURRENCY_CODE};

const DEFAULT_TIX_HOST: &str = "127.0.0.1";
const DEFAULT_TIX_PORT: u16 = 8360;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// If true, pending database migrations are applied when the server starts.
    pub run_migrations: bool,
    /// The currency all charges are made in, as a lowercase ISO code.
    pub currency: String,
    pub stripe_config: StripeConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_TIX_HOST.to_string(),
            port: DEFAULT_TIX_PORT,
            database_url: String::default(),
            run_migrations: true,
            currency: DEFAULT_CURRENCY_CODE.to_string(),
            stripe_config: StripeConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("TIX_HOST").ok().unwrap_or_else(|| DEFAULT_TIX_HOST.into());
        let port = env::var("TIX_PORT").ok().map(|s| parse_port(&s)).unwrap_or(DEFAULT_TIX_PORT);
        let database_url = env::var("TIX_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ TIX_DATABASE_URL is not set. Please set it to the URL for the ticketing database.");
            String::default()
        });
        let run_migrations = parse_boolean_flag(env::var("TIX_RUN_MIGRATIONS").ok(), true);
        let currency = env::var("TIX_CURRENCY").ok().map(|s| parse_currency(&s)).unwrap_or_else(|| {
            info!("🪛️ TIX_CURRENCY is not set. Using {DEFAULT_CURRENCY_CODE}.");
            DEFAULT_CURRENCY_CODE.to_string()
        });
        let stripe_config = StripeConfig::new_from_env_or_default();
        if !stripe_config.secret_key.is_set() {
            warn!("🪛️ TIX_STRIPE_SECRET_KEY is empty. Payments will fail.");
        }
        Self { host, port, database_url, run_migrations, currency, stripe_config }
    }
}

fn parse_port(s: &str) -> u16 {
    s.trim().parse::<u16>().unwrap_or_else(|e| {
        error!("🪛️ {s} is not a valid port for TIX_PORT. {e} Using the default, {DEFAULT_TIX_PORT}, instead.");
        DEFAULT_TIX_PORT
    })
}

fn parse_currency(s: &str) -> String {
    let code = s.trim().to_lowercase();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        code
    } else {
        error!("🪛️ {s} is not a valid currency code for TIX_CURRENCY. Using {DEFAULT_CURRENCY_CODE} instead.");
        DEFAULT_CURRENCY_CODE.to_string()
    }
}
