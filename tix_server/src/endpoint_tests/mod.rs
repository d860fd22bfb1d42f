mod checkout;
pub mod helpers;
mod mocks;
mod refunds;
mod tickets;
