mod cents;
pub mod helpers;
pub mod op;
mod percent;
mod secret;

pub use cents::{Cents, CentsConversionError, DEFAULT_CURRENCY_CODE};
pub use percent::{Percent, PercentConversionError};
pub use secret::Secret;
