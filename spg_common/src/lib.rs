mod amount;
mod helpers;
mod secret;

pub use amount::{gateway_amount, AmountConversionError, DEFAULT_CURRENCY};
pub use helpers::{env_flag, parse_boolean_flag};
pub use secret::Secret;
