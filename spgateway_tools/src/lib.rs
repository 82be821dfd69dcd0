//! # Spgateway tools
//!
//! A small client library for the Spgateway (NewebPay) payment gateway. It covers the pieces the payment server
//! needs:
//!
//! * the MPG trade-info codec: AES-256-CBC encryption of the URL-encoded trade info, and the `TradeSha` check value
//!   ([`encrypt_info`], [`decrypt_info`], [`generate_sha`], [`validate_info`]),
//! * the MPG trade-info payload sent with the payer's redirect ([`TradeInfo`]),
//! * the data objects the gateway posts back on the return and notify callbacks ([`EncryptedResponse`],
//!   [`MpgTradeInfo`]),
//! * the CreditClose API, used to capture (and refund) credit card authorisations ([`CreditCloseClient`]).
pub mod consts;

mod config;
mod credit_close;
mod crypto;
mod error;
mod helpers;
mod mpg;

pub use config::SpgatewayConfig;
pub use credit_close::{CloseType, CreditCloseClient, CreditCloseRequest, CreditCloseResponse, IndexType};
pub use crypto::{decrypt_info, encrypt_info, generate_sha, validate_info};
pub use error::SpgatewayError;
pub use helpers::{generate_string, timestamp};
pub use mpg::{EncryptedResponse, MpgResult, MpgTradeInfo, TradeInfo};
