//! Spgateway payment engine
//!
//! This library holds the core logic of the payment gateway integration. It knows nothing about HTTP.
//!
//! The library is divided into these sections:
//! 1. Storage ([`mod@traits`], [`mod@db_types`]). The engine only ever talks to its backend through the traits in
//!    [`mod@traits`]. [`SqliteDatabase`] is the bundled implementation; its migrations create the basket, audit trail
//!    and order tables.
//! 2. The Spgateway payment API ([`mod@spg_api`]). [`SpgatewayProcessor`] builds the redirect parameters for a checkout
//!    and handles verified notifications. [`SpgatewayCallbackApi`] validates the callback payloads and drives the
//!    return and notify flows, placing orders for paid baskets.
//! 3. Journal bundle offers ([`mod@offers`]). Evaluates whether a basket holds every product in a journal bundle, and
//!    selects the lines a bundle discount applies to.
//!
//! The engine also publishes events when orders are placed or refunded. See [`mod@events`] for hooking into them.
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod offers;
pub mod spg_api;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::{db as sqlite_db, SqliteDatabase};
pub use spg_api::{
    callback_api::{NotifyOutcome, ReturnOutcome, SpgatewayCallbackApi},
    errors::CallbackError,
    processor_objects::{
        mask_card_number,
        CaptureOutcome,
        HandledProcessorResponse,
        ProcessorConfig,
        SpgatewayResponse,
        TransactionParameters,
    },
    spgateway_processor::{SpgatewayProcessor, PROCESSOR_NAME},
};
pub use traits::{
    BasketManagement,
    BundleCatalog,
    CreditCloser,
    OrderPlacement,
    PaymentGatewayDatabase,
    PaymentGatewayError,
    ProcessorResponseManagement,
};
