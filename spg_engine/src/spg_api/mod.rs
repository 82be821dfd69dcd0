//! # Spgateway payment API
//!
//! * [`spgateway_processor`] builds the transaction parameters for a checkout, handles verified payment notifications
//!   (amount check, credit card capture, card masking) and issues refunds.
//! * [`callback_api`] verifies and decrypts the callback payloads, and drives the return and notify flows on top of
//!   the processor.
//!
//! Both are generic over the storage backend ([`crate::traits::PaymentGatewayDatabase`]) and the CreditClose client
//! ([`crate::traits::CreditCloser`]), so that either can be swapped out in tests.
pub mod callback_api;
pub mod errors;
pub mod processor_objects;
pub mod spgateway_processor;
