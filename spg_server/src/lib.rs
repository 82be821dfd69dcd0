//! # Spgateway payment server
//! This crate hosts the HTTP front end of the Spgateway integration. It is responsible for:
//! * Handing the payer's browser the encrypted parameters it must post to the Spgateway payment page.
//! * Receiving the gateway's return, notify and customer callbacks, and passing them to the
//!   [`SpgatewayCallbackApi`](spg_engine::SpgatewayCallbackApi) for verification and processing.
//! * Answering journal bundle offer queries for a basket.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `POST /payment/spgateway/checkout/{basket_id}`: Freezes the basket and returns the gateway transaction parameters.
//! * `POST /payment/spgateway/return/`: The payer's browser returns here. Redirects to the receipt (or error) page.
//! * `POST /payment/spgateway/notify/`: The gateway's payment notification. Places the order.
//! * `POST /payment/spgateway/customer/`: Shows the verified payment result.
//! * `GET /api/baskets/{basket_id}/journal_bundles/{uuid}`: Journal bundle eligibility for a basket.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;

pub mod helpers;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
