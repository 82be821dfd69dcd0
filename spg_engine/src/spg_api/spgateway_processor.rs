use std::fmt::Debug;

use log::*;
use rust_decimal::Decimal;
use serde::Serialize;
use spg_common::gateway_amount;
use spgateway_tools::{
    consts::{MAX_ITEM_TITLE_LEN, MPG_VERSION},
    encrypt_info,
    generate_sha,
    CreditCloseRequest,
    TradeInfo,
};

use crate::{
    db_types::{BasketSnapshot, BasketStatus, NewProcessorResponse},
    events::{EventProducers, OrderRefundedEvent},
    helpers::{generate_order_no, middle_truncate, rewrite_local_notify_url},
    spg_api::processor_objects::{
        mask_card_number,
        CaptureOutcome,
        HandledProcessorResponse,
        ProcessorConfig,
        SpgatewayResponse,
        TransactionParameters,
    },
    traits::{CreditCloser, PaymentGatewayDatabase, PaymentGatewayError},
};

pub const PROCESSOR_NAME: &str = "spgateway";

/// `SpgatewayProcessor` builds the redirect parameters for a checkout, and makes sense of what the gateway sends back.
///
/// Every interaction with the gateway (the outbound trade info, each inbound callback and every CreditClose result) is
/// appended to the processor response audit trail. The trail is also how a callback is tied back to its basket: the
/// outbound trade info is recorded under the merchant order number before the payer is sent to the gateway.
pub struct SpgatewayProcessor<B, C> {
    db: B,
    closer: C,
    config: ProcessorConfig,
    producers: EventProducers,
}

impl<B, C> Debug for SpgatewayProcessor<B, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SpgatewayProcessor ({})", self.config.gateway.merchant_id)
    }
}

impl<B, C> SpgatewayProcessor<B, C> {
    pub fn new(db: B, closer: C, config: ProcessorConfig, producers: EventProducers) -> Self {
        Self { db, closer, config, producers }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn producers(&self) -> &EventProducers {
        &self.producers
    }

    /// The payment id of a callback is the merchant order number we generated for the checkout.
    pub fn get_payment_id(response: &SpgatewayResponse) -> &str {
        response.result().merchant_order_no.as_str()
    }
}

impl<B, C> SpgatewayProcessor<B, C>
where
    B: PaymentGatewayDatabase,
    C: CreditCloser,
{
    /// Finds the basket that the payment with the given id was made for.
    ///
    /// More than one audit entry for the payment id means the gateway has told us about this payment before. When
    /// `tolerate_duplicates` is false that is logged and treated as "no basket", which stops a replayed notification
    /// from placing a second order. Otherwise the most recent match wins.
    ///
    /// Backend failures are logged and passed on.
    pub async fn get_basket(
        &self,
        payment_id: &str,
        tolerate_duplicates: bool,
    ) -> Result<Option<BasketSnapshot>, PaymentGatewayError> {
        let basket_ids = self.db.fetch_baskets_for_transaction(PROCESSOR_NAME, payment_id).await.map_err(|e| {
            error!("💳️ Unexpected error during basket retrieval for Spgateway payment [{payment_id}]. {e}");
            e
        })?;
        let basket_id = match basket_ids.as_slice() {
            [] => {
                warn!("💳️ No basket is associated with Spgateway payment [{payment_id}]");
                return Ok(None);
            },
            [id] => *id,
            [latest, ..] if tolerate_duplicates => {
                debug!("💳️ {} records for payment [{payment_id}]. Using the most recent one.", basket_ids.len());
                *latest
            },
            _ => {
                warn!("💳️ Duplicate payment ID [{payment_id}] received from Spgateway.");
                return Ok(None);
            },
        };
        self.db.fetch_basket(basket_id).await.map_err(|e| {
            error!("💳️ Unexpected error while fetching basket #{basket_id} for payment [{payment_id}]. {e}");
            e
        })
    }

    /// Builds the encrypted trade info for a basket, and logs it in the audit trail so that the callbacks can find the
    /// basket again.
    pub async fn get_transaction_parameters(
        &self,
        basket: &BasketSnapshot,
        email: Option<&str>,
    ) -> Result<TransactionParameters, PaymentGatewayError> {
        let gateway = &self.config.gateway;
        let notify_url = rewrite_local_notify_url(&self.config.notify_url());
        let merchant_order_no = generate_order_no(basket.order_number());
        let item_desc = basket
            .lines
            .iter()
            .map(|l| format!("{}x{}", l.quantity, middle_truncate(&l.product_title, MAX_ITEM_TITLE_LEN)))
            .collect::<Vec<String>>()
            .join(", ");
        let amt = gateway_amount(basket.total_incl_tax())?;
        let trade_info = TradeInfo::new(&gateway.merchant_id, &merchant_order_no, amt, &item_desc)
            .with_email(email.map(String::from))
            .with_callback_urls(&self.config.return_url(), &notify_url, &self.config.client_back_url());
        let encrypted = encrypt_info(gateway.hash_key.reveal(), gateway.hash_iv.reveal(), &trade_info.to_query_string())?;
        let trade_sha = generate_sha(gateway.hash_key.reveal(), gateway.hash_iv.reveal(), &encrypted);
        self.record_processor_response(&trade_info, &merchant_order_no, Some(basket.id())).await?;
        debug!("💳️ Transaction parameters for basket #{} created. Payment id: {merchant_order_no}", basket.id());
        Ok(TransactionParameters {
            merchant_id: gateway.merchant_id.clone(),
            trade_info: encrypted,
            trade_sha,
            version: MPG_VERSION.to_string(),
            payment_page_url: gateway.payment_page_url.clone(),
        })
    }

    /// Starts a checkout for the basket with the given id.
    ///
    /// The basket is frozen so that its contents cannot change while the payer is at the gateway. A frozen basket may
    /// be checked out again (the payer may have cancelled and come back); a submitted one may not.
    pub async fn begin_checkout(
        &self,
        basket_id: i64,
        email: Option<&str>,
    ) -> Result<TransactionParameters, PaymentGatewayError> {
        let basket =
            self.db.fetch_basket(basket_id).await?.ok_or(PaymentGatewayError::BasketNotFound(basket_id))?;
        match basket.basket.status {
            BasketStatus::Submitted => return Err(PaymentGatewayError::BasketAlreadySubmitted(basket_id)),
            BasketStatus::Open => {
                self.db.update_basket_status(basket_id, BasketStatus::Frozen).await?;
            },
            BasketStatus::Frozen => {},
        }
        if basket.lines.is_empty() {
            warn!("💳️ Basket #{basket_id} is empty. Sending it to the gateway anyway.");
        }
        self.get_transaction_parameters(&basket, email).await
    }

    /// Handles a verified payment notification for `basket`.
    ///
    /// The response is logged before anything else, and that record stays even if a later step fails. A declared
    /// amount must match the basket total. Credit card authorisations are then captured; a failed capture is not
    /// fatal, since the gateway captures automatically later, and is reported as [`CaptureOutcome::Deferred`].
    pub async fn handle_processor_response(
        &self,
        response: &SpgatewayResponse,
        basket: &BasketSnapshot,
    ) -> Result<HandledProcessorResponse, PaymentGatewayError> {
        let result = response.result();
        let payment_id = result.merchant_order_no.as_str();
        let total = basket.total_incl_tax();
        self.record_processor_response(response, payment_id, Some(basket.id())).await?;

        if let Some(declared) = result.amt {
            if Decimal::from(declared) != total {
                warn!("💳️ Spgateway payment [{payment_id}] declares {declared}, but basket #{} totals {total}", basket.id());
                return Err(PaymentGatewayError::AmountMismatch { declared, total, basket_id: basket.id() });
            }
        }

        let capture = if result.payment_type == "CREDIT" {
            let amt = match result.amt {
                Some(amt) => amt,
                None => gateway_amount(total)?,
            };
            self.capture(payment_id, amt, basket).await
        } else {
            CaptureOutcome::NotRequired
        };

        let card_number = mask_card_number(result)?;
        let transaction_id = result
            .trade_no
            .clone()
            .ok_or_else(|| PaymentGatewayError::MalformedResponse(format!("Payment [{payment_id}] has no TradeNo")))?;
        Ok(HandledProcessorResponse {
            transaction_id,
            total,
            currency: basket.currency().to_string(),
            card_number,
            card_type: result.payment_type.clone(),
            capture,
        })
    }

    async fn capture(&self, payment_id: &str, amt: i64, basket: &BasketSnapshot) -> CaptureOutcome {
        let request = CreditCloseRequest::capture(payment_id, amt);
        let response = match self.closer.credit_close(&request).await {
            Ok(r) => r,
            Err(e) => {
                warn!("💳️ Could not capture Spgateway payment [{payment_id}]. The gateway will charge it later. {e}");
                return CaptureOutcome::Deferred(e.to_string());
            },
        };
        if let Err(e) = self.record_processor_response(&response, payment_id, Some(basket.id())).await {
            warn!("💳️ Could not log the capture result for payment [{payment_id}]. {e}");
        }
        if response.is_success() {
            info!("💳️ Successfully executed Spgateway payment [{payment_id}] for basket [{}].", basket.id());
            CaptureOutcome::Captured
        } else {
            warn!("💳️ Spgateway declined the capture of payment [{payment_id}]. The gateway will charge it later. {response}");
            CaptureOutcome::Deferred(response.to_string())
        }
    }

    /// Refunds `amount` of the payment with gateway reference `reference_number` (the `TradeNo`), against the order
    /// with the given number. Returns the reference number.
    pub async fn issue_credit(
        &self,
        order_number: &str,
        reference_number: &str,
        amount: Decimal,
    ) -> Result<String, PaymentGatewayError> {
        let order = self
            .db
            .fetch_order_by_number(order_number)
            .await?
            .ok_or_else(|| PaymentGatewayError::OrderNotFound(order_number.to_string()))?;
        let request = CreditCloseRequest::refund(reference_number, gateway_amount(amount)?);
        let response = self.closer.credit_close(&request).await?;
        self.record_processor_response(&response, reference_number, Some(order.basket_id)).await?;
        if !response.is_success() {
            warn!("💳️ Spgateway refused to refund payment [{reference_number}]. {response}");
            return Err(PaymentGatewayError::GatewayError(response.to_string()));
        }
        info!("💳️ Successfully issued a Spgateway refund for [{reference_number}] on basket [{}].", order.basket_id);
        let order = self.db.record_refund(order_number, reference_number, amount, PROCESSOR_NAME).await?;
        self.producers.publish_order_refunded(OrderRefundedEvent::new(order, reference_number, amount)).await;
        Ok(reference_number.to_string())
    }

    async fn record_processor_response<T: Serialize>(
        &self,
        response: &T,
        transaction_id: &str,
        basket_id: Option<i64>,
    ) -> Result<(), PaymentGatewayError> {
        let value = serde_json::to_value(response).map_err(|e| PaymentGatewayError::MalformedResponse(e.to_string()))?;
        let record = NewProcessorResponse::new(PROCESSOR_NAME, transaction_id, basket_id, value);
        self.db.record_processor_response(record).await?;
        Ok(())
    }
}
