//! The return, notify and customer callbacks.
//!
//! The gateway posts the same encrypted payload to every callback URL. A notification moves through
//! `received → validated → basket-resolved → payment-handled → order-placed`; a return (or customer) callback stops
//! after `basket-resolved`. Any failure aborts the remaining steps.
use std::{collections::HashMap, fmt::Debug};

use log::*;
use spgateway_tools::{consts::STATUS_SUCCESS, decrypt_info, validate_info, EncryptedResponse, MpgTradeInfo};

use crate::{
    db_types::{BasketSnapshot, NewOrder, NewPaymentSource, Order},
    events::OrderPlacedEvent,
    spg_api::{
        errors::CallbackError,
        processor_objects::{HandledProcessorResponse, SpgatewayResponse},
        spgateway_processor::{SpgatewayProcessor, PROCESSOR_NAME},
    },
    traits::{CreditCloser, PaymentGatewayDatabase},
};

/// The result of a notification that went all the way through.
#[derive(Debug, Clone)]
pub struct NotifyOutcome {
    pub response: SpgatewayResponse,
    pub basket: BasketSnapshot,
    pub handled: HandledProcessorResponse,
    pub order: Order,
}

/// A verified return callback, along with the basket it belongs to.
#[derive(Debug, Clone)]
pub struct ReturnOutcome {
    pub response: SpgatewayResponse,
    pub basket: BasketSnapshot,
}

pub struct SpgatewayCallbackApi<B, C> {
    processor: SpgatewayProcessor<B, C>,
}

impl<B, C> Debug for SpgatewayCallbackApi<B, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SpgatewayCallbackApi")
    }
}

impl<B, C> SpgatewayCallbackApi<B, C> {
    pub fn new(processor: SpgatewayProcessor<B, C>) -> Self {
        Self { processor }
    }

    pub fn processor(&self) -> &SpgatewayProcessor<B, C> {
        &self.processor
    }

    /// Verifies `TradeSha` against the encrypted `TradeInfo` exactly as it was received, and only then decrypts it.
    pub fn decrypt_response(&self, form: &HashMap<String, String>) -> Result<SpgatewayResponse, CallbackError> {
        let encrypted = EncryptedResponse::from_form(form).map_err(|e| CallbackError::MalformedPayload(e.to_string()))?;
        let gateway = &self.processor.config().gateway;
        let (key, iv) = (gateway.hash_key.reveal(), gateway.hash_iv.reveal());
        if !validate_info(key, iv, &encrypted.trade_info, &encrypted.trade_sha) {
            warn!("🔔️ Rejecting a callback that failed TradeSha validation");
            return Err(CallbackError::IntegrityError);
        }
        let json = decrypt_info(key, iv, &encrypted.trade_info).map_err(|e| CallbackError::MalformedPayload(e.to_string()))?;
        let trade_info = MpgTradeInfo::from_json(&json).map_err(|e| CallbackError::MalformedPayload(e.to_string()))?;
        trace!("🔔️ Callback for payment [{}] validated", trade_info.result.merchant_order_no);
        Ok(SpgatewayResponse {
            status: encrypted.status,
            merchant_id: encrypted.merchant_id,
            trade_info,
            trade_sha: encrypted.trade_sha,
            version: encrypted.version,
        })
    }

    pub fn receipt_url(&self, basket: &BasketSnapshot) -> String {
        self.processor.config().receipt_url(basket.order_number())
    }

    pub fn error_url(&self) -> String {
        self.processor.config().error_url()
    }
}

impl<B, C> SpgatewayCallbackApi<B, C>
where
    B: PaymentGatewayDatabase,
    C: CreditCloser,
{
    /// Handles the server-to-server payment notification: the payment is captured if necessary and an order is placed
    /// for the basket. Replays of a notification find more than one correlation for the payment and are rejected.
    pub async fn process_notify(&self, form: &HashMap<String, String>) -> Result<NotifyOutcome, CallbackError> {
        let (response, basket) = self.resolve(form, false).await?;
        let payment_id = SpgatewayProcessor::<B, C>::get_payment_id(&response).to_string();
        trace!("🔔️ [{payment_id}] basket-resolved: basket #{}", basket.id());

        let handled = self.processor.handle_processor_response(&response, &basket).await.map_err(|e| {
            error!("🔔️ Attempts to handle payment for basket [{}] failed. {e}", basket.id());
            e
        })?;
        trace!("🔔️ [{payment_id}] payment-handled: {:?}", handled.capture);

        let source = NewPaymentSource {
            source_type: PROCESSOR_NAME.to_string(),
            transaction_id: handled.transaction_id.clone(),
            card_number: handled.card_number.clone(),
            card_type: handled.card_type.clone(),
            amount: handled.total,
        };
        let order = self.processor.db().place_order(NewOrder::for_basket(&basket, source)).await.map_err(|e| {
            error!("🔔️ An error occurred while placing the order for basket [{}]. {e}", basket.id());
            e
        })?;
        info!("🔔️ [{payment_id}] order-placed: order [{}] for basket #{}", order.number, basket.id());
        let event = OrderPlacedEvent::new(order.clone(), &handled.transaction_id, &handled.card_type);
        self.processor.producers().publish_order_placed(event).await;
        Ok(NotifyOutcome { response, basket, handled, order })
    }

    /// Handles the payer coming back from the gateway. Nothing is changed; the caller only needs the basket to find
    /// the receipt page. Duplicate correlations are expected here, since the notification may already have arrived.
    pub async fn process_return(&self, form: &HashMap<String, String>) -> Result<ReturnOutcome, CallbackError> {
        let (response, basket) = self.resolve(form, true).await?;
        debug!("🔔️ Payer returned from the gateway for basket #{}", basket.id());
        Ok(ReturnOutcome { response, basket })
    }

    async fn resolve(
        &self,
        form: &HashMap<String, String>,
        tolerate_duplicates: bool,
    ) -> Result<(SpgatewayResponse, BasketSnapshot), CallbackError> {
        let response = self.decrypt_response(form)?;
        if response.status != STATUS_SUCCESS {
            let message = response.trade_info.message.clone();
            warn!("🔔️ The gateway reports an unsuccessful payment. {}: {message}", response.status);
            return Err(CallbackError::GatewayStatus { status: response.status, message });
        }
        let payment_id = SpgatewayProcessor::<B, C>::get_payment_id(&response);
        match self.processor.get_basket(payment_id, tolerate_duplicates).await? {
            Some(basket) => Ok((response, basket)),
            None => {
                error!("🔔️ Attempts to find basket by payment_id [{payment_id}] failed.");
                Err(CallbackError::BasketNotFound(payment_id.to_string()))
            },
        }
    }
}
