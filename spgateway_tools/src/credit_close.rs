//! The CreditClose API: capture (請款) or refund (退款) a credit card authorisation.
use std::{fmt::Display, sync::Arc, time::Duration};

use log::*;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use spg_common::Secret;

use crate::{
    consts::{CREDIT_CLOSE_VERSION, RESPOND_TYPE, STATUS_SUCCESS},
    crypto::encrypt_info,
    helpers::timestamp,
    mpg::encode_pairs,
    SpgatewayConfig,
    SpgatewayError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseType {
    Capture = 1,
    Refund = 2,
}

/// Which field identifies the transaction being closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexType {
    MerchantOrderNo = 1,
    TradeNo = 2,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditCloseRequest {
    pub amt: i64,
    pub merchant_order_no: String,
    pub trade_no: String,
    pub index_type: IndexType,
    pub close_type: CloseType,
}

impl CreditCloseRequest {
    /// Captures the authorised amount for the given merchant order number.
    pub fn capture(merchant_order_no: &str, amt: i64) -> Self {
        Self {
            amt,
            merchant_order_no: merchant_order_no.to_string(),
            trade_no: String::default(),
            index_type: IndexType::MerchantOrderNo,
            close_type: CloseType::Capture,
        }
    }

    /// Refunds `amt` against the gateway's trade number.
    pub fn refund(trade_no: &str, amt: i64) -> Self {
        Self {
            amt,
            merchant_order_no: String::default(),
            trade_no: trade_no.to_string(),
            index_type: IndexType::TradeNo,
            close_type: CloseType::Refund,
        }
    }

    /// The plaintext `PostData_` payload, stamped with `time_stamp`.
    pub fn to_post_data(&self, time_stamp: &str) -> String {
        let pairs = [
            ("RespondType", RESPOND_TYPE.to_string()),
            ("Version", CREDIT_CLOSE_VERSION.to_string()),
            ("Amt", self.amt.to_string()),
            ("MerchantOrderNo", self.merchant_order_no.clone()),
            ("TimeStamp", time_stamp.to_string()),
            ("IndexType", (self.index_type as u8).to_string()),
            ("TradeNo", self.trade_no.clone()),
            ("CloseType", (self.close_type as u8).to_string()),
        ];
        encode_pairs(&pairs)
    }

    /// The key the audit trail should file this request under.
    pub fn reference(&self) -> &str {
        match self.index_type {
            IndexType::MerchantOrderNo => &self.merchant_order_no,
            IndexType::TradeNo => &self.trade_no,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditCloseResponse {
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Message", default)]
    pub message: String,
    #[serde(rename = "Result", default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl CreditCloseResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

impl Display for CreditCloseResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

#[derive(Clone)]
pub struct CreditCloseClient {
    merchant_id: String,
    hash_key: Secret<String>,
    hash_iv: Secret<String>,
    url: String,
    client: Arc<Client>,
}

impl CreditCloseClient {
    pub fn new(config: &SpgatewayConfig, timeout: Duration) -> Result<Self, SpgatewayError> {
        let client =
            Client::builder().timeout(timeout).build().map_err(|e| SpgatewayError::Initialization(e.to_string()))?;
        Ok(Self {
            merchant_id: config.merchant_id.clone(),
            hash_key: config.hash_key.clone(),
            hash_iv: config.hash_iv.clone(),
            url: config.credit_close_url.clone(),
            client: Arc::new(client),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends the request to the CreditClose endpoint.
    ///
    /// A response with a non-`SUCCESS` status is still `Ok`. Callers decide what a failed close means for them.
    pub async fn execute(&self, request: &CreditCloseRequest) -> Result<CreditCloseResponse, SpgatewayError> {
        let post_data = request.to_post_data(&timestamp());
        let encrypted = encrypt_info(self.hash_key.reveal(), self.hash_iv.reveal(), &post_data)?;
        let form = [("MerchantID_", self.merchant_id.as_str()), ("PostData_", encrypted.as_str())];
        debug!("💳️ Sending {:?} request for {} to {}", request.close_type, request.reference(), self.url);
        let response = self
            .client
            .post(&self.url)
            .form(&form)
            .send()
            .await
            .map_err(|e| SpgatewayError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            let result = response.json::<CreditCloseResponse>().await.map_err(|e| SpgatewayError::JsonError(e.to_string()))?;
            trace!("💳️ CreditClose responded with {result}");
            Ok(result)
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| SpgatewayError::RestResponseError(e.to_string()))?;
            Err(SpgatewayError::QueryError { status, message })
        }
    }
}
