use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spgateway_tools::{MpgResult, MpgTradeInfo, SpgatewayConfig};

use crate::{helpers::ecommerce_url, traits::PaymentGatewayError};

pub const RETURN_PATH: &str = "/payment/spgateway/return/";
pub const NOTIFY_PATH: &str = "/payment/spgateway/notify/";
pub const CUSTOMER_PATH: &str = "/payment/spgateway/customer/";

pub const DEFAULT_ECOMMERCE_URL: &str = "http://localhost:18130";
pub const DEFAULT_CANCEL_CHECKOUT_PATH: &str = "/checkout/cancel-checkout/";
pub const DEFAULT_ERROR_PATH: &str = "/checkout/error/";
pub const DEFAULT_RECEIPT_PATH: &str = "/checkout/receipt/";

//--------------------------------------    ProcessorConfig    ---------------------------------------------------------
/// Everything the Spgateway processor needs to know about the merchant account and the shop it is serving.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    pub gateway: SpgatewayConfig,
    /// The public base URL of the shop, e.g. `https://shop.example.com`
    pub ecommerce_url: String,
    pub cancel_checkout_path: String,
    pub error_path: String,
    pub receipt_path: String,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            gateway: SpgatewayConfig::default(),
            ecommerce_url: DEFAULT_ECOMMERCE_URL.to_string(),
            cancel_checkout_path: DEFAULT_CANCEL_CHECKOUT_PATH.to_string(),
            error_path: DEFAULT_ERROR_PATH.to_string(),
            receipt_path: DEFAULT_RECEIPT_PATH.to_string(),
        }
    }
}

impl ProcessorConfig {
    pub fn new(gateway: SpgatewayConfig, ecommerce_url: &str) -> Self {
        Self { gateway, ecommerce_url: ecommerce_url.to_string(), ..Default::default() }
    }

    pub fn return_url(&self) -> String {
        ecommerce_url(&self.ecommerce_url, RETURN_PATH)
    }

    pub fn notify_url(&self) -> String {
        ecommerce_url(&self.ecommerce_url, NOTIFY_PATH)
    }

    pub fn client_back_url(&self) -> String {
        ecommerce_url(&self.ecommerce_url, &self.cancel_checkout_path)
    }

    pub fn error_url(&self) -> String {
        ecommerce_url(&self.ecommerce_url, &self.error_path)
    }

    pub fn receipt_url(&self, order_number: &str) -> String {
        let url = ecommerce_url(&self.ecommerce_url, &self.receipt_path);
        format!("{url}?order_number={}", urlencoding::encode(order_number))
    }
}

//--------------------------------------  TransactionParameters  -------------------------------------------------------
/// The fields the payer's browser must post to the gateway's payment page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionParameters {
    #[serde(rename = "MerchantID")]
    pub merchant_id: String,
    #[serde(rename = "TradeInfo")]
    pub trade_info: String,
    #[serde(rename = "TradeSha")]
    pub trade_sha: String,
    #[serde(rename = "Version")]
    pub version: String,
    pub payment_page_url: String,
}

//--------------------------------------   SpgatewayResponse   ---------------------------------------------------------
/// A callback payload whose `TradeSha` has been verified and whose `TradeInfo` has been decrypted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpgatewayResponse {
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "MerchantID")]
    pub merchant_id: String,
    #[serde(rename = "TradeInfo")]
    pub trade_info: MpgTradeInfo,
    #[serde(rename = "TradeSha")]
    pub trade_sha: String,
    #[serde(rename = "Version")]
    pub version: String,
}

impl SpgatewayResponse {
    pub fn result(&self) -> &MpgResult {
        &self.trade_info.result
    }

    pub fn payment_type(&self) -> &str {
        &self.trade_info.result.payment_type
    }
}

//--------------------------------------    CaptureOutcome     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureOutcome {
    /// Only credit card authorisations need an explicit capture
    NotRequired,
    Captured,
    /// The capture request failed. The gateway charges the card automatically later, so the payment still stands.
    Deferred(String),
}

//--------------------------------------  HandledProcessorResponse  ----------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandledProcessorResponse {
    /// The gateway's transaction reference (`TradeNo`)
    pub transaction_id: String,
    pub total: Decimal,
    pub currency: String,
    /// Masked, never the full card or account number
    pub card_number: String,
    pub card_type: String,
    pub capture: CaptureOutcome,
}

//--------------------------------------      Card masks       ---------------------------------------------------------
/// Builds the masked card (or account/code) number that is stored with the payment source. Which fields the gateway
/// sends depends on the payment type; missing fields are replaced by asterisks.
pub fn mask_card_number(result: &MpgResult) -> Result<String, PaymentGatewayError> {
    let field = |name: &str, mask: &str| result.field(name).unwrap_or_else(|| mask.to_string());
    let masked = match result.payment_type.as_str() {
        "CREDIT" => format!("{}******{}", field("Card6No", "******"), field("Card4No", "****")),
        "WEBATM" | "VACC" => {
            format!("{}-*********{}", field("PayBankCode", "***"), field("PayerAccount5Code", "**********"))
        },
        "CVS" => field("CodeNo", "**********"),
        "BARCODE" => format!("{}-{}-{}", field("Barcode_1", ""), field("Barcode_2", ""), field("Barcode_3", "")),
        "CVSCOM" => "**********".to_string(),
        other => return Err(PaymentGatewayError::UnknownPaymentType(other.to_string())),
    };
    Ok(masked)
}
