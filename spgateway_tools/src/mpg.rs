//! MPG (multi payment gateway) data objects.
//!
//! [`TradeInfo`] is what we send with the payer's redirect. [`EncryptedResponse`] is what the gateway posts back to the
//! return, notify and customer URLs, and [`MpgTradeInfo`] is the JSON hidden inside its `TradeInfo` field.
use std::collections::{BTreeMap, HashMap};

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{
    consts::{MPG_VERSION, RESPOND_TYPE},
    helpers::timestamp,
    SpgatewayError,
};

//--------------------------------------------     TradeInfo      ---------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TradeInfo {
    #[serde(rename = "MerchantID")]
    pub merchant_id: String,
    pub respond_type: String,
    pub time_stamp: String,
    pub version: String,
    pub merchant_order_no: String,
    pub amt: i64,
    pub item_desc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "ReturnURL")]
    pub return_url: String,
    #[serde(rename = "NotifyURL")]
    pub notify_url: String,
    #[serde(rename = "ClientBackURL")]
    pub client_back_url: String,
    /// 0 = payers do not need to log in to a Spgateway member account
    pub login_type: u8,
}

impl TradeInfo {
    /// Creates a new trade info record, stamped with the current time. Callback URLs are empty until set.
    pub fn new(merchant_id: &str, merchant_order_no: &str, amt: i64, item_desc: &str) -> Self {
        Self {
            merchant_id: merchant_id.to_string(),
            respond_type: RESPOND_TYPE.to_string(),
            time_stamp: timestamp(),
            version: MPG_VERSION.to_string(),
            merchant_order_no: merchant_order_no.to_string(),
            amt,
            item_desc: item_desc.to_string(),
            email: None,
            return_url: String::default(),
            notify_url: String::default(),
            client_back_url: String::default(),
            login_type: 0,
        }
    }

    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    pub fn with_callback_urls(mut self, return_url: &str, notify_url: &str, client_back_url: &str) -> Self {
        self.return_url = return_url.to_string();
        self.notify_url = notify_url.to_string();
        self.client_back_url = client_back_url.to_string();
        self
    }

    /// The field/value pairs, in the order the gateway documents them.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("MerchantID", self.merchant_id.clone()),
            ("RespondType", self.respond_type.clone()),
            ("TimeStamp", self.time_stamp.clone()),
            ("Version", self.version.clone()),
            ("MerchantOrderNo", self.merchant_order_no.clone()),
            ("Amt", self.amt.to_string()),
            ("ItemDesc", self.item_desc.clone()),
        ];
        if let Some(email) = &self.email {
            pairs.push(("Email", email.clone()));
        }
        pairs.extend([
            ("ReturnURL", self.return_url.clone()),
            ("NotifyURL", self.notify_url.clone()),
            ("ClientBackURL", self.client_back_url.clone()),
            ("LoginType", self.login_type.to_string()),
        ]);
        pairs
    }

    /// URL-encodes the trade info as a query string. This is the plaintext that gets encrypted into `TradeInfo`.
    pub fn to_query_string(&self) -> String {
        encode_pairs(&self.pairs())
    }
}

/// Form-encodes the pairs the way PHP's `http_build_query` does, which is what the gateway expects.
pub(crate) fn encode_pairs(pairs: &[(&str, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v).replace("%20", "+")))
        .collect::<Vec<String>>()
        .join("&")
}

//--------------------------------------------  EncryptedResponse  ---------------------------------------------------
/// The form fields the gateway posts back. Nothing in here can be trusted until `TradeSha` has been validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedResponse {
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "MerchantID")]
    pub merchant_id: String,
    #[serde(rename = "TradeInfo")]
    pub trade_info: String,
    #[serde(rename = "TradeSha")]
    pub trade_sha: String,
    #[serde(rename = "Version")]
    pub version: String,
}

impl EncryptedResponse {
    /// Extracts the response fields from a decoded form body.
    pub fn from_form(form: &HashMap<String, String>) -> Result<Self, SpgatewayError> {
        let field = |name: &str| form.get(name).cloned().ok_or_else(|| SpgatewayError::MissingField(name.to_string()));
        Ok(Self {
            status: field("Status")?,
            merchant_id: field("MerchantID")?,
            trade_info: field("TradeInfo")?,
            trade_sha: field("TradeSha")?,
            version: field("Version")?,
        })
    }
}

//--------------------------------------------    MpgTradeInfo    ---------------------------------------------------
/// The decrypted contents of `TradeInfo` on a callback (with `RespondType=JSON`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MpgTradeInfo {
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Message", default)]
    pub message: String,
    #[serde(rename = "Result")]
    pub result: MpgResult,
}

impl MpgTradeInfo {
    pub fn from_json(json: &str) -> Result<Self, SpgatewayError> {
        serde_json::from_str(json).map_err(|e| SpgatewayError::JsonError(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MpgResult {
    #[serde(rename = "MerchantID", default, skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<String>,
    #[serde(rename = "MerchantOrderNo")]
    pub merchant_order_no: String,
    #[serde(rename = "PaymentType")]
    pub payment_type: String,
    #[serde(rename = "Amt", default, deserialize_with = "de_opt_amount", skip_serializing_if = "Option::is_none")]
    pub amt: Option<i64>,
    #[serde(rename = "TradeNo", default, skip_serializing_if = "Option::is_none")]
    pub trade_no: Option<String>,
    /// Payment-method specific fields (`Card6No`, `PayBankCode`, `CodeNo`, `Barcode_1` etc.)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl MpgResult {
    /// Fetches a payment-method specific field as a string. Numbers are rendered as-is; nulls count as missing.
    pub fn field(&self, name: &str) -> Option<String> {
        match self.extra.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            v => Some(v.to_string()),
        }
    }
}

/// The gateway sends `Amt` as a number, but some payment types send it as a string.
fn de_opt_amount<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where D: Deserializer<'de> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(|| de::Error::custom(format!("invalid Amt: {n}"))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse::<i64>().map(Some).map_err(|e| de::Error::custom(format!("invalid Amt: {e}"))),
        Some(v) => Err(de::Error::custom(format!("invalid Amt: {v}"))),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn trade_info_query_string() {
        let mut info = TradeInfo::new("MS12345678", "EDX_100017_aZ3k9", 1500, "1xDemo Course, 2xJournal & More")
            .with_email(Some("alice@example.com".into()))
            .with_callback_urls(
                "https://shop.example.com/payment/spgateway/return/",
                "https://shop.example.com/payment/spgateway/notify/",
                "https://shop.example.com/checkout/cancel-checkout/",
            );
        info.time_stamp = "1485232229".into();
        let qs = info.to_query_string();
        assert_eq!(
            qs,
            "MerchantID=MS12345678&RespondType=JSON&TimeStamp=1485232229&Version=1.5&MerchantOrderNo=EDX_100017_aZ3k9&\
             Amt=1500&ItemDesc=1xDemo+Course%2C+2xJournal+%26+More&Email=alice%40example.com&ReturnURL=https%3A%2F%2F\
             shop.example.com%2Fpayment%2Fspgateway%2Freturn%2F&NotifyURL=https%3A%2F%2Fshop.example.com%2Fpayment%2F\
             spgateway%2Fnotify%2F&ClientBackURL=https%3A%2F%2Fshop.example.com%2Fcheckout%2Fcancel-checkout%2F&\
             LoginType=0"
        );
    }

    #[test]
    fn anonymous_trade_info_omits_email() {
        let info = TradeInfo::new("MS1", "X_1", 10, "1xA");
        assert!(!info.to_query_string().contains("Email="));
        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("Email").is_none());
        assert_eq!(json["MerchantOrderNo"], "X_1");
        assert_eq!(json["ReturnURL"], "");
    }

    #[test]
    fn encrypted_response_from_form() {
        let mut form = HashMap::new();
        form.insert("Status".to_string(), "SUCCESS".to_string());
        form.insert("MerchantID".to_string(), "MS1".to_string());
        form.insert("TradeInfo".to_string(), "abcd".to_string());
        form.insert("TradeSha".to_string(), "ABCD".to_string());
        let err = EncryptedResponse::from_form(&form).unwrap_err();
        assert!(matches!(err, SpgatewayError::MissingField(f) if f == "Version"));
        form.insert("Version".to_string(), "1.5".to_string());
        let response = EncryptedResponse::from_form(&form).unwrap();
        assert_eq!(response.trade_sha, "ABCD");
    }

    #[test]
    fn decode_credit_card_result() {
        let json = r#"{"Status":"SUCCESS","Message":"授權成功","Result":{"MerchantID":"MS1","Amt":1500,
            "TradeNo":"17012345678","MerchantOrderNo":"EDX_100017_aZ3k9","PaymentType":"CREDIT","RespondCode":"00",
            "Card6No":"400022","Card4No":"1111","Inst":0}}"#;
        let info = MpgTradeInfo::from_json(json).unwrap();
        assert_eq!(info.status, "SUCCESS");
        assert_eq!(info.result.amt, Some(1500));
        assert_eq!(info.result.trade_no.as_deref(), Some("17012345678"));
        assert_eq!(info.result.field("Card6No").as_deref(), Some("400022"));
        assert_eq!(info.result.field("Inst").as_deref(), Some("0"));
        assert_eq!(info.result.field("Card4No").as_deref(), Some("1111"));
        assert!(info.result.field("PayBankCode").is_none());
    }

    #[test]
    fn amount_may_be_a_string_or_absent() {
        let json = r#"{"Status":"SUCCESS","Result":{"MerchantOrderNo":"A","PaymentType":"CVS","Amt":"250"}}"#;
        assert_eq!(MpgTradeInfo::from_json(json).unwrap().result.amt, Some(250));
        let json = r#"{"Status":"SUCCESS","Result":{"MerchantOrderNo":"A","PaymentType":"CVS"}}"#;
        let info = MpgTradeInfo::from_json(json).unwrap();
        assert_eq!(info.result.amt, None);
        assert_eq!(info.message, "");
        let json = r#"{"Status":"SUCCESS","Result":{"MerchantOrderNo":"A","PaymentType":"CVS","Amt":"ten"}}"#;
        assert!(matches!(MpgTradeInfo::from_json(json), Err(SpgatewayError::JsonError(_))));
    }
}
