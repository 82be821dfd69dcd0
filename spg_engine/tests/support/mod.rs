#![allow(dead_code)]
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use rust_decimal::Decimal;
use serde_json::{json, Value};
use spg_engine::{
    db_types::{BasketSnapshot, NewBasket, NewBasketLine},
    events::EventProducers,
    test_utils::{prepare_test_env, random_db_path},
    BasketManagement,
    CreditCloser,
    ProcessorConfig,
    SpgatewayCallbackApi,
    SpgatewayProcessor,
    SqliteDatabase,
    TransactionParameters,
};
use spgateway_tools::{
    decrypt_info,
    encrypt_info,
    generate_sha,
    CreditCloseRequest,
    CreditCloseResponse,
    SpgatewayConfig,
    SpgatewayError,
};

pub const HASH_KEY: &str = "Fs5cX1TGqYM2PpdbE14a9H83YQSQF5jn";
pub const HASH_IV: &str = "C6AcmfqJILwgnhIP";
pub const MERCHANT_ID: &str = "MS12345678";

/// A CreditClose client that answers every request the same way, and remembers what it was asked.
#[derive(Clone)]
pub struct FakeCloser {
    pub reply: Result<CreditCloseResponse, SpgatewayError>,
    pub requests: Arc<Mutex<Vec<CreditCloseRequest>>>,
}

impl FakeCloser {
    pub fn replying(status: &str, message: &str) -> Self {
        let reply = CreditCloseResponse { status: status.into(), message: message.into(), result: None };
        Self { reply: Ok(reply), requests: Arc::new(Mutex::new(Vec::new())) }
    }

    pub fn failing() -> Self {
        let reply = Err(SpgatewayError::RestResponseError("connection reset".into()));
        Self { reply, requests: Arc::new(Mutex::new(Vec::new())) }
    }

    pub fn requests(&self) -> Vec<CreditCloseRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl CreditCloser for FakeCloser {
    async fn credit_close(&self, request: &CreditCloseRequest) -> Result<CreditCloseResponse, SpgatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        self.reply.clone()
    }
}

pub fn processor_config() -> ProcessorConfig {
    let gateway = SpgatewayConfig::new(MERCHANT_ID, HASH_KEY, HASH_IV);
    ProcessorConfig::new(gateway, "https://shop.example.com")
}

pub async fn setup(closer: FakeCloser) -> SpgatewayCallbackApi<SqliteDatabase, FakeCloser> {
    setup_with_producers(closer, EventProducers::default()).await
}

pub async fn setup_with_producers(
    closer: FakeCloser,
    producers: EventProducers,
) -> SpgatewayCallbackApi<SqliteDatabase, FakeCloser> {
    let db = prepare_test_env(&random_db_path()).await;
    let processor = SpgatewayProcessor::new(db, closer, processor_config(), producers);
    SpgatewayCallbackApi::new(processor)
}

/// Creates a basket holding the given `(title, sku, quantity, unit price)` lines.
pub async fn create_basket(db: &SqliteDatabase, lines: &[(&str, &str, i64, Decimal)]) -> BasketSnapshot {
    let basket = db
        .create_basket(NewBasket::new("TWD").with_owner("alice", Some("alice@example.com")))
        .await
        .expect("Error creating basket");
    for (title, sku, quantity, price) in lines {
        db.add_basket_line(NewBasketLine::new(basket.id, title, Some(sku), *quantity, *price))
            .await
            .expect("Error adding basket line");
    }
    db.fetch_basket(basket.id).await.unwrap().unwrap()
}

/// Pulls the merchant order number back out of the encrypted trade info.
pub fn merchant_order_no(params: &TransactionParameters) -> String {
    let plain = decrypt_info(HASH_KEY, HASH_IV, &params.trade_info).unwrap();
    plain
        .split('&')
        .find_map(|pair| pair.strip_prefix("MerchantOrderNo="))
        .map(String::from)
        .expect("No MerchantOrderNo in trade info")
}

pub fn plain_trade_info(params: &TransactionParameters) -> HashMap<String, String> {
    let plain = decrypt_info(HASH_KEY, HASH_IV, &params.trade_info).unwrap();
    plain
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), urlencoding::decode(&v.replace('+', " ")).unwrap().into_owned()))
        .collect()
}

pub fn credit_result(merchant_order_no: &str, amt: i64) -> Value {
    json!({
        "MerchantID": MERCHANT_ID,
        "MerchantOrderNo": merchant_order_no,
        "PaymentType": "CREDIT",
        "Amt": amt,
        "TradeNo": "23092714215835071",
        "Card6No": "400022",
        "Card4No": "1111",
        "RespondCode": "00",
    })
}

/// The form the gateway would post to the callback URLs, signed with the test keys.
pub fn callback_form(status: &str, message: &str, result: Value) -> HashMap<String, String> {
    let body = json!({"Status": status, "Message": message, "Result": result}).to_string();
    let trade_info = encrypt_info(HASH_KEY, HASH_IV, &body).unwrap();
    let trade_sha = generate_sha(HASH_KEY, HASH_IV, &trade_info);
    HashMap::from([
        ("Status".to_string(), status.to_string()),
        ("MerchantID".to_string(), MERCHANT_ID.to_string()),
        ("TradeInfo".to_string(), trade_info),
        ("TradeSha".to_string(), trade_sha),
        ("Version".to_string(), "1.5".to_string()),
    ])
}
