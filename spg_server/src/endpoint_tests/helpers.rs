use std::collections::HashMap;

use actix_web::{
    http::{header, StatusCode},
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use log::debug;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use spg_engine::{
    db_types::{BasketSnapshot, NewBasket, NewBasketLine},
    events::EventProducers,
    test_utils::{prepare_test_env, random_db_path},
    traits::BasketManagement,
    ProcessorConfig,
    SpgatewayCallbackApi,
    SpgatewayProcessor,
    SqliteDatabase,
    TransactionParameters,
};
use spgateway_tools::{decrypt_info, encrypt_info, generate_sha, CreditCloseResponse, SpgatewayConfig};

use super::mocks::MockCloser;
use crate::{
    config::CallbackOptions,
    routes::{CheckoutRoute, SpgatewayCustomerRoute, SpgatewayNotifyRoute, SpgatewayReturnRoute},
};

// Test credentials. DO NOT re-use these keys anywhere.
pub const HASH_KEY: &str = "Fs5cX1TGqYM2PpdbE14a9H83YQSQF5jn";
pub const HASH_IV: &str = "C6AcmfqJILwgnhIP";
pub const MERCHANT_ID: &str = "MS12345678";
pub const SHOP_URL: &str = "https://shop.example.com";
pub const TRADE_NO: &str = "23092714215835071";

pub type TestApi = SpgatewayCallbackApi<SqliteDatabase, MockCloser>;

#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("Response body is not JSON")
    }
}

pub async fn send_request<F>(req: TestRequest, configure: F) -> TestResponse
where F: FnOnce(&mut ServiceConfig) {
    let _ = env_logger::try_init();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let location = res.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()).map(String::from);
    let body = String::from_utf8_lossy(&test::read_body(res).await).into_owned();
    TestResponse { status, location, body }
}

/// Registers the checkout and callback routes against `api`.
pub fn configure_callbacks(api: web::Data<TestApi>, options: CallbackOptions) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        cfg.app_data(api)
            .app_data(web::Data::new(options))
            .service(CheckoutRoute::<SqliteDatabase, MockCloser>::new())
            .service(SpgatewayReturnRoute::<SqliteDatabase, MockCloser>::new())
            .service(SpgatewayNotifyRoute::<SqliteDatabase, MockCloser>::new())
            .service(SpgatewayCustomerRoute::<SqliteDatabase, MockCloser>::new());
    }
}

pub fn capture_succeeds() -> MockCloser {
    let mut closer = MockCloser::new();
    closer.expect_credit_close().returning(|_| {
        Ok(CreditCloseResponse { status: "SUCCESS".into(), message: "Captured".into(), result: None })
    });
    closer
}

pub async fn new_api(closer: MockCloser) -> TestApi {
    let db = prepare_test_env(&random_db_path()).await;
    let gateway = SpgatewayConfig::new(MERCHANT_ID, HASH_KEY, HASH_IV);
    let config = ProcessorConfig::new(gateway, SHOP_URL);
    SpgatewayCallbackApi::new(SpgatewayProcessor::new(db, closer, config, EventProducers::default()))
}

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

pub fn merchant_order_no(params: &TransactionParameters) -> String {
    let plain = decrypt_info(HASH_KEY, HASH_IV, &params.trade_info).unwrap();
    plain
        .split('&')
        .find_map(|pair| pair.strip_prefix("MerchantOrderNo="))
        .map(String::from)
        .expect("No MerchantOrderNo in trade info")
}

/// The form the gateway posts to the callback URLs after a successful credit card payment, signed with the test keys.
pub fn paid_form(merchant_order_no: &str, amt: i64) -> HashMap<String, String> {
    let result = json!({
        "MerchantID": MERCHANT_ID,
        "MerchantOrderNo": merchant_order_no,
        "PaymentType": "CREDIT",
        "Amt": amt,
        "TradeNo": TRADE_NO,
        "Card6No": "400022",
        "Card4No": "1111",
    });
    let body = json!({"Status": "SUCCESS", "Message": "Paid", "Result": result}).to_string();
    let trade_info = encrypt_info(HASH_KEY, HASH_IV, &body).unwrap();
    let trade_sha = generate_sha(HASH_KEY, HASH_IV, &trade_info);
    HashMap::from([
        ("Status".to_string(), "SUCCESS".to_string()),
        ("MerchantID".to_string(), MERCHANT_ID.to_string()),
        ("TradeInfo".to_string(), trade_info),
        ("TradeSha".to_string(), trade_sha),
        ("Version".to_string(), "1.5".to_string()),
    ])
}
