use actix_web::{http::StatusCode, test::TestRequest, web};
use rust_decimal_macros::dec;
use spg_engine::{
    db_types::{BasketSnapshot, OrderStatusType},
    test_utils::tear_down,
    traits::OrderPlacement,
    SqliteDatabase,
};
use spgateway_tools::{CloseType, CreditCloseResponse};

use super::{helpers::*, mocks::MockCloser};
use crate::config::CallbackOptions;

const RECEIPT_URL: &str = "https://shop.example.com/checkout/receipt/?order_number=";
const ERROR_URL: &str = "https://shop.example.com/checkout/error/";

/// Creates a basket and checks it out, returning the merchant order number the gateway will send back.
async fn checked_out_basket(api: &TestApi) -> (SqliteDatabase, BasketSnapshot, String) {
    let db = api.processor().db().clone();
    let basket = create_basket(&db, &[("Optics", "SKU-OPT", 1, dec!(800))]).await;
    let params = api.processor().begin_checkout(basket.id(), None).await.expect("Checkout failed");
    let payment_id = merchant_order_no(&params);
    (db, basket, payment_id)
}

fn post_form(path: &str, form: &std::collections::HashMap<String, String>) -> TestRequest {
    TestRequest::post().uri(path).set_form(form)
}

#[actix_web::test]
async fn notification_places_order() {
    let mut closer = MockCloser::new();
    closer
        .expect_credit_close()
        .withf(|req| req.close_type == CloseType::Capture && req.amt == 800)
        .times(1)
        .returning(|_| Ok(CreditCloseResponse { status: "SUCCESS".into(), message: "".into(), result: None }));
    let api = new_api(closer).await;
    let (db, basket, payment_id) = checked_out_basket(&api).await;
    let api = web::Data::new(api);

    let req = post_form("/payment/spgateway/notify/", &paid_form(&payment_id, 800));
    let res = send_request(req, configure_callbacks(api, CallbackOptions::default())).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, r#"{"success":true}"#);

    let order = db.fetch_order_by_number(basket.order_number()).await.unwrap().expect("No order placed");
    assert_eq!(order.status, OrderStatusType::Open);
    assert_eq!(order.total_incl_tax, dec!(800));
    tear_down(db).await;
}

#[actix_web::test]
async fn failed_notifications_report_failure() {
    let mut closer = MockCloser::new();
    closer.expect_credit_close().never();
    let api = new_api(closer).await;
    let (db, basket, payment_id) = checked_out_basket(&api).await;
    let api = web::Data::new(api);

    let mut form = paid_form(&payment_id, 800);
    form.insert("TradeSha".into(), "0".repeat(64));
    let req = post_form("/payment/spgateway/notify/", &form);
    let res = send_request(req, configure_callbacks(api.clone(), CallbackOptions::default())).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, r#"{"success":false}"#);

    // Wrong amount
    let res = send_request(
        post_form("/payment/spgateway/notify/", &paid_form(&payment_id, 700)),
        configure_callbacks(api.clone(), CallbackOptions::default()),
    )
    .await;
    assert_eq!(res.body, r#"{"success":false}"#);

    // Not a form at all
    let req = TestRequest::post().uri("/payment/spgateway/notify/").set_payload("{}");
    let res = send_request(req, configure_callbacks(api, CallbackOptions::default())).await;
    assert_eq!(res.body, r#"{"success":false}"#);

    assert!(db.fetch_order_by_number(basket.order_number()).await.unwrap().is_none());
    tear_down(db).await;
}

#[actix_web::test]
async fn return_redirects_to_receipt() {
    let mut closer = MockCloser::new();
    closer.expect_credit_close().never();
    let api = new_api(closer).await;
    let (db, basket, payment_id) = checked_out_basket(&api).await;
    let api = web::Data::new(api);

    let req = post_form("/payment/spgateway/return/", &paid_form(&payment_id, 800));
    let res = send_request(req, configure_callbacks(api, CallbackOptions::default())).await;
    assert_eq!(res.status, StatusCode::FOUND);
    assert_eq!(res.location, Some(format!("{RECEIPT_URL}{}", basket.order_number())));
    // Only a notification places an order
    assert!(db.fetch_order_by_number(basket.order_number()).await.unwrap().is_none());
    tear_down(db).await;
}

#[actix_web::test]
async fn failed_returns_redirect_to_error_page() {
    let api = new_api(MockCloser::new()).await;
    let db = api.processor().db().clone();
    let api = web::Data::new(api);

    let req = post_form("/payment/spgateway/return/", &paid_form("EDX_100999_nobodyknowsme", 800));
    let res = send_request(req, configure_callbacks(api.clone(), CallbackOptions::default())).await;
    assert_eq!(res.status, StatusCode::FOUND);
    assert_eq!(res.location.as_deref(), Some(ERROR_URL));

    let req = TestRequest::post().uri("/payment/spgateway/customer/").set_form(&[("Status", "SUCCESS")]);
    let res = send_request(req, configure_callbacks(api, CallbackOptions::default())).await;
    assert_eq!(res.status, StatusCode::FOUND);
    assert_eq!(res.location.as_deref(), Some(ERROR_URL));
    tear_down(db).await;
}

#[actix_web::test]
async fn customer_sees_payment_result() {
    let api = new_api(MockCloser::new()).await;
    let (db, basket, payment_id) = checked_out_basket(&api).await;
    let api = web::Data::new(api);

    let req = post_form("/payment/spgateway/customer/", &paid_form(&payment_id, 800));
    let res = send_request(req, configure_callbacks(api, CallbackOptions::default())).await;
    assert_eq!(res.status, StatusCode::OK);
    let json = res.json();
    assert_eq!(json["status"], "SUCCESS");
    assert_eq!(json["result"]["TradeNo"], TRADE_NO);
    assert_eq!(json["result"]["Card4No"], "1111");
    assert_eq!(json["basket"]["order_number"], basket.order_number());
    assert_eq!(json["basket"]["lines"][0]["title"], "Optics");
    tear_down(db).await;
}

#[actix_web::test]
async fn local_test_mode_places_orders_on_return() {
    let api = new_api(capture_succeeds()).await;
    let (db, basket, payment_id) = checked_out_basket(&api).await;
    let api = web::Data::new(api);
    let options = CallbackOptions { local_test_mode: true, ..Default::default() };

    let req = post_form("/payment/spgateway/return/", &paid_form(&payment_id, 800));
    let res = send_request(req, configure_callbacks(api, options)).await;
    assert_eq!(res.status, StatusCode::FOUND);
    assert_eq!(res.location, Some(format!("{RECEIPT_URL}{}", basket.order_number())));
    assert!(db.fetch_order_by_number(basket.order_number()).await.unwrap().is_some());
    tear_down(db).await;
}
