use actix_web::{http::StatusCode, test::TestRequest, web};
use rust_decimal_macros::dec;
use spg_engine::{db_types::BasketStatus, test_utils::tear_down, traits::BasketManagement, TransactionParameters};
use spgateway_tools::decrypt_info;

use super::{helpers::*, mocks::MockCloser};
use crate::config::CallbackOptions;

#[actix_web::test]
async fn checkout_returns_transaction_parameters() {
    let api = new_api(MockCloser::new()).await;
    let db = api.processor().db().clone();
    let basket = create_basket(&db, &[("Optics", "SKU-OPT", 2, dec!(400))]).await;
    let api = web::Data::new(api);

    let uri = format!("/payment/spgateway/checkout/{}?email=bob%40example.com", basket.id());
    let res = send_request(TestRequest::post().uri(&uri), configure_callbacks(api, CallbackOptions::default())).await;
    assert_eq!(res.status, StatusCode::OK);
    let params: TransactionParameters = serde_json::from_str(&res.body).expect("Not transaction parameters");
    assert_eq!(params.merchant_id, MERCHANT_ID);
    assert!(!params.payment_page_url.is_empty());
    let plain = decrypt_info(HASH_KEY, HASH_IV, &params.trade_info).unwrap();
    assert!(plain.contains("Amt=800"));
    assert!(plain.contains("Email=bob%40example.com"));
    assert!(merchant_order_no(&params).starts_with("EDX_"));

    let frozen = db.fetch_basket(basket.id()).await.unwrap().unwrap();
    assert_eq!(frozen.basket.status, BasketStatus::Frozen);
    tear_down(db).await;
}

#[actix_web::test]
async fn checkout_of_unknown_basket() {
    let api = new_api(MockCloser::new()).await;
    let db = api.processor().db().clone();
    let api = web::Data::new(api);
    let req = TestRequest::post().uri("/payment/spgateway/checkout/4242");
    let res = send_request(req, configure_callbacks(api, CallbackOptions::default())).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json()["error"], "The data was not found. The requested basket 4242 does not exist");
    tear_down(db).await;
}

#[actix_web::test]
async fn checkout_of_submitted_basket() {
    let api = new_api(MockCloser::new()).await;
    let db = api.processor().db().clone();
    let basket = create_basket(&db, &[("Optics", "SKU-OPT", 1, dec!(800))]).await;
    db.update_basket_status(basket.id(), BasketStatus::Submitted).await.unwrap();
    let api = web::Data::new(api);
    let uri = format!("/payment/spgateway/checkout/{}", basket.id());
    let res = send_request(TestRequest::post().uri(&uri), configure_callbacks(api, CallbackOptions::default())).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    tear_down(db).await;
}
