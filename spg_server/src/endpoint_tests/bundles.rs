use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use journal_tools::{JournalApiError, JournalBundle};
use rust_decimal_macros::dec;
use serde_json::json;
use spg_engine::{db_types::BasketSnapshot, offers::BundleEligibility};

use super::{
    helpers::send_request,
    mocks::{MockBasketStore, MockCatalog},
};
use crate::routes::BundleEligibilityRoute;

const BUNDLE_UUID: &str = "d2b1e9b8-1f3c-4c4e-9d59-9b1c6a6b2f11";

fn basket() -> BasketSnapshot {
    serde_json::from_value(json!({
        "basket": {
            "id": 7,
            "owner_id": "alice",
            "owner_email": null,
            "order_number": "EDX-100007",
            "currency": "TWD",
            "status": "Open",
            "created_at": "2024-03-01T10:00:00Z",
            "updated_at": "2024-03-01T10:00:00Z"
        },
        "lines": [
            {"id": 1, "basket_id": 7, "product_title": "Mechanics", "partner_sku": "SKU-MECH", "quantity": 1,
             "unit_price_incl_tax": "10", "is_discountable": true},
            {"id": 2, "basket_id": 7, "product_title": "Optics", "partner_sku": "SKU-OPT", "quantity": 1,
             "unit_price_incl_tax": "30", "is_discountable": true},
            {"id": 3, "basket_id": 7, "product_title": "Physics Journal", "partner_sku": "SKU-JNL", "quantity": 1,
             "unit_price_incl_tax": "20", "is_discountable": true},
            {"id": 4, "basket_id": 7, "product_title": "Gift wrap", "partner_sku": null, "quantity": 1,
             "unit_price_incl_tax": "5", "is_discountable": true}
        ]
    }))
    .expect("Invalid basket")
}

fn bundle() -> JournalBundle {
    serde_json::from_value(json!({
        "uuid": BUNDLE_UUID,
        "title": "Physics bundle",
        "applicable_seat_types": ["verified"],
        "courses": [
            {"key": "mech", "course_runs": [{"key": "mech-1", "seats": [{"sku": "SKU-MECH", "type": "verified"}]}]},
            {"key": "opt", "course_runs": [{"key": "opt-1", "seats": [
                {"sku": "SKU-OPT", "type": "verified"},
                {"sku": "SKU-OPT-AUDIT", "type": "audit"}
            ]}]}
        ],
        "journals": [{"uuid": "j1", "sku": "SKU-JNL", "title": "Physics Journal"}]
    }))
    .expect("Invalid bundle")
}

fn configure(store: MockBasketStore, catalog: MockCatalog) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        cfg.app_data(web::Data::new(store))
            .app_data(web::Data::new(catalog))
            .service(BundleEligibilityRoute::<MockBasketStore, MockCatalog>::new());
    }
}

fn store_with_basket() -> MockBasketStore {
    let mut store = MockBasketStore::new();
    store.expect_fetch_basket().withf(|id| *id == 7).returning(|_| Ok(Some(basket())));
    store
}

#[actix_web::test]
async fn complete_bundles_are_satisfied() {
    let mut catalog = MockCatalog::new();
    catalog.expect_fetch_journal_bundle().withf(|uuid| uuid == BUNDLE_UUID).returning(|_| Ok(bundle()));
    let req = TestRequest::get().uri(&format!("/api/baskets/7/journal_bundles/{BUNDLE_UUID}"));
    let res = send_request(req, configure(store_with_basket(), catalog)).await;
    assert_eq!(res.status, StatusCode::OK);
    let eligibility: BundleEligibility = serde_json::from_str(&res.body).expect("Unexpected response");
    assert!(eligibility.satisfied);
    // Most expensive first, and never the line without a SKU
    let prices = eligibility.applicable_lines.iter().map(|l| l.unit_price).collect::<Vec<_>>();
    assert_eq!(prices, vec![dec!(30), dec!(20), dec!(10)]);
    let ids = eligibility.applicable_lines.iter().map(|l| l.line_id).collect::<Vec<_>>();
    assert_eq!(ids, vec![2, 3, 1]);
}

#[actix_web::test]
async fn unreachable_catalog_is_not_satisfied() {
    let mut catalog = MockCatalog::new();
    catalog.expect_fetch_journal_bundle().returning(|_| Err(JournalApiError::Timeout("5s".into())));
    let req = TestRequest::get().uri(&format!("/api/baskets/7/journal_bundles/{BUNDLE_UUID}"));
    let res = send_request(req, configure(store_with_basket(), catalog)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, r#"{"satisfied":false,"applicable_lines":[]}"#);
}

#[actix_web::test]
async fn unknown_baskets_are_not_found() {
    let mut store = MockBasketStore::new();
    store.expect_fetch_basket().returning(|_| Ok(None));
    let mut catalog = MockCatalog::new();
    catalog.expect_fetch_journal_bundle().never();
    let req = TestRequest::get().uri(&format!("/api/baskets/99/journal_bundles/{BUNDLE_UUID}"));
    let res = send_request(req, configure(store, catalog)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json()["error"], "The data was not found. Basket 99 does not exist");
}

#[actix_web::test]
async fn satisfied_bundles_price_the_benefit() {
    let mut catalog = MockCatalog::new();
    catalog.expect_fetch_journal_bundle().returning(|_| Ok(bundle()));
    let req = TestRequest::get().uri(&format!("/api/baskets/7/journal_bundles/{BUNDLE_UUID}?benefit=fixed&value=35"));
    let res = send_request(req, configure(store_with_basket(), catalog)).await;
    assert_eq!(res.status, StatusCode::OK);
    let json = res.json();
    assert_eq!(json["satisfied"], true);
    assert_eq!(json["discount"]["name"], "35 fixed-price enterprise discount");
    assert_eq!(json["discount"]["total"], "35");
    assert_eq!(json["discount"]["discounts"][0]["line_id"], 2);
    assert_eq!(json["discount"]["discounts"][0]["amount"], "30");
    assert_eq!(json["discount"]["discounts"][1]["line_id"], 3);
    assert_eq!(json["discount"]["discounts"][1]["amount"], "5");
}

#[actix_web::test]
async fn invalid_benefits_are_rejected() {
    let mut catalog = MockCatalog::new();
    catalog.expect_fetch_journal_bundle().never();
    let req = TestRequest::get().uri(&format!("/api/baskets/7/journal_bundles/{BUNDLE_UUID}?benefit=percentage&value=120"));
    let res = send_request(req, configure(MockBasketStore::new(), catalog)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let mut catalog = MockCatalog::new();
    catalog.expect_fetch_journal_bundle().never();
    let req = TestRequest::get().uri(&format!("/api/baskets/7/journal_bundles/{BUNDLE_UUID}?value=10"));
    let res = send_request(req, configure(MockBasketStore::new(), catalog)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}
