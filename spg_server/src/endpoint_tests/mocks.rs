use journal_tools::{JournalApiError, JournalBundle};
use mockall::mock;
use spg_engine::{
    db_types::{Basket, BasketLine, BasketSnapshot, BasketStatus, NewBasket, NewBasketLine},
    traits::{BasketManagement, BundleCatalog, CreditCloser, PaymentGatewayError},
};
use spgateway_tools::{CreditCloseRequest, CreditCloseResponse, SpgatewayError};

mock! {
    pub Closer {}
    impl CreditCloser for Closer {
        async fn credit_close(&self, request: &CreditCloseRequest) -> Result<CreditCloseResponse, SpgatewayError>;
    }
}

mock! {
    pub Catalog {}
    impl BundleCatalog for Catalog {
        async fn fetch_journal_bundle(&self, uuid: &str) -> Result<JournalBundle, JournalApiError>;
    }
}

mock! {
    pub BasketStore {}
    impl BasketManagement for BasketStore {
        async fn fetch_basket(&self, basket_id: i64) -> Result<Option<BasketSnapshot>, PaymentGatewayError>;
        async fn create_basket(&self, basket: NewBasket) -> Result<Basket, PaymentGatewayError>;
        async fn add_basket_line(&self, line: NewBasketLine) -> Result<BasketLine, PaymentGatewayError>;
        async fn update_basket_status(&self, basket_id: i64, status: BasketStatus) -> Result<Basket, PaymentGatewayError>;
    }
}
