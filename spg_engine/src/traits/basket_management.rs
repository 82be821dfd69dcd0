use crate::{
    db_types::{Basket, BasketLine, BasketSnapshot, BasketStatus, NewBasket, NewBasketLine},
    traits::PaymentGatewayError,
};

#[allow(async_fn_in_trait)]
pub trait BasketManagement {
    /// Fetches the basket, along with all of its lines. Returns `None` if the basket does not exist.
    async fn fetch_basket(&self, basket_id: i64) -> Result<Option<BasketSnapshot>, PaymentGatewayError>;

    /// Creates a new, empty basket. The order number is derived from the new basket id.
    async fn create_basket(&self, basket: NewBasket) -> Result<Basket, PaymentGatewayError>;

    /// Adds a line to an open basket.
    async fn add_basket_line(&self, line: NewBasketLine) -> Result<BasketLine, PaymentGatewayError>;

    /// Sets the basket status, returning the updated basket.
    async fn update_basket_status(&self, basket_id: i64, status: BasketStatus) -> Result<Basket, PaymentGatewayError>;
}
