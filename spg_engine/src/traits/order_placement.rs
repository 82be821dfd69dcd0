use rust_decimal::Decimal;

use crate::{
    db_types::{NewOrder, Order, PaymentEvent, PaymentSource},
    traits::PaymentGatewayError,
};

#[allow(async_fn_in_trait)]
pub trait OrderPlacement {
    /// Places the order in a single atomic transaction:
    /// * the order is created,
    /// * the payment source is stored against the order and a `Paid` payment event is logged,
    /// * the basket is marked as `Submitted`.
    ///
    /// If an order with the same number already exists, nothing is changed and
    /// [`PaymentGatewayError::OrderAlreadyExists`] is returned.
    async fn place_order(&self, order: NewOrder) -> Result<Order, PaymentGatewayError>;

    async fn fetch_order_by_number(&self, number: &str) -> Result<Option<Order>, PaymentGatewayError>;

    async fn fetch_payment_sources(&self, order_id: i64) -> Result<Vec<PaymentSource>, PaymentGatewayError>;

    async fn fetch_payment_events(&self, order_id: i64) -> Result<Vec<PaymentEvent>, PaymentGatewayError>;

    /// Atomically logs a `Refunded` payment event for the order, adds `amount` to the refunded total of the payment
    /// source with the given `reference`, and marks the order as `Refunded`.
    async fn record_refund(
        &self,
        order_number: &str,
        reference: &str,
        amount: Decimal,
        processor_name: &str,
    ) -> Result<Order, PaymentGatewayError>;
}
