use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db_types::Order;

/// Published after an order has been placed for a paid basket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlacedEvent {
    pub order: Order,
    /// The gateway's transaction reference
    pub transaction_id: String,
    pub card_type: String,
}

impl OrderPlacedEvent {
    pub fn new(order: Order, transaction_id: &str, card_type: &str) -> Self {
        Self { order, transaction_id: transaction_id.to_string(), card_type: card_type.to_string() }
    }
}

/// Published after a refund has been accepted by the gateway and logged against the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRefundedEvent {
    pub order: Order,
    pub reference: String,
    pub amount: Decimal,
}

impl OrderRefundedEvent {
    pub fn new(order: Order, reference: &str, amount: Decimal) -> Self {
        Self { order, reference: reference.to_string(), amount }
    }
}
