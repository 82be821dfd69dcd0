use std::{collections::BTreeSet, fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{sqlite::SqliteRow, FromRow, Row, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

/// Reads a decimal amount that is stored as TEXT.
fn decimal_column(row: &SqliteRow, column: &str) -> Result<Decimal, sqlx::Error> {
    let value: String = row.try_get(column)?;
    Decimal::from_str(&value)
        .map_err(|e| sqlx::Error::ColumnDecode { index: column.to_string(), source: Box::new(e) })
}

macro_rules! text_enum {
    ($name:ident, $default:ident, [$($variant:ident),+]) => {
        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $($name::$variant => write!(f, stringify!($variant)),)+
                }
            }
        }

        impl FromStr for $name {
            type Err = ConversionError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(stringify!($variant) => Ok(Self::$variant),)+
                    s => Err(ConversionError(format!("Invalid {}: {s}", stringify!($name)))),
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                value.parse().unwrap_or_else(|_| {
                    error!("Invalid {}: {value}. But this conversion cannot fail. Defaulting to {}", stringify!($name), stringify!($default));
                    Self::$default
                })
            }
        }
    };
}

//--------------------------------------     BasketStatus      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
pub enum BasketStatus {
    /// The basket is still being filled
    Open,
    /// The payer has been sent to the payment gateway. The contents may not change.
    Frozen,
    /// An order has been placed for the basket
    Submitted,
}

text_enum!(BasketStatus, Open, [Open, Frozen, Submitted]);

//--------------------------------------        Basket         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Basket {
    pub id: i64,
    pub owner_id: Option<String>,
    pub owner_email: Option<String>,
    /// The order number an order for this basket will carry, e.g. `EDX-100017`
    pub order_number: String,
    pub currency: String,
    pub status: BasketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const DEFAULT_ORDER_PREFIX: &str = "EDX";

#[derive(Debug, Clone)]
pub struct NewBasket {
    pub owner_id: Option<String>,
    pub owner_email: Option<String>,
    pub currency: String,
    /// Prefix of the order number, see [`order_number_for_basket`]
    pub order_prefix: String,
}

impl NewBasket {
    pub fn new(currency: &str) -> Self {
        Self {
            owner_id: None,
            owner_email: None,
            currency: currency.to_string(),
            order_prefix: DEFAULT_ORDER_PREFIX.to_string(),
        }
    }

    pub fn with_order_prefix(mut self, prefix: &str) -> Self {
        self.order_prefix = prefix.to_string();
        self
    }

    pub fn with_owner(mut self, owner_id: &str, email: Option<&str>) -> Self {
        self.owner_id = Some(owner_id.to_string());
        self.owner_email = email.map(String::from);
        self
    }
}

/// Derives a basket's order number from its id, e.g. `EDX-100017` for basket 17 with the `EDX` prefix.
pub fn order_number_for_basket(prefix: &str, basket_id: i64) -> String {
    format!("{prefix}-{}", 100_000 + basket_id)
}

//--------------------------------------      BasketLine       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketLine {
    pub id: i64,
    pub basket_id: i64,
    pub product_title: String,
    /// The stock record SKU. Lines without a stock record have none.
    pub partner_sku: Option<String>,
    pub quantity: i64,
    pub unit_price_incl_tax: Decimal,
    pub is_discountable: bool,
}

impl FromRow<'_, SqliteRow> for BasketLine {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            basket_id: row.try_get("basket_id")?,
            product_title: row.try_get("product_title")?,
            partner_sku: row.try_get("partner_sku")?,
            quantity: row.try_get("quantity")?,
            unit_price_incl_tax: decimal_column(row, "unit_price_incl_tax")?,
            is_discountable: row.try_get("is_discountable")?,
        })
    }
}

impl BasketLine {
    pub fn line_price_incl_tax(&self) -> Decimal {
        self.unit_price_incl_tax * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone)]
pub struct NewBasketLine {
    pub basket_id: i64,
    pub product_title: String,
    pub partner_sku: Option<String>,
    pub quantity: i64,
    pub unit_price_incl_tax: Decimal,
    pub is_discountable: bool,
}

impl NewBasketLine {
    pub fn new(basket_id: i64, product_title: &str, sku: Option<&str>, quantity: i64, unit_price: Decimal) -> Self {
        Self {
            basket_id,
            product_title: product_title.to_string(),
            partner_sku: sku.map(String::from),
            quantity,
            unit_price_incl_tax: unit_price,
            is_discountable: true,
        }
    }

    pub fn not_discountable(mut self) -> Self {
        self.is_discountable = false;
        self
    }
}

//--------------------------------------    BasketSnapshot     ---------------------------------------------------------
/// A basket together with its lines, as read at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketSnapshot {
    pub basket: Basket,
    pub lines: Vec<BasketLine>,
}

impl BasketSnapshot {
    pub fn new(basket: Basket, lines: Vec<BasketLine>) -> Self {
        Self { basket, lines }
    }

    pub fn id(&self) -> i64 {
        self.basket.id
    }

    pub fn order_number(&self) -> &str {
        &self.basket.order_number
    }

    pub fn currency(&self) -> &str {
        &self.basket.currency
    }

    pub fn total_incl_tax(&self) -> Decimal {
        self.lines.iter().map(BasketLine::line_price_incl_tax).sum()
    }

    /// The SKUs of every line that has a stock record.
    pub fn skus(&self) -> BTreeSet<String> {
        self.lines.iter().filter_map(|l| l.partner_sku.clone()).collect()
    }
}

//--------------------------------------   ProcessorResponse   ---------------------------------------------------------
/// One entry in the payment processor audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProcessorResponseRecord {
    pub id: i64,
    pub processor_name: String,
    pub transaction_id: String,
    pub basket_id: Option<i64>,
    #[sqlx(json)]
    pub response: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProcessorResponse {
    pub processor_name: String,
    pub transaction_id: String,
    pub basket_id: Option<i64>,
    pub response: Value,
}

impl NewProcessorResponse {
    pub fn new(processor_name: &str, transaction_id: &str, basket_id: Option<i64>, response: Value) -> Self {
        Self {
            processor_name: processor_name.to_string(),
            transaction_id: transaction_id.to_string(),
            basket_id,
            response,
        }
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
pub enum OrderStatusType {
    /// Payment has been received and the order is being fulfilled
    Open,
    Complete,
    /// At least some of the payment has been refunded
    Refunded,
}

text_enum!(OrderStatusType, Open, [Open, Complete, Refunded]);

//--------------------------------------         Order         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub number: String,
    pub basket_id: i64,
    pub owner_id: Option<String>,
    pub total_incl_tax: Decimal,
    pub currency: String,
    pub status: OrderStatusType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRow<'_, SqliteRow> for Order {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            number: row.try_get("number")?,
            basket_id: row.try_get("basket_id")?,
            owner_id: row.try_get("owner_id")?,
            total_incl_tax: decimal_column(row, "total_incl_tax")?,
            currency: row.try_get("currency")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Everything needed to place an order for a paid basket in one atomic step.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub number: String,
    pub basket_id: i64,
    pub owner_id: Option<String>,
    pub total_incl_tax: Decimal,
    pub currency: String,
    pub source: NewPaymentSource,
}

impl NewOrder {
    pub fn for_basket(basket: &BasketSnapshot, source: NewPaymentSource) -> Self {
        Self {
            number: basket.order_number().to_string(),
            basket_id: basket.id(),
            owner_id: basket.basket.owner_id.clone(),
            total_incl_tax: basket.total_incl_tax(),
            currency: basket.currency().to_string(),
            source,
        }
    }
}

//--------------------------------------     PaymentSource     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSource {
    pub id: i64,
    pub order_id: i64,
    pub source_type: String,
    pub transaction_id: String,
    pub card_number: String,
    pub card_type: String,
    pub currency: String,
    pub amount_allocated: Decimal,
    pub amount_debited: Decimal,
    pub amount_refunded: Decimal,
    pub reference: String,
}

impl FromRow<'_, SqliteRow> for PaymentSource {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            order_id: row.try_get("order_id")?,
            source_type: row.try_get("source_type")?,
            transaction_id: row.try_get("transaction_id")?,
            card_number: row.try_get("card_number")?,
            card_type: row.try_get("card_type")?,
            currency: row.try_get("currency")?,
            amount_allocated: decimal_column(row, "amount_allocated")?,
            amount_debited: decimal_column(row, "amount_debited")?,
            amount_refunded: decimal_column(row, "amount_refunded")?,
            reference: row.try_get("reference")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaymentSource {
    /// The processor name, e.g. `spgateway`
    pub source_type: String,
    /// The gateway's transaction reference (`TradeNo`)
    pub transaction_id: String,
    pub card_number: String,
    pub card_type: String,
    pub amount: Decimal,
}

//--------------------------------------     PaymentEvent      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
pub enum PaymentEventType {
    Paid,
    Refunded,
}

text_enum!(PaymentEventType, Paid, [Paid, Refunded]);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub id: i64,
    pub order_id: i64,
    pub event_type: PaymentEventType,
    pub amount: Decimal,
    pub reference: String,
    pub processor_name: String,
    pub created_at: DateTime<Utc>,
}

impl FromRow<'_, SqliteRow> for PaymentEvent {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            order_id: row.try_get("order_id")?,
            event_type: row.try_get("event_type")?,
            amount: decimal_column(row, "amount")?,
            reference: row.try_get("reference")?,
            processor_name: row.try_get("processor_name")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
