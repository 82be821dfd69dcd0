use log::{debug, trace};
use rust_decimal::Decimal;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, NewPaymentSource, Order, OrderStatusType, PaymentEvent, PaymentEventType, PaymentSource},
    traits::PaymentGatewayError,
};

/// Inserts a new order using the given connection. This is not atomic. You can embed this call inside a transaction
/// if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
///
/// Order numbers are unique, so inserting a duplicate order fails with [`PaymentGatewayError::OrderAlreadyExists`].
pub async fn insert_order(order: &NewOrder, conn: &mut SqliteConnection) -> Result<Order, PaymentGatewayError> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                number,
                basket_id,
                owner_id,
                total_incl_tax,
                currency,
                status
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(&order.number)
    .bind(order.basket_id)
    .bind(&order.owner_id)
    .bind(order.total_incl_tax.to_string())
    .bind(&order.currency)
    .bind(OrderStatusType::Open.to_string())
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(err) if err.is_unique_violation() => {
            PaymentGatewayError::OrderAlreadyExists(order.number.clone())
        },
        _ => PaymentGatewayError::from(e),
    })?;
    debug!("🗃️ Order [{}] inserted with id {}", order.number, order.id);
    Ok(order)
}

pub async fn fetch_order_by_number(number: &str, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE number = $1").bind(number).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn update_order_status(
    id: i64,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Order, PaymentGatewayError> {
    let order = sqlx::query_as("UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *")
        .bind(status.to_string())
        .bind(id)
        .fetch_one(conn)
        .await?;
    Ok(order)
}

/// Stores the payment source for the order. The full amount is recorded as both allocated and debited.
pub async fn insert_payment_source(
    order: &Order,
    source: &NewPaymentSource,
    conn: &mut SqliteConnection,
) -> Result<PaymentSource, PaymentGatewayError> {
    let source: PaymentSource = sqlx::query_as(
        r#"
            INSERT INTO payment_sources (
                order_id,
                source_type,
                transaction_id,
                card_number,
                card_type,
                currency,
                amount_allocated,
                amount_debited,
                reference
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $7, $3)
            RETURNING *;
        "#,
    )
    .bind(order.id)
    .bind(&source.source_type)
    .bind(&source.transaction_id)
    .bind(&source.card_number)
    .bind(&source.card_type)
    .bind(&order.currency)
    .bind(source.amount.to_string())
    .fetch_one(conn)
    .await?;
    trace!("🗃️ Payment source #{} ({}) saved for order #{}", source.id, source.card_type, order.id);
    Ok(source)
}

pub async fn insert_payment_event(
    order_id: i64,
    event_type: PaymentEventType,
    amount: Decimal,
    reference: &str,
    processor_name: &str,
    conn: &mut SqliteConnection,
) -> Result<PaymentEvent, PaymentGatewayError> {
    let event: PaymentEvent = sqlx::query_as(
        r#"
            INSERT INTO payment_events (order_id, event_type, amount, reference, processor_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(event_type.to_string())
    .bind(amount.to_string())
    .bind(reference)
    .bind(processor_name)
    .fetch_one(conn)
    .await?;
    trace!("🗃️ {event_type} payment event of {amount} logged for order #{order_id}");
    Ok(event)
}

pub async fn fetch_payment_sources(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<PaymentSource>, sqlx::Error> {
    let sources = sqlx::query_as("SELECT * FROM payment_sources WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(sources)
}

pub async fn fetch_payment_events(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<PaymentEvent>, sqlx::Error> {
    let events = sqlx::query_as("SELECT * FROM payment_events WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(events)
}

/// Adds `amount` to the refunded total of the order's payment source with the given reference.
/// Returns the updated source, or `None` if no source matches.
pub async fn add_refunded_amount(
    order_id: i64,
    reference: &str,
    amount: Decimal,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentSource>, PaymentGatewayError> {
    let source: Option<PaymentSource> =
        sqlx::query_as("SELECT * FROM payment_sources WHERE order_id = $1 AND reference = $2")
            .bind(order_id)
            .bind(reference)
            .fetch_optional(&mut *conn)
            .await?;
    let Some(source) = source else {
        return Ok(None);
    };
    let refunded = source.amount_refunded + amount;
    let source = sqlx::query_as("UPDATE payment_sources SET amount_refunded = $1 WHERE id = $2 RETURNING *")
        .bind(refunded.to_string())
        .bind(source.id)
        .fetch_one(conn)
        .await?;
    Ok(Some(source))
}
