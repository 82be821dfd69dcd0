use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{order_number_for_basket, Basket, BasketLine, BasketStatus, NewBasket, NewBasketLine},
    traits::PaymentGatewayError,
};

/// Inserts a new basket and assigns its order number. Run this inside a transaction if the two statements must be
/// atomic.
pub async fn insert_basket(basket: NewBasket, conn: &mut SqliteConnection) -> Result<Basket, PaymentGatewayError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO baskets (owner_id, owner_email, currency, status) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(basket.owner_id)
    .bind(basket.owner_email)
    .bind(basket.currency)
    .bind(BasketStatus::Open.to_string())
    .fetch_one(&mut *conn)
    .await?;
    let order_number = order_number_for_basket(&basket.order_prefix, id);
    let basket = sqlx::query_as("UPDATE baskets SET order_number = $1 WHERE id = $2 RETURNING *")
        .bind(&order_number)
        .bind(id)
        .fetch_one(conn)
        .await?;
    debug!("🗃️ Basket #{id} created with order number {order_number}");
    Ok(basket)
}

pub async fn fetch_basket(id: i64, conn: &mut SqliteConnection) -> Result<Option<Basket>, sqlx::Error> {
    let basket = sqlx::query_as("SELECT * FROM baskets WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(basket)
}

/// Returns the lines of the basket, in the order they were added.
pub async fn fetch_basket_lines(basket_id: i64, conn: &mut SqliteConnection) -> Result<Vec<BasketLine>, sqlx::Error> {
    let lines = sqlx::query_as("SELECT * FROM basket_lines WHERE basket_id = $1 ORDER BY id ASC")
        .bind(basket_id)
        .fetch_all(conn)
        .await?;
    Ok(lines)
}

pub async fn insert_basket_line(
    line: NewBasketLine,
    conn: &mut SqliteConnection,
) -> Result<BasketLine, PaymentGatewayError> {
    let line: BasketLine = sqlx::query_as(
        r#"
            INSERT INTO basket_lines (
                basket_id,
                product_title,
                partner_sku,
                quantity,
                unit_price_incl_tax,
                is_discountable
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(line.basket_id)
    .bind(line.product_title)
    .bind(line.partner_sku)
    .bind(line.quantity)
    .bind(line.unit_price_incl_tax.to_string())
    .bind(line.is_discountable)
    .fetch_one(conn)
    .await?;
    trace!("🗃️ Line #{} added to basket #{}", line.id, line.basket_id);
    Ok(line)
}

pub async fn update_basket_status(
    id: i64,
    status: BasketStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Basket>, sqlx::Error> {
    let basket = sqlx::query_as(
        "UPDATE baskets SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *",
    )
    .bind(status.to_string())
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(basket)
}
