//! `SqliteDatabase` is a concrete implementation of a payment gateway backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use log::*;
use rust_decimal::Decimal;
use sqlx::{migrate::MigrateError, SqlitePool};

use super::db::{baskets, db_url, new_pool, orders, processor_responses};
use crate::{
    db_types::{
        Basket,
        BasketLine,
        BasketSnapshot,
        BasketStatus,
        NewBasket,
        NewBasketLine,
        NewOrder,
        NewProcessorResponse,
        Order,
        OrderStatusType,
        PaymentEvent,
        PaymentEventType,
        PaymentSource,
        ProcessorResponseRecord,
    },
    traits::{BasketManagement, OrderPlacement, PaymentGatewayDatabase, PaymentGatewayError, ProcessorResponseManagement},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl PaymentGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }
}

impl BasketManagement for SqliteDatabase {
    async fn fetch_basket(&self, basket_id: i64) -> Result<Option<BasketSnapshot>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let Some(basket) = baskets::fetch_basket(basket_id, &mut conn).await? else {
            return Ok(None);
        };
        let lines = baskets::fetch_basket_lines(basket_id, &mut conn).await?;
        Ok(Some(BasketSnapshot::new(basket, lines)))
    }

    async fn create_basket(&self, basket: NewBasket) -> Result<Basket, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let basket = baskets::insert_basket(basket, &mut tx).await?;
        tx.commit().await?;
        Ok(basket)
    }

    async fn add_basket_line(&self, line: NewBasketLine) -> Result<BasketLine, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let basket = baskets::fetch_basket(line.basket_id, &mut tx)
            .await?
            .ok_or(PaymentGatewayError::BasketNotFound(line.basket_id))?;
        if basket.status != BasketStatus::Open {
            warn!("🗃️ Refusing to add a line to basket #{}, since it is {}", basket.id, basket.status);
            return Err(PaymentGatewayError::DatabaseError(format!("Basket #{} is not open", basket.id)));
        }
        let line = baskets::insert_basket_line(line, &mut tx).await?;
        tx.commit().await?;
        Ok(line)
    }

    async fn update_basket_status(&self, basket_id: i64, status: BasketStatus) -> Result<Basket, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let basket = baskets::update_basket_status(basket_id, status, &mut tx)
            .await?
            .ok_or(PaymentGatewayError::BasketNotFound(basket_id))?;
        tx.commit().await?;
        debug!("🗃️ Basket #{basket_id} is now {status}");
        Ok(basket)
    }
}

impl ProcessorResponseManagement for SqliteDatabase {
    async fn record_processor_response(
        &self,
        response: NewProcessorResponse,
    ) -> Result<ProcessorResponseRecord, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let record = processor_responses::insert_processor_response(response, &mut tx).await?;
        tx.commit().await?;
        Ok(record)
    }

    async fn fetch_baskets_for_transaction(
        &self,
        processor_name: &str,
        transaction_id: &str,
    ) -> Result<Vec<i64>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let ids = processor_responses::basket_ids_for_transaction(processor_name, transaction_id, &mut conn).await?;
        Ok(ids)
    }

    async fn fetch_processor_responses(
        &self,
        processor_name: &str,
        transaction_id: &str,
    ) -> Result<Vec<ProcessorResponseRecord>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let records =
            processor_responses::fetch_responses_for_transaction(processor_name, transaction_id, &mut conn).await?;
        Ok(records)
    }
}

impl OrderPlacement for SqliteDatabase {
    async fn place_order(&self, order: NewOrder) -> Result<Order, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let new_order = orders::insert_order(&order, &mut tx).await?;
        let source = orders::insert_payment_source(&new_order, &order.source, &mut tx).await?;
        orders::insert_payment_event(
            new_order.id,
            PaymentEventType::Paid,
            order.source.amount,
            &source.reference,
            &source.source_type,
            &mut tx,
        )
        .await?;
        baskets::update_basket_status(order.basket_id, BasketStatus::Submitted, &mut tx)
            .await?
            .ok_or(PaymentGatewayError::BasketNotFound(order.basket_id))?;
        tx.commit().await?;
        debug!("🗃️ Order [{}] placed for basket #{}", new_order.number, new_order.basket_id);
        Ok(new_order)
    }

    async fn fetch_order_by_number(&self, number: &str) -> Result<Option<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_number(number, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_payment_sources(&self, order_id: i64) -> Result<Vec<PaymentSource>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let sources = orders::fetch_payment_sources(order_id, &mut conn).await?;
        Ok(sources)
    }

    async fn fetch_payment_events(&self, order_id: i64) -> Result<Vec<PaymentEvent>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let events = orders::fetch_payment_events(order_id, &mut conn).await?;
        Ok(events)
    }

    async fn record_refund(
        &self,
        order_number: &str,
        reference: &str,
        amount: Decimal,
        processor_name: &str,
    ) -> Result<Order, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order_by_number(order_number, &mut tx)
            .await?
            .ok_or_else(|| PaymentGatewayError::OrderNotFound(order_number.to_string()))?;
        if orders::add_refunded_amount(order.id, reference, amount, &mut tx).await?.is_none() {
            warn!("🗃️ Order [{order_number}] has no payment source with reference {reference}. Logging the refund anyway.");
        }
        orders::insert_payment_event(order.id, PaymentEventType::Refunded, amount, reference, processor_name, &mut tx)
            .await?;
        let order = orders::update_order_status(order.id, OrderStatusType::Refunded, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Refund of {amount} recorded for order [{order_number}]");
        Ok(order)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date. Migrations that have already been applied are skipped.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&mut self) -> Result<(), PaymentGatewayError> {
        self.pool.close().await;
        Ok(())
    }
}
