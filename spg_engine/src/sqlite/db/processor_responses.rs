use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewProcessorResponse, ProcessorResponseRecord},
    traits::PaymentGatewayError,
};

pub async fn insert_processor_response(
    response: NewProcessorResponse,
    conn: &mut SqliteConnection,
) -> Result<ProcessorResponseRecord, PaymentGatewayError> {
    let record: ProcessorResponseRecord = sqlx::query_as(
        r#"
            INSERT INTO processor_responses (processor_name, transaction_id, basket_id, response)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(response.processor_name)
    .bind(response.transaction_id)
    .bind(response.basket_id)
    .bind(response.response.to_string())
    .fetch_one(conn)
    .await?;
    trace!("🗃️ Processor response #{} recorded for {}", record.id, record.transaction_id);
    Ok(record)
}

/// Basket ids of every audit entry for the transaction, most recent first. Entries without a basket are skipped.
pub async fn basket_ids_for_transaction(
    processor_name: &str,
    transaction_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<i64>, sqlx::Error> {
    let ids = sqlx::query_scalar(
        r#"
            SELECT basket_id FROM processor_responses
            WHERE processor_name = $1 AND transaction_id = $2 AND basket_id IS NOT NULL
            ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(processor_name)
    .bind(transaction_id)
    .fetch_all(conn)
    .await?;
    Ok(ids)
}

pub async fn fetch_responses_for_transaction(
    processor_name: &str,
    transaction_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<ProcessorResponseRecord>, sqlx::Error> {
    let records = sqlx::query_as(
        "SELECT * FROM processor_responses WHERE processor_name = $1 AND transaction_id = $2 ORDER BY id ASC",
    )
    .bind(processor_name)
    .bind(transaction_id)
    .fetch_all(conn)
    .await?;
    Ok(records)
}
