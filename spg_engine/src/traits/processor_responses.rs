use crate::{
    db_types::{NewProcessorResponse, ProcessorResponseRecord},
    traits::PaymentGatewayError,
};

#[allow(async_fn_in_trait)]
pub trait ProcessorResponseManagement {
    /// Appends an entry to the audit trail. Entries are never modified or deleted.
    async fn record_processor_response(
        &self,
        response: NewProcessorResponse,
    ) -> Result<ProcessorResponseRecord, PaymentGatewayError>;

    /// Returns the basket id of every audit entry for `transaction_id` that is linked to a basket, most recent first.
    ///
    /// The same basket id appears once per matching entry, so the length of the result is the number of correlations.
    async fn fetch_baskets_for_transaction(
        &self,
        processor_name: &str,
        transaction_id: &str,
    ) -> Result<Vec<i64>, PaymentGatewayError>;

    /// Returns the audit trail for `transaction_id`, oldest first.
    async fn fetch_processor_responses(
        &self,
        processor_name: &str,
        transaction_id: &str,
    ) -> Result<Vec<ProcessorResponseRecord>, PaymentGatewayError>;
}
