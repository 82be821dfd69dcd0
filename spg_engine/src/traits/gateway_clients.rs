use journal_tools::{JournalApi, JournalApiError, JournalBundle};
use spgateway_tools::{CreditCloseClient, CreditCloseRequest, CreditCloseResponse, SpgatewayError};

/// Executes CreditClose (capture / refund) requests against the payment gateway.
#[allow(async_fn_in_trait)]
pub trait CreditCloser {
    async fn credit_close(&self, request: &CreditCloseRequest) -> Result<CreditCloseResponse, SpgatewayError>;
}

impl CreditCloser for CreditCloseClient {
    async fn credit_close(&self, request: &CreditCloseRequest) -> Result<CreditCloseResponse, SpgatewayError> {
        self.execute(request).await
    }
}

/// A source of journal bundle snapshots.
#[allow(async_fn_in_trait)]
pub trait BundleCatalog {
    async fn fetch_journal_bundle(&self, uuid: &str) -> Result<JournalBundle, JournalApiError>;
}

impl BundleCatalog for JournalApi {
    async fn fetch_journal_bundle(&self, uuid: &str) -> Result<JournalBundle, JournalApiError> {
        JournalApi::fetch_journal_bundle(self, uuid).await
    }
}
