use async_trait::async_trait;
use coaching_store::{errors::StoreError, exchange::CoachingExchange, firestore::FirestoreService};

/// Seam between the HTTP layer and the document store.
///
/// Writes are dispatched from a detached task after the response is produced;
/// implementations must not assume anyone observes their errors beyond logs.
#[async_trait]
pub trait ExchangeSink: Send + Sync {
    /// Appends one exchange record.
    async fn record(&self, exchange: CoachingExchange) -> Result<(), StoreError>;
}

#[async_trait]
impl ExchangeSink for FirestoreService {
    async fn record(&self, exchange: CoachingExchange) -> Result<(), StoreError> {
        self.record_exchange(exchange).await
    }
}
