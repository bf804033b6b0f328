//! Event sink trait for fire-and-forget notification delivery.

use async_trait::async_trait;

use crate::events::DomainEvent;

/// External notification sink.
///
/// Delivery is best-effort: dispatch happens on detached tasks and the
/// outcome never gates the primary operation. Implementations must not
/// panic on delivery failure.
#[async_trait]
pub trait EventSink: Send + Sync + std::fmt::Debug + 'static {
    /// Deliver a single domain event.
    async fn deliver(&self, event: DomainEvent);
}
