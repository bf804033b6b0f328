//! Fire-and-forget event dispatch.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use docvault_core::events::DomainEvent;
use docvault_core::traits::notify::EventSink;

/// Dispatches domain events to the configured sink on detached tasks.
///
/// Dispatch never blocks or gates the calling operation; a slow or failing
/// sink only affects its own task.
#[derive(Clone)]
pub struct EventDispatcher {
    sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher").finish()
    }
}

impl EventDispatcher {
    /// Creates a new dispatcher around the given sink.
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    /// Deliver an event on a detached task.
    pub fn dispatch(&self, event: DomainEvent) {
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            sink.deliver(event).await;
        });
    }
}

/// Sink that logs events at debug level.
///
/// Stands in for the platform's notification fan-out, which is outside
/// this system.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

#[async_trait]
impl EventSink for TracingSink {
    async fn deliver(&self, event: DomainEvent) {
        debug!(?event, "Domain event");
    }
}
