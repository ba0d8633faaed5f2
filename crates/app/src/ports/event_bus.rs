//! Event bus port — publish/subscribe for domain events.

use std::future::Future;

use boschhub_domain::error::HubError;
use boschhub_domain::event::Event;

/// Outbound side of the event bus.
///
/// Publishing must not fail just because nobody is subscribed.
pub trait EventPublisher {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), HubError>> + Send;
}
