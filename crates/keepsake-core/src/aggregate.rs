//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::DomainEvent;

/// Trait for aggregate roots whose state changes are expressed as events.
///
/// Keepsake aggregates are never persisted: every event is applied the moment
/// it is raised and then queued so the hosting layer can react to it.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the current version (number of events applied).
    fn version(&self) -> i64;

    /// Apply an event to mutate internal state.
    fn apply(&mut self, event: &Self::Event);

    /// Returns events raised since the last drain.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Removes and returns the queued events, oldest first.
    fn take_uncommitted_events(&mut self) -> Vec<Self::Event>;
}
