//! Event persistence.
//!
//! The engine never owns durable state. It talks to an [`EventStore`], which
//! may be a remote API, a local file or the in-memory store used by tests.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::Utc;

use crate::date_range::DateRange;
use crate::error::{CalGridError, CalGridResult};
use crate::event::{CalendarEvent, EventId, EventPatch};

/// Contract for whatever stores events durably.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Events whose start falls within `range` (inclusive).
    async fn list(&self, range: DateRange) -> CalGridResult<Vec<CalendarEvent>>;

    /// Persist a draft. The returned event carries the generated id and
    /// provenance timestamps.
    async fn create(&self, draft: CalendarEvent) -> CalGridResult<CalendarEvent>;

    /// Apply a partial patch to an existing event.
    async fn update(&self, id: &EventId, patch: EventPatch) -> CalGridResult<CalendarEvent>;

    /// Remove an event.
    async fn delete(&self, id: &EventId) -> CalGridResult<()>;
}

/// Validate a draft and stamp it as newly persisted.
pub(crate) fn accept_draft(draft: CalendarEvent) -> CalGridResult<CalendarEvent> {
    let mut event = draft.normalized();
    event.validate()?;

    let now = Utc::now();
    event.id = Some(EventId::generate());
    event.created_at = Some(now);
    event.updated_at = Some(now);
    Ok(event)
}

/// Apply `patch` to `existing`, re-validating and bumping `updated_at`.
pub(crate) fn accept_patch(existing: &CalendarEvent, patch: &EventPatch) -> CalGridResult<CalendarEvent> {
    let mut event = existing.apply(patch);
    event.validate()?;
    event.updated_at = Some(Utc::now());
    Ok(event)
}

pub(crate) fn not_found(id: &EventId) -> CalGridError {
    CalGridError::NotFound(id.to_string())
}

/// Events in `events` starting within `range`, ordered by start.
pub(crate) fn in_range(events: &[CalendarEvent], range: DateRange) -> Vec<CalendarEvent> {
    let mut found: Vec<CalendarEvent> = events
        .iter()
        .filter(|e| range.contains(e.start))
        .cloned()
        .collect();
    found.sort_by_key(|e| e.start);
    found
}
