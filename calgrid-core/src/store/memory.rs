//! In-process event store.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::{EventStore, accept_draft, accept_patch, in_range, not_found};
use crate::date_range::DateRange;
use crate::error::{CalGridError, CalGridResult};
use crate::event::{CalendarEvent, EventId, EventPatch};

/// Keeps events in memory. Failures can be queued to simulate an
/// unreachable backend.
#[derive(Default)]
pub struct MemoryStore {
    events: Mutex<Vec<CalendarEvent>>,
    failures: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with already persisted events.
    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        MemoryStore {
            events: Mutex::new(events),
            ..Default::default()
        }
    }

    /// Make the next call fail with a persistence error.
    pub async fn fail_next(&self, message: &str) {
        self.failures.lock().await.push_back(message.to_string());
    }

    /// Number of calls that reached the store, failed or not.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> Vec<CalendarEvent> {
        self.events.lock().await.clone()
    }

    async fn enter(&self, op: &str) -> CalGridResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.failures.lock().await.pop_front() {
            debug!(op, %message, "memory store injected failure");
            return Err(CalGridError::Persistence(message));
        }
        Ok(())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn list(&self, range: DateRange) -> CalGridResult<Vec<CalendarEvent>> {
        self.enter("list").await?;
        Ok(in_range(&self.events.lock().await, range))
    }

    async fn create(&self, draft: CalendarEvent) -> CalGridResult<CalendarEvent> {
        self.enter("create").await?;
        let event = accept_draft(draft)?;
        self.events.lock().await.push(event.clone());
        Ok(event)
    }

    async fn update(&self, id: &EventId, patch: EventPatch) -> CalGridResult<CalendarEvent> {
        self.enter("update").await?;
        let mut events = self.events.lock().await;
        let slot = events
            .iter_mut()
            .find(|e| e.id.as_ref() == Some(id))
            .ok_or_else(|| not_found(id))?;
        let updated = accept_patch(slot, &patch)?;
        *slot = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: &EventId) -> CalGridResult<()> {
        self.enter("delete").await?;
        let mut events = self.events.lock().await;
        let before = events.len();
        events.retain(|e| e.id.as_ref() != Some(id));
        if events.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }
}
