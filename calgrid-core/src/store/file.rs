//! JSON file event store.
//!
//! All events live in a single file. Every write goes to a temp file that
//! is renamed over the original, so a crash never leaves a torn file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::{EventStore, accept_draft, accept_patch, in_range, not_found};
use crate::date_range::DateRange;
use crate::error::CalGridResult;
use crate::event::{CalendarEvent, EventId, EventPatch};

pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> CalGridResult<Vec<CalendarEvent>> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(Vec::new());
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    async fn write_all(&self, events: &[CalendarEvent]) -> CalGridResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        let content = serde_json::to_string_pretty(events)?;
        tokio::fs::write(&temp, content).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        debug!(path = %self.path.display(), count = events.len(), "wrote event file");
        Ok(())
    }
}

#[async_trait]
impl EventStore for FileStore {
    async fn list(&self, range: DateRange) -> CalGridResult<Vec<CalendarEvent>> {
        let _guard = self.lock.lock().await;
        let events = self.read_all().await?;
        Ok(in_range(&events, range))
    }

    async fn create(&self, draft: CalendarEvent) -> CalGridResult<CalendarEvent> {
        let event = accept_draft(draft)?;

        let _guard = self.lock.lock().await;
        let mut events = self.read_all().await?;
        events.push(event.clone());
        self.write_all(&events).await?;
        Ok(event)
    }

    async fn update(&self, id: &EventId, patch: EventPatch) -> CalGridResult<CalendarEvent> {
        let _guard = self.lock.lock().await;
        let mut events = self.read_all().await?;

        let pos = events
            .iter()
            .position(|e| e.id.as_ref() == Some(id))
            .ok_or_else(|| not_found(id))?;
        let updated = accept_patch(&events[pos], &patch)?;
        events[pos] = updated.clone();

        self.write_all(&events).await?;
        Ok(updated)
    }

    async fn delete(&self, id: &EventId) -> CalGridResult<()> {
        let _guard = self.lock.lock().await;
        let mut events = self.read_all().await?;

        let before = events.len();
        events.retain(|e| e.id.as_ref() != Some(id));
        if events.len() == before {
            return Err(not_found(id));
        }

        self.write_all(&events).await
    }
}
