pub mod delete;
pub mod edit;
pub mod new;
pub mod reschedule;
pub mod view;

use std::sync::Arc;

use anyhow::{Context, Result};
use calgrid_core::compositor::{ViewCompositor, ViewConfig};
use calgrid_core::config::EngineConfig;
use calgrid_core::date_range::{DateRange, ViewMode};
use calgrid_core::event::{CalendarEvent, EventId};
use calgrid_core::store::{EventStore, FileStore};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Config and store, loaded once per command.
pub struct Workspace {
    pub config: EngineConfig,
    pub store: Arc<dyn EventStore>,
}

impl Workspace {
    pub fn load() -> Result<Self> {
        let config = EngineConfig::load()?;
        let path = config.store_path();
        tracing::debug!(path = %path.display(), "using event store");

        Ok(Workspace {
            store: Arc::new(FileStore::new(path)),
            config,
        })
    }

    pub fn compositor(&self, config: ViewConfig, anchor: NaiveDate) -> ViewCompositor {
        ViewCompositor::new(Arc::clone(&self.store), config, anchor)
    }

    /// A loaded day view around the event with `id`, for commands that
    /// act on a single event.
    pub async fn view_of(&self, id: &EventId) -> Result<(ViewCompositor, CalendarEvent)> {
        let everything = DateRange {
            start: NaiveDateTime::MIN,
            end: NaiveDateTime::MAX,
        };
        let event = self
            .store
            .list(everything)
            .await?
            .into_iter()
            .find(|e| e.id.as_ref() == Some(id))
            .ok_or_else(|| anyhow::anyhow!("Event '{}' not found", id))?;

        let config = ViewConfig {
            mode: ViewMode::Day,
            ..self.config.view_config()
        };
        let view = self.compositor(config, event.day());
        view.load().await?;
        Ok((view, event))
    }
}

/// Parse "2025-03-20T15:00" or "2025-03-20" (midnight).
pub fn parse_cli_datetime(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M") {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        return Ok(dt);
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date/time '{}'. Use YYYY-MM-DD or YYYY-MM-DDTHH:MM", s))?;
    Ok(date.and_time(NaiveTime::MIN))
}

/// Parse a signed offset such as "45m", "-1h 30m" into minutes.
pub fn parse_offset_minutes(s: &str) -> Result<i64> {
    let s = s.trim();
    let (sign, magnitude) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let duration = humantime::parse_duration(magnitude.trim())
        .with_context(|| format!("Invalid offset '{}'. Use e.g. 45m, 1h 30m or -15m", s))?;
    let minutes = i64::try_from(duration.as_secs() / 60).context("Offset too large")?;
    Ok(sign * minutes)
}
