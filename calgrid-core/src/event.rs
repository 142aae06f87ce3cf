//! Calendar event types.
//!
//! `CalendarEvent` is the unit of scheduling. The engine only ever holds the
//! working set for the visible range; durable state belongs to an
//! [`EventStore`](crate::store::EventStore).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Opaque identifier assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        EventId(id.into())
    }

    /// Fresh random id, used by the bundled stores.
    pub fn generate() -> Self {
        EventId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self {
        EventId(s.to_string())
    }
}

/// Closed set of event kinds. Drives default colors and filter grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    #[default]
    Meeting,
    Call,
    Task,
    Note,
    Email,
}

impl EventType {
    pub const ALL: [EventType; 5] = [
        EventType::Meeting,
        EventType::Call,
        EventType::Task,
        EventType::Note,
        EventType::Email,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EventType::Meeting => "meeting",
            EventType::Call => "call",
            EventType::Task => "task",
            EventType::Note => "note",
            EventType::Email => "email",
        }
    }

    /// Hex color used when an event has no explicit color.
    pub fn default_color(self) -> &'static str {
        match self {
            EventType::Meeting => "#3b82f6",
            EventType::Call => "#10b981",
            EventType::Task => "#f59e0b",
            EventType::Note => "#8b5cf6",
            EventType::Email => "#ef4444",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown event type '{}'", s))
    }
}

/// Type half of an index filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(EventType),
}

impl TypeFilter {
    pub fn matches(self, event_type: EventType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(t) => t == event_type,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(TypeFilter::All);
        }
        s.parse().map(TypeFilter::Only)
    }
}

/// A calendar event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// `None` for drafts that the store has not accepted yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default)]
    pub all_day: bool,
    #[serde(rename = "type", default)]
    pub event_type: EventType,
    /// Explicit color override; see [`CalendarEvent::effective_color`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,

    // Provenance, set by the store only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CalendarEvent {
    /// New unsaved event with defaults everywhere except the given fields.
    pub fn draft(title: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        CalendarEvent {
            id: None,
            title: title.into(),
            description: None,
            start,
            end,
            all_day: false,
            event_type: EventType::default(),
            color: None,
            contact_id: None,
            deal_id: None,
            metadata: BTreeMap::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// New unsaved all-day event covering `date`.
    pub fn all_day_draft(title: impl Into<String>, date: NaiveDate) -> Self {
        let start = date.and_time(chrono::NaiveTime::MIN);
        let mut event = Self::draft(title, start, start + Duration::days(1));
        event.all_day = true;
        event
    }

    pub fn is_draft(&self) -> bool {
        self.id.as_ref().is_none_or(|id| id.as_str().is_empty())
    }

    /// Calendar day the event is anchored to.
    pub fn day(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn effective_color(&self) -> &str {
        self.color
            .as_deref()
            .unwrap_or_else(|| self.event_type.default_color())
    }

    /// Check the rules every store enforces.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if !self.all_day && self.end <= self.start {
            return Err(ValidationError::EndNotAfterStart);
        }
        Ok(())
    }

    /// All-day events always span exactly one day from midnight.
    pub fn normalized(mut self) -> Self {
        if self.all_day {
            self.start = self.start.date().and_time(chrono::NaiveTime::MIN);
            self.end = self.start + Duration::days(1);
        }
        self
    }

    /// Return a copy with `patch` applied. Provenance fields are untouched.
    pub fn apply(&self, patch: &EventPatch) -> CalendarEvent {
        let mut next = self.clone();
        if let Some(title) = &patch.title {
            next.title = title.clone();
        }
        if let Some(description) = &patch.description {
            next.description = description.clone();
        }
        if let Some(start) = patch.start {
            next.start = start;
        }
        if let Some(end) = patch.end {
            next.end = end;
        }
        if let Some(all_day) = patch.all_day {
            next.all_day = all_day;
        }
        if let Some(event_type) = patch.event_type {
            next.event_type = event_type;
        }
        if let Some(color) = &patch.color {
            next.color = color.clone();
        }
        if let Some(contact_id) = &patch.contact_id {
            next.contact_id = contact_id.clone();
        }
        if let Some(deal_id) = &patch.deal_id {
            next.deal_id = deal_id.clone();
        }
        if let Some(metadata) = &patch.metadata {
            next.metadata = metadata.clone();
        }
        next.normalized()
    }

    /// True when every field a user can edit matches `other`.
    pub fn same_user_fields(&self, other: &CalendarEvent) -> bool {
        self.title == other.title
            && self.description == other.description
            && self.start == other.start
            && self.end == other.end
            && self.all_day == other.all_day
            && self.event_type == other.event_type
            && self.color == other.color
            && self.contact_id == other.contact_id
            && self.deal_id == other.deal_id
            && self.metadata == other.metadata
    }
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Partial update sent to [`EventStore::update`](crate::store::EventStore::update).
///
/// Outer `None` leaves a field alone; for nullable fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_day: Option<bool>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, serde_json::Value>>,
}

impl EventPatch {
    /// The patch a drag-reschedule sends: only `start` and `end`.
    pub fn reschedule(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        EventPatch {
            start: Some(start),
            end: Some(end),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == EventPatch::default()
    }
}
