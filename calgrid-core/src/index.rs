//! Day and slot lookup over the working set of events.
//!
//! An index is immutable once built. Mutations produce a new index so a
//! reader holding the old one never observes a half-applied change.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};

use crate::date_range::{DEFAULT_STEP_MINUTES, slot_index_for};
use crate::event::{CalendarEvent, EventId, TypeFilter};

/// Events grouped by calendar day and by (day, slot).
#[derive(Debug, Clone)]
pub struct EventIndex {
    /// Insertion order; positions below point into this.
    events: Vec<CalendarEvent>,
    step_minutes: u32,
    by_day: HashMap<NaiveDate, Vec<usize>>,
    by_slot: HashMap<(NaiveDate, u32), Vec<usize>>,
}

impl Default for EventIndex {
    fn default() -> Self {
        EventIndex::build(Vec::new(), DEFAULT_STEP_MINUTES)
    }
}

impl EventIndex {
    /// Group `events` by start day, and timed events also by start slot.
    ///
    /// Each bucket is ordered by `start`, ties kept in insertion order.
    pub fn build(events: Vec<CalendarEvent>, step_minutes: u32) -> Self {
        let step_minutes = step_minutes.max(1);
        let mut by_day: HashMap<NaiveDate, Vec<usize>> = HashMap::new();
        let mut by_slot: HashMap<(NaiveDate, u32), Vec<usize>> = HashMap::new();

        for (pos, event) in events.iter().enumerate() {
            let day = event.day();
            by_day.entry(day).or_default().push(pos);
            if !event.all_day {
                let slot = slot_index_for(event.start.time(), step_minutes);
                by_slot.entry((day, slot)).or_default().push(pos);
            }
        }

        // Stable sort keeps insertion order for equal starts
        for bucket in by_day.values_mut().chain(by_slot.values_mut()) {
            bucket.sort_by_key(|&pos| events[pos].start);
        }

        EventIndex {
            events,
            step_minutes,
            by_day,
            by_slot,
        }
    }

    pub fn step_minutes(&self) -> u32 {
        self.step_minutes
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All events in insertion order.
    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn get(&self, id: &EventId) -> Option<&CalendarEvent> {
        self.events.iter().find(|e| e.id.as_ref() == Some(id))
    }

    pub fn contains(&self, id: &EventId) -> bool {
        self.get(id).is_some()
    }

    /// Every event anchored to `day`, all-day and timed.
    pub fn query_day(&self, day: NaiveDate) -> Vec<&CalendarEvent> {
        self.resolve(self.by_day.get(&day))
    }

    /// Timed events whose start falls in the slot containing `slot_start`.
    pub fn query_slot(&self, day: NaiveDate, slot_start: NaiveTime) -> Vec<&CalendarEvent> {
        let slot = slot_index_for(slot_start, self.step_minutes);
        self.resolve(self.by_slot.get(&(day, slot)))
    }

    /// All-day events anchored to `day`.
    pub fn query_all_day(&self, day: NaiveDate) -> Vec<&CalendarEvent> {
        self.query_day(day).into_iter().filter(|e| e.all_day).collect()
    }

    fn resolve(&self, bucket: Option<&Vec<usize>>) -> Vec<&CalendarEvent> {
        bucket
            .map(|positions| positions.iter().map(|&pos| &self.events[pos]).collect())
            .unwrap_or_default()
    }

    /// Derived index holding only events matching `text` and `types`.
    ///
    /// `text` matches title or description case-insensitively; empty matches
    /// everything. The receiver is left untouched.
    pub fn filter(&self, text: &str, types: TypeFilter) -> EventIndex {
        let needle = text.trim().to_lowercase();
        let kept = self
            .events
            .iter()
            .filter(|e| types.matches(e.event_type))
            .filter(|e| needle.is_empty() || text_matches(e, &needle))
            .cloned()
            .collect();
        EventIndex::build(kept, self.step_minutes)
    }

    /// New index with `event` replacing the entry with the same id, keeping
    /// its position. Appends when the id is not present.
    pub fn with_replaced(&self, event: CalendarEvent) -> EventIndex {
        let mut events = self.events.clone();
        match events
            .iter()
            .position(|e| e.id.is_some() && e.id == event.id)
        {
            Some(pos) => events[pos] = event,
            None => events.push(event),
        }
        EventIndex::build(events, self.step_minutes)
    }

    /// New index without the event `id`.
    pub fn without(&self, id: &EventId) -> EventIndex {
        let events = self
            .events
            .iter()
            .filter(|e| e.id.as_ref() != Some(id))
            .cloned()
            .collect();
        EventIndex::build(events, self.step_minutes)
    }

    /// Same events re-bucketed for a different slot step.
    pub fn with_step(&self, step_minutes: u32) -> EventIndex {
        EventIndex::build(self.events.clone(), step_minutes)
    }
}

fn text_matches(event: &CalendarEvent, needle: &str) -> bool {
    event.title.to_lowercase().contains(needle)
        || event
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}
