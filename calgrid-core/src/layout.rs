//! Stacking order and overflow for a single grid cell.
//!
//! Overlapping timed events are stacked in draw order and never split into
//! side-by-side columns.

use chrono::NaiveDateTime;

use crate::date_range::SlotWindow;
use crate::event::CalendarEvent;

/// Vertical extent of a timed event, in slots from the window start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotExtent {
    pub offset_slots: u32,
    pub span_slots: u32,
}

impl SlotExtent {
    /// Clip `start..end` to `window` on the event's own day.
    ///
    /// Returns `None` when the event lies entirely outside the window.
    pub fn clipped(start: NaiveDateTime, end: NaiveDateTime, window: &SlotWindow) -> Option<Self> {
        let (window_start, window_end) = window.bounds_on(start.date());
        let from = start.max(window_start);
        let to = end.min(window_end);
        if to <= from {
            return None;
        }

        let step = window.step_minutes.max(1) as i64;
        let offset = (from - window_start).num_minutes() / step;
        let minutes = (to - from).num_minutes().max(0);
        let span = ((minutes + step - 1) / step).max(1);

        Some(SlotExtent {
            offset_slots: offset as u32,
            span_slots: span as u32,
        })
    }

    pub fn height_px(&self, pixels_per_slot: f32) -> f32 {
        self.span_slots as f32 * pixels_per_slot
    }
}

/// An event placed in a cell.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedEvent {
    pub event: CalendarEvent,
    /// Set for timed events laid out against a working window.
    pub extent: Option<SlotExtent>,
}

/// Rendering list for one cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellLayout {
    pub visible: Vec<PlacedEvent>,
    /// Events beyond `max_visible`, shown as "+N more".
    pub overflow: usize,
}

impl CellLayout {
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty() && self.overflow == 0
    }

    pub fn total(&self) -> usize {
        self.visible.len() + self.overflow
    }

    pub fn overflow_label(&self) -> Option<String> {
        (self.overflow > 0).then(|| format!("+{} more", self.overflow))
    }
}

/// Order `events` by start then id, keep the first `max_visible`.
pub fn layout(events: &[&CalendarEvent], max_visible: usize) -> CellLayout {
    place(events, max_visible, |_| None)
}

/// Like [`layout`], also computing each timed event's vertical extent.
pub fn layout_timed(events: &[&CalendarEvent], max_visible: usize, window: &SlotWindow) -> CellLayout {
    place(events, max_visible, |event| {
        if event.all_day {
            None
        } else {
            SlotExtent::clipped(event.start, event.end, window)
        }
    })
}

fn place<F>(events: &[&CalendarEvent], max_visible: usize, extent: F) -> CellLayout
where
    F: Fn(&CalendarEvent) -> Option<SlotExtent>,
{
    let mut ordered: Vec<&CalendarEvent> = events.to_vec();
    ordered.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));

    let overflow = ordered.len().saturating_sub(max_visible);
    let visible = ordered
        .into_iter()
        .take(max_visible)
        .map(|event| PlacedEvent {
            extent: extent(event),
            event: event.clone(),
        })
        .collect();

    CellLayout { visible, overflow }
}
