//! View composition.
//!
//! A [`ViewCompositor`] owns the working set for the visible range and turns
//! it into a [`RenderModel`] for the selected mode and density. It holds no
//! scheduling rules of its own: every calendar variant is the same engine
//! with a different [`ViewConfig`].

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::date_range::{self, DateRange, Direction, MONTH_GRID_DAYS, SlotWindow, TimeSlot, ViewMode};
use crate::error::{CalGridError, CalGridResult, RescheduleError};
use crate::event::{CalendarEvent, EventId, EventPatch, TypeFilter};
use crate::index::EventIndex;
use crate::layout::{self, CellLayout};
use crate::reschedule::{
    CommitTicket, PointerDown, PointerListeners, RescheduleController, RescheduleState,
    SharedWorkingSet, WorkingSet, lock,
};
use crate::store::EventStore;

/// Length of a draft created by double-clicking an empty cell.
pub const DRAFT_DURATION_MINUTES: i64 = 60;

/// Visual density preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Density {
    #[default]
    Standard,
    Compact,
    UltraCompact,
}

impl Density {
    /// Events shown in a month day cell before "+N more".
    pub fn month_max_visible(self) -> usize {
        match self {
            Density::Standard => 3,
            Density::Compact => 2,
            Density::UltraCompact => 1,
        }
    }

    /// Events shown in a single time slot before "+N more".
    pub fn slot_max_visible(self) -> usize {
        match self {
            Density::Standard => 3,
            Density::Compact => 2,
            Density::UltraCompact => 1,
        }
    }

    pub fn pixels_per_slot(self) -> f32 {
        match self {
            Density::Standard => 20.0,
            Density::Compact => 14.0,
            Density::UltraCompact => 10.0,
        }
    }
}

impl fmt::Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Density::Standard => "standard",
            Density::Compact => "compact",
            Density::UltraCompact => "ultra-compact",
        };
        f.write_str(name)
    }
}

impl FromStr for Density {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Density::Standard),
            "compact" => Ok(Density::Compact),
            "ultra-compact" | "ultracompact" => Ok(Density::UltraCompact),
            other => Err(format!(
                "Unknown density '{}'. Expected standard, compact or ultra-compact",
                other
            )),
        }
    }
}

/// Everything that distinguishes one calendar variant from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewConfig {
    pub mode: ViewMode,
    pub density: Density,
    pub window: SlotWindow,
}

/// Text and type filter applied on top of the working set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub text: String,
    pub types: TypeFilter,
}

impl EventFilter {
    pub fn is_active(&self) -> bool {
        !self.text.trim().is_empty() || self.types != TypeFilter::All
    }
}

/// Renderable output of a compositor.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderModel {
    Month(MonthGrid),
    TimeGrid(TimeGrid),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthGrid {
    pub anchor: NaiveDate,
    /// Six rows of seven days, Monday first.
    pub weeks: Vec<Vec<DayCell>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    pub date: NaiveDate,
    /// False for the leading and trailing days of neighbouring months.
    pub in_month: bool,
    pub cell: CellLayout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    pub slots: Vec<TimeSlot>,
    pub columns: Vec<DayColumn>,
    pub pixels_per_slot: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayColumn {
    pub date: NaiveDate,
    pub all_day: CellLayout,
    /// Timed events that start before the working window and run into it,
    /// clipped to the window.
    pub carried_in: CellLayout,
    pub slots: Vec<SlotCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotCell {
    pub slot: TimeSlot,
    pub cell: CellLayout,
}

impl TimeGrid {
    pub fn column(&self, date: NaiveDate) -> Option<&DayColumn> {
        self.columns.iter().find(|c| c.date == date)
    }
}

impl DayColumn {
    pub fn slot(&self, time: NaiveTime) -> Option<&SlotCell> {
        self.slots.iter().find(|s| s.slot.time == time)
    }
}

impl MonthGrid {
    pub fn day(&self, date: NaiveDate) -> Option<&DayCell> {
        self.weeks.iter().flatten().find(|d| d.date == date)
    }
}

/// One calendar view over a store.
pub struct ViewCompositor {
    config: ViewConfig,
    anchor: NaiveDate,
    filter: EventFilter,
    store: Arc<dyn EventStore>,
    working: SharedWorkingSet,
    controller: RescheduleController,
}

impl ViewCompositor {
    pub fn new(store: Arc<dyn EventStore>, config: ViewConfig, anchor: NaiveDate) -> Self {
        let step = config.window.step_minutes;
        ViewCompositor {
            config,
            anchor,
            filter: EventFilter::default(),
            store,
            working: Arc::new(Mutex::new(WorkingSet::new(EventIndex::build(Vec::new(), step)))),
            controller: RescheduleController::new(step, config.density.pixels_per_slot()),
        }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.config.mode = mode;
    }

    pub fn set_density(&mut self, density: Density) {
        self.config.density = density;
        self.controller
            .set_geometry(self.config.window.step_minutes, density.pixels_per_slot());
    }

    /// Change the working window, re-bucketing the index for the new step.
    pub fn set_window(&mut self, window: SlotWindow) -> CalGridResult<()> {
        window.validate()?;
        self.config.window = window;
        self.controller
            .set_geometry(window.step_minutes, self.config.density.pixels_per_slot());
        let mut working = lock(&self.working);
        let next = working.index.with_step(window.step_minutes);
        working.replace(next);
        Ok(())
    }

    // --- navigation: only the anchor moves ---

    pub fn previous(&mut self) {
        self.anchor = self.config.mode.navigate(self.anchor, Direction::Previous);
    }

    pub fn next(&mut self) {
        self.anchor = self.config.mode.navigate(self.anchor, Direction::Next);
    }

    pub fn today(&mut self) {
        self.anchor = date_range::today();
    }

    pub fn visible_dates(&self) -> Vec<NaiveDate> {
        self.config.mode.visible_dates(self.anchor)
    }

    pub fn visible_range(&self) -> DateRange {
        let dates = self.visible_dates();
        // visible_dates is never empty
        DateRange::covering(&dates).unwrap_or(DateRange {
            start: self.anchor.and_time(NaiveTime::MIN),
            end: self.anchor.and_time(NaiveTime::MIN) + Duration::days(1),
        })
    }

    // --- working set ---

    /// Current index snapshot, unfiltered.
    pub fn index(&self) -> Arc<EventIndex> {
        Arc::clone(&lock(&self.working).index)
    }

    pub fn get(&self, id: &EventId) -> Option<CalendarEvent> {
        self.index().get(id).cloned()
    }

    /// Fetch the visible range from the store and swap in a fresh index.
    ///
    /// On failure the previous index stays in place.
    pub async fn load(&self) -> CalGridResult<usize> {
        let range = self.visible_range();
        let events = self.store.list(range).await?;
        let count = events.len();

        let index = EventIndex::build(events, self.config.window.step_minutes);
        lock(&self.working).replace(index);
        info!(%range, count, "loaded events");
        Ok(count)
    }

    pub fn set_filter(&mut self, text: impl Into<String>, types: TypeFilter) {
        self.filter = EventFilter {
            text: text.into(),
            types,
        };
    }

    pub fn clear_filter(&mut self) {
        self.filter = EventFilter::default();
    }

    fn filtered(&self) -> Arc<EventIndex> {
        let base = self.index();
        if self.filter.is_active() {
            Arc::new(base.filter(&self.filter.text, self.filter.types))
        } else {
            base
        }
    }

    // --- create / update / delete ---

    /// Draft for a double-click on an empty cell: one hour from the slot,
    /// or from the start of the working window for a day cell.
    pub fn draft_at(&self, day: NaiveDate, slot: Option<NaiveTime>) -> CalendarEvent {
        let time = slot.unwrap_or_else(|| {
            NaiveTime::from_hms_opt(self.config.window.start_hour, 0, 0).unwrap_or(NaiveTime::MIN)
        });
        let start = day.and_time(time);
        CalendarEvent::draft(String::new(), start, start + Duration::minutes(DRAFT_DURATION_MINUTES))
    }

    /// Persist a draft and add it to the view.
    pub async fn create(&self, draft: CalendarEvent) -> CalGridResult<CalendarEvent> {
        let draft = draft.normalized();
        draft.validate()?;

        let created = self.store.create(draft).await?;
        let mut working = lock(&self.working);
        let next = working.index.with_replaced(created.clone());
        working.replace(next);
        debug!(event = %created.title, "created event");
        Ok(created)
    }

    /// Apply a form edit. On any failure the view keeps the original.
    pub async fn update(&self, id: &EventId, patch: EventPatch) -> CalGridResult<CalendarEvent> {
        let current = self.editable(id)?;
        current.apply(&patch).validate()?;

        let updated = self.store.update(id, patch).await?;
        lock(&self.working).replace_event(updated.clone());
        debug!(event = %id, "updated event");
        Ok(updated)
    }

    /// Delete an event and drop it from the view once the store confirms.
    pub async fn delete(&self, id: &EventId) -> CalGridResult<()> {
        self.editable(id)?;
        self.store.delete(id).await?;

        let mut working = lock(&self.working);
        let next = working.index.without(id);
        working.replace(next);
        debug!(event = %id, "deleted event");
        Ok(())
    }

    fn editable(&self, id: &EventId) -> CalGridResult<CalendarEvent> {
        if self.controller.dragging(id) || lock(&self.working).in_flight.contains(id) {
            return Err(RescheduleError::CommitInFlight(id.to_string()).into());
        }
        self.get(id).ok_or_else(|| CalGridError::NotFound(id.to_string()))
    }

    // --- drag to reschedule ---

    pub fn listeners(&self) -> PointerListeners {
        self.controller.listeners().clone()
    }

    /// State of the gesture controller itself.
    pub fn gesture_state(&self) -> RescheduleState {
        self.controller.state()
    }

    /// Per-event view of the reschedule state machine.
    pub fn state_of(&self, id: &EventId) -> RescheduleState {
        if self.controller.dragging(id) {
            RescheduleState::Dragging
        } else if lock(&self.working).in_flight.contains(id) {
            RescheduleState::Committing
        } else {
            RescheduleState::Idle
        }
    }

    /// Pointer pressed on an event. `Ok(false)` when the input is ignored.
    pub fn pointer_down(&mut self, input: PointerDown) -> Result<bool, RescheduleError> {
        let event = {
            let working = lock(&self.working);
            if working.in_flight.contains(&input.event_id) {
                return Err(RescheduleError::CommitInFlight(input.event_id.to_string()));
            }
            working
                .index
                .get(&input.event_id)
                .cloned()
                .ok_or_else(|| RescheduleError::UnknownEvent(input.event_id.to_string()))?
        };
        self.controller.pointer_down(&event, input.button, input.y)
    }

    /// Pointer moved. Shows the candidate in place of the original.
    pub fn pointer_move(&mut self, y: f32) -> Option<CalendarEvent> {
        let (candidate, changed) = self.controller.pointer_move(y)?;
        let candidate = candidate.clone();
        if changed {
            lock(&self.working).replace_event(candidate.clone());
        }
        Some(candidate)
    }

    /// Pointer released. The candidate stays on screen and the event is
    /// locked until the returned ticket is sent.
    pub fn pointer_up(&mut self) -> Option<CommitTicket> {
        let release = self.controller.pointer_up()?;
        let id = release.original.id.clone()?;

        let mut working = lock(&self.working);
        working.in_flight.insert(id.clone());
        working.replace_event(release.candidate.clone());
        drop(working);

        debug!(event = %id, "commit pending");
        Some(CommitTicket::new(id, release, Arc::clone(&self.store), &self.working))
    }

    /// Abandon any active gesture and restore the dragged event.
    pub fn teardown(&mut self) {
        if let Some(original) = self.controller.cancel() {
            debug!(event = %original.title, "gesture cancelled on teardown");
            lock(&self.working).replace_event(original);
        }
    }

    // --- rendering ---

    pub fn render(&self) -> RenderModel {
        let index = self.filtered();
        match self.config.mode {
            ViewMode::Month => RenderModel::Month(self.render_month(&index)),
            ViewMode::Week | ViewMode::Day => RenderModel::TimeGrid(self.render_time_grid(&index)),
        }
    }

    fn render_month(&self, index: &EventIndex) -> MonthGrid {
        let max_visible = self.config.density.month_max_visible();
        let dates = date_range::month_grid(self.anchor);
        debug_assert_eq!(dates.len(), MONTH_GRID_DAYS);

        let cells: Vec<DayCell> = dates
            .into_iter()
            .map(|date| DayCell {
                date,
                in_month: same_month(date, self.anchor),
                cell: layout::layout(&index.query_day(date), max_visible),
            })
            .collect();

        MonthGrid {
            anchor: self.anchor,
            weeks: cells.chunks(7).map(<[DayCell]>::to_vec).collect(),
        }
    }

    fn render_time_grid(&self, index: &EventIndex) -> TimeGrid {
        let window = self.config.window;
        let density = self.config.density;
        let slots = window.slots();

        let columns = self
            .visible_dates()
            .into_iter()
            .map(|date| DayColumn {
                date,
                all_day: layout::layout(&index.query_all_day(date), density.month_max_visible()),
                carried_in: layout::layout_timed(
                    &carried_into_window(index, date, &window),
                    density.slot_max_visible(),
                    &window,
                ),
                slots: slots
                    .iter()
                    .map(|slot| SlotCell {
                        slot: *slot,
                        cell: layout::layout_timed(
                            &index.query_slot(date, slot.time),
                            density.slot_max_visible(),
                            &window,
                        ),
                    })
                    .collect(),
            })
            .collect();

        TimeGrid {
            slots,
            columns,
            pixels_per_slot: density.pixels_per_slot(),
        }
    }
}

impl Drop for ViewCompositor {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Timed events on `date` that begin before the window opens and are still
/// running when it does. They have no slot row of their own.
fn carried_into_window<'a>(index: &'a EventIndex, date: NaiveDate, window: &SlotWindow) -> Vec<&'a CalendarEvent> {
    let (window_start, _) = window.bounds_on(date);
    index
        .query_day(date)
        .into_iter()
        .filter(|e| !e.all_day && e.start < window_start && e.end > window_start)
        .collect()
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    use chrono::Datelike;
    a.year() == b.year() && a.month() == b.month()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventType;
    use crate::reschedule::PointerButton;
    use crate::store::MemoryStore;
    use chrono::NaiveDateTime;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        date(d).and_hms_opt(h, m, 0).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn persisted(id: &str, title: &str, start: NaiveDateTime) -> CalendarEvent {
        let mut event = CalendarEvent::draft(title, start, start + Duration::hours(1));
        event.id = Some(EventId::new(id));
        event
    }

    async fn week_view(events: Vec<CalendarEvent>) -> (ViewCompositor, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_events(events));
        let view = ViewCompositor::new(store.clone(), ViewConfig::default(), date(19));
        view.load().await.unwrap();
        (view, store)
    }

    #[tokio::test]
    async fn test_week_view_places_event_in_start_slot() {
        let mut meeting = persisted("m", "Pipeline review", at(19, 10, 0));
        meeting.event_type = EventType::Meeting;
        let (view, _) = week_view(vec![meeting]).await;

        let RenderModel::TimeGrid(grid) = view.render() else {
            panic!("week view renders a time grid");
        };
        assert_eq!(grid.columns.len(), 7);

        let wednesday = grid.column(date(19)).unwrap();
        let cell = &wednesday.slot(time(10, 0)).unwrap().cell;
        assert_eq!(cell.visible.len(), 1);
        assert_eq!(cell.visible[0].event.title, "Pipeline review");
        assert_eq!(cell.overflow_label(), None);

        let elsewhere: usize = grid
            .columns
            .iter()
            .flat_map(|c| c.slots.iter())
            .map(|s| s.cell.total())
            .sum();
        assert_eq!(elsewhere, 1);
    }

    #[tokio::test]
    async fn test_month_view_overflow() {
        let events = (0..5)
            .map(|i| persisted(&format!("e{i}"), &format!("Item {i}"), at(19, 9 + i, 0)))
            .collect();
        let (mut view, _) = week_view(events).await;
        view.set_mode(ViewMode::Month);

        let RenderModel::Month(grid) = view.render() else {
            panic!("month view renders a month grid");
        };
        assert_eq!(grid.weeks.len(), 6);
        let day = grid.day(date(19)).unwrap();
        assert!(day.in_month);
        assert_eq!(day.cell.visible.len(), 3);
        assert_eq!(day.cell.overflow, 2);
        assert_eq!(day.cell.visible[0].event.title, "Item 0");

        view.set_density(Density::UltraCompact);
        let RenderModel::Month(grid) = view.render() else {
            panic!("month view renders a month grid");
        };
        assert_eq!(grid.day(date(19)).unwrap().cell.overflow, 4);
    }

    #[tokio::test]
    async fn test_filter_is_a_view_over_the_index() {
        let (mut view, _) = week_view(vec![
            persisted("a", "Call ACME", at(18, 9, 0)),
            persisted("b", "Lunch", at(18, 12, 0)),
        ])
        .await;

        view.set_filter("acme", TypeFilter::All);
        let mut draft = CalendarEvent::draft("Standup", at(18, 9, 0), at(18, 9, 15));
        draft.event_type = EventType::Task;
        view.create(draft).await.unwrap();

        let RenderModel::TimeGrid(grid) = view.render() else {
            panic!("week view renders a time grid");
        };
        let nine = &grid.column(date(18)).unwrap().slot(time(9, 0)).unwrap().cell;
        assert_eq!(nine.visible.len(), 1);

        view.clear_filter();
        assert_eq!(view.index().len(), 3);
        let RenderModel::TimeGrid(grid) = view.render() else {
            panic!("week view renders a time grid");
        };
        let nine = &grid.column(date(18)).unwrap().slot(time(9, 0)).unwrap().cell;
        assert_eq!(nine.visible.len(), 2);
    }

    #[tokio::test]
    async fn test_create_empty_title_never_reaches_store() {
        let (view, store) = week_view(vec![]).await;
        let calls = store.calls();

        let draft = view.draft_at(date(19), Some(time(10, 0)));
        let err = view.create(draft).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.calls(), calls);
        assert!(view.index().is_empty());
    }

    #[tokio::test]
    async fn test_draft_at_slot_and_day() {
        let (view, _) = week_view(vec![]).await;

        let draft = view.draft_at(date(19), Some(time(14, 30)));
        assert!(draft.is_draft());
        assert_eq!(draft.start, at(19, 14, 30));
        assert_eq!(draft.end, at(19, 15, 30));

        let draft = view.draft_at(date(19), None);
        assert_eq!(draft.start, at(19, 8, 0));
        assert_eq!(view.gesture_state(), RescheduleState::Idle);
    }

    #[tokio::test]
    async fn test_failed_form_edit_keeps_original() {
        let original = persisted("a", "Review", at(19, 10, 0));
        let (view, store) = week_view(vec![original.clone()]).await;
        store.fail_next("server unavailable").await;

        let patch = EventPatch {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let err = view.update(&EventId::new("a"), patch).await.unwrap_err();
        assert!(matches!(err, CalGridError::Persistence(_)));
        assert_eq!(view.get(&EventId::new("a")).unwrap(), original);
    }

    #[tokio::test]
    async fn test_delete_removes_from_view() {
        let (view, _) = week_view(vec![persisted("a", "Review", at(19, 10, 0))]).await;
        view.delete(&EventId::new("a")).await.unwrap();
        assert!(view.index().is_empty());
    }

    #[tokio::test]
    async fn test_navigation_leaves_index_alone() {
        let (mut view, _) = week_view(vec![persisted("a", "Review", at(19, 10, 0))]).await;
        let before = view.index();

        view.next();
        assert_eq!(view.anchor(), date(26));
        view.previous();
        assert_eq!(view.anchor(), date(19));
        assert!(Arc::ptr_eq(&before, &view.index()));
    }

    #[tokio::test]
    async fn test_event_running_into_window_is_clipped() {
        let mut early = persisted("e", "Early shift", at(19, 7, 30));
        early.end = at(19, 9, 0);
        let (view, _) = week_view(vec![early, persisted("n", "Night call", at(19, 6, 0))]).await;

        let RenderModel::TimeGrid(grid) = view.render() else {
            panic!("week view renders a time grid");
        };
        let wednesday = grid.column(date(19)).unwrap();

        assert_eq!(wednesday.carried_in.visible.len(), 1);
        let placed = &wednesday.carried_in.visible[0];
        assert_eq!(placed.event.title, "Early shift");
        let extent = placed.extent.unwrap();
        assert_eq!(extent.offset_slots, 0);
        assert_eq!(extent.span_slots, 4);

        // Slot rows still hold only events starting in them
        assert!(wednesday.slots.iter().all(|s| s.cell.is_empty()));
        assert!(wednesday.all_day.is_empty());
    }

    #[tokio::test]
    async fn test_set_window_rebuckets_and_changes_snap() {
        let (mut view, _) = week_view(vec![
            persisted("a", "Review", at(19, 10, 0)),
            persisted("b", "Sync", at(19, 10, 15)),
        ])
        .await;

        let invalid = SlotWindow {
            start_hour: 9,
            end_hour: 9,
            step_minutes: 15,
        };
        assert!(view.set_window(invalid).is_err());
        assert_eq!(view.config().window, SlotWindow::default());

        view.set_window(SlotWindow::new(8, 18, 30).unwrap()).unwrap();
        assert_eq!(view.index().step_minutes(), 30);

        let RenderModel::TimeGrid(grid) = view.render() else {
            panic!("week view renders a time grid");
        };
        let wednesday = grid.column(date(19)).unwrap();
        assert_eq!(wednesday.slots.len(), 20);
        assert_eq!(wednesday.slot(time(10, 0)).unwrap().cell.total(), 2);

        view.pointer_down(PointerDown {
            event_id: EventId::new("a"),
            button: PointerButton::Primary,
            y: 0.0,
        })
        .unwrap();
        let candidate = view.pointer_move(Density::Standard.pixels_per_slot()).unwrap();
        assert_eq!(candidate.start, at(19, 10, 30));
    }

    #[tokio::test]
    async fn test_pointer_move_within_slot_keeps_index() {
        let (mut view, _) = week_view(vec![persisted("a", "Review", at(19, 10, 0))]).await;
        view.pointer_down(PointerDown {
            event_id: EventId::new("a"),
            button: PointerButton::Primary,
            y: 0.0,
        })
        .unwrap();

        view.pointer_move(20.0);
        let shown = view.index();
        assert_eq!(shown.get(&EventId::new("a")).unwrap().start, at(19, 10, 15));

        view.pointer_move(22.0);
        view.pointer_move(18.0);
        assert!(Arc::ptr_eq(&shown, &view.index()));
    }

    #[tokio::test]
    async fn test_edit_refused_while_dragging() {
        let (mut view, _) = week_view(vec![persisted("a", "Review", at(19, 10, 0))]).await;
        view.pointer_down(PointerDown {
            event_id: EventId::new("a"),
            button: PointerButton::Primary,
            y: 0.0,
        })
        .unwrap();

        let err = view.delete(&EventId::new("a")).await.unwrap_err();
        assert!(matches!(err, CalGridError::Reschedule(RescheduleError::CommitInFlight(_))));
    }
}
