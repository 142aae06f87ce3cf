use std::sync::Arc;

use async_trait::async_trait;
use calgrid_core::compositor::{RenderModel, ViewCompositor, ViewConfig};
use calgrid_core::date_range::DateRange;
use calgrid_core::error::{CalGridError, CalGridResult, RescheduleError};
use calgrid_core::event::{CalendarEvent, EventId, EventPatch};
use calgrid_core::reschedule::{CommitOutcome, PointerButton, PointerDown, RescheduleState};
use calgrid_core::store::{EventStore, MemoryStore};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

const PX: f32 = 20.0;

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
}

fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
    date(d).and_hms_opt(h, m, 0).unwrap()
}

fn persisted(id: &str, title: &str, start: NaiveDateTime) -> CalendarEvent {
    let mut event = CalendarEvent::draft(title, start, start + Duration::hours(1));
    event.id = Some(EventId::new(id));
    event.description = Some(format!("{title} notes"));
    event
}

fn press(id: &str, y: f32) -> PointerDown {
    PointerDown {
        event_id: EventId::new(id),
        button: PointerButton::Primary,
        y,
    }
}

/// Pixels that correspond to `minutes` at the default 15 minute step.
fn pixels_for(minutes: f32) -> f32 {
    minutes / 15.0 * PX
}

async fn setup(events: Vec<CalendarEvent>) -> (ViewCompositor, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::with_events(events));
    let view = ViewCompositor::new(store.clone(), ViewConfig::default(), date(19));
    view.load().await.unwrap();
    (view, store)
}

#[tokio::test]
async fn drag_snaps_to_nearest_slot_and_commits() {
    let (mut view, store) = setup(vec![persisted("a", "Review", at(19, 10, 0))]).await;
    let id = EventId::new("a");

    assert!(view.pointer_down(press("a", 200.0)).unwrap());
    assert_eq!(view.state_of(&id), RescheduleState::Dragging);

    let candidate = view.pointer_move(200.0 + pixels_for(47.0)).unwrap();
    assert_eq!(candidate.start, at(19, 10, 45));
    assert_eq!(candidate.end, at(19, 11, 45));

    // Optimistic display before any store call
    assert_eq!(view.get(&id).unwrap().start, at(19, 10, 45));

    let ticket = view.pointer_up().unwrap();
    assert_eq!(view.state_of(&id), RescheduleState::Committing);
    assert_eq!(view.listeners().count(), 0);

    let outcome = ticket.send().await;
    assert_eq!(outcome.state(), RescheduleState::Idle);
    let CommitOutcome::Committed(saved) = outcome else {
        panic!("commit should succeed");
    };
    assert!(saved.updated_at.is_some());
    assert_eq!(view.get(&id).unwrap(), saved);
    assert_eq!(view.state_of(&id), RescheduleState::Idle);
    assert_eq!(store.snapshot().await[0].start, at(19, 10, 45));
}

#[tokio::test]
async fn zero_delta_drag_is_idempotent() {
    let original = persisted("a", "Review", at(19, 10, 0));
    let (mut view, _) = setup(vec![original.clone()]).await;

    view.pointer_down(press("a", 120.0)).unwrap();
    view.pointer_move(160.0);
    view.pointer_move(121.0);
    let outcome = view.pointer_up().unwrap().send().await;

    let saved = outcome.into_result().unwrap().unwrap();
    assert_eq!(saved.start, original.start);
    assert_eq!(saved.end, original.end);
}

#[tokio::test]
async fn failed_commit_restores_every_field() {
    let original = persisted("a", "Review", at(19, 10, 0));
    let (mut view, store) = setup(vec![original.clone()]).await;
    let id = EventId::new("a");
    let before = view.get(&id).unwrap();

    view.pointer_down(press("a", 0.0)).unwrap();
    view.pointer_move(pixels_for(120.0));
    let ticket = view.pointer_up().unwrap();
    store.fail_next("network unreachable").await;

    let outcome = ticket.send().await;
    assert_eq!(outcome.state(), RescheduleState::RolledBack);
    let CommitOutcome::RolledBack { restored, error } = outcome else {
        panic!("commit should roll back");
    };
    assert!(matches!(error, CalGridError::Persistence(_)));
    assert_eq!(restored, before);
    assert_eq!(view.get(&id).unwrap(), before);
    assert_eq!(view.index().len(), 1);
    assert_eq!(view.state_of(&id), RescheduleState::Idle);
    assert_eq!(view.listeners().count(), 0);
}

#[tokio::test]
async fn event_is_locked_while_committing() {
    let (mut view, _) = setup(vec![
        persisted("a", "Review", at(19, 10, 0)),
        persisted("b", "Lunch", at(19, 12, 0)),
    ])
    .await;

    view.pointer_down(press("a", 0.0)).unwrap();
    view.pointer_move(pixels_for(30.0));
    let first = view.pointer_up().unwrap();

    assert_eq!(
        view.pointer_down(press("a", 0.0)),
        Err(RescheduleError::CommitInFlight("a".to_string()))
    );

    // Other events stay draggable and commit independently
    view.pointer_down(press("b", 0.0)).unwrap();
    view.pointer_move(pixels_for(-60.0));
    let second = view.pointer_up().unwrap();

    assert!(matches!(second.send().await, CommitOutcome::Committed(_)));
    assert!(matches!(first.send().await, CommitOutcome::Committed(_)));

    assert_eq!(view.get(&EventId::new("a")).unwrap().start, at(19, 10, 30));
    assert_eq!(view.get(&EventId::new("b")).unwrap().start, at(19, 11, 0));
    assert!(view.pointer_down(press("a", 0.0)).unwrap());
}

#[tokio::test]
async fn teardown_detaches_listeners_and_ignores_late_commit() {
    let (mut view, store) = setup(vec![
        persisted("a", "Review", at(19, 10, 0)),
        persisted("b", "Lunch", at(19, 12, 0)),
    ])
    .await;
    let listeners = view.listeners();

    view.pointer_down(press("a", 0.0)).unwrap();
    view.pointer_move(pixels_for(15.0));
    let ticket = view.pointer_up().unwrap();

    view.pointer_down(press("b", 0.0)).unwrap();
    assert_eq!(listeners.count(), 2);
    drop(view);
    assert_eq!(listeners.count(), 0);

    assert!(matches!(ticket.send().await, CommitOutcome::Detached));
    // The store still saw the write
    let stored = store.snapshot().await;
    assert_eq!(stored.iter().find(|e| e.title == "Review").unwrap().start, at(19, 10, 15));
}

#[tokio::test]
async fn unsent_ticket_rolls_back() {
    let original = persisted("a", "Review", at(19, 10, 0));
    let (mut view, store) = setup(vec![original.clone()]).await;
    let id = EventId::new("a");

    view.pointer_down(press("a", 0.0)).unwrap();
    view.pointer_move(pixels_for(45.0));
    let ticket = view.pointer_up().unwrap();
    drop(ticket);

    assert_eq!(view.get(&id).unwrap(), original);
    assert_eq!(view.state_of(&id), RescheduleState::Idle);
    assert_eq!(store.calls(), 1);
}

#[tokio::test]
async fn moved_event_renders_in_new_slot_only() {
    let (mut view, _) = setup(vec![persisted("a", "Review", at(19, 10, 0))]).await;

    view.pointer_down(press("a", 0.0)).unwrap();
    view.pointer_move(pixels_for(90.0));
    view.pointer_up().unwrap().send().await;

    let RenderModel::TimeGrid(grid) = view.render() else {
        panic!("week view renders a time grid");
    };
    let column = grid.column(date(19)).unwrap();
    for slot in &column.slots {
        let expected = usize::from(slot.slot.time == NaiveTime::from_hms_opt(11, 30, 0).unwrap());
        assert_eq!(slot.cell.total(), expected, "slot {}", slot.slot);
    }
}

#[tokio::test]
async fn created_event_round_trips_through_list() {
    let (view, store) = setup(vec![]).await;
    let mut draft = view.draft_at(date(20), Some(NaiveTime::from_hms_opt(9, 15, 0).unwrap()));
    draft.title = "Quarterly planning".to_string();
    draft.contact_id = Some("contact-7".to_string());

    let created = view.create(draft.clone()).await.unwrap();
    assert!(!created.is_draft());

    let listed = store.list(view.visible_range()).await.unwrap();
    assert!(listed.iter().any(|e| e.same_user_fields(&draft)));
    assert_eq!(view.get(created.id.as_ref().unwrap()).unwrap(), created);
}

/// Accepts updates, then never answers.
struct StallingStore {
    inner: MemoryStore,
}

#[async_trait]
impl EventStore for StallingStore {
    async fn list(&self, range: DateRange) -> CalGridResult<Vec<CalendarEvent>> {
        self.inner.list(range).await
    }

    async fn create(&self, draft: CalendarEvent) -> CalGridResult<CalendarEvent> {
        self.inner.create(draft).await
    }

    async fn update(&self, id: &EventId, patch: EventPatch) -> CalGridResult<CalendarEvent> {
        let saved = self.inner.update(id, patch).await?;
        std::future::pending::<()>().await;
        Ok(saved)
    }

    async fn delete(&self, id: &EventId) -> CalGridResult<()> {
        self.inner.delete(id).await
    }
}

#[tokio::test]
async fn cancelled_commit_unlocks_without_rolling_back() {
    let store = Arc::new(StallingStore {
        inner: MemoryStore::with_events(vec![persisted("a", "Review", at(19, 10, 0))]),
    });
    let mut view = ViewCompositor::new(store.clone(), ViewConfig::default(), date(19));
    view.load().await.unwrap();
    let id = EventId::new("a");

    view.pointer_down(press("a", 0.0)).unwrap();
    view.pointer_move(pixels_for(30.0));
    let ticket = view.pointer_up().unwrap();

    let cancelled = tokio::time::timeout(std::time::Duration::from_millis(20), ticket.send()).await;
    assert!(cancelled.is_err());

    // The store took the move, so the view keeps showing it
    assert_eq!(store.inner.snapshot().await[0].start, at(19, 10, 30));
    assert_eq!(view.get(&id).unwrap().start, at(19, 10, 30));
    assert_eq!(view.state_of(&id), RescheduleState::Idle);
    assert!(view.pointer_down(press("a", 0.0)).unwrap());
}
