//! Drag-to-reschedule.
//!
//! The gesture runs `Idle -> Dragging -> Committing -> {Idle | RolledBack}`.
//! Move and up listeners exist only while a [`DragSession`] is alive: they
//! are held as [`ListenerGuard`]s inside the session and detach themselves
//! when it is dropped, whichever way the gesture ends.
//!
//! Pointer-up hands back a [`CommitTicket`]. The ticket owns the pending
//! store call and keeps the event locked until it resolves; it only holds a
//! weak handle to the view, so a commit finishing after the view is gone
//! does nothing.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::Duration;
use tracing::{debug, info, warn};

use crate::error::{CalGridError, CalGridResult, RescheduleError};
use crate::event::{CalendarEvent, EventId, EventPatch};
use crate::index::EventIndex;
use crate::store::EventStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RescheduleState {
    Idle,
    Dragging,
    Committing,
    /// Reported by a failed commit; the event is already back to idle.
    RolledBack,
}

impl fmt::Display for RescheduleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RescheduleState::Idle => "idle",
            RescheduleState::Dragging => "dragging",
            RescheduleState::Committing => "committing",
            RescheduleState::RolledBack => "rolled back",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Pointer pressed on a rendered event.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerDown {
    pub event_id: EventId,
    pub button: PointerButton,
    pub y: f32,
}

/// Snap a vertical pointer offset to whole slots, returning minutes.
///
/// `None` for offsets that are not finite or do not fit in an `i64`.
pub fn snap_delta_minutes(delta_y: f32, pixels_per_slot: f32, step_minutes: u32) -> Option<i64> {
    if pixels_per_slot <= 0.0 {
        return Some(0);
    }
    let slots = (delta_y / pixels_per_slot).round();
    if !slots.is_finite() || slots.abs() >= i64::MAX as f32 {
        return None;
    }
    (slots as i64).checked_mul(i64::from(step_minutes))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerKind {
    Move,
    Up,
}

/// Registry of pointer listeners currently attached for a view.
#[derive(Debug, Clone, Default)]
pub struct PointerListeners {
    inner: Arc<Mutex<ListenerTable>>,
}

#[derive(Debug, Default)]
struct ListenerTable {
    next_id: u64,
    attached: Vec<(u64, ListenerKind)>,
}

impl PointerListeners {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, ListenerTable> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attach a listener; it stays attached until the guard is dropped.
    pub fn attach(&self, kind: ListenerKind) -> ListenerGuard {
        let mut table = self.table();
        let id = table.next_id;
        table.next_id += 1;
        table.attached.push((id, kind));
        ListenerGuard {
            listeners: self.clone(),
            id,
        }
    }

    pub fn count(&self) -> usize {
        self.table().attached.len()
    }

    pub fn is_attached(&self, kind: ListenerKind) -> bool {
        self.table().attached.iter().any(|(_, k)| *k == kind)
    }
}

/// An attached listener. Detaches on drop.
#[derive(Debug)]
pub struct ListenerGuard {
    listeners: PointerListeners,
    id: u64,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.listeners.table().attached.retain(|(id, _)| *id != self.id);
    }
}

/// State captured at pointer-down plus the latest candidate.
#[derive(Debug)]
pub struct DragSession {
    original: CalendarEvent,
    candidate: CalendarEvent,
    start_y: f32,
    delta_minutes: i64,
    step_minutes: u32,
    pixels_per_slot: f32,
    _on_move: ListenerGuard,
    _on_up: ListenerGuard,
}

impl DragSession {
    pub fn original(&self) -> &CalendarEvent {
        &self.original
    }

    pub fn candidate(&self) -> &CalendarEvent {
        &self.candidate
    }

    pub fn event_id(&self) -> Option<&EventId> {
        self.original.id.as_ref()
    }
}

/// Result of releasing the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct Release {
    pub original: CalendarEvent,
    pub candidate: CalendarEvent,
}

/// Turns pointer input into a candidate reschedule for one event at a time.
#[derive(Debug)]
pub struct RescheduleController {
    step_minutes: u32,
    pixels_per_slot: f32,
    listeners: PointerListeners,
    session: Option<DragSession>,
}

impl RescheduleController {
    pub fn new(step_minutes: u32, pixels_per_slot: f32) -> Self {
        RescheduleController {
            step_minutes: step_minutes.max(1),
            pixels_per_slot,
            listeners: PointerListeners::new(),
            session: None,
        }
    }

    /// Applies to the next gesture; an active one keeps its own settings.
    pub fn set_geometry(&mut self, step_minutes: u32, pixels_per_slot: f32) {
        self.step_minutes = step_minutes.max(1);
        self.pixels_per_slot = pixels_per_slot;
    }

    pub fn listeners(&self) -> &PointerListeners {
        &self.listeners
    }

    pub fn state(&self) -> RescheduleState {
        if self.session.is_some() {
            RescheduleState::Dragging
        } else {
            RescheduleState::Idle
        }
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn dragging(&self, id: &EventId) -> bool {
        self.session
            .as_ref()
            .and_then(DragSession::event_id)
            .is_some_and(|dragged| dragged == id)
    }

    /// Start dragging `event`.
    ///
    /// Returns `Ok(false)` for input the controller ignores (drafts and
    /// non-primary buttons).
    pub fn pointer_down(
        &mut self,
        event: &CalendarEvent,
        button: PointerButton,
        y: f32,
    ) -> Result<bool, RescheduleError> {
        if self.session.is_some() {
            return Err(RescheduleError::GestureActive);
        }
        if button != PointerButton::Primary || event.is_draft() {
            return Ok(false);
        }

        debug!(event = %event.title, y, "drag started");
        self.session = Some(DragSession {
            original: event.clone(),
            candidate: event.clone(),
            start_y: y,
            delta_minutes: 0,
            step_minutes: self.step_minutes,
            pixels_per_slot: self.pixels_per_slot,
            _on_move: self.listeners.attach(ListenerKind::Move),
            _on_up: self.listeners.attach(ListenerKind::Up),
        });
        Ok(true)
    }

    /// Recompute the candidate for the pointer at `y`.
    ///
    /// Returns the candidate and whether it changed. A position whose shift
    /// cannot be represented keeps the last valid candidate. `None` when no
    /// gesture is active: nothing is listening.
    pub fn pointer_move(&mut self, y: f32) -> Option<(&CalendarEvent, bool)> {
        let session = self.session.as_mut()?;
        let snapped = snap_delta_minutes(y - session.start_y, session.pixels_per_slot, session.step_minutes);
        let Some(delta) = snapped else {
            debug!(y, "pointer offset out of range, keeping last candidate");
            return Some((&session.candidate, false));
        };
        if delta == session.delta_minutes {
            return Some((&session.candidate, false));
        }

        let shifted = Duration::try_minutes(delta).and_then(|shift| {
            let start = session.original.start.checked_add_signed(shift)?;
            let end = session.original.end.checked_add_signed(shift)?;
            Some((start, end))
        });
        match shifted {
            Some((start, end)) => {
                session.delta_minutes = delta;
                session.candidate.start = start;
                session.candidate.end = end;
                Some((&session.candidate, true))
            }
            None => {
                debug!(delta, "shift leaves the calendar range, keeping last candidate");
                Some((&session.candidate, false))
            }
        }
    }

    /// End the gesture with the last candidate. Listeners detach here.
    pub fn pointer_up(&mut self) -> Option<Release> {
        let session = self.session.take()?;
        debug!(delta_minutes = session.delta_minutes, "drag released");
        Some(Release {
            original: session.original,
            candidate: session.candidate,
        })
    }

    /// Abandon any gesture without committing, returning the original event.
    pub fn cancel(&mut self) -> Option<CalendarEvent> {
        self.session.take().map(|session| session.original)
    }
}

/// The working set shared between a view and its in-flight commits.
#[derive(Debug)]
pub(crate) struct WorkingSet {
    pub(crate) index: Arc<EventIndex>,
    pub(crate) in_flight: HashSet<EventId>,
}

impl WorkingSet {
    pub(crate) fn new(index: EventIndex) -> Self {
        WorkingSet {
            index: Arc::new(index),
            in_flight: HashSet::new(),
        }
    }

    /// Swap in a whole new index.
    pub(crate) fn replace(&mut self, index: EventIndex) {
        self.index = Arc::new(index);
    }

    /// Replace the stored copy of `event` if it is still in view.
    pub(crate) fn replace_event(&mut self, event: CalendarEvent) {
        let present = event.id.as_ref().is_some_and(|id| self.index.contains(id));
        if present {
            let next = self.index.with_replaced(event);
            self.replace(next);
        }
    }
}

pub(crate) type SharedWorkingSet = Arc<Mutex<WorkingSet>>;

pub(crate) fn lock(working: &Mutex<WorkingSet>) -> MutexGuard<'_, WorkingSet> {
    working.lock().unwrap_or_else(PoisonError::into_inner)
}

/// How a commit ended.
#[derive(Debug)]
pub enum CommitOutcome {
    /// The store accepted the move; the stored event is now authoritative.
    Committed(CalendarEvent),
    /// The store refused; the pre-drag event is back in the view.
    RolledBack {
        restored: CalendarEvent,
        error: CalGridError,
    },
    /// The view was torn down before the commit resolved.
    Detached,
}

impl CommitOutcome {
    pub fn state(&self) -> RescheduleState {
        match self {
            CommitOutcome::RolledBack { .. } => RescheduleState::RolledBack,
            _ => RescheduleState::Idle,
        }
    }

    pub fn into_result(self) -> CalGridResult<Option<CalendarEvent>> {
        match self {
            CommitOutcome::Committed(event) => Ok(Some(event)),
            CommitOutcome::RolledBack { error, .. } => Err(error),
            CommitOutcome::Detached => Ok(None),
        }
    }
}

/// A dropped event waiting to be sent to the store.
///
/// The event stays locked until the ticket resolves. Dropping an unsent
/// ticket rolls the move back.
#[must_use = "a commit ticket rolls back unless sent"]
pub struct CommitTicket {
    pending: Option<PendingCommit>,
}

struct PendingCommit {
    id: EventId,
    original: CalendarEvent,
    candidate: CalendarEvent,
    store: Arc<dyn EventStore>,
    working: Weak<Mutex<WorkingSet>>,
    /// Set once the store call has been issued; its result is then unknown
    /// if the ticket is dropped mid-flight.
    sent: bool,
}

impl CommitTicket {
    pub(crate) fn new(
        id: EventId,
        release: Release,
        store: Arc<dyn EventStore>,
        working: &SharedWorkingSet,
    ) -> Self {
        CommitTicket {
            pending: Some(PendingCommit {
                id,
                original: release.original,
                candidate: release.candidate,
                store,
                working: Arc::downgrade(working),
                sent: false,
            }),
        }
    }

    /// Send the move to the store and apply the result to the view.
    ///
    /// Cancelling the returned future after the store call has started
    /// unlocks the event but leaves the candidate in place, since the store
    /// may already hold it.
    pub async fn send(mut self) -> CommitOutcome {
        let Some(pending) = self.pending.as_mut() else {
            return CommitOutcome::Detached;
        };
        pending.sent = true;

        let id = pending.id.clone();
        let store = Arc::clone(&pending.store);
        debug!(event = %id, start = %pending.candidate.start, "committing move");
        let patch = EventPatch::reschedule(pending.candidate.start, pending.candidate.end);

        let result = store.update(&id, patch).await;

        match self.pending.take() {
            Some(pending) => pending.resolve(result),
            None => CommitOutcome::Detached,
        }
    }
}

impl Drop for CommitTicket {
    fn drop(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        if pending.sent {
            warn!(event = %pending.id, "commit cancelled in flight, store state unknown");
            pending.unlock();
        } else {
            warn!(event = %pending.id, "commit abandoned before sending");
            let _ = pending.resolve(Err(CalGridError::Persistence(
                "commit abandoned".to_string(),
            )));
        }
    }
}

impl PendingCommit {
    fn unlock(self) {
        if let Some(working) = self.working.upgrade() {
            lock(&working).in_flight.remove(&self.id);
        }
    }

    fn resolve(self, result: CalGridResult<CalendarEvent>) -> CommitOutcome {
        let Some(working) = self.working.upgrade() else {
            debug!(event = %self.id, "view gone, ignoring commit result");
            return CommitOutcome::Detached;
        };
        let mut working = lock(&working);
        working.in_flight.remove(&self.id);

        match result {
            Ok(saved) => {
                info!(event = %self.id, start = %saved.start, "move committed");
                working.replace_event(saved.clone());
                CommitOutcome::Committed(saved)
            }
            Err(error) => {
                warn!(event = %self.id, %error, "move rejected, rolling back");
                working.replace_event(self.original.clone());
                CommitOutcome::RolledBack {
                    restored: self.original,
                    error,
                }
            }
        }
    }
}
