//! `calgrid move`: a drag gesture driven from the command line.

use anyhow::Result;
use calgrid_core::event::{CalendarEvent, EventId};
use calgrid_core::reschedule::{CommitOutcome, PointerButton, PointerDown};
use chrono::Duration;
use owo_colors::OwoColorize;

use super::{Workspace, parse_offset_minutes};
use crate::render::Render;

pub async fn run(id: String, by: String) -> Result<()> {
    let minutes = parse_offset_minutes(&by)?;
    let workspace = Workspace::load()?;
    let id = EventId::new(id);
    let (mut view, before) = workspace.view_of(&id).await?;
    check_offset(&before, minutes, &by)?;

    // Convert the offset into the pixel distance a pointer would travel
    let config = *view.config();
    let pixels = minutes as f32 / config.window.step_minutes as f32 * config.density.pixels_per_slot();

    let accepted = view.pointer_down(PointerDown {
        event_id: id.clone(),
        button: PointerButton::Primary,
        y: 0.0,
    })?;
    if !accepted {
        anyhow::bail!("Event '{}' cannot be moved", id);
    }
    view.pointer_move(pixels);
    let Some(ticket) = view.pointer_up() else {
        anyhow::bail!("Drag ended before it could be committed");
    };

    match ticket.send().await {
        CommitOutcome::Committed(saved) => {
            if saved.start == before.start {
                println!("{} {}", "Unchanged".dimmed(), saved.render());
            } else {
                println!("{} {}", "Moved".green(), saved.render());
            }
            Ok(())
        }
        CommitOutcome::RolledBack { restored, error } => {
            println!("{} {}", "Kept".yellow(), restored.render());
            Err(error.into())
        }
        CommitOutcome::Detached => Ok(()),
    }
}

/// Refuse offsets that would push the event outside the representable
/// date range.
fn check_offset(event: &CalendarEvent, minutes: i64, by: &str) -> Result<()> {
    let shifted = Duration::try_minutes(minutes).and_then(|shift| {
        event.start.checked_add_signed(shift)?;
        event.end.checked_add_signed(shift)
    });
    if shifted.is_none() {
        anyhow::bail!("Offset '{}' moves the event outside the supported date range", by);
    }
    Ok(())
}
