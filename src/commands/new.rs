use anyhow::Result;
use calgrid_core::event::{CalendarEvent, EventType};
use chrono::Duration;
use owo_colors::OwoColorize;

use super::{Workspace, parse_cli_datetime};
use crate::render::Render;

pub async fn run(
    title: String,
    start: String,
    end: Option<String>,
    all_day: bool,
    event_type: EventType,
    description: Option<String>,
) -> Result<()> {
    let workspace = Workspace::load()?;

    let start = parse_cli_datetime(&start)?;
    let end = match end {
        Some(end) => parse_cli_datetime(&end)?,
        None if all_day => start + Duration::days(1),
        None => start + Duration::hours(1),
    };

    let mut draft = CalendarEvent::draft(title, start, end);
    draft.all_day = all_day;
    draft.event_type = event_type;
    draft.description = description;

    let view = workspace.compositor(workspace.config.view_config(), start.date());
    let created = view.create(draft).await?;

    println!("{} {}", "Created".green(), created.render());
    Ok(())
}
