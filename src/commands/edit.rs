use anyhow::Result;
use calgrid_core::CalGridError;
use calgrid_core::event::{EventId, EventPatch, EventType};
use owo_colors::OwoColorize;

use super::{Workspace, parse_cli_datetime};
use crate::render::Render;

pub async fn run(
    id: String,
    title: Option<String>,
    start: Option<String>,
    end: Option<String>,
    description: Option<String>,
    event_type: Option<EventType>,
) -> Result<()> {
    let patch = EventPatch {
        title,
        start: start.as_deref().map(parse_cli_datetime).transpose()?,
        end: end.as_deref().map(parse_cli_datetime).transpose()?,
        description: description.map(|d| Some(d).filter(|d| !d.is_empty())),
        event_type,
        ..Default::default()
    };
    if patch.is_empty() {
        anyhow::bail!("Nothing to change. Pass at least one of --title, --start, --end, --description, --type");
    }

    let workspace = Workspace::load()?;
    let id = EventId::new(id);
    let (view, _) = workspace.view_of(&id).await?;

    match view.update(&id, patch).await {
        Ok(updated) => {
            println!("{} {}", "Updated".yellow(), updated.render());
            Ok(())
        }
        Err(e) => {
            if let CalGridError::Validation(v) = &e {
                anyhow::bail!("Invalid {}: {}", v.field(), v);
            }
            Err(e.into())
        }
    }
}
