use anyhow::Result;
use calgrid_core::event::EventId;
use owo_colors::OwoColorize;

use super::Workspace;

pub async fn run(id: String) -> Result<()> {
    let workspace = Workspace::load()?;
    let id = EventId::new(id);
    let (view, event) = workspace.view_of(&id).await?;

    view.delete(&id).await?;
    println!("{} {}", "Deleted".red(), event.title);
    Ok(())
}
