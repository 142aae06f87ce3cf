use anyhow::Result;
use calgrid_core::compositor::{Density, RenderModel};
use calgrid_core::date_range::{self, ViewMode};
use calgrid_core::event::TypeFilter;
use chrono::NaiveDate;
use owo_colors::OwoColorize;

use super::Workspace;
use crate::render::Render;

pub struct ViewOptions {
    pub mode: Option<ViewMode>,
    pub date: Option<NaiveDate>,
    pub density: Option<Density>,
    pub search: Option<String>,
    pub types: TypeFilter,
    pub json: bool,
}

pub async fn run(options: ViewOptions) -> Result<()> {
    let workspace = Workspace::load()?;

    let mut config = workspace.config.view_config();
    if let Some(mode) = options.mode {
        config.mode = mode;
    }
    if let Some(density) = options.density {
        config.density = density;
    }

    let anchor = options.date.unwrap_or_else(date_range::today);
    let mut view = workspace.compositor(config, anchor);
    view.load().await?;
    view.set_filter(options.search.unwrap_or_default(), options.types);

    if options.json {
        let index = view.index();
        let visible = index.filter(&view.filter().text, view.filter().types);
        println!("{}", serde_json::to_string_pretty(visible.events())?);
        return Ok(());
    }

    println!("{}", view.visible_range().to_string().dimmed());
    let output = match view.render() {
        RenderModel::Month(grid) => grid.render(),
        RenderModel::TimeGrid(grid) => grid.render(),
    };
    println!("{}", output);

    Ok(())
}
