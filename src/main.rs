mod commands;
mod render;

use anyhow::Result;
use calgrid_core::compositor::Density;
use calgrid_core::date_range::ViewMode;
use calgrid_core::event::{EventType, TypeFilter};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "calgrid")]
#[command(about = "View your calendar as a day, week or month grid and reschedule events")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the calendar grid
    View {
        /// day, week or month (defaults to default_mode from config)
        #[arg(short, long)]
        mode: Option<ViewMode>,

        /// Any date inside the period to show (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// standard, compact or ultra-compact
        #[arg(long)]
        density: Option<Density>,

        /// Only show events whose title or description contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Only show events of this type ("all" for every type)
        #[arg(short = 't', long = "type", default_value = "all")]
        types: TypeFilter,

        /// Print the visible events as JSON instead of a grid
        #[arg(long)]
        json: bool,
    },
    /// Create a new event
    New {
        title: String,

        /// Start date/time (e.g., "2025-03-20T15:00" or "2025-03-20")
        #[arg(short, long)]
        start: String,

        /// End date/time (defaults to one hour after start)
        #[arg(short, long)]
        end: Option<String>,

        /// Make this an all-day event
        #[arg(long)]
        all_day: bool,

        #[arg(short = 't', long = "type", default_value = "meeting")]
        event_type: EventType,

        #[arg(long)]
        description: Option<String>,
    },
    /// Change fields of an existing event
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        start: Option<String>,

        #[arg(short, long)]
        end: Option<String>,

        /// New description ("" clears it)
        #[arg(long)]
        description: Option<String>,

        #[arg(short = 't', long = "type")]
        event_type: Option<EventType>,
    },
    /// Shift an event in time the same way dragging it would
    Move {
        id: String,

        /// Offset such as "45m", "1h 30m" or "-15m"; snapped to the slot step
        #[arg(long, allow_hyphen_values = true)]
        by: String,
    },
    /// Delete an event
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::View {
            mode,
            date,
            density,
            search,
            types,
            json,
        } => {
            let options = commands::view::ViewOptions {
                mode,
                date,
                density,
                search,
                types,
                json,
            };
            commands::view::run(options).await
        }
        Commands::New {
            title,
            start,
            end,
            all_day,
            event_type,
            description,
        } => commands::new::run(title, start, end, all_day, event_type, description).await,
        Commands::Edit {
            id,
            title,
            start,
            end,
            description,
            event_type,
        } => commands::edit::run(id, title, start, end, description, event_type).await,
        Commands::Move { id, by } => commands::reschedule::run(id, by).await,
        Commands::Delete { id } => commands::delete::run(id).await,
    }
}
