//! Calendar view and reschedule engine.
//!
//! This crate turns an anchor date and a view mode into a grid of days or
//! time slots, places events into that grid, and handles drag-to-reschedule
//! with optimistic display and rollback:
//! - `date_range` for week, month and slot sets
//! - `index` and `layout` for placing events into cells
//! - `reschedule` for the drag state machine and commit tickets
//! - `compositor` for assembling all of it per view mode and density
//! - `store` for the persistence contract and bundled stores

pub mod compositor;
pub mod config;
pub mod date_range;
pub mod error;
pub mod event;
pub mod index;
pub mod layout;
pub mod reschedule;
pub mod store;

pub use compositor::{Density, RenderModel, ViewCompositor, ViewConfig};
pub use error::{CalGridError, CalGridResult, RescheduleError, ValidationError};
pub use event::{CalendarEvent, EventId, EventPatch, EventType, TypeFilter};
