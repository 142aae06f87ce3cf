//! Terminal rendering for calgrid render models.
//!
//! Extension traits that turn compositor output into colored text with
//! owo_colors. Widths are computed on plain text before any color is applied.

use calgrid_core::compositor::{DayColumn, MonthGrid, TimeGrid};
use calgrid_core::event::CalendarEvent;
use calgrid_core::layout::CellLayout;
use chrono::Datelike;
use owo_colors::OwoColorize;

const TIME_GUTTER: usize = 6;
const COLUMN_WIDTH: usize = 16;
const MONTH_CELL_WIDTH: usize = 14;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for CalendarEvent {
    fn render(&self) -> String {
        let when = if self.all_day {
            self.start.format("%a %b %-d (all day)").to_string()
        } else {
            format!(
                "{} - {}",
                self.start.format("%a %b %-d %H:%M"),
                self.end.format("%H:%M")
            )
        };
        let id = self.id.as_ref().map(|id| format!("[{}]", id)).unwrap_or_default();

        format!(
            "{} {} {} {}",
            paint(self, &self.title),
            when.dimmed(),
            self.event_type.label().dimmed(),
            id.dimmed()
        )
    }
}

impl Render for TimeGrid {
    fn render(&self) -> String {
        let mut lines = Vec::new();

        let header: Vec<String> = self
            .columns
            .iter()
            .map(|c| fit(&c.date.format("%a %b %-d").to_string(), COLUMN_WIDTH).bold().to_string())
            .collect();
        lines.push(format!("{}{}", " ".repeat(TIME_GUTTER), header.join(" ")));

        if self.columns.iter().any(|c| !c.all_day.is_empty()) {
            let rows = self.columns.iter().map(|c| cell_rows(&c.all_day)).max().unwrap_or(0);
            for row in 0..rows {
                let label = if row == 0 { "all" } else { "" };
                let cells: Vec<String> =
                    self.columns.iter().map(|c| cell_line(&c.all_day, row, COLUMN_WIDTH)).collect();
                lines.push(format!("{}{}", fit(label, TIME_GUTTER).dimmed(), cells.join(" ")));
            }
        }

        for (row, slot) in self.slots.iter().enumerate() {
            let label = if slot.is_hour_start() {
                slot.to_string()
            } else {
                String::new()
            };
            let cells: Vec<String> = self.columns.iter().map(|c| slot_line(c, row)).collect();
            lines.push(format!("{}{}", fit(&label, TIME_GUTTER).dimmed(), cells.join(" ")));
        }

        lines.join("\n")
    }
}

/// One slot row of a day column: the first event starting here (with a
/// count of the others), a bar for an event still running, or blank.
/// Events carried in from before the window head the first row.
fn slot_line(column: &DayColumn, row: usize) -> String {
    let cell = &column.slots[row].cell;
    let head = if row == 0 && cell.is_empty() {
        &column.carried_in
    } else {
        cell
    };
    if let Some(first) = head.visible.first() {
        let others = head.total() - 1;
        if others == 0 {
            return paint(&first.event, &fit(&first.event.title, COLUMN_WIDTH));
        }
        let suffix = format!(" +{}", others);
        let title = fit(&first.event.title, COLUMN_WIDTH.saturating_sub(suffix.len()));
        return format!("{}{}", paint(&first.event, &title), suffix.dimmed());
    }

    let started_above = column.slots[..row].iter().flat_map(|s| &s.cell.visible);
    let running = column.carried_in.visible.iter().chain(started_above).find(|placed| {
        placed.extent.is_some_and(|extent| {
            let row = row as u32;
            row > extent.offset_slots && row < extent.offset_slots + extent.span_slots
        })
    });
    match running {
        Some(placed) => paint(&placed.event, &fit("┆", COLUMN_WIDTH)),
        None => " ".repeat(COLUMN_WIDTH),
    }
}

impl Render for MonthGrid {
    fn render(&self) -> String {
        let mut lines = Vec::new();
        lines.push(self.anchor.format("%B %Y").to_string().bold().to_string());

        let names: Vec<String> = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
            .iter()
            .map(|d| fit(d, MONTH_CELL_WIDTH).dimmed().to_string())
            .collect();
        lines.push(names.join(" "));

        for week in &self.weeks {
            let numbers: Vec<String> = week
                .iter()
                .map(|day| {
                    let number = fit(&day.date.day().to_string(), MONTH_CELL_WIDTH);
                    if day.in_month {
                        number
                    } else {
                        number.dimmed().to_string()
                    }
                })
                .collect();
            lines.push(numbers.join(" "));

            let rows = week.iter().map(|day| cell_rows(&day.cell)).max().unwrap_or(0);
            for row in 0..rows {
                let cells: Vec<String> =
                    week.iter().map(|day| cell_line(&day.cell, row, MONTH_CELL_WIDTH)).collect();
                lines.push(cells.join(" "));
            }
        }

        lines.join("\n")
    }
}

fn cell_rows(cell: &CellLayout) -> usize {
    cell.visible.len() + usize::from(cell.overflow > 0)
}

/// Row `row` of a stacked cell: an event title, the overflow label, or blank.
fn cell_line(cell: &CellLayout, row: usize, width: usize) -> String {
    if let Some(placed) = cell.visible.get(row) {
        return paint(&placed.event, &fit(&placed.event.title, width));
    }
    if row == cell.visible.len()
        && let Some(more) = cell.overflow_label()
    {
        return fit(&more, width).dimmed().to_string();
    }
    " ".repeat(width)
}

/// Color `text` with the event's color, falling back to plain text for
/// colors that are not `#rrggbb`.
fn paint(event: &CalendarEvent, text: &str) -> String {
    match parse_hex(event.effective_color()) {
        Some((r, g, b)) => text.truecolor(r, g, b).to_string(),
        None => text.to_string(),
    }
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Truncate or pad `text` to exactly `width` characters.
fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count > width {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    } else {
        format!("{}{}", text, " ".repeat(width - count))
    }
}
