//! Output formatting and persistence for computed views.
//!
//! Supports plain-text tables (comfy-table), JSON envelopes and CSV, either
//! streamed or written to a file.

use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::{Table, presets::ASCII_MARKDOWN};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::debug;

use crate::pipeline::aggregate::AggregationResult;
use crate::pipeline::classify::CategoryMap;
use crate::pipeline::compare::ComparisonResult;
use crate::pipeline::series::{SeriesMode, YearPoint};
use crate::record::Record;
use crate::views::AthleteListing;

/// Printed in place of any table with no rows.
pub const EMPTY_MESSAGE: &str = "No data for this selection.";

/// JSON envelope for one rendered view.
#[derive(Serialize)]
pub struct Report<'a, T: Serialize> {
    pub generated_at: DateTime<Utc>,
    pub view: &'a str,
    pub data: &'a T,
}

/// Writes `data` as pretty-printed JSON wrapped in a [`Report`].
pub fn write_json<W: Write, T: Serialize>(out: &mut W, view: &str, data: &T) -> Result<()> {
    let report = Report {
        generated_at: Utc::now(),
        view,
        data,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

/// How count tables are laid out for a terminal or a pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Aligned text table with a row total column.
    Grid,
    /// Comma separated, header first, no totals.
    Csv,
}

/// Header and body cells of one table.
struct Grid {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn write_grid<W: Write>(out: &mut W, grid: Grid, layout: Layout) -> Result<()> {
    match layout {
        Layout::Grid => {
            if grid.rows.is_empty() {
                return empty(out);
            }
            let mut table = Table::new();
            table.load_preset(ASCII_MARKDOWN).set_header(grid.header);
            for row in grid.rows {
                table.add_row(row);
            }
            writeln!(out, "{table}")?;
        }
        Layout::Csv => {
            let mut writer = WriterBuilder::new().has_headers(false).from_writer(out);
            writer.write_record(&grid.header)?;
            for row in &grid.rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

fn strings(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

fn empty<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "{EMPTY_MESSAGE}")?;
    Ok(())
}

pub fn write_title<W: Write>(out: &mut W, title: &str) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "### {title}")?;
    Ok(())
}

fn table_grid(table: &AggregationResult, with_total: bool) -> Grid {
    let mut header: Vec<String> = table.group_by.iter().map(|f| f.name().to_string()).collect();
    header.extend(table.columns.iter().cloned());
    if with_total {
        header.push("Total".to_string());
    }

    let rows = table
        .rows
        .iter()
        .map(|r| {
            let mut cells = r.key.clone();
            cells.extend(r.counts.iter().map(u64::to_string));
            if with_total {
                cells.push(r.total().to_string());
            }
            cells
        })
        .collect();

    Grid { header, rows }
}

/// Renders a count table with one column per group field and per pivot
/// value. The text grid adds a row total.
pub fn render_table<W: Write>(
    out: &mut W,
    table: &AggregationResult,
    layout: Layout,
) -> Result<()> {
    write_grid(out, table_grid(table, layout == Layout::Grid), layout)
}

/// Renders one row per entity with its percentage for each category.
pub fn render_comparison<W: Write>(
    out: &mut W,
    comparison: &ComparisonResult,
    layout: Layout,
) -> Result<()> {
    let mut header = vec!["Team".to_string()];
    header.extend(comparison.categories.iter().map(|c| format!("{c} %")));
    header.push("Medals".to_string());

    let rows = comparison
        .profiles
        .iter()
        .map(|p| {
            let mut cells = vec![p.entity.clone()];
            cells.extend(p.percentages.iter().map(|v| format!("{v:.1}")));
            cells.push(p.total.to_string());
            cells
        })
        .collect();

    write_grid(out, Grid { header, rows }, layout)
}

pub fn render_series<W: Write>(
    out: &mut W,
    series: &[YearPoint],
    mode: SeriesMode,
    layout: Layout,
) -> Result<()> {
    let label = match mode {
        SeriesMode::Count => "Medals",
        SeriesMode::Share => "Share %",
    };
    let header = strings(&["Year", label]);
    let rows = series
        .iter()
        .map(|p| {
            let value = match mode {
                SeriesMode::Count => p.count.to_string(),
                SeriesMode::Share => format!("{:.2}", p.share),
            };
            vec![p.year.to_string(), value]
        })
        .collect();

    write_grid(out, Grid { header, rows }, layout)
}

/// Renders the columns of the listing's kind: a sport listing omits the
/// sport, a year listing the year.
pub fn render_listing<W: Write>(out: &mut W, listing: &AthleteListing<'_>) -> Result<()> {
    let columns = listing.kind.columns();
    let header = columns.iter().map(|f| f.name().to_string()).collect();
    let rows = listing
        .rows
        .iter()
        .map(|r| columns.iter().map(|&f| r.cell(f)).collect())
        .collect();

    write_grid(out, Grid { header, rows }, Layout::Grid)
}

/// Renders up to `limit` records of a display table.
pub fn render_records<W: Write>(out: &mut W, records: &[&Record], limit: usize) -> Result<()> {
    let header = strings(&[
        "Name", "Sex", "Age", "Team", "NOC", "Year", "Sport", "Event", "Medal",
    ]);
    let rows = records
        .iter()
        .take(limit)
        .map(|r| {
            vec![
                r.athlete_name.clone(),
                r.sex.as_str().to_string(),
                r.age.map(|a| a.to_string()).unwrap_or_default(),
                r.team.clone(),
                r.noc.clone(),
                r.year.to_string(),
                r.sport.clone(),
                r.event.clone(),
                r.medal.map(|m| m.as_str()).unwrap_or("").to_string(),
            ]
        })
        .collect();

    write_grid(out, Grid { header, rows }, Layout::Grid)?;
    if records.len() > limit {
        writeln!(out, "... {} more rows", records.len() - limit)?;
    }
    Ok(())
}

/// Renders the sport → category table.
pub fn render_categories<W: Write>(out: &mut W, map: &CategoryMap, layout: Layout) -> Result<()> {
    let header = strings(&["Category", "Sport"]);
    let rows = map
        .entries()
        .into_iter()
        .map(|(sport, category)| vec![category.to_string(), sport.to_string()])
        .collect();

    write_grid(out, Grid { header, rows }, layout)?;
    if layout == Layout::Grid {
        writeln!(out, "Any other sport: {}", map.default_category())?;
    }
    Ok(())
}

/// Renders a single named column, one value per line in either layout.
pub fn render_list<W: Write>(
    out: &mut W,
    column: &str,
    values: &[String],
    layout: Layout,
) -> Result<()> {
    match layout {
        Layout::Grid if values.is_empty() => empty(out),
        Layout::Grid => {
            for value in values {
                writeln!(out, "{value}")?;
            }
            Ok(())
        }
        Layout::Csv => {
            let rows = values.iter().map(|v| vec![v.clone()]).collect();
            write_grid(out, Grid { header: vec![column.to_string()], rows }, layout)
        }
    }
}

/// Writes a count table to a CSV file, replacing any existing file.
pub fn write_table_csv(path: impl AsRef<Path>, table: &AggregationResult) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), rows = table.len(), "Writing CSV table");

    let mut file = File::create(path)?;
    render_table(&mut file, table, Layout::Csv)
}
