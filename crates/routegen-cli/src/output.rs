//! Output formatting for generated route networks.
//!
//! Text renderings are built as strings so callers decide where they go;
//! JSON goes through serde.

use std::fmt::Write;

use clap::ValueEnum;
use serde::Serialize;

use routegen_lib::{NetworkSummary, RouteCategory, RouteNetwork, RouteSegment};

use crate::terminal::{format_with_separators, ColorPalette};

/// Output format for the `generate` and `render` subcommands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// JSON payload of the `generate` subcommand.
#[derive(Debug, Serialize)]
pub struct GenerateReport<'a> {
    pub summary: NetworkSummary,
    pub network: &'a RouteNetwork,
}

/// Human-readable headline block for a network.
pub fn render_summary(summary: &NetworkSummary, palette: &ColorPalette) -> String {
    let mut buffer = String::new();
    let _ = writeln!(
        buffer,
        "{}Generated {} main, {} trail and {} sea segments{}",
        palette.white_bold,
        summary.main_segments,
        summary.trail_segments,
        summary.sea_segments,
        palette.reset
    );
    let _ = writeln!(
        buffer,
        "Cells with density: {} (max {}, total {})",
        format_with_separators(summary.cells_with_density as u64),
        summary.max_density,
        format_with_separators(summary.total_density)
    );
    buffer
}

/// Summary followed by one line per segment.
pub fn render_network(
    network: &RouteNetwork,
    summary: &NetworkSummary,
    palette: &ColorPalette,
) -> String {
    let mut buffer = render_summary(summary, palette);
    for category in [RouteCategory::Main, RouteCategory::Trail, RouteCategory::Sea] {
        let segments = network.segments(category);
        if segments.is_empty() {
            continue;
        }
        let _ = writeln!(buffer);
        for (index, segment) in segments.iter().enumerate() {
            let _ = writeln!(buffer, "{}", segment_line(index, segment, palette));
        }
    }
    buffer
}

fn segment_line(index: usize, segment: &RouteSegment, palette: &ColorPalette) -> String {
    let chain = segment
        .cells
        .iter()
        .map(|cell| cell.to_string())
        .collect::<Vec<_>>()
        .join(" -> ");
    format!(
        "{}{:<5}{} {}{}: {}{}{} ({} cells)",
        palette.tag(segment.category),
        segment.category.to_string().to_uppercase(),
        palette.reset,
        segment.category.id_prefix(),
        index,
        palette.gray,
        chain,
        palette.reset,
        segment.len()
    )
}
