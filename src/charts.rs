//! Presentation data for the viewer: card grids, bar entries, stacked bar
//! segments and radar geometry. Everything here is pure so the terminal
//! renderer only draws.

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::aggregate::{GroupAverages, PlayerTotal, RadarAxis, Selection, StackedTotal};
use crate::labels::Language;
use crate::metrics::MetricKey;

pub const CARDS_PER_ROW: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub title: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardSection {
    pub heading: String,
    pub rows: Vec<Vec<Card>>,
}

pub fn card_sections(groups: &[GroupAverages], language: Language) -> Vec<CardSection> {
    let labels = language.labels();
    groups
        .iter()
        .map(|group| {
            let cards = group
                .items
                .iter()
                .map(|(metric, value)| Card {
                    title: metric.label(language).to_string(),
                    value: format_card_value(*value),
                })
                .collect::<Vec<_>>();
            CardSection {
                heading: format!("{} {}", labels.avg_of, group.group.label(language)),
                rows: cards.chunks(CARDS_PER_ROW).map(<[Card]>::to_vec).collect(),
            }
        })
        .collect()
}

pub fn format_card_value(value: f64) -> String {
    format!("{value:.0}")
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarEntry {
    pub label: String,
    /// Tenths, so one decimal survives the integer bar widget.
    pub scaled: u64,
    pub text: String,
}

pub fn bar_entries(totals: &[PlayerTotal]) -> Vec<BarEntry> {
    totals
        .iter()
        .map(|t| BarEntry {
            label: t.player.clone(),
            scaled: (t.total.max(0.0) * 10.0).round() as u64,
            text: format!("{:.1}", t.total),
        })
        .collect()
}

/// Splits each player's stacked total into cell widths scaled against the
/// largest total so the longest bar spans `width` cells.
pub fn stacked_widths(stacked: &[StackedTotal], width: u16) -> Vec<Vec<(MetricKey, u16)>> {
    let max = stacked
        .iter()
        .map(|s| s.total)
        .fold(0.0_f64, f64::max);
    stacked
        .iter()
        .map(|row| {
            row.segments
                .iter()
                .map(|(metric, value)| {
                    let cells = if max > 0.0 {
                        ((value.max(0.0) / max) * f64::from(width)).round() as u16
                    } else {
                        0
                    };
                    (*metric, cells)
                })
                .collect()
        })
        .collect()
}

/// Axis end point for axis `idx` of `count`, starting at twelve o'clock and
/// going clockwise, on a unit circle.
pub fn radar_axis_point(idx: usize, count: usize, radius: f64) -> (f64, f64) {
    if count == 0 {
        return (0.0, 0.0);
    }
    let angle = FRAC_PI_2 - TAU * (idx as f64) / (count as f64);
    (radius * angle.cos(), radius * angle.sin())
}

/// Closed polygon through each axis at its normalized value.
pub fn radar_polygon(axes: &[RadarAxis]) -> Vec<(f64, f64)> {
    let count = axes.len();
    let mut points = axes
        .iter()
        .enumerate()
        .map(|(idx, axis)| radar_axis_point(idx, count, axis.normalized))
        .collect::<Vec<_>>();
    if let Some(first) = points.first().copied() {
        points.push(first);
    }
    points
}

pub fn report_title(selection: &Selection, language: Language) -> String {
    let labels = language.labels();
    let player = selection.player.clone().unwrap_or_default();
    let match_part = selection
        .match_key
        .as_ref()
        .map(|key| format!("| {}", key.display(labels)))
        .unwrap_or_default();
    format!("{} - {} {}", labels.title, player, match_part)
        .trim_end()
        .to_string()
}

pub fn averages_heading(selection: &Selection, language: Language) -> String {
    let labels = language.labels();
    match &selection.player {
        Some(player) => format!("{}: {player}", labels.averages),
        None => labels.averages.to_string(),
    }
}
