use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::ingest::{MatchKey, Session, SessionDate, is_half_label};
use crate::labels::Labels;
use crate::metrics::{ALL_GROUPS, MetricGroup, MetricKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub file_name: String,
    pub date: SessionDate,
    pub match_key: MatchKey,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataRow {
    pub session: usize,
    pub player: Option<String>,
    pub period: Option<u32>,
    pub values: HashMap<MetricKey, f64>,
}

impl DataRow {
    pub fn value(&self, metric: MetricKey) -> Option<f64> {
        self.values.get(&metric).copied()
    }
}

/// All loaded sessions concatenated into one table.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub sessions: Vec<SessionInfo>,
    pub rows: Vec<DataRow>,
    pub columns: BTreeSet<MetricKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HalfFilter {
    #[default]
    All,
    First,
    Second,
}

impl HalfFilter {
    pub fn period(self) -> Option<u32> {
        match self {
            HalfFilter::All => None,
            HalfFilter::First => Some(1),
            HalfFilter::Second => Some(2),
        }
    }

    pub fn next(self) -> Self {
        match self {
            HalfFilter::All => HalfFilter::First,
            HalfFilter::First => HalfFilter::Second,
            HalfFilter::Second => HalfFilter::All,
        }
    }

    pub fn label(self, labels: &Labels) -> &'static str {
        match self {
            HalfFilter::All => labels.all,
            HalfFilter::First => labels.first_half,
            HalfFilter::Second => labels.second_half,
        }
    }

    pub fn from_arg(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "all" | "todos" | "0" => Some(HalfFilter::All),
            "1" | "first" | "1er" => Some(HalfFilter::First),
            "2" | "second" | "2do" => Some(HalfFilter::Second),
            _ => None,
        }
    }
}

/// `None` in either slot means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub match_key: Option<MatchKey>,
    pub half: HalfFilter,
    pub player: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerMeans {
    pub player: String,
    pub values: BTreeMap<MetricKey, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerTotal {
    pub player: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupAverages {
    pub group: MetricGroup,
    pub items: Vec<(MetricKey, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StackedTotal {
    pub player: String,
    pub segments: Vec<(MetricKey, f64)>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadarAxis {
    pub metric: MetricKey,
    pub value: Option<f64>,
    /// Value relative to the best player for this metric, in `0.0..=1.0`.
    pub normalized: f64,
}

impl Dataset {
    pub fn concat(sessions: Vec<Session>) -> Self {
        let mut out = Dataset::default();
        for session in sessions {
            let idx = out.sessions.len();
            out.columns.extend(session.columns.iter().copied());
            out.sessions.push(SessionInfo {
                file_name: session.file_name,
                date: session.date,
                match_key: session.match_key,
                rows: session.rows.len(),
            });
            out.rows.extend(session.rows.into_iter().map(|row| DataRow {
                session: idx,
                player: row.player,
                period: row.period,
                values: row.values,
            }));
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn match_key(&self, row: &DataRow) -> Option<&MatchKey> {
        self.sessions.get(row.session).map(|s| &s.match_key)
    }

    /// Distinct match keys, minus any still carrying a half marker, sorted.
    pub fn match_options(&self) -> Vec<MatchKey> {
        self.sessions
            .iter()
            .map(|s| &s.match_key)
            .filter(|key| !is_half_label(&key.base))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn player_options(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| row.player.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn filter(&self, selection: &Selection) -> Vec<&DataRow> {
        let period = selection.half.period();
        self.rows
            .iter()
            .filter(|row| match &selection.match_key {
                Some(key) => self.match_key(row) == Some(key),
                None => true,
            })
            .filter(|row| period.is_none() || row.period == period)
            .filter(|row| match &selection.player {
                Some(player) => row.player.as_deref() == Some(player.as_str()),
                None => true,
            })
            .collect()
    }

    pub fn report(&self, selection: &Selection) -> Report<'_> {
        let rows = self.filter(selection);
        let date = rows
            .first()
            .and_then(|row| self.sessions.get(row.session))
            .map(|s| s.date.clone())
            .unwrap_or_default();
        let means = player_means(&rows, &self.columns);
        let groups = group_averages(&means, &self.columns);
        tracing::trace!(rows = rows.len(), players = means.len(), "report built");
        Report {
            rows,
            date,
            means,
            groups,
            columns: self.columns.clone(),
        }
    }
}

/// The filtered rows plus everything derived from them for one selection.
#[derive(Debug, Clone)]
pub struct Report<'a> {
    pub rows: Vec<&'a DataRow>,
    pub date: SessionDate,
    pub means: Vec<PlayerMeans>,
    pub groups: Vec<GroupAverages>,
    pub columns: BTreeSet<MetricKey>,
}

impl Report<'_> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every group in card order, including those with nothing to show.
    pub fn card_groups(&self) -> Vec<GroupAverages> {
        all_group_averages(&self.means, &self.columns)
    }

    pub fn totals(&self, metric: MetricKey) -> Vec<PlayerTotal> {
        player_totals(&self.rows, metric)
    }

    pub fn stacked(&self, metrics: &[MetricKey]) -> Vec<StackedTotal> {
        let present = metrics
            .iter()
            .copied()
            .filter(|m| self.columns.contains(m))
            .collect::<Vec<_>>();
        stacked_totals(&self.rows, &present)
    }

    pub fn radar(&self, player: &str, metrics: &[MetricKey]) -> Vec<RadarAxis> {
        let present = metrics
            .iter()
            .copied()
            .filter(|m| self.columns.contains(m))
            .collect::<Vec<_>>();
        radar_profile(&self.means, player, &present)
    }
}

/// Per-player mean of each present metric, skipping missing values. Rows
/// without a player name are dropped.
pub fn player_means(rows: &[&DataRow], columns: &BTreeSet<MetricKey>) -> Vec<PlayerMeans> {
    let mut acc: BTreeMap<&str, BTreeMap<MetricKey, (f64, usize)>> = BTreeMap::new();
    for row in rows {
        let Some(player) = row.player.as_deref() else {
            continue;
        };
        let entry = acc.entry(player).or_default();
        for metric in columns {
            if let Some(value) = row.value(*metric) {
                let slot = entry.entry(*metric).or_insert((0.0, 0));
                slot.0 += value;
                slot.1 += 1;
            }
        }
    }

    acc.into_iter()
        .map(|(player, sums)| PlayerMeans {
            player: player.to_string(),
            values: sums
                .into_iter()
                .filter(|(_, (_, n))| *n > 0)
                .map(|(metric, (sum, n))| (metric, sum / n as f64))
                .collect(),
        })
        .collect()
}

/// Mean over players of their per-player means.
pub fn team_average(means: &[PlayerMeans], metric: MetricKey) -> Option<f64> {
    let values = means
        .iter()
        .filter_map(|m| m.values.get(&metric).copied())
        .collect::<Vec<_>>();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Cards and report lines only show averages that exist and are non-zero.
pub fn displayable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

/// Groups that have at least one displayable average, in card order.
pub fn group_averages(means: &[PlayerMeans], columns: &BTreeSet<MetricKey>) -> Vec<GroupAverages> {
    all_group_averages(means, columns)
        .into_iter()
        .filter(|g| !g.items.is_empty())
        .collect()
}

pub fn all_group_averages(means: &[PlayerMeans], columns: &BTreeSet<MetricKey>) -> Vec<GroupAverages> {
    ALL_GROUPS
        .iter()
        .map(|group| GroupAverages {
            group: *group,
            items: group
                .metrics()
                .iter()
                .copied()
                .filter(|m| columns.contains(m))
                .filter_map(|m| displayable(team_average(means, m)).map(|v| (m, v)))
                .collect(),
        })
        .collect()
}

/// Per-player sum (missing counts as zero), ascending by total then name.
pub fn player_totals(rows: &[&DataRow], metric: MetricKey) -> Vec<PlayerTotal> {
    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    for row in rows {
        let Some(player) = row.player.as_deref() else {
            continue;
        };
        *sums.entry(player).or_insert(0.0) += row.value(metric).unwrap_or(0.0);
    }
    let mut out = sums
        .into_iter()
        .map(|(player, total)| PlayerTotal {
            player: player.to_string(),
            total,
        })
        .collect::<Vec<_>>();
    out.sort_by(|a, b| a.total.total_cmp(&b.total));
    out
}

pub fn stacked_totals(rows: &[&DataRow], metrics: &[MetricKey]) -> Vec<StackedTotal> {
    let mut sums: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for row in rows {
        let Some(player) = row.player.as_deref() else {
            continue;
        };
        let slot = sums
            .entry(player)
            .or_insert_with(|| vec![0.0; metrics.len()]);
        for (idx, metric) in metrics.iter().enumerate() {
            slot[idx] += row.value(*metric).unwrap_or(0.0);
        }
    }
    let mut out = sums
        .into_iter()
        .map(|(player, values)| StackedTotal {
            player: player.to_string(),
            total: values.iter().sum(),
            segments: metrics.iter().copied().zip(values).collect(),
        })
        .collect::<Vec<_>>();
    out.sort_by(|a, b| a.total.total_cmp(&b.total));
    out
}

pub fn radar_profile(means: &[PlayerMeans], player: &str, metrics: &[MetricKey]) -> Vec<RadarAxis> {
    let target = means.iter().find(|m| m.player == player);
    metrics
        .iter()
        .map(|metric| {
            let value = target.and_then(|m| m.values.get(metric).copied());
            let max = means
                .iter()
                .filter_map(|m| m.values.get(metric).copied())
                .fold(f64::NEG_INFINITY, f64::max);
            let normalized = match value {
                Some(v) if max > 0.0 => (v / max).clamp(0.0, 1.0),
                _ => 0.0,
            };
            RadarAxis {
                metric: *metric,
                value,
                normalized,
            }
        })
        .collect()
}
