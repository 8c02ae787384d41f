use std::fmt::Write as _;

use anyhow::{Result, anyhow};

use crate::normalize::{CanonicalTeamStats, Precision, STAT_FIELDS, stat_field};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    First,
    Second,
    Even,
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub column: &'static str,
    pub label: &'static str,
    pub first: Option<f64>,
    pub second: Option<f64>,
    pub edge: Edge,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamComparison {
    pub first_team: String,
    pub second_team: String,
    pub rows: Vec<ComparisonRow>,
}

impl TeamComparison {
    /// Rows where one side leads, counted per side.
    pub fn edge_counts(&self) -> (usize, usize) {
        self.rows.iter().fold((0, 0), |(a, b), row| match row.edge {
            Edge::First => (a + 1, b),
            Edge::Second => (a, b + 1),
            Edge::Even | Edge::Unknown => (a, b),
        })
    }

    pub fn row(&self, column: &str) -> Option<&ComparisonRow> {
        self.rows.iter().find(|r| r.column == column)
    }
}

fn lower_is_better(column: &str) -> bool {
    matches!(column, "losses" | "turnovers")
}

/// Side-by-side rows for two teams. Both records need wins, losses and ppg.
pub fn compare_teams(
    first_team: &str,
    first: &CanonicalTeamStats,
    second_team: &str,
    second: &CanonicalTeamStats,
) -> Result<TeamComparison> {
    for (name, stats) in [(first_team, first), (second_team, second)] {
        if !stats.has_core_fields() {
            return Err(anyhow!("{name} is missing wins, losses or ppg"));
        }
    }

    let rows = STAT_FIELDS
        .iter()
        .map(|field| {
            let a = first.get(field.column);
            let b = second.get(field.column);
            ComparisonRow {
                column: field.column,
                label: field.label,
                first: a,
                second: b,
                edge: edge(a, b, lower_is_better(field.column)),
            }
        })
        .collect();

    Ok(TeamComparison {
        first_team: first_team.to_string(),
        second_team: second_team.to_string(),
        rows,
    })
}

fn edge(a: Option<f64>, b: Option<f64>, lower_wins: bool) -> Edge {
    let (Some(a), Some(b)) = (a, b) else {
        return Edge::Unknown;
    };
    if (a - b).abs() < 1e-9 {
        return Edge::Even;
    }
    if (a > b) != lower_wins {
        Edge::First
    } else {
        Edge::Second
    }
}

pub fn format_stat(column: &str, value: Option<f64>) -> String {
    let Some(value) = value else {
        return "-".to_string();
    };
    match stat_field(column).map(|f| f.precision) {
        Some(Precision::Integer) => format!("{value:.0}"),
        Some(Precision::Decimals(places)) => {
            format!("{value:.prec$}", prec = places.max(0) as usize)
        }
        None => value.to_string(),
    }
}

/// Plain-text table, one metric per line.
pub fn render_table(cmp: &TeamComparison) -> String {
    let w0 = STAT_FIELDS.iter().map(|f| f.label.len()).max().unwrap_or(0);
    let w1 = cmp.first_team.len().max(8);
    let w2 = cmp.second_team.len().max(8);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<w0$}  {:>w1$}  {:>w2$}  Edge",
        "", cmp.first_team, cmp.second_team
    );
    for row in &cmp.rows {
        let edge = match row.edge {
            Edge::First => cmp.first_team.as_str(),
            Edge::Second => cmp.second_team.as_str(),
            Edge::Even => "even",
            Edge::Unknown => "-",
        };
        let _ = writeln!(
            out,
            "{:<w0$}  {:>w1$}  {:>w2$}  {edge}",
            row.label,
            format_stat(row.column, row.first),
            format_stat(row.column, row.second),
        );
    }
    let (a, b) = cmp.edge_counts();
    let _ = writeln!(
        out,
        "\nCategories led: {} {a}, {} {b}",
        cmp.first_team, cmp.second_team
    );
    out
}
