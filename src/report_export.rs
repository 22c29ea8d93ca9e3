use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::gameweek::{SuccessSummary, Tally};

pub struct ExportReport {
    pub leagues: usize,
    pub graded: usize,
}

/// Writes the overall and per-league success rates to an `.xlsx` workbook.
pub fn export_success_summary(
    path: &Path,
    label: &str,
    summary: &SuccessSummary,
) -> Result<ExportReport> {
    let overview_rows = vec![
        vec!["Selection".to_string(), label.to_string()],
        vec![
            "Generated".to_string(),
            Utc::now().format("%Y-%m-%d %H:%M UTC").to_string(),
        ],
        vec![
            "Success Rate".to_string(),
            format_rate(summary.overall.success_rate()),
        ],
        vec!["Wins".to_string(), summary.overall.wins.to_string()],
        vec!["Losses".to_string(), summary.overall.losses.to_string()],
        vec!["Pushes".to_string(), summary.overall.pushes.to_string()],
        vec!["Pending".to_string(), summary.overall.pending.to_string()],
        vec!["Total".to_string(), summary.overall.total.to_string()],
    ];

    let mut league_rows = vec![vec![
        "Country".to_string(),
        "League".to_string(),
        "Success Rate".to_string(),
        "Wins".to_string(),
        "Losses".to_string(),
        "Pushes".to_string(),
        "Pending".to_string(),
        "Total".to_string(),
    ]];
    for league in &summary.leagues {
        let mut row = vec![league.country.clone(), league.league.clone()];
        row.extend(tally_cells(&league.tally));
        league_rows.push(row);
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Overview")?;
        write_rows(sheet, &overview_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Leagues")?;
        write_rows(sheet, &league_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        leagues: league_rows.len().saturating_sub(1),
        graded: summary.overall.total,
    })
}

pub fn format_rate(rate: f64) -> String {
    format!("{rate:.1}%")
}

fn tally_cells(tally: &Tally) -> Vec<String> {
    vec![
        format_rate(tally.success_rate()),
        tally.wins.to_string(),
        tally.losses.to_string(),
        tally.pushes.to_string(),
        tally.pending.to_string(),
        tally.total.to_string(),
    ]
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
