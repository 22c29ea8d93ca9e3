use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing::info;

use matchday_grader::gameweek::{self, GameweekSelection};
use matchday_grader::report_export::{self, format_rate};

const DEFAULT_PREDICTIONS_DIR: &str = "data/pre_match";

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let dir = arg_value(&args, "--dir")
        .map(PathBuf::from)
        .or_else(|| std::env::var("PREDICTIONS_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PREDICTIONS_DIR));
    let selection = match arg_value(&args, "--week") {
        Some(raw) => GameweekSelection::Week(
            raw.parse::<u32>()
                .with_context(|| format!("invalid --week value {raw:?}"))?,
        ),
        None => GameweekSelection::All,
    };

    let weeks = gameweek::discover_gameweeks(&dir)?;
    if weeks.is_empty() {
        return Err(anyhow!("no weekly match files found in {}", dir.display()));
    }
    info!(
        dir = %dir.display(),
        gameweeks = weeks.len(),
        latest = weeks[0].0,
        "gameweek files discovered"
    );

    let records = gameweek::load_selection(&dir, selection)?;
    let pool = gameweek::build_grading_pool();
    let summary = gameweek::with_grading_pool(&pool, || gameweek::summarize(&records));
    let label = selection.label();

    if summary.overall.total == 0 {
        println!("No valid recommended predictions found for {label}.");
        return Ok(());
    }

    println!("Overall Success Rate ({label})");
    println!(
        "  {}  ({}/{} WINs, {} losses, {} pushes, {} pending)",
        format_rate(summary.overall.success_rate()),
        summary.overall.wins,
        summary.overall.total,
        summary.overall.losses,
        summary.overall.pushes,
        summary.overall.pending,
    );
    println!();
    println!("{:<40} {:>8} {:>9}", "League", "Rate", "Wins");
    for league in &summary.leagues {
        println!(
            "{:<40} {:>8} {:>9}",
            league.key(),
            format_rate(league.tally.success_rate()),
            format!("{}/{}", league.tally.wins, league.tally.total),
        );
    }

    if let Some(out) = arg_value(&args, "--xlsx") {
        let path = PathBuf::from(out);
        let report = report_export::export_success_summary(&path, &label, &summary)?;
        println!();
        println!(
            "Wrote {} leagues ({} graded predictions) to {}",
            report.leagues,
            report.graded,
            path.display()
        );
    }

    Ok(())
}

// Accepts both `--flag=value` and `--flag value`.
fn arg_value(args: &[String], flag: &str) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg
            .strip_prefix(flag)
            .and_then(|rest| rest.strip_prefix('='))
        {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
