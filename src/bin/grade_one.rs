use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use matchday_grader::{MatchResult, classify, normalize};

#[derive(Debug, serde::Deserialize)]
struct GradeCase {
    prediction: String,
    #[serde(flatten)]
    result: MatchResult,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/grade_case.json"));

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("read grade case {}", path.display()))?;
    let case: GradeCase = serde_json::from_str(&raw).context("parse grade case")?;

    // Run with RUST_LOG=matchday_grader=trace to see which market claimed it.
    let grade = classify(&case.prediction, &case.result);

    println!("Prediction: {}", case.prediction);
    println!("Normalized: {}", normalize(&case.prediction));
    println!(
        "Match:      {} {} - {} {}",
        case.result.home_team_name,
        fmt_stat(case.result.home_goals),
        fmt_stat(case.result.away_goals),
        case.result.away_team_name
    );
    println!("Grade:      {grade}");

    Ok(())
}

fn fmt_stat(value: Option<f64>) -> String {
    value
        .filter(|v| !v.is_nan())
        .map(|v| format!("{v}"))
        .unwrap_or_else(|| "?".to_string())
}
