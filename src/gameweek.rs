use std::cmp::Ordering;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::classifier::{Classification, classify};
use crate::match_result::MatchResult;

const UNKNOWN_COUNTRY: &str = "Unknown Country";
const UNKNOWN_LEAGUE: &str = "Unknown League";

/// One row of a weekly prediction file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictionRecord {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub league_name: String,
    #[serde(default)]
    pub rec_prediction: Option<String>,
    #[serde(flatten)]
    pub result: MatchResult,
}

impl PredictionRecord {
    pub fn league_key(&self) -> String {
        format!("{} - {}", self.country_label(), self.league_label())
    }

    fn country_label(&self) -> &str {
        non_blank(&self.country).unwrap_or(UNKNOWN_COUNTRY)
    }

    fn league_label(&self) -> &str {
        non_blank(&self.league_name).unwrap_or(UNKNOWN_LEAGUE)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub total: usize,
    pub wins: usize,
    pub losses: usize,
    pub pushes: usize,
    pub pending: usize,
}

impl Tally {
    pub fn record(&mut self, grade: Classification) {
        self.total += 1;
        match grade {
            Classification::Win => self.wins += 1,
            Classification::Loss => self.losses += 1,
            Classification::Push => self.pushes += 1,
            Classification::Pending => self.pending += 1,
        }
    }

    /// Wins over every gradable prediction, in percent.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.wins as f64 / self.total as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeagueSuccess {
    pub country: String,
    pub league: String,
    pub tally: Tally,
}

impl LeagueSuccess {
    pub fn key(&self) -> String {
        format!("{} - {}", self.country, self.league)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SuccessSummary {
    pub overall: Tally,
    pub leagues: Vec<LeagueSuccess>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameweekSelection {
    Week(u32),
    All,
}

impl GameweekSelection {
    pub fn label(&self) -> String {
        match self {
            GameweekSelection::Week(n) => format!("Gameweek {n}"),
            GameweekSelection::All => "All Gameweeks".to_string(),
        }
    }
}

pub fn is_gradable(record: &PredictionRecord) -> bool {
    record
        .rec_prediction
        .as_deref()
        .map(str::trim)
        .is_some_and(|p| !p.is_empty() && p != "--")
}

/// Grades every record in parallel; `None` for records with no usable prediction.
pub fn grade_records(records: &[PredictionRecord]) -> Vec<Option<Classification>> {
    records
        .par_iter()
        .map(|record| {
            if !is_gradable(record) {
                return None;
            }
            let prediction = record.rec_prediction.as_deref().unwrap_or_default();
            Some(classify(prediction, &record.result))
        })
        .collect()
}

pub fn summarize(records: &[PredictionRecord]) -> SuccessSummary {
    let grades = grade_records(records);

    let mut overall = Tally::default();
    let mut leagues: HashMap<String, LeagueSuccess> = HashMap::new();
    for (record, grade) in records.iter().zip(grades) {
        let Some(grade) = grade else {
            continue;
        };
        overall.record(grade);
        leagues
            .entry(record.league_key())
            .or_insert_with(|| LeagueSuccess {
                country: record.country_label().to_string(),
                league: record.league_label().to_string(),
                tally: Tally::default(),
            })
            .tally
            .record(grade);
    }

    let mut leagues: Vec<LeagueSuccess> = leagues.into_values().collect();
    leagues.sort_by(|a, b| {
        b.tally
            .success_rate()
            .partial_cmp(&a.tally.success_rate())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.key().cmp(&b.key()))
    });

    SuccessSummary { overall, leagues }
}

/// `12.json` -> 12. Anything else is not a gameweek file.
pub fn gameweek_number(path: &Path) -> Option<u32> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.is_empty() || !stem.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

/// Gameweek files in `dir`, latest first.
pub fn discover_gameweeks(dir: &Path) -> Result<Vec<(u32, PathBuf)>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("read predictions dir {}", dir.display()))?;
    let mut weeks = Vec::new();
    for entry in entries {
        let path = entry.context("read dir entry")?.path();
        if let Some(week) = gameweek_number(&path) {
            weeks.push((week, path));
        }
    }
    weeks.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(weeks)
}

pub fn load_records(path: &Path) -> Result<Vec<PredictionRecord>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("read gameweek {}", path.display()))?;
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).with_context(|| format!("parse gameweek {}", path.display()))
}

/// Loads one gameweek, or every gameweek in `dir` combined.
pub fn load_selection(dir: &Path, selection: GameweekSelection) -> Result<Vec<PredictionRecord>> {
    let weeks = discover_gameweeks(dir)?;
    if weeks.is_empty() {
        return Err(anyhow!("no gameweek files found in {}", dir.display()));
    }
    match selection {
        GameweekSelection::Week(n) => {
            let (_, path) = weeks
                .iter()
                .find(|(week, _)| *week == n)
                .ok_or_else(|| anyhow!("gameweek {n} not found in {}", dir.display()))?;
            load_records(path)
        }
        GameweekSelection::All => {
            let mut all = Vec::new();
            for (_, path) in &weeks {
                all.extend(load_records(path)?);
            }
            Ok(all)
        }
    }
}

pub fn grading_parallelism() -> usize {
    env::var("GRADING_PARALLELISM")
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(4)
        .clamp(1, 32)
}

pub fn build_grading_pool() -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(grading_parallelism())
        .build()
        .ok()
}

pub fn with_grading_pool<T>(
    pool: &Option<rayon::ThreadPool>,
    action: impl FnOnce() -> T + Send,
) -> T
where
    T: Send,
{
    if let Some(pool) = pool.as_ref() {
        pool.install(action)
    } else {
        action()
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        country: &str,
        league: &str,
        prediction: Option<&str>,
        score: (f64, f64),
    ) -> PredictionRecord {
        PredictionRecord {
            country: country.to_string(),
            league_name: league.to_string(),
            rec_prediction: prediction.map(str::to_string),
            result: MatchResult::new("Home FC", "Away FC").with_score(score.0, score.1),
        }
    }

    #[test]
    fn placeholders_are_not_counted() {
        let records = vec![
            record("Spain", "La Liga", Some("--"), (1.0, 0.0)),
            record("Spain", "La Liga", None, (1.0, 0.0)),
            record("Spain", "La Liga", Some("Home Win"), (1.0, 0.0)),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.overall.total, 1);
        assert_eq!(summary.overall.wins, 1);
    }

    #[test]
    fn pending_counts_against_success_rate() {
        let mut unplayed = record("Italy", "Serie A", Some("Home Win"), (0.0, 0.0));
        unplayed.result.home_goals = None;
        let records = vec![unplayed, record("Italy", "Serie A", Some("Draw"), (0.0, 0.0))];
        let summary = summarize(&records);
        assert_eq!(summary.overall.pending, 1);
        assert!((summary.overall.success_rate() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn leagues_sorted_by_rate_then_key() {
        let records = vec![
            record("England", "Premier League", Some("Away Win"), (1.0, 0.0)),
            record("Spain", "La Liga", Some("Home Win"), (1.0, 0.0)),
            record("", "", Some("Home Win"), (1.0, 0.0)),
        ];
        let summary = summarize(&records);
        let keys: Vec<String> = summary.leagues.iter().map(LeagueSuccess::key).collect();
        assert_eq!(
            keys,
            vec![
                "Spain - La Liga".to_string(),
                "Unknown Country - Unknown League".to_string(),
                "England - Premier League".to_string(),
            ]
        );
    }

    #[test]
    fn gameweek_numbers_from_file_names() {
        assert_eq!(gameweek_number(Path::new("data/pre_match/12.json")), Some(12));
        assert_eq!(gameweek_number(Path::new("12.csv")), None);
        assert_eq!(gameweek_number(Path::new("week12.json")), None);
        assert_eq!(GameweekSelection::Week(3).label(), "Gameweek 3");
        assert_eq!(GameweekSelection::All.label(), "All Gameweeks");
    }
}
