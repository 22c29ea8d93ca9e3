use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use matchday_grader::Classification;
use matchday_grader::gameweek::{
    GameweekSelection, discover_gameweeks, grade_records, load_records, load_selection, summarize,
};
use matchday_grader::report_export::export_success_summary;

fn gameweeks_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("gameweeks");
    path
}

#[test]
fn discovers_numbered_files_latest_first() {
    let weeks = discover_gameweeks(&gameweeks_dir()).expect("fixture dir should list");
    let numbers: Vec<u32> = weeks.iter().map(|(n, _)| *n).collect();
    assert_eq!(numbers, vec![2, 1]);
}

#[test]
fn grades_single_gameweek() {
    let records = load_records(&gameweeks_dir().join("1.json")).expect("fixture should parse");
    assert_eq!(records.len(), 6);

    let grades = grade_records(&records);
    assert_eq!(
        grades,
        vec![
            Some(Classification::Win),
            Some(Classification::Loss),
            Some(Classification::Push),
            Some(Classification::Win),
            Some(Classification::Pending),
            None,
        ]
    );

    let summary = summarize(&records);
    assert_eq!(summary.overall.total, 5);
    assert_eq!(summary.overall.wins, 2);
    assert_eq!(summary.leagues.len(), 2);
    assert_eq!(summary.leagues[0].key(), "Spain - La Liga");
    assert!((summary.leagues[0].tally.success_rate() - 50.0).abs() < 1e-9);
    assert_eq!(summary.leagues[1].tally.pushes, 1);
}

#[test]
fn combines_all_gameweeks() {
    let records =
        load_selection(&gameweeks_dir(), GameweekSelection::All).expect("fixtures should load");
    assert_eq!(records.len(), 9);

    let summary = summarize(&records);
    assert_eq!(summary.overall.total, 8);
    assert_eq!(summary.overall.wins, 3);
    assert_eq!(summary.overall.losses, 3);
    assert_eq!(summary.overall.pushes, 1);
    assert_eq!(summary.overall.pending, 1);

    let keys: Vec<String> = summary.leagues.iter().map(|l| l.key()).collect();
    assert_eq!(
        keys,
        vec![
            "Portugal - Liga Portugal".to_string(),
            "Spain - La Liga".to_string(),
            "England - Premier League".to_string(),
        ]
    );
}

#[test]
fn missing_gameweek_is_an_error() {
    assert!(load_selection(&gameweeks_dir(), GameweekSelection::Week(9)).is_err());
    let week2 = load_selection(&gameweeks_dir(), GameweekSelection::Week(2))
        .expect("week 2 should load");
    assert_eq!(week2.len(), 3);
}

#[test]
fn shuffling_records_does_not_change_grades() {
    let records =
        load_selection(&gameweeks_dir(), GameweekSelection::All).expect("fixtures should load");
    let grades = grade_records(&records);
    let summary = summarize(&records);

    let mut order: Vec<usize> = (0..records.len()).collect();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..5 {
        order.shuffle(&mut rng);
        let shuffled: Vec<_> = order.iter().map(|&i| records[i].clone()).collect();
        let shuffled_grades = grade_records(&shuffled);
        for (pos, &idx) in order.iter().enumerate() {
            assert_eq!(shuffled_grades[pos], grades[idx]);
        }
        assert_eq!(summarize(&shuffled), summary);
    }
}

#[test]
fn exports_summary_workbook() {
    let records =
        load_selection(&gameweeks_dir(), GameweekSelection::All).expect("fixtures should load");
    let summary = summarize(&records);

    let path = std::env::temp_dir().join(format!(
        "matchday_grader_summary_{}.xlsx",
        std::process::id()
    ));
    let report = export_success_summary(&path, "All Gameweeks", &summary)
        .expect("workbook should be written");
    assert_eq!(report.leagues, 3);
    assert_eq!(report.graded, 8);
    assert!(path.exists());
    let _ = std::fs::remove_file(&path);
}
