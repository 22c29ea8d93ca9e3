use once_cell::sync::Lazy;
use regex::Regex;

const PREFIXES: &[&str] = &["Match Outcome: "];

// Feed labels that carry the market type in front of the line.
const MARKET_LABELS: &[&str] = &["OverUnderCards: ", "OverUnderCorners: ", "OverUnderGoals: "];

static HOME_OR_DRAW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Home\s+or\s+Draw\s+\(1X\)").expect("home-or-draw regex"));
static AWAY_OR_DRAW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Away\s+or\s+Draw\s+\(X2\)").expect("away-or-draw regex"));

/// Canonicalizes a raw prediction string.
///
/// Strips a known prefix, turns `OverUnderCards: 3.5` style labels into
/// `3.5 Cards`, spells out the 1X/X2 double-chance labels, drops repeated
/// adjacent words and collapses whitespace. Empty input yields `""`.
///
/// The cleaning pass is repeated until the text stops changing, so
/// `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(raw: &str) -> String {
    let mut clean = clean_once(raw);
    // After the first pass whitespace is canonical, so every further pass
    // that changes the text also shortens it.
    loop {
        let next = clean_once(&clean);
        if next == clean {
            return clean;
        }
        clean = next;
    }
}

fn clean_once(raw: &str) -> String {
    let mut clean = raw.trim().to_string();
    if clean.is_empty() {
        return clean;
    }

    if let Some(rest) = PREFIXES.iter().find_map(|p| clean.strip_prefix(p)) {
        clean = rest.trim().to_string();
    }

    if MARKET_LABELS.iter().any(|label| clean.contains(label)) {
        clean = relabel_market(&clean);
    }

    if HOME_OR_DRAW.is_match(&clean) {
        clean = HOME_OR_DRAW.replace(&clean, "Home Win or Draw").into_owned();
    } else if AWAY_OR_DRAW.is_match(&clean) {
        clean = AWAY_OR_DRAW.replace(&clean, "Away Win or Draw").into_owned();
    }

    squeeze_whitespace(&collapse_repeated_words(&clean))
}

fn relabel_market(text: &str) -> String {
    let Some((label, rest)) = text.split_once(": ") else {
        return text.to_string();
    };
    let label = label.to_lowercase();
    if label.contains("cards") {
        format!("{rest} Cards")
    } else if label.contains("corners") {
        format!("{rest} Corners")
    } else if label.contains("goals") {
        format!("{rest} Goals")
    } else {
        rest.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Run {
    Word,
    Space,
    Other,
}

fn run_kind(c: char) -> Run {
    if c.is_alphanumeric() || c == '_' {
        Run::Word
    } else if c.is_whitespace() {
        Run::Space
    } else {
        Run::Other
    }
}

// Splits text into maximal runs of word characters, whitespace and
// everything else.
fn runs(text: &str) -> Vec<(Run, &str)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut current = None;
    for (idx, c) in text.char_indices() {
        let kind = run_kind(c);
        match current {
            Some(prev) if prev == kind => {}
            Some(prev) => {
                out.push((prev, &text[start..idx]));
                start = idx;
                current = Some(kind);
            }
            None => current = Some(kind),
        }
    }
    if let Some(kind) = current {
        out.push((kind, &text[start..]));
    }
    out
}

// Drops a word that repeats the word before it across whitespace, ignoring
// ASCII case. Word boundaries follow `\b`, so `Goals Goals,` and
// `Win Win(7/10)` both collapse. Runs of any length keep the first word.
fn collapse_repeated_words(text: &str) -> String {
    let runs = runs(text);
    let mut kept: Vec<(Run, &str)> = Vec::with_capacity(runs.len());
    let mut idx = 0;
    while idx < runs.len() {
        let (kind, run) = runs[idx];
        if kind == Run::Space {
            if let (Some(&(Run::Word, prev)), Some(&(Run::Word, next))) =
                (kept.last(), runs.get(idx + 1))
            {
                if prev.eq_ignore_ascii_case(next) {
                    idx += 2;
                    continue;
                }
            }
        }
        kept.push((kind, run));
        idx += 1;
    }
    kept.into_iter().map(|(_, run)| run).collect()
}

fn squeeze_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
