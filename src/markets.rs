//! Market grammars used by [`crate::classifier::classify`].
//!
//! Each grader returns `Ok(None)` when the text is not its market, so the
//! classifier can move on, or `Ok(Some(_))` once it has claimed the
//! prediction. A claimed prediction is PENDING when the statistics the
//! market needs are missing.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::classifier::{Classification, GradeContext};
use crate::match_result::{Scores, Side};

type Graded = Result<Option<Classification>>;

const LINE: &str = r"(\d+(?:\.\d+)?)";

static WIN_OU_COMBO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(.*?)(\s+to\s+win)?\s*(?:&|and)\s*(over|under)\s*{LINE}\s*goals?$"))
        .expect("win/over-under combo regex")
});
static TEAM_TO_SCORE_OU: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(home|away)\s*team\s*to\s*score\s*(over|under)\s*{LINE}\s*goals?$"))
        .expect("team-to-score regex")
});
static TEAM_WIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(.*?)\s+win(?:\s*\(\d+/10\))?$").expect("team win regex")
});
static DC_UNDER_COMBO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(.*?)\s*(?:&|and)\s*under\s*{LINE}\s*goals?$"))
        .expect("double-chance/under combo regex")
});
static ASIAN_HANDICAP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*?)\s*([+-]\d+(?:\.\d+)?)\s*(?:asian\s*)?handicap$")
        .expect("asian handicap regex")
});
static CORNERS_OU: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b(o|u|over|under)\s*{LINE}\s*(?:corners?|c\b)"))
        .expect("corners regex")
});
static CARDS_OU: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b(o|u|over|under)\s*{LINE}\s*(?:yellow\s*)?cards?\b"))
        .expect("cards regex")
});
static BTTS_YES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:btts|both\s*teams\s*to\s*score)\s*(?:yes)?\b|\bgg\b").expect("btts regex")
});
static BTTS_NO_EXPLICIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:btts|both\s*teams\s*to\s*score)\s*no\b|\bng\b").expect("btts no regex")
});
static BTTS_NO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:btts|both\s*teams\s*to\s*score)\s*no\b|\bng\b|\bno\s*goal\b")
        .expect("btts no-goal regex")
});
static HOME_TEAM_OU: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\bhome\s*team\s+(o|u|over|under)\s*{LINE}(?:\s*goals?)?"))
        .expect("home team goals regex")
});
static AWAY_TEAM_OU: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\baway\s*team\s+(o|u|over|under)\s*{LINE}(?:\s*goals?)?"))
        .expect("away team goals regex")
});
// Applied to the text right after a team name.
static AFTER_TEAM_OU: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^\s+(o|u|over|under)\s*{LINE}(?:\s*goals?)?"))
        .expect("team name goals regex")
});
static TOTAL_GOALS_OU: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(o|u|over|under)\s*{LINE}(?:\s*goals?)?$"))
        .expect("total goals regex")
});

static DC_MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:double\s*chance|dc)\b").expect("double chance regex"));
static DC_EXPLICIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:double\s*chance|dc)\s*([1x2]{2})\b").expect("explicit double chance regex")
});
static SYMBOL_PICK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[hax12][x12]?$").expect("symbol pick regex"));
static SYMBOL_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[12x]{2}$").expect("symbol pair regex"));
static LETTER_PICK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([hax])(?:\s*\(.+\))?$").expect("letter pick regex"));
static LETTER_WITH_ODDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[hax]\s*\(.+\)$").expect("letter odds regex"));
static HOME_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bhome\b").expect("home regex"));
static AWAY_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\baway\b").expect("away regex"));
static OR_DRAW: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bor\s+draw\b").expect("or draw regex"));
static OR_AWAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bor\s+away\b").expect("or away regex"));
static OR_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bor\s+").expect("or regex"));
static OR_HOME: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bor\s+home\b").expect("or home regex"));
static DRAW_OR_SIDE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bdraw\s+or\s+(home|away)\b").expect("draw or side regex"));
static HOME_WIN_PICK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:home\s*win|home|1)$").expect("home pick regex"));
static AWAY_WIN_PICK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:away\s*win|away|2)$").expect("away pick regex"));
static DRAW_PICK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:draw|x)$").expect("draw pick regex"));

const OUTCOME_KEYWORDS: &[&str] = &[
    "home or draw",
    "away or draw",
    "home or away",
    "draw or home",
    "draw or away",
    "away or home",
    "home win",
    "away win",
];
const OUTCOME_WORDS: &[&str] = &["home", "draw", "away", "1", "2", "x"];

/// `<side or team> (to win)? (&|and) (over|under) N goals`
pub fn win_over_under_combo(ctx: &GradeContext<'_>) -> Graded {
    let Some(caps) = WIN_OU_COMBO.captures(&ctx.lower) else {
        return Ok(None);
    };
    let team_part = group(&caps, 1).trim();
    let (name, backs_win) = match team_part.strip_suffix(" win") {
        Some(name) => (name.trim(), true),
        None => (team_part, caps.get(2).is_some()),
    };
    let side = match name {
        "home" if backs_win => Some(Side::Home),
        "away" if backs_win => Some(Side::Away),
        other => ctx.team_side(other),
    };
    let kind = group(&caps, 3);
    // Double-chance sides such as "1x" belong to the under combo further down.
    if side.is_none() && kind == "under" {
        return Ok(None);
    }
    let Some(scores) = ctx.scores else {
        return Ok(Some(Classification::Pending));
    };
    let line = parse_line(group(&caps, 4))?;
    let goals_hit = over_under_holds(kind, scores.total(), line);
    let won = side.is_some_and(|side| scores.won(side));
    Ok(Some(Classification::from_hit(won && goals_hit)))
}

/// `(home|away) team to score (over|under) N goals`; strict comparison, no push.
pub fn team_to_score_over_under(ctx: &GradeContext<'_>) -> Graded {
    let Some(caps) = TEAM_TO_SCORE_OU.captures(&ctx.lower) else {
        return Ok(None);
    };
    let Some(scores) = ctx.scores else {
        return Ok(Some(Classification::Pending));
    };
    let side = if group(&caps, 1) == "home" {
        Side::Home
    } else {
        Side::Away
    };
    let line = parse_line(group(&caps, 3))?;
    let hit = over_under_holds(group(&caps, 2), scores.goals_for(side), line);
    Ok(Some(Classification::from_hit(hit)))
}

/// `<team|home|away> win`, with an optional `(n/10)` confidence suffix.
pub fn team_win(ctx: &GradeContext<'_>) -> Graded {
    let Some(caps) = TEAM_WIN.captures(&ctx.cleaned) else {
        return Ok(None);
    };
    let Some(scores) = ctx.scores else {
        return Ok(Some(Classification::Pending));
    };
    let name = group(&caps, 1).trim().to_lowercase();
    let side = match name.as_str() {
        "home" => Some(Side::Home),
        "away" => Some(Side::Away),
        other => ctx.team_side(other),
    };
    Ok(Some(match side {
        Some(side) => Classification::from_hit(scores.won(side)),
        None => Classification::Pending,
    }))
}

/// `<side> (&|and) under N goals` where the side is a double chance.
pub fn double_chance_under_combo(ctx: &GradeContext<'_>) -> Graded {
    let Some(caps) = DC_UNDER_COMBO.captures(&ctx.lower) else {
        return Ok(None);
    };
    let Some(scores) = ctx.scores else {
        return Ok(Some(Classification::Pending));
    };
    let dc_part = group(&caps, 1).trim();
    let line = parse_line(group(&caps, 2))?;

    let names_home =
        dc_part.contains("home") || dc_part.contains("1x") || ctx.mentions_home(dc_part);
    let names_away =
        dc_part.contains("away") || dc_part.contains("x2") || ctx.mentions_away(dc_part);
    let covered = if names_home {
        scores.won_or_drew(Side::Home)
    } else if names_away {
        scores.won_or_drew(Side::Away)
    } else {
        false
    };
    Ok(Some(Classification::from_hit(covered && scores.total() < line)))
}

/// `<team> ±N (asian) handicap`: adjusted goals must beat the opponent.
pub fn asian_handicap(ctx: &GradeContext<'_>) -> Graded {
    let Some(caps) = ASIAN_HANDICAP.captures(&ctx.lower) else {
        return Ok(None);
    };
    let Some(scores) = ctx.scores else {
        return Ok(Some(Classification::Pending));
    };
    let side = match group(&caps, 1).trim() {
        "home" => Side::Home,
        "away" => Side::Away,
        other => match ctx.team_side(other) {
            Some(side) => side,
            None => return Ok(None),
        },
    };
    let handicap = parse_line(group(&caps, 2))?;
    let hit = scores.goals_for(side) + handicap > scores.goals_against(side);
    Ok(Some(Classification::from_hit(hit)))
}

pub fn clean_sheet(ctx: &GradeContext<'_>) -> Graded {
    if !ctx.lower.contains("clean sheet") {
        return Ok(None);
    }
    let Some(scores) = ctx.scores else {
        return Ok(Some(Classification::Pending));
    };
    let team_part = ctx.lower.replace("clean sheet", "").replace("yes", "");
    let Some(side) = ctx.side_mentioned(team_part.trim()) else {
        return Ok(None);
    };
    Ok(Some(Classification::from_hit(
        scores.goals_against(side) == 0.0,
    )))
}

pub fn win_to_nil(ctx: &GradeContext<'_>) -> Graded {
    if !ctx.lower.contains("win to nil") {
        return Ok(None);
    }
    let Some(scores) = ctx.scores else {
        return Ok(Some(Classification::Pending));
    };
    let team_part = ctx.lower.replace("to win to nil", "");
    let Some(side) = ctx.side_mentioned(team_part.trim()) else {
        return Ok(None);
    };
    let hit = scores.won(side) && scores.goals_against(side) == 0.0;
    Ok(Some(Classification::from_hit(hit)))
}

pub fn corners_over_under(ctx: &GradeContext<'_>) -> Graded {
    let Some(caps) = CORNERS_OU.captures(&ctx.lower) else {
        return Ok(None);
    };
    let Some(corners) = ctx.corners else {
        return Ok(Some(Classification::Pending));
    };
    let line = parse_line(group(&caps, 2))?;
    Ok(Some(over_under(group(&caps, 1), corners, line)))
}

/// Card points are yellows plus two per red, both teams combined.
pub fn cards_over_under(ctx: &GradeContext<'_>) -> Graded {
    let Some(caps) = CARDS_OU.captures(&ctx.lower) else {
        return Ok(None);
    };
    let Some(points) = ctx.card_points else {
        return Ok(Some(Classification::Pending));
    };
    let line = parse_line(group(&caps, 2))?;
    Ok(Some(over_under(group(&caps, 1), points, line)))
}

pub fn both_teams_to_score(ctx: &GradeContext<'_>) -> Graded {
    let text = ctx.lower.as_str();
    let backs_yes = BTTS_YES.is_match(text) && !BTTS_NO_EXPLICIT.is_match(text);
    let backs_no = !backs_yes && BTTS_NO.is_match(text);
    if !backs_yes && !backs_no {
        return Ok(None);
    }
    let Some(scores) = ctx.scores else {
        return Ok(Some(Classification::Pending));
    };
    Ok(Some(Classification::from_hit(
        scores.both_scored() == backs_yes,
    )))
}

pub fn home_team_goals(ctx: &GradeContext<'_>) -> Graded {
    side_goals(ctx, HOME_TEAM_OU.captures(&ctx.lower), Side::Home)
}

pub fn away_team_goals(ctx: &GradeContext<'_>) -> Graded {
    side_goals(ctx, AWAY_TEAM_OU.captures(&ctx.lower), Side::Away)
}

pub fn home_name_goals(ctx: &GradeContext<'_>) -> Graded {
    side_goals(ctx, team_goals(&ctx.lower, &ctx.home_team), Side::Home)
}

pub fn away_name_goals(ctx: &GradeContext<'_>) -> Graded {
    side_goals(ctx, team_goals(&ctx.lower, &ctx.away_team), Side::Away)
}

/// Only an exact `(o|u|over|under) N (goals)` string counts as a total-goals line.
pub fn total_goals_over_under(ctx: &GradeContext<'_>) -> Graded {
    let Some(caps) = TOTAL_GOALS_OU.captures(&ctx.lower) else {
        return Ok(None);
    };
    let Some(scores) = ctx.scores else {
        return Ok(Some(Classification::Pending));
    };
    let line = parse_line(group(&caps, 2))?;
    Ok(Some(over_under(group(&caps, 1), scores.total(), line)))
}

/// 1X2, double chance and team-name picks, possibly comma-separated.
///
/// Any winning leg wins the whole pick. A recognised outcome format with no
/// winning leg is a loss.
pub fn match_outcome(ctx: &GradeContext<'_>) -> Graded {
    let parts: Vec<String> = ctx
        .raw
        .split(',')
        .map(|part| part.trim().to_lowercase())
        .collect();
    let is_outcome_format = parts.iter().any(|part| looks_like_outcome(ctx, part));

    let Some(scores) = ctx.scores else {
        return Ok(Some(Classification::Pending));
    };
    let single = parts.len() == 1;

    for part in &parts {
        if let Some(caps) = LETTER_PICK.captures(part) {
            let hit = match group(&caps, 1) {
                "h" => scores.home_win(),
                "a" => scores.away_win(),
                _ => scores.draw(),
            };
            if hit {
                return Ok(Some(Classification::Win));
            }
            if single {
                return Ok(Some(Classification::Loss));
            }
            continue;
        }

        if let Some(caps) = DC_EXPLICIT.captures(part) {
            let hit = DoubleChance::from_symbols(group(&caps, 1))
                .is_some_and(|dc| dc.holds(scores));
            return Ok(Some(Classification::from_hit(hit)));
        }

        if SYMBOL_PAIR.is_match(part) {
            if DoubleChance::from_symbols(part).is_some_and(|dc| dc.holds(scores)) {
                return Ok(Some(Classification::Win));
            }
            if single {
                return Ok(Some(Classification::Loss));
            }
            continue;
        }

        if let Some(dc) = phrase_double_chance(ctx, part) {
            return Ok(Some(Classification::from_hit(dc.holds(scores))));
        }

        let won = (HOME_WIN_PICK.is_match(part) && scores.home_win())
            || (AWAY_WIN_PICK.is_match(part) && scores.away_win())
            || (DRAW_PICK.is_match(part) && scores.draw())
            || ctx
                .team_side(part)
                .is_some_and(|side| scores.won(side));
        if won {
            return Ok(Some(Classification::Win));
        }
    }

    if is_outcome_format {
        Ok(Some(Classification::Loss))
    } else {
        Ok(None)
    }
}

fn looks_like_outcome(ctx: &GradeContext<'_>, part: &str) -> bool {
    DC_MENTION.is_match(part)
        || SYMBOL_PICK.is_match(part)
        || LETTER_WITH_ODDS.is_match(part)
        || OUTCOME_KEYWORDS.iter().any(|kw| part.contains(kw))
        || OUTCOME_WORDS.contains(&part)
        || ctx.team_side(part).is_some()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DoubleChance {
    SideOrDraw(Side),
    NoDraw,
}

impl DoubleChance {
    fn from_symbols(symbols: &str) -> Option<Self> {
        let mut chars: Vec<char> = symbols.chars().collect();
        chars.sort_unstable();
        match chars.as_slice() {
            ['1', 'x'] => Some(DoubleChance::SideOrDraw(Side::Home)),
            ['2', 'x'] => Some(DoubleChance::SideOrDraw(Side::Away)),
            ['1', '2'] => Some(DoubleChance::NoDraw),
            _ => None,
        }
    }

    fn holds(self, scores: Scores) -> bool {
        match self {
            DoubleChance::SideOrDraw(side) => scores.won_or_drew(side),
            DoubleChance::NoDraw => !scores.draw(),
        }
    }
}

// Double chance written out in words: "home or draw", "<team> or <team>",
// "draw or away" and so on.
fn phrase_double_chance(ctx: &GradeContext<'_>, part: &str) -> Option<DoubleChance> {
    let names_home = HOME_WORD.is_match(part) || ctx.mentions_home(part);
    let names_away = AWAY_WORD.is_match(part) || ctx.mentions_away(part);

    if names_home && OR_DRAW.is_match(part) {
        return Some(DoubleChance::SideOrDraw(Side::Home));
    }
    if names_away && OR_DRAW.is_match(part) {
        return Some(DoubleChance::SideOrDraw(Side::Away));
    }
    if let Some(caps) = DRAW_OR_SIDE.captures(part) {
        let side = if group(&caps, 1) == "home" {
            Side::Home
        } else {
            Side::Away
        };
        return Some(DoubleChance::SideOrDraw(side));
    }

    let home_or_away = (HOME_WORD.is_match(part) && OR_AWAY.is_match(part))
        || (ctx.mentions_home(part)
            && (OR_AWAY.is_match(part) || or_team(part, &ctx.away_team)))
        || (ctx.mentions_away(part)
            && (OR_HOME.is_match(part) || or_team(part, &ctx.home_team)));
    home_or_away.then_some(DoubleChance::NoDraw)
}

// `or <team>` anywhere in the text.
fn or_team(part: &str, team: &str) -> bool {
    !team.is_empty()
        && OR_WORD
            .find_iter(part)
            .any(|m| part[m.end()..].starts_with(team))
}

// `<team> (o|u|over|under) N`, with the team name at the start of the text
// or after whitespace.
fn team_goals<'t>(text: &'t str, team: &str) -> Option<Captures<'t>> {
    if team.is_empty() {
        return None;
    }
    text.match_indices(team).find_map(|(idx, _)| {
        let after_space = text[..idx].chars().next_back().is_none_or(char::is_whitespace);
        if !after_space {
            return None;
        }
        AFTER_TEAM_OU.captures(&text[idx + team.len()..])
    })
}

fn side_goals(ctx: &GradeContext<'_>, caps: Option<Captures<'_>>, side: Side) -> Graded {
    let Some(caps) = caps else {
        return Ok(None);
    };
    let Some(scores) = ctx.scores else {
        return Ok(Some(Classification::Pending));
    };
    let line = parse_line(group(&caps, 2))?;
    Ok(Some(over_under(group(&caps, 1), scores.goals_for(side), line)))
}

fn over_under(kind: &str, actual: f64, line: f64) -> Classification {
    if actual == line {
        return Classification::Push;
    }
    Classification::from_hit(over_under_holds(kind, actual, line))
}

fn over_under_holds(kind: &str, actual: f64, line: f64) -> bool {
    if kind.starts_with('o') {
        actual > line
    } else {
        actual < line
    }
}

fn parse_line(raw: &str) -> Result<f64> {
    let value = raw
        .parse::<f64>()
        .with_context(|| format!("invalid line value {raw:?}"))?;
    if !value.is_finite() {
        anyhow::bail!("line value {raw:?} is not finite");
    }
    Ok(value)
}

fn group<'t>(caps: &Captures<'t>, idx: usize) -> &'t str {
    caps.get(idx).map_or("", |m| m.as_str())
}
