use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::markets;
use crate::match_result::{MatchResult, Scores, Side};
use crate::normalize::normalize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Classification {
    Win,
    Loss,
    Push,
    Pending,
}

impl Classification {
    pub fn from_hit(hit: bool) -> Self {
        if hit {
            Classification::Win
        } else {
            Classification::Loss
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Win => "WIN",
            Classification::Loss => "LOSS",
            Classification::Push => "PUSH",
            Classification::Pending => "PENDING",
        }
    }

    /// True for WIN, LOSS and PUSH.
    pub fn is_settled(self) -> bool {
        self != Classification::Pending
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a market grader needs for one prediction, computed once.
#[derive(Debug, Clone)]
pub struct GradeContext<'a> {
    /// Prediction exactly as supplied; the outcome market splits this on commas.
    pub raw: &'a str,
    pub cleaned: String,
    pub lower: String,
    pub home_team: String,
    pub away_team: String,
    pub scores: Option<Scores>,
    pub corners: Option<f64>,
    pub card_points: Option<f64>,
}

impl<'a> GradeContext<'a> {
    pub fn new(raw: &'a str, result: &MatchResult) -> Self {
        let cleaned = normalize(raw);
        let lower = cleaned.to_lowercase();
        Self {
            raw,
            cleaned,
            lower,
            home_team: result.home_team_name.trim().to_lowercase(),
            away_team: result.away_team_name.trim().to_lowercase(),
            scores: result.scores(),
            corners: result.corners(),
            card_points: result.card_points(),
        }
    }

    /// Exact (lower-cased) team-name lookup.
    pub fn team_side(&self, name: &str) -> Option<Side> {
        if name.is_empty() {
            return None;
        }
        if name == self.home_team {
            Some(Side::Home)
        } else if name == self.away_team {
            Some(Side::Away)
        } else {
            None
        }
    }

    pub fn mentions_home(&self, text: &str) -> bool {
        !self.home_team.is_empty() && text.contains(self.home_team.as_str())
    }

    pub fn mentions_away(&self, text: &str) -> bool {
        !self.away_team.is_empty() && text.contains(self.away_team.as_str())
    }

    /// Side named by a `home`/`away` keyword or a team-name substring.
    pub fn side_mentioned(&self, text: &str) -> Option<Side> {
        if text.contains("home") || self.mentions_home(text) {
            Some(Side::Home)
        } else if text.contains("away") || self.mentions_away(text) {
            Some(Side::Away)
        } else {
            None
        }
    }
}

pub type Grader = fn(&GradeContext<'_>) -> Result<Option<Classification>>;

pub struct Market {
    pub name: &'static str,
    pub grade: Grader,
}

/// Market grammars in priority order; the first one that claims a
/// prediction decides it. Composite markets sit ahead of the single-market
/// patterns they contain.
pub static MARKETS: &[Market] = &[
    Market {
        name: "win_over_under_combo",
        grade: markets::win_over_under_combo,
    },
    Market {
        name: "team_to_score_over_under",
        grade: markets::team_to_score_over_under,
    },
    Market {
        name: "team_win",
        grade: markets::team_win,
    },
    Market {
        name: "double_chance_under_combo",
        grade: markets::double_chance_under_combo,
    },
    Market {
        name: "asian_handicap",
        grade: markets::asian_handicap,
    },
    Market {
        name: "clean_sheet",
        grade: markets::clean_sheet,
    },
    Market {
        name: "win_to_nil",
        grade: markets::win_to_nil,
    },
    Market {
        name: "corners_over_under",
        grade: markets::corners_over_under,
    },
    Market {
        name: "cards_over_under",
        grade: markets::cards_over_under,
    },
    Market {
        name: "both_teams_to_score",
        grade: markets::both_teams_to_score,
    },
    Market {
        name: "home_team_goals",
        grade: markets::home_team_goals,
    },
    Market {
        name: "away_team_goals",
        grade: markets::away_team_goals,
    },
    Market {
        name: "home_name_goals",
        grade: markets::home_name_goals,
    },
    Market {
        name: "away_name_goals",
        grade: markets::away_name_goals,
    },
    Market {
        name: "total_goals_over_under",
        grade: markets::total_goals_over_under,
    },
    Market {
        name: "match_outcome",
        grade: markets::match_outcome,
    },
];

/// Grades one prediction against a final result.
///
/// Never fails: unknown text, missing statistics and malformed numbers all
/// come back as [`Classification::Pending`].
pub fn classify(prediction: &str, result: &MatchResult) -> Classification {
    let trimmed = prediction.trim();
    if trimmed.is_empty() || trimmed == "--" {
        return Classification::Pending;
    }

    let ctx = GradeContext::new(prediction, result);
    for market in MARKETS {
        match (market.grade)(&ctx) {
            Ok(None) => continue,
            Ok(Some(grade)) => {
                trace!(market = market.name, prediction, %grade, "prediction graded");
                return grade;
            }
            Err(err) => {
                debug!(market = market.name, prediction, error = %err, "grading failed");
                return Classification::Pending;
            }
        }
    }
    Classification::Pending
}
