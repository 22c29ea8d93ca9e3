use serde::{Deserialize, Serialize};

/// Final statistics for one match, as supplied by the caller.
///
/// Every numeric field is optional; a value only counts when it is present
/// and not NaN.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(default)]
    pub home_goals: Option<f64>,
    #[serde(default)]
    pub away_goals: Option<f64>,
    #[serde(default)]
    pub total_corners: Option<f64>,
    #[serde(default)]
    pub home_yellow_cards: Option<f64>,
    #[serde(default)]
    pub away_yellow_cards: Option<f64>,
    #[serde(default)]
    pub home_red_cards: Option<f64>,
    #[serde(default)]
    pub away_red_cards: Option<f64>,
    #[serde(default)]
    pub home_team_name: String,
    #[serde(default)]
    pub away_team_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    pub home: f64,
    pub away: f64,
}

impl Scores {
    pub fn home_win(&self) -> bool {
        self.home > self.away
    }

    pub fn away_win(&self) -> bool {
        self.away > self.home
    }

    pub fn draw(&self) -> bool {
        self.home == self.away
    }

    pub fn total(&self) -> f64 {
        self.home + self.away
    }

    pub fn both_scored(&self) -> bool {
        self.home > 0.0 && self.away > 0.0
    }

    pub fn goals_for(&self, side: Side) -> f64 {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }

    pub fn goals_against(&self, side: Side) -> f64 {
        match side {
            Side::Home => self.away,
            Side::Away => self.home,
        }
    }

    pub fn won(&self, side: Side) -> bool {
        self.goals_for(side) > self.goals_against(side)
    }

    /// Double-chance check: `side` won or the match was drawn.
    pub fn won_or_drew(&self, side: Side) -> bool {
        self.goals_for(side) >= self.goals_against(side)
    }
}

impl MatchResult {
    pub fn new(home_team_name: &str, away_team_name: &str) -> Self {
        Self {
            home_team_name: home_team_name.to_string(),
            away_team_name: away_team_name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_score(mut self, home_goals: f64, away_goals: f64) -> Self {
        self.home_goals = Some(home_goals);
        self.away_goals = Some(away_goals);
        self
    }

    pub fn with_corners(mut self, total_corners: f64) -> Self {
        self.total_corners = Some(total_corners);
        self
    }

    pub fn with_cards(mut self, home_yellow: f64, away_yellow: f64) -> Self {
        self.home_yellow_cards = Some(home_yellow);
        self.away_yellow_cards = Some(away_yellow);
        self
    }

    pub fn with_red_cards(mut self, home_red: f64, away_red: f64) -> Self {
        self.home_red_cards = Some(home_red);
        self.away_red_cards = Some(away_red);
        self
    }

    pub fn scores(&self) -> Option<Scores> {
        Some(Scores {
            home: valid(self.home_goals)?,
            away: valid(self.away_goals)?,
        })
    }

    pub fn corners(&self) -> Option<f64> {
        valid(self.total_corners)
    }

    /// Yellow cards plus two points per red card, both sides combined.
    ///
    /// `None` unless both yellow counts are valid and each red count is
    /// either absent or valid.
    pub fn card_points(&self) -> Option<f64> {
        let (home_yellow, home_red) = side_cards(self.home_yellow_cards, self.home_red_cards)?;
        let (away_yellow, away_red) = side_cards(self.away_yellow_cards, self.away_red_cards)?;
        Some(home_yellow + away_yellow + home_red * 2.0 + away_red * 2.0)
    }
}

fn valid(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

fn side_cards(yellow: Option<f64>, red: Option<f64>) -> Option<(f64, f64)> {
    let yellow = valid(yellow)?;
    let red = match red {
        None => 0.0,
        Some(v) if v.is_nan() => return None,
        Some(v) => v,
    };
    Some((yellow, red))
}
