//! Games served behind the login.
//!
//! Each game owns its per-session state, keyed by session token, so two
//! players never share a round. The dispatcher only routes requests here
//! and renders the returned substitutions into the game's template.

mod dice;
mod guess;
mod rps;

use casino_core::http::Form;

use crate::pages;

pub use dice::DiceGame;
pub use guess::GuessGame;
pub use rps::RpsGame;

/// Marker/value pairs for a game template.
pub type Substitutions = Vec<(&'static str, String)>;

/// Result of one POST to a game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameOutcome {
    pub substitutions: Substitutions,
    /// Raw input that was refused, if any. The page still renders.
    pub rejected: Option<String>,
}

impl GameOutcome {
    pub fn played(substitutions: Substitutions) -> Self {
        Self {
            substitutions,
            rejected: None,
        }
    }

    pub fn rejected(substitutions: Substitutions, input: &str) -> Self {
        Self {
            substitutions,
            rejected: Some(input.to_string()),
        }
    }
}

pub trait Game: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Route serving the game.
    fn path(&self) -> &'static str;

    fn template(&self) -> &'static str;

    /// Substitutions for a GET: the current state, nothing played.
    fn view(&self, session: &str) -> Substitutions;

    /// Play one move submitted by `session`.
    fn play(&self, session: &str, form: &Form) -> GameOutcome;

    /// Drop any state held for `session`.
    fn forget(&self, session: &str);

    fn render(&self, substitutions: &[(&'static str, String)]) -> String {
        let values: Vec<(&str, &str)> = substitutions
            .iter()
            .map(|(marker, value)| (*marker, value.as_str()))
            .collect();
        pages::render(self.template(), &values)
    }
}

/// Which side took a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Player,
    House,
}

/// Running score of a fixed-length match. Tied rounds are not recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub player: u32,
    pub house: u32,
}

impl Scoreboard {
    /// Scored rounds in a match.
    pub const ROUNDS: u32 = 5;

    pub fn record(&mut self, side: Side) {
        match side {
            Side::Player => self.player += 1,
            Side::House => self.house += 1,
        }
    }

    pub fn scored(&self) -> u32 {
        self.player + self.house
    }

    /// Round currently being played, 1-based.
    pub fn current_round(&self) -> u32 {
        (self.scored() + 1).min(Self::ROUNDS)
    }

    pub fn is_over(&self) -> bool {
        self.scored() >= Self::ROUNDS
    }

    /// Winner once the match is over.
    pub fn winner(&self) -> Option<Side> {
        if !self.is_over() {
            return None;
        }
        if self.player > self.house {
            Some(Side::Player)
        } else {
            Some(Side::House)
        }
    }

    /// Result line for a round that just finished.
    fn round_message(&self, round: Option<Side>) -> String {
        let mut message = match round {
            Some(Side::Player) => format!("Point for you! Round {}", self.scored()),
            Some(Side::House) => format!("Point for the house! Round {}", self.scored()),
            None => format!("Tie! Round {} is played again", self.current_round()),
        };
        match self.winner() {
            Some(Side::Player) => message.push_str("<br>Congratulations! You beat the house."),
            Some(Side::House) => message.push_str("<br>Sorry, you lost."),
            None => {}
        }
        message
    }

    fn points(&self) -> Substitutions {
        vec![
            ("PLAYER_POINTS", self.player.to_string()),
            ("HOUSE_POINTS", self.house.to_string()),
        ]
    }
}

/// All games, looked up by route.
pub struct Games {
    games: Vec<Box<dyn Game>>,
}

impl Games {
    pub fn standard() -> Self {
        Self {
            games: vec![
                Box::new(GuessGame::new()),
                Box::new(DiceGame::new()),
                Box::new(RpsGame::new()),
            ],
        }
    }

    pub fn by_path(&self, path: &str) -> Option<&dyn Game> {
        self.games
            .iter()
            .find(|game| game.path() == path)
            .map(|game| game.as_ref())
    }

    /// Drop every game's state for `session`.
    pub fn forget(&self, session: &str) {
        for game in &self.games {
            game.forget(session);
        }
    }

    pub fn paths(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.games.iter().map(|game| game.path())
    }
}

impl Default for Games {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for Games {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.games.iter().map(|game| game.name()))
            .finish()
    }
}
