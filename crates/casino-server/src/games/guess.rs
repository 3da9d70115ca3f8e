//! Guess the number: 1 to 100, ten attempts, higher/lower hints.

use casino_core::http::Form;
use dashmap::DashMap;
use rand::Rng;

use super::{Game, GameOutcome, Substitutions};
use crate::pages;

pub const LOWEST: u32 = 1;
pub const HIGHEST: u32 = 100;
pub const MAX_ATTEMPTS: u32 = 10;

const CONTROLS: &str = r#"            <input type="number" name="numero" min="1" max="100" required>
            <br>
            <button type="submit">Guess</button>
"#;

/// One secret number and the attempts spent on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    secret: u32,
    attempts: u32,
}

/// What a single guess told the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    Higher { remaining: u32 },
    Lower { remaining: u32 },
    Won { attempts: u32, secret: u32 },
    Lost { secret: u32 },
}

impl Hint {
    pub fn is_final(self) -> bool {
        matches!(self, Hint::Won { .. } | Hint::Lost { .. })
    }

    fn message(self, guess: u32) -> String {
        match self {
            Hint::Higher { remaining } => format!(
                "The number is higher than {}. Attempts left: {}",
                guess, remaining
            ),
            Hint::Lower { remaining } => format!(
                "The number is lower than {}. Attempts left: {}",
                guess, remaining
            ),
            Hint::Won { attempts, secret } => format!(
                "Congratulations! You found {} in {} attempts.<br>A new number has been chosen.",
                secret, attempts
            ),
            Hint::Lost { secret } => format!(
                "Out of attempts. The number was {}.<br>A new number has been chosen.",
                secret
            ),
        }
    }
}

impl Round {
    pub fn new(secret: u32) -> Self {
        Self {
            secret,
            attempts: 0,
        }
    }

    pub fn remaining(&self) -> u32 {
        MAX_ATTEMPTS.saturating_sub(self.attempts)
    }

    /// Spend one attempt on `guess`.
    pub fn guess(&mut self, guess: u32) -> Hint {
        self.attempts += 1;
        if guess == self.secret {
            Hint::Won {
                attempts: self.attempts,
                secret: self.secret,
            }
        } else if self.attempts >= MAX_ATTEMPTS {
            Hint::Lost {
                secret: self.secret,
            }
        } else if guess < self.secret {
            Hint::Higher {
                remaining: self.remaining(),
            }
        } else {
            Hint::Lower {
                remaining: self.remaining(),
            }
        }
    }
}

/// Parse the submitted number. `None` unless it is a whole number in range.
pub fn parse_guess(input: &str) -> Option<u32> {
    input
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|n| (LOWEST..=HIGHEST).contains(n))
}

#[derive(Debug, Default)]
pub struct GuessGame {
    rounds: DashMap<String, Round>,
}

impl GuessGame {
    pub fn new() -> Self {
        Self::default()
    }

    fn remaining(&self, session: &str) -> u32 {
        self.rounds
            .get(session)
            .map(|round| round.remaining())
            .unwrap_or(MAX_ATTEMPTS)
    }
}

impl Game for GuessGame {
    fn name(&self) -> &'static str {
        "guess"
    }

    fn path(&self) -> &'static str {
        "/adivina"
    }

    fn template(&self) -> &'static str {
        pages::GUESS
    }

    fn view(&self, session: &str) -> Substitutions {
        vec![
            ("RESULT", format!("Attempts left: {}", self.remaining(session))),
            ("CONTROLS", CONTROLS.to_string()),
        ]
    }

    fn play(&self, session: &str, form: &Form) -> GameOutcome {
        let input = form.value("numero");
        let Some(guess) = parse_guess(input) else {
            let message = format!(
                "Enter a whole number between {} and {}. Attempts left: {}",
                LOWEST,
                HIGHEST,
                self.remaining(session)
            );
            return GameOutcome::rejected(
                vec![("RESULT", message), ("CONTROLS", CONTROLS.to_string())],
                input,
            );
        };

        let hint = {
            let mut round = self
                .rounds
                .entry(session.to_string())
                .or_insert_with(|| Round::new(rand::thread_rng().gen_range(LOWEST..=HIGHEST)));
            round.guess(guess)
        };
        if hint.is_final() {
            self.rounds.remove(session);
        }

        GameOutcome::played(vec![
            ("RESULT", hint.message(guess)),
            ("CONTROLS", CONTROLS.to_string()),
        ])
    }

    fn forget(&self, session: &str) {
        self.rounds.remove(session);
    }
}
