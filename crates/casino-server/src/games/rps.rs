//! Rock, paper, scissors against the house, five scored rounds.

use casino_core::http::Form;
use dashmap::DashMap;
use rand::Rng;

use super::{Game, GameOutcome, Scoreboard, Side, Substitutions};
use crate::pages;

const HANDS: &str = concat!(
    "            <button type=\"submit\" name=\"opcion\" value=\"0\">Rock</button>\n",
    "            <button type=\"submit\" name=\"opcion\" value=\"1\">Paper</button>\n",
    "            <button type=\"submit\" name=\"opcion\" value=\"2\">Scissors</button>\n",
);
const PLAY_AGAIN: &str =
    "            <button type=\"submit\" name=\"opcion\" value=\"new\">Play again</button>\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hand {
    Rock,
    Paper,
    Scissors,
}

impl Hand {
    const ALL: [Hand; 3] = [Hand::Rock, Hand::Paper, Hand::Scissors];

    /// Decode the `opcion` field: `0`, `1` or `2`.
    pub fn from_option(value: &str) -> Option<Self> {
        match value {
            "0" => Some(Hand::Rock),
            "1" => Some(Hand::Paper),
            "2" => Some(Hand::Scissors),
            _ => None,
        }
    }

    pub fn beats(self, other: Hand) -> bool {
        matches!(
            (self, other),
            (Hand::Rock, Hand::Scissors) | (Hand::Paper, Hand::Rock) | (Hand::Scissors, Hand::Paper)
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Hand::Rock => "Rock",
            Hand::Paper => "Paper",
            Hand::Scissors => "Scissors",
        }
    }
}

/// Winner of a round, `None` on a tie.
pub fn compare(player: Hand, house: Hand) -> Option<Side> {
    if player.beats(house) {
        Some(Side::Player)
    } else if house.beats(player) {
        Some(Side::House)
    } else {
        None
    }
}

#[derive(Debug, Default)]
pub struct RpsGame {
    boards: DashMap<String, Scoreboard>,
}

impl RpsGame {
    pub fn new() -> Self {
        Self::default()
    }

    fn board(&self, session: &str) -> Scoreboard {
        self.boards
            .get(session)
            .map(|board| *board)
            .unwrap_or_default()
    }

    /// Current board with `result` as the message.
    fn page(&self, session: &str, result: String) -> Substitutions {
        let board = self.board(session);
        let mut substitutions = vec![
            ("RESULT", result),
            ("CONTROLS", controls(&board).to_string()),
        ];
        substitutions.extend(board.points());
        substitutions
    }

    fn throw(&self, session: &str, player: Hand, house: Hand) -> Substitutions {
        let (board, winner) = {
            let mut board = self.boards.entry(session.to_string()).or_default();
            if board.is_over() {
                *board = Scoreboard::default();
            }
            let winner = compare(player, house);
            if let Some(side) = winner {
                board.record(side);
            }
            (*board, winner)
        };

        let mut substitutions = vec![
            ("PLAYER", player.label().to_string()),
            ("HOUSE", house.label().to_string()),
            ("RESULT", board.round_message(winner)),
            ("CONTROLS", controls(&board).to_string()),
        ];
        substitutions.extend(board.points());
        substitutions
    }
}

fn controls(board: &Scoreboard) -> &'static str {
    if board.is_over() {
        PLAY_AGAIN
    } else {
        HANDS
    }
}

impl Game for RpsGame {
    fn name(&self) -> &'static str {
        "rps"
    }

    fn path(&self) -> &'static str {
        "/ppt"
    }

    fn template(&self) -> &'static str {
        pages::RPS
    }

    fn view(&self, session: &str) -> Substitutions {
        let round = self.board(session).current_round();
        self.page(session, format!("Round {}", round))
    }

    fn play(&self, session: &str, form: &Form) -> GameOutcome {
        let input = form.value("opcion");

        let Some(player) = Hand::from_option(input) else {
            if self.board(session).is_over() {
                self.boards.remove(session);
                let substitutions = self.page(session, "New game. Choose your hand.".to_string());
                return GameOutcome::played(substitutions);
            }
            let substitutions = self.page(session, "Choose rock, paper or scissors.".to_string());
            return GameOutcome::rejected(substitutions, input);
        };

        let house = Hand::ALL[rand::thread_rng().gen_range(0..Hand::ALL.len())];
        GameOutcome::played(self.throw(session, player, house))
    }

    fn forget(&self, session: &str) {
        self.boards.remove(session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value<'a>(substitutions: &'a Substitutions, marker: &str) -> &'a str {
        substitutions
            .iter()
            .find(|(m, _)| *m == marker)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[test]
    fn test_hand_rules() {
        assert!(Hand::Rock.beats(Hand::Scissors));
        assert!(Hand::Paper.beats(Hand::Rock));
        assert!(Hand::Scissors.beats(Hand::Paper));
        for hand in Hand::ALL {
            assert!(!hand.beats(hand));
            assert_eq!(compare(hand, hand), None);
        }
        assert_eq!(compare(Hand::Rock, Hand::Paper), Some(Side::House));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Hand::from_option("0"), Some(Hand::Rock));
        assert_eq!(Hand::from_option("1"), Some(Hand::Paper));
        assert_eq!(Hand::from_option("2"), Some(Hand::Scissors));
        assert_eq!(Hand::from_option("3"), None);
        assert_eq!(Hand::from_option("rock"), None);
        assert_eq!(Hand::from_option(""), None);
    }

    #[test]
    fn test_invalid_option_is_rejected_mid_game() {
        let game = RpsGame::new();
        game.throw("a", Hand::Rock, Hand::Scissors);

        let outcome = game.play("a", &Form::parse(b"opcion=7"));
        assert_eq!(outcome.rejected.as_deref(), Some("7"));
        assert_eq!(game.board("a").player, 1);
    }

    #[test]
    fn test_match_over_after_five_scored_rounds() {
        let game = RpsGame::new();
        for _ in 0..4 {
            game.throw("a", Hand::Paper, Hand::Rock);
        }
        game.throw("a", Hand::Rock, Hand::Rock);
        let last = game.throw("a", Hand::Rock, Hand::Paper);

        assert!(value(&last, "RESULT").contains("Congratulations"));
        assert_eq!(value(&last, "CONTROLS"), PLAY_AGAIN);
        assert!(game.board("a").is_over());
    }

    #[test]
    fn test_play_again_starts_new_game() {
        let game = RpsGame::new();
        for _ in 0..5 {
            game.throw("a", Hand::Rock, Hand::Paper);
        }

        let outcome = game.play("a", &Form::parse(b"opcion=new"));
        assert!(outcome.rejected.is_none());
        assert_eq!(game.board("a"), Scoreboard::default());
        assert_eq!(value(&outcome.substitutions, "CONTROLS"), HANDS);
    }

    #[test]
    fn test_valid_throw_after_match_resets_scores() {
        let game = RpsGame::new();
        for _ in 0..5 {
            game.throw("a", Hand::Rock, Hand::Paper);
        }
        game.throw("a", Hand::Rock, Hand::Scissors);

        assert_eq!(game.board("a"), Scoreboard { player: 1, house: 0 });
    }

    #[test]
    fn test_play_records_a_round_or_tie() {
        let game = RpsGame::new();
        let outcome = game.play("a", &Form::parse(b"opcion=0"));

        assert!(outcome.rejected.is_none());
        assert_eq!(value(&outcome.substitutions, "PLAYER"), "Rock");
        assert!(game.board("a").scored() <= 1);
    }
}
