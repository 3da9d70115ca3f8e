//! Dice against the house. Highest d6 takes the round; ties are rolled
//! again. The match ends after five scored rounds.

use casino_core::http::Form;
use dashmap::DashMap;
use rand::Rng;

use super::{Game, GameOutcome, Scoreboard, Side, Substitutions};
use crate::pages;

const ROLL: &str = "            <button type=\"submit\">Roll</button>\n";
const NEW_GAME: &str = "            <button type=\"submit\">New game</button>\n";

/// Winner of a round given both rolls, `None` on a tie.
pub fn compare(player: u8, house: u8) -> Option<Side> {
    match player.cmp(&house) {
        std::cmp::Ordering::Greater => Some(Side::Player),
        std::cmp::Ordering::Less => Some(Side::House),
        std::cmp::Ordering::Equal => None,
    }
}

#[derive(Debug, Default)]
pub struct DiceGame {
    boards: DashMap<String, Scoreboard>,
}

impl DiceGame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Play one round with the given rolls.
    fn roll(&self, session: &str, player: u8, house: u8) -> Substitutions {
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

        let controls = if board.is_over() { NEW_GAME } else { ROLL };
        let mut substitutions = vec![
            ("PLAYER", format!("You rolled a {}", player)),
            ("HOUSE", format!("The house rolled a {}", house)),
            ("RESULT", board.round_message(winner)),
            ("CONTROLS", controls.to_string()),
        ];
        substitutions.extend(board.points());
        substitutions
    }
}

impl Game for DiceGame {
    fn name(&self) -> &'static str {
        "dice"
    }

    fn path(&self) -> &'static str {
        "/dados"
    }

    fn template(&self) -> &'static str {
        pages::DICE
    }

    fn view(&self, session: &str) -> Substitutions {
        let board = self
            .boards
            .get(session)
            .map(|board| *board)
            .unwrap_or_default();
        let controls = if board.is_over() { NEW_GAME } else { ROLL };

        let mut substitutions = vec![
            ("RESULT", format!("Round {}", board.current_round())),
            ("CONTROLS", controls.to_string()),
        ];
        substitutions.extend(board.points());
        substitutions
    }

    fn play(&self, session: &str, _form: &Form) -> GameOutcome {
        let mut rng = rand::thread_rng();
        let player = rng.gen_range(1..=6);
        let house = rng.gen_range(1..=6);
        GameOutcome::played(self.roll(session, player, house))
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
    fn test_compare() {
        assert_eq!(compare(6, 1), Some(Side::Player));
        assert_eq!(compare(2, 5), Some(Side::House));
        assert_eq!(compare(3, 3), None);
    }

    #[test]
    fn test_tie_does_not_score() {
        let game = DiceGame::new();
        let substitutions = game.roll("a", 4, 4);

        assert!(value(&substitutions, "RESULT").starts_with("Tie!"));
        assert_eq!(value(&substitutions, "PLAYER_POINTS"), "0");
        assert_eq!(value(&substitutions, "HOUSE_POINTS"), "0");
    }

    #[test]
    fn test_match_ends_after_five_scored_rounds() {
        let game = DiceGame::new();
        for _ in 0..3 {
            game.roll("a", 6, 1);
        }
        game.roll("a", 2, 2);
        game.roll("a", 1, 6);
        let last = game.roll("a", 1, 6);

        assert!(value(&last, "RESULT").contains("Congratulations"));
        assert_eq!(value(&last, "PLAYER_POINTS"), "3");
        assert_eq!(value(&last, "HOUSE_POINTS"), "2");
        assert_eq!(value(&last, "CONTROLS"), NEW_GAME);
    }

    #[test]
    fn test_next_roll_after_match_starts_new_game() {
        let game = DiceGame::new();
        for _ in 0..5 {
            game.roll("a", 1, 6);
        }
        let fresh = game.roll("a", 6, 1);

        assert_eq!(value(&fresh, "PLAYER_POINTS"), "1");
        assert_eq!(value(&fresh, "HOUSE_POINTS"), "0");
        assert_eq!(value(&fresh, "CONTROLS"), ROLL);
    }

    #[test]
    fn test_sessions_do_not_share_scores() {
        let game = DiceGame::new();
        game.roll("a", 6, 1);
        let other = game.roll("b", 1, 6);

        assert_eq!(value(&other, "PLAYER_POINTS"), "0");
        assert_eq!(value(&other, "HOUSE_POINTS"), "1");
    }

    #[test]
    fn test_play_uses_real_dice() {
        let game = DiceGame::new();
        let outcome = game.play("a", &Form::default());

        assert!(outcome.rejected.is_none());
        let player: u8 = value(&outcome.substitutions, "PLAYER")
            .trim_start_matches("You rolled a ")
            .parse()
            .unwrap();
        assert!((1..=6).contains(&player));
    }

    #[test]
    fn test_forget_resets_board() {
        let game = DiceGame::new();
        game.roll("a", 6, 1);
        game.forget("a");
        assert_eq!(value(&game.view("a"), "PLAYER_POINTS"), "0");
    }
}
