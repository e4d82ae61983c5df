//! Scoring for the word-arithmetic party game.
//!
//! Each round one player writes an expression, everyone guesses the word the
//! computer will answer with, and guesses are scored by cosine distance to
//! the computer's word. Only the rules live here; prompting is up to the
//! caller.

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::vector::{MAX_COSINE_DISTANCE, cosine_distance};

pub const DEFAULT_WINNING_SCORE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// One point to the closest guess
    #[default]
    Hard,
    /// Every player earns `1 - distance`, clamped to `[0, 1]`
    Soft,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub name: String,
    pub score: f32,
}

/// Splits a comma separated list of names.
pub fn parse_players(input: &str) -> Result<Vec<String>, GameError> {
    let mut names: Vec<String> = Vec::new();
    for raw in input.split(',') {
        let name = raw.trim();
        if name.is_empty() {
            return Err(if input.trim().is_empty() {
                GameError::NoPlayers
            } else {
                GameError::EmptyName
            });
        }
        if names.iter().any(|n| n == name) {
            return Err(GameError::DuplicatePlayer(name.to_string()));
        }
        names.push(name.to_string());
    }
    Ok(names)
}

/// Result of scoring one round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundOutcome {
    pub winner: String,
    /// `(player, distance to the computer's word)` in player order
    pub distances: Vec<(String, f32)>,
    /// `(player, points awarded)` in player order
    pub awarded: Vec<(String, f32)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    players: Vec<Player>,
    winning_score: u32,
    mode: ScoringMode,
    round: usize,
}

impl GameState {
    pub fn new(names: Vec<String>, winning_score: u32, mode: ScoringMode) -> Result<Self, GameError> {
        if names.is_empty() {
            return Err(GameError::NoPlayers);
        }
        if winning_score == 0 {
            return Err(GameError::InvalidWinningScore);
        }
        let players = names
            .into_iter()
            .map(|name| Player { name, score: 0.0 })
            .collect();
        Ok(Self {
            players,
            winning_score,
            mode,
            round: 0,
        })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn mode(&self) -> ScoringMode {
        self.mode
    }

    pub fn winning_score(&self) -> u32 {
        self.winning_score
    }

    /// Rounds played so far.
    pub fn round(&self) -> usize {
        self.round
    }

    /// The player who writes the expression for the next round.
    pub fn current_player(&self) -> &str {
        &self.players[self.round % self.players.len()].name
    }

    /// Scores one round.
    ///
    /// `answers` holds each player's guessed word vector; every player must
    /// have exactly one entry. `target` is the vector of the word the
    /// computer answered with. The smallest distance wins, earlier players
    /// win ties. A guess with an undefined distance (zero vector) counts as
    /// maximally distant.
    pub fn resolve_round(
        &mut self,
        answers: &[(&str, &[f32])],
        target: &[f32],
    ) -> Result<RoundOutcome, GameError> {
        let mut distances = Vec::with_capacity(self.players.len());
        for player in &self.players {
            let (_, vector) = answers
                .iter()
                .find(|(name, _)| *name == player.name)
                .ok_or_else(|| GameError::MissingAnswer(player.name.clone()))?;
            let distance = cosine_distance(vector, target).unwrap_or(MAX_COSINE_DISTANCE);
            distances.push((player.name.clone(), distance));
        }

        let mut winner = 0;
        for (i, (_, distance)) in distances.iter().enumerate() {
            if *distance < distances[winner].1 {
                winner = i;
            }
        }

        let awarded: Vec<(String, f32)> = distances
            .iter()
            .enumerate()
            .map(|(i, (name, distance))| {
                let points = match self.mode {
                    ScoringMode::Hard => {
                        if i == winner {
                            1.0
                        } else {
                            0.0
                        }
                    }
                    ScoringMode::Soft => soft_points(*distance),
                };
                (name.clone(), points)
            })
            .collect();

        for (player, (_, points)) in self.players.iter_mut().zip(&awarded) {
            player.score += points;
        }
        self.round += 1;

        Ok(RoundOutcome {
            winner: distances[winner].0.clone(),
            distances,
            awarded,
        })
    }

    /// Highest score; the earliest player wins ties.
    pub fn leader(&self) -> &Player {
        let mut leader = &self.players[0];
        for player in &self.players[1..] {
            if player.score > leader.score {
                leader = player;
            }
        }
        leader
    }

    pub fn is_over(&self) -> bool {
        self.leader().score >= self.winning_score as f32
    }
}

fn soft_points(distance: f32) -> f32 {
    ((1.0 - distance).clamp(0.0, 1.0) * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_parse_players() {
        assert_eq!(
            parse_players(" ada, grace ,linus").unwrap(),
            names(&["ada", "grace", "linus"])
        );
        assert_eq!(parse_players("solo").unwrap(), names(&["solo"]));
        assert_eq!(parse_players("  "), Err(GameError::NoPlayers));
        assert_eq!(parse_players("ada,,grace"), Err(GameError::EmptyName));
        assert_eq!(
            parse_players("ada, ada"),
            Err(GameError::DuplicatePlayer("ada".to_string()))
        );
    }

    #[test]
    fn test_new_game_validation() {
        assert_eq!(
            GameState::new(vec![], 10, ScoringMode::Hard).unwrap_err(),
            GameError::NoPlayers
        );
        assert_eq!(
            GameState::new(names(&["a"]), 0, ScoringMode::Hard).unwrap_err(),
            GameError::InvalidWinningScore
        );
    }

    #[test]
    fn test_turns_rotate() {
        let mut game = GameState::new(names(&["a", "b"]), 10, ScoringMode::Hard).unwrap();
        let target = [1.0, 0.0];
        let answers: [(&str, &[f32]); 2] = [("a", &[1.0, 0.0]), ("b", &[0.0, 1.0])];

        assert_eq!(game.current_player(), "a");
        game.resolve_round(&answers, &target).unwrap();
        assert_eq!(game.current_player(), "b");
        game.resolve_round(&answers, &target).unwrap();
        assert_eq!(game.current_player(), "a");
        assert_eq!(game.round(), 2);
    }

    #[test]
    fn test_hard_scoring() {
        let mut game = GameState::new(names(&["a", "b"]), 2, ScoringMode::Hard).unwrap();
        let answers: [(&str, &[f32]); 2] = [("a", &[0.0, 1.0]), ("b", &[0.9, 0.1])];

        let outcome = game.resolve_round(&answers, &[1.0, 0.0]).unwrap();
        assert_eq!(outcome.winner, "b");
        assert_eq!(outcome.awarded[1], ("b".to_string(), 1.0));
        assert_eq!(outcome.awarded[0], ("a".to_string(), 0.0));
        assert!(!game.is_over());

        game.resolve_round(&answers, &[1.0, 0.0]).unwrap();
        assert!(game.is_over());
        assert_eq!(game.leader().name, "b");
    }

    #[test]
    fn test_ties_go_to_first_player() {
        let mut game = GameState::new(names(&["a", "b"]), 5, ScoringMode::Hard).unwrap();
        let answers: [(&str, &[f32]); 2] = [("a", &[2.0, 0.0]), ("b", &[3.0, 0.0])];
        let outcome = game.resolve_round(&answers, &[1.0, 0.0]).unwrap();
        assert_eq!(outcome.winner, "a");
    }

    #[test]
    fn test_soft_scoring() {
        let mut game = GameState::new(names(&["a", "b"]), 5, ScoringMode::Soft).unwrap();
        let answers: [(&str, &[f32]); 2] = [("a", &[1.0, 0.0]), ("b", &[0.0, 1.0])];
        let outcome = game.resolve_round(&answers, &[1.0, 0.0]).unwrap();

        assert_eq!(outcome.awarded[0].1, 1.0);
        assert_eq!(outcome.awarded[1].1, 0.0);
        assert_eq!(game.players()[0].score, 1.0);
    }

    #[test]
    fn test_missing_answer() {
        let mut game = GameState::new(names(&["a", "b"]), 5, ScoringMode::Hard).unwrap();
        let answers: [(&str, &[f32]); 1] = [("a", &[1.0, 0.0])];
        assert_eq!(
            game.resolve_round(&answers, &[1.0, 0.0]).unwrap_err(),
            GameError::MissingAnswer("b".to_string())
        );
        assert_eq!(game.round(), 0);
    }
}
