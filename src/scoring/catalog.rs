use super::normalizer::Formula;
use super::parser::{FieldValue, GridMode, ParseRule};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate game id in catalog: {0}")]
    DuplicateGame(String),
    #[error("invalid parse rule: {0}")]
    InvalidRule(#[from] regex::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Pasted share text.
    Text,
    /// A number typed by the player.
    Number,
}

/// Which way the raw value improves. Normalized scores are always higher-is-better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
}

#[derive(Debug, Clone)]
pub struct GameDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub link: String,
    pub input_mode: InputMode,
    pub direction: Direction,
    /// Weight used when picking the game of the day.
    pub rating: u32,
    pub rule: ParseRule,
    pub formula: Option<Formula>,
}

impl GameDefinition {
    /// Human readable hint shown when pasted text doesn't match the rule.
    pub fn expected_format(&self) -> String {
        self.rule.describe()
    }
}

/// Immutable registry of every game the server knows how to score.
#[derive(Debug, Clone)]
pub struct GameCatalog {
    games: Vec<GameDefinition>,
    index: HashMap<String, usize>,
}

impl GameCatalog {
    pub fn new(games: Vec<GameDefinition>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(games.len());
        for (i, game) in games.iter().enumerate() {
            if index.insert(game.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateGame(game.id.clone()));
            }
        }
        Ok(GameCatalog { games, index })
    }

    pub fn get(&self, game_id: &str) -> Option<&GameDefinition> {
        self.index.get(game_id).map(|&i| &self.games[i])
    }

    pub fn contains(&self, game_id: &str) -> bool {
        self.index.contains_key(game_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameDefinition> {
        self.games.iter()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn standard() -> Result<Self, CatalogError> {
        let guess_table = vec![(1, 100), (2, 95), (3, 90), (4, 80), (5, 65), (6, 50), (7, 0)];
        let mut games = Vec::new();

        games.push(game(
            "wordle",
            "Wordle",
            "Guess the hidden 5-letter word in 6 tries.",
            "https://www.nytimes.com/games/wordle/index.html",
            InputMode::Text,
            Direction::LowerIsBetter,
            5,
            ParseRule::fraction(6, Some(7.0), false)?,
            Some(Formula::StepTable(guess_table.clone())),
        ));
        games.push(game(
            "worldle",
            "Worldle",
            "Guess the country based on its silhouette.",
            "https://worldle.teuteuf.fr/",
            InputMode::Text,
            Direction::LowerIsBetter,
            4,
            ParseRule::fraction(6, Some(7.0), false)?,
            Some(Formula::StepTable(guess_table)),
        ));
        games.push(game(
            "hexle",
            "Hexle",
            "Wordle with six-letter words.",
            "https://hexle.net/",
            InputMode::Text,
            Direction::LowerIsBetter,
            2,
            ParseRule::fraction(6, Some(7.0), false)?,
            Some(Formula::linear_attempts(7.0)),
        ));
        games.push(game(
            "emovi",
            "Emovi",
            "Guess the movie from a sequence of emojis.",
            "https://emovi.teuteuf.fr/",
            InputMode::Text,
            Direction::LowerIsBetter,
            3,
            ParseRule::fraction(6, Some(7.0), false)?,
            Some(Formula::linear_attempts(7.0)),
        ));
        games.push(game(
            "guess-the-game",
            "Guess The Game",
            "Guess the video game from a series of screenshots.",
            "https://guessthe.game/",
            InputMode::Text,
            Direction::LowerIsBetter,
            3,
            ParseRule::fraction(6, Some(7.0), false)?,
            Some(Formula::linear_attempts(7.0)),
        ));
        games.push(game(
            "boardle",
            "Boardle",
            "Guess the board game in 5 tries.",
            "https://www.boardle.io/",
            InputMode::Text,
            Direction::LowerIsBetter,
            2,
            ParseRule::fraction(5, Some(6.0), false)?,
            Some(Formula::linear_attempts(6.0)),
        ));
        games.push(game(
            "squirdle",
            "Squirdle",
            "Guess the Pokémon from attribute hints in 9 tries.",
            "https://squirdle.fireblend.com/",
            InputMode::Text,
            Direction::LowerIsBetter,
            2,
            ParseRule::fraction(9, Some(10.0), false)?,
            Some(Formula::AttemptCurve {
                fail_at: 10.0,
                exponent: 0.5,
            }),
        ));
        games.push(game(
            "bandle",
            "Bandle",
            "Guess the song as more instruments are added.",
            "https://bandle.app/",
            InputMode::Text,
            Direction::LowerIsBetter,
            3,
            ParseRule::MarkerGrid {
                alphabet: vec!['⬛', '⬜', '🟥', '🟨', '🟩'],
                mode: GridMode::FirstSuccess {
                    success: '🟩',
                    fail_sentinel: 7.0,
                },
            },
            Some(Formula::linear_attempts(7.0)),
        ));
        games.push(game(
            "globle",
            "Globle",
            "Guess the mystery country of the world by proximity.",
            "https://globle-game.com/",
            InputMode::Number,
            Direction::LowerIsBetter,
            3,
            ParseRule::Direct,
            Some(Formula::linear_attempts(9.0)),
        ));
        games.push(game(
            "connections",
            "Connections",
            "Group words into four categories based on common themes.",
            "https://www.nytimes.com/games/connections",
            InputMode::Text,
            Direction::LowerIsBetter,
            5,
            ParseRule::MarkerGrid {
                alphabet: vec!['🟨', '🟩', '🟦', '🟪'],
                mode: GridMode::MistakeRows {
                    row_len: 4,
                    max_mistakes: 4,
                },
            },
            Some(Formula::MistakePenalty {
                penalty: 15.0,
                max_mistakes: 4.0,
            }),
        ));
        games.push(game(
            "strands",
            "Strands",
            "Find the theme words and the spangram.",
            "https://www.nytimes.com/games/strands",
            InputMode::Text,
            Direction::LowerIsBetter,
            4,
            ParseRule::MarkerGrid {
                alphabet: vec!['💡', '🔵', '🟡'],
                mode: GridMode::Count { marker: '💡' },
            },
            Some(Formula::MistakePenalty {
                penalty: 12.5,
                max_mistakes: 8.0,
            }),
        ));
        games.push(game(
            "mini-crossword",
            "The Mini",
            "A bite-sized crossword, solved against the clock.",
            "https://www.nytimes.com/crosswords/game/mini",
            InputMode::Text,
            Direction::LowerIsBetter,
            4,
            ParseRule::labeled("in", FieldValue::Duration)?,
            Some(Formula::TimeWindow {
                excellent_secs: 20.0,
                limit_secs: 180.0,
            }),
        ));
        games.push(game(
            "timeguessr",
            "Timeguessr",
            "Guess the year and place of historical photos.",
            "https://timeguessr.com/",
            InputMode::Text,
            Direction::HigherIsBetter,
            4,
            ParseRule::fraction(50_000, None, true)?,
            Some(Formula::RatioOfMax { maximum: 50_000.0 }),
        ));
        games.push(game(
            "foodguessr",
            "FoodGuessr",
            "Guess where in the world a dish comes from.",
            "https://www.foodguessr.com/",
            InputMode::Text,
            Direction::HigherIsBetter,
            2,
            ParseRule::labeled("Total score:", FieldValue::Number)?,
            Some(Formula::RatioOfMax { maximum: 15_000.0 }),
        ));
        games.push(game(
            "pokedoku",
            "PokéDoku",
            "Fill a 3x3 grid with Pokémon matching each row and column.",
            "https://pokedoku.com/",
            InputMode::Text,
            Direction::HigherIsBetter,
            2,
            ParseRule::labeled("Score:", FieldValue::Number)?,
            Some(Formula::RatioOfMax { maximum: 9.0 }),
        ));
        games.push(game(
            "geoguessr",
            "GeoGuessr Daily",
            "Guess locations based on Street View imagery.",
            "https://www.geoguessr.com/daily-challenges",
            InputMode::Number,
            Direction::HigherIsBetter,
            4,
            ParseRule::Direct,
            Some(Formula::RatioOfMax { maximum: 25_000.0 }),
        ));
        games.push(game(
            "geogrid",
            "GeoGrid",
            "Fill a grid of countries matching each category.",
            "https://www.geogridgame.com/",
            InputMode::Text,
            Direction::HigherIsBetter,
            2,
            ParseRule::percentile()?,
            Some(Formula::PassThrough),
        ));
        games.push(game(
            "victordle",
            "Victordle",
            "Guess the word before your rival does. Enter 1 for a win, 0 for a loss.",
            "https://victordle.com/",
            InputMode::Number,
            Direction::HigherIsBetter,
            1,
            ParseRule::Direct,
            Some(Formula::WinLoss),
        ));
        games.push(game(
            "cyphr",
            "Cyphr",
            "Crack a daily substitution cipher. Enter your points out of 28.",
            "https://cyphr.me/",
            InputMode::Number,
            Direction::HigherIsBetter,
            2,
            ParseRule::Direct,
            Some(Formula::RatioOfMax { maximum: 28.0 }),
        ));
        games.push(game(
            "wikispeedrun",
            "Wikipedia Speedrun",
            "Navigate from a start to an end Wikipedia page. Enter your time in seconds.",
            "https://www.wikispeedruns.com/",
            InputMode::Number,
            Direction::LowerIsBetter,
            2,
            ParseRule::Direct,
            Some(Formula::TimeWindow {
                excellent_secs: 30.0,
                limit_secs: 600.0,
            }),
        ));

        GameCatalog::new(games)
    }
}

#[allow(clippy::too_many_arguments)]
fn game(
    id: &str,
    name: &str,
    description: &str,
    link: &str,
    input_mode: InputMode,
    direction: Direction,
    rating: u32,
    rule: ParseRule,
    formula: Option<Formula>,
) -> GameDefinition {
    GameDefinition {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        link: link.to_string(),
        input_mode,
        direction,
        rating,
        rule,
        formula,
    }
}
