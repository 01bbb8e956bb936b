use crate::scoring::catalog::{Direction, GameDefinition, InputMode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct GameInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub link: String,
    pub input_mode: InputMode,
    pub direction: Direction,
    pub expected_format: String,
    pub scoring_implemented: bool,
}

impl From<&GameDefinition> for GameInfo {
    fn from(game: &GameDefinition) -> Self {
        GameInfo {
            id: game.id.clone(),
            name: game.name.clone(),
            description: game.description.clone(),
            link: game.link.clone(),
            input_mode: game.input_mode,
            direction: game.direction,
            expected_format: game.expected_format(),
            scoring_implemented: game.formula.is_some(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FeaturedQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct FeaturedGame {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub game: GameInfo,
}
