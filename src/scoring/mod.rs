//! Score pipeline: share text -> raw score -> normalized 0..=100 -> leaderboards.

pub mod catalog;
pub mod leaderboard;
pub mod normalizer;
pub mod parser;
pub mod rank;

pub use catalog::{GameCatalog, GameDefinition};
pub use normalizer::{normalize_score, NormalizeError};
pub use parser::{parse_raw_score, ParseFailure};
