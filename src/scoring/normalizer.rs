use super::catalog::GameCatalog;
use thiserror::Error;

pub const MIN_SCORE: u8 = 0;
pub const MAX_SCORE: u8 = 100;

/// Normalization failures are catalog mistakes, not bad user input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("scoring algorithm not implemented for unknown game \"{0}\"")]
    UnknownGame(String),
    #[error("scoring algorithm not implemented for game \"{0}\"")]
    NotImplemented(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    /// Explicit score per discrete raw value; anything missing scores 0.
    StepTable(Vec<(u32, u32)>),
    /// `100 * (1 - ((raw - 1) / (fail_at - 1))^exponent)`, 0 at or beyond `fail_at`.
    AttemptCurve { fail_at: f64, exponent: f64 },
    RatioOfMax { maximum: f64 },
    MistakePenalty { penalty: f64, max_mistakes: f64 },
    /// Full marks up to `excellent_secs`, linear down to 0 at `limit_secs`.
    TimeWindow { excellent_secs: f64, limit_secs: f64 },
    PassThrough,
    WinLoss,
}

impl Formula {
    pub fn linear_attempts(fail_at: f64) -> Self {
        Formula::AttemptCurve {
            fail_at,
            exponent: 1.0,
        }
    }

    /// Unclamped score; callers go through [`normalize_score`] or [`clamp_round`].
    pub fn apply(&self, raw: f64) -> f64 {
        match self {
            Formula::StepTable(table) => {
                if raw.fract() != 0.0 {
                    return 0.0;
                }
                table
                    .iter()
                    .find(|(key, _)| f64::from(*key) == raw)
                    .map(|(_, score)| f64::from(*score))
                    .unwrap_or(0.0)
            }
            Formula::AttemptCurve { fail_at, exponent } => {
                if raw >= *fail_at {
                    0.0
                } else if raw < 1.0 {
                    100.0
                } else {
                    100.0 * (1.0 - ((raw - 1.0) / (fail_at - 1.0)).powf(*exponent))
                }
            }
            Formula::RatioOfMax { maximum } => raw / maximum * 100.0,
            Formula::MistakePenalty {
                penalty,
                max_mistakes,
            } => {
                if raw >= *max_mistakes {
                    0.0
                } else {
                    100.0 - raw * penalty
                }
            }
            Formula::TimeWindow {
                excellent_secs,
                limit_secs,
            } => {
                if raw <= *excellent_secs {
                    100.0
                } else if raw > *limit_secs {
                    0.0
                } else {
                    100.0 - (raw - excellent_secs) / (limit_secs - excellent_secs) * 100.0
                }
            }
            Formula::PassThrough => raw,
            Formula::WinLoss => {
                if raw == 1.0 {
                    100.0
                } else {
                    0.0
                }
            }
        }
    }
}

pub fn clamp_round(value: f64) -> u8 {
    if !value.is_finite() {
        return MIN_SCORE;
    }
    value
        .clamp(f64::from(MIN_SCORE), f64::from(MAX_SCORE))
        .round() as u8
}

pub fn normalize_score(
    catalog: &GameCatalog,
    game_id: &str,
    raw_score: f64,
) -> Result<u8, NormalizeError> {
    let game = catalog
        .get(game_id)
        .ok_or_else(|| NormalizeError::UnknownGame(game_id.to_string()))?;
    let formula = game
        .formula
        .as_ref()
        .ok_or_else(|| NormalizeError::NotImplemented(game_id.to_string()))?;
    Ok(clamp_round(formula.apply(raw_score)))
}
