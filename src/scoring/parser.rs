//! Extraction of a raw numeric score from pasted share text.
//!
//! Every game owns exactly one [`ParseRule`]. A rule either yields a number or a
//! [`ParseFailure`]; it never falls back to a best-effort value.

use super::catalog::GameCatalog;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

const NUMERAL: &str = r"\d{1,3}(?:,\d{3})+|\d+";
const SEPARATORS: &[char] = &[',', '\u{a0}', '\u{202f}'];
const INVISIBLE: &[char] = &['\u{fe0f}', '\u{fe0e}', '\u{200d}'];

lazy_static! {
    /// Digits grouped by thousands (or not grouped at all), optional decimals.
    static ref NUMBER_SHAPE: Regex =
        Regex::new(r"^(?:\d{1,3}(?:[,\u{a0}\u{202f}]\d{3})+|\d+)(?:\.\d+)?$")
            .expect("number pattern compiles");
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseFailure {
    #[error("unknown game: {0}")]
    UnknownGame(String),
    #[error("no score found in the pasted text")]
    NoMatch,
    #[error("not a valid number: {0}")]
    InvalidNumber(String),
    #[error("score {0} is out of range")]
    OutOfRange(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue {
    Number,
    /// `M:SS` or `H:MM:SS`, converted to seconds.
    Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridMode {
    /// 1-based position of the first success glyph; no success means the fail sentinel.
    FirstSuccess { success: char, fail_sentinel: f64 },
    /// Rows of `row_len` glyphs that aren't all the same glyph are mistakes.
    MistakeRows { row_len: usize, max_mistakes: usize },
    /// Number of occurrences of `marker` across the grid.
    Count { marker: char },
}

#[derive(Debug, Clone)]
pub enum ParseRule {
    Direct,
    Fraction {
        pattern: Regex,
        denominator: u32,
        fail_sentinel: Option<f64>,
        allow_zero: bool,
    },
    MarkerGrid {
        alphabet: Vec<char>,
        mode: GridMode,
    },
    LabeledField {
        label: String,
        pattern: Regex,
        value: FieldValue,
    },
    Percentile {
        pattern: Regex,
    },
}

impl ParseRule {
    pub fn fraction(
        denominator: u32,
        fail_sentinel: Option<f64>,
        allow_zero: bool,
    ) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(r"(?:^|[^\w.,])({NUMERAL}|[Xx])\s*/\s*({NUMERAL})"))?;
        Ok(ParseRule::Fraction {
            pattern,
            denominator,
            fail_sentinel,
            allow_zero,
        })
    }

    pub fn labeled(label: &str, value: FieldValue) -> Result<Self, regex::Error> {
        let label = label.trim();
        let boundary = if label.starts_with(|c: char| c.is_alphanumeric()) {
            r"\b"
        } else {
            ""
        };
        let capture = match value {
            FieldValue::Number => format!(r"((?:{NUMERAL})(?:\.\d+)?)"),
            FieldValue::Duration => r"(\d{1,2}):(\d{2})(?::(\d{2}))?".to_string(),
        };
        let pattern = Regex::new(&format!(
            r"(?i){boundary}{}\s*{capture}",
            regex::escape(label)
        ))?;
        Ok(ParseRule::LabeledField {
            label: label.to_string(),
            pattern,
            value,
        })
    }

    pub fn percentile() -> Result<Self, regex::Error> {
        let pattern = Regex::new(r"(?i)better\s+than\s+(\d{1,3}(?:\.\d+)?)\s*%")?;
        Ok(ParseRule::Percentile { pattern })
    }

    pub fn parse(&self, raw_text: &str) -> Result<f64, ParseFailure> {
        let text = raw_text.replace("\r\n", "\n");
        let text = text.trim();
        if text.is_empty() {
            return Err(ParseFailure::NoMatch);
        }

        match self {
            ParseRule::Direct => parse_direct(text),
            ParseRule::Fraction {
                pattern,
                denominator,
                fail_sentinel,
                allow_zero,
            } => parse_fraction(pattern, text, *denominator, *fail_sentinel, *allow_zero),
            ParseRule::MarkerGrid { alphabet, mode } => parse_grid(text, alphabet, mode),
            ParseRule::LabeledField { pattern, value, .. } => {
                let caps = pattern.captures(text).ok_or(ParseFailure::NoMatch)?;
                match value {
                    FieldValue::Number => parse_numeral(&caps[1]),
                    FieldValue::Duration => {
                        let first = parse_numeral(&caps[1])?;
                        let second = parse_numeral(&caps[2])?;
                        match caps.get(3) {
                            Some(third) => {
                                let third = parse_numeral(third.as_str())?;
                                if second >= 60.0 || third >= 60.0 {
                                    return Err(ParseFailure::OutOfRange(third));
                                }
                                Ok(first * 3600.0 + second * 60.0 + third)
                            }
                            None => {
                                if second >= 60.0 {
                                    return Err(ParseFailure::OutOfRange(second));
                                }
                                Ok(first * 60.0 + second)
                            }
                        }
                    }
                }
            }
            ParseRule::Percentile { pattern } => {
                let caps = pattern.captures(text).ok_or(ParseFailure::NoMatch)?;
                let value = parse_numeral(&caps[1])?;
                if value > 100.0 {
                    return Err(ParseFailure::OutOfRange(value));
                }
                Ok(value)
            }
        }
    }

    /// Describes the text this rule accepts, for user-facing error messages.
    pub fn describe(&self) -> String {
        match self {
            ParseRule::Direct => "a plain number, e.g. 42".to_string(),
            ParseRule::Fraction {
                denominator,
                fail_sentinel,
                ..
            } => {
                if fail_sentinel.is_some() {
                    format!(
                        "share text containing your result, e.g. 3/{denominator} or X/{denominator}"
                    )
                } else {
                    format!("share text containing your score, e.g. 1,234/{denominator}")
                }
            }
            ParseRule::MarkerGrid { alphabet, .. } => {
                let glyphs: String = alphabet.iter().collect();
                format!("the share text including the emoji grid ({glyphs})")
            }
            ParseRule::LabeledField { label, value, .. } => match value {
                FieldValue::Number => format!("share text containing \"{label} 123\""),
                FieldValue::Duration => format!("share text containing \"{label} 1:23\""),
            },
            ParseRule::Percentile { .. } => {
                "share text containing \"better than NN.N%\"".to_string()
            }
        }
    }
}

/// Parses `raw_text` with the rule registered for `game_id`.
pub fn parse_raw_score(
    catalog: &GameCatalog,
    game_id: &str,
    raw_text: &str,
) -> Result<f64, ParseFailure> {
    let game = catalog
        .get(game_id)
        .ok_or_else(|| ParseFailure::UnknownGame(game_id.to_string()))?;
    game.rule.parse(raw_text)
}

fn strip_separators(s: &str) -> String {
    s.chars().filter(|c| !SEPARATORS.contains(c)).collect()
}

fn parse_numeral(s: &str) -> Result<f64, ParseFailure> {
    let trimmed = s.trim();
    if !NUMBER_SHAPE.is_match(trimmed) {
        return Err(ParseFailure::InvalidNumber(s.to_string()));
    }
    let cleaned = strip_separators(trimmed);
    let value: f64 = cleaned
        .parse()
        .map_err(|_| ParseFailure::InvalidNumber(s.to_string()))?;
    if !value.is_finite() {
        return Err(ParseFailure::InvalidNumber(s.to_string()));
    }
    if value < 0.0 {
        return Err(ParseFailure::OutOfRange(value));
    }
    Ok(value)
}

fn parse_direct(text: &str) -> Result<f64, ParseFailure> {
    // A typed number is a single token; anything else is share text for another rule.
    if text.contains(char::is_whitespace) && !text.contains(SEPARATORS) {
        return Err(ParseFailure::InvalidNumber(text.to_string()));
    }
    parse_numeral(text)
}

fn parse_fraction(
    pattern: &Regex,
    text: &str,
    denominator: u32,
    fail_sentinel: Option<f64>,
    allow_zero: bool,
) -> Result<f64, ParseFailure> {
    let expected = f64::from(denominator);
    for caps in pattern.captures_iter(text) {
        if parse_numeral(&caps[2])? != expected {
            continue;
        }
        let numerator = &caps[1];
        if numerator.eq_ignore_ascii_case("x") {
            return fail_sentinel.ok_or_else(|| ParseFailure::InvalidNumber(numerator.to_string()));
        }
        let value = parse_numeral(numerator)?;
        if value > expected || (value == 0.0 && !allow_zero) {
            return Err(ParseFailure::OutOfRange(value));
        }
        return Ok(value);
    }
    Err(ParseFailure::NoMatch)
}

fn grid_lines(text: &str, alphabet: &[char]) -> Vec<Vec<char>> {
    text.lines()
        .map(|line| {
            line.chars()
                .filter(|c| !c.is_whitespace() && !INVISIBLE.contains(c))
                .collect::<Vec<_>>()
        })
        .filter(|glyphs| !glyphs.is_empty() && glyphs.iter().all(|c| alphabet.contains(c)))
        .collect()
}

fn parse_grid(text: &str, alphabet: &[char], mode: &GridMode) -> Result<f64, ParseFailure> {
    let rows = grid_lines(text, alphabet);
    if rows.is_empty() {
        return Err(ParseFailure::NoMatch);
    }

    match mode {
        GridMode::FirstSuccess {
            success,
            fail_sentinel,
        } => Ok(rows
            .iter()
            .flatten()
            .position(|c| c == success)
            .map(|i| (i + 1) as f64)
            .unwrap_or(*fail_sentinel)),
        GridMode::MistakeRows {
            row_len,
            max_mistakes,
        } => {
            if rows.iter().any(|row| row.len() != *row_len) {
                return Err(ParseFailure::NoMatch);
            }
            let mistakes = rows
                .iter()
                .filter(|row| row.iter().any(|c| *c != row[0]))
                .count();
            if mistakes > *max_mistakes {
                return Err(ParseFailure::OutOfRange(mistakes as f64));
            }
            Ok(mistakes as f64)
        }
        GridMode::Count { marker } => {
            Ok(rows.iter().flatten().filter(|c| *c == marker).count() as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> GameCatalog {
        GameCatalog::standard().unwrap()
    }

    #[test]
    fn wordle_share_text() {
        let text = "Wordle 1,468 4/6\n\n⬛⬛⬛🟨🟨\n🟩🟩⬛⬛🟨\n⬛🟩🟩🟩🟩\n🟩🟩🟩🟩🟩";
        assert_eq!(parse_raw_score(&catalog(), "wordle", text), Ok(4.0));
    }

    #[test]
    fn hexle_share_text() {
        let text = "Hexle #512 3/6\n🟩🟩🟩🟩🟩🟩";
        assert_eq!(parse_raw_score(&catalog(), "hexle", text), Ok(3.0));
    }

    #[test]
    fn wordle_failure_is_sentinel() {
        let text = "Wordle 1,470 X/6\n⬛⬛⬛⬛⬛";
        assert_eq!(parse_raw_score(&catalog(), "wordle", text), Ok(7.0));
    }

    #[test]
    fn wordle_tolerates_crlf_and_padding() {
        let text = "   \r\nWordle 1,468 3/6*\r\n🟩🟩🟩🟩🟩\r\n  ";
        assert_eq!(parse_raw_score(&catalog(), "wordle", text), Ok(3.0));
    }

    #[test]
    fn fraction_rejects_numerator_above_denominator() {
        assert_eq!(
            parse_raw_score(&catalog(), "wordle", "Wordle 9/6"),
            Err(ParseFailure::OutOfRange(9.0))
        );
    }

    #[test]
    fn fraction_ignores_other_denominators() {
        assert_eq!(
            parse_raw_score(&catalog(), "boardle", "Boardle 3/6"),
            Err(ParseFailure::NoMatch)
        );
        assert_eq!(parse_raw_score(&catalog(), "boardle", "Boardle #12 3/5"), Ok(3.0));
    }

    #[test]
    fn timeguessr_comma_grouped_fraction() {
        let text = "TimeGuessr #268 38,521/50,000\n🌎🟩🟩🟨 📅🟩⬛️⬛️";
        assert_eq!(parse_raw_score(&catalog(), "timeguessr", text), Ok(38_521.0));
    }

    #[test]
    fn connections_counts_mistake_rows() {
        let text = "Connections Puzzle #746\n🟨🟨🟨🟨\n🟪🟪🟪🟪\n🟩🟩🟦🟩\n🟩🟩🟩🟩\n🟦🟦🟦🟦";
        assert_eq!(parse_raw_score(&catalog(), "connections", text), Ok(1.0));
    }

    #[test]
    fn connections_rejects_ragged_rows() {
        let text = "Connections\n🟨🟨🟨\n🟪🟪🟪🟪";
        assert_eq!(
            parse_raw_score(&catalog(), "connections", text),
            Err(ParseFailure::NoMatch)
        );
    }

    #[test]
    fn bandle_first_success_position() {
        let text = "Bandle #612 3/6\n⬛🟥🟩⬜⬜⬜\n#Bandle #Heardle";
        assert_eq!(parse_raw_score(&catalog(), "bandle", text), Ok(3.0));
        let failed = "Bandle #612 x/6\n⬛🟥🟥🟥🟥🟥";
        assert_eq!(parse_raw_score(&catalog(), "bandle", failed), Ok(7.0));
    }

    #[test]
    fn strands_counts_hints() {
        let text = "Strands #123\n“Lights out”\n💡🔵🔵🟡\n💡🔵🔵";
        assert_eq!(parse_raw_score(&catalog(), "strands", text), Ok(2.0));
    }

    #[test]
    fn mini_crossword_duration() {
        let text = "I solved the Aug 20, 2024 New York Times Mini Crossword in 0:45!";
        assert_eq!(parse_raw_score(&catalog(), "mini-crossword", text), Ok(45.0));
        let long = "I solved the Mini Crossword in 1:02:03!";
        assert_eq!(parse_raw_score(&catalog(), "mini-crossword", long), Ok(3723.0));
    }

    #[test]
    fn labeled_number_with_separators() {
        let text = "FoodGuessr 🍝\nTotal score: 12,345 / 15,000";
        assert_eq!(parse_raw_score(&catalog(), "foodguessr", text), Ok(12_345.0));
        assert_eq!(
            parse_raw_score(&catalog(), "pokedoku", "PokeDoku\nscore: 7/9"),
            Ok(7.0)
        );
    }

    #[test]
    fn geogrid_percentile() {
        let text = "🌍 GeoGrid #203\nScore: 123.4 | Rank: 1,234 / 9,876\n\
                    better than 87.5% of players";
        assert_eq!(parse_raw_score(&catalog(), "geogrid", text), Ok(87.5));
    }

    #[test]
    fn direct_numbers() {
        assert_eq!(parse_raw_score(&catalog(), "geoguessr", " 18,500 "), Ok(18_500.0));
        assert_eq!(parse_raw_score(&catalog(), "globle", "4"), Ok(4.0));
        assert!(parse_raw_score(&catalog(), "globle", "-3").is_err());
        assert!(parse_raw_score(&catalog(), "globle", "NaN").is_err());
        assert!(parse_raw_score(&catalog(), "globle", "inf").is_err());
        assert!(parse_raw_score(&catalog(), "globle", "4 guesses").is_err());
        assert_eq!(parse_raw_score(&catalog(), "geoguessr", "18\u{a0}500"), Ok(18_500.0));
        assert_eq!(parse_raw_score(&catalog(), "geoguessr", "4.5"), Ok(4.5));
        assert_eq!(parse_raw_score(&catalog(), "cyphr", "21"), Ok(21.0));
    }

    #[test]
    fn misgrouped_numbers_are_rejected() {
        let catalog = catalog();
        for (game, input) in [
            ("globle", "12,34"),
            ("globle", ",,4,,"),
            ("geoguessr", "4,5"),
            ("victordle", "1,0"),
            ("geoguessr", "1,2345"),
        ] {
            assert!(
                matches!(
                    parse_raw_score(&catalog, game, input),
                    Err(ParseFailure::InvalidNumber(_))
                ),
                "{} parsed {:?}",
                game,
                input
            );
        }
    }

    #[test]
    fn garbage_never_parses() {
        let catalog = catalog();
        let inputs = [
            "",
            "   ",
            "hello world",
            "I had a lovely day at the beach.",
            "🙂🙂🙂",
            "check your inbox/6",
            "Box/6",
            "3.5/6",
            "Wordle 3.5/6",
        ];
        for game in catalog.iter() {
            for input in inputs {
                assert!(
                    game.rule.parse(input).is_err(),
                    "{} parsed {:?}",
                    game.id,
                    input
                );
            }
        }
    }

    #[test]
    fn parsing_is_idempotent() {
        let catalog = catalog();
        let text = "Connections Puzzle #746\n🟨🟨🟨🟨\n🟪🟪🟪🟪\n🟩🟩🟦🟩\n🟩🟩🟩🟩\n🟦🟦🟦🟦";
        for game in catalog.iter() {
            assert_eq!(game.rule.parse(text), game.rule.parse(text));
        }
    }

    #[test]
    fn unknown_game_fails() {
        assert_eq!(
            parse_raw_score(&catalog(), "chess", "1/6"),
            Err(ParseFailure::UnknownGame("chess".into()))
        );
    }
}
