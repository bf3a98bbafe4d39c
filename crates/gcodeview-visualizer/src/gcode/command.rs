//! G-Code line tokenization
//!
//! Splits one source line into its command number and parameter words.
//! Interpretation (modal state, motion) lives in the parser.

use gcodeview_core::GcodeError;
use regex::Regex;
use std::sync::OnceLock;

/// Parameter words recognised on a line
///
/// Only the first occurrence of each letter is kept; a letter without a
/// numeric token after it is absent rather than zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Words {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub i: Option<f64>,
    pub j: Option<f64>,
    pub k: Option<f64>,
    pub f: Option<f64>,
}

impl Words {
    fn slot(&mut self, letter: char) -> Option<&mut Option<f64>> {
        match letter {
            'X' => Some(&mut self.x),
            'Y' => Some(&mut self.y),
            'Z' => Some(&mut self.z),
            'I' => Some(&mut self.i),
            'J' => Some(&mut self.j),
            'K' => Some(&mut self.k),
            'F' => Some(&mut self.f),
            _ => None,
        }
    }
}

/// One non-empty source line after comment removal
#[derive(Debug, Clone, PartialEq)]
pub struct GcodeLine {
    /// Number of the first `G` word, if any (`G01` -> 1)
    pub command: Option<u32>,
    pub words: Words,
}

fn comment_regex() -> &'static Regex {
    static COMMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    COMMENT_REGEX.get_or_init(|| Regex::new(r"\([^)]*(\)|$)").expect("invalid regex pattern"))
}

fn command_regex() -> &'static Regex {
    static COMMAND_REGEX: OnceLock<Regex> = OnceLock::new();
    COMMAND_REGEX.get_or_init(|| Regex::new(r"G(\d+)").expect("invalid regex pattern"))
}

fn word_regex() -> &'static Regex {
    static WORD_REGEX: OnceLock<Regex> = OnceLock::new();
    WORD_REGEX.get_or_init(|| {
        Regex::new(r"([XYZIJKF])([-+]?[0-9.]+)").expect("invalid regex pattern")
    })
}

/// Remove `( ... )` comments and everything after `;`
pub fn strip_comments(line: &str) -> String {
    let without_parens = comment_regex().replace_all(line, " ");
    match without_parens.find(';') {
        Some(pos) => without_parens[..pos].to_string(),
        None => without_parens.into_owned(),
    }
}

impl GcodeLine {
    /// Tokenize a raw source line.
    ///
    /// Returns `Ok(None)` when nothing but whitespace and comments remain.
    /// A numeric token that is not a decimal number is an error.
    pub fn parse(raw: &str, line_number: u32) -> Result<Option<Self>, GcodeError> {
        let cleaned = strip_comments(raw);
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return Ok(None);
        }

        // Out-of-range command numbers are treated like an unknown command
        let command = command_regex()
            .captures(cleaned)
            .and_then(|caps| caps[1].parse::<u32>().ok());

        let mut words = Words::default();
        for caps in word_regex().captures_iter(cleaned) {
            let letter = caps[1].chars().next().unwrap_or_default();
            let Some(slot) = words.slot(letter) else {
                continue;
            };
            if slot.is_some() {
                continue;
            }
            let token = &caps[2];
            let value = token
                .parse::<f64>()
                .map_err(|_| GcodeError::InvalidParameter {
                    line_number,
                    param: letter,
                    reason: format!("'{}' is not a number", token),
                })?;
            if !value.is_finite() {
                return Err(GcodeError::InvalidParameter {
                    line_number,
                    param: letter,
                    reason: format!("'{}' is out of range", token),
                });
            }
            *slot = Some(value);
        }

        Ok(Some(Self { command, words }))
    }
}
