use std::fmt::Write as _;
use std::iter::Peekable;
use std::str::{Chars, FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{DEFAULT_PATTERN, DateError, prelude::*};

/// Compiled form of `DEFAULT_PATTERN`
const DEFAULT_STRFTIME: &str = "%m/%d/%Y %I:%M %p";

/// Escape character that opens and closes literal text in a pattern
const QUOTE: char = '\'';

/// Characters set aside for optional sections and future extensions
const RESERVED: [char; 5] = ['[', ']', '{', '}', '#'];

/// Error type for pattern compilation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    /// Pattern text was empty.
    #[error("Pattern may not be empty")]
    Empty,

    /// Letter has no meaning as a field.
    #[error("Unknown pattern letter: {0}")]
    UnknownLetter(char),

    /// Letter repeated more times than its field allows.
    #[error("Too many pattern letters: {letter} (found {count})")]
    TooManyLetters { letter: char, count: usize },

    /// Reserved character used outside quotes.
    #[error("Pattern includes reserved character: '{0}'")]
    Reserved(char),

    /// Quote opened and never closed.
    #[error("Pattern ends with an incomplete string literal")]
    UnterminatedLiteral,
}

/// A validated date-time pattern such as `MM/dd/yyyy hh:mm a`.
///
/// Keeps the text it was created from and the equivalent chrono strftime
/// format, so it can be displayed as written and used to format and parse.
///
/// Day-of-year `DD` renders three digits (`005`), the same as `DDD`;
/// chrono has no two-digit minimum width for that field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display(fmt = "{text}")]
#[serde(try_from = "String", into = "String")]
pub struct Pattern {
    text: String,
    strftime: String,
}

impl Pattern {
    /// Compiles a pattern.
    ///
    /// # Errors
    /// Returns `PatternError` if the text is empty, uses an unknown or
    /// reserved letter, repeats a letter too often, or leaves a quote open.
    pub fn new(text: &str) -> Result<Self, PatternError> {
        let strftime = compile(text)?;
        tracing::trace!(pattern = text, %strftime, "Compiled date-time pattern");
        Ok(Self {
            text: text.to_owned(),
            strftime,
        })
    }

    /// The pattern as written
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The equivalent chrono strftime format
    pub fn strftime(&self) -> &str {
        &self.strftime
    }

    /// Formats `datetime` with this pattern.
    ///
    /// # Errors
    /// Returns `DateError::InvalidArgument` if chrono refuses to render a field.
    pub fn format(&self, datetime: &NaiveDateTime) -> Result<String, DateError> {
        let mut out = String::new();
        write!(out, "{}", datetime.format(&self.strftime)).map_err(|_| {
            DateError::InvalidArgument(format!("Pattern '{}' cannot format {datetime}", self.text))
        })?;
        Ok(out)
    }

    /// Parses `text` with this pattern.
    ///
    /// # Errors
    /// Returns `DateError::InvalidArgument` if `text` is empty, or
    /// `DateError::Parse` if it does not match the pattern or lacks the fields
    /// needed for a full date and time.
    pub fn parse(&self, text: &str) -> Result<NaiveDateTime, DateError> {
        if text.is_empty() {
            return Err(DateError::InvalidArgument(
                "Text to parse may not be empty".to_owned(),
            ));
        }
        NaiveDateTime::parse_from_str(text, &self.strftime).map_err(|e| {
            DateError::Parse(format!(
                "'{text}' does not match pattern '{}': {e}",
                self.text
            ))
        })
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self {
            text: DEFAULT_PATTERN.to_owned(),
            strftime: DEFAULT_STRFTIME.to_owned(),
        }
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Pattern {
    type Error = PatternError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let strftime = compile(&value)?;
        Ok(Self {
            text: value,
            strftime,
        })
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.text
    }
}

impl AsRef<str> for Pattern {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

// --- compilation ---

fn compile(text: &str) -> Result<String, PatternError> {
    if text.is_empty() {
        return Err(PatternError::Empty);
    }

    let mut out = String::with_capacity(text.len() * 2);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            QUOTE => compile_literal(&mut chars, &mut out)?,
            c if RESERVED.contains(&c) => return Err(PatternError::Reserved(c)),
            c if c.is_ascii_alphabetic() => {
                let mut count = 1;
                while chars.next_if_eq(&c).is_some() {
                    count += 1;
                }
                out.push_str(field(c, count)?);
            }
            c => push_literal(&mut out, c),
        }
    }
    Ok(out)
}

/// Consumes quoted text after the opening quote. `''` is a literal quote,
/// both inside and outside a quoted section.
fn compile_literal(chars: &mut Peekable<Chars<'_>>, out: &mut String) -> Result<(), PatternError> {
    if chars.next_if_eq(&QUOTE).is_some() {
        out.push(QUOTE);
        return Ok(());
    }
    loop {
        match chars.next() {
            None => return Err(PatternError::UnterminatedLiteral),
            Some(QUOTE) if chars.next_if_eq(&QUOTE).is_some() => out.push(QUOTE),
            Some(QUOTE) => return Ok(()),
            Some(c) => push_literal(out, c),
        }
    }
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

/// Maps a run of `count` identical pattern letters to a strftime specifier.
fn field(letter: char, count: usize) -> Result<&'static str, PatternError> {
    let spec = match (letter, count) {
        ('y' | 'u', 2) => "%y",
        ('y' | 'u', 1) => "%-Y",
        ('y' | 'u', 3 | 4) => "%Y",
        ('M' | 'L', 1) => "%-m",
        ('M' | 'L', 2) => "%m",
        ('M' | 'L', 3) => "%b",
        ('M' | 'L', 4) => "%B",
        ('d', 1) => "%-d",
        ('d', 2) => "%d",
        ('D', 1) => "%-j",
        // no two-wide day-of-year in chrono
        ('D', 2 | 3) => "%j",
        ('E', 1..=3) => "%a",
        ('E', 4) => "%A",
        ('a', 1) => "%p",
        ('h', 1) => "%-I",
        ('h', 2) => "%I",
        ('H', 1) => "%-H",
        ('H', 2) => "%H",
        ('m', 1) => "%-M",
        ('m', 2) => "%M",
        ('s', 1) => "%-S",
        ('s', 2) => "%S",
        ('S', 3) => "%3f",
        ('S', 6) => "%6f",
        ('S', 9) => "%9f",
        ('y' | 'u' | 'M' | 'L' | 'd' | 'D' | 'E' | 'a' | 'h' | 'H' | 'm' | 's' | 'S', _) => {
            return Err(PatternError::TooManyLetters { letter, count });
        }
        _ => return Err(PatternError::UnknownLetter(letter)),
    };
    Ok(spec)
}
