//! Backup name format grammar
//!
//! A name format is an ordered string of single-character tokens, e.g.
//! `"PsD VsT R"`. Each capital token names one component of a backup name,
//! `s` stands for the configured separator and a literal space is kept as-is.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{GameSaveError, GameSaveResult};

/// One token of a name format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// `P` - the configured save prefix
    Prefix,
    /// `G` - the game directory name
    GameDirectory,
    /// `s` - the configured separator
    Separator,
    /// `D` - the backup date
    Date,
    /// `V` - the version number
    Version,
    /// `T` - the free text tag
    Tag,
    /// `R` - the reuse counter, rendered as `(NN)` when non-zero
    Reuse,
    /// `E` - the save file extension, including the leading dot
    Extension,
    /// ` ` - a literal space
    Space,
}

impl Token {
    /// Parse a token from its format character
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'P' => Some(Self::Prefix),
            'G' => Some(Self::GameDirectory),
            's' => Some(Self::Separator),
            'D' => Some(Self::Date),
            'V' => Some(Self::Version),
            'T' => Some(Self::Tag),
            'R' => Some(Self::Reuse),
            'E' => Some(Self::Extension),
            ' ' => Some(Self::Space),
            _ => None,
        }
    }

    /// The format character for this token
    pub fn as_char(&self) -> char {
        match self {
            Self::Prefix => 'P',
            Self::GameDirectory => 'G',
            Self::Separator => 's',
            Self::Date => 'D',
            Self::Version => 'V',
            Self::Tag => 'T',
            Self::Reuse => 'R',
            Self::Extension => 'E',
            Self::Space => ' ',
        }
    }

    /// Capital tokens carry a name component and may appear only once
    pub fn is_component(&self) -> bool {
        !matches!(self, Self::Separator | Self::Space)
    }
}

/// A validated name format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NameFormat {
    tokens: Vec<Token>,
}

impl NameFormat {
    /// Parse and validate a name format string
    pub fn parse(format: &str) -> GameSaveResult<Self> {
        if format.is_empty() {
            return Err(invalid("it cannot be empty"));
        }

        let mut tokens = Vec::with_capacity(format.len());
        let mut components = HashSet::new();
        let mut separator_pending = false;

        for c in format.chars() {
            let token = Token::from_char(c).ok_or_else(|| {
                invalid(format!(
                    "'{}' is not one of the characters PGsDVTRE or space",
                    c
                ))
            })?;

            if token.is_component() {
                if !components.insert(token) {
                    return Err(invalid(format!("'{}' occurs more than once", c)));
                }
                separator_pending = false;
            } else if token == Token::Separator {
                if separator_pending {
                    return Err(invalid(
                        "'s' can be present only once between any two capitals",
                    ));
                }
                separator_pending = true;
            }

            tokens.push(token);
        }

        if tokens.last() == Some(&Token::Separator) {
            return Err(invalid("it cannot end with 's'"));
        }

        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn contains(&self, token: Token) -> bool {
        self.tokens.contains(&token)
    }

    /// This format with an `E` token at the end, if it has none
    pub fn with_extension(mut self) -> Self {
        if !self.contains(Token::Extension) {
            self.tokens.push(Token::Extension);
        }
        self
    }
}

fn invalid(reason: impl Into<String>) -> GameSaveError {
    GameSaveError::invalid_field("name format", reason)
}

impl Default for NameFormat {
    fn default() -> Self {
        Self {
            tokens: vec![
                Token::Date,
                Token::Space,
                Token::Version,
                Token::Space,
                Token::Tag,
                Token::Space,
                Token::Reuse,
            ],
        }
    }
}

impl fmt::Display for NameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            write!(f, "{}", token.as_char())?;
        }
        Ok(())
    }
}

impl TryFrom<String> for NameFormat {
    type Error = GameSaveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NameFormat> for String {
    fn from(format: NameFormat) -> Self {
        format.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_formats() {
        for format in ["D V T R", "PsDsVsT", "GsD V T R", "PsD VsT RE", "T"] {
            let parsed = NameFormat::parse(format).unwrap();
            assert_eq!(parsed.to_string(), format);
        }
    }

    #[test]
    fn test_rejects_unknown_characters() {
        let err = NameFormat::parse("D X").unwrap_err();
        assert!(err.is_invalid_configuration());
    }

    #[test]
    fn test_rejects_duplicate_capitals() {
        assert!(NameFormat::parse("D V D").is_err());
    }

    #[test]
    fn test_rejects_trailing_separator() {
        assert!(NameFormat::parse("DsVs").is_err());
    }

    #[test]
    fn test_rejects_repeated_separator_between_capitals() {
        assert!(NameFormat::parse("Dss V").is_err());
        assert!(NameFormat::parse("Ds s V").is_err());
        assert!(NameFormat::parse("DsVsT").is_ok());
    }

    #[test]
    fn test_with_extension() {
        assert_eq!(NameFormat::default().with_extension().to_string(), "D V T RE");
        let format = NameFormat::parse("D V T RE").unwrap();
        assert_eq!(format.clone().with_extension(), format);
    }

    #[test]
    fn test_rejects_empty() {
        assert!(NameFormat::parse("").is_err());
    }

    #[test]
    fn test_serde_uses_string_form() {
        let format = NameFormat::parse("PsD V T").unwrap();
        let json = serde_json::to_string(&format).unwrap();
        assert_eq!(json, "\"PsD V T\"");

        let back: NameFormat = serde_json::from_str(&json).unwrap();
        assert_eq!(back, format);

        assert!(serde_json::from_str::<NameFormat>("\"DD\"").is_err());
    }
}
