//! Backup version numbers
//!
//! Versions are decimals with at most two fractional digits, stored as a
//! whole number of hundredths to avoid floating-point drift. A
//! [`VersionFormat`] such as `v000.00` fixes how many digits are rendered,
//! which keeps every rendered version the same width as its pattern.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::error::{GameSaveError, GameSaveResult};

static VERSION_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v?\d{1,3}(\.\d{1,2})?$").expect("static regex"));

/// A validated version pattern, e.g. `v000.00`, `00.0` or `000`
///
/// Every digit in the pattern is a zero-padded placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionFormat {
    pattern: String,
    prefixed: bool,
    int_digits: usize,
    frac_digits: usize,
}

impl VersionFormat {
    /// Parse and validate a version pattern
    pub fn parse(pattern: &str) -> GameSaveResult<Self> {
        if !VERSION_FORMAT.is_match(pattern) {
            return Err(GameSaveError::invalid_field(
                "version format",
                format!(
                    "'{}' must be of the form 'v999.99' or '999.99', where the decimal part is optional",
                    pattern
                ),
            ));
        }

        let prefixed = pattern.starts_with('v');
        let digits = pattern.trim_start_matches('v');
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));

        Ok(Self {
            pattern: pattern.to_string(),
            prefixed,
            int_digits: int_part.len(),
            frac_digits: frac_part.len(),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Number of characters every rendered version occupies
    pub fn width(&self) -> usize {
        self.pattern.len()
    }

    /// Smallest step representable by this pattern, in hundredths
    pub fn unit(&self) -> u32 {
        10u32.pow(2 - self.frac_digits as u32)
    }

    fn max_hundredths(&self) -> u32 {
        10u32.pow(self.int_digits as u32) * 100 - 1
    }

    /// Check that a version can be rendered without losing digits
    pub fn fits(&self, version: Version) -> bool {
        version.0 <= self.max_hundredths() && version.0 % self.unit() == 0
    }

    /// Render a version at the fixed width of this pattern
    pub fn render(&self, version: Version) -> GameSaveResult<String> {
        if !self.fits(version) {
            return Err(GameSaveError::VersionOverflow {
                version: version.to_string(),
                format: self.pattern.clone(),
            });
        }

        let mut out = String::with_capacity(self.width());
        if self.prefixed {
            out.push('v');
        }
        out.push_str(&format!(
            "{:0width$}",
            version.0 / 100,
            width = self.int_digits
        ));
        if self.frac_digits > 0 {
            let frac = (version.0 % 100) / self.unit();
            out.push_str(&format!(".{:0width$}", frac, width = self.frac_digits));
        }
        Ok(out)
    }

    /// Read a rendered version back, requiring the exact shape of the pattern
    pub fn read(&self, text: &str) -> Option<Version> {
        if text.len() != self.width() || !text.is_ascii() {
            return None;
        }

        let digits = if self.prefixed {
            text.strip_prefix('v')?
        } else {
            text
        };
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
        if int_part.len() != self.int_digits || frac_part.len() != self.frac_digits {
            return None;
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }

        let whole: u32 = int_part.parse().ok()?;
        let frac: u32 = if frac_part.is_empty() {
            0
        } else {
            frac_part.parse::<u32>().ok()? * self.unit()
        };
        Some(Version(whole * 100 + frac))
    }

    /// The version that follows `version` by one unit of this pattern
    pub fn next(&self, version: Version) -> GameSaveResult<Version> {
        let next = Version(version.0 + self.unit());
        if !self.fits(next) {
            return Err(GameSaveError::VersionOverflow {
                version: next.to_string(),
                format: self.pattern.clone(),
            });
        }
        Ok(next)
    }
}

impl Default for VersionFormat {
    fn default() -> Self {
        Self {
            pattern: "v000.00".to_string(),
            prefixed: true,
            int_digits: 3,
            frac_digits: 2,
        }
    }
}

impl TryFrom<String> for VersionFormat {
    type Error = GameSaveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VersionFormat> for String {
    fn from(format: VersionFormat) -> Self {
        format.pattern
    }
}

/// A version number stored as hundredths
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version(u32);

impl Version {
    pub const fn from_hundredths(hundredths: u32) -> Self {
        Self(hundredths)
    }

    pub const fn hundredths(&self) -> u32 {
        self.0
    }

    /// Parse a plain decimal such as `1`, `1.5`, `001.25` or `v1.50`
    pub fn parse(s: &str) -> GameSaveResult<Self> {
        let invalid = || {
            GameSaveError::Validation(format!(
                "Invalid version '{}'. Use a decimal with at most two fractional digits",
                s
            ))
        };

        let digits = s.trim().trim_start_matches('v');
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
        if int_part.is_empty()
            || frac_part.len() > 2
            || !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole: u32 = int_part.parse().map_err(|_| invalid())?;
        let frac: u32 = match frac_part.len() {
            0 => 0,
            1 => frac_part.parse::<u32>().map_err(|_| invalid())? * 10,
            _ => frac_part.parse().map_err(|_| invalid())?,
        };

        whole
            .checked_mul(100)
            .and_then(|h| h.checked_add(frac))
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl TryFrom<String> for Version {
    type Error = GameSaveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}
