//! Game configuration model
//!
//! A `GameConfig` describes where a game keeps its save, where backups go and
//! how backup names are rendered. Every text field with a format constraint is
//! a validated newtype, so an invalid value is rejected when it is assigned or
//! when the configuration file is deserialised.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::LazyLock;

use super::format::{NameFormat, Token};
use super::version::{Version, VersionFormat};
use crate::backup::StrategyKind;
use crate::error::{GameSaveError, GameSaveResult};
use crate::monitor::MonitoringMode;

static FILENAME_CHARS_0_TO_3: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\-. ]{0,3}$").expect("static regex"));
static PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\-. ][\w\-. ]{0,18}[\w\-]$").expect("static regex"));
static PARTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\-+^&]*$").expect("static regex"));
static REVERT_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\-]{1,20}$").expect("static regex"));

fn is_valid_prefix(value: &str) -> bool {
    value.is_empty() || (PREFIX.is_match(value) && !value.contains(". "))
}

fn is_valid_short_text(value: &str) -> bool {
    FILENAME_CHARS_0_TO_3.is_match(value)
}

fn is_valid_parts(value: &str) -> bool {
    PARTS.is_match(value)
}

fn is_valid_revert_suffix(value: &str) -> bool {
    REVERT_SUFFIX.is_match(value)
}

/// Declares a string newtype that can only hold values passing `$check`
macro_rules! validated_text {
    ($(#[$meta:meta])* $name:ident, $field:literal, $check:path, $hint:literal, $default:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn parse(value: &str) -> GameSaveResult<Self> {
                if $check(value) {
                    Ok(Self(value.to_string()))
                } else {
                    Err(GameSaveError::invalid_field(
                        $field,
                        format!("'{}': {}", value, $hint),
                    ))
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self($default.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = GameSaveError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

validated_text!(
    /// Prefix of backup names, or of the live save file name
    SavePrefix,
    "prefix",
    is_valid_prefix,
    "it can be up to 20 characters that are valid in a filename, excluding '/'",
    ""
);

validated_text!(
    /// Save file extension without the leading dot
    Extension,
    "extension",
    is_valid_short_text,
    "it can be up to 3 characters that are valid in a filename",
    ""
);

validated_text!(
    /// Text rendered for each `s` token of a name format
    Separator,
    "separator",
    is_valid_short_text,
    "it can be up to 3 characters that are valid in a filename",
    " - "
);

validated_text!(
    /// Marker characters that switch the tag merge rule to partial replacement
    Parts,
    "parts",
    is_valid_parts,
    "it can contain any combination of -+^& in any order",
    "-+"
);

validated_text!(
    /// Name of the revert artifact and the automatic backup area
    RevertSuffix,
    "revert suffix",
    is_valid_revert_suffix,
    "it must be 1 to 20 letters, digits, '_' or '-'",
    "mybak"
);

impl Parts {
    pub fn contains(&self, c: char) -> bool {
        self.0.contains(c)
    }
}

/// A strftime pattern for backup dates, e.g. `%Y-%m-%d`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateFormat(String);

impl DateFormat {
    pub fn parse(pattern: &str) -> GameSaveResult<Self> {
        let invalid = |reason: &str| {
            GameSaveError::invalid_field("date format", format!("'{}': {}", pattern, reason))
        };

        if pattern.is_empty() {
            return Err(invalid("it cannot be empty"));
        }
        if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
            return Err(invalid("it must be a valid strftime format string"));
        }

        let format = Self(pattern.to_string());
        let samples = format.samples();
        if samples.iter().any(|s| s.contains(['/', '\\', ':'])) {
            return Err(invalid("it must not render path separators or ':'"));
        }

        let width = samples.first().map_or(0, |s| s.chars().count());
        if samples.iter().any(|s| s.chars().count() != width) {
            return Err(invalid("every date must render to the same width, use padded fields"));
        }
        Ok(format)
    }

    /// Renderings of dates covering every month, weekday, short and long day
    /// numbers, and both halves of the day
    fn samples(&self) -> Vec<String> {
        let mut dates = Vec::new();
        for month in 1..=12 {
            for day in [1, 9, 28] {
                dates.extend(NaiveDate::from_ymd_opt(2024, month, day));
            }
        }
        dates.extend((1..=7).filter_map(|day| NaiveDate::from_ymd_opt(2025, 9, day)));

        dates
            .into_iter()
            .flat_map(|date| [date.and_hms_opt(1, 2, 3), date.and_hms_opt(23, 59, 59)])
            .flatten()
            .filter_map(|naive| Local.from_local_datetime(&naive).earliest())
            .map(|at| self.render(at))
            .collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn render(&self, at: DateTime<Local>) -> String {
        at.format(&self.0).to_string()
    }

    /// Number of characters every rendered date occupies
    pub fn rendered_width(&self) -> usize {
        self.render(Local::now()).chars().count()
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self("%Y-%m-%d".to_string())
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DateFormat {
    type Error = GameSaveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DateFormat> for String {
    fn from(value: DateFormat) -> Self {
        value.0
    }
}

/// The file the game writes its save into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SaveFile {
    pub prefix: SavePrefix,
    #[serde(default)]
    pub extension: Extension,
}

impl SaveFile {
    pub fn new(prefix: &str, extension: &str) -> GameSaveResult<Self> {
        Ok(Self {
            prefix: SavePrefix::parse(prefix)?,
            extension: Extension::parse(extension)?,
        })
    }

    /// File name of the live save, `prefix.extension`
    pub fn name(&self) -> String {
        if self.extension.is_empty() {
            self.prefix.to_string()
        } else {
            format!("{}.{}", self.prefix, self.extension)
        }
    }
}

/// One configured game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Display name, unique within the library
    pub name: String,

    /// Folder where the game itself writes its save
    pub parent_directory: PathBuf,

    /// Folder where backups are kept
    pub user_directory: PathBuf,

    /// Sub folder of `parent_directory` holding the save
    #[serde(default)]
    pub game_directory: String,

    /// Storage strategy used for this game
    #[serde(rename = "strategy_type")]
    pub strategy: StrategyKind,

    #[serde(default)]
    pub name_format: NameFormat,

    #[serde(default)]
    pub date_format: DateFormat,

    #[serde(default)]
    pub version_format: VersionFormat,

    /// Version used when the first backup of a game is taken
    #[serde(default)]
    pub initial_version: Version,

    #[serde(default)]
    pub save_prefix: SavePrefix,

    #[serde(default)]
    pub parts: Parts,

    #[serde(default)]
    pub separator: Separator,

    #[serde(default = "default_max_backups")]
    pub max_backups: usize,

    #[serde(default)]
    pub revert_suffix: RevertSuffix,

    #[serde(default)]
    pub monitoring_mode: MonitoringMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_file: Option<SaveFile>,
}

fn default_max_backups() -> usize {
    50
}

impl GameConfig {
    /// Create a configuration with default naming settings
    ///
    /// Single file games get the default name format with an `E` token
    /// appended, so backups keep the save's extension.
    pub fn new(
        name: impl Into<String>,
        parent_directory: impl Into<PathBuf>,
        user_directory: impl Into<PathBuf>,
        strategy: StrategyKind,
    ) -> Self {
        let name_format = match strategy {
            StrategyKind::PeerDirectory => NameFormat::default(),
            StrategyKind::SubordinateUserFile => NameFormat::default().with_extension(),
        };

        Self {
            name: name.into(),
            parent_directory: parent_directory.into(),
            user_directory: user_directory.into(),
            game_directory: String::new(),
            strategy,
            name_format,
            date_format: DateFormat::default(),
            version_format: VersionFormat::default(),
            initial_version: Version::default(),
            save_prefix: SavePrefix::default(),
            parts: Parts::default(),
            separator: Separator::default(),
            max_backups: default_max_backups(),
            revert_suffix: RevertSuffix::default(),
            monitoring_mode: MonitoringMode::default(),
            save_file: None,
        }
    }

    /// Extension of backups and of the live save, empty when not configured
    pub fn extension(&self) -> &str {
        self.save_file
            .as_ref()
            .map(|f| f.extension.as_str())
            .unwrap_or("")
    }

    /// File name of the live save, empty when not configured
    pub fn save_file_name(&self) -> String {
        self.save_file.as_ref().map(SaveFile::name).unwrap_or_default()
    }

    /// Check the rules that span several fields
    pub fn validate(&self) -> GameSaveResult<()> {
        if self.name.trim().is_empty() {
            return Err(GameSaveError::Validation("Game name cannot be empty".into()));
        }

        if !self.version_format.fits(self.initial_version) {
            return Err(GameSaveError::invalid_field(
                "initial version",
                format!(
                    "{} does not fit the version format '{}'",
                    self.initial_version,
                    self.version_format.pattern()
                ),
            ));
        }

        match self.strategy {
            StrategyKind::PeerDirectory => {
                if self.game_directory.trim().is_empty() {
                    return Err(GameSaveError::invalid_field(
                        "game directory",
                        "the peer directory strategy needs the directory holding the save",
                    ));
                }
            }
            StrategyKind::SubordinateUserFile => {
                if self.save_file.is_none() {
                    return Err(GameSaveError::invalid_field(
                        "save file",
                        "the single file strategy needs the save file prefix and extension",
                    ));
                }
                if !self.name_format.contains(Token::Extension) {
                    return Err(GameSaveError::invalid_field(
                        "name format",
                        "the single file strategy needs an 'E' token",
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn set_name_format(&mut self, format: &str) -> GameSaveResult<()> {
        let parsed = NameFormat::parse(format)?;
        let previous = std::mem::replace(&mut self.name_format, parsed);
        if let Err(e) = self.validate() {
            self.name_format = previous;
            return Err(e);
        }
        Ok(())
    }

    pub fn set_version_format(&mut self, format: &str) -> GameSaveResult<()> {
        let parsed = VersionFormat::parse(format)?;
        if !parsed.fits(self.initial_version) {
            return Err(GameSaveError::invalid_field(
                "version format",
                format!("'{}' cannot render the initial version {}", format, self.initial_version),
            ));
        }
        self.version_format = parsed;
        Ok(())
    }

    pub fn set_initial_version(&mut self, version: &str) -> GameSaveResult<()> {
        let parsed = Version::parse(version)?;
        if !self.version_format.fits(parsed) {
            return Err(GameSaveError::invalid_field(
                "initial version",
                format!(
                    "{} does not fit the version format '{}'",
                    parsed,
                    self.version_format.pattern()
                ),
            ));
        }
        self.initial_version = parsed;
        Ok(())
    }

    /// Duplicate this configuration under a "- Copy" name
    pub fn clone_with_copy_name(&self) -> Self {
        let mut clone = self.clone();
        clone.name = format!("{} - Copy", self.name);
        clone.monitoring_mode = MonitoringMode::Off;
        clone
    }
}

impl fmt::Display for GameConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.strategy)
    }
}
