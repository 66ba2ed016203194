//! Encoding and decoding of backup names
//!
//! Every token of a name format except the tag has a length known before
//! looking at the name: prefix, game directory and separator come from the
//! configuration, the date and version have fixed rendered widths, the
//! extension and reuse counter are either present or absent. The tag takes
//! whatever is left once the tokens to its right are accounted for.

use chrono::Local;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::{GameSaveError, GameSaveResult};
use crate::models::{BackupIdentity, GameConfig, Token};

static REUSE_MARK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\d{2}\)").expect("static regex"));

/// Rendered width of a non-zero reuse counter, `(NN)`
const REUSE_WIDTH: usize = 4;

/// Encodes and decodes backup names for one game
#[derive(Debug, Clone)]
pub struct NameCodec<'a> {
    game: &'a GameConfig,
    date_width: usize,
}

impl<'a> NameCodec<'a> {
    pub fn new(game: &'a GameConfig) -> Self {
        Self {
            game,
            date_width: game.date_format.rendered_width(),
        }
    }

    /// Render an identity as a backup name
    pub fn encode(&self, identity: &BackupIdentity) -> GameSaveResult<String> {
        let tokens = self.game.name_format.tokens();
        let mut name = String::new();

        for (i, token) in tokens.iter().enumerate() {
            match token {
                Token::Prefix => name.push_str(&identity.prefix),
                Token::GameDirectory => name.push_str(&identity.game_directory),
                Token::Separator => name.push_str(self.game.separator.as_str()),
                Token::Date => name.push_str(&identity.date),
                Token::Version => {
                    name.push_str(&self.game.version_format.render(identity.version)?)
                }
                Token::Tag => name.push_str(identity.tag()),
                Token::Space => name.push(' '),
                Token::Extension => {
                    if !identity.extension.is_empty() {
                        name.push('.');
                        name.push_str(&identity.extension);
                    }
                }
                Token::Reuse => {
                    if identity.reuse() > 0 {
                        name.push_str(&format!("({:02})", identity.reuse()));
                    } else if i > 0 && tokens[i - 1] == Token::Space {
                        // Drop the space that would otherwise dangle before nothing
                        name.pop();
                    }
                }
            }
        }

        Ok(name)
    }

    /// Parse a backup name back into its identity
    pub fn decode(&self, name: &str) -> GameSaveResult<BackupIdentity> {
        let chars: Vec<char> = name.chars().collect();
        let extension = self.game.extension();
        let has_extension = !extension.is_empty() && name.ends_with(&format!(".{}", extension));

        if REUSE_MARK.is_match(name) {
            // A tag may itself contain "(NN)", so fall back to reading without a counter
            match self.decode_with(name, &chars, has_extension, true) {
                Ok(identity) => Ok(identity),
                Err(first) => self
                    .decode_with(name, &chars, has_extension, false)
                    .map_err(|_| first),
            }
        } else {
            self.decode_with(name, &chars, has_extension, false)
        }
    }

    fn decode_with(
        &self,
        name: &str,
        chars: &[char],
        has_extension: bool,
        has_reuse: bool,
    ) -> GameSaveResult<BackupIdentity> {
        let tokens = self.game.name_format.tokens();
        let lengths: Vec<Option<usize>> = (0..tokens.len())
            .map(|i| self.fixed_length(tokens, i, has_extension, has_reuse))
            .collect();

        let mut identity = BackupIdentity::fresh(self.game, Local::now());
        identity.set_tag_verbatim("");
        identity.extension = String::new();

        let mut offset = 0;
        for (i, token) in tokens.iter().enumerate() {
            let length = match lengths[i] {
                Some(length) => length,
                None => {
                    let right: usize = lengths[i + 1..].iter().map(|l| l.unwrap_or(0)).sum();
                    chars
                        .len()
                        .checked_sub(offset + right)
                        .ok_or_else(|| GameSaveError::malformed(name, "name is too short"))?
                }
            };

            if offset + length > chars.len() {
                return Err(GameSaveError::malformed(name, "name is too short"));
            }
            let text: String = chars[offset..offset + length].iter().collect();

            match token {
                Token::Prefix => {
                    expect_literal(name, &text, self.game.save_prefix.as_str(), "prefix")?;
                    identity.prefix = text;
                }
                Token::GameDirectory => {
                    expect_literal(name, &text, &self.game.game_directory, "game directory")?;
                    identity.game_directory = text;
                }
                Token::Separator => {
                    expect_literal(name, &text, self.game.separator.as_str(), "separator")?
                }
                Token::Space => {
                    let expected = if length == 0 { "" } else { " " };
                    expect_literal(name, &text, expected, "space")?;
                }
                Token::Date => identity.date = text,
                Token::Version => {
                    identity.version = self.game.version_format.read(&text).ok_or_else(|| {
                        GameSaveError::malformed(
                            name,
                            format!(
                                "'{}' does not match the version format '{}'",
                                text,
                                self.game.version_format.pattern()
                            ),
                        )
                    })?;
                }
                Token::Tag => identity.set_tag_verbatim(text),
                Token::Reuse => {
                    if length > 0 {
                        identity.set_reuse(read_reuse(name, &text)?)?;
                    }
                }
                Token::Extension => {
                    if length > 0 {
                        identity.extension = text[1..].to_string();
                    }
                }
            }

            offset += length;
        }

        if offset != chars.len() {
            debug!(name, offset, "backup name has text beyond its format");
            return Err(GameSaveError::malformed(
                name,
                "name is longer than its format allows",
            ));
        }

        Ok(identity)
    }

    /// Length of the token at `index`, or `None` for the floating tag
    fn fixed_length(
        &self,
        tokens: &[Token],
        index: usize,
        has_extension: bool,
        has_reuse: bool,
    ) -> Option<usize> {
        let length = match tokens[index] {
            Token::Tag => return None,
            Token::Prefix => self.game.save_prefix.as_str().chars().count(),
            Token::GameDirectory => self.game.game_directory.chars().count(),
            Token::Separator => self.game.separator.as_str().chars().count(),
            Token::Date => self.date_width,
            Token::Version => self.game.version_format.width(),
            Token::Extension if has_extension => self.game.extension().chars().count() + 1,
            Token::Extension => 0,
            Token::Reuse if has_reuse => REUSE_WIDTH,
            Token::Reuse => 0,
            Token::Space => {
                let before_absent_reuse =
                    !has_reuse && tokens.get(index + 1) == Some(&Token::Reuse);
                if before_absent_reuse {
                    0
                } else {
                    1
                }
            }
        };
        Some(length)
    }
}

fn expect_literal(name: &str, text: &str, expected: &str, what: &str) -> GameSaveResult<()> {
    if text == expected {
        Ok(())
    } else {
        Err(GameSaveError::malformed(
            name,
            format!("expected {} '{}' but found '{}'", what, expected, text),
        ))
    }
}

fn read_reuse(name: &str, text: &str) -> GameSaveResult<u8> {
    text.strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .filter(|digits| digits.len() == 2 && digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| GameSaveError::malformed(name, format!("'{}' is not a reuse count", text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::StrategyKind;
    use crate::models::{NameFormat, Parts, SaveFile, SavePrefix, Separator, Version};

    fn game(format: &str) -> GameConfig {
        let mut game = GameConfig::new("Quest", "/saves", "/backups", StrategyKind::PeerDirectory);
        game.game_directory = "QuestSave".into();
        game.save_prefix = SavePrefix::parse("QS").unwrap();
        game.separator = Separator::parse("_").unwrap();
        game.save_file = Some(SaveFile::new("slot1", "sav").unwrap());
        game.name_format = NameFormat::parse(format).unwrap();
        game
    }

    fn identity(game: &GameConfig, tag: &str, reuse: u8) -> BackupIdentity {
        let mut identity = BackupIdentity::fresh(game, Local::now());
        identity.date = "2024-03-09".into();
        identity.version = Version::from_hundredths(1205);
        if !tag.is_empty() {
            identity.set_tag(tag, &Parts::default()).unwrap();
        }
        identity.set_reuse(reuse).unwrap();
        identity
    }

    #[test]
    fn test_encode_renders_every_component() {
        let game = game("PsGsD V T RE");
        let codec = NameCodec::new(&game);
        let name = codec.encode(&identity(&game, "Boss fight", 7)).unwrap();
        assert_eq!(name, "QS_QuestSave_2024-03-09 v012.05 Boss fight (07).sav");
    }

    #[test]
    fn test_encode_drops_space_before_absent_reuse() {
        let game = game("D V T R");
        let codec = NameCodec::new(&game);
        let name = codec.encode(&identity(&game, "Chapter 2", 0)).unwrap();
        assert_eq!(name, "2024-03-09 v012.05 Chapter 2");
    }

    #[test]
    fn test_round_trip_across_formats() {
        let formats = [
            "D V T R",
            "PsD V T R",
            "PsGsD V T RE",
            "T D V",
            "D R V T",
            "VsT",
            "D V R",
            "PsDsVsT R",
            "R T D V",
        ];
        let tags = ["Chapter 2", "a(12)b", "", "x -final"];

        for format in formats {
            let game = game(format);
            let codec = NameCodec::new(&game);
            for tag in tags {
                if tag.is_empty() && !format.contains('T') {
                    continue;
                }
                for reuse in [0, 1, 42, 99] {
                    let mut original = identity(&game, tag, reuse);
                    if !format.contains('T') {
                        original.set_tag_verbatim("");
                    }
                    if !format.contains('E') {
                        original.extension.clear();
                    }
                    let name = codec.encode(&original).unwrap();
                    let decoded = codec
                        .decode(&name)
                        .unwrap_or_else(|e| panic!("{} / {}: {}", format, name, e));

                    assert_eq!(codec.encode(&decoded).unwrap(), name, "format {}", format);
                    assert_eq!(decoded.version, original.version, "{}", name);
                    assert_eq!(decoded.tag(), original.tag(), "{}", name);
                    if format.contains('R') {
                        assert_eq!(decoded.reuse(), original.reuse(), "{}", name);
                    }
                    if format.contains('D') {
                        assert_eq!(decoded.date, original.date, "{}", name);
                    }
                }
            }
        }
    }

    #[test]
    fn test_tag_containing_reuse_mark_without_counter() {
        let game = game("D V T R");
        let codec = NameCodec::new(&game);
        let decoded = codec.decode("2024-03-09 v012.05 Level (12) done").unwrap();
        assert_eq!(decoded.tag(), "Level (12) done");
        assert_eq!(decoded.reuse(), 0);
    }

    #[test]
    fn test_decode_reads_reuse_and_extension() {
        let game = game("PsD V T RE");
        let codec = NameCodec::new(&game);
        let decoded = codec.decode("QS_2024-03-09 v001.00 Start (03).sav").unwrap();
        assert_eq!(decoded.tag(), "Start");
        assert_eq!(decoded.reuse(), 3);
        assert_eq!(decoded.extension, "sav");
        assert_eq!(decoded.version, Version::from_hundredths(100));
    }

    #[test]
    fn test_decode_rejects_malformed_names() {
        let game = game("PsD V T R");
        let codec = NameCodec::new(&game);

        for name in ["", "QS_2024", "XX_2024-03-09 v001.00 Tag", "QS_2024-03-09 1.00.00 Tag"] {
            assert!(
                matches!(
                    codec.decode(name),
                    Err(GameSaveError::MalformedBackupName { .. })
                ),
                "{:?} should not decode",
                name
            );
        }
    }

    #[test]
    fn test_decode_rejects_trailing_text_without_tag() {
        let game = game("D V");
        let codec = NameCodec::new(&game);
        assert!(codec.decode("2024-03-09 v001.00").is_ok());
        assert!(codec.decode("2024-03-09 v001.00 extra").is_err());
    }

    #[test]
    fn test_decode_handles_multibyte_tags() {
        let game = game("D V T R");
        let codec = NameCodec::new(&game);
        let decoded = codec.decode("2024-03-09 v001.00 Boss défait (02)").unwrap();
        assert_eq!(decoded.tag(), "Boss défait");
        assert_eq!(decoded.reuse(), 2);
    }
}
