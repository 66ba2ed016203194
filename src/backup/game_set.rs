//! One configured game and its backups
//!
//! [`GameBackupSet`] ties a [`GameConfig`] to its storage strategy and its
//! monitoring engine, and runs the user-facing flows: backup, restore,
//! rename, delete and revert. Each flow works on a copy of the identity and
//! only hands the updated identity back once the disk operation succeeded.

use std::sync::mpsc::Receiver;
use std::sync::Arc;

use chrono::Local;
use tracing::{debug, info};

use super::strategy::{BackupStrategy, Strategy};
use crate::error::{GameSaveError, GameSaveResult};
use crate::models::{BackupIdentity, GameConfig, ReuseOutcome, Token};
use crate::monitor::{MonitorEvent, MonitorState, MonitoringEngine, MonitoringMode};
use crate::naming::NameCodec;

pub struct GameBackupSet {
    config: Arc<GameConfig>,
    strategy: Arc<Strategy>,
    monitor: MonitoringEngine<Strategy>,
}

impl GameBackupSet {
    pub fn new(config: GameConfig) -> GameSaveResult<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let strategy = Arc::new(Strategy::for_game(Arc::clone(&config)));
        let monitor = MonitoringEngine::new(Arc::clone(&strategy), config.monitoring_mode);

        Ok(Self {
            config,
            strategy,
            monitor,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn codec(&self) -> NameCodec<'_> {
        NameCodec::new(&self.config)
    }

    /// Render an identity as this game's backup name
    pub fn name_of(&self, identity: &BackupIdentity) -> GameSaveResult<String> {
        self.codec().encode(identity)
    }

    /// Replace the configuration, keeping the monitoring mode running as before
    pub fn update(&mut self, config: GameConfig) -> GameSaveResult<()> {
        let mut replacement = Self::new(config)?;
        let was_running = self.monitor.is_running();
        self.monitor.stop();
        if was_running {
            replacement.monitor.start()?;
        }
        *self = replacement;
        Ok(())
    }

    /// Newest backups first, at most `max_backups` of them
    pub fn load_backups(&self) -> GameSaveResult<Vec<BackupIdentity>> {
        self.strategy.list_backups(self.config.max_backups)
    }

    /// Decode a backup name, checking the backup exists
    pub fn find_backup(&self, name: &str) -> GameSaveResult<BackupIdentity> {
        let names = self.strategy.backup_names()?;
        if !names.iter().any(|n| n == name) {
            return Err(GameSaveError::backup_not_found(name));
        }
        self.codec().decode(name)
    }

    pub fn latest_backup(&self) -> GameSaveResult<Option<BackupIdentity>> {
        match self.strategy.latest_backup_name()? {
            Some(name) => self.codec().decode(&name).map(Some),
            None => Ok(None),
        }
    }

    /// Take a new manual backup
    ///
    /// Starts from `base` with the version moved on by one step, or from the
    /// initial version when there is no earlier backup. `tag` goes through the
    /// parts merge rule; `None` keeps the base tag as it is.
    pub fn backup(
        &self,
        base: Option<&BackupIdentity>,
        tag: Option<&str>,
    ) -> GameSaveResult<BackupIdentity> {
        let now = Local::now();
        let mut identity = match base {
            Some(base) => {
                let mut next = base.clone();
                next.version = self.config.version_format.next(base.version)?;
                next
            }
            None => BackupIdentity::fresh(&self.config, now),
        };

        identity.set_reuse(0)?;
        identity.date = self.config.date_format.render(now);
        if let Some(tag) = tag {
            identity.set_tag(tag, &self.config.parts)?;
        }

        let name = self.name_of(&identity)?;
        self.strategy.create(&name)?;
        info!(game = %self.config.name, backup = %name, "Backup taken");
        Ok(identity)
    }

    /// Restore a backup over the live save and count the reuse
    ///
    /// Returns the identity the backup carries afterwards. When the reuse
    /// counter would pass 99 a fresh backup with the same tag is taken
    /// instead, and that new identity is returned.
    pub fn restore(&self, identity: &BackupIdentity) -> GameSaveResult<BackupIdentity> {
        let old_name = self.name_of(identity)?;
        self.strategy.restore(&old_name)?;

        if !self.config.name_format.contains(Token::Reuse) {
            return Ok(identity.clone());
        }

        let mut updated = identity.clone();
        match updated.increment_reuse() {
            ReuseOutcome::Counted(count) => {
                let new_name = self.name_of(&updated)?;
                self.strategy.rename(&old_name, &new_name)?;
                debug!(backup = %new_name, reuse = count, "Recorded reuse");
                Ok(updated)
            }
            ReuseOutcome::Overflow => {
                info!(backup = %old_name, "Reuse counter full, taking a new backup");
                self.backup(Some(&updated), None)
            }
        }
    }

    /// Apply a new tag to an existing backup and rename it on disk
    pub fn rename(&self, identity: &BackupIdentity, tag: &str) -> GameSaveResult<BackupIdentity> {
        let old_name = self.name_of(identity)?;
        let mut updated = identity.clone();
        updated.set_tag(tag, &self.config.parts)?;
        let new_name = self.name_of(&updated)?;

        if new_name == old_name {
            return Err(GameSaveError::Validation(format!(
                "'{}' already has that name",
                old_name
            )));
        }

        self.strategy.rename(&old_name, &new_name)?;
        Ok(updated)
    }

    pub fn delete(&self, identity: &BackupIdentity) -> GameSaveResult<()> {
        let name = self.name_of(identity)?;
        self.strategy.delete(&name)
    }

    pub fn revert(&self) -> GameSaveResult<()> {
        self.strategy.revert()
    }

    pub fn monitoring_mode(&self) -> MonitoringMode {
        self.monitor.mode()
    }

    /// Current monitoring state after a fresh read from disk
    pub fn monitor_state(&self) -> GameSaveResult<MonitorState> {
        self.monitor.refresh()
    }

    /// Attach an observer and start watching if the mode asks for it
    pub fn gain_focus(&mut self) -> GameSaveResult<Receiver<MonitorEvent>> {
        self.monitor.refresh()?;
        let events = self.monitor.subscribe();
        self.monitor.start()?;
        Ok(events)
    }

    /// Stop watching and detach every observer
    pub fn lose_focus(&mut self) {
        self.monitor.stop();
    }

    pub fn set_monitoring_mode(&mut self, mode: MonitoringMode) -> GameSaveResult<()> {
        self.monitor.set_mode(mode)?;
        Arc::make_mut(&mut self.config).monitoring_mode = mode;
        Ok(())
    }

    pub fn cycle_monitoring_mode(&mut self) -> GameSaveResult<MonitoringMode> {
        let mode = self.monitoring_mode().cycle();
        self.set_monitoring_mode(mode)?;
        Ok(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::StrategyKind;
    use crate::models::{SaveFile, Version};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        save: PathBuf,
        set: GameBackupSet,
    }

    fn directory_game(temp: &TempDir) -> GameConfig {
        let parent = temp.path().join("saves");
        fs::create_dir_all(parent.join("QuestSave")).unwrap();
        fs::write(parent.join("QuestSave").join("slot1.sav"), b"level 1").unwrap();

        let mut game = GameConfig::new(
            "Quest",
            &parent,
            temp.path().join("backups"),
            StrategyKind::PeerDirectory,
        );
        game.game_directory = "QuestSave".to_string();
        game.set_initial_version("1").unwrap();
        game
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let game = directory_game(&temp);
        let save = temp.path().join("saves").join("QuestSave").join("slot1.sav");
        Fixture {
            set: GameBackupSet::new(game).unwrap(),
            save,
            _temp: temp,
        }
    }

    #[test]
    fn test_first_backup_uses_initial_version() {
        let f = fixture();
        let identity = f.set.backup(None, Some("Start")).unwrap();

        assert_eq!(identity.version, Version::from_hundredths(100));
        assert_eq!(identity.tag(), "Start");

        let backups = f.set.load_backups().unwrap();
        assert_eq!(backups, vec![identity]);
    }

    #[test]
    fn test_next_backup_increments_version_and_merges_tag() {
        let f = fixture();
        let first = f.set.backup(None, Some("Castle-entry")).unwrap();
        let second = f.set.backup(Some(&first), Some("-boss")).unwrap();

        assert_eq!(second.version, Version::from_hundredths(101));
        assert_eq!(second.tag(), "Castle-boss");
        assert_eq!(f.set.load_backups().unwrap()[0], second);
    }

    #[test]
    fn test_backup_keeps_tag_when_none_given() {
        let f = fixture();
        let first = f.set.backup(None, Some("Chapter 1")).unwrap();
        let second = f.set.backup(Some(&first), None).unwrap();
        assert_eq!(second.tag(), "Chapter 1");
    }

    #[test]
    fn test_backup_rejects_empty_tag() {
        let f = fixture();
        let err = f.set.backup(None, Some("")).unwrap_err();
        assert!(matches!(err, GameSaveError::EmptyTag));
        assert!(f.set.load_backups().unwrap().is_empty());
    }

    #[test]
    fn test_restore_records_reuse() {
        let f = fixture();
        let backup = f.set.backup(None, Some("Start")).unwrap();
        fs::write(&f.save, b"level 9").unwrap();

        let restored = f.set.restore(&backup).unwrap();

        assert_eq!(restored.reuse(), 1);
        assert_eq!(fs::read(&f.save).unwrap(), b"level 1");
        let name = f.set.name_of(&restored).unwrap();
        assert!(name.ends_with("Start (01)"));
        assert_eq!(f.set.load_backups().unwrap(), vec![restored]);
    }

    #[test]
    fn test_restore_overflow_takes_new_backup() {
        let f = fixture();
        let mut backup = f.set.backup(None, Some("Start")).unwrap();
        let old_name = f.set.name_of(&backup).unwrap();
        backup.set_reuse(99).unwrap();
        let worn_name = f.set.name_of(&backup).unwrap();
        f.set.strategy().rename(&old_name, &worn_name).unwrap();

        let fresh = f.set.restore(&backup).unwrap();

        assert_eq!(fresh.reuse(), 0);
        assert_eq!(fresh.tag(), "Start");
        assert_eq!(fresh.version, Version::from_hundredths(101));

        let names = f.set.strategy().backup_names().unwrap();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&worn_name));
    }

    #[test]
    fn test_rename() {
        let f = fixture();
        let backup = f.set.backup(None, Some("Castle-entry")).unwrap();

        let renamed = f.set.rename(&backup, "-throne").unwrap();
        assert_eq!(renamed.tag(), "Castle-throne");
        assert_eq!(f.set.load_backups().unwrap(), vec![renamed.clone()]);

        let err = f.set.rename(&renamed, "-throne").unwrap_err();
        assert!(matches!(err, GameSaveError::Validation(_)));
    }

    #[test]
    fn test_find_delete_and_revert() {
        let f = fixture();
        let backup = f.set.backup(None, Some("Start")).unwrap();
        let name = f.set.name_of(&backup).unwrap();

        assert_eq!(f.set.find_backup(&name).unwrap(), backup);
        assert!(f.set.find_backup("missing").unwrap_err().is_not_found());

        assert!(matches!(
            f.set.revert().unwrap_err(),
            GameSaveError::NoRevertAvailable(_)
        ));

        f.set.delete(&backup).unwrap();
        assert!(f.set.latest_backup().unwrap().is_none());
    }

    #[test]
    fn test_single_file_game_round_trip() {
        let temp = TempDir::new().unwrap();
        let parent = temp.path().join("saves");
        fs::create_dir_all(&parent).unwrap();
        fs::write(parent.join("farm.sav"), b"spring").unwrap();

        let mut game = GameConfig::new(
            "Farm",
            &parent,
            temp.path().join("backups"),
            StrategyKind::SubordinateUserFile,
        );
        game.save_file = Some(SaveFile::new("farm", "sav").unwrap());
        game.set_name_format("D V T RE").unwrap();
        let set = GameBackupSet::new(game).unwrap();

        let backup = set.backup(None, Some("Day 1")).unwrap();
        assert!(set.name_of(&backup).unwrap().ends_with("Day 1.sav"));

        fs::write(parent.join("farm.sav"), b"summer").unwrap();
        let restored = set.restore(&backup).unwrap();
        assert!(set.name_of(&restored).unwrap().ends_with("Day 1 (01).sav"));
        assert_eq!(fs::read(parent.join("farm.sav")).unwrap(), b"spring");

        set.revert().unwrap();
        assert_eq!(fs::read(parent.join("farm.sav")).unwrap(), b"summer");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let temp = TempDir::new().unwrap();
        let mut game = directory_game(&temp);
        game.game_directory.clear();
        let err = GameBackupSet::new(game).err().unwrap();
        assert!(err.is_invalid_configuration());
    }

    #[test]
    fn test_stray_folder_does_not_block_backups() {
        let f = fixture();
        f.set.backup(None, Some("Start")).unwrap();
        fs::create_dir_all(f.set.strategy().game().user_directory.join("old stuff")).unwrap();

        let latest = f.set.latest_backup().unwrap().unwrap();
        assert_eq!(latest.tag(), "Start");

        let next = f.set.backup(Some(&latest), None).unwrap();
        assert_eq!(f.set.load_backups().unwrap().len(), 2);
        let latest = f.set.latest_backup().unwrap().unwrap();
        assert_eq!(f.set.name_of(&latest).unwrap(), f.set.name_of(&next).unwrap());
    }

    #[test]
    fn test_monitoring_mode_updates_config() {
        let mut f = fixture();
        assert_eq!(f.set.cycle_monitoring_mode().unwrap(), MonitoringMode::Passive);
        assert_eq!(f.set.config().monitoring_mode, MonitoringMode::Passive);

        f.set.set_monitoring_mode(MonitoringMode::Off).unwrap();
        assert_eq!(f.set.config().monitoring_mode, MonitoringMode::Off);
        f.set.lose_focus();
    }
}
