//! File-backed persistence for a registry.
//!
//! Wraps the engine's line codec with file I/O. A missing file reads as an
//! empty document. Saving encodes both documents, writes each to a `.tmp`
//! sibling, and only then renames both into place: a failure while encoding
//! or writing leaves the previous pair untouched. The two renames are not
//! atomic as a pair; a failure between them leaves an updated participants
//! file next to the previous events file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use schedule_engine::{codec, EventRegistry, ReleasePolicy};

use crate::config::Config;

pub struct Store {
    events_path: PathBuf,
    participants_path: PathBuf,
    policy: ReleasePolicy,
}

impl Store {
    pub fn from_config(config: &Config) -> Self {
        Self {
            events_path: config.events_path(),
            participants_path: config.participants_path(),
            policy: config.ledger.release,
        }
    }

    pub fn load(&self) -> Result<EventRegistry> {
        let participants = read_document(&self.participants_path)?;
        let events = read_document(&self.events_path)?;

        let registry = codec::load(&participants, &events, self.policy).with_context(|| {
            format!(
                "Failed to load schedule from {} and {}",
                self.participants_path.display(),
                self.events_path.display()
            )
        })?;

        tracing::debug!(
            events = registry.len(),
            participants = registry.participants().len(),
            "loaded schedule"
        );
        Ok(registry)
    }

    pub fn save(&self, registry: &EventRegistry) -> Result<()> {
        let snapshot = codec::save(registry).context("Failed to encode schedule")?;

        for path in [&self.participants_path, &self.events_path] {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            }
        }

        let staged = [
            stage_document(&self.participants_path, &snapshot.participants)?,
            stage_document(&self.events_path, &snapshot.events)?,
        ];
        for (temp, path) in &staged {
            std::fs::rename(temp, path).with_context(|| {
                format!("Failed to replace {} with {}", path.display(), temp.display())
            })?;
        }

        tracing::debug!(
            events = registry.len(),
            participants = registry.participants().len(),
            "saved schedule"
        );
        Ok(())
    }
}

fn read_document(path: &Path) -> Result<String> {
    if !path.exists() {
        tracing::info!("{} not found, starting empty", path.display());
        return Ok(String::new());
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Write `content` next to `path` and return the temporary and final paths.
fn stage_document<'a>(path: &'a Path, content: &str) -> Result<(PathBuf, &'a Path)> {
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);
    std::fs::write(&temp, content)
        .with_context(|| format!("Failed to write file: {}", temp.display()))?;
    Ok((temp, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    use schedule_engine::{AccessLevel, Interval};
    use tempfile::TempDir;

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.storage.data_dir = dir.to_path_buf();
        config
    }

    #[test]
    fn save_leaves_no_temporary_files() {
        let dir = TempDir::new().unwrap();
        let store = Store::from_config(&config_in(dir.path()));
        let mut registry = EventRegistry::new();
        registry
            .add_participant(
                "Alice",
                AccessLevel::Admin,
                [Interval::parse("2026-03-02 09:00", "2026-03-02 17:00").unwrap()],
            )
            .unwrap();

        store.save(&registry).unwrap();

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, ["events.txt", "participants.txt"]);
        assert_eq!(store.load().unwrap().participants(), registry.participants());
    }

    #[test]
    fn failed_write_keeps_previous_pair() {
        let dir = TempDir::new().unwrap();
        let store = Store::from_config(&config_in(dir.path()));
        std::fs::write(dir.path().join("participants.txt"), "Alice | ADMIN | \n").unwrap();
        std::fs::write(dir.path().join("events.txt"), "").unwrap();
        // A directory where the events temp file should go makes that write fail.
        std::fs::create_dir(dir.path().join("events.txt.tmp")).unwrap();

        let mut registry = store.load().unwrap();
        registry
            .add_participant("Bob", AccessLevel::Member, [])
            .unwrap();
        assert!(store.save(&registry).is_err());

        assert_eq!(
            std::fs::read_to_string(dir.path().join("participants.txt")).unwrap(),
            "Alice | ADMIN | \n"
        );
    }
}
