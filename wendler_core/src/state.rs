//! Profile and accessory persistence with file locking.
//!
//! Both are small JSON documents rewritten in full on every change, using a
//! locked temp file and an atomic rename so readers never see a partial write.

use crate::store::{AccessoryStore, ProfileStore};
use crate::{AccessoryExercise, Error, LifterProfile, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Read a JSON document under a shared lock
///
/// Returns `None` if the file doesn't exist. If it can't be read or parsed,
/// logs a warning and returns `None`.
fn load_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    if !path.exists() {
        tracing::debug!("No file at {:?}", path);
        return None;
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!("Unable to open {:?}: {}. Ignoring.", path, e);
            return None;
        }
    };

    if let Err(e) = file.lock_shared() {
        tracing::warn!("Unable to lock {:?}: {}. Ignoring.", path, e);
        return None;
    }

    let mut contents = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
    let _ = file.unlock();
    if let Err(e) = read {
        tracing::warn!("Failed to read {:?}: {}. Ignoring.", path, e);
        return None;
    }

    match serde_json::from_str::<T>(&contents) {
        Ok(value) => {
            tracing::debug!("Loaded {:?}", path);
            Some(value)
        }
        Err(e) => {
            tracing::warn!("Failed to parse {:?}: {}. Ignoring.", path, e);
            None
        }
    }
}

/// Write a JSON document atomically
pub(crate) fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let contents = serde_json::to_vec(value)?;
    write_atomic(path, &contents)
}

/// Replace a file's contents atomically
///
/// 1. Write to a locked temp file in the same directory
/// 2. Sync to disk
/// 3. Rename over the original
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::State(format!("{:?} has no parent directory", path)))?;
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        writer.write_all(contents)?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::debug!("Saved {:?}", path);
    Ok(())
}

/// Take the exclusive update lock for `path`
///
/// The lock lives on a sibling `<path>.lock` file so it survives `path` being
/// replaced by [`write_atomic`]. Every writer holds it across its whole
/// read-modify-write or append; it is released when the returned file drops.
pub(crate) fn lock_for_update(path: &Path) -> Result<File> {
    let mut name = path.as_os_str().to_owned();
    name.push(".lock");
    let lock_path = PathBuf::from(name);

    if let Some(parent) = lock_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)?;
    file.lock_exclusive()?;
    Ok(file)
}

/// Profile stored as a single JSON document
pub struct JsonProfileStore {
    path: PathBuf,
}

impl JsonProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the saved profile, or a default one for a new lifter
    pub fn load_or_default(&self) -> LifterProfile {
        match self.load_profile() {
            Ok(Some(profile)) => profile,
            _ => {
                tracing::info!("No saved profile, starting from defaults");
                LifterProfile::default()
            }
        }
    }
}

impl ProfileStore for JsonProfileStore {
    fn load_profile(&self) -> Result<Option<LifterProfile>> {
        Ok(load_json(&self.path))
    }

    fn save_profile(&self, profile: &LifterProfile) -> Result<()> {
        save_json(&self.path, profile)
    }
}

/// Accessories stored as a JSON array
pub struct JsonAccessoryStore {
    path: PathBuf,
}

impl JsonAccessoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AccessoryStore for JsonAccessoryStore {
    fn list_accessories(&self) -> Result<Vec<AccessoryExercise>> {
        Ok(load_json(&self.path).unwrap_or_default())
    }

    fn add_accessory(&mut self, accessory: AccessoryExercise) -> Result<()> {
        let _lock = lock_for_update(&self.path)?;
        let mut accessories = self.list_accessories()?;
        tracing::info!("Adding accessory {} for {}", accessory.name, accessory.related_lift);
        accessories.push(accessory);
        save_json(&self.path, &accessories)
    }

    fn remove_accessory(&mut self, id: Uuid) -> Result<bool> {
        let _lock = lock_for_update(&self.path)?;
        let mut accessories = self.list_accessories()?;
        let before = accessories.len();
        accessories.retain(|a| a.id != id);
        if accessories.len() == before {
            return Ok(false);
        }
        save_json(&self.path, &accessories)?;
        tracing::info!("Removed accessory {}", id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lift, Template};

    #[test]
    fn test_profile_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonProfileStore::new(temp_dir.path().join("profile.json"));

        let profile = LifterProfile {
            squat_one_rep_max: 315.0,
            current_week: 3,
            current_cycle: 2,
            selected_template: Template::Widowmaker,
            ..LifterProfile::default()
        };
        store.save_profile(&profile).unwrap();

        assert_eq!(store.load_profile().unwrap(), Some(profile));
    }

    #[test]
    fn test_missing_profile() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonProfileStore::new(temp_dir.path().join("profile.json"));

        assert_eq!(store.load_profile().unwrap(), None);
        assert_eq!(store.load_or_default(), LifterProfile::default());
    }

    #[test]
    fn test_corrupted_profile_returns_none() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("profile.json");
        std::fs::write(&path, "{ invalid json }").unwrap();

        let store = JsonProfileStore::new(&path);
        assert_eq!(store.load_profile().unwrap(), None);
    }

    #[test]
    fn test_unknown_template_code_decodes_to_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("profile.json");
        std::fs::write(
            &path,
            r#"{"squat_one_rep_max":300,"bench_one_rep_max":200,"deadlift_one_rep_max":400,
               "ohp_one_rep_max":120,"training_max_percentage":0.9,"current_cycle":1,
               "current_week":2,"selected_template":42}"#,
        )
        .unwrap();

        let profile = JsonProfileStore::new(&path).load_profile().unwrap().unwrap();
        assert_eq!(profile.selected_template, Template::Fsl);
        assert_eq!(profile.current_week, 2);
    }

    #[test]
    fn test_atomic_save() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("profile.json");

        JsonProfileStore::new(&path)
            .save_profile(&LifterProfile::default())
            .unwrap();

        // Verify profile exists and no stray temp files remain
        assert!(path.exists());
        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "profile.json")
            .collect();
        assert!(extras.is_empty(), "Expected only profile.json, found extras: {:?}", extras);
    }

    #[test]
    fn test_accessory_crud() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonAccessoryStore::new(temp_dir.path().join("accessories.json"));
        assert!(store.list_accessories().unwrap().is_empty());

        let dips = AccessoryExercise::new("Dips", 3, 12, Lift::Bench).unwrap();
        let lunges = AccessoryExercise::new("Lunges", 3, 10, Lift::Squat).unwrap();
        store.add_accessory(dips.clone()).unwrap();
        store.add_accessory(lunges.clone()).unwrap();

        assert_eq!(store.list_accessories().unwrap().len(), 2);
        assert_eq!(store.accessories_for(Lift::Bench).unwrap(), vec![dips.clone()]);

        assert!(store.remove_accessory(dips.id).unwrap());
        assert!(!store.remove_accessory(dips.id).unwrap());
        assert_eq!(store.list_accessories().unwrap(), vec![lunges]);
    }

    #[test]
    fn test_concurrent_accessory_updates_keep_every_add() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("accessories.json");

        let mut seeded = JsonAccessoryStore::new(&path);
        let doomed: Vec<_> = (0..20)
            .map(|i| AccessoryExercise::new(format!("Row {}", i), 3, 10, Lift::Deadlift).unwrap())
            .collect();
        for accessory in &doomed {
            seeded.add_accessory(accessory.clone()).unwrap();
        }

        std::thread::scope(|scope| {
            scope.spawn(|| {
                let mut store = JsonAccessoryStore::new(&path);
                for i in 0..20 {
                    let curl = AccessoryExercise::new(format!("Curl {}", i), 3, 12, Lift::Bench);
                    store.add_accessory(curl.unwrap()).unwrap();
                }
            });
            scope.spawn(|| {
                let mut store = JsonAccessoryStore::new(&path);
                for accessory in &doomed {
                    assert!(store.remove_accessory(accessory.id).unwrap());
                }
            });
        });

        let remaining = JsonAccessoryStore::new(&path).list_accessories().unwrap();
        assert_eq!(remaining.len(), 20);
        assert!(remaining.iter().all(|a| a.name.starts_with("Curl")));
    }
}
