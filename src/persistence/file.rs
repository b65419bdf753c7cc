use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{Storage, StorageError};

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// The directory is created lazily on the first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes to a temp file first, then renames over the old value
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("block-arcade-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = scratch_dir("roundtrip");
        let mut storage = FileStorage::new(&dir);
        assert_eq!(storage.get("pong_hiscore").unwrap(), None);

        storage.set("pong_hiscore", "12").unwrap();
        assert_eq!(storage.get("pong_hiscore").unwrap().as_deref(), Some("12"));
        assert!(dir.join("pong_hiscore.json").exists());

        storage.remove("pong_hiscore").unwrap();
        storage.remove("pong_hiscore").unwrap();
        assert_eq!(storage.get("pong_hiscore").unwrap(), None);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_keys_are_sanitised() {
        let storage = FileStorage::new("/tmp/x");
        assert_eq!(storage.path("../evil key"), PathBuf::from("/tmp/x/___evil_key.json"));
    }
}
