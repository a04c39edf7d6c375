use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use uuid::Uuid;

use crate::repository::traits::KeyValueStore;

const DEFAULT_DIR_NAME: &str = ".pocketdo";
const VALUE_EXTENSION: &str = "json";

/// Keeps each key in its own file under a data directory.
#[derive(Clone, Debug)]
pub struct FileKeyValueStore {
    base_dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        let path = match base_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        fs::create_dir_all(&path)?;
        Ok(FileKeyValueStore { base_dir: path })
    }

    fn value_path(&self, key: &str) -> io::Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid storage key '{}'", key),
            ));
        }
        Ok(self.base_dir.join(format!("{}.{}", key, VALUE_EXTENSION)))
    }
}

/// `~/.pocketdo`
pub fn default_data_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    Ok(home_dir.join(DEFAULT_DIR_NAME))
}

impl KeyValueStore for FileKeyValueStore {
    fn get_item(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        let path = self.value_path(key)?;
        match fs::read(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set_item(&self, key: &str, value: &[u8]) -> io::Result<()> {
        let final_path = self.value_path(key)?;
        // unique per write: several stores may share one directory
        let temp_path = self
            .base_dir
            .join(format!("{}.{}.tmp.{}", key, VALUE_EXTENSION, Uuid::new_v4().simple()));

        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(value)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        drop(writer);

        if let Err(e) = fs::rename(&temp_path, &final_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(store.get_item("todos").unwrap(), None);
    }

    #[test]
    fn test_set_replaces_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(Some(dir.path().to_path_buf())).unwrap();

        store.set_item("todos", b"[1]").unwrap();
        store.set_item("todos", b"[]").unwrap();

        assert_eq!(store.get_item("todos").unwrap().as_deref(), Some(&b"[]"[..]));
        assert!(dir.path().join("todos.json").exists());
        // no temp files left behind
        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileKeyValueStore::new(Some(nested.clone())).unwrap();
        assert!(nested.is_dir());
        store.set_item("todos", b"[]").unwrap();
        assert!(nested.join("todos.json").is_file());
    }

    #[test]
    fn test_reads_bytes_that_are_not_utf8() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("todos.json"), [0xff, 0xfe, b'[', b']']).unwrap();
        let store = FileKeyValueStore::new(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(
            store.get_item("todos").unwrap().as_deref(),
            Some(&[0xff, 0xfe, b'[', b']'][..])
        );
    }

    #[test]
    fn test_stores_sharing_a_directory_write_concurrently() {
        let dir = tempfile::tempdir().unwrap();
        let writers: Vec<_> = ["[1]", "[2]"]
            .into_iter()
            .map(|value| {
                let store = FileKeyValueStore::new(Some(dir.path().to_path_buf())).unwrap();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        store.set_item("todos", value.as_bytes())?;
                    }
                    Ok::<(), io::Error>(())
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap().unwrap();
        }

        let stored = fs::read_to_string(dir.path().join("todos.json")).unwrap();
        assert!(stored == "[1]" || stored == "[2]");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(Some(dir.path().to_path_buf())).unwrap();
        let err = store.set_item("../escape", b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(store.get_item("").is_err());
    }
}
