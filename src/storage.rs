//! Key/value persistence shared by the account directory, the session
//! marker and the task store.
//!
//! Every value is a JSON document replaced wholesale on each write, so a
//! backend only needs to store opaque strings by key.

use crate::error::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    cell::RefCell,
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    rc::Rc,
};

/// Key holding the account directory.
pub const USERS_KEY: &str = "taskflow_users";
/// Key holding the session marker.
pub const SESSION_KEY: &str = "taskflow_user";
/// Key holding the task collection.
pub const TASKS_KEY: &str = "User-Storage";

/// A string key/value store. Clones of a handle see the same data.
pub trait Storage: Clone {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// Reads and parses the value under `key`. A missing key is `Ok(None)`.
pub fn read_json<S: Storage, T: DeserializeOwned>(storage: &S, key: &str) -> Result<Option<T>> {
    match storage.get_item(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| Error::Corrupted {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

pub fn write_json<S: Storage, T: Serialize + ?Sized>(storage: &S, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value).map_err(Error::Serialize)?;
    storage.set_item(key, &raw)
}

/// In-process store used by tests and as a scratch backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Stores each key as `<root>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);
        // Write next to the target and rename so readers never see a partial value.
        let tmp = self.root.join(format!("{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
