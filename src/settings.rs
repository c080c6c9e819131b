use crate::error::{AutoGitError, Result};
use log::debug;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const ORGANIZATION: &str = "AutoGitUploader";
pub const APPLICATION: &str = "settings";
pub const USERNAME_KEY: &str = "github_username";

/// Small persistent key/value store for values remembered between runs.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Settings kept in a TOML file under the platform configuration directory.
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/AutoGitUploader/settings.toml`
    pub fn open_default() -> Result<Self> {
        let base = dirs::config_dir().ok_or_else(|| AutoGitError::Settings {
            message: "Could not determine the configuration directory".to_string(),
        })?;
        Ok(Self::new(
            base.join(ORGANIZATION).join(format!("{}.toml", APPLICATION)),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| AutoGitError::Settings {
            message: format!("Failed to read {}: {}", self.path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| AutoGitError::Settings {
            message: format!("Failed to parse {}: {}", self.path.display(), e),
        })
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| AutoGitError::Settings {
                message: format!("Failed to create {}: {}", parent.display(), e),
            })?;
        }

        let content = toml::to_string_pretty(values).map_err(|e| AutoGitError::Settings {
            message: format!("Failed to serialize settings: {}", e),
        })?;

        fs::write(&self.path, content).map_err(|e| AutoGitError::Settings {
            message: format!("Failed to write {}: {}", self.path.display(), e),
        })
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)?;
        debug!("Saved setting {} to {}", key, self.path.display());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut values = self.read_all()?;
        if values.remove(key).is_some() {
            self.write_all(&values)?;
            debug!("Removed setting {} from {}", key, self.path.display());
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: BTreeMap<String, String>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// The optionally remembered GitHub account name.
pub struct RememberedUsername<'a, S: SettingsStore + ?Sized> {
    store: &'a mut S,
}

impl<'a, S: SettingsStore + ?Sized> RememberedUsername<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get(USERNAME_KEY)?
            .filter(|name| !name.trim().is_empty()))
    }

    pub fn update(&mut self, username: &str, remember: bool) -> Result<()> {
        if remember {
            self.store.set(USERNAME_KEY, username)
        } else {
            self.store.remove(USERNAME_KEY)
        }
    }
}
