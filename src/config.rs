use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::secret::{SecretKey, StoredValue};
use crate::error::Result;
use crate::prompt::Prompter;

pub const CONFIG_FILE: &str = ".punchcard.json";

pub const GENERAL: &str = "general";
pub const EDITOR: &str = "editor";
pub const RUBYTIME: &str = "rubytime";
pub const TICKSPOT: &str = "tickspot";

pub fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_FILE)
}

pub fn default_editor() -> String {
    std::env::var("EDITOR")
        .ok()
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| "nano".to_string())
}

/// group -> key -> value, exactly as persisted.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigStore {
    groups: BTreeMap<String, BTreeMap<String, StoredValue>>,
}

impl ConfigStore {
    /// Load from `path`. A missing, unreadable or malformed file gives an
    /// empty store. Bad values inside a well-formed file are kept per entry.
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                log::info!("No config at {} ({}), starting empty", path.display(), e);
                return Self::default();
            }
        };
        let raw: BTreeMap<String, BTreeMap<String, Value>> = match serde_json::from_str(&text) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Ignoring malformed config {}: {}", path.display(), e);
                return Self::default();
            }
        };

        let mut store = Self::default();
        for (group, entries) in raw {
            for (key, value) in entries {
                let value = decode_entry(&group, &key, value);
                store.insert(&group, &key, value);
            }
        }
        store
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        log::debug!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn get(&self, group: &str, key: &str) -> Option<&StoredValue> {
        self.groups.get(group).and_then(|g| g.get(key))
    }

    pub fn insert(&mut self, group: &str, key: &str, value: StoredValue) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

fn decode_entry(group: &str, key: &str, value: Value) -> StoredValue {
    match value {
        Value::String(raw) => {
            let decoded = StoredValue::decode(&raw);
            if let StoredValue::Corrupt { reason, .. } = &decoded {
                log::warn!("Config value {}/{} is corrupt: {}", group, key, reason);
            }
            decoded
        }
        other => {
            log::warn!("Config value {}/{} is not a string, keeping it as text", group, key);
            StoredValue::Plain(other.to_string())
        }
    }
}

/// How to obtain a missing value from the user.
#[derive(Clone, Copy, Debug)]
pub enum Ask<'a> {
    Plain(&'a str),
    /// Plain, with a pre-filled answer.
    WithDefault(&'a str, &'a str),
    /// Masked input, stored encrypted.
    Secret(&'a str),
}

/// Write-through view over the config file, decrypting values on read.
pub struct ConfigCache {
    path: PathBuf,
    store: ConfigStore,
    key: SecretKey,
}

impl ConfigCache {
    pub fn open(path: impl Into<PathBuf>, key: SecretKey) -> Self {
        let path = path.into();
        let store = ConfigStore::load(&path);
        if store.is_empty() {
            log::info!("Starting with an empty config at {}", path.display());
        }
        Self { path, store, key }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Plaintext value for `group`/`key`, or `None` if it was never set.
    pub fn get(&self, group: &str, key: &str) -> Result<Option<String>> {
        self.store
            .get(group, key)
            .map(|value| value.reveal(&self.key))
            .transpose()
    }

    pub fn get_or_default(&self, group: &str, key: &str, default: &str) -> Result<String> {
        Ok(self.get(group, key)?.unwrap_or_else(|| default.to_string()))
    }

    /// Set a plain value and persist the whole store immediately.
    pub fn set(&mut self, group: &str, key: &str, value: &str) -> Result<()> {
        self.store
            .insert(group, key, StoredValue::Plain(value.to_string()));
        self.save()
    }

    /// Encrypt and set a value, then persist.
    pub fn set_secret(&mut self, group: &str, key: &str, value: &str) -> Result<()> {
        let sealed = StoredValue::seal(&self.key, value)?;
        self.store.insert(group, key, sealed);
        self.save()
    }

    /// Return the stored value, asking the user and persisting the answer
    /// when it is missing. Always returns plaintext. A secret found stored
    /// in clear is sealed in place.
    pub fn get_or_prompt(
        &mut self,
        group: &str,
        key: &str,
        prompter: &mut dyn Prompter,
        ask: Ask<'_>,
    ) -> Result<String> {
        if let Some(value) = self.get(group, key)? {
            let in_clear = self.store.get(group, key).is_some_and(|v| !v.is_encrypted());
            if matches!(ask, Ask::Secret(_)) && in_clear {
                log::info!("Encrypting {}/{} stored in clear", group, key);
                self.set_secret(group, key, &value)?;
            }
            return Ok(value);
        }

        match ask {
            Ask::Plain(prompt) => {
                let value = prompter.ask(prompt, None, None)?;
                self.set(group, key, &value)?;
                Ok(value)
            }
            Ask::WithDefault(prompt, default) => {
                let value = prompter.ask(prompt, Some(default), None)?;
                self.set(group, key, &value)?;
                Ok(value)
            }
            Ask::Secret(prompt) => {
                let value = prompter.ask_secret(prompt)?;
                self.set_secret(group, key, &value)?;
                Ok(value)
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        self.store.save(&self.path)
    }

    pub fn debug_logging(&self) -> bool {
        matches!(self.get(GENERAL, "debug_logging"), Ok(Some(v)) if v.trim() == "true")
    }
}
