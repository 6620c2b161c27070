// Called on startup and quit, and when packs are saved. The engine only ever
// hands over structure (layers of pad + beat, pack slot names); audio stays out.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::looper::LayerSet;
use crate::packs::SavedPacks;

pub const SOUNDGRID_DIR: &str = ".soundgrid";
pub const SESSION_KEY: &str = "session";
pub const PACKS_KEY: &str = "packs";

/// Opaque named blobs.
pub trait KeyValueStore {
    fn load(&self, name: &str) -> anyhow::Result<Option<String>>;
    fn save(&mut self, name: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&mut self, name: &str) -> anyhow::Result<()>;
}

/// One JSON file per key: `<project_dir>/.soundgrid/<name>.json`.
#[derive(Clone, Debug)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(project_dir: &Path) -> Self {
        Self { root: project_dir.join(SOUNDGRID_DIR) }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }
}

impl KeyValueStore for DirStore {
    fn load(&self, name: &str) -> anyhow::Result<Option<String>> {
        let path = self.path(name);
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        Ok(Some(data))
    }

    // creates .soundgrid/ if it isn't there yet
    fn save(&mut self, name: &str, value: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.path(name);
        std::fs::write(&path, value).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    fn remove(&mut self, name: &str) -> anyhow::Result<()> {
        let path = self.path(name);
        match std::fs::remove_file(&path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                Err(e).with_context(|| format!("removing {}", path.display()))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn load(&self, name: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.get(name).cloned())
    }

    fn save(&mut self, name: &str, value: &str) -> anyhow::Result<()> {
        self.entries.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, name: &str) -> anyhow::Result<()> {
        self.entries.remove(name);
        Ok(())
    }
}

// unreadable or malformed entries are logged and treated as absent
fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, name: &str) -> Option<T> {
    let data = match store.load(name) {
        Ok(data) => data?,
        Err(e) => {
            warn!("could not load {name}: {e:#}");
            return None;
        }
    };
    match serde_json::from_str(&data) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("ignoring malformed {name}: {e}");
            None
        }
    }
}

fn save_json<T: Serialize>(store: &mut dyn KeyValueStore, name: &str, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    store.save(name, &json)
}

pub fn load_layers(store: &dyn KeyValueStore) -> Option<LayerSet> {
    load_json(store, SESSION_KEY)
}

pub fn save_layers(store: &mut dyn KeyValueStore, set: &LayerSet) -> anyhow::Result<()> {
    save_json(store, SESSION_KEY, set)
}

pub fn load_packs(store: &dyn KeyValueStore) -> SavedPacks {
    load_json(store, PACKS_KEY).unwrap_or_default()
}

pub fn save_packs(store: &mut dyn KeyValueStore, packs: &SavedPacks) -> anyhow::Result<()> {
    save_json(store, PACKS_KEY, packs)
}
