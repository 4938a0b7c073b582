use crate::collection::Collection;
use crate::errors::AppError;
use crate::types::CollectionName;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Collection holding the vehicle records.
pub const VEHICLES: &str = "datas";
/// Collection holding recorded request errors.
pub const ERROR_LOGS: &str = "errorlogs";

/// Owner of every open collection. Created once at process start and shared by handle.
pub struct Engine {
    dir: Option<PathBuf>,
    collections: RwLock<HashMap<CollectionName, Arc<Collection>>>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("dir", &self.dir)
            .field("collections", &self.list_collection_names())
            .finish()
    }
}

impl Engine {
    /// An engine whose collections vanish with the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self { dir: None, collections: RwLock::new(HashMap::new()) }
    }

    /// A durable engine keeping one `{name}.wal` file per collection under `dir`.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, AppError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        log::info!("engine: data dir {}", dir.display());
        Ok(Self { dir: Some(dir), collections: RwLock::new(HashMap::new()) })
    }

    #[must_use]
    pub fn data_dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Returns the named collection, opening (and replaying) it on first use.
    pub fn collection(&self, name: &str) -> Result<Arc<Collection>, AppError> {
        if let Some(c) = self.get_collection(name) {
            return Ok(c);
        }
        validate_name(name)?;
        let mut map = self.collections.write();
        if let Some(c) = map.get(name) {
            return Ok(c.clone());
        }
        let col = match &self.dir {
            Some(dir) => Collection::open(name, dir.join(format!("{name}.wal")))?,
            None => Collection::in_memory(name),
        };
        let col = Arc::new(col);
        map.insert(name.to_string(), col.clone());
        Ok(col)
    }

    #[must_use]
    pub fn get_collection(&self, name: &str) -> Option<Arc<Collection>> {
        self.collections.read().get(name).cloned()
    }

    #[must_use]
    pub fn list_collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }
}

fn validate_name(name: &str) -> Result<(), AppError> {
    let ok = !name.is_empty()
        && name.len() <= 64
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok { Ok(()) } else { Err(AppError::InvalidInput(format!("bad collection name: {name:?}"))) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_handles_are_shared() {
        let engine = Engine::in_memory();
        let a = engine.collection(VEHICLES).unwrap();
        let b = engine.collection(VEHICLES).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(engine.list_collection_names(), vec![VEHICLES.to_string()]);
    }

    #[test]
    fn names_that_escape_the_data_dir_are_rejected() {
        let engine = Engine::in_memory();
        assert!(matches!(engine.collection("../etc"), Err(AppError::InvalidInput(_))));
        assert!(engine.collection("").is_err());
    }

    #[test]
    fn durable_engine_writes_one_log_per_collection() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::open(dir.path()).unwrap();
        engine.collection(ERROR_LOGS).unwrap();
        assert!(dir.path().join("errorlogs.wal").exists());
    }
}
