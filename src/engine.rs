use crate::collection::Collection;
use crate::document::Document;
use crate::errors::DbError;
use crate::types::CollectionName;
use bson::Bson;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const SNAPSHOT_EXT: &str = "ndjson";

/// Holds every collection. When opened over a data directory, each collection is loaded from
/// and checkpointed to `<dir>/<collection>.ndjson`.
pub struct Engine {
    collections: RwLock<HashMap<CollectionName, Arc<Collection>>>,
    data_dir: Option<PathBuf>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("data_dir", &self.data_dir)
            .field("collections", &self.list_collection_names())
            .finish()
    }
}

impl Engine {
    /// A purely in-memory engine.
    #[must_use]
    pub fn in_memory() -> Self {
        Self { collections: RwLock::new(HashMap::new()), data_dir: None }
    }

    /// Opens (or creates) `dir` and loads every snapshot found in it.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or a snapshot cannot be read.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, DbError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        let mut collections = HashMap::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SNAPSHOT_EXT) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            let col = Collection::new(name.clone());
            let loaded = load_snapshot(&col, &path)?;
            log::info!("loaded {loaded} documents into '{name}' from {}", path.display());
            collections.insert(name, Arc::new(col));
        }
        Ok(Self { collections: RwLock::new(collections), data_dir: Some(dir) })
    }

    #[must_use]
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Returns the named collection, creating it when missing.
    pub fn collection(&self, name: &str) -> Arc<Collection> {
        if let Some(col) = self.collections.read().get(name) {
            return col.clone();
        }
        self.collections
            .write()
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Collection::new(name)))
            .clone()
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

    /// Writes every collection to its snapshot file. A no-op for in-memory engines.
    ///
    /// Each file is written to a temporary sibling and renamed into place.
    ///
    /// # Errors
    /// Returns an error if any snapshot cannot be written.
    pub fn checkpoint(&self) -> Result<usize, DbError> {
        let Some(dir) = &self.data_dir else {
            return Ok(0);
        };
        let cols: Vec<Arc<Collection>> = self.collections.read().values().cloned().collect();
        let mut written = 0usize;
        for col in cols {
            let target = dir.join(format!("{}.{SNAPSHOT_EXT}", col.name()));
            let tmp = target.with_extension(format!("{SNAPSHOT_EXT}.tmp"));
            {
                let mut out = BufWriter::new(File::create(&tmp)?);
                for doc in col.get_all_documents() {
                    let line = serde_json::to_string(&Bson::Document(doc.data).into_relaxed_extjson())?;
                    writeln!(out, "{line}")?;
                    written += 1;
                }
                out.flush()?;
            }
            fs::rename(&tmp, &target)?;
        }
        log::info!("checkpoint wrote {written} documents to {}", dir.display());
        Ok(written)
    }
}

fn load_snapshot(col: &Collection, path: &Path) -> Result<usize, DbError> {
    let reader = BufReader::new(File::open(path)?);
    let mut n = 0usize;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: serde_json::Value = serde_json::from_str(line)?;
        let data = bson::to_document(&value)?;
        match Document::from_data(data) {
            Ok(doc) => {
                col.insert_document(doc);
                n += 1;
            }
            Err(e) => log::warn!("{}:{}: skipping document: {e}", path.display(), line_no + 1),
        }
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn collection_is_created_once() {
        let e = Engine::in_memory();
        let a = e.collection("x");
        let b = e.collection("x");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(e.list_collection_names(), vec!["x".to_string()]);
        assert_eq!(e.checkpoint().unwrap(), 0);
    }

    #[test]
    fn checkpoint_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let e = Engine::open(dir.path()).unwrap();
            let id = e.collection("homes").insert_document(Document::new(doc! {"price": 10.5, "beds": 2}));
            assert_eq!(e.checkpoint().unwrap(), 1);
            id
        };
        let e = Engine::open(dir.path()).unwrap();
        let doc = e.get_collection("homes").unwrap().find_document(&id).unwrap();
        assert_eq!(doc.data.get_f64("price").unwrap(), 10.5);
        assert_eq!(doc.data.get_i64("beds").unwrap(), 2);
    }
}
