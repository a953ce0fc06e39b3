//! Access to previously cached building snapshots.
//!
//! The route provider never reaches into storage directly; it is handed a
//! [`SnapshotProvider`]. Two implementations ship with the crate:
//!
//! - [`InMemorySnapshots`]: a copy-on-write map, handy for tests and for
//!   hosts that keep snapshots resident.
//! - [`FileSnapshotStore`]: one JSON document per building in a cache
//!   directory (`WAYFINDER_CACHE_DIR`, or the platform cache directory).

use std::collections::BTreeMap;
use std::env;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use directories::ProjectDirs;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::{BuildingId, BuildingSnapshot};

const CACHE_DIR_ENV: &str = "WAYFINDER_CACHE_DIR";
const SNAPSHOT_EXTENSION: &str = "json";

/// Read-only lookups over cached building snapshots.
///
/// Snapshots are handed out behind an [`Arc`]: replacing a building swaps the
/// pointer, so a computation holding the old snapshot is never affected.
pub trait SnapshotProvider: Send + Sync {
    /// The cached snapshot for `building_id`, if any.
    fn get_cached_building(&self, building_id: &str) -> Option<Arc<BuildingSnapshot>>;

    /// The building whose cached snapshot contains `node_id`, if any.
    fn find_building_for_node(&self, node_id: &str) -> Option<BuildingId>;
}

/// Snapshot cache held in memory.
#[derive(Debug, Default)]
pub struct InMemorySnapshots {
    buildings: RwLock<BTreeMap<BuildingId, Arc<BuildingSnapshot>>>,
}

impl InMemorySnapshots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache pre-populated with `snapshots`.
    pub fn with_snapshots(snapshots: impl IntoIterator<Item = BuildingSnapshot>) -> Self {
        let cache = Self::new();
        for snapshot in snapshots {
            cache.insert(snapshot);
        }
        cache
    }

    /// Insert or replace the snapshot for its building.
    pub fn insert(&self, snapshot: BuildingSnapshot) {
        let mut buildings = self
            .buildings
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        buildings.insert(snapshot.building_id.clone(), Arc::new(snapshot));
    }

    pub fn remove(&self, building_id: &str) -> Option<Arc<BuildingSnapshot>> {
        self.buildings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(building_id)
    }

    pub fn len(&self) -> usize {
        self.buildings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SnapshotProvider for InMemorySnapshots {
    fn get_cached_building(&self, building_id: &str) -> Option<Arc<BuildingSnapshot>> {
        self.buildings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(building_id)
            .cloned()
    }

    fn find_building_for_node(&self, node_id: &str) -> Option<BuildingId> {
        self.buildings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .find(|snapshot| snapshot.contains_node(node_id))
            .map(|snapshot| snapshot.building_id.clone())
    }
}

/// Resolve the default snapshot cache directory.
///
/// Honors `WAYFINDER_CACHE_DIR` before falling back to the platform cache
/// directory.
pub fn default_cache_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os(CACHE_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let dirs =
        ProjectDirs::from("com", "wayfinder", "wayfinder").ok_or(Error::CacheDirsUnavailable)?;
    Ok(dirs.cache_dir().join("buildings"))
}

/// Snapshot cache backed by one JSON file per building.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Use `dir` as the cache directory. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Open the store at [`default_cache_dir`].
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(default_cache_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document holding `building_id`.
    pub fn snapshot_path(&self, building_id: &str) -> Result<PathBuf> {
        validate_building_id(building_id)?;
        Ok(self
            .dir
            .join(format!("{building_id}.{SNAPSHOT_EXTENSION}")))
    }

    /// Persist a snapshot, replacing any previous one for the same building.
    ///
    /// The document is written to a temporary file in the cache directory and
    /// then renamed into place, so readers never observe a partial file.
    pub fn save(&self, snapshot: &BuildingSnapshot) -> Result<PathBuf> {
        let path = self.snapshot_path(&snapshot.building_id)?;
        fs::create_dir_all(&self.dir)?;

        let mut temp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer(&mut writer, snapshot)?;
            writer.flush()?;
        }
        temp.persist(&path).map_err(|err| Error::Io(err.error))?;

        info!(
            building_id = %snapshot.building_id,
            nodes = snapshot.nodes.len(),
            edges = snapshot.edges.len(),
            path = %path.display(),
            "cached building snapshot"
        );
        Ok(path)
    }

    /// Load the snapshot for `building_id`; `Ok(None)` when nothing is cached.
    pub fn load(&self, building_id: &str) -> Result<Option<BuildingSnapshot>> {
        let path = self.snapshot_path(building_id)?;
        if !path.exists() {
            return Ok(None);
        }
        let reader = BufReader::new(File::open(&path)?);
        let snapshot: BuildingSnapshot = serde_json::from_reader(reader)?;
        debug!(building_id, path = %path.display(), "loaded building snapshot");
        Ok(Some(snapshot))
    }

    /// Ids of all cached buildings, sorted.
    pub fn list(&self) -> Result<Vec<BuildingId>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SNAPSHOT_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                if validate_building_id(stem).is_ok() {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Delete the cached snapshot; returns whether one existed.
    pub fn remove(&self, building_id: &str) -> Result<bool> {
        let path = self.snapshot_path(building_id)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        Ok(true)
    }
}

impl SnapshotProvider for FileSnapshotStore {
    fn get_cached_building(&self, building_id: &str) -> Option<Arc<BuildingSnapshot>> {
        match self.load(building_id) {
            Ok(snapshot) => snapshot.map(Arc::new),
            Err(err) => {
                warn!(building_id, error = %err, "ignoring unreadable building snapshot");
                None
            }
        }
    }

    fn find_building_for_node(&self, node_id: &str) -> Option<BuildingId> {
        let ids = match self.list() {
            Ok(ids) => ids,
            Err(err) => {
                warn!(error = %err, dir = %self.dir.display(), "failed to list cached buildings");
                return None;
            }
        };

        ids.into_iter().find(|id| {
            self.get_cached_building(id)
                .is_some_and(|snapshot| snapshot.contains_node(node_id))
        })
    }
}

/// Building ids become file names, so only a conservative alphabet is allowed.
fn validate_building_id(building_id: &str) -> Result<()> {
    let valid = !building_id.is_empty()
        && !building_id.starts_with('.')
        && building_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidBuildingId {
            building_id: building_id.to_string(),
        })
    }
}
