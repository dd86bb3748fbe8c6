use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::NeatError;

/// Maps a directed edge `(start_id, end_id)` to a stable innovation number.
///
/// Grounded on `state.rs::InnovationRecord` from the teacher, generalized to
/// the canonical string key spec.md §3/§6 requires (`"<start>-<end>"`) so
/// the in-memory map and the persisted form agree byte-for-byte. The first
/// inserted innovation is 0, the second is 1 — a count-at-insert-time
/// scheme, reproduced exactly per spec.md §4.B's note, since crossover
/// alignment across generations depends on it.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct InnovationRegistry {
    records: HashMap<(u32, u32), u32>,
}

impl InnovationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(start_id: u32, end_id: u32) -> String {
        format!("{start_id}-{end_id}")
    }

    /// Returns the stored innovation number for `(start_id, end_id)`,
    /// assigning the current record count if this is the first sighting.
    pub fn get_or_assign(&mut self, start_id: u32, end_id: u32) -> u32 {
        let count = self.records.len() as u32;
        *self.records.entry((start_id, end_id)).or_insert(count)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn to_string_map(&self) -> HashMap<String, u32> {
        self.records
            .iter()
            .map(|(&(s, e), &inno)| (Self::key(s, e), inno))
            .collect()
    }

    fn from_string_map(map: HashMap<String, u32>) -> Result<Self, NeatError> {
        let mut records = HashMap::with_capacity(map.len());
        for (key, inno) in map {
            let (start, end) = key.split_once('-').ok_or_else(|| {
                NeatError::InvalidArgument(format!("malformed innovation key {key:?}"))
            })?;
            let start: u32 = start
                .parse()
                .map_err(|_| NeatError::InvalidArgument(format!("malformed innovation key {key:?}")))?;
            let end: u32 = end
                .parse()
                .map_err(|_| NeatError::InvalidArgument(format!("malformed innovation key {key:?}")))?;
            records.insert((start, end), inno);
        }
        Ok(Self { records })
    }

    pub fn load_from(&mut self, store: &dyn InnovationStore) -> Result<(), NeatError> {
        *self = Self::from_string_map(store.load()?)?;
        Ok(())
    }

    pub fn save_to(&self, store: &dyn InnovationStore) -> Result<(), NeatError> {
        store.save(&self.to_string_map())
    }
}

/// External collaborator spec.md §6 calls "persisted state": a key-value
/// store of innovation records keyed by `"<startId>-<endId>"`. The core
/// only ever calls through this trait; format is implementation-defined.
pub trait InnovationStore {
    fn load(&self) -> Result<HashMap<String, u32>, NeatError>;
    fn save(&self, records: &HashMap<String, u32>) -> Result<(), NeatError>;
}

/// No-op store: nothing persists across process lifetimes. Default for
/// `Population::new` and the only store used in unit tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryStore;

impl InnovationStore for MemoryStore {
    fn load(&self) -> Result<HashMap<String, u32>, NeatError> {
        Ok(HashMap::new())
    }

    fn save(&self, _records: &HashMap<String, u32>) -> Result<(), NeatError> {
        Ok(())
    }
}

/// Flat JSON file on disk, one table, cleared at population creation per
/// spec.md §6 ("The store is cleared on population creation").
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl InnovationStore for JsonFileStore {
    fn load(&self) -> Result<HashMap<String, u32>, NeatError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let bytes = fs::read(&self.path).map_err(NeatError::Store)?;
        serde_json::from_slice(&bytes).map_err(NeatError::Serde)
    }

    fn save(&self, records: &HashMap<String, u32>) -> Result<(), NeatError> {
        let bytes = serde_json::to_vec_pretty(records).map_err(NeatError::Serde)?;
        fs::write(&self.path, bytes).map_err(NeatError::Store)
    }
}

/// Binary sibling of `JsonFileStore`, backed by `bincode` (already a
/// teacher dependency) for populations that round-trip full state rather
/// than just the innovation table.
#[derive(Debug, Clone)]
pub struct BincodeFileStore {
    path: PathBuf,
}

impl BincodeFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl InnovationStore for BincodeFileStore {
    fn load(&self) -> Result<HashMap<String, u32>, NeatError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let bytes = fs::read(&self.path).map_err(NeatError::Store)?;
        let config = bincode::config::standard();
        let (records, _) = bincode::serde::decode_from_slice(&bytes, config)
            .map_err(|e| NeatError::InvalidArgument(e.to_string()))?;
        Ok(records)
    }

    fn save(&self, records: &HashMap<String, u32>) -> Result<(), NeatError> {
        let config = bincode::config::standard();
        let bytes = bincode::serde::encode_to_vec(records, config)
            .map_err(|e| NeatError::InvalidArgument(e.to_string()))?;
        fs::write(&self.path, bytes).map_err(NeatError::Store)
    }
}
