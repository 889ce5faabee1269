//! Snapshot system for saving and restoring simulation state.

use crate::agent::Agent;
use crate::config::Config;
use crate::evolution::EvolutionState;
use crate::genome::Genome;
use crate::stats::StatsHistory;
use crate::world::World;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Complete simulation state: population, world, generation counters and
/// the evolution engine's adaptive state.
#[derive(Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Version for compatibility checking
    pub version: u32,
    pub config: Config,
    pub seed: u64,
    pub generation: u32,
    pub gen_step_count: u32,
    pub best_fitness: f64,
    pub best_delivered: u32,
    pub world: World,
    pub population: Vec<Agent>,
    pub evolution_state: EvolutionState,
    pub champion: Option<Genome>,
    pub stats_history: StatsHistory,
}

impl Snapshot {
    /// Current snapshot version
    pub const VERSION: u32 = 1;
    /// File identification bytes
    const MAGIC: &'static [u8; 4] = b"QRRY";

    /// Save snapshot to a binary file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SnapshotError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writer.write_all(Self::MAGIC)?;
        let encoded = bincode::serialize(self)?;
        writer.write_all(&encoded)?;

        Ok(())
    }

    /// Load snapshot from a binary file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != Self::MAGIC {
            return Err(SnapshotError::InvalidFormat("invalid magic bytes".to_string()));
        }

        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        let snapshot: Snapshot = bincode::deserialize(&buffer)?;

        if snapshot.version != Self::VERSION {
            return Err(SnapshotError::VersionMismatch {
                expected: Self::VERSION,
                found: snapshot.version,
            });
        }

        Ok(snapshot)
    }

    /// Approximate serialized size in bytes
    pub fn size_bytes(&self) -> usize {
        bincode::serialized_size(self).unwrap_or(0) as usize
    }
}

/// Errors that can occur during snapshot operations
#[derive(Debug)]
pub enum SnapshotError {
    Io(std::io::Error),
    Serialization(bincode::Error),
    InvalidFormat(String),
    VersionMismatch { expected: u32, found: u32 },
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Serialization(e) => write!(f, "serialization error: {}", e),
            Self::InvalidFormat(msg) => write!(f, "invalid format: {}", msg),
            Self::VersionMismatch { expected, found } => {
                write!(f, "version mismatch: expected {}, found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<std::io::Error> for SnapshotError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<bincode::Error> for SnapshotError {
    fn from(e: bincode::Error) -> Self {
        Self::Serialization(e)
    }
}

/// Snapshot manager for automatic interval saving
pub struct SnapshotManager {
    /// Base directory for snapshots
    pub base_dir: String,
    /// Generations between snapshots
    pub interval: u32,
    /// Maximum snapshots to keep
    pub max_snapshots: usize,
    /// Last snapshotted generation
    last_snapshot: u32,
}

impl SnapshotManager {
    pub fn new(base_dir: String, interval: u32, max_snapshots: usize) -> Self {
        std::fs::create_dir_all(&base_dir).ok();

        Self {
            base_dir,
            interval,
            max_snapshots,
            last_snapshot: 0,
        }
    }

    /// Check whether a snapshot is due at this generation
    pub fn should_save(&self, generation: u32) -> bool {
        self.interval > 0
            && generation > 0
            && generation % self.interval == 0
            && generation != self.last_snapshot
    }

    /// Generate snapshot filename
    pub fn snapshot_path(&self, generation: u32) -> String {
        format!("{}/snapshot_{:06}.bin", self.base_dir, generation)
    }

    /// Save snapshot and update state
    pub fn save(&mut self, snapshot: &Snapshot) -> Result<String, SnapshotError> {
        let path = self.snapshot_path(snapshot.generation);
        snapshot.save(&path)?;
        self.last_snapshot = snapshot.generation;

        self.cleanup()?;

        Ok(path)
    }

    /// Remove old snapshots beyond the keep limit
    fn cleanup(&self) -> Result<(), SnapshotError> {
        let mut snapshots: Vec<_> = std::fs::read_dir(&self.base_dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with("snapshot_")
            })
            .collect();

        if snapshots.len() > self.max_snapshots {
            snapshots.sort_by_key(|e| e.file_name());

            let to_remove = snapshots.len() - self.max_snapshots;
            for entry in snapshots.into_iter().take(to_remove) {
                std::fs::remove_file(entry.path())?;
            }
        }

        Ok(())
    }

    /// Find the latest snapshot in the directory
    pub fn find_latest(&self) -> Option<String> {
        std::fs::read_dir(&self.base_dir)
            .ok()?
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with("snapshot_")
            })
            .max_by_key(|e| e.file_name())
            .map(|e| e.path().to_string_lossy().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::Simulation;

    fn test_snapshot() -> Snapshot {
        let config = Config::default();
        let sim = Simulation::new_with_seed(config, 12345);
        sim.snapshot()
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let snapshot = test_snapshot();
        let temp_path = "/tmp/quarry_test_snapshot.bin";

        snapshot.save(temp_path).unwrap();
        let loaded = Snapshot::load(temp_path).unwrap();

        assert_eq!(loaded.generation, snapshot.generation);
        assert_eq!(loaded.seed, snapshot.seed);
        assert_eq!(loaded.population.len(), snapshot.population.len());
        assert_eq!(loaded.world.stones.len(), snapshot.world.stones.len());
        assert_eq!(
            loaded.population[0].genome,
            snapshot.population[0].genome
        );

        std::fs::remove_file(temp_path).ok();
    }

    #[test]
    fn test_rejects_bad_magic() {
        let temp_path = "/tmp/quarry_bad_magic.bin";
        std::fs::write(temp_path, b"NOPE0000000000").unwrap();

        assert!(matches!(
            Snapshot::load(temp_path),
            Err(SnapshotError::InvalidFormat(_))
        ));

        std::fs::remove_file(temp_path).ok();
    }

    #[test]
    fn test_snapshot_size_is_sane() {
        let snapshot = test_snapshot();
        let size = snapshot.size_bytes();
        assert!(size > 0);
        // ~100 agents with 21x8+8x3 networks stay well under 2 MB.
        assert!(size < 2_000_000);
    }

    #[test]
    fn test_manager_cadence() {
        let manager = SnapshotManager::new("/tmp/quarry_snapshots_test".to_string(), 25, 5);
        assert!(!manager.should_save(0));
        assert!(!manager.should_save(24));
        assert!(manager.should_save(25));
        assert!(manager.should_save(50));
    }
}
