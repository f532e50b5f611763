//! Serializable lattice snapshots.

use crate::grid::Grid;
use predprey_core::{Error, Occupant, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

const SNAPSHOT_VERSION: u32 = 1;

/// Lattice contents at a given step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatticeSnapshot {
    pub version: u32,
    pub time: u64,
    pub size: usize,
    pub cells: Vec<Occupant>,
}

impl LatticeSnapshot {
    pub fn new(time: u64, grid: &Grid) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            time,
            size: grid.size(),
            cells: grid.cells().to_vec(),
        }
    }

    /// Serialize to bincode
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize from bincode, rejecting unknown versions
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let snapshot: LatticeSnapshot =
            bincode::deserialize(bytes).map_err(|e| Error::Serialization(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(Error::Serialization(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_bytes()?)?;
        info!("Snapshot at step {} written to {:?}", self.time, path);
        Ok(())
    }

    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(&bytes)
    }

    /// Rebuild the lattice, checking the cell count matches the size
    pub fn to_grid(&self) -> Result<Grid> {
        Grid::from_cells(self.size, self.cells.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use predprey_core::Position;

    #[test]
    fn test_snapshot_bytes() {
        let mut grid = Grid::new(3).unwrap();
        grid.set(Position::new(1, 2), Occupant::Predator);

        let snapshot = LatticeSnapshot::new(12, &grid);
        let bytes = snapshot.to_bytes().unwrap();
        let restored = LatticeSnapshot::from_bytes(&bytes).unwrap();

        assert_eq!(restored.time, 12);
        assert_eq!(restored.to_grid().unwrap(), grid);
    }

    #[test]
    fn test_unknown_version_rejected() {
        let grid = Grid::new(2).unwrap();
        let mut snapshot = LatticeSnapshot::new(0, &grid);
        snapshot.version = 99;
        let bytes = snapshot.to_bytes().unwrap();
        assert!(matches!(
            LatticeSnapshot::from_bytes(&bytes),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(LatticeSnapshot::from_bytes(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_mismatched_cells_rejected() {
        let snapshot = LatticeSnapshot {
            version: SNAPSHOT_VERSION,
            time: 0,
            size: 3,
            cells: vec![Occupant::Empty; 4],
        };
        assert!(snapshot.to_grid().is_err());
    }
}
