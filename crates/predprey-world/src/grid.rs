//! Square toroidal lattice of occupants.

use predprey_core::{Error, Occupant, Position, Result};
use serde::{Deserialize, Serialize};

/// An `size`x`size` lattice stored row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
    cells: Vec<Occupant>,
}

impl Grid {
    /// Allocate an all-empty lattice.
    ///
    /// The buffer is reserved fallibly so an oversized lattice surfaces as
    /// `AllocationFailure` instead of aborting.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidParameters(
                "lattice size must be positive".to_string(),
            ));
        }
        let len = size.checked_mul(size).ok_or_else(|| {
            Error::InvalidParameters(format!("lattice size {} overflows the cell count", size))
        })?;

        let mut cells = Vec::new();
        cells.try_reserve_exact(len).map_err(|e| {
            Error::AllocationFailure(format!("{} cells for a {}x{} lattice: {}", len, size, size, e))
        })?;
        cells.resize(len, Occupant::Empty);

        Ok(Self { size, cells })
    }

    /// Rebuild a lattice from row-major cells.
    pub fn from_cells(size: usize, cells: Vec<Occupant>) -> Result<Self> {
        match size.checked_mul(size) {
            Some(len) if size > 0 && len == cells.len() => Ok(Self { size, cells }),
            _ => Err(Error::InvalidParameters(format!(
                "{} cells do not form a {}x{} lattice",
                cells.len(),
                size,
                size
            ))),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Bounds-checked read; both coordinates must be in `[0, size)`.
    pub fn get(&self, x: usize, y: usize) -> Result<Occupant> {
        if x >= self.size || y >= self.size {
            return Err(Error::OutOfRange {
                x,
                y,
                size: self.size,
            });
        }
        Ok(self.cells[y * self.size + x])
    }

    /// Read a position already known to be on the lattice.
    ///
    /// Panics if `pos` is out of range.
    #[inline]
    pub fn at(&self, pos: Position) -> Occupant {
        self.cells[self.pos_to_index(pos)]
    }

    /// Overwrite a position already known to be on the lattice.
    ///
    /// Panics if `pos` is out of range.
    #[inline]
    pub fn set(&mut self, pos: Position, occupant: Occupant) {
        let index = self.pos_to_index(pos);
        self.cells[index] = occupant;
    }

    /// Count sites holding `occupant`
    pub fn count(&self, occupant: Occupant) -> usize {
        self.cells.iter().filter(|&&c| c == occupant).count()
    }

    /// Row-major view of the cells
    pub fn cells(&self) -> &[Occupant] {
        &self.cells
    }

    #[inline]
    fn pos_to_index(&self, pos: Position) -> usize {
        assert!(
            pos.x < self.size && pos.y < self.size,
            "position ({}, {}) outside {}x{} lattice",
            pos.x,
            pos.y,
            self.size,
            self.size
        );
        pos.y * self.size + pos.x
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        Position::new(index % self.size, index / self.size)
    }

    /// Iterator over all cells with positions, row-major
    pub fn iter(&self) -> impl Iterator<Item = (Position, Occupant)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &cell)| (self.index_to_pos(i), cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use predprey_core::Direction;

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(10).unwrap();
        assert_eq!(grid.size(), 10);
        assert_eq!(grid.len(), 100);
        assert_eq!(grid.count(Occupant::Empty), 100);
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(Grid::new(0), Err(Error::InvalidParameters(_))));
    }

    #[test]
    fn test_overflowing_size_rejected() {
        assert!(matches!(
            Grid::new(usize::MAX),
            Err(Error::InvalidParameters(_))
        ));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_huge_allocation_fails_cleanly() {
        // 2^62 cells: no usize overflow, but far beyond any address space.
        let size = 1usize << 31;
        assert!(matches!(Grid::new(size), Err(Error::AllocationFailure(_))));
    }

    #[test]
    fn test_bounds() {
        let grid = Grid::new(4).unwrap();
        assert!(grid.get(3, 3).is_ok());
        assert!(matches!(
            grid.get(4, 0),
            Err(Error::OutOfRange { x: 4, y: 0, size: 4 })
        ));
        assert!(grid.get(0, 4).is_err());
    }

    #[test]
    fn test_row_major_layout() {
        let mut grid = Grid::new(3).unwrap();
        grid.set(Position::new(2, 1), Occupant::Prey);
        assert_eq!(grid.cells()[5], Occupant::Prey);
        assert_eq!(grid.index_to_pos(5), Position::new(2, 1));
        assert_eq!(grid.get(2, 1).unwrap(), Occupant::Prey);
    }

    #[test]
    fn test_toroidal_neighbor_lookup() {
        let mut grid = Grid::new(5).unwrap();
        grid.set(Position::new(4, 0), Occupant::Predator);

        let origin = Position::new(0, 0);
        assert_eq!(grid.at(origin.neighbor(Direction::West, 5)), Occupant::Predator);
        assert_eq!(grid.at(origin.neighbor(Direction::East, 5)), Occupant::Empty);
    }

    #[test]
    fn test_iter_order() {
        let mut grid = Grid::new(2).unwrap();
        grid.set(Position::new(1, 0), Occupant::Predator);
        let cells: Vec<_> = grid.iter().collect();
        assert_eq!(
            cells,
            vec![
                (Position::new(0, 0), Occupant::Empty),
                (Position::new(1, 0), Occupant::Predator),
                (Position::new(0, 1), Occupant::Empty),
                (Position::new(1, 1), Occupant::Empty)
            ]
        );
    }

    #[test]
    fn test_from_cells() {
        let cells = vec![Occupant::Prey; 9];
        let grid = Grid::from_cells(3, cells).unwrap();
        assert_eq!(grid.count(Occupant::Prey), 9);

        assert!(Grid::from_cells(3, vec![Occupant::Empty; 8]).is_err());
        assert!(Grid::from_cells(0, Vec::new()).is_err());
    }
}
