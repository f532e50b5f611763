//! Core type definitions for the lattice.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag held by a single lattice site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Occupant {
    #[default]
    Empty,
    Predator,
    Prey,
}

impl fmt::Display for Occupant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Occupant::Empty => "empty",
            Occupant::Predator => "predator",
            Occupant::Prey => "prey",
        };
        f.write_str(name)
    }
}

/// 2D position on the lattice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Step one site in `direction`, wrapping around a `size`x`size` torus.
    ///
    /// Assumes `self` is already inside the lattice.
    pub fn neighbor(&self, direction: Direction, size: usize) -> Self {
        let up = |v: usize| if v + 1 == size { 0 } else { v + 1 };
        let down = |v: usize| if v == 0 { size - 1 } else { v - 1 };

        match direction {
            Direction::South => Self::new(self.x, up(self.y)),
            Direction::North => Self::new(self.x, down(self.y)),
            Direction::East => Self::new(up(self.x), self.y),
            Direction::West => Self::new(down(self.x), self.y),
        }
    }
}

/// Orthogonal neighbor direction.
///
/// The discriminant order is the order a draw `r % 4` selects them in, which
/// is part of the reproducible draw sequence: +y, -y, +x, -x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    South,
    North,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::South,
        Direction::North,
        Direction::East,
        Direction::West,
    ];

    /// Map a raw 64-bit draw onto a direction.
    pub fn from_draw(r: u64) -> Self {
        Self::ALL[(r % 4) as usize]
    }
}

/// Micro-event kind, drawn uniformly once per micro-event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Die,
    Eat,
    Reproduce,
    Idle,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Die, Action::Eat, Action::Reproduce, Action::Idle];

    /// Map a raw 64-bit draw onto an action.
    pub fn from_draw(r: u64) -> Self {
        Self::ALL[(r % 4) as usize]
    }
}
