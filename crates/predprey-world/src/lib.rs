//! Lattice engine.
//!
//! This module implements the toroidal lattice where predators and prey
//! die, eat and reproduce through randomized local micro-events.

pub mod grid;
pub mod simulation;
pub mod snapshot;

pub use grid::Grid;
pub use simulation::{Census, NullObserver, Simulation, SimulationResult, StepObserver};
pub use snapshot::LatticeSnapshot;
