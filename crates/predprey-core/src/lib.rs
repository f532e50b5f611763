//! Core types, configuration and random source for the lattice predator-prey simulator.

pub mod types;
pub mod config;
pub mod error;
pub mod rng;

pub use error::{Error, Result};
pub use types::*;
pub use config::*;
pub use rng::Xorshift128Plus;
