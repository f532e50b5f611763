//! Lattice engine: initialization, the per-step micro-event loop, and queries.

use crate::grid::Grid;
use crate::snapshot::LatticeSnapshot;
use predprey_core::rng::{chance, threshold};
use predprey_core::{
    Action, Direction, Error, Occupant, Position, Result, SimulationParameters,
};
use rand_core::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Steps between population snapshots in the debug log
const METRICS_INTERVAL: u64 = 100;

/// Per-occupant site counts from one full scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Census {
    pub predators: usize,
    pub prey: usize,
    pub empty: usize,
}

impl Census {
    pub fn of(grid: &Grid) -> Self {
        let mut census = Census::default();
        for &cell in grid.cells() {
            match cell {
                Occupant::Predator => census.predators += 1,
                Occupant::Prey => census.prey += 1,
                Occupant::Empty => census.empty += 1,
            }
        }
        census
    }

    pub fn total(&self) -> usize {
        self.predators + self.prey + self.empty
    }

    pub fn predator_density(&self) -> f64 {
        self.density(self.predators)
    }

    pub fn prey_density(&self) -> f64 {
        self.density(self.prey)
    }

    fn density(&self, count: usize) -> f64 {
        match self.total() {
            0 => 0.0,
            total => count as f64 / total as f64,
        }
    }
}

/// Hook invoked by [`Simulation::run`] around each step
pub trait StepObserver {
    /// Called before every step with the current state.
    fn observe(&mut self, sim: &Simulation) -> Result<()>;

    /// Called once after the final step.
    fn finish(&mut self, _sim: &Simulation) -> Result<()> {
        Ok(())
    }
}

/// Observer that does nothing
pub struct NullObserver;

impl StepObserver for NullObserver {
    fn observe(&mut self, _sim: &Simulation) -> Result<()> {
        Ok(())
    }
}

/// Outcome of a complete run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub steps_run: u64,
    pub final_time: u64,
    pub final_census: Census,
}

impl SimulationResult {
    pub fn predators_extinct(&self) -> bool {
        self.final_census.predators == 0
    }

    pub fn prey_extinct(&self) -> bool {
        self.final_census.prey == 0
    }
}

pub struct Simulation {
    grid: Grid,
    params: SimulationParameters,
    time: u64,
}

impl Simulation {
    /// Allocate and randomly populate the lattice.
    ///
    /// Sites are visited row-major and each consumes exactly one draw: the
    /// site is a predator if the draw falls below `rho_pred`, prey if it
    /// falls below `rho_pred + rho_prey`, and empty otherwise.
    pub fn init<R: RngCore + ?Sized>(params: SimulationParameters, rng: &mut R) -> Result<Self> {
        params.validate()?;

        let mut grid = Grid::new(params.size)?;
        let predator_limit = threshold(params.rho_pred);
        let prey_limit = threshold(params.rho_pred + params.rho_prey);

        for y in 0..params.size {
            for x in 0..params.size {
                let r = u128::from(rng.next_u64());
                let occupant = if r < predator_limit {
                    Occupant::Predator
                } else if r < prey_limit {
                    Occupant::Prey
                } else {
                    Occupant::Empty
                };
                grid.set(Position::new(x, y), occupant);
            }
        }

        let sim = Self {
            grid,
            params,
            time: 0,
        };

        let census = sim.census();
        info!(
            size = sim.params.size,
            maxtime = sim.params.maxtime,
            predators = census.predators,
            prey = census.prey,
            "Lattice initialized"
        );

        Ok(sim)
    }

    /// Resume from a snapshot taken with the same parameters.
    pub fn restore(params: SimulationParameters, snapshot: &LatticeSnapshot) -> Result<Self> {
        params.validate()?;

        if snapshot.size != params.size {
            return Err(Error::InvalidParameters(format!(
                "snapshot lattice is {}x{}, parameters ask for {}x{}",
                snapshot.size, snapshot.size, params.size, params.size
            )));
        }
        if snapshot.time > params.maxtime {
            return Err(Error::InvalidState(format!(
                "snapshot step {} is past maxtime {}",
                snapshot.time, params.maxtime
            )));
        }

        let grid = snapshot.to_grid()?;
        info!("Restored lattice at step {}", snapshot.time);

        Ok(Self {
            grid,
            params,
            time: snapshot.time,
        })
    }

    /// Run the remaining steps, calling `observer` before each one.
    #[instrument(skip(self, rng, observer), fields(size = self.params.size, maxtime = self.params.maxtime))]
    pub fn run<R: RngCore + ?Sized>(
        &mut self,
        rng: &mut R,
        observer: &mut dyn StepObserver,
    ) -> Result<SimulationResult> {
        info!(
            "Running steps {}..{}",
            self.time, self.params.maxtime
        );

        let start = self.time;
        while !self.is_finished() {
            observer.observe(self)?;
            self.step(rng)?;

            if self.time % METRICS_INTERVAL == 0 {
                self.emit_population_metrics();
            }
        }
        observer.finish(self)?;

        let result = SimulationResult {
            steps_run: self.time - start,
            final_time: self.time,
            final_census: self.census(),
        };

        info!(
            steps_run = result.steps_run,
            predators = result.final_census.predators,
            prey = result.final_census.prey,
            predators_extinct = result.predators_extinct(),
            prey_extinct = result.prey_extinct(),
            "Run complete"
        );

        Ok(result)
    }

    /// Advance one time unit: `size²` sequential micro-events.
    pub fn step<R: RngCore + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        if self.is_finished() {
            return Err(Error::InvalidState(format!(
                "run already reached maxtime {}",
                self.params.maxtime
            )));
        }

        for _ in 0..self.params.cell_count() {
            self.micro_event(rng);
        }

        self.time += 1;
        Ok(())
    }

    fn micro_event<R: RngCore + ?Sized>(&mut self, rng: &mut R) {
        let target = self.random_cell(rng);

        match Action::from_draw(rng.next_u64()) {
            Action::Die => self.die(target, rng),
            Action::Eat => self.eat(target, rng),
            Action::Reproduce => self.reproduce(target, rng),
            Action::Idle => {}
        }
    }

    fn random_cell<R: RngCore + ?Sized>(&self, rng: &mut R) -> Position {
        let size = self.params.size as u64;
        let x = (rng.next_u64() % size) as usize;
        let y = (rng.next_u64() % size) as usize;
        Position::new(x, y)
    }

    fn random_neighbor<R: RngCore + ?Sized>(&self, cell: Position, rng: &mut R) -> Position {
        cell.neighbor(Direction::from_draw(rng.next_u64()), self.params.size)
    }

    fn die<R: RngCore + ?Sized>(&mut self, cell: Position, rng: &mut R) {
        if self.grid.at(cell) == Occupant::Predator && chance(rng, self.params.mu) {
            self.grid.set(cell, Occupant::Empty);
        }
    }

    fn eat<R: RngCore + ?Sized>(&mut self, cell: Position, rng: &mut R) {
        if self.grid.at(cell) != Occupant::Predator {
            return;
        }
        let neighbor = self.random_neighbor(cell, rng);
        if self.grid.at(neighbor) == Occupant::Prey && chance(rng, self.params.lambda) {
            self.grid.set(neighbor, Occupant::Predator);
        }
    }

    fn reproduce<R: RngCore + ?Sized>(&mut self, cell: Position, rng: &mut R) {
        if self.grid.at(cell) != Occupant::Prey {
            return;
        }
        let neighbor = self.random_neighbor(cell, rng);
        if self.grid.at(neighbor) == Occupant::Empty && chance(rng, self.params.sigma) {
            self.grid.set(neighbor, Occupant::Prey);
        }
    }

    fn emit_population_metrics(&self) {
        let census = self.census();
        debug!(
            event = "population_metrics",
            time = self.time,
            predators = census.predators,
            prey = census.prey,
            empty = census.empty,
            predator_density = census.predator_density(),
            prey_density = census.prey_density(),
            "Population snapshot"
        );
    }

    /// Occupant at `(x, y)`; both coordinates must be in `[0, size)`.
    pub fn occupant_at(&self, x: usize, y: usize) -> Result<Occupant> {
        self.grid.get(x, y)
    }

    /// Fraction of sites holding a predator
    pub fn predator_density(&self) -> f64 {
        self.grid.count(Occupant::Predator) as f64 / self.grid.len() as f64
    }

    /// Fraction of sites holding prey
    pub fn prey_density(&self) -> f64 {
        self.grid.count(Occupant::Prey) as f64 / self.grid.len() as f64
    }

    pub fn census(&self) -> Census {
        Census::of(&self.grid)
    }

    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn maxtime(&self) -> u64 {
        self.params.maxtime
    }

    pub fn is_finished(&self) -> bool {
        self.time >= self.params.maxtime
    }

    pub fn size(&self) -> usize {
        self.grid.size()
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn snapshot(&self) -> LatticeSnapshot {
        LatticeSnapshot::new(self.time, &self.grid)
    }

    /// Release the lattice buffer.
    pub fn teardown(self) {
        debug!(
            "Releasing {}x{} lattice at step {}",
            self.grid.size(),
            self.grid.size(),
            self.time
        );
    }
}
