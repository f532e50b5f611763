//! Textual density report.

use predprey_core::Result;
use predprey_world::{Simulation, StepObserver};
use std::io::Write;

/// Writes `time<TAB>predator_density<TAB>prey_density` every `interval` steps.
pub struct DensityReporter<W: Write> {
    out: W,
    interval: u64,
}

impl<W: Write> DensityReporter<W> {
    pub fn new(out: W, interval: u64) -> Self {
        Self { out, interval }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, sim: &Simulation) -> Result<()> {
        writeln!(
            self.out,
            "{}\t{:.6}\t{:.6}",
            sim.time(),
            sim.predator_density(),
            sim.prey_density()
        )?;
        Ok(())
    }
}

impl<W: Write> StepObserver for DensityReporter<W> {
    fn observe(&mut self, sim: &Simulation) -> Result<()> {
        if self.interval > 0 && sim.time() % self.interval == 0 {
            self.write_line(sim)?;
        }
        Ok(())
    }

    fn finish(&mut self, _sim: &Simulation) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
