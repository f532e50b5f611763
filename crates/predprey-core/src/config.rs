//! Configuration types for the simulation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest rendered frame side, in pixels
pub const MAX_FRAME_SIDE: u32 = 16_384;

/// Interaction rates, initial densities and run length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Predator death rate (0.0 to 1.0)
    pub mu: f64,
    /// Predation rate: prey converted into predator (0.0 to 1.0)
    pub lambda: f64,
    /// Prey reproduction rate (0.0 to 1.0)
    pub sigma: f64,
    /// Initial predator density (0.0 to 1.0)
    pub rho_pred: f64,
    /// Initial prey density (0.0 to 1.0)
    pub rho_prey: f64,
    /// Side length of the square lattice
    pub size: usize,
    /// Number of steps in a run
    pub maxtime: u64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            mu: 0.025,
            lambda: 0.25,
            sigma: 1.0,
            rho_pred: 0.3,
            rho_prey: 0.3,
            size: 256,
            maxtime: 2500,
        }
    }
}

impl SimulationParameters {
    /// Check every field against its domain.
    pub fn validate(&self) -> Result<()> {
        let rates = [
            ("mu", self.mu),
            ("lambda", self.lambda),
            ("sigma", self.sigma),
            ("rho_pred", self.rho_pred),
            ("rho_prey", self.rho_prey),
        ];
        for (name, value) in rates {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidParameters(format!(
                    "{} must be a finite value in [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.rho_pred + self.rho_prey > 1.0 {
            return Err(Error::InvalidParameters(format!(
                "rho_pred + rho_prey must not exceed 1, got {}",
                self.rho_pred + self.rho_prey
            )));
        }

        if self.size == 0 {
            return Err(Error::InvalidParameters(
                "lattice size must be positive".to_string(),
            ));
        }

        if self.size.checked_mul(self.size).is_none() {
            return Err(Error::InvalidParameters(format!(
                "lattice size {} overflows the cell count",
                self.size
            )));
        }

        if self.maxtime == 0 {
            return Err(Error::InvalidParameters(
                "maxtime must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Number of sites on the lattice, which is also the micro-events per step
    pub fn cell_count(&self) -> usize {
        self.size * self.size
    }
}

/// Reporting and rendering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Steps between density report lines (0 disables the report)
    pub report_interval: u64,
    /// Steps between rendered frames
    pub frame_interval: u64,
    /// Directory for PNG frames
    pub frame_dir: Option<PathBuf>,
    /// Path of the animated GIF
    pub gif_path: Option<PathBuf>,
    /// Pixels per lattice site in rendered frames
    pub cell_scale: u32,
    /// Path the final lattice snapshot is written to
    pub snapshot_path: Option<PathBuf>,
}

impl OutputConfig {
    pub fn rendering_enabled(&self) -> bool {
        self.frame_dir.is_some() || self.gif_path.is_some()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_interval: 25,
            frame_interval: 25,
            frame_dir: None,
            gif_path: None,
            cell_scale: 2,
            snapshot_path: None,
        }
    }
}

/// Everything needed to launch one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Random seed for reproducibility; `None` seeds from OS entropy
    pub seed: Option<u64>,
    /// Simulation parameters
    pub params: SimulationParameters,
    /// Output configuration
    pub output: OutputConfig,
}

impl RunConfig {
    /// Load a run configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: RunConfig = serde_json::from_str(&text)?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;

        if self.output.cell_scale == 0 {
            return Err(Error::InvalidParameters(
                "cell_scale must be positive".to_string(),
            ));
        }

        if self.output.rendering_enabled() {
            if self.output.frame_interval == 0 {
                return Err(Error::InvalidParameters(
                    "frame_interval must be positive when rendering".to_string(),
                ));
            }

            let side = self
                .params
                .size
                .checked_mul(self.output.cell_scale as usize)
                .filter(|&side| side <= MAX_FRAME_SIDE as usize);
            if side.is_none() {
                return Err(Error::InvalidParameters(format!(
                    "{}x{} lattice at cell_scale {} exceeds the {} pixel frame limit",
                    self.params.size, self.params.size, self.output.cell_scale, MAX_FRAME_SIDE
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_configs() {
        let params = SimulationParameters::default();
        assert_eq!(params.size, 256);
        assert_eq!(params.maxtime, 2500);
        assert_eq!(params.mu, 0.025);
        assert!(params.validate().is_ok());

        let output = OutputConfig::default();
        assert_eq!(output.report_interval, 25);

        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rate_out_of_bounds() {
        let params = SimulationParameters {
            lambda: 1.5,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(Error::InvalidParameters(_))));

        let params = SimulationParameters {
            sigma: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(Error::InvalidParameters(_))));
    }

    #[test]
    fn test_densities_must_fit() {
        let params = SimulationParameters {
            rho_pred: 0.6,
            rho_prey: 0.5,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = SimulationParameters {
            rho_pred: 1.0,
            rho_prey: 0.0,
            ..Default::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_size_and_duration() {
        let zero = SimulationParameters {
            size: 0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());

        let huge = SimulationParameters {
            size: usize::MAX,
            ..Default::default()
        };
        assert!(huge.validate().is_err());

        let no_steps = SimulationParameters {
            maxtime: 0,
            ..Default::default()
        };
        assert!(no_steps.validate().is_err());
    }

    #[test]
    fn test_frame_side_limit() {
        let mut config = RunConfig {
            params: SimulationParameters {
                size: 2,
                ..Default::default()
            },
            output: OutputConfig {
                cell_scale: 1 << 31,
                ..Default::default()
            },
            ..Default::default()
        };
        // Scale is irrelevant while nothing is rendered.
        assert!(config.validate().is_ok());

        config.output.frame_dir = Some(PathBuf::from("frames"));
        assert!(matches!(config.validate(), Err(Error::InvalidParameters(_))));

        config.output.cell_scale = MAX_FRAME_SIDE / 2;
        assert!(config.validate().is_ok());
        config.output.cell_scale += 1;
        assert!(config.validate().is_err());

        config.output.frame_dir = None;
        config.output.gif_path = Some(PathBuf::from("run.gif"));
        config.output.cell_scale = 2;
        config.params.size = 1 << 20;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_run_config_partial_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"seed": 7, "params": {{"size": 32, "sigma": 0.5}}}}"#).unwrap();

        let config = RunConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.params.size, 32);
        assert_eq!(config.params.sigma, 0.5);
        assert_eq!(config.params.mu, 0.025);
        assert_eq!(config.output.report_interval, 25);
    }

    #[test]
    fn test_run_config_roundtrip() {
        let config = RunConfig {
            seed: Some(1),
            ..Default::default()
        };
        let json = config.to_json_pretty().unwrap();
        let back: RunConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_missing_config_file() {
        let err = RunConfig::from_json_file("/nonexistent/predprey.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
