use crate::core::material::ModelError;
use crate::core::momentum::MomentumGrid;
use crate::core::pairing::PairingChannel;
use crate::core::params::{PhysicalParameters, Region, RegionValues};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Iterations during which the convergence metric is not measured.
pub const WARM_UP_ITERATIONS: usize = 10;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Temperature must be strictly positive (got {0} K)")]
    NonPositiveTemperature(f64),

    #[error("Convergence tolerance must be strictly positive (got {0})")]
    NonPositiveTolerance(f64),

    #[error("Invalid material configuration: {0}")]
    Model(#[from] ModelError),

    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationConfig {
    pub max_iterations: usize,
    pub tolerance: f64,
    /// Uniform gap `Δ0` seeded into the superconducting layers.
    pub initial_gap: f64,
}

/// Energy samples `[min, max]` on which the local density of states is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyWindow {
    pub min: f64,
    pub max: f64,
    pub samples: usize,
}

impl Default for EnergyWindow {
    fn default() -> Self {
        Self {
            min: -0.5,
            max: 0.5,
            samples: 201,
        }
    }
}

impl EnergyWindow {
    pub fn energies(&self) -> Vec<f64> {
        match self.samples {
            0 => Vec::new(),
            1 => vec![self.min],
            n => {
                let step = (self.max - self.min) / (n - 1) as f64;
                (0..n).map(|i| self.min + step * i as f64).collect()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservableConfig {
    pub energy_window: EnergyWindow,
    /// Gaussian width of each eigenvalue in the LDOS (eV).
    pub broadening: f64,
    /// Number of positive eigenvalues reported as the band sample.
    pub band_count: usize,
    /// Per-region weights of the double-counting correction. `None` selects
    /// `1 / V` in each region (zero where `V = 0`).
    pub double_counting: Option<RegionValues>,
}

impl Default for ObservableConfig {
    fn default() -> Self {
        Self {
            energy_window: EnergyWindow::default(),
            broadening: 0.01,
            band_count: 5,
            double_counting: None,
        }
    }
}

impl ObservableConfig {
    pub fn double_counting_weight(&self, params: &PhysicalParameters, region: Region) -> f64 {
        match self.double_counting {
            Some(weights) => weights.get(region),
            None => {
                let v = params.interaction.get(region);
                if v == 0.0 { 0.0 } else { 1.0 / v }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub physics: PhysicalParameters,
    pub grid: MomentumGrid,
    pub iteration: IterationConfig,
    /// Channels whose projections are fed back into the Hamiltonian.
    pub pairing_channels: Vec<PairingChannel>,
    pub observables: ObservableConfig,
    /// `None` uses one worker per thread of the global pool.
    pub workers: Option<usize>,
}

impl SolverConfig {
    /// Checks every run-level precondition before any momentum point is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.physics;
        if !(p.temperature > 0.0) {
            return Err(ConfigError::NonPositiveTemperature(p.temperature));
        }
        if !(self.iteration.tolerance > 0.0) {
            return Err(ConfigError::NonPositiveTolerance(self.iteration.tolerance));
        }
        p.material.check_orbital_count(p.orbital_count)?;
        if p.layers == 0 || p.sc_layers > p.layers {
            return Err(ModelError::LayerCount {
                layers: p.layers,
                sc_layers: p.sc_layers,
            }
            .into());
        }
        if !(p.lattice_constant > 0.0) {
            return Err(invalid("lattice_constant", "must be strictly positive"));
        }
        if self.iteration.max_iterations == 0 {
            return Err(invalid("max_iterations", "at least one iteration is required"));
        }
        if self.grid.is_empty() {
            return Err(invalid("grid.points_per_axis", "the momentum grid is empty"));
        }
        if !self.grid.extent.is_finite() || self.grid.extent < 0.0 {
            return Err(invalid("grid.extent", "must be finite and non-negative"));
        }
        let window = &self.observables.energy_window;
        if window.samples == 0 {
            return Err(invalid("energy_window.samples", "at least one sample is required"));
        }
        if !(window.min < window.max) {
            return Err(invalid(
                "energy_window",
                format!("min ({}) must be below max ({})", window.min, window.max),
            ));
        }
        if !(self.observables.broadening > 0.0) {
            return Err(invalid("broadening", "must be strictly positive"));
        }
        if self.workers == Some(0) {
            return Err(invalid("workers", "at least one worker is required"));
        }
        Ok(())
    }
}

fn invalid(parameter: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        parameter,
        reason: reason.into(),
    }
}

#[derive(Default)]
pub struct SolverConfigBuilder {
    physics: Option<PhysicalParameters>,
    grid: Option<MomentumGrid>,
    max_iterations: Option<usize>,
    tolerance: Option<f64>,
    initial_gap: Option<f64>,
    pairing_channels: Option<Vec<PairingChannel>>,
    observables: Option<ObservableConfig>,
    workers: Option<usize>,
}

impl SolverConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn physics(mut self, physics: PhysicalParameters) -> Self {
        self.physics = Some(physics);
        self
    }
    pub fn grid(mut self, grid: MomentumGrid) -> Self {
        self.grid = Some(grid);
        self
    }
    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = Some(iterations);
        self
    }
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }
    pub fn initial_gap(mut self, gap: f64) -> Self {
        self.initial_gap = Some(gap);
        self
    }
    pub fn pairing_channels(mut self, channels: Vec<PairingChannel>) -> Self {
        self.pairing_channels = Some(channels);
        self
    }
    pub fn observables(mut self, observables: ObservableConfig) -> Self {
        self.observables = Some(observables);
        self
    }
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn build(self) -> Result<SolverConfig, ConfigError> {
        let iteration = IterationConfig {
            max_iterations: self
                .max_iterations
                .ok_or(ConfigError::MissingParameter("max_iterations"))?,
            tolerance: self
                .tolerance
                .ok_or(ConfigError::MissingParameter("tolerance"))?,
            initial_gap: self
                .initial_gap
                .ok_or(ConfigError::MissingParameter("initial_gap"))?,
        };
        let config = SolverConfig {
            physics: self
                .physics
                .ok_or(ConfigError::MissingParameter("physics"))?,
            grid: self.grid.unwrap_or_default(),
            iteration,
            pairing_channels: self
                .pairing_channels
                .unwrap_or_else(|| PairingChannel::DEFAULT_ACTIVE.to_vec()),
            observables: self.observables.unwrap_or_default(),
            workers: self.workers,
        };
        config.validate()?;
        Ok(config)
    }
}
