use std::f64::consts::PI;
use tisc::core::material::MaterialKind;

/// Values used for every setting that neither the config file nor the command line provides.
pub struct DefaultsConfig {
    pub variant: MaterialKind,
    pub lattice_constant: f64,
    pub interface_hopping: f64,
    pub points_per_axis: usize,
    pub extent: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub initial_gap: f64,
    pub energy_min: f64,
    pub energy_max: f64,
    pub energy_samples: usize,
    pub broadening: f64,
    pub band_count: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            variant: MaterialKind::DiracTi,
            lattice_constant: 4.14,
            interface_hopping: 0.1,
            points_per_axis: 11,
            extent: PI,
            max_iterations: 200,
            tolerance: 1e-6,
            initial_gap: 0.1,
            energy_min: -0.5,
            energy_max: 0.5,
            energy_samples: 201,
            broadening: 0.01,
            band_count: 5,
        }
    }
}
