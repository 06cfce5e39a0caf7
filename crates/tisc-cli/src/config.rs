mod defaults;

use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use defaults::DefaultsConfig;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tisc::core::material::{MaterialKind, MaterialVariant, SuperconductorParams};
use tisc::core::momentum::MomentumGrid;
use tisc::core::params::{PhysicalParameters, RegionValues, ZeemanField};
use tisc::engine::config::{EnergyWindow, ObservableConfig, SolverConfig, SolverConfigBuilder};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, Copy)]
#[serde(deny_unknown_fields)]
struct PartialRegionValues {
    topological: Option<f64>,
    superconductor: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone, Copy)]
#[serde(deny_unknown_fields)]
struct PartialZeemanField {
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
}

impl From<PartialZeemanField> for ZeemanField {
    fn from(p: PartialZeemanField) -> Self {
        ZeemanField::new(p.x.unwrap_or(0.0), p.y.unwrap_or(0.0), p.z.unwrap_or(0.0))
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialPhysicsConfig {
    dirac_mass: Option<f64>,
    temperature: Option<f64>,
    lattice_constant: Option<f64>,
    interface_hopping: Option<f64>,
    layers: Option<usize>,
    sc_layers: Option<usize>,
    orbital_count: Option<usize>,
    chemical_potential: Option<PartialRegionValues>,
    interaction: Option<PartialRegionValues>,
    zeeman: Option<PartialZeemanField>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialGridConfig {
    points_per_axis: Option<usize>,
    extent: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialIterationConfig {
    max_iterations: Option<usize>,
    tolerance: Option<f64>,
    initial_gap: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialPairingConfig {
    channels: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialObservableConfig {
    energy_min: Option<f64>,
    energy_max: Option<f64>,
    energy_samples: Option<usize>,
    broadening: Option<f64>,
    band_count: Option<usize>,
    double_counting: Option<PartialRegionValues>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialRunConfig {
    physics: Option<PartialPhysicsConfig>,
    material: Option<MaterialVariant>,
    superconductor: Option<SuperconductorParams>,
    grid: Option<PartialGridConfig>,
    iteration: Option<PartialIterationConfig>,
    pairing: Option<PartialPairingConfig>,
    observables: Option<PartialObservableConfig>,
    workers: Option<usize>,
}

/// Keeps the parameters already given for `kind`, otherwise falls back to the
/// variant's defaults.
fn select_variant(current: Option<MaterialVariant>, kind: MaterialKind) -> MaterialVariant {
    match current {
        Some(variant) if variant.kind() == kind => variant,
        _ => kind.default_variant(),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

fn float(key: &str, value: &str) -> Result<f64> {
    parse_value(key, value, "float")
}

fn integer(key: &str, value: &str) -> Result<usize> {
    parse_value(key, value, "integer")
}

fn required<T>(value: Option<T>, key: &str) -> Result<T> {
    value.ok_or_else(|| CliError::Config(format!("`{}` is required.", key)))
}

impl PartialRunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn merge_with_cli(mut self, args: &RunArgs) -> Result<SolverConfig> {
        self.apply_set_values(&args.set_values)?;
        let defaults = DefaultsConfig::default();

        let material = match &args.variant {
            Some(tag) => {
                let kind = tag
                    .parse::<MaterialKind>()
                    .map_err(|e| CliError::Argument(e.to_string()))?;
                select_variant(self.material.take(), kind)
            }
            None => self
                .material
                .take()
                .unwrap_or_else(|| defaults.variant.default_variant()),
        };

        let physics = Self::merge_physics(
            self.physics.take().unwrap_or_default(),
            material,
            self.superconductor.take().unwrap_or_default(),
            &defaults,
        )?;

        let grid_file = self.grid.take().unwrap_or_default();
        let grid = MomentumGrid::new(
            args.points_per_axis
                .or(grid_file.points_per_axis)
                .unwrap_or(defaults.points_per_axis),
            grid_file.extent.unwrap_or(defaults.extent),
        );

        let iteration_file = self.iteration.take().unwrap_or_default();
        let observables = Self::merge_observables(self.observables.take(), &defaults)?;

        let mut builder = SolverConfigBuilder::new()
            .physics(physics)
            .grid(grid)
            .max_iterations(
                args.max_iterations
                    .or(iteration_file.max_iterations)
                    .unwrap_or(defaults.max_iterations),
            )
            .tolerance(
                args.tolerance
                    .or(iteration_file.tolerance)
                    .unwrap_or(defaults.tolerance),
            )
            .initial_gap(iteration_file.initial_gap.unwrap_or(defaults.initial_gap))
            .observables(observables);

        if let Some(channels) = self.pairing.take().and_then(|p| p.channels) {
            let channels = channels
                .iter()
                .map(|name| parser::parse_pairing_channel(name))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| CliError::Argument(e.to_string()))?;
            builder = builder.pairing_channels(channels);
        }
        if let Some(workers) = args.workers.or(self.workers) {
            builder = builder.workers(workers);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn merge_physics(
        partial: PartialPhysicsConfig,
        material: MaterialVariant,
        superconductor: SuperconductorParams,
        defaults: &DefaultsConfig,
    ) -> Result<PhysicalParameters> {
        let chemical_potential = partial.chemical_potential.unwrap_or_default();
        let interaction = partial.interaction.unwrap_or_default();
        let orbital_count = partial
            .orbital_count
            .unwrap_or_else(|| material.kind().required_orbitals());

        Ok(PhysicalParameters {
            dirac_mass: required(partial.dirac_mass, "physics.dirac-mass")?,
            chemical_potential: RegionValues::new(
                chemical_potential.topological.unwrap_or(0.0),
                chemical_potential.superconductor.unwrap_or(0.0),
            ),
            interaction: RegionValues::new(
                interaction.topological.unwrap_or(0.0),
                required(interaction.superconductor, "physics.interaction.superconductor")?,
            ),
            zeeman: partial.zeeman.unwrap_or_default().into(),
            temperature: required(partial.temperature, "physics.temperature")?,
            lattice_constant: partial.lattice_constant.unwrap_or(defaults.lattice_constant),
            material,
            superconductor,
            interface_hopping: partial.interface_hopping.unwrap_or(defaults.interface_hopping),
            layers: required(partial.layers, "physics.layers")?,
            sc_layers: required(partial.sc_layers, "physics.sc-layers")?,
            orbital_count,
        })
    }

    fn merge_observables(
        partial: Option<PartialObservableConfig>,
        defaults: &DefaultsConfig,
    ) -> Result<ObservableConfig> {
        let partial = partial.unwrap_or_default();
        let double_counting = match partial.double_counting {
            Some(weights) => Some(RegionValues::new(
                required(weights.topological, "observables.double-counting.topological")?,
                required(weights.superconductor, "observables.double-counting.superconductor")?,
            )),
            None => None,
        };
        Ok(ObservableConfig {
            energy_window: EnergyWindow {
                min: partial.energy_min.unwrap_or(defaults.energy_min),
                max: partial.energy_max.unwrap_or(defaults.energy_max),
                samples: partial.energy_samples.unwrap_or(defaults.energy_samples),
            },
            broadening: partial.broadening.unwrap_or(defaults.broadening),
            band_count: partial.band_count.unwrap_or(defaults.band_count),
            double_counting,
        })
    }

    fn physics_mut(&mut self) -> &mut PartialPhysicsConfig {
        self.physics.get_or_insert_with(Default::default)
    }

    fn iteration_mut(&mut self) -> &mut PartialIterationConfig {
        self.iteration.get_or_insert_with(Default::default)
    }

    fn grid_mut(&mut self) -> &mut PartialGridConfig {
        self.grid.get_or_insert_with(Default::default)
    }

    fn observables_mut(&mut self) -> &mut PartialObservableConfig {
        self.observables.get_or_insert_with(Default::default)
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value) =
                parser::parse_assignment(kv_pair).map_err(|e| CliError::Config(e.to_string()))?;

            match key {
                "material.variant" => {
                    let kind = value
                        .parse::<MaterialKind>()
                        .map_err(|e| CliError::Config(e.to_string()))?;
                    self.material = Some(select_variant(self.material.take(), kind));
                }
                "physics.dirac-mass" => self.physics_mut().dirac_mass = Some(float(key, value)?),
                "physics.temperature" => self.physics_mut().temperature = Some(float(key, value)?),
                "physics.lattice-constant" => {
                    self.physics_mut().lattice_constant = Some(float(key, value)?)
                }
                "physics.interface-hopping" => {
                    self.physics_mut().interface_hopping = Some(float(key, value)?)
                }
                "physics.layers" => self.physics_mut().layers = Some(integer(key, value)?),
                "physics.sc-layers" => self.physics_mut().sc_layers = Some(integer(key, value)?),
                "physics.orbital-count" => {
                    self.physics_mut().orbital_count = Some(integer(key, value)?)
                }
                "physics.chemical-potential.topological" => {
                    self.physics_mut()
                        .chemical_potential
                        .get_or_insert_with(Default::default)
                        .topological = Some(float(key, value)?)
                }
                "physics.chemical-potential.superconductor" => {
                    self.physics_mut()
                        .chemical_potential
                        .get_or_insert_with(Default::default)
                        .superconductor = Some(float(key, value)?)
                }
                "physics.interaction.topological" => {
                    self.physics_mut()
                        .interaction
                        .get_or_insert_with(Default::default)
                        .topological = Some(float(key, value)?)
                }
                "physics.interaction.superconductor" => {
                    self.physics_mut()
                        .interaction
                        .get_or_insert_with(Default::default)
                        .superconductor = Some(float(key, value)?)
                }
                "physics.zeeman.x" | "physics.zeeman.y" | "physics.zeeman.z" => {
                    let component = float(key, value)?;
                    let zeeman = self.physics_mut().zeeman.get_or_insert_with(Default::default);
                    match key {
                        "physics.zeeman.x" => zeeman.x = Some(component),
                        "physics.zeeman.y" => zeeman.y = Some(component),
                        _ => zeeman.z = Some(component),
                    }
                }
                "grid.points-per-axis" => self.grid_mut().points_per_axis = Some(integer(key, value)?),
                "grid.extent" => self.grid_mut().extent = Some(float(key, value)?),
                "iteration.max-iterations" => {
                    self.iteration_mut().max_iterations = Some(integer(key, value)?)
                }
                "iteration.tolerance" => self.iteration_mut().tolerance = Some(float(key, value)?),
                "iteration.initial-gap" => self.iteration_mut().initial_gap = Some(float(key, value)?),
                "observables.broadening" => {
                    self.observables_mut().broadening = Some(float(key, value)?)
                }
                "observables.band-count" => {
                    self.observables_mut().band_count = Some(integer(key, value)?)
                }
                "workers" => self.workers = Some(integer(key, value)?),
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}
