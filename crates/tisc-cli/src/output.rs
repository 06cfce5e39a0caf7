//! CSV result files written at the end of a run, one row per record.

use crate::error::{CliError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tisc::core::pairing::PairingChannel;
use tisc::engine::state::{GlobalResultGrid, PointResult, PointStatus, SolvedPoint};
use tracing::{debug, info};

pub const ORDER_PARAMETER_FILE: &str = "order_parameter.csv";
pub const BANDS_FILE: &str = "bands.csv";
pub const ENERGIES_FILE: &str = "energies.csv";
pub const LDOS_FILE: &str = "ldos.csv";
pub const STATUS_FILE: &str = "status.csv";

#[derive(Serialize)]
struct OrderParameterRow {
    index: usize,
    kx: f64,
    ky: f64,
    layer: usize,
    channel: String,
    re: f64,
    im: f64,
    magnitude: f64,
}

#[derive(Serialize)]
struct BandRow {
    index: usize,
    kx: f64,
    ky: f64,
    band: usize,
    energy: f64,
}

#[derive(Serialize)]
struct EnergyRow {
    index: usize,
    kx: f64,
    ky: f64,
    raw: f64,
    chemical_potential_term: f64,
    double_counting: f64,
    corrected: f64,
}

#[derive(Serialize)]
struct LdosRow {
    index: usize,
    kx: f64,
    ky: f64,
    layer: usize,
    energy: f64,
    total: f64,
    spin_x: f64,
    spin_y: f64,
    spin_z: f64,
    orbital_x: f64,
    orbital_y: f64,
    orbital_z: f64,
}

#[derive(Serialize)]
struct StatusRow<'a> {
    index: usize,
    kx: f64,
    ky: f64,
    status: PointStatus,
    iterations: Option<usize>,
    max_abs_delta: Option<f64>,
    message: Option<&'a str>,
}

fn write_rows<R, I>(path: &Path, rows: I) -> Result<()>
where
    R: Serialize,
    I: IntoIterator<Item = R>,
{
    let output_error = |source| CliError::Output {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(output_error)?;
    for row in rows {
        writer.serialize(row).map_err(output_error)?;
    }
    writer.flush()?;
    debug!("Wrote {:?}", path);
    Ok(())
}

fn order_parameter_rows(point: &SolvedPoint) -> impl Iterator<Item = OrderParameterRow> + '_ {
    point
        .order_parameter
        .projections
        .iter()
        .enumerate()
        .flat_map(move |(layer, projections)| {
            PairingChannel::all().map(move |channel| {
                let amplitude = projections.amplitude(channel);
                OrderParameterRow {
                    index: point.index,
                    kx: point.momentum.kx,
                    ky: point.momentum.ky,
                    layer,
                    channel: channel.to_string(),
                    re: amplitude.re,
                    im: amplitude.im,
                    magnitude: amplitude.norm(),
                }
            })
        })
}

fn band_rows(point: &SolvedPoint) -> impl Iterator<Item = BandRow> + '_ {
    point
        .observables
        .bands
        .iter()
        .enumerate()
        .map(move |(band, &energy)| BandRow {
            index: point.index,
            kx: point.momentum.kx,
            ky: point.momentum.ky,
            band,
            energy,
        })
}

fn energy_row(point: &SolvedPoint) -> EnergyRow {
    let energy = &point.observables.energy;
    EnergyRow {
        index: point.index,
        kx: point.momentum.kx,
        ky: point.momentum.ky,
        raw: energy.raw,
        chemical_potential_term: energy.chemical_potential_term,
        double_counting: energy.double_counting,
        corrected: energy.corrected,
    }
}

fn ldos_rows<'a>(point: &'a SolvedPoint, energies: &'a [f64]) -> impl Iterator<Item = LdosRow> + 'a {
    let ldos = &point.observables.ldos;
    (0..ldos.total.nrows()).flat_map(move |layer| {
        energies.iter().enumerate().map(move |(e, &energy)| LdosRow {
            index: point.index,
            kx: point.momentum.kx,
            ky: point.momentum.ky,
            layer,
            energy,
            total: ldos.total[(layer, e)],
            spin_x: ldos.spin[0][(layer, e)],
            spin_y: ldos.spin[1][(layer, e)],
            spin_z: ldos.spin[2][(layer, e)],
            orbital_x: ldos.orbital[0][(layer, e)],
            orbital_y: ldos.orbital[1][(layer, e)],
            orbital_z: ldos.orbital[2][(layer, e)],
        })
    })
}

fn status_row(point: &PointResult) -> StatusRow<'_> {
    let momentum = point.momentum();
    match point {
        PointResult::Solved(solved) => StatusRow {
            index: solved.index,
            kx: momentum.kx,
            ky: momentum.ky,
            status: solved.status,
            iterations: Some(solved.iterations),
            max_abs_delta: solved.final_metric.map(|m| m.max_abs_delta),
            message: None,
        },
        PointResult::Failed(failure) => StatusRow {
            index: failure.index,
            kx: momentum.kx,
            ky: momentum.ky,
            status: PointStatus::Failed,
            iterations: None,
            max_abs_delta: None,
            message: Some(&failure.message),
        },
    }
}

/// Writes the five result files into `dir`, creating it if needed, and returns
/// their paths. Failed points appear only in the status file.
pub fn write_results(grid: &GlobalResultGrid, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let path = |name: &str| dir.join(name);

    let files = vec![
        path(ORDER_PARAMETER_FILE),
        path(BANDS_FILE),
        path(ENERGIES_FILE),
        path(LDOS_FILE),
        path(STATUS_FILE),
    ];

    write_rows(&files[0], grid.solved().flat_map(order_parameter_rows))?;
    write_rows(&files[1], grid.solved().flat_map(band_rows))?;
    write_rows(&files[2], grid.solved().map(energy_row))?;
    write_rows(
        &files[3],
        grid.solved().flat_map(|point| ldos_rows(point, &grid.energies)),
    )?;
    write_rows(&files[4], grid.iter().map(status_row))?;

    info!(directory = ?dir, points = grid.len(), "Result files written.");
    Ok(files)
}
