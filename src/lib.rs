#![allow(non_snake_case)]
#![allow(non_camel_case_types)]

use std::fmt;
use std::mem::discriminant;

//Error handling crates
use anyhow::{Result, Context, anyhow};
use thiserror::Error;

//Logging
use log::{debug, info, warn, error};

//Serializing/Deserializing crate
use serde::*;

//Parallelization and progress
use rayon::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};

//I/O
use std::fs::OpenOptions;
use std::io::prelude::*;
use std::io::BufWriter;

//itertools
use itertools::{izip, Itertools};

#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3::wrap_pyfunction;

//Load internal modules
pub mod consts;
pub mod enums;
pub mod errors;
pub mod structs;
pub mod field;
pub mod integrator;
pub mod derived;
pub mod critical;
pub mod physics;
pub mod input;
pub mod output;
pub mod tests;

pub use crate::enums::*;
pub use crate::consts::*;
pub use crate::errors::SimulationError;
pub use crate::structs::*;
pub use crate::field::FieldModel;
pub use crate::critical::{CriticalField, CriticalFieldSolver};
pub use crate::physics::{NumericalOptions, SimulationConfig, Simulation, simulate, sweep};
pub use crate::input::{Input, Options};

#[cfg(feature = "python")]
#[pymodule]
pub fn pydeflect(py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(simulate_py, m)?)?;
    m.add_function(wrap_pyfunction!(critical_voltage_py, m)?)?;
    Ok(())
}

/// Simulates an electron through a capacitor with the linear field model.
///
/// Returns rows of [t, y, vy, ay] in SI units. `field_scale` in V/m; omit it to use the critical field.
#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(signature = (inner_radius, outer_radius, length, velocity, num_samples=1000, field_scale=None, negative_orientation=false))]
pub fn simulate_py(inner_radius: f64, outer_radius: f64, length: f64, velocity: f64, num_samples: usize,
    field_scale: Option<f64>, negative_orientation: bool) -> PyResult<Vec<[f64; 4]>> {

    let capacitor = Capacitor {inner_radius, outer_radius, length};
    let mut config = SimulationConfig::new(capacitor, velocity);
    config.numerics.num_samples = num_samples;
    if negative_orientation {
        config.orientation = FieldOrientation::NEGATIVE;
    }
    if let Some(field_scale) = field_scale {
        config.field_scale = FieldScale::FIXED(field_scale);
    }

    let simulation = simulate(&config)
        .map_err(|error| pyo3::exceptions::PyValueError::new_err(error.to_string()))?;

    Ok(simulation.trajectory.samples().iter().map(|sample| [sample.t, sample.y, sample.vy, sample.ay]).collect())
}

/// Critical potential difference in Volts under the uniform-field approximation.
#[cfg(feature = "python")]
#[pyfunction]
pub fn critical_voltage_py(inner_radius: f64, outer_radius: f64, length: f64, velocity: f64) -> PyResult<f64> {
    let capacitor = Capacitor {inner_radius, outer_radius, length};
    let config = SimulationConfig::new(capacitor, velocity);

    CriticalFieldSolver::from_config(&config).solve()
        .map(|critical_field| critical_field.voltage)
        .map_err(|error| pyo3::exceptions::PyValueError::new_err(error.to_string()))
}
