use super::*;

/// Failures of a single simulation run. None of these leave shared state behind.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Input error: invalid capacitor geometry: {0}")]
    InvalidGeometry(String),

    #[error("Input error: {0}")]
    InvalidInput(String),

    #[error("Numerical error: rootfinder did not converge after {iterations} iterations. U: {voltage} V; residual: {residual:.3e} m; tolerance: {tolerance:.3e} m")]
    NoConvergence { iterations: usize, voltage: f64, residual: f64, tolerance: f64 },

    #[error("Numerical error: integration diverged ({cause}) after sample {last_valid_sample} at t = {time} s")]
    IntegrationDiverged { last_valid_sample: usize, time: f64, cause: DivergenceCause },

    #[error("Particle left the gap at sample {sample_index} (t = {time} s, y = {y} m) before transit completed")]
    BoundaryViolation { sample_index: usize, time: f64, y: f64 },
}
