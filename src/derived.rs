use super::*;

/// a_y(t) = q*E(y(t))/m at every sample.
pub fn accelerations(series: &TrajectorySeries, field: &FieldModel, particle: &ParticleConstants) -> Result<Vec<f64>, SimulationError> {
    series.samples().iter().enumerate().map(|(index, sample)| {
        let ay = field.acceleration(sample.y, particle);
        if ay.is_finite() {
            Ok(ay)
        } else {
            Err(SimulationError::IntegrationDiverged{
                last_valid_sample: index.saturating_sub(1),
                time: sample.t,
                cause: DivergenceCause::NON_FINITE
            })
        }
    }).collect()
}

/// Fills in the acceleration column of a freshly integrated series.
pub fn attach_accelerations(series: TrajectorySeries, field: &FieldModel, particle: &ParticleConstants) -> Result<TrajectorySeries, SimulationError> {
    let ay = accelerations(&series, field, particle)?;
    Ok(series.with_accelerations(ay))
}

/// Axial position x = V*t of each sample, for y(x) plots.
pub fn axial_positions(series: &TrajectorySeries, kinematics: &Kinematics) -> Vec<f64> {
    series.times().map(|t| kinematics.velocity*t).collect()
}

/// Largest |y| reached during transit.
pub fn peak_displacement(series: &TrajectorySeries) -> f64 {
    series.positions().fold(0., |peak: f64, y| peak.max(y.abs()))
}

/// Transverse state of the particle as it leaves the capacitor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExitState {
    pub y: f64,
    pub vy: f64,
    pub ay: f64,
    /// Angle between the exit velocity and the capacitor axis, in radians.
    pub deflection_angle: f64,
    pub peak_displacement: f64,
    pub outcome: TransitOutcome,
}

impl fmt::Display for ExitState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "y(T) = {} m, vy(T) = {} m/s, deflection = {} rad, peak |y| = {} m, {}",
            self.y, self.vy, self.deflection_angle, self.peak_displacement, self.outcome)
    }
}

pub fn exit_state(series: &TrajectorySeries, kinematics: &Kinematics) -> Option<ExitState> {
    series.last().map(|last| ExitState {
        y: last.y,
        vy: last.vy,
        ay: last.ay,
        deflection_angle: last.vy.atan2(kinematics.velocity),
        peak_displacement: peak_displacement(series),
        outcome: series.outcome(),
    })
}
