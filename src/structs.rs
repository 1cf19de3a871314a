use super::*;

/// Cylindrical capacitor dimensions in meters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Capacitor {
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub length: f64,
}

impl Capacitor {
    /// Constructs a capacitor, rejecting non-positive or ill-ordered dimensions.
    pub fn new(inner_radius: f64, outer_radius: f64, length: f64) -> Result<Capacitor, SimulationError> {
        let capacitor = Capacitor {
            inner_radius,
            outer_radius,
            length
        };
        capacitor.validate()?;
        Ok(capacitor)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(self.inner_radius > 0.) || !self.inner_radius.is_finite() {
            return Err(SimulationError::InvalidGeometry(format!("inner radius {} m must be positive", self.inner_radius)));
        }
        if !(self.outer_radius > self.inner_radius) {
            return Err(SimulationError::InvalidGeometry(format!("outer radius {} m must exceed inner radius {} m; gap = {} m",
                self.outer_radius, self.inner_radius, self.outer_radius - self.inner_radius)));
        }
        if !self.outer_radius.is_finite() || !self.gap().is_finite() {
            return Err(SimulationError::InvalidGeometry(format!("outer radius {} m and gap {} m must be finite", self.outer_radius, self.gap())));
        }
        if !(self.length > 0.) || !self.length.is_finite() {
            return Err(SimulationError::InvalidGeometry(format!("length {} m must be positive", self.length)));
        }
        Ok(())
    }

    /// Plate gap R - r.
    pub fn gap(&self) -> f64 {
        self.outer_radius - self.inner_radius
    }
}

/// Axial motion of the particle; unaccelerated and decoupled from the transverse motion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Kinematics {
    pub velocity: f64,
    pub length: f64,
}

impl Kinematics {
    pub fn new(velocity: f64, length: f64) -> Kinematics {
        Kinematics {
            velocity,
            length
        }
    }

    /// Time spent between the plates, L/V.
    pub fn transit_time(&self) -> f64 {
        self.length/self.velocity
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        let transit_time = self.transit_time();
        if !(transit_time > 0.) || !transit_time.is_finite() {
            return Err(SimulationError::InvalidGeometry(format!("transit time L/V = {}/{} = {} s must be positive and finite",
                self.length, self.velocity, transit_time)));
        }
        Ok(())
    }
}

/// Charge magnitude and mass of the simulated particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleConstants {
    pub q: f64,
    pub m: f64,
}

impl ParticleConstants {
    pub fn new(q: f64, m: f64) -> ParticleConstants {
        ParticleConstants {
            q,
            m
        }
    }

    pub fn electron() -> ParticleConstants {
        ParticleConstants::new(Q, ME)
    }

    pub fn charge_to_mass(&self) -> f64 {
        self.q/self.m
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(self.q > 0.) || !(self.m > 0.) || !self.charge_to_mass().is_finite() {
            return Err(SimulationError::InvalidInput(format!("particle charge magnitude {} C and mass {} kg must be positive", self.q, self.m)));
        }
        Ok(())
    }
}

impl Default for ParticleConstants {
    fn default() -> ParticleConstants {
        ParticleConstants::electron()
    }
}

/// One row of a trajectory: time, transverse state and derived acceleration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrajectorySample {
    pub t: f64,
    pub y: f64,
    pub vy: f64,
    pub ay: f64,
    pub outside_gap: bool,
}

impl TrajectorySample {
    pub fn state(&self) -> State {
        State::new(self.y, self.vy)
    }
}

/// Immutable time series produced by a single integration.
#[derive(Clone, Debug)]
pub struct TrajectorySeries {
    samples: Vec<TrajectorySample>,
    gap: f64,
    first_violation: Option<usize>,
}

impl TrajectorySeries {
    /// Builds a series from sampled states, marking every sample from the first |y| > gap onwards.
    pub fn from_states(times: &[f64], states: &[State], gap: f64) -> TrajectorySeries {
        let mut first_violation: Option<usize> = None;

        let samples: Vec<TrajectorySample> = times.iter().zip(states).enumerate().map(|(index, (&t, state))| {
            if first_violation.is_none() & (state.y.abs() > gap) {
                first_violation = Some(index);
            }
            TrajectorySample {
                t,
                y: state.y,
                vy: state.vy,
                ay: 0.,
                outside_gap: first_violation.is_some(),
            }
        }).collect();

        TrajectorySeries {
            samples,
            gap,
            first_violation
        }
    }

    pub(crate) fn with_accelerations(mut self, accelerations: Vec<f64>) -> TrajectorySeries {
        for (sample, ay) in self.samples.iter_mut().zip(accelerations) {
            sample.ay = ay;
        }
        self
    }

    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn gap(&self) -> f64 {
        self.gap
    }

    pub fn first_violation(&self) -> Option<usize> {
        self.first_violation
    }

    pub fn last(&self) -> Option<&TrajectorySample> {
        self.samples.last()
    }

    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|sample| sample.t)
    }

    pub fn positions(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|sample| sample.y)
    }

    pub fn velocities(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|sample| sample.vy)
    }

    pub fn accelerations(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|sample| sample.ay)
    }

    pub fn outcome(&self) -> TransitOutcome {
        match self.first_violation {
            Some(sample_index) => TransitOutcome::STRUCK_PLATE{sample_index, time: self.samples[sample_index].t},
            None => TransitOutcome::EXITED,
        }
    }

    /// Promotes a boundary violation to an error for callers that treat plate strikes as fatal.
    pub fn ensure_exited(&self) -> Result<&TrajectorySeries, SimulationError> {
        match self.first_violation {
            Some(sample_index) => {
                let sample = &self.samples[sample_index];
                Err(SimulationError::BoundaryViolation{sample_index, time: sample.t, y: sample.y})
            },
            None => Ok(self),
        }
    }
}
