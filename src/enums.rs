use super::*;

/// Spatial profile of the transverse electric field across the gap.
#[derive(Deserialize, PartialEq, Clone, Copy, Debug)]
pub enum FieldShape {
    /// Position-independent field of magnitude |E_scale|.
    UNIFORM,
    /// Field of magnitude |E_scale| on the axis, decaying linearly to zero at the plate the particle is driven toward.
    LINEAR,
}

impl fmt::Display for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FieldShape::UNIFORM => write!(f, "Uniform transverse field"),
            FieldShape::LINEAR => write!(f, "Linearly decaying transverse field"),
        }
    }
}

/// Sign convention of the field on the capacitor axis.
///
/// For a positive field scale, `POSITIVE` gives `E(y) = E_scale*(1 - y/g)` and drives the
/// particle toward the `+y` plate; `NEGATIVE` gives `E(y) = -E_scale*(1 + y/g)` and drives it
/// toward the `-y` plate. The two conventions are mirror images of one another.
#[derive(Deserialize, PartialEq, Clone, Copy, Debug)]
pub enum FieldOrientation {
    POSITIVE,
    NEGATIVE,
}

impl FieldOrientation {
    pub fn sign(&self) -> f64 {
        match self {
            FieldOrientation::POSITIVE => 1.,
            FieldOrientation::NEGATIVE => -1.,
        }
    }

    pub fn flipped(&self) -> FieldOrientation {
        match self {
            FieldOrientation::POSITIVE => FieldOrientation::NEGATIVE,
            FieldOrientation::NEGATIVE => FieldOrientation::POSITIVE,
        }
    }
}

impl fmt::Display for FieldOrientation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FieldOrientation::POSITIVE => write!(f, "toward the +y plate"),
            FieldOrientation::NEGATIVE => write!(f, "toward the -y plate"),
        }
    }
}

/// Boundary condition defining the critical field.
#[derive(Deserialize, PartialEq, Clone, Copy, Debug)]
pub enum CriticalCriterion {
    /// Constant acceleration q*E_scale/m displaces the particle by exactly the gap at exit.
    UNIFORM_APPROXIMATION,
    /// The integrated trajectory in the configured field model reaches the gap at exit.
    FULL_TRAJECTORY,
}

impl fmt::Display for CriticalCriterion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CriticalCriterion::UNIFORM_APPROXIMATION => write!(f, "Uniform-field approximation"),
            CriticalCriterion::FULL_TRAJECTORY => write!(f, "Full trajectory integration"),
        }
    }
}

/// Root-finding algorithm used to solve for the critical potential difference.
#[derive(Deserialize, Clone, Copy, Debug)]
pub enum Rootfinder {
    /// Secant iteration with user-defined `max_iterations` and `tolerance`.
    SECANT{max_iterations: usize, tolerance: f64},
    /// Newton-Raphson with a central-difference derivative.
    NEWTON{max_iterations: usize, tolerance: f64},
    /// Closed-form solution of the uniform-field quadratic.
    ANALYTIC,
}

impl fmt::Display for Rootfinder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Rootfinder::SECANT{max_iterations, tolerance} => write!(f, "Secant Rootfinder with maximum {} iterations and tolerance = {}", max_iterations, tolerance),
            Rootfinder::NEWTON{max_iterations, tolerance} => write!(f, "Newton-Raphson Rootfinder with maximum {} iterations and tolerance = {}", max_iterations, tolerance),
            Rootfinder::ANALYTIC => write!(f, "Closed-form uniform-field solution"),
        }
    }
}

impl PartialEq for Rootfinder {
    fn eq(&self, other: &Self) -> bool {
        discriminant(self) == discriminant(other)
    }
}

/// Time-stepping scheme for the transverse equation of motion.
#[derive(Deserialize, Clone, Copy, Debug)]
pub enum Integrator {
    /// Adaptive Dormand-Prince 5(4) embedded Runge-Kutta pair.
    DORMAND_PRINCE{rtol: f64, atol: f64, max_steps: usize},
    /// Classical fixed-step fourth-order Runge-Kutta with `substeps` steps per sample interval.
    RK4{substeps: usize},
}

impl fmt::Display for Integrator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Integrator::DORMAND_PRINCE{rtol, atol, max_steps} => write!(f, "Dormand-Prince 5(4) with rtol = {}, atol = {} and at most {} steps", rtol, atol, max_steps),
            Integrator::RK4{substeps} => write!(f, "Fixed-step RK4 with {} substeps per sample", substeps),
        }
    }
}

impl PartialEq for Integrator {
    fn eq(&self, other: &Self) -> bool {
        discriminant(self) == discriminant(other)
    }
}

/// Reason an integration was abandoned.
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum DivergenceCause {
    NON_FINITE,
    STEP_BUDGET,
    STEP_UNDERFLOW,
}

impl fmt::Display for DivergenceCause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DivergenceCause::NON_FINITE => write!(f, "non-finite state"),
            DivergenceCause::STEP_BUDGET => write!(f, "step budget exhausted"),
            DivergenceCause::STEP_UNDERFLOW => write!(f, "step size underflow"),
        }
    }
}

/// How the particle left the capacitor.
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum TransitOutcome {
    /// The particle stayed within the gap for the whole transit.
    EXITED,
    /// The particle left the gap at the given sample before transit completed.
    STRUCK_PLATE{sample_index: usize, time: f64},
}

impl fmt::Display for TransitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            TransitOutcome::EXITED => write!(f, "exited"),
            TransitOutcome::STRUCK_PLATE{sample_index, time} => write!(f, "struck plate at sample {} (t = {} s)", sample_index, time),
        }
    }
}

/// Field scale used for a run: solved for, or supplied directly in V/m.
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum FieldScale {
    CRITICAL,
    FIXED(f64),
}

impl fmt::Display for FieldScale {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FieldScale::CRITICAL => write!(f, "critical field scale"),
            FieldScale::FIXED(field_scale) => write!(f, "fixed field scale {} V/m", field_scale),
        }
    }
}
