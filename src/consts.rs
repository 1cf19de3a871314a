use super::*;

//Physical constants
///Fundamental charge in Coulombs.
pub const Q: f64 = 1.602176634E-19;
/// One electron-volt in Joules.
pub const EV: f64 = Q;
/// One atomic mass unit in kilograms.
pub const AMU: f64 = 1.66053906660E-27;
/// Electron mass in kilograms.
pub const ME: f64 = 9.1093837015E-31;
/// Proton mass in kilograms.
pub const MP: f64 = 1.67262192369E-27;
/// One micron in meters.
pub const MICRON: f64 = 1E-6;
/// One millimeter in meters.
pub const MM: f64 = 1E-3;
/// One centimeter in meters.
pub const CM: f64 = 1E-2;
/// Speed of light in meters/second.
pub const C: f64 = 299792458.;
/// Electron charge-to-mass ratio magnitude in C/kg.
pub const ELECTRON_CHARGE_TO_MASS: f64 = Q/ME;

//Numerical defaults
/// Default number of trajectory samples, both endpoints included.
pub const DEFAULT_NUM_SAMPLES: usize = 1000;
/// Default initial guess for the critical potential difference, in Volts.
pub const DEFAULT_INITIAL_GUESS: f64 = 1E5;
/// Default root-finder iteration budget.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;
/// Default root-finder residual tolerance, relative to the plate gap.
pub const DEFAULT_ROOT_TOLERANCE: f64 = 1E-10;
/// Smallest adaptive step allowed, relative to the transit time.
pub const STEP_UNDERFLOW_FACTOR: f64 = 16.*f64::EPSILON;
/// Relative step of the central-difference derivative in the Newton rootfinder.
pub const NEWTON_DIFFERENCE_STEP: f64 = 1E-6;
/// Ratio between the secant seed points.
pub const SECANT_SEED_OFFSET: f64 = 1E-4;

/// Transverse position and velocity of a particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct State {
    pub y: f64,
    pub vy: f64,
}

impl State {
    pub fn new(y: f64, vy: f64) -> State {
        State {
            y,
            vy
        }
    }

    /// Particle at rest on the capacitor axis.
    pub fn origin() -> State {
        State::new(0., 0.)
    }

    pub fn is_finite(&self) -> bool {
        self.y.is_finite() & self.vy.is_finite()
    }

    /// Returns self + h*other without mutating either state.
    pub fn axpy(&self, h: f64, other: &State) -> State {
        State::new(self.y + h*other.y, self.vy + h*other.vy)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "y = {} m, vy = {} m/s", self.y, self.vy)
    }
}
