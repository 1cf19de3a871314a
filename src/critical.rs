use super::*;

/// Solution of the critical-field problem.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CriticalField {
    /// Potential difference U* = E_scale*g, in Volts.
    pub voltage: f64,
    /// Minimum field scale U*/g, in V/m.
    pub field_scale: f64,
    pub iterations: usize,
    /// Final boundary-condition residual, in meters.
    pub residual: f64,
}

impl fmt::Display for CriticalField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "U* = {} V, E_scale = {} V/m ({} iterations, residual {:.3e} m)",
            self.voltage, self.field_scale, self.iterations, self.residual)
    }
}

/// Result of a scalar root-finder: root, iterations used and residual at the root.
#[derive(Clone, Copy, Debug)]
pub struct Root {
    pub x: f64,
    pub iterations: usize,
    pub residual: f64,
}

/// Finds the smallest field scale for which a particle released on the axis just reaches the plate gap at exit.
#[derive(Clone, Debug)]
pub struct CriticalFieldSolver {
    pub capacitor: Capacitor,
    pub kinematics: Kinematics,
    pub particle: ParticleConstants,
    pub criterion: CriticalCriterion,
    pub root_finder: Rootfinder,
    pub initial_guess: f64,
    pub shape: FieldShape,
    pub orientation: FieldOrientation,
    pub num_samples: usize,
    pub integrator: Integrator,
}

impl CriticalFieldSolver {
    pub fn from_config(config: &SimulationConfig) -> CriticalFieldSolver {
        CriticalFieldSolver {
            capacitor: config.capacitor,
            kinematics: config.kinematics,
            particle: config.particle,
            criterion: config.numerics.critical_criterion,
            root_finder: config.numerics.root_finder,
            initial_guess: config.numerics.initial_guess,
            shape: config.shape,
            orientation: config.orientation,
            num_samples: config.numerics.num_samples,
            integrator: config.numerics.integrator,
        }
    }

    /// Closed-form uniform-field voltage, U* = 2*g^2*m/(q*T^2).
    pub fn closed_form_voltage(&self) -> f64 {
        let g = self.capacitor.gap();
        let t = self.kinematics.transit_time();
        2.*g*g*self.particle.m/(self.particle.q*t*t)
    }

    /// h(U) = 1/2*(q*U/(g*m))*T^2 - g
    pub fn uniform_residual(&self, voltage: f64) -> f64 {
        let g = self.capacitor.gap();
        let t = self.kinematics.transit_time();
        let ay = self.particle.q*voltage/(g*self.particle.m);
        0.5*ay*t*t - g
    }

    /// h(U) = |y(T)| - g with y integrated through the configured field model at E_scale = U/g.
    pub fn trajectory_residual(&self, voltage: f64) -> Result<f64, SimulationError> {
        let g = self.capacitor.gap();
        let field = FieldModel::new(self.shape, self.orientation, voltage/g, g);
        let series = integrator::integrate(&field, &self.particle, State::origin(),
            self.kinematics.transit_time(), self.num_samples, self.integrator)?;

        match series.last() {
            Some(last) => Ok(last.y.abs() - g),
            None => Err(SimulationError::InvalidInput("empty trajectory".to_string())),
        }
    }

    pub fn residual(&self, voltage: f64) -> Result<f64, SimulationError> {
        match self.criterion {
            CriticalCriterion::UNIFORM_APPROXIMATION => Ok(self.uniform_residual(voltage)),
            CriticalCriterion::FULL_TRAJECTORY => self.trajectory_residual(voltage),
        }
    }

    pub fn solve(&self) -> Result<CriticalField, SimulationError> {
        self.capacitor.validate()?;
        self.kinematics.validate()?;
        self.particle.validate()?;
        if self.kinematics.length != self.capacitor.length {
            return Err(SimulationError::InvalidGeometry(format!("transit length {} m does not match capacitor length {} m",
                self.kinematics.length, self.capacitor.length)));
        }

        let g = self.capacitor.gap();

        //The trajectory criterion is seeded from the uniform-field answer; its residual oscillates far from the root
        let initial_guess = match self.criterion {
            CriticalCriterion::UNIFORM_APPROXIMATION => self.initial_guess,
            CriticalCriterion::FULL_TRAJECTORY => self.closed_form_voltage(),
        };

        let root = match self.root_finder {
            Rootfinder::ANALYTIC => {
                if self.criterion != CriticalCriterion::UNIFORM_APPROXIMATION {
                    return Err(SimulationError::InvalidInput(format!("cannot use {} with {}. Try switching to a different rootfinder.",
                        self.root_finder, self.criterion)));
                }
                let voltage = self.closed_form_voltage();
                Root {x: voltage, iterations: 0, residual: self.uniform_residual(voltage)}
            },
            Rootfinder::SECANT{max_iterations, tolerance} => {
                secant_rootfinder(|voltage| self.residual(voltage), initial_guess, max_iterations, tolerance*g)?
            },
            Rootfinder::NEWTON{max_iterations, tolerance} => {
                newton_rootfinder(|voltage| self.residual(voltage), initial_guess, max_iterations, tolerance*g)?
            },
        };

        let critical_field = CriticalField {
            voltage: root.x,
            field_scale: root.x/g,
            iterations: root.iterations,
            residual: root.residual,
        };
        debug!("{}: {}", self.root_finder, critical_field);
        Ok(critical_field)
    }
}

/// Secant iteration from `x0` and a nearby second point until |f(x)| <= tolerance.
pub fn secant_rootfinder<F>(mut f: F, x0: f64, max_iterations: usize, tolerance: f64) -> Result<Root, SimulationError>
where F: FnMut(f64) -> Result<f64, SimulationError> {

    if !tolerance.is_finite() {
        return Err(SimulationError::NoConvergence {iterations: 0, voltage: x0, residual: f64::NAN, tolerance});
    }

    let mut x_prev = x0;
    let mut f_prev = f(x_prev)?;
    if !f_prev.is_finite() {
        return Err(SimulationError::NoConvergence {iterations: 0, voltage: x_prev, residual: f_prev, tolerance});
    }
    if f_prev.abs() <= tolerance {
        return Ok(Root {x: x_prev, iterations: 0, residual: f_prev});
    }

    let mut x = if x0 == 0. {SECANT_SEED_OFFSET} else {x0*(1. + SECANT_SEED_OFFSET)};
    let mut fx = f(x)?;
    let mut iterations: usize = 0;

    for iteration in 0..max_iterations {
        if !fx.is_finite() {
            break;
        }
        if fx.abs() <= tolerance {
            return Ok(Root {x, iterations: iteration, residual: fx});
        }

        let denominator = fx - f_prev;
        let x_next = x - fx*(x - x_prev)/denominator;
        if (denominator == 0.) | !x_next.is_finite() {
            break;
        }

        x_prev = x;
        f_prev = fx;
        x = x_next;
        fx = f(x)?;
        iterations = iteration + 1;
        debug!("Secant iteration {}: x = {}, f(x) = {:e}", iteration, x, fx);
    }

    if fx.is_finite() & (fx.abs() <= tolerance) {
        return Ok(Root {x, iterations, residual: fx});
    }
    Err(SimulationError::NoConvergence {iterations, voltage: x, residual: fx, tolerance})
}

/// Newton-Raphson with a central finite-difference derivative.
pub fn newton_rootfinder<F>(mut f: F, x0: f64, max_iterations: usize, tolerance: f64) -> Result<Root, SimulationError>
where F: FnMut(f64) -> Result<f64, SimulationError> {

    if !tolerance.is_finite() {
        return Err(SimulationError::NoConvergence {iterations: 0, voltage: x0, residual: f64::NAN, tolerance});
    }

    let mut x = x0;
    let mut fx = f(x)?;
    let mut iterations: usize = 0;

    for iteration in 0..max_iterations {
        if !fx.is_finite() {
            break;
        }
        if fx.abs() <= tolerance {
            return Ok(Root {x, iterations: iteration, residual: fx});
        }

        let dx = NEWTON_DIFFERENCE_STEP*x.abs().max(1.);
        let dfx = (f(x + dx)? - f(x - dx)?)/(2.*dx);
        let x_next = x - fx/dfx;
        if (dfx == 0.) | !x_next.is_finite() {
            break;
        }

        x = x_next;
        fx = f(x)?;
        iterations = iteration + 1;
        debug!("Newton iteration {}: x = {}, f(x) = {:e}", iteration, x, fx);
    }

    if fx.is_finite() & (fx.abs() <= tolerance) {
        return Ok(Root {x, iterations, residual: fx});
    }
    Err(SimulationError::NoConvergence {iterations, voltage: x, residual: fx, tolerance})
}
