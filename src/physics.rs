use super::*;

/// Default adaptive integrator: Dormand-Prince 5(4), rtol = 1e-10, atol = 1e-12.
pub fn default_integrator() -> Integrator {
    Integrator::DORMAND_PRINCE{rtol: 1E-10, atol: 1E-12, max_steps: 1_000_000}
}

pub fn default_root_finder() -> Rootfinder {
    Rootfinder::SECANT{max_iterations: DEFAULT_MAX_ITERATIONS, tolerance: DEFAULT_ROOT_TOLERANCE}
}

/// Numerical settings shared by the root-finder and the integrator.
#[derive(Clone, Copy, Debug)]
pub struct NumericalOptions {
    pub num_samples: usize,
    pub integrator: Integrator,
    pub root_finder: Rootfinder,
    pub critical_criterion: CriticalCriterion,
    pub initial_guess: f64,
}

impl Default for NumericalOptions {
    fn default() -> NumericalOptions {
        NumericalOptions {
            num_samples: DEFAULT_NUM_SAMPLES,
            integrator: default_integrator(),
            root_finder: default_root_finder(),
            critical_criterion: CriticalCriterion::UNIFORM_APPROXIMATION,
            initial_guess: DEFAULT_INITIAL_GUESS,
        }
    }
}

/// Everything a single run needs. Immutable once built.
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    pub capacitor: Capacitor,
    pub kinematics: Kinematics,
    pub particle: ParticleConstants,
    pub shape: FieldShape,
    pub orientation: FieldOrientation,
    pub field_scale: FieldScale,
    pub numerics: NumericalOptions,
}

impl SimulationConfig {
    /// Electron, linear field oriented toward +y, critical field scale, default numerics.
    pub fn new(capacitor: Capacitor, velocity: f64) -> SimulationConfig {
        SimulationConfig {
            capacitor,
            kinematics: Kinematics::new(velocity, capacitor.length),
            particle: ParticleConstants::electron(),
            shape: FieldShape::LINEAR,
            orientation: FieldOrientation::POSITIVE,
            field_scale: FieldScale::CRITICAL,
            numerics: NumericalOptions::default(),
        }
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        self.capacitor.validate()?;
        self.kinematics.validate()?;
        self.particle.validate()?;

        if self.kinematics.length != self.capacitor.length {
            return Err(SimulationError::InvalidGeometry(format!("transit length {} m does not match capacitor length {} m",
                self.kinematics.length, self.capacitor.length)));
        }
        if self.numerics.num_samples < 2 {
            return Err(SimulationError::InvalidInput(format!("num_samples = {}; at least 2 samples are required", self.numerics.num_samples)));
        }
        if let FieldScale::FIXED(field_scale) = self.field_scale {
            if !field_scale.is_finite() {
                return Err(SimulationError::InvalidInput(format!("field scale {} V/m must be finite", field_scale)));
            }
        }
        Ok(())
    }
}

/// Output of one run: the solved critical field (if requested), the bound field model and the trajectory.
#[derive(Clone, Debug)]
pub struct Simulation {
    pub config: SimulationConfig,
    pub critical_field: Option<CriticalField>,
    pub field: FieldModel,
    pub trajectory: TrajectorySeries,
}

impl Simulation {
    pub fn exit_state(&self) -> Option<derived::ExitState> {
        derived::exit_state(&self.trajectory, &self.config.kinematics)
    }

    pub fn axial_positions(&self) -> Vec<f64> {
        derived::axial_positions(&self.trajectory, &self.config.kinematics)
    }
}

/// Solves for (or takes) the field scale, integrates the transverse motion and derives accelerations.
pub fn simulate(config: &SimulationConfig) -> Result<Simulation, SimulationError> {
    config.validate()?;

    let gap = config.capacitor.gap();

    let (critical_field, field_scale) = match config.field_scale {
        FieldScale::CRITICAL => {
            let critical_field = CriticalFieldSolver::from_config(config).solve()?;
            (Some(critical_field), critical_field.field_scale)
        },
        FieldScale::FIXED(field_scale) => (None, field_scale),
    };

    let field = FieldModel::new(config.shape, config.orientation, field_scale, gap);

    let series = integrator::integrate(&field, &config.particle, State::origin(),
        config.kinematics.transit_time(), config.numerics.num_samples, config.numerics.integrator)?;
    let trajectory = derived::attach_accelerations(series, &field, &config.particle)?;

    if let TransitOutcome::STRUCK_PLATE{sample_index, time} = trajectory.outcome() {
        warn!("Particle left the {} m gap at sample {} (t = {} s) before transit completed.", gap, sample_index, time);
    }

    Ok(Simulation {
        config: config.clone(),
        critical_field,
        field,
        trajectory,
    })
}

/// Runs independent simulations, in parallel when `num_threads > 1`. Results keep the order of `configs`.
pub fn sweep(configs: &[SimulationConfig], num_threads: usize) -> Vec<Result<Simulation, SimulationError>> {

    info!("Processing {} capacitor configurations...", configs.len());

    //Create and configure progress bar
    let bar: ProgressBar = ProgressBar::new(configs.len() as u64);
    bar.set_style(ProgressStyle::default_bar()
        .template("[{elapsed_precise}][{bar:40.cyan/blue}][{eta_precise}] {percent}%")
        .progress_chars("#>-"));

    let run = |config: &SimulationConfig| {
        let result = simulate(config);
        bar.inc(1);
        result
    };

    let results: Vec<Result<Simulation, SimulationError>> = if num_threads > 1 {
        match rayon::ThreadPoolBuilder::new().num_threads(num_threads).build() {
            Ok(pool) => pool.install(|| configs.par_iter().map(run).collect()),
            Err(error) => {
                warn!("Could not build a pool of {} threads ({}); running serially.", num_threads, error);
                configs.iter().map(run).collect()
            },
        }
    } else {
        configs.iter().map(run).collect()
    };

    bar.finish();
    results
}
