use super::*;

/// RustDeflect's internal representation of an input file.
#[derive(Deserialize, Clone)]
pub struct Input {
    pub options: Options,
    #[serde(default)]
    pub particle_parameters: ParticleParameters,
    #[serde(default)]
    pub field_parameters: FieldParameters,
    pub capacitors: Vec<CapacitorParameters>,
}

impl Input {
    pub fn new(string: &str) -> Result<Input> {
        toml::from_str(string).context("Could not parse TOML file. Check the [options], [particle_parameters], [field_parameters] and [[capacitors]] tables.")
    }
}

///This helper function is a workaround to issue #368 in serde
fn default_true() -> bool {
    true
}

///This helper function is a workaround to issue #368 in serde
fn one_usize() -> usize {
    1
}

///This helper function is a workaround to issue #368 in serde
fn default_buffer_size() -> usize {
    8192
}

///This helper function is a workaround to issue #368 in serde
fn default_num_samples() -> usize {
    DEFAULT_NUM_SAMPLES
}

///This helper function is a workaround to issue #368 in serde
fn default_initial_guess() -> f64 {
    DEFAULT_INITIAL_GUESS
}

///This helper function is a workaround to issue #368 in serde
fn default_critical_criterion() -> CriticalCriterion {
    CriticalCriterion::UNIFORM_APPROXIMATION
}

///This helper function is a workaround to issue #368 in serde
fn default_shape() -> FieldShape {
    FieldShape::LINEAR
}

///This helper function is a workaround to issue #368 in serde
fn default_orientation() -> FieldOrientation {
    FieldOrientation::POSITIVE
}

fn default_length_unit() -> String {
    "M".to_string()
}

fn default_mass_unit() -> String {
    "ME".to_string()
}

fn default_charge_unit() -> String {
    "E".to_string()
}

fn one_f64() -> f64 {
    1.
}

/// RustDeflect's internal representation of the simulation-level options.
#[derive(Deserialize, Clone)]
pub struct Options {
    pub name: String,
    #[serde(default = "default_num_samples")]
    pub num_samples: usize,
    #[serde(default = "one_usize")]
    pub num_threads: usize,
    #[serde(default = "default_buffer_size")]
    pub write_buffer_size: usize,
    #[serde(default = "default_true")]
    pub write_trajectories: bool,
    #[serde(default = "physics::default_root_finder")]
    pub root_finder: Rootfinder,
    #[serde(default = "physics::default_integrator")]
    pub integrator: Integrator,
    #[serde(default = "default_critical_criterion")]
    pub critical_criterion: CriticalCriterion,
    #[serde(default = "default_initial_guess")]
    pub initial_guess: f64,
}

impl Options {
    pub fn numerics(&self) -> NumericalOptions {
        NumericalOptions {
            num_samples: self.num_samples,
            integrator: self.integrator,
            root_finder: self.root_finder,
            critical_criterion: self.critical_criterion,
            initial_guess: self.initial_guess,
        }
    }
}

/// Charge magnitude and mass of the simulated particle. Defaults to an electron.
#[derive(Deserialize, Clone)]
pub struct ParticleParameters {
    #[serde(default = "default_mass_unit")]
    pub mass_unit: String,
    #[serde(default = "default_charge_unit")]
    pub charge_unit: String,
    #[serde(default = "one_f64")]
    pub m: f64,
    #[serde(default = "one_f64")]
    pub q: f64,
}

impl Default for ParticleParameters {
    fn default() -> ParticleParameters {
        ParticleParameters {
            mass_unit: default_mass_unit(),
            charge_unit: default_charge_unit(),
            m: 1.,
            q: 1.,
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct FieldParameters {
    #[serde(default = "default_shape")]
    pub shape: FieldShape,
    #[serde(default = "default_orientation")]
    pub orientation: FieldOrientation,
    /// Field scale in V/m applied to every capacitor; absent means solve for the critical field.
    pub field_scale: Option<f64>,
}

impl Default for FieldParameters {
    fn default() -> FieldParameters {
        FieldParameters {
            shape: default_shape(),
            orientation: default_orientation(),
            field_scale: None,
        }
    }
}

/// One capacitor run. Lengths are in `length_unit`, velocity in m/s.
#[derive(Deserialize, Clone)]
pub struct CapacitorParameters {
    #[serde(default = "default_length_unit")]
    pub length_unit: String,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub length: f64,
    pub velocity: f64,
    /// Overrides `field_parameters.field_scale` for this run.
    pub field_scale: Option<f64>,
}

fn parse_unit(unit: &str, named: &[(&str, f64)], kind: &str) -> Result<f64> {
    match named.iter().find(|(name, _)| *name == unit) {
        Some((_, value)) => Ok(*value),
        None => unit.parse::<f64>().with_context(|| format!(
            "Input error: could not parse {} unit {}. Use a valid float or one of {}",
            kind, unit, named.iter().map(|(name, _)| *name).join(", "))),
    }
}

pub fn length_unit(unit: &str) -> Result<f64> {
    parse_unit(unit, &[("MICRON", MICRON), ("MM", MM), ("CM", CM), ("M", 1.)], "length")
}

pub fn mass_unit(unit: &str) -> Result<f64> {
    parse_unit(unit, &[("ME", ME), ("MP", MP), ("AMU", AMU), ("KG", 1.)], "mass")
}

pub fn charge_unit(unit: &str) -> Result<f64> {
    parse_unit(unit, &[("E", Q), ("C", 1.)], "charge")
}

impl Input {
    /// Converts the parsed file into one validated configuration per capacitor.
    pub fn configs(&self) -> Result<Vec<SimulationConfig>> {

        //Ensure nonsensical options crash on input
        if self.options.num_threads == 0 {
            return Err(anyhow!("Input error: num_threads must be greater than zero."));
        }
        if self.capacitors.is_empty() {
            return Err(anyhow!("Input error: no [[capacitors]] given."));
        }

        let particle = ParticleConstants::new(
            self.particle_parameters.q*charge_unit(&self.particle_parameters.charge_unit)?,
            self.particle_parameters.m*mass_unit(&self.particle_parameters.mass_unit)?,
        );

        self.capacitors.iter().enumerate().map(|(index, capacitor_parameters)| -> Result<SimulationConfig> {
            let unit = length_unit(&capacitor_parameters.length_unit)?;
            let capacitor = Capacitor {
                inner_radius: capacitor_parameters.inner_radius*unit,
                outer_radius: capacitor_parameters.outer_radius*unit,
                length: capacitor_parameters.length*unit,
            };

            let field_scale = match capacitor_parameters.field_scale.or(self.field_parameters.field_scale) {
                Some(field_scale) => FieldScale::FIXED(field_scale),
                None => FieldScale::CRITICAL,
            };

            let config = SimulationConfig {
                capacitor,
                kinematics: Kinematics::new(capacitor_parameters.velocity, capacitor.length),
                particle,
                shape: self.field_parameters.shape,
                orientation: self.field_parameters.orientation,
                field_scale,
                numerics: self.options.numerics(),
            };
            config.validate().with_context(|| format!("Input error in capacitor {}.", index))?;
            Ok(config)
        }).collect()
    }
}

/// Reads and validates an input file.
pub fn input(input_file: &str) -> Result<(Options, Vec<SimulationConfig>)> {
    let input_toml = std::fs::read_to_string(input_file)
        .with_context(|| format!("Input error: could not open input file {}.", input_file))?;

    let input = Input::new(&input_toml)?;
    let configs = input.configs()?;
    Ok((input.options, configs))
}
