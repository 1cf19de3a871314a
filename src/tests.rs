#[cfg(test)]
use super::*;
#[cfg(test)]
use float_cmp::approx_eq;
#[cfg(test)]
use std::f64::consts::PI;

#[cfg(test)]
fn reference_capacitor() -> Capacitor {
    Capacitor::new(7.5E-2, 16E-2, 24E-2).unwrap()
}

#[cfg(test)]
fn reference_config(shape: FieldShape, field_scale: FieldScale) -> SimulationConfig {
    let mut config = SimulationConfig::new(reference_capacitor(), 2E6);
    config.shape = shape;
    config.field_scale = field_scale;
    config
}

#[cfg(test)]
fn relative_error(value: f64, expected: f64) -> f64 {
    ((value - expected)/expected).abs()
}

#[test]
fn test_transit_time_and_gap() {
    let capacitor = reference_capacitor();
    let kinematics = Kinematics::new(2E6, capacitor.length);

    assert!(approx_eq!(f64, capacitor.gap(), 0.085, epsilon = 1E-15));
    assert!(approx_eq!(f64, kinematics.transit_time(), 1.2E-7, epsilon = 1E-20));
}

#[test]
fn test_invalid_geometry() {
    for (r, R, L) in vec![(0.16, 0.075, 0.24), (0.1, 0.1, 0.24), (0., 0.1, 0.24), (0.075, 0.16, 0.), (0.075, 0.16, -1.)] {
        match Capacitor::new(r, R, L) {
            Err(SimulationError::InvalidGeometry(_)) => (),
            other => panic!("r = {} R = {} L = {} should be rejected, got {:?}", r, R, L, other),
        }
    }

    for velocity in vec![0., -2E6, f64::NAN] {
        let config = SimulationConfig::new(reference_capacitor(), velocity);
        assert!(matches!(simulate(&config), Err(SimulationError::InvalidGeometry(_))), "V = {} should be rejected", velocity);
    }
}

#[test]
fn test_secant_matches_closed_form() {
    for (r, R, L, V) in vec![(7.5E-2, 16E-2, 24E-2, 2E6), (1E-2, 2E-2, 1E-1, 1E6), (0.5, 0.51, 3., 5E7), (1E-3, 1., 1E-2, 3E5)] {
        let capacitor = Capacitor::new(r, R, L).unwrap();
        let config = SimulationConfig::new(capacitor, V);
        let solver = CriticalFieldSolver::from_config(&config);

        let expected = solver.closed_form_voltage();
        let critical_field = solver.solve().unwrap();

        assert!(relative_error(critical_field.voltage, expected) < 1E-6,
            "Secant U* = {} V; closed form U* = {} V", critical_field.voltage, expected);
        assert!(approx_eq!(f64, critical_field.field_scale, critical_field.voltage/capacitor.gap(), ulps = 2));
        assert!(critical_field.residual.abs() <= DEFAULT_ROOT_TOLERANCE*capacitor.gap());
    }
}

#[test]
fn test_newton_and_analytic_rootfinders() {
    let mut config = SimulationConfig::new(reference_capacitor(), 2E6);
    let expected = CriticalFieldSolver::from_config(&config).closed_form_voltage();

    config.numerics.root_finder = Rootfinder::NEWTON{max_iterations: 50, tolerance: 1E-12};
    let newton = CriticalFieldSolver::from_config(&config).solve().unwrap();
    assert!(relative_error(newton.voltage, expected) < 1E-6);

    config.numerics.root_finder = Rootfinder::ANALYTIC;
    let analytic = CriticalFieldSolver::from_config(&config).solve().unwrap();
    assert_eq!(analytic.voltage, expected);
    assert_eq!(analytic.iterations, 0);

    //Reference values: U* ~ 5.7 V, E_scale ~ 67 V/m for the 7.5/16/24 cm capacitor at 2e6 m/s
    assert!(analytic.voltage > 5.6 && analytic.voltage < 5.8, "U* = {}", analytic.voltage);
    assert!(analytic.field_scale > 66. && analytic.field_scale < 68., "E_scale = {}", analytic.field_scale);
}

#[test]
fn test_rootfinder_no_convergence() {
    //x^2 + 1 has no real root
    let result = critical::secant_rootfinder(|x| Ok(x*x + 1.), 1E5, 100, 1E-10);
    assert!(matches!(result, Err(SimulationError::NoConvergence{..})));

    let result = critical::newton_rootfinder(|x| Ok(x*x + 1.), 3., 20, 1E-10);
    assert!(matches!(result, Err(SimulationError::NoConvergence{..})));

    //A budget of zero iterations cannot improve on a poor guess
    let mut config = SimulationConfig::new(reference_capacitor(), 2E6);
    config.numerics.root_finder = Rootfinder::SECANT{max_iterations: 0, tolerance: 1E-10};
    match CriticalFieldSolver::from_config(&config).solve() {
        Err(SimulationError::NoConvergence{iterations, ..}) => assert_eq!(iterations, 0),
        other => panic!("Expected NoConvergence, got {:?}", other),
    }
}

#[test]
fn test_analytic_rootfinder_rejects_full_trajectory() {
    let mut config = SimulationConfig::new(reference_capacitor(), 2E6);
    config.numerics.root_finder = Rootfinder::ANALYTIC;
    config.numerics.critical_criterion = CriticalCriterion::FULL_TRAJECTORY;

    assert!(matches!(CriticalFieldSolver::from_config(&config).solve(), Err(SimulationError::InvalidInput(_))));
}

#[test]
fn test_full_trajectory_critical_field() {
    //Linear field: y = g*(1 - cos(wt)) reaches g at wT = pi/2
    let capacitor = reference_capacitor();
    let g = capacitor.gap();

    for orientation in vec![FieldOrientation::POSITIVE, FieldOrientation::NEGATIVE] {
        let mut config = reference_config(FieldShape::LINEAR, FieldScale::CRITICAL);
        config.orientation = orientation;
        config.numerics.critical_criterion = CriticalCriterion::FULL_TRAJECTORY;
        config.numerics.root_finder = Rootfinder::SECANT{max_iterations: 50, tolerance: 1E-8};

        let t = config.kinematics.transit_time();
        let expected = g*PI*PI*ME/(4.*Q*t*t);

        let simulation = simulate(&config).unwrap();
        let critical_field = simulation.critical_field.unwrap();
        assert!(relative_error(critical_field.field_scale, expected) < 1E-6,
            "{}: E_scale = {} V/m; expected {} V/m", orientation, critical_field.field_scale, expected);

        let last = simulation.trajectory.last().unwrap();
        assert!(relative_error(last.y.abs(), g) < 1E-6);
        assert_eq!(last.y.signum(), orientation.sign());
    }

    //Uniform field: both criteria agree
    let mut config = reference_config(FieldShape::UNIFORM, FieldScale::CRITICAL);
    let uniform = CriticalFieldSolver::from_config(&config).solve().unwrap();
    config.numerics.critical_criterion = CriticalCriterion::FULL_TRAJECTORY;
    let full = CriticalFieldSolver::from_config(&config).solve().unwrap();
    assert!(relative_error(full.voltage, uniform.voltage) < 1E-6);
}

#[test]
fn test_zero_field_no_deflection() {
    for integrator in vec![physics::default_integrator(), Integrator::RK4{substeps: 4}] {
        for shape in vec![FieldShape::UNIFORM, FieldShape::LINEAR] {
            let mut config = reference_config(shape, FieldScale::FIXED(0.));
            config.numerics.integrator = integrator;

            let simulation = simulate(&config).unwrap();
            assert_eq!(simulation.trajectory.len(), DEFAULT_NUM_SAMPLES);
            for sample in simulation.trajectory.samples() {
                assert_eq!(sample.y, 0.);
                assert_eq!(sample.vy, 0.);
                assert_eq!(sample.ay, 0.);
            }
            assert_eq!(simulation.trajectory.outcome(), TransitOutcome::EXITED);
        }
    }
}

#[test]
fn test_uniform_field_matches_analytic() {
    let field_scale = 50.;
    for integrator in vec![physics::default_integrator(), Integrator::RK4{substeps: 16}] {
        let mut config = reference_config(FieldShape::UNIFORM, FieldScale::FIXED(field_scale));
        config.numerics.integrator = integrator;

        let simulation = simulate(&config).unwrap();
        let a = Q/ME*field_scale;

        for sample in simulation.trajectory.samples() {
            let y = 0.5*a*sample.t*sample.t;
            let vy = a*sample.t;
            assert!((sample.y - y).abs() <= 1E-6*y.abs() + 1E-15, "{}: y({}) = {}; expected {}", integrator, sample.t, sample.y, y);
            assert!((sample.vy - vy).abs() <= 1E-6*vy.abs() + 1E-9, "{}: vy({}) = {}; expected {}", integrator, sample.t, sample.vy, vy);
            assert!(approx_eq!(f64, sample.ay, a, epsilon = 1E-6*a));
        }
    }
}

#[test]
fn test_linear_field_matches_analytic() {
    let capacitor = reference_capacitor();
    let g = capacitor.gap();
    let field_scale = 67.;
    let omega = (Q*field_scale/(ME*g)).sqrt();

    for integrator in vec![physics::default_integrator(), Integrator::RK4{substeps: 16}] {
        let mut config = reference_config(FieldShape::LINEAR, FieldScale::FIXED(field_scale));
        config.numerics.integrator = integrator;

        let simulation = simulate(&config).unwrap();
        for sample in simulation.trajectory.samples() {
            let y = 2.*g*(0.5*omega*sample.t).sin().powi(2);
            let vy = g*omega*(omega*sample.t).sin();
            assert!((sample.y - y).abs() <= 1E-6*y.abs() + 1E-15*g, "{}: y({}) = {}; expected {}", integrator, sample.t, sample.y, y);
            assert!((sample.vy - vy).abs() <= 1E-6*vy.abs() + 1E-15*g*omega, "{}: vy({}) = {}; expected {}", integrator, sample.t, sample.vy, vy);
        }

        //Linear field decays toward the plate, so the uniform-field critical scale does not reach it
        assert_eq!(simulation.trajectory.outcome(), TransitOutcome::EXITED);
    }
}

#[test]
fn test_sign_reversal_mirrors_trajectory() {
    for shape in vec![FieldShape::UNIFORM, FieldShape::LINEAR] {
        let positive = simulate(&reference_config(shape, FieldScale::FIXED(60.))).unwrap();
        let negative = simulate(&reference_config(shape, FieldScale::FIXED(-60.))).unwrap();

        let mut flipped_config = reference_config(shape, FieldScale::FIXED(60.));
        flipped_config.orientation = FieldOrientation::POSITIVE.flipped();
        let flipped = simulate(&flipped_config).unwrap();

        for ((p, n), f) in positive.trajectory.samples().iter().zip(negative.trajectory.samples()).zip(flipped.trajectory.samples()) {
            assert!(approx_eq!(f64, n.y, -p.y, epsilon = 1E-12*p.y.abs().max(1E-12)), "{}: {} vs {}", shape, n.y, p.y);
            assert!(approx_eq!(f64, n.vy, -p.vy, epsilon = 1E-12*p.vy.abs().max(1E-6)), "{}: {} vs {}", shape, n.vy, p.vy);
            assert!(approx_eq!(f64, f.y, -p.y, epsilon = 1E-12*p.y.abs().max(1E-12)));
            assert!(approx_eq!(f64, f.vy, -p.vy, epsilon = 1E-12*p.vy.abs().max(1E-6)));
        }
    }
}

#[test]
fn test_field_model_conventions() {
    let g = 0.085;
    let positive = FieldModel::new(FieldShape::LINEAR, FieldOrientation::POSITIVE, 10., g);
    let negative = FieldModel::new(FieldShape::LINEAR, FieldOrientation::NEGATIVE, 10., g);

    for y in vec![-0.1, -g, -0.02, 0., 0.03, g, 0.2] {
        assert!(approx_eq!(f64, positive.electric_field(y), 10.*(1. - y/g), epsilon = 1E-12));
        assert!(approx_eq!(f64, negative.electric_field(y), -10.*(1. + y/g), epsilon = 1E-12));
    }

    //Field vanishes at the plate each orientation drives toward
    assert!(approx_eq!(f64, positive.electric_field(g), 0., epsilon = 1E-12));
    assert!(approx_eq!(f64, negative.electric_field(-g), 0., epsilon = 1E-12));

    let uniform = FieldModel::new(FieldShape::UNIFORM, FieldOrientation::NEGATIVE, 10., g);
    assert_eq!(uniform.electric_field(0.05), -10.);
    assert_eq!(uniform.with_field_scale(-3.).electric_field(-0.05), 3.);

    let electron = ParticleConstants::electron();
    assert!(approx_eq!(f64, positive.acceleration(0., &electron), ELECTRON_CHARGE_TO_MASS*10., ulps = 2));
}

#[test]
fn test_exit_displacement_monotonic() {
    //Linear field: y(T) = g*(1 - cos(wT)) grows only while wT < pi, i.e. E_scale below ~331 V/m here
    let mut previous = 0.;
    for field_scale in vec![5., 20., 50., 100., 150.] {
        let simulation = simulate(&reference_config(FieldShape::LINEAR, FieldScale::FIXED(field_scale))).unwrap();
        let exit = simulation.trajectory.last().unwrap().y.abs();
        assert!(exit > previous, "|y(T)| = {} at E_scale = {} is not above {}", exit, field_scale, previous);
        previous = exit;
    }
}

#[test]
fn test_reference_capacitor_grazes_plate() {
    //r = 7.5 cm, R = 16 cm, V = 2e6 m/s, L = 24 cm, T = 1.2e-7 s
    let simulation = simulate(&reference_config(FieldShape::UNIFORM, FieldScale::CRITICAL)).unwrap();
    let g = simulation.config.capacitor.gap();
    let last = simulation.trajectory.last().unwrap();

    assert!(approx_eq!(f64, last.t, 1.2E-7, epsilon = 1E-20));
    assert!(relative_error(last.y, g) < 1E-4, "y(T) = {}; gap = {}", last.y, g);

    let axial_positions = simulation.axial_positions();
    assert!(approx_eq!(f64, axial_positions[axial_positions.len() - 1], 0.24, epsilon = 1E-12));
}

#[test]
fn test_two_samples() {
    for integrator in vec![physics::default_integrator(), Integrator::RK4{substeps: 64}] {
        let mut config = reference_config(FieldShape::UNIFORM, FieldScale::CRITICAL);
        config.numerics.num_samples = 2;
        config.numerics.integrator = integrator;

        let simulation = simulate(&config).unwrap();
        let samples = simulation.trajectory.samples();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].t, 0.);
        assert_eq!(samples[0].y, 0.);
        assert!(relative_error(samples[1].y, simulation.config.capacitor.gap()) < 1E-4);
    }

    let mut config = reference_config(FieldShape::UNIFORM, FieldScale::CRITICAL);
    config.numerics.num_samples = 1;
    assert!(matches!(simulate(&config), Err(SimulationError::InvalidInput(_))));
}

#[test]
fn test_huge_field_is_reported() {
    //Uniform field: finite but far outside the gap
    let simulation = simulate(&reference_config(FieldShape::UNIFORM, FieldScale::FIXED(1E30))).unwrap();
    assert!(matches!(simulation.trajectory.outcome(), TransitOutcome::STRUCK_PLATE{..}));
    assert_eq!(simulation.trajectory.first_violation(), Some(1));
    assert!(matches!(simulation.trajectory.ensure_exited(), Err(SimulationError::BoundaryViolation{sample_index: 1, ..})));
    assert!(simulation.trajectory.samples()[1..].iter().all(|sample| sample.outside_gap));

    //Linear field: the oscillation is unresolvable
    for integrator in vec![physics::default_integrator(), Integrator::RK4{substeps: 16}] {
        let mut config = reference_config(FieldShape::LINEAR, FieldScale::FIXED(1E30));
        config.numerics.integrator = integrator;

        match simulate(&config) {
            Err(SimulationError::IntegrationDiverged{..}) => (),
            Err(SimulationError::BoundaryViolation{..}) => (),
            Ok(simulation) => assert!(simulation.trajectory.first_violation().is_some(), "{}: huge field returned a clean trajectory", integrator),
            Err(error) => panic!("{}: unexpected error {}", integrator, error),
        }
    }

    //Adaptive steps shrink below the resolvable minimum before the first sample
    match simulate(&reference_config(FieldShape::LINEAR, FieldScale::FIXED(1E30))) {
        Err(SimulationError::IntegrationDiverged{last_valid_sample, cause, ..}) => {
            assert_eq!(cause, DivergenceCause::STEP_UNDERFLOW);
            assert_eq!(last_valid_sample, 0);
        },
        other => panic!("Expected STEP_UNDERFLOW, got {:?}", other.map(|simulation| simulation.trajectory.outcome())),
    }
}

#[test]
fn test_dormand_prince_non_finite() {
    //q/m*E overflows to infinity
    match simulate(&reference_config(FieldShape::UNIFORM, FieldScale::FIXED(1E300))) {
        Err(SimulationError::IntegrationDiverged{last_valid_sample, cause, ..}) => {
            assert_eq!(cause, DivergenceCause::NON_FINITE);
            assert_eq!(last_valid_sample, 0);
        },
        other => panic!("Expected NON_FINITE, got {:?}", other.map(|simulation| simulation.trajectory.outcome())),
    }
}

#[test]
fn test_rk4_divergence_reports_sample() {
    let mut config = reference_config(FieldShape::LINEAR, FieldScale::FIXED(1E30));
    config.numerics.integrator = Integrator::RK4{substeps: 16};

    match simulate(&config) {
        Err(SimulationError::IntegrationDiverged{last_valid_sample, cause, ..}) => {
            assert_eq!(cause, DivergenceCause::NON_FINITE);
            assert!(last_valid_sample < DEFAULT_NUM_SAMPLES);
        },
        other => panic!("Expected IntegrationDiverged, got {:?}", other.map(|simulation| simulation.trajectory.outcome())),
    }
}

#[test]
fn test_step_budget() {
    let mut config = reference_config(FieldShape::LINEAR, FieldScale::FIXED(67.));
    config.numerics.integrator = Integrator::DORMAND_PRINCE{rtol: 1E-10, atol: 1E-12, max_steps: 10};

    assert!(matches!(simulate(&config), Err(SimulationError::IntegrationDiverged{cause: DivergenceCause::STEP_BUDGET, ..})));
}

#[test]
fn test_boundary_violation_is_sticky() {
    let times = vec![0., 1., 2., 3.];
    let states = vec![State::new(0., 0.), State::new(1.5, 0.), State::new(0.5, 0.), State::new(0.2, 0.)];
    let series = TrajectorySeries::from_states(&times, &states, 1.);

    assert_eq!(series.first_violation(), Some(1));
    assert_eq!(series.outcome(), TransitOutcome::STRUCK_PLATE{sample_index: 1, time: 1.});
    let flags: Vec<bool> = series.samples().iter().map(|sample| sample.outside_gap).collect();
    assert_eq!(flags, vec![false, true, true, true]);

    //Exactly at the plate is still inside
    let series = TrajectorySeries::from_states(&times[..2], &[State::origin(), State::new(-1., 0.)], 1.);
    assert_eq!(series.outcome(), TransitOutcome::EXITED);
    assert!(series.ensure_exited().is_ok());
}

#[test]
fn test_rk4_agrees_with_dormand_prince() {
    let adaptive = simulate(&reference_config(FieldShape::LINEAR, FieldScale::CRITICAL)).unwrap();

    let mut config = reference_config(FieldShape::LINEAR, FieldScale::CRITICAL);
    config.numerics.integrator = Integrator::RK4{substeps: 8};
    let fixed = simulate(&config).unwrap();

    for (a, f) in adaptive.trajectory.samples().iter().zip(fixed.trajectory.samples()) {
        assert_eq!(a.t, f.t);
        assert!((a.y - f.y).abs() <= 1E-9*adaptive.config.capacitor.gap());
    }
}

#[test]
fn test_derived_quantities() {
    let simulation = simulate(&reference_config(FieldShape::LINEAR, FieldScale::FIXED(40.))).unwrap();
    let particle = ParticleConstants::electron();

    for sample in simulation.trajectory.samples() {
        assert_eq!(sample.ay, simulation.field.acceleration(sample.y, &particle));
    }

    let exit_state = simulation.exit_state().unwrap();
    let last = simulation.trajectory.last().unwrap();
    assert_eq!(exit_state.y, last.y);
    assert!(approx_eq!(f64, exit_state.deflection_angle, (last.vy/2E6).atan(), epsilon = 1E-15));
    assert!(approx_eq!(f64, exit_state.peak_displacement, last.y, ulps = 2));
    assert_eq!(exit_state.outcome, TransitOutcome::EXITED);

    //Non-finite field evaluations are rejected
    let times = vec![0., 1.];
    let states = vec![State::origin(), State::new(1E300, 0.)];
    let series = TrajectorySeries::from_states(&times, &states, 1E301);
    let field = FieldModel::new(FieldShape::LINEAR, FieldOrientation::POSITIVE, 1E300, 1E-300);
    assert!(matches!(derived::accelerations(&series, &field, &particle), Err(SimulationError::IntegrationDiverged{..})));
}

#[test]
fn test_sample_times() {
    let times = integrator::sample_times(1.2E-7, 1000);
    assert_eq!(times.len(), 1000);
    assert_eq!(times[0], 0.);
    assert_eq!(times[999], 1.2E-7);
    assert!(times.windows(2).all(|window| window[1] > window[0]));

    assert!(integrator::sample_times(1.2E-7, 0).is_empty());
    assert_eq!(integrator::sample_times(1.2E-7, 1), vec![0.]);
}

#[test]
fn test_non_finite_geometry() {
    for (r, R) in vec![(0.075, f64::INFINITY), (f64::INFINITY, f64::INFINITY), (f64::NAN, 0.16), (0.075, f64::NAN)] {
        assert!(matches!(Capacitor::new(r, R, 0.24), Err(SimulationError::InvalidGeometry(_))), "r = {} R = {} should be rejected", r, R);
    }

    let capacitor = Capacitor {inner_radius: 0.075, outer_radius: f64::INFINITY, length: 0.24};
    let config = SimulationConfig::new(capacitor, 2E6);
    assert!(matches!(simulate(&config), Err(SimulationError::InvalidGeometry(_))));
    assert!(matches!(CriticalFieldSolver::from_config(&config).solve(), Err(SimulationError::InvalidGeometry(_))));

    //An infinite tolerance or residual never counts as converged
    let result = critical::secant_rootfinder(|x| Ok(x - 1.), 1E5, 100, f64::INFINITY);
    assert!(matches!(result, Err(SimulationError::NoConvergence{..})));
    let result = critical::newton_rootfinder(|x| Ok(x - 1.), 1E5, 100, f64::INFINITY);
    assert!(matches!(result, Err(SimulationError::NoConvergence{..})));

    let result = critical::secant_rootfinder(|_| Ok(f64::NEG_INFINITY), 1E5, 100, 1E-10);
    assert!(matches!(result, Err(SimulationError::NoConvergence{..})));
    let result = critical::newton_rootfinder(|_| Ok(f64::NAN), 1E5, 100, 1E-10);
    assert!(matches!(result, Err(SimulationError::NoConvergence{..})));
}

#[test]
fn test_transit_length_matches_capacitor() {
    let mut config = SimulationConfig::new(reference_capacitor(), 2E6);
    config.kinematics = Kinematics::new(2E6, 0.5);

    assert!(matches!(simulate(&config), Err(SimulationError::InvalidGeometry(_))));
    assert!(matches!(CriticalFieldSolver::from_config(&config).solve(), Err(SimulationError::InvalidGeometry(_))));
}

#[test]
fn test_sweep_preserves_order() {
    let mut configs: Vec<SimulationConfig> = vec![];
    for outer_radius in vec![0.1, 0.16, 0.3] {
        configs.push(SimulationConfig::new(Capacitor {inner_radius: 0.075, outer_radius, length: 0.24}, 2E6));
    }
    //Invalid run in the middle fails alone
    configs.insert(1, SimulationConfig::new(Capacitor {inner_radius: 0.2, outer_radius: 0.1, length: 0.24}, 2E6));

    let serial = sweep(&configs, 1);
    let parallel = sweep(&configs, 2);

    assert_eq!(serial.len(), 4);
    assert!(matches!(parallel[1], Err(SimulationError::InvalidGeometry(_))));

    for (s, p) in serial.iter().zip(parallel.iter()) {
        match (s, p) {
            (Ok(s), Ok(p)) => {
                assert_eq!(s.config.capacitor, p.config.capacitor);
                assert_eq!(s.trajectory.last().unwrap().y, p.trajectory.last().unwrap().y);
            },
            (Err(s), Err(p)) => assert_eq!(s, p),
            _ => panic!("Serial and parallel sweeps disagree."),
        }
    }
}

#[cfg(test)]
const TEST_INPUT: &str = r#"
[options]
name = "test_"
num_samples = 200
root_finder = {NEWTON = {max_iterations = 50, tolerance = 1e-10}}
integrator = {RK4 = {substeps = 8}}

[particle_parameters]
mass_unit = "ME"
m = 1.0

[field_parameters]
shape = "UNIFORM"
orientation = "NEGATIVE"

[[capacitors]]
length_unit = "CM"
inner_radius = 7.5
outer_radius = 16.0
length = 24.0
velocity = 2e6

[[capacitors]]
inner_radius = 0.01
outer_radius = 0.02
length = 0.1
velocity = 1e6
field_scale = 50.0
"#;

#[test]
fn test_input_parsing() {
    let input = Input::new(TEST_INPUT).unwrap();
    assert_eq!(input.options.num_threads, 1);
    assert!(input.options.write_trajectories);
    assert_eq!(input.options.root_finder, Rootfinder::NEWTON{max_iterations: 0, tolerance: 0.});
    assert_eq!(input.options.critical_criterion, CriticalCriterion::UNIFORM_APPROXIMATION);

    let configs = input.configs().unwrap();
    assert_eq!(configs.len(), 2);

    assert!(approx_eq!(f64, configs[0].capacitor.inner_radius, 0.075, epsilon = 1E-15));
    assert!(approx_eq!(f64, configs[0].capacitor.length, 0.24, epsilon = 1E-15));
    assert_eq!(configs[0].field_scale, FieldScale::CRITICAL);
    assert_eq!(configs[0].particle, ParticleConstants::electron());
    assert_eq!(configs[0].shape, FieldShape::UNIFORM);
    assert_eq!(configs[0].orientation, FieldOrientation::NEGATIVE);
    assert_eq!(configs[0].numerics.num_samples, 200);
    assert_eq!(configs[1].field_scale, FieldScale::FIXED(50.));

    let simulation = simulate(&configs[0]).unwrap();
    let last = simulation.trajectory.last().unwrap();
    assert!(relative_error(last.y, -0.085) < 1E-4);
}

#[test]
fn test_input_defaults_and_units() {
    let input = Input::new(r#"
        [options]
        name = "defaults_"

        [[capacitors]]
        inner_radius = 0.075
        outer_radius = 0.16
        length = 0.24
        velocity = 2e6
    "#).unwrap();

    assert_eq!(input.options.num_samples, DEFAULT_NUM_SAMPLES);
    assert_eq!(input.options.root_finder, physics::default_root_finder());
    assert_eq!(input.options.integrator, physics::default_integrator());
    assert_eq!(input.field_parameters.shape, FieldShape::LINEAR);
    assert_eq!(input.options.initial_guess, DEFAULT_INITIAL_GUESS);

    assert_eq!(input::length_unit("MM").unwrap(), MM);
    assert_eq!(input::length_unit("0.5").unwrap(), 0.5);
    assert_eq!(input::mass_unit("AMU").unwrap(), AMU);
    assert_eq!(input::charge_unit("C").unwrap(), 1.);
    assert!(input::length_unit("FURLONG").is_err());
}

#[test]
fn test_input_validation() {
    let bad_samples = TEST_INPUT.replace("num_samples = 200", "num_samples = 1");
    assert!(Input::new(&bad_samples).unwrap().configs().is_err());

    let bad_threads = TEST_INPUT.replace("num_samples = 200", "num_threads = 0");
    assert!(Input::new(&bad_threads).unwrap().configs().is_err());

    let bad_geometry = TEST_INPUT.replace("outer_radius = 16.0", "outer_radius = 5.0");
    assert!(Input::new(&bad_geometry).unwrap().configs().is_err());

    let bad_unit = TEST_INPUT.replace("length_unit = \"CM\"", "length_unit = \"FURLONG\"");
    assert!(Input::new(&bad_unit).unwrap().configs().is_err());

    assert!(Input::new("[options]\nname = 1").is_err());
}
