use super::*;

//Dormand-Prince 5(4) tableau. The system is autonomous, so the nodes c_i are not needed.
const A21: f64 = 1./5.;
const A31: f64 = 3./40.;
const A32: f64 = 9./40.;
const A41: f64 = 44./45.;
const A42: f64 = -56./15.;
const A43: f64 = 32./9.;
const A51: f64 = 19372./6561.;
const A52: f64 = -25360./2187.;
const A53: f64 = 64448./6561.;
const A54: f64 = -212./729.;
const A61: f64 = 9017./3168.;
const A62: f64 = -355./33.;
const A63: f64 = 46732./5247.;
const A64: f64 = 49./176.;
const A65: f64 = -5103./18656.;
const B1: f64 = 35./384.;
const B3: f64 = 500./1113.;
const B4: f64 = 125./192.;
const B5: f64 = -2187./6784.;
const B6: f64 = 11./84.;
//Difference between the 5th and embedded 4th order weights
const E1: f64 = 71./57600.;
const E3: f64 = -71./16695.;
const E4: f64 = 71./1920.;
const E5: f64 = -17253./339200.;
const E6: f64 = 22./525.;
const E7: f64 = -1./40.;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.;

/// Equally spaced sample times on [0, transit_time], both endpoints included. Fewer than two samples only hold t = 0.
pub fn sample_times(transit_time: f64, num_samples: usize) -> Vec<f64> {
    if num_samples < 2 {
        return vec![0.; num_samples];
    }
    let last = (num_samples - 1) as f64;
    (0..num_samples).map(|index| {
        if index == num_samples - 1 {
            transit_time
        } else {
            transit_time*(index as f64)/last
        }
    }).collect()
}

/// Integrates dy/dt = vy, dvy/dt = q*E(y)/m from `initial` over the transit window.
///
/// The returned series has `num_samples` rows and carries no accelerations yet; see
/// [`derived::attach_accelerations`]. Samples with |y| > gap are flagged, not clipped.
pub fn integrate(field: &FieldModel, particle: &ParticleConstants, initial: State, transit_time: f64,
    num_samples: usize, integrator: Integrator) -> Result<TrajectorySeries, SimulationError> {

    if num_samples < 2 {
        return Err(SimulationError::InvalidInput(format!("num_samples = {}; at least 2 samples are required", num_samples)));
    }
    if !(transit_time > 0.) || !transit_time.is_finite() {
        return Err(SimulationError::InvalidGeometry(format!("transit time {} s must be positive and finite", transit_time)));
    }
    if !initial.is_finite() {
        return Err(SimulationError::IntegrationDiverged{last_valid_sample: 0, time: 0., cause: DivergenceCause::NON_FINITE});
    }

    let times = sample_times(transit_time, num_samples);

    let rhs = |state: &State| -> State {
        State::new(state.vy, field.acceleration(state.y, particle))
    };

    let states = match integrator {
        Integrator::RK4{substeps} => {
            if substeps == 0 {
                return Err(SimulationError::InvalidInput("RK4 requires at least one substep per sample".to_string()));
            }
            integrate_rk4(&rhs, initial, &times, substeps)?
        },
        Integrator::DORMAND_PRINCE{rtol, atol, max_steps} => {
            if !(rtol > 0.) || !(atol > 0.) {
                return Err(SimulationError::InvalidInput(format!("Dormand-Prince tolerances rtol = {}, atol = {} must be positive", rtol, atol)));
            }
            let scale = State::new(field.gap, field.gap/transit_time);
            integrate_dormand_prince(&rhs, initial, &times, rtol, atol, scale, max_steps)?
        },
    };

    Ok(TrajectorySeries::from_states(&times, &states, field.gap))
}

fn rk4_step<F: Fn(&State) -> State>(rhs: &F, state: &State, h: f64) -> State {
    let k1 = rhs(state);
    let k2 = rhs(&state.axpy(0.5*h, &k1));
    let k3 = rhs(&state.axpy(0.5*h, &k2));
    let k4 = rhs(&state.axpy(h, &k3));

    State::new(
        state.y + h/6.*(k1.y + 2.*k2.y + 2.*k3.y + k4.y),
        state.vy + h/6.*(k1.vy + 2.*k2.vy + 2.*k3.vy + k4.vy),
    )
}

fn integrate_rk4<F: Fn(&State) -> State>(rhs: &F, initial: State, times: &[f64], substeps: usize) -> Result<Vec<State>, SimulationError> {
    let mut states = Vec::with_capacity(times.len());
    states.push(initial);

    let mut state = initial;
    for (index, window) in times.windows(2).enumerate() {
        let h = (window[1] - window[0])/(substeps as f64);
        for _ in 0..substeps {
            state = rk4_step(rhs, &state, h);
            if !state.is_finite() {
                return Err(SimulationError::IntegrationDiverged{last_valid_sample: index, time: window[0], cause: DivergenceCause::NON_FINITE});
            }
        }
        states.push(state);
    }
    Ok(states)
}

/// One Dormand-Prince step. Returns the 5th order solution, its derivative (FSAL) and the error estimate.
fn dormand_prince_step<F: Fn(&State) -> State>(rhs: &F, state: &State, k1: &State, h: f64) -> (State, State, State) {
    let k2 = rhs(&state.axpy(h*A21, k1));
    let k3 = rhs(&State::new(
        state.y + h*(A31*k1.y + A32*k2.y),
        state.vy + h*(A31*k1.vy + A32*k2.vy)));
    let k4 = rhs(&State::new(
        state.y + h*(A41*k1.y + A42*k2.y + A43*k3.y),
        state.vy + h*(A41*k1.vy + A42*k2.vy + A43*k3.vy)));
    let k5 = rhs(&State::new(
        state.y + h*(A51*k1.y + A52*k2.y + A53*k3.y + A54*k4.y),
        state.vy + h*(A51*k1.vy + A52*k2.vy + A53*k3.vy + A54*k4.vy)));
    let k6 = rhs(&State::new(
        state.y + h*(A61*k1.y + A62*k2.y + A63*k3.y + A64*k4.y + A65*k5.y),
        state.vy + h*(A61*k1.vy + A62*k2.vy + A63*k3.vy + A64*k4.vy + A65*k5.vy)));

    let next = State::new(
        state.y + h*(B1*k1.y + B3*k3.y + B4*k4.y + B5*k5.y + B6*k6.y),
        state.vy + h*(B1*k1.vy + B3*k3.vy + B4*k4.vy + B5*k5.vy + B6*k6.vy));
    let k7 = rhs(&next);

    let error = State::new(
        h*(E1*k1.y + E3*k3.y + E4*k4.y + E5*k5.y + E6*k6.y + E7*k7.y),
        h*(E1*k1.vy + E3*k3.vy + E4*k4.vy + E5*k5.vy + E6*k6.vy + E7*k7.vy));

    (next, k7, error)
}

/// RMS of the componentwise error relative to atol*scale + rtol*max(|y_n|, |y_n+1|).
fn error_norm(error: &State, state: &State, next: &State, rtol: f64, atol: f64, scale: &State) -> f64 {
    let sy = atol*scale.y + rtol*state.y.abs().max(next.y.abs());
    let svy = atol*scale.vy + rtol*state.vy.abs().max(next.vy.abs());
    (((error.y/sy).powi(2) + (error.vy/svy).powi(2))/2.).sqrt()
}

fn integrate_dormand_prince<F: Fn(&State) -> State>(rhs: &F, initial: State, times: &[f64], rtol: f64, atol: f64,
    scale: State, max_steps: usize) -> Result<Vec<State>, SimulationError> {

    let transit_time = times[times.len() - 1];
    let min_step = STEP_UNDERFLOW_FACTOR*transit_time;

    let mut states = Vec::with_capacity(times.len());
    states.push(initial);

    let mut state = initial;
    let mut k1 = rhs(&state);
    let mut h = times[1] - times[0];
    let mut num_steps: usize = 0;
    let mut num_rejected: usize = 0;

    for (index, window) in times.windows(2).enumerate() {
        let mut t = window[0];
        let t_end = window[1];

        let diverged = |t: f64, cause: DivergenceCause| {
            SimulationError::IntegrationDiverged{last_valid_sample: index, time: t, cause}
        };

        while t < t_end {
            if num_steps >= max_steps {
                return Err(diverged(window[0], DivergenceCause::STEP_BUDGET));
            }
            if h < min_step {
                return Err(diverged(window[0], DivergenceCause::STEP_UNDERFLOW));
            }

            //Land exactly on the next sample time without discarding the proposed step size
            let last_step = t + h >= t_end;
            let h_step = if last_step {t_end - t} else {h};

            let (next, k_next, error) = dormand_prince_step(rhs, &state, &k1, h_step);
            num_steps += 1;

            if !next.is_finite() | !error.is_finite() {
                return Err(diverged(window[0], DivergenceCause::NON_FINITE));
            }

            let err = error_norm(&error, &state, &next, rtol, atol, &scale);
            let factor = if err == 0. {
                MAX_FACTOR
            } else {
                (SAFETY*err.powf(-0.2)).clamp(MIN_FACTOR, MAX_FACTOR)
            };

            if err <= 1. {
                t = if last_step {t_end} else {t + h_step};
                state = next;
                k1 = k_next;
                if !last_step {
                    h = h_step*factor;
                } else if factor < 1. {
                    h = h.min(h_step*factor);
                }
            } else {
                num_rejected += 1;
                h = h_step*factor.min(1.);
            }
        }
        states.push(state);
    }

    debug!("Dormand-Prince: {} steps ({} rejected) over {} samples.", num_steps, num_rejected, times.len());
    Ok(states)
}
