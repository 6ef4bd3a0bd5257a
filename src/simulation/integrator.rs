//! Fixed-step time integrator for the spring-mass system
//!
//! Classical 4th-order Runge-Kutta over `(x, v)`, driven by an
//! [`Acceleration`] law. The same routine serves 1D and VECTOR mode,
//! `step_state` picks the law from `Parameters`

use super::forces::{law_for, Acceleration};
use super::params::{Mode, Parameters};
use super::states::PhysicalState;

/// Advance `state` by one RK4 step of size `dt`
/// Positions, velocities and `state.t` are updated in place
pub fn rk4_step<A: Acceleration + ?Sized>(state: &mut PhysicalState, accel: &A, dt: f64) {
    let half_dt = 0.5 * dt;
    let x = state.x;
    let v = state.v;

    // Stage 1: derivatives at the start of the step
    let k1_x = v;
    let k1_v = accel.acceleration(&x, &v);

    // Stage 2: midpoint using stage 1 slopes
    let k2_x = v + half_dt * k1_v;
    let k2_v = accel.acceleration(&(x + half_dt * k1_x), &k2_x);

    // Stage 3: midpoint using stage 2 slopes
    let k3_x = v + half_dt * k2_v;
    let k3_v = accel.acceleration(&(x + half_dt * k2_x), &k3_x);

    // Stage 4: endpoint using stage 3 slopes
    let k4_x = v + dt * k3_v;
    let k4_v = accel.acceleration(&(x + dt * k3_x), &k4_x);

    // Weighted 1, 2, 2, 1 combination
    state.x += dt / 6.0 * (k1_x + 2.0 * k2_x + 2.0 * k3_x + k4_x);
    state.v += dt / 6.0 * (k1_v + 2.0 * k2_v + 2.0 * k3_v + k4_v);

    state.t += dt;
}

/// One step under the law selected by `params.mode`
pub fn step_state(state: &mut PhysicalState, params: &Parameters, dt: f64) {
    let law = law_for(params);
    rk4_step(state, law.as_ref(), dt);

    if params.mode == Mode::OneD {
        state.x.y = 0.0;
        state.v.y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::params::DT;
    use crate::simulation::states::NVec2;

    #[test]
    fn step_is_deterministic() {
        let p = Parameters::new(1.0, 10.0, 0.5, Mode::Vector);
        let mut a = PhysicalState::new(NVec2::new(0.4, 1.7), NVec2::new(0.2, -0.1));
        let mut b = a;
        for _ in 0..50 {
            step_state(&mut a, &p, DT);
            step_state(&mut b, &p, DT);
        }
        assert_eq!(a, b);
    }

    #[test]
    fn one_d_keeps_y_pinned() {
        let p = Parameters::default();
        let mut s = PhysicalState::new(NVec2::new(1.2, 0.0), NVec2::zeros());
        for _ in 0..10 {
            step_state(&mut s, &p, DT);
        }
        assert_eq!(s.x.y, 0.0);
        assert_eq!(s.v.y, 0.0);
        assert!((s.t - 10.0 * DT).abs() < 1e-12);
    }
}
