use std::time::Instant;

use crate::simulation::forces::mechanical_energy;
use crate::simulation::integrator::step_state;
use crate::simulation::params::{Mode, Parameters};
use crate::simulation::states::{NVec2, PhysicalState};

/// Starting state used by both benchmarks for a given mode
fn make_state(mode: Mode) -> PhysicalState {
    match mode {
        Mode::OneD => PhysicalState::at_rest(NVec2::new(1.2, 0.0)),
        Mode::Vector => PhysicalState::at_rest(NVec2::new(0.3, 1.8)),
    }
}

/// Time single RK4 steps for both dynamics models
pub fn bench_step() {
    let steps = 1_000_000;

    for mode in [Mode::OneD, Mode::Vector] {
        let params = Parameters::new(1.0, 10.0, 0.5, mode);
        let mut state = make_state(mode);

        // Warm up
        for _ in 0..1000 {
            step_state(&mut state, &params, 1.0 / 120.0);
        }

        let t0 = Instant::now();
        for _ in 0..steps {
            step_state(&mut state, &params, 1.0 / 120.0);
        }
        let ns_per_step = t0.elapsed().as_secs_f64() * 1e9 / steps as f64;

        println!("mode = {:6}, {:8.2} ns/step, final x = ({:.6}, {:.6})", format!("{:?}", mode), ns_per_step, state.x.x, state.x.y);
    }
}

/// Relative energy drift of the undamped system after 1000 steps for a range of dt
/// Paste output directly into a spreadsheet to graph
pub fn bench_energy_drift() {
    println!("dt,drift_1d,drift_vector");

    for divisor in [30.0, 60.0, 120.0, 240.0, 480.0, 960.0] {
        let dt = 1.0 / divisor;
        let mut drifts = [0.0; 2];

        for (i, mode) in [Mode::OneD, Mode::Vector].into_iter().enumerate() {
            let params = Parameters::new(1.0, 10.0, 0.0, mode);
            let mut state = make_state(mode);
            let e0 = mechanical_energy(&params, &state);

            for _ in 0..1000 {
                step_state(&mut state, &params, dt);
            }

            drifts[i] = ((mechanical_energy(&params, &state) - e0) / e0).abs();
        }

        println!("{:.6},{:.3e},{:.3e}", dt, drifts[0], drifts[1]);
    }
}
