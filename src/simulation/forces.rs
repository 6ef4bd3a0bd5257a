//! Acceleration laws for the spring-mass engine
//!
//! Defines the [`Acceleration`] trait and its two implementations:
//! an axial spring for 1D mode and a radial spring hanging from a
//! pivot at the origin for VECTOR mode

use crate::simulation::params::{Mode, Parameters, G, L0, RADIUS_EPS};
use crate::simulation::states::{NVec2, PhysicalState};

/// Acceleration as a function of position and velocity
/// Implementations are pure: same inputs, same output
pub trait Acceleration {
    fn acceleration(&self, x: &NVec2, v: &NVec2) -> NVec2;
}

/// 1D vertical spring, gravity along +x
/// a = (-k (x - L0) - c v + m g) / m
pub struct AxialSpring {
    pub m: f64,
    pub k: f64,
    pub c: f64,
}

impl Acceleration for AxialSpring {
    fn acceleration(&self, x: &NVec2, v: &NVec2) -> NVec2 {
        let a = (-self.k * (x.x - L0) - self.c * v.x + self.m * G) / self.m;
        // y carries no dynamics in 1D
        NVec2::new(a, 0.0)
    }
}

/// Planar spring anchored at the origin
/// Spring and damping act along the radial unit vector only,
/// gravity is a constant +y term regardless of orientation
pub struct RadialSpring {
    pub m: f64,
    pub k: f64,
    pub c: f64,
}

impl Acceleration for RadialSpring {
    fn acceleration(&self, x: &NVec2, v: &NVec2) -> NVec2 {
        let (r, u) = radial(x);

        let f_spring = -self.k * (r - L0);
        let v_radial = v.dot(&u);
        let f_damp = -self.c * v_radial;

        let mut f = (f_spring + f_damp) * u;
        f.y += self.m * G;

        f / self.m
    }
}

/// Radius and unit radial vector, `(0, 1)` when `r < RADIUS_EPS`
pub fn radial(x: &NVec2) -> (f64, NVec2) {
    let r = x.x.hypot(x.y);
    if r < RADIUS_EPS {
        (r, NVec2::new(0.0, 1.0))
    } else {
        (r, *x / r)
    }
}

/// Box the acceleration law for the parameters' mode
pub fn law_for(params: &Parameters) -> Box<dyn Acceleration + Send + Sync> {
    match params.mode {
        Mode::OneD => Box::new(AxialSpring { m: params.m, k: params.k, c: params.c }),
        Mode::Vector => Box::new(RadialSpring { m: params.m, k: params.k, c: params.c }),
    }
}

/// Kinetic + spring + gravitational energy
/// Gravity points along +x in 1D and +y in VECTOR mode
pub fn mechanical_energy(params: &Parameters, state: &PhysicalState) -> f64 {
    let kinetic = 0.5 * params.m * state.v.norm_squared();
    match params.mode {
        Mode::OneD => {
            let stretch = state.x.x - L0;
            kinetic + 0.5 * params.k * stretch * stretch - params.m * G * state.x.x
        }
        Mode::Vector => {
            let stretch = state.x.norm() - L0;
            kinetic + 0.5 * params.k * stretch * stretch - params.m * G * state.x.y
        }
    }
}
