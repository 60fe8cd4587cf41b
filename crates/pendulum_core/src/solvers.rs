use crate::traits::{constant, DynamicalSystem, Scalar, Steppable};
use crate::vector::{add, scale};

/// Step size, in seconds, used by the demos and the test baselines.
pub const DEFAULT_STEP_SIZE: f64 = 0.005;

/// One classical 4th-order Runge-Kutta step of size `h` under `f`.
///
/// Pure: `y` is not mutated and identical inputs give identical output.
/// There is no error estimate and no step rejection.
///
/// ```
/// use pendulum_core::solvers::rk4_step;
///
/// // dy/dt = -y
/// let y1 = rk4_step(|y: &[f64]| vec![-y[0]], &[1.0], 0.01);
/// assert!((y1[0] - (-0.01_f64).exp()).abs() < 1e-10);
/// ```
pub fn rk4_step<T, F>(f: F, y: &[T], h: T) -> Vec<T>
where
    T: Scalar,
    F: Fn(&[T]) -> Vec<T>,
{
    let half = constant::<T>(0.5);
    let two = constant::<T>(2.0);
    let six = constant::<T>(6.0);

    let k1 = scale(&f(y), h);
    let k2 = scale(&f(&add(&[y, &scale(&k1, half)])), h);
    let k3 = scale(&f(&add(&[y, &scale(&k2, half)])), h);
    let k4 = scale(&f(&add(&[y, &k3])), h);

    let weighted = add(&[&k1, &scale(&k2, two), &scale(&k3, two), &k4]);
    let increment: Vec<T> = weighted.into_iter().map(|k| k / six).collect();
    add(&[y, &increment])
}

/// Classic Runge-Kutta 4th order stepper with preallocated stage buffers.
///
/// Same tableau as [`rk4_step`], but advances the state in place so long
/// runs do not allocate per step.
pub struct RK4<T: Scalar> {
    k1: Vec<T>,
    k2: Vec<T>,
    k3: Vec<T>,
    k4: Vec<T>,
    tmp: Vec<T>,
}

impl<T: Scalar> RK4<T> {
    pub fn new(dim: usize) -> Self {
        let z = T::zero();
        Self {
            k1: vec![z; dim],
            k2: vec![z; dim],
            k3: vec![z; dim],
            k4: vec![z; dim],
            tmp: vec![z; dim],
        }
    }

    pub fn dimension(&self) -> usize {
        self.tmp.len()
    }
}

impl<T: Scalar> Steppable<T> for RK4<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, state: &mut [T], dt: T) {
        assert_eq!(
            state.len(),
            self.dimension(),
            "state length does not match stepper dimension"
        );
        let half = constant::<T>(0.5);
        let two = constant::<T>(2.0);
        let six = constant::<T>(6.0);

        system.apply(state, &mut self.k1);

        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * self.k1[i] * half;
        }
        system.apply(&self.tmp, &mut self.k2);

        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * self.k2[i] * half;
        }
        system.apply(&self.tmp, &mut self.k3);

        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * self.k3[i];
        }
        system.apply(&self.tmp, &mut self.k4);

        for i in 0..state.len() {
            state[i] = state[i]
                + dt * (self.k1[i] + two * self.k2[i] + two * self.k3[i] + self.k4[i]) / six;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{rk4_step, Steppable, DEFAULT_STEP_SIZE, RK4};
    use crate::traits::DynamicalSystem;

    struct Oscillator;

    impl DynamicalSystem<f64> for Oscillator {
        fn dimension(&self) -> usize {
            2
        }

        fn apply(&self, x: &[f64], out: &mut [f64]) {
            out[0] = x[1];
            out[1] = -x[0];
        }
    }

    fn oscillator(y: &[f64]) -> Vec<f64> {
        vec![y[1], -y[0], 0.0, 0.0]
    }

    fn one_step_error(h: f64) -> f64 {
        let y0 = [1.0, 0.0, 0.0, 0.0];
        let y1 = rk4_step(oscillator, &y0, h);
        let exact = [h.cos(), -h.sin()];
        ((y1[0] - exact[0]).powi(2) + (y1[1] - exact[1]).powi(2)).sqrt()
    }

    #[test]
    fn rk4_step_is_deterministic() {
        let y = [0.3, -1.2, 0.7, 2.0];
        let first = rk4_step(oscillator, &y, 0.05);
        let second = rk4_step(oscillator, &y, 0.05);
        assert_eq!(first, second);
    }

    #[test]
    fn rk4_step_does_not_mutate_input() {
        let y = vec![0.3, -1.2, 0.7, 2.0];
        let copy = y.clone();
        let _ = rk4_step(oscillator, &y, 0.05);
        assert_eq!(y, copy);
    }

    #[test]
    fn zero_derivative_is_a_fixed_point() {
        let y = [1.5, -0.25, 3.0, 42.0];
        for h in [1e-6, DEFAULT_STEP_SIZE, 1.0, 100.0] {
            let next = rk4_step(|v: &[f64]| vec![0.0; v.len()], &y, h);
            assert_eq!(next, y.to_vec());
        }
    }

    #[test]
    fn linear_probe_is_integrated_exactly() {
        // dy0/dt = y1 with y1 constant: the solution is linear in t.
        let y = [2.0, 3.0, 0.0, 0.0];
        let next = rk4_step(|v: &[f64]| vec![v[1], 0.0, 0.0, 0.0], &y, 0.25);
        assert!((next[0] - 2.75).abs() < 1e-15);
        assert_eq!(&next[1..], &[3.0, 0.0, 0.0]);
    }

    #[test]
    fn local_error_shrinks_by_two_to_the_fifth_when_step_halves() {
        let coarse = one_step_error(0.1);
        let fine = one_step_error(0.05);
        let ratio = coarse / fine;
        assert!(
            (28.0..36.0).contains(&ratio),
            "expected ~32x error reduction, got {ratio}"
        );
    }

    #[test]
    fn buffered_stepper_matches_functional_step() {
        let mut stepper = RK4::<f64>::new(2);
        let mut state = [0.4, -0.1];
        stepper.step(&Oscillator, &mut state, 0.01);

        let expected = rk4_step(|y: &[f64]| vec![y[1], -y[0]], &[0.4, -0.1], 0.01);
        for (a, b) in state.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-15);
        }
    }

    #[test]
    fn buffered_stepper_tracks_full_period() {
        let mut stepper = RK4::<f64>::new(2);
        let mut state = [1.0, 0.0];
        let steps = 6283;
        let dt = std::f64::consts::TAU / steps as f64;
        for _ in 0..steps {
            stepper.step(&Oscillator, &mut state, dt);
        }
        assert!((state[0] - 1.0).abs() < 1e-8);
        assert!(state[1].abs() < 1e-8);
    }

    #[test]
    #[should_panic(expected = "stepper dimension")]
    fn buffered_stepper_rejects_wrong_dimension() {
        let mut stepper = RK4::<f64>::new(3);
        let mut state = [1.0, 0.0];
        stepper.step(&Oscillator, &mut state, 0.1);
    }
}
