use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// Numeric types the dynamics and integrators are generic over.
/// Must support float arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// Converts an `f64` constant into `T`.
///
/// Every `Scalar` is a `Float`, so the conversion cannot fail for finite input.
pub(crate) fn constant<T: Scalar>(value: f64) -> T {
    T::from_f64(value).unwrap_or_else(T::nan)
}

/// An autonomous first-order ODE system `dx/dt = f(x)`.
pub trait DynamicalSystem<T: Scalar> {
    /// Returns the dimension of the state space.
    fn dimension(&self) -> usize;

    /// Evaluates the vector field at `x`, writing `dx/dt` into `out`.
    fn apply(&self, x: &[T], out: &mut [T]);
}

/// A fixed-step solver that advances a state in place.
pub trait Steppable<T: Scalar> {
    /// Performs one step of size `dt`, overwriting `state`.
    fn step(&mut self, system: &impl DynamicalSystem<T>, state: &mut [T], dt: T);
}
