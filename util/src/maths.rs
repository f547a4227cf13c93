//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Threshold below which `sinc` switches to its Taylor expansion.
const SINC_EPS: f64 = 1e-9;

/// Linearly interpolate between `a` and `b`, `frac` is not clamped.
pub fn lerp<T>(a: T, b: T, frac: T) -> T
where
    T: Float
{
    a + (b - a) * frac
}

pub fn clamp<T>(value: T, min: T, max: T) -> T 
where
    T: Float
{
    let mut ret = value;

    if ret > max {
        ret = max
    }
    if ret < min {
        ret = min
    }

    ret
}

/// Sign of a value which, unlike `Float::signum`, returns zero for zero.
pub fn sign<T>(value: T) -> T
where
    T: Float
{
    if value > T::zero() {
        T::one()
    }
    else if value < T::zero() {
        -T::one()
    }
    else {
        T::zero()
    }
}

/// `sin(x)/x`, using `1 - x^2/6` near zero.
pub fn sinc<T>(x: T) -> T
where
    T: Float
{
    let eps = T::from(SINC_EPS).unwrap_or_else(T::epsilon);

    if x.abs() < eps {
        T::one() - x * x / T::from(6.0).unwrap_or_else(T::one)
    }
    else {
        x.sin() / x
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
/// 
/// This function is taken from the std library as num is missing it.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Wrap an angle into the range [-pi, pi].
pub fn wrap_pi<T>(value: T) -> T
where
    T: Float
{
    let pi = T::from(std::f64::consts::PI).unwrap_or_else(T::zero);
    let tau = pi + pi;

    if value >= -pi && value <= pi {
        return value;
    }

    rem_euclid(value + pi, tau) - pi
}
