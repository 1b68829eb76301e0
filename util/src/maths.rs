//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Limit a value to the range `[min, max]`.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Get the signed shortest angular distance from `b` to `a`.
///
/// The result is in the range (-pi, pi], so that `b + ang_diff(a, b)` points in the same
/// direction as `a`. Either input may lie outside of [0, 2pi].
pub fn ang_diff<T>(a: T, b: T) -> T
where
    T: Float
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap();
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    let d = rem_euclid(a - b, tau_t);

    if d > pi_t {
        d - tau_t
    }
    else {
        d
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()` if `lhs` is much smaller than `rhs.abs()` in
/// magnitude and `lhs < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Wrap an angle into the range [0, 2pi).
pub fn wrap_2pi<T>(value: T) -> T
where
    T: Float
{
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    let r = rem_euclid(value, tau_t);

    // Round-off in rem_euclid can land exactly on tau
    if r >= tau_t {
        T::zero()
    }
    else {
        r
    }
}

/// Normalised sinc function, `sin(x)/x`, with the removable singularity at zero filled in.
pub fn sinc<T>(x: T) -> T
where
    T: Float
{
    let small: T = T::from(1e-6).unwrap();
    let six: T = T::from(6.0).unwrap();

    if x.abs() < small {
        T::one() - x * x / six
    }
    else {
        x.sin() / x
    }
}

/// Median of three values using two comparisons on the ordered pair.
pub fn median3<T>(a: T, b: T, c: T) -> T
where
    T: Float
{
    if (a <= b && b <= c) || (c <= b && b <= a) {
        b
    }
    else if (b <= a && a <= c) || (c <= a && a <= b) {
        a
    }
    else {
        c
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const TAU: f64 = std::f64::consts::TAU;
    const PI: f64 = std::f64::consts::PI;

    #[test]
    fn test_ang_diff() {
        assert_eq!(ang_diff(2f64, 1f64), 1f64);
        assert_eq!(ang_diff(1f64, 2f64), -1f64);
        assert!(ang_diff(0f64, TAU).abs() < 1e-12);
        assert!(ang_diff(TAU, 0f64).abs() < 1e-12);
        assert!((ang_diff(0.1f64, TAU - 0.1) - 0.2).abs() < 1e-12);
        assert!((ang_diff(TAU - 0.1, 0.1f64) + 0.2).abs() < 1e-12);
        assert!((ang_diff(PI, 0f64) - PI).abs() < 1e-12);
    }

    #[test]
    fn test_wrap_2pi() {
        assert!((wrap_2pi(-0.5f64) - (TAU - 0.5)).abs() < 1e-12);
        assert!((wrap_2pi(TAU + 0.5f64) - 0.5).abs() < 1e-12);
        assert_eq!(wrap_2pi(0f64), 0f64);
        assert!(wrap_2pi(-1e-20f64) < TAU);
    }

    #[test]
    fn test_median3() {
        assert_eq!(median3(1f64, 2f64, 3f64), 2f64);
        assert_eq!(median3(3f64, 1f64, 2f64), 2f64);
        assert_eq!(median3(2f64, 3f64, 1f64), 2f64);
        assert_eq!(median3(5f64, 5f64, -1f64), 5f64);
        assert_eq!(median3(0f64, 0f64, 0f64), 0f64);
    }

    #[test]
    fn test_clamp_sinc() {
        assert_eq!(clamp(&1.5f64, &-1f64, &1f64), 1f64);
        assert_eq!(clamp(&-1.5f64, &-1f64, &1f64), -1f64);
        assert_eq!(sinc(0f64), 1f64);
        assert!((sinc(PI / 2.0) - 2.0 / PI).abs() < 1e-12);
    }
}
