//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Sign of a value, with the sign of zero being zero.
///
/// Unlike `Float::signum` this returns `0` for both `+0.0` and `-0.0`, so a
/// zero component never contributes a direction.
pub fn sign<T>(value: T) -> T
where
    T: Float,
{
    if value == T::zero() {
        T::zero()
    } else {
        value / value.abs()
    }
}

/// Clamp a value into the range `[min, max]`.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float,
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

/// Clamp a value into the symmetric range `[-limit, limit]`.
///
/// A non-positive limit is treated as no limit at all.
pub fn clamp_abs<T>(value: T, limit: T) -> T
where
    T: Float,
{
    if limit <= T::zero() {
        return value;
    }

    clamp(&value, &-limit, &limit)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sign() {
        assert_eq!(sign(3.5f64), 1.0);
        assert_eq!(sign(-0.2f64), -1.0);
        assert_eq!(sign(0.0f64), 0.0);
        assert_eq!(sign(-0.0f64), 0.0);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&1.5f64, &-1.0, &1.0), 1.0);
        assert_eq!(clamp(&-1.5f64, &-1.0, &1.0), -1.0);
        assert_eq!(clamp(&0.25f64, &-1.0, &1.0), 0.25);
    }

    #[test]
    fn test_clamp_abs() {
        assert_eq!(clamp_abs(2.0f64, 0.5), 0.5);
        assert_eq!(clamp_abs(-2.0f64, 0.5), -0.5);
        assert_eq!(clamp_abs(-2.0f64, 0.0), -2.0);
    }
}
