//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Integer midpoint of two pixel coordinates, truncating toward zero.
pub fn mid_i32(a: i32, b: i32) -> i32 {
    (a + b) / 2
}

/// Sign of a value where zero counts as positive.
pub fn sign_pos_zero<T>(value: T) -> T
where
    T: Float
{
    if value < T::zero() {
        -T::one()
    }
    else {
        T::one()
    }
}

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mid_i32() {
        assert_eq!(mid_i32(10, 90), 50);
        assert_eq!(mid_i32(3, 4), 3);
        assert_eq!(mid_i32(-3, 0), -1);
    }

    #[test]
    fn test_sign_pos_zero() {
        assert_eq!(sign_pos_zero(0.0f64), 1.0);
        assert_eq!(sign_pos_zero(-0.3f64), -1.0);
        assert_eq!(sign_pos_zero(2.0f32), 1.0);
    }

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0.0, 10.0), (0.0, 1.0), 5.0), 0.5);
        assert_eq!(lin_map((0.0, 1.0), (1.0, 0.0), 0.25), 0.75);
    }
}
