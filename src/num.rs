//! Utilities related to numbers.

/// Floating-point precision to use for field values and coordinates.
#[allow(non_camel_case_types)]
pub type fbf = f64;

/// Returns the relative difference between two values, falling back to the
/// absolute difference when the reference value is smaller than `abs_floor`.
pub fn relative_difference(value: fbf, reference: fbf, abs_floor: fbf) -> fbf {
    let diff = fbf::abs(value - reference);
    let magnitude = fbf::abs(reference);
    if magnitude < abs_floor {
        diff
    } else {
        diff / magnitude
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn relative_difference_uses_absolute_difference_near_zero() {
        assert_eq!(relative_difference(2.0, 1.0, 1e-12), 1.0);
        assert_eq!(relative_difference(3.0, 2.0, 1e-12), 0.5);
        assert_eq!(relative_difference(1e-14, 0.0, 1e-12), 1e-14);
    }
}
