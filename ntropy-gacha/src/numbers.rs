//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Clamp a probability into `[0, 1]`, returning 0.0 for NaN.
#[must_use]
pub fn clamp_probability(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Truncate a captured pull amount to whole pulls, returning 0 for negative or NaN values.
#[must_use]
pub fn whole_pulls(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    let max = f64::from(u32::MAX);
    cast::<f64, u32>(value.min(max).trunc()).unwrap_or(0)
}

/// Convert a collection length to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Render a probability as a percentage with one decimal place.
#[must_use]
pub fn percent_label(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_handles_nan_and_bounds() {
        assert!(clamp_probability(f64::NAN).abs() < f64::EPSILON);
        assert!((clamp_probability(1.5) - 1.0).abs() < f64::EPSILON);
        assert!(clamp_probability(-0.25).abs() < f64::EPSILON);
        assert!((clamp_probability(0.42) - 0.42).abs() < f64::EPSILON);
    }

    #[test]
    fn whole_pulls_truncates_and_floors_at_zero() {
        assert_eq!(whole_pulls(12.9), 12);
        assert_eq!(whole_pulls(-3.0), 0);
        assert_eq!(whole_pulls(f64::NAN), 0);
        assert_eq!(whole_pulls(f64::INFINITY), u32::MAX);
    }

    #[test]
    fn percent_label_uses_one_decimal() {
        assert_eq!(percent_label(0.5), "50.0%");
        assert_eq!(percent_label(0.12345), "12.3%");
    }
}
