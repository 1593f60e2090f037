//! Summary statistics over `f64` slices.

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by `n`), `None` for an empty slice.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    Some(var.sqrt())
}

/// Percentile with linear interpolation between closest ranks.
///
/// `p` is in percent and clamped to `[0, 100]`. The rank of the result is
/// `p / 100 * (n - 1)` over the sorted values, interpolating between the two
/// neighbouring entries.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_std_of_known_values() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&v), Some(5.0));
        assert!((std_dev(&v).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn empty_inputs_have_no_statistics() {
        assert_eq!(mean(&[]), None);
        assert_eq!(std_dev(&[]), None);
        assert_eq!(percentile(&[], 25.0), None);
        assert_eq!(min_max(&[]), None);
    }

    #[test]
    fn percentile_interpolates_between_ranks() {
        let v = [10.0, 10.0, -5.0, -5.0, 10.0, 10.0, 10.0, 10.0];
        // rank 1.75 between -5 (index 1) and 10 (index 2)
        assert!((percentile(&v, 25.0).unwrap() - 6.25).abs() < 1e-12);
        assert_eq!(percentile(&v, 0.0), Some(-5.0));
        assert_eq!(percentile(&v, 100.0), Some(10.0));
    }

    #[test]
    fn percentile_is_order_independent() {
        let a = [3.0, 1.0, 2.0, 4.0];
        let b = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&a, 50.0), percentile(&b, 50.0));
        assert_eq!(percentile(&a, 50.0), Some(2.5));
    }

    #[test]
    fn min_max_tracks_extremes() {
        assert_eq!(min_max(&[3.0, -1.0, 8.5, 2.0]), Some((-1.0, 8.5)));
    }
}
