//! Automatic break selection
//!
//! Breaks are chosen so that roughly `num` ticks land on round values:
//! the raw spacing `(max - min) / num` is decomposed into `f * 10^k`
//! with `1 <= f < 10` and snapped to the nearest member of
//! `{1, 2, 2.5, 5, 10} * 10^k`.

/// Select tick positions for a continuous range.
///
/// Breaks start at the smallest multiple of the chosen step at or above
/// `min` and advance by the step while below `domain_max` (the
/// unexpanded trained maximum, so ticks never run past the data).
pub fn continuous_breaks(min: f64, max: f64, num: usize, domain_max: f64) -> Vec<f64> {
    let delta = (max - min) / num as f64;
    if !delta.is_finite() || delta <= 0.0 {
        return Vec::new();
    }

    let mag = 10f64.powi(delta.log10().floor() as i32);
    let f = delta / mag;
    let step = mag
        * if f < 1.8 {
            1.0
        } else if f < 3.0 {
            2.0
        } else if f < 4.0 {
            2.5
        } else if f < 9.0 {
            5.0
        } else {
            10.0
        };

    let mut breaks = Vec::new();
    let mut x = (min / step).ceil() * step;
    while x < domain_max {
        breaks.push(x);
        x += step;
    }
    breaks
}

/// Breaks for a time range: first, middle and last instant.
pub fn time_breaks(min: f64, max: f64) -> Vec<f64> {
    vec![min, (min + max) / 2.0, max]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_steps() {
        // Range [55, 125] asks for spacing 14, which snaps down to 10.
        let breaks = continuous_breaks(55.0, 125.0, 5, 125.0);
        assert_eq!(
            breaks,
            vec![60.0, 70.0, 80.0, 90.0, 100.0, 110.0, 120.0]
        );
        // A wider range snaps to 20.
        let breaks = continuous_breaks(0.0, 100.0, 5, 100.0);
        assert_eq!(breaks, vec![0.0, 20.0, 40.0, 60.0, 80.0]);
    }

    #[test]
    fn test_unit_range() {
        let breaks = continuous_breaks(0.0, 1.0, 5, 1.0);
        assert!(breaks.len() >= 3);
        for w in breaks.windows(2) {
            assert!((w[1] - w[0] - 0.2).abs() < 1e-12);
        }
    }

    #[test]
    fn test_breaks_stop_at_domain_max() {
        let breaks = continuous_breaks(-5.0, 105.0, 5, 99.0);
        assert!(breaks.iter().all(|b| *b < 99.0));
        assert!(!breaks.is_empty());
    }

    #[test]
    fn test_degenerate_range() {
        assert!(continuous_breaks(3.0, 3.0, 5, 3.0).is_empty());
    }

    #[test]
    fn test_time_breaks() {
        assert_eq!(time_breaks(0.0, 100.0), vec![0.0, 50.0, 100.0]);
    }
}
